// Commands module - the prefix command registry and dispatcher.

mod dispatcher;
mod registry;

pub use dispatcher::{
    parse_command, CommandCall, CommandError, DispatchOutcome, Dispatcher, Invocation,
};
pub use registry::{CommandHandler, CommandRegistry, RegistryError};
