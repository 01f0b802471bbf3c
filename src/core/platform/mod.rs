// Platform module - the capability surface the core consumes.

mod platform_port;

pub use platform_port::{
    mention, Permission, PermissionSet, Platform, PlatformError, Reactor, SentMessage,
};
