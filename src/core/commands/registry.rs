// Command registry - name -> handler lookup.
//
// Names are stored exactly as registered. The dispatcher lowercases what
// users type, so commands should be registered in lowercase.

use super::dispatcher::{CommandCall, CommandError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// A text command.
///
/// `C` is whatever shared state the handlers need (services, config).
#[async_trait]
pub trait CommandHandler<C: Send + Sync + 'static>: Send + Sync {
    async fn execute(&self, call: CommandCall<'_, C>) -> Result<(), CommandError>;
}

/// A registered command.
pub struct CommandDescriptor<C: Send + Sync + 'static> {
    pub name: String,
    pub description: String,
    pub handler: Arc<dyn CommandHandler<C>>,
}

impl<C: Send + Sync + 'static> Clone for CommandDescriptor<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            description: self.description.clone(),
            handler: Arc::clone(&self.handler),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Command `{0}` is already registered")]
    Duplicate(String),
}

pub struct CommandRegistry<C: Send + Sync + 'static> {
    commands: BTreeMap<String, CommandDescriptor<C>>,
}

impl<C: Send + Sync + 'static> Default for CommandRegistry<C> {
    fn default() -> Self {
        Self {
            commands: BTreeMap::new(),
        }
    }
}

impl<C: Send + Sync + 'static> CommandRegistry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command. The first registration of a name wins; registering
    /// it again is an error and leaves the existing command in place.
    pub fn register(
        &mut self,
        name: &str,
        description: &str,
        handler: impl CommandHandler<C> + 'static,
    ) -> Result<(), RegistryError> {
        if self.commands.contains_key(name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }

        let descriptor = CommandDescriptor {
            name: name.to_string(),
            description: description.to_string(),
            handler: Arc::new(handler),
        };
        self.commands.insert(name.to_string(), descriptor);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&CommandDescriptor<C>> {
        self.commands.get(name)
    }

    /// Every command, sorted by name.
    pub fn list(&self) -> Vec<&CommandDescriptor<C>> {
        self.commands.values().collect()
    }
}
