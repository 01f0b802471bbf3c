// Command dispatcher - turns a chat line into a handler call.
//
// Parsing strips the prefix and splits on whitespace; only the command name
// is lowercased. Whatever the handler returns (or panics with) is settled here, so a
// failing command never reaches the event loop.

use super::registry::CommandRegistry;
use crate::core::counters::StoreError;
use crate::core::giveaway::GiveawayError;
use crate::core::platform::{PermissionSet, Platform, PlatformError, SentMessage};
use chrono::{DateTime, Utc};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use thiserror::Error;

/// Sent when a command fails for reasons the user can't fix.
pub const GENERIC_FAILURE: &str = "There was an error executing that command.";

// ============================================================================
// DOMAIN MODELS
// ============================================================================

/// An inbound chat message, reduced to what commands need.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    pub guild_id: Option<u64>,
    pub channel_id: u64,
    pub message_id: u64,
    pub author_id: u64,
    pub author_is_bot: bool,
    pub content: String,
    /// Users mentioned in the message, in order.
    pub mentions: Vec<u64>,
    pub permissions: PermissionSet,
    pub created_at: DateTime<Utc>,
}

/// A prefix command split into its name and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: String,
    pub args: Vec<String>,
}

/// Parse `line` as a command. Returns `None` unless it starts with `prefix`
/// and has something after it.
pub fn parse_command(line: &str, prefix: &str) -> Option<ParsedCommand> {
    let rest = line.strip_prefix(prefix)?;
    let mut tokens = rest.split_whitespace();
    let name = tokens.next()?.to_lowercase();
    Some(ParsedCommand {
        name,
        args: tokens.map(str::to_string).collect(),
    })
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("You don't have permission to use this command.")]
    PermissionDenied,

    /// Missing or invalid arguments. Carries the usage hint shown to the user.
    #[error("{0}")]
    Usage(String),

    #[error("This command only works in servers.")]
    GuildOnly,

    /// The platform turned the action down. `message` is what the user sees.
    #[error("{message}")]
    Refused {
        message: String,
        #[source]
        source: PlatformError,
    },

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Giveaway(#[from] GiveawayError),
}

impl CommandError {
    /// True when the user is at fault (permissions, input, wrong place).
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            CommandError::PermissionDenied
                | CommandError::Usage(_)
                | CommandError::GuildOnly
                | CommandError::Giveaway(GiveawayError::NotFound(_))
        )
    }

    /// The message to show the user inline, if there is a specific one.
    pub fn user_message(&self) -> Option<String> {
        match self {
            CommandError::Refused { message, .. } => Some(message.clone()),
            e if e.is_rejection() => Some(e.to_string()),
            _ => None,
        }
    }
}

/// How a line was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No prefix, or nothing after it.
    NotACommand,
    /// Prefixed, but no such command. Nothing is sent back.
    Unknown { name: String },
    Completed { name: String },
    /// Permission denied or bad input; the user was told why.
    Rejected { name: String },
    /// The handler errored or panicked. Logged, and the user got a notice.
    Failed { name: String },
}

// ============================================================================
// HANDLER INPUT
// ============================================================================

/// Everything a handler gets for one invocation.
pub struct CommandCall<'a, C: Send + Sync + 'static> {
    pub context: &'a C,
    pub platform: &'a Arc<dyn Platform>,
    pub invocation: &'a Invocation,
    pub args: &'a [String],
    pub registry: &'a CommandRegistry<C>,
    pub prefix: &'a str,
}

impl<C: Send + Sync + 'static> CommandCall<'_, C> {
    /// Reply to the invoking message.
    pub async fn reply(&self, content: &str) -> Result<SentMessage, PlatformError> {
        self.platform
            .reply(
                self.invocation.channel_id,
                self.invocation.message_id,
                content,
            )
            .await
    }

    /// Post in the invoking channel without replying.
    pub async fn say(&self, content: &str) -> Result<SentMessage, PlatformError> {
        self.platform
            .send_message(self.invocation.channel_id, content)
            .await
    }

    pub fn guild_id(&self) -> Result<u64, CommandError> {
        self.invocation.guild_id.ok_or(CommandError::GuildOnly)
    }
}

// ============================================================================
// DISPATCHER
// ============================================================================

pub struct Dispatcher<C: Send + Sync + 'static> {
    prefix: String,
    registry: CommandRegistry<C>,
    context: Arc<C>,
    platform: Arc<dyn Platform>,
}

impl<C: Send + Sync + 'static> Dispatcher<C> {
    pub fn new(
        prefix: impl Into<String>,
        registry: CommandRegistry<C>,
        context: Arc<C>,
        platform: Arc<dyn Platform>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            registry,
            context,
            platform,
        }
    }

    pub fn registry(&self) -> &CommandRegistry<C> {
        &self.registry
    }

    /// Run the command in `invocation`, if there is one.
    pub async fn dispatch(&self, invocation: &Invocation) -> DispatchOutcome {
        let Some(parsed) = parse_command(&invocation.content, &self.prefix) else {
            return DispatchOutcome::NotACommand;
        };

        let Some(command) = self.registry.lookup(&parsed.name) else {
            tracing::debug!(command = %parsed.name, "Ignoring unknown command");
            return DispatchOutcome::Unknown { name: parsed.name };
        };

        let call = CommandCall {
            context: self.context.as_ref(),
            platform: &self.platform,
            invocation,
            args: &parsed.args,
            registry: &self.registry,
            prefix: &self.prefix,
        };

        let name = parsed.name.clone();
        let result = AssertUnwindSafe(command.handler.execute(call))
            .catch_unwind()
            .await;
        let error = match result {
            Ok(Ok(())) => {
                tracing::debug!(
                    command = %name,
                    user_id = invocation.author_id,
                    "Command completed"
                );
                return DispatchOutcome::Completed { name };
            }
            Ok(Err(e)) => e,
            Err(_) => {
                tracing::error!(
                    command = %name,
                    user_id = invocation.author_id,
                    "Command panicked"
                );
                self.notify(invocation, GENERIC_FAILURE).await;
                return DispatchOutcome::Failed { name };
            }
        };

        if error.is_rejection() {
            self.notify(invocation, &error.to_string()).await;
            return DispatchOutcome::Rejected { name };
        }

        tracing::error!(
            command = %name,
            user_id = invocation.author_id,
            "Command failed: {}",
            error
        );
        let message = error
            .user_message()
            .unwrap_or_else(|| GENERIC_FAILURE.to_string());
        self.notify(invocation, &message).await;
        DispatchOutcome::Failed { name }
    }

    async fn notify(&self, invocation: &Invocation, content: &str) {
        if let Err(e) = self
            .platform
            .reply(invocation.channel_id, invocation.message_id, content)
            .await
        {
            tracing::warn!("Failed to send command feedback: {}", e);
        }
    }
}
