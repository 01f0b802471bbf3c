// Reaction roles - grant a role when someone reacts to the designated message,
// take it away again when they remove the reaction.
//
// The binder keeps no state of its own beyond the static binding. Whether a
// member holds a role is the platform's business.

use crate::core::platform::{Platform, PlatformError};
use std::sync::Arc;

// ============================================================================
// DOMAIN MODELS
// ============================================================================

/// The designated message and its emoji -> role table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReactionRoleBinding {
    pub message_id: Option<u64>,
    /// (emoji, role_id) pairs in configuration order.
    pub roles: Vec<(String, u64)>,
}

impl ReactionRoleBinding {
    pub fn role_for(&self, emoji: &str) -> Option<u64> {
        self.roles
            .iter()
            .find(|(bound, _)| bound == emoji)
            .map(|(_, role_id)| *role_id)
    }
}

/// A reaction toggle delivered by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionEvent {
    pub guild_id: Option<u64>,
    pub message_id: u64,
    pub emoji: String,
    pub user_id: u64,
    pub user_is_bot: bool,
}

/// Why a reaction was not acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NotDesignatedMessage,
    UnmappedEmoji,
    BotUser,
    NotInGuild,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleChange {
    Granted { user_id: u64, role_id: u64 },
    Revoked { user_id: u64, role_id: u64 },
    Ignored(IgnoreReason),
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct ReactionRoleBinder {
    binding: ReactionRoleBinding,
    platform: Arc<dyn Platform>,
}

impl ReactionRoleBinder {
    pub fn new(binding: ReactionRoleBinding, platform: Arc<dyn Platform>) -> Self {
        Self { binding, platform }
    }

    pub fn binding(&self) -> &ReactionRoleBinding {
        &self.binding
    }

    pub async fn reaction_added(&self, event: &ReactionEvent) -> Result<RoleChange, PlatformError> {
        let (guild_id, role_id) = match self.resolve(event) {
            Ok(target) => target,
            Err(reason) => return Ok(RoleChange::Ignored(reason)),
        };

        self.platform
            .add_role(guild_id, event.user_id, role_id)
            .await?;
        Ok(RoleChange::Granted {
            user_id: event.user_id,
            role_id,
        })
    }

    pub async fn reaction_removed(
        &self,
        event: &ReactionEvent,
    ) -> Result<RoleChange, PlatformError> {
        let (guild_id, role_id) = match self.resolve(event) {
            Ok(target) => target,
            Err(reason) => return Ok(RoleChange::Ignored(reason)),
        };

        self.platform
            .remove_role(guild_id, event.user_id, role_id)
            .await?;
        Ok(RoleChange::Revoked {
            user_id: event.user_id,
            role_id,
        })
    }

    /// Apply the guards shared by both transitions.
    fn resolve(&self, event: &ReactionEvent) -> Result<(u64, u64), IgnoreReason> {
        if self.binding.message_id != Some(event.message_id) {
            return Err(IgnoreReason::NotDesignatedMessage);
        }
        if event.user_is_bot {
            return Err(IgnoreReason::BotUser);
        }
        let role_id = self
            .binding
            .role_for(&event.emoji)
            .ok_or(IgnoreReason::UnmappedEmoji)?;
        let guild_id = event.guild_id.ok_or(IgnoreReason::NotInGuild)?;
        Ok((guild_id, role_id))
    }
}
