// The platform port - everything the bot needs from the chat platform.
//
// The core never talks to Discord directly. It asks for capabilities through
// this trait and the discord layer provides the real implementation on top of
// serenity's HTTP client. Tests plug in a recording fake instead.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;

// ============================================================================
// DOMAIN MODELS
// ============================================================================

/// A message the bot just posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub id: u64,
    pub created_at: DateTime<Utc>,
}

/// Someone who reacted to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reactor {
    pub user_id: u64,
    pub bot: bool,
}

/// Capabilities a command author may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    KickMembers,
    BanMembers,
    ModerateMembers,
    ManageMessages,
    Administrator,
}

/// The permissions resolved for a command author.
///
/// Administrator implies every other permission, mirroring the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    granted: Vec<Permission>,
}

impl PermissionSet {
    pub fn new(granted: impl IntoIterator<Item = Permission>) -> Self {
        let mut granted: Vec<Permission> = granted.into_iter().collect();
        granted.dedup();
        Self { granted }
    }

    pub fn has(&self, permission: Permission) -> bool {
        self.granted.contains(&Permission::Administrator) || self.granted.contains(&permission)
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Platform request failed: {0}")]
    Request(String),
}

// ============================================================================
// PORT
// ============================================================================

/// Everything the bot can do on the platform.
///
/// Role grants and revocations must be idempotent: adding a role the member
/// already holds, or removing one they lack, succeeds.
#[async_trait]
pub trait Platform: Send + Sync {
    async fn send_message(&self, channel_id: u64, content: &str)
        -> Result<SentMessage, PlatformError>;

    async fn reply(
        &self,
        channel_id: u64,
        message_id: u64,
        content: &str,
    ) -> Result<SentMessage, PlatformError>;

    async fn edit_message(
        &self,
        channel_id: u64,
        message_id: u64,
        content: &str,
    ) -> Result<(), PlatformError>;

    async fn send_direct_message(&self, user_id: u64, content: &str) -> Result<(), PlatformError>;

    async fn timeout_member(
        &self,
        guild_id: u64,
        user_id: u64,
        until: DateTime<Utc>,
        reason: &str,
    ) -> Result<(), PlatformError>;

    async fn kick_member(&self, guild_id: u64, user_id: u64, reason: &str)
        -> Result<(), PlatformError>;

    async fn ban_member(&self, guild_id: u64, user_id: u64, reason: &str)
        -> Result<(), PlatformError>;

    async fn add_role(&self, guild_id: u64, user_id: u64, role_id: u64)
        -> Result<(), PlatformError>;

    async fn remove_role(
        &self,
        guild_id: u64,
        user_id: u64,
        role_id: u64,
    ) -> Result<(), PlatformError>;

    /// Everyone currently reacting to `message_id` with `emoji`.
    async fn fetch_reactors(
        &self,
        channel_id: u64,
        message_id: u64,
        emoji: &str,
    ) -> Result<Vec<Reactor>, PlatformError>;

    async fn react(&self, channel_id: u64, message_id: u64, emoji: &str)
        -> Result<(), PlatformError>;

    /// Every role in the guild, keyed by role id.
    async fn role_names(&self, guild_id: u64) -> Result<HashMap<u64, String>, PlatformError>;
}

/// Format a user mention.
pub fn mention(user_id: u64) -> String {
    format!("<@{}>", user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn administrator_implies_everything() {
        let admin = PermissionSet::new([Permission::Administrator]);
        assert!(admin.has(Permission::BanMembers));
        assert!(admin.has(Permission::ManageMessages));

        let kicker = PermissionSet::new([Permission::KickMembers]);
        assert!(kicker.has(Permission::KickMembers));
        assert!(!kicker.has(Permission::BanMembers));
        assert!(!PermissionSet::default().has(Permission::KickMembers));
    }

    #[test]
    fn mention_formats_user_id() {
        assert_eq!(mention(42), "<@42>");
    }
}
