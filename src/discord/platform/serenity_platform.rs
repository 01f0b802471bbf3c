// Serenity implementation of the platform port.
//
// Every method is a thin translation: wrap the raw ids in serenity's id types,
// make the HTTP call, map the result back to core types.

use crate::core::platform::{Platform, PlatformError, Reactor, SentMessage};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use poise::serenity_prelude as serenity;
use serenity::{ChannelId, GuildId, MessageId, ReactionType, RoleId, UserId};
use std::collections::HashMap;
use std::sync::Arc;

/// Discord's snowflake epoch (2015-01-01) in milliseconds.
const DISCORD_EPOCH_MS: u64 = 1_420_070_400_000;

/// Page size for reaction user lookups (the API maximum).
const REACTION_PAGE_SIZE: u8 = 100;

impl From<serenity::Error> for PlatformError {
    fn from(e: serenity::Error) -> Self {
        PlatformError::Request(e.to_string())
    }
}

pub struct SerenityPlatform {
    http: Arc<serenity::Http>,
}

impl SerenityPlatform {
    pub fn new(http: Arc<serenity::Http>) -> Self {
        Self { http }
    }
}

/// When a snowflake id was minted.
pub fn snowflake_time(id: u64) -> DateTime<Utc> {
    let millis = (id >> 22).saturating_add(DISCORD_EPOCH_MS);
    i64::try_from(millis)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_default()
}

/// The string the bot uses to identify an emoji: the character itself for
/// unicode emoji, `name:id` for custom ones.
pub fn emoji_key(reaction: &ReactionType) -> String {
    match reaction {
        ReactionType::Custom { id, name, .. } => {
            format!("{}:{}", name.as_deref().unwrap_or_default(), id.get())
        }
        ReactionType::Unicode(emoji) => emoji.clone(),
        other => other.to_string(),
    }
}

/// Inverse of [`emoji_key`].
pub fn parse_reaction_type(emoji: &str) -> ReactionType {
    if let Some((name, id)) = emoji.split_once(':') {
        if let Ok(id) = id.parse::<u64>() {
            return ReactionType::Custom {
                animated: false,
                id: serenity::EmojiId::new(id),
                name: Some(name.to_string()),
            };
        }
    }
    ReactionType::Unicode(emoji.to_string())
}

fn sent(message: &serenity::Message) -> SentMessage {
    SentMessage {
        id: message.id.get(),
        created_at: snowflake_time(message.id.get()),
    }
}

#[async_trait]
impl Platform for SerenityPlatform {
    async fn send_message(
        &self,
        channel_id: u64,
        content: &str,
    ) -> Result<SentMessage, PlatformError> {
        let message = ChannelId::new(channel_id).say(&self.http, content).await?;
        Ok(sent(&message))
    }

    async fn reply(
        &self,
        channel_id: u64,
        message_id: u64,
        content: &str,
    ) -> Result<SentMessage, PlatformError> {
        let channel = ChannelId::new(channel_id);
        let builder = serenity::CreateMessage::new()
            .content(content)
            .reference_message((channel, MessageId::new(message_id)));
        let message = channel.send_message(&self.http, builder).await?;
        Ok(sent(&message))
    }

    async fn edit_message(
        &self,
        channel_id: u64,
        message_id: u64,
        content: &str,
    ) -> Result<(), PlatformError> {
        ChannelId::new(channel_id)
            .edit_message(
                &self.http,
                MessageId::new(message_id),
                serenity::EditMessage::new().content(content),
            )
            .await?;
        Ok(())
    }

    async fn send_direct_message(&self, user_id: u64, content: &str) -> Result<(), PlatformError> {
        UserId::new(user_id)
            .direct_message(&self.http, serenity::CreateMessage::new().content(content))
            .await?;
        Ok(())
    }

    async fn timeout_member(
        &self,
        guild_id: u64,
        user_id: u64,
        until: DateTime<Utc>,
        reason: &str,
    ) -> Result<(), PlatformError> {
        let timeout_until = serenity::Timestamp::from_unix_timestamp(until.timestamp())
            .map_err(|e| PlatformError::InvalidRequest(e.to_string()))?;

        GuildId::new(guild_id)
            .edit_member(
                &self.http,
                UserId::new(user_id),
                serenity::EditMember::new()
                    .disable_communication_until_datetime(timeout_until)
                    .audit_log_reason(reason),
            )
            .await?;
        Ok(())
    }

    async fn kick_member(
        &self,
        guild_id: u64,
        user_id: u64,
        reason: &str,
    ) -> Result<(), PlatformError> {
        GuildId::new(guild_id)
            .kick_with_reason(&self.http, UserId::new(user_id), reason)
            .await?;
        Ok(())
    }

    async fn ban_member(
        &self,
        guild_id: u64,
        user_id: u64,
        reason: &str,
    ) -> Result<(), PlatformError> {
        GuildId::new(guild_id)
            .ban_with_reason(&self.http, UserId::new(user_id), 0, reason)
            .await?;
        Ok(())
    }

    // Discord answers 204 for adding a held role or removing a missing one,
    // which keeps both calls idempotent.
    async fn add_role(
        &self,
        guild_id: u64,
        user_id: u64,
        role_id: u64,
    ) -> Result<(), PlatformError> {
        self.http
            .add_member_role(
                GuildId::new(guild_id),
                UserId::new(user_id),
                RoleId::new(role_id),
                Some("Reaction role"),
            )
            .await?;
        Ok(())
    }

    async fn remove_role(
        &self,
        guild_id: u64,
        user_id: u64,
        role_id: u64,
    ) -> Result<(), PlatformError> {
        self.http
            .remove_member_role(
                GuildId::new(guild_id),
                UserId::new(user_id),
                RoleId::new(role_id),
                Some("Reaction role"),
            )
            .await?;
        Ok(())
    }

    async fn fetch_reactors(
        &self,
        channel_id: u64,
        message_id: u64,
        emoji: &str,
    ) -> Result<Vec<Reactor>, PlatformError> {
        let channel = ChannelId::new(channel_id);
        let message = MessageId::new(message_id);
        let reaction = parse_reaction_type(emoji);

        let mut reactors = Vec::new();
        let mut after: Option<UserId> = None;
        loop {
            let page = channel
                .reaction_users(
                    &self.http,
                    message,
                    reaction.clone(),
                    Some(REACTION_PAGE_SIZE),
                    after,
                )
                .await?;

            let full_page = page.len() == usize::from(REACTION_PAGE_SIZE);
            after = page.last().map(|user| user.id);
            reactors.extend(page.into_iter().map(|user| Reactor {
                user_id: user.id.get(),
                bot: user.bot,
            }));

            if !full_page {
                break;
            }
        }

        Ok(reactors)
    }

    async fn react(
        &self,
        channel_id: u64,
        message_id: u64,
        emoji: &str,
    ) -> Result<(), PlatformError> {
        ChannelId::new(channel_id)
            .create_reaction(
                &self.http,
                MessageId::new(message_id),
                parse_reaction_type(emoji),
            )
            .await?;
        Ok(())
    }

    async fn role_names(&self, guild_id: u64) -> Result<HashMap<u64, String>, PlatformError> {
        let roles = GuildId::new(guild_id).roles(&self.http).await?;
        Ok(roles
            .into_iter()
            .map(|(role_id, role)| (role_id.get(), role.name))
            .collect())
    }
}
