// Moderation commands: kick, ban, mute.

use super::{require, BotContext, Call};
use crate::core::commands::{CommandCall, CommandError, CommandHandler};
use crate::core::platform::{mention, Permission, PlatformError};
use async_trait::async_trait;
use chrono::Utc;

const DEFAULT_REASON: &str = "No reason provided";

/// Longest timeout Discord accepts (28 days).
const MAX_MUTE_MINUTES: u32 = 40_320;

/// Parse `<@id>`, `<@!id>` or a bare id.
pub fn parse_mention(token: &str) -> Option<u64> {
    let id = match token.strip_prefix("<@") {
        Some(rest) => {
            let rest = rest.strip_suffix('>')?;
            rest.strip_prefix('!').unwrap_or(rest)
        }
        None => token,
    };
    id.parse().ok()
}

/// The user a moderation command is aimed at.
fn target(call: &Call<'_>) -> Option<u64> {
    call.args
        .first()
        .and_then(|token| parse_mention(token))
        .or_else(|| call.invocation.mentions.first().copied())
}

fn reason(args: &[String]) -> String {
    if args.is_empty() {
        DEFAULT_REASON.to_string()
    } else {
        args.join(" ")
    }
}

fn rest(args: &[String], from: usize) -> &[String] {
    args.get(from..).unwrap_or_default()
}

/// Post to the moderation log channel, if one is configured.
async fn log_action(call: &Call<'_>, text: &str) {
    let Some(channel_id) = call.context.config.mod_log_channel_id else {
        return;
    };
    if let Err(e) = call.platform.send_message(channel_id, text).await {
        tracing::warn!(channel_id, "Failed to post to the moderation log: {}", e);
    }
}

/// The platform turned a moderation action down; tell the moderator.
fn refused(action: &str, source: PlatformError) -> CommandError {
    CommandError::Refused {
        message: format!("Couldn't {} that user.", action),
        source,
    }
}

pub struct Kick;

#[async_trait]
impl CommandHandler<BotContext> for Kick {
    async fn execute(&self, call: CommandCall<'_, BotContext>) -> Result<(), CommandError> {
        require(&call, Permission::KickMembers)?;
        let guild_id = call.guild_id()?;
        let Some(user_id) = target(&call) else {
            return Err(CommandError::Usage(format!(
                "Mention the user to kick. Usage: {}kick @user [reason]",
                call.prefix
            )));
        };
        let reason = reason(rest(call.args, 1));

        call.platform
            .kick_member(guild_id, user_id, &reason)
            .await
            .map_err(|e| refused("kick", e))?;

        call.say(&format!("Kicked {}. Reason: {}", mention(user_id), reason))
            .await?;
        log_action(
            &call,
            &format!(
                "👢 {} kicked {}. Reason: {}",
                mention(call.invocation.author_id),
                mention(user_id),
                reason
            ),
        )
        .await;
        Ok(())
    }
}

pub struct Ban;

#[async_trait]
impl CommandHandler<BotContext> for Ban {
    async fn execute(&self, call: CommandCall<'_, BotContext>) -> Result<(), CommandError> {
        require(&call, Permission::BanMembers)?;
        let guild_id = call.guild_id()?;
        let Some(user_id) = target(&call) else {
            return Err(CommandError::Usage(format!(
                "Mention the user to ban. Usage: {}ban @user [reason]",
                call.prefix
            )));
        };
        let reason = reason(rest(call.args, 1));

        call.platform
            .ban_member(guild_id, user_id, &reason)
            .await
            .map_err(|e| refused("ban", e))?;

        call.say(&format!("Banned {}. Reason: {}", mention(user_id), reason))
            .await?;
        log_action(
            &call,
            &format!(
                "🔨 {} banned {}. Reason: {}",
                mention(call.invocation.author_id),
                mention(user_id),
                reason
            ),
        )
        .await;
        Ok(())
    }
}

pub struct Mute;

#[async_trait]
impl CommandHandler<BotContext> for Mute {
    async fn execute(&self, call: CommandCall<'_, BotContext>) -> Result<(), CommandError> {
        require(&call, Permission::ModerateMembers)?;
        let guild_id = call.guild_id()?;

        let usage = || {
            CommandError::Usage(format!(
                "Usage: {}mute @user <minutes> [reason] (1-{} minutes)",
                call.prefix, MAX_MUTE_MINUTES
            ))
        };
        let user_id = target(&call).ok_or_else(usage)?;
        let minutes: u32 = call
            .args
            .get(1)
            .and_then(|raw| raw.parse().ok())
            .filter(|m| (1..=MAX_MUTE_MINUTES).contains(m))
            .ok_or_else(usage)?;
        let reason = reason(rest(call.args, 2));

        let until = Utc::now() + chrono::Duration::minutes(i64::from(minutes));
        call.platform
            .timeout_member(guild_id, user_id, until, &reason)
            .await
            .map_err(|e| refused("mute", e))?;

        call.say(&format!(
            "Muted {} for {} minutes. Reason: {}",
            mention(user_id),
            minutes,
            reason
        ))
        .await?;
        log_action(
            &call,
            &format!(
                "🔇 {} muted {} for {} minutes. Reason: {}",
                mention(call.invocation.author_id),
                mention(user_id),
                minutes,
                reason
            ),
        )
        .await;
        Ok(())
    }
}
