// Giveaway commands: host, end early, cancel.
//
// The scheduler posts the announcement and the results itself, so these
// handlers only validate input and report what went wrong.

use super::{require, BotContext, Call};
use crate::core::commands::{CommandCall, CommandError, CommandHandler};
use crate::core::giveaway::{parse_duration, GiveawayRequest};
use crate::core::platform::Permission;
use async_trait::async_trait;
use std::time::Duration;

const DEFAULT_PRIZE: &str = "Mystery prize";

/// Longest giveaway we are willing to keep a timer for.
const MAX_DURATION: Duration = Duration::from_secs(30 * 24 * 60 * 60);

fn giveaway_usage(call: &Call<'_>) -> CommandError {
    CommandError::Usage(format!(
        "Usage: {p}giveaway <duration> <winners> <prize>, e.g. {p}giveaway 1m 1 Awesome prize \
         (duration units: s, m, h, d; at most 30d)",
        p = call.prefix
    ))
}

fn message_id_arg(call: &Call<'_>, command: &str) -> Result<u64, CommandError> {
    call.args
        .first()
        .and_then(|raw| raw.parse().ok())
        .ok_or_else(|| {
            CommandError::Usage(format!("Usage: {}{} <messageId>", call.prefix, command))
        })
}

pub struct Giveaway;

#[async_trait]
impl CommandHandler<BotContext> for Giveaway {
    async fn execute(&self, call: CommandCall<'_, BotContext>) -> Result<(), CommandError> {
        require(&call, Permission::ManageMessages)?;

        let duration_label = call.args.first().ok_or_else(|| giveaway_usage(&call))?;
        let duration = parse_duration(duration_label)
            .filter(|d| !d.is_zero() && *d <= MAX_DURATION)
            .ok_or_else(|| giveaway_usage(&call))?;
        let winner_count: u32 = call
            .args
            .get(1)
            .and_then(|raw| raw.parse().ok())
            .filter(|count| *count > 0)
            .ok_or_else(|| giveaway_usage(&call))?;
        let prize = match call.args.get(2..) {
            Some(words) if !words.is_empty() => words.join(" "),
            _ => DEFAULT_PRIZE.to_string(),
        };

        let state = call
            .context
            .giveaways
            .start(GiveawayRequest {
                channel_id: call.invocation.channel_id,
                duration,
                duration_label: duration_label.clone(),
                winner_count,
                prize,
            })
            .await?;

        tracing::info!(
            user_id = call.invocation.author_id,
            message_id = state.message_id,
            "Giveaway hosted"
        );
        Ok(())
    }
}

/// Draw a running giveaway immediately.
pub struct EndGiveaway;

#[async_trait]
impl CommandHandler<BotContext> for EndGiveaway {
    async fn execute(&self, call: CommandCall<'_, BotContext>) -> Result<(), CommandError> {
        require(&call, Permission::ManageMessages)?;
        let message_id = message_id_arg(&call, "gend")?;

        let outcome = call.context.giveaways.end_now(message_id).await?;
        tracing::info!(message_id, ?outcome, "Giveaway ended early");
        Ok(())
    }
}

/// Stop a running giveaway without drawing.
pub struct CancelGiveaway;

#[async_trait]
impl CommandHandler<BotContext> for CancelGiveaway {
    async fn execute(&self, call: CommandCall<'_, BotContext>) -> Result<(), CommandError> {
        require(&call, Permission::ManageMessages)?;
        let message_id = message_id_arg(&call, "gcancel")?;

        call.context.giveaways.cancel(message_id).await?;
        tracing::info!(message_id, "Giveaway cancelled");
        Ok(())
    }
}
