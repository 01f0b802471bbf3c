// Informational commands: ping and help.

use super::BotContext;
use crate::core::commands::{CommandCall, CommandError, CommandHandler};
use async_trait::async_trait;

/// Round-trip check. The latency is the gap between the command message and
/// the bot's reply, both taken from their creation times.
pub struct Ping;

#[async_trait]
impl CommandHandler<BotContext> for Ping {
    async fn execute(&self, call: CommandCall<'_, BotContext>) -> Result<(), CommandError> {
        let sent = call.say("Pinging…").await?;
        let latency = (sent.created_at - call.invocation.created_at)
            .num_milliseconds()
            .max(0);

        call.platform
            .edit_message(
                call.invocation.channel_id,
                sent.id,
                &format!("Pong! Latency: {}ms", latency),
            )
            .await?;
        Ok(())
    }
}

pub struct Help;

#[async_trait]
impl CommandHandler<BotContext> for Help {
    async fn execute(&self, call: CommandCall<'_, BotContext>) -> Result<(), CommandError> {
        let lines: Vec<String> = call
            .registry
            .list()
            .into_iter()
            .map(|c| format!("`{}{}` - {}", call.prefix, c.name, c.description))
            .collect();

        call.reply(&format!("**Commands**\n{}", lines.join("\n")))
            .await?;
        Ok(())
    }
}
