// Leveling commands.
//
// Same pattern as every command module:
// 1. Extract primitive data from the invocation
// 2. Call core service
// 3. Format the response

use super::BotContext;
use crate::core::commands::{CommandCall, CommandError, CommandHandler};
use async_trait::async_trait;

/// Show the author's level and XP toward the next one.
pub struct Level;

#[async_trait]
impl CommandHandler<BotContext> for Level {
    async fn execute(&self, call: CommandCall<'_, BotContext>) -> Result<(), CommandError> {
        let progress = call
            .context
            .leveling
            .progress(call.invocation.author_id)
            .await?;

        call.reply(&format!(
            "Your level: {}. XP: {}/{}",
            progress.level, progress.xp, progress.next_threshold
        ))
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::discord::commands::test_harness::{Harness, AUTHOR};

    #[tokio::test]
    async fn fresh_user_starts_at_level_zero() {
        let harness = Harness::new();

        harness.run("!level", &[]).await;
        assert_eq!(
            harness.platform.messages(),
            vec!["Your level: 0. XP: 0/155".to_string()]
        );
    }

    #[tokio::test]
    async fn progress_reflects_earned_xp() {
        let harness = Harness::new();
        for _ in 0..3 {
            harness
                .context
                .leveling
                .process_message(AUTHOR)
                .await
                .unwrap();
        }

        harness.run("!LEVEL", &[]).await;
        assert_eq!(
            harness.platform.messages(),
            vec!["Your level: 0. XP: 30/155".to_string()]
        );
    }
}
