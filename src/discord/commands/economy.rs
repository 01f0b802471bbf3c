// Economy commands.
//
// Following the same pattern as the leveling commands: read the author id,
// call the core service, format the response.

use super::BotContext;
use crate::core::commands::{CommandCall, CommandError, CommandHandler};
use async_trait::async_trait;

pub struct Balance;

#[async_trait]
impl CommandHandler<BotContext> for Balance {
    async fn execute(&self, call: CommandCall<'_, BotContext>) -> Result<(), CommandError> {
        let balance = call
            .context
            .economy
            .balance(call.invocation.author_id)
            .await?;
        call.reply(&format!("You have {} coins.", balance)).await?;
        Ok(())
    }
}

pub struct Daily;

#[async_trait]
impl CommandHandler<BotContext> for Daily {
    async fn execute(&self, call: CommandCall<'_, BotContext>) -> Result<(), CommandError> {
        let claim = call
            .context
            .economy
            .claim_daily(call.invocation.author_id)
            .await?;

        tracing::info!(
            user_id = call.invocation.author_id,
            balance = claim.new_balance,
            "Daily reward claimed"
        );
        call.reply(&format!(
            "You claimed your daily {} coins! Balance: {}",
            claim.coins_awarded, claim.new_balance
        ))
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::discord::commands::test_harness::{Harness, AUTHOR};

    #[tokio::test]
    async fn balance_starts_at_zero() {
        let harness = Harness::new();

        harness.run("!balance", &[]).await;
        assert_eq!(
            harness.platform.messages(),
            vec!["You have 0 coins.".to_string()]
        );
    }

    #[tokio::test]
    async fn daily_has_no_cooldown() {
        let harness = Harness::new();

        harness.run("!daily", &[]).await;
        harness.run("!daily", &[]).await;
        harness.run("!balance", &[]).await;

        assert_eq!(
            harness.platform.messages(),
            vec![
                "You claimed your daily 100 coins! Balance: 100".to_string(),
                "You claimed your daily 100 coins! Balance: 200".to_string(),
                "You have 200 coins.".to_string(),
            ]
        );
        assert_eq!(harness.context.economy.balance(AUTHOR).await.unwrap(), 200);
    }

    #[tokio::test]
    async fn economy_does_not_touch_levels() {
        let harness = Harness::new();

        harness.run("!daily", &[]).await;
        let progress = harness.context.leveling.progress(AUTHOR).await.unwrap();
        assert_eq!((progress.level, progress.xp), (0, 0));
    }
}
