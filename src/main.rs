// This is the entry point of the Discord bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (counter stores)
// - `discord/` = Discord-specific adapters (platform, events, commands)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework
// 4. Flush the counter stores on shutdown

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

#[cfg(test)]
mod test_support;

use crate::core::config::BotConfig;
use crate::core::counters::Namespace;
use crate::core::economy::{EconomyConfig, EconomyService};
use crate::core::giveaway::GiveawayScheduler;
use crate::core::leveling::LevelingService;
use crate::core::platform::Platform;
use crate::discord::commands::{build_registry, BotContext};
use crate::discord::events::event_handler;
use crate::discord::platform::SerenityPlatform;
use crate::discord::Data;
use crate::infra::counters::JsonCounterStore;
use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let token = std::env::var("DISCORD_TOKEN").context(
        "Missing DISCORD_TOKEN environment variable! Create a .env file with your bot token.",
    )?;
    let config = Arc::new(BotConfig::from_env().context("Invalid bot configuration")?);

    // Keep the counter documents in a dedicated folder so the repo root stays tidy.
    std::fs::create_dir_all(&config.data_dir).with_context(|| {
        format!(
            "Failed to create data directory {}",
            config.data_dir.display()
        )
    })?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // The stores and services live outside the framework so they can still be
    // flushed after the gateway connection is gone.

    let leveling = Arc::new(LevelingService::new(JsonCounterStore::open(
        &config.data_dir,
        Namespace::Leveling,
    )));
    let economy = Arc::new(EconomyService::new_with_config(
        JsonCounterStore::open(&config.data_dir, Namespace::Economy),
        EconomyConfig {
            daily_reward: config.daily_reward,
        },
    ));
    let registry = build_registry().context("Failed to register commands")?;

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT // Required to read message content
        | serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::GUILD_MESSAGE_REACTIONS;

    let setup_config = Arc::clone(&config);
    let setup_leveling = Arc::clone(&leveling);
    let setup_economy = Arc::clone(&economy);

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            // Commands are plain prefix lines handled by our own dispatcher.
            commands: vec![],
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, _framework| {
            Box::pin(async move {
                tracing::info!("Bot is starting up...");

                let platform: Arc<dyn Platform> =
                    Arc::new(SerenityPlatform::new(ctx.http.clone()));

                let bot = Arc::new(BotContext {
                    config: setup_config,
                    leveling: setup_leveling,
                    economy: setup_economy,
                    giveaways: Arc::new(GiveawayScheduler::new(Arc::clone(&platform))),
                });
                let data = Data::new(bot, registry, platform);

                tracing::info!(
                    prefix = %data.bot.config.prefix,
                    commands = data.dispatcher.registry().list().len(),
                    "Bot is ready"
                );

                Ok(data)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(&token, intents)
        .framework(framework)
        .await
        .context("Error creating client")?;

    let shard_manager = client.shard_manager.clone();
    tokio::select! {
        result = client.start() => {
            result.context("Error running bot")?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl-C received, shutting down");
            shard_manager.shutdown_all().await;
        }
    }

    leveling.flush().await.context("Failed to flush levels")?;
    economy.flush().await.context("Failed to flush balances")?;
    tracing::info!("Counter stores flushed");

    Ok(())
}
