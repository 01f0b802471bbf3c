// Discord commands module.
// Each feature gets its own command file; this file wires them into a registry.

pub mod economy;
pub mod giveaway;
pub mod info;
pub mod leveling;
pub mod moderation;
pub mod roles;

use crate::core::commands::{CommandCall, CommandError, CommandRegistry, RegistryError};
use crate::core::config::BotConfig;
use crate::core::economy::EconomyService;
use crate::core::giveaway::GiveawayScheduler;
use crate::core::leveling::{LevelRecord, LevelingService};
use crate::core::platform::Permission;
use crate::infra::counters::JsonCounterStore;
use std::sync::Arc;

pub type LevelStore = JsonCounterStore<LevelRecord>;
pub type WalletStore = JsonCounterStore<u64>;

/// Shared state handed to every command.
pub struct BotContext {
    pub config: Arc<BotConfig>,
    pub leveling: Arc<LevelingService<LevelStore>>,
    pub economy: Arc<EconomyService<WalletStore>>,
    pub giveaways: Arc<GiveawayScheduler>,
}

pub type Call<'a> = CommandCall<'a, BotContext>;

/// Register every text command.
pub fn build_registry() -> Result<CommandRegistry<BotContext>, RegistryError> {
    let mut registry = CommandRegistry::new();

    registry.register(
        "kick",
        "Kick a user. Usage: kick @user [reason]",
        moderation::Kick,
    )?;
    registry.register(
        "ban",
        "Ban a user. Usage: ban @user [reason]",
        moderation::Ban,
    )?;
    registry.register(
        "mute",
        "Time out a user. Usage: mute @user <minutes> [reason]",
        moderation::Mute,
    )?;
    registry.register("level", "Show your level and XP.", leveling::Level)?;
    registry.register("ping", "Check the bot's latency.", info::Ping)?;
    registry.register("help", "List every command.", info::Help)?;
    registry.register(
        "setuproles",
        "Post the reaction role message (admin only).",
        roles::SetupRoles,
    )?;
    registry.register("balance", "Show your coin balance.", economy::Balance)?;
    registry.register("daily", "Claim your daily coins.", economy::Daily)?;
    registry.register(
        "giveaway",
        "Host a giveaway. Usage: giveaway <duration> <winners> <prize>",
        giveaway::Giveaway,
    )?;
    registry.register(
        "gend",
        "Draw a running giveaway now. Usage: gend <messageId>",
        giveaway::EndGiveaway,
    )?;
    registry.register(
        "gcancel",
        "Cancel a running giveaway. Usage: gcancel <messageId>",
        giveaway::CancelGiveaway,
    )?;

    Ok(registry)
}

/// Fail with `PermissionDenied` unless the author holds `permission`.
pub fn require(call: &Call<'_>, permission: Permission) -> Result<(), CommandError> {
    if call.invocation.permissions.has(permission) {
        Ok(())
    } else {
        Err(CommandError::PermissionDenied)
    }
}

#[cfg(test)]
pub mod test_harness {
    use super::*;
    use crate::core::commands::{DispatchOutcome, Invocation};
    use crate::core::counters::Namespace;
    use crate::core::platform::{PermissionSet, Platform};
    use crate::discord::Data;
    use crate::test_support::FakePlatform;
    use tempfile::TempDir;

    pub const GUILD: u64 = 1;
    pub const CHANNEL: u64 = 2;
    pub const AUTHOR: u64 = 3;
    pub const MOD_LOG: u64 = 4;

    /// A guild message from `AUTHOR` in `CHANNEL`, with no permissions.
    pub fn invocation(content: &str) -> Invocation {
        Invocation {
            guild_id: Some(GUILD),
            channel_id: CHANNEL,
            message_id: 77,
            author_id: AUTHOR,
            author_is_bot: false,
            content: content.to_string(),
            mentions: Vec::new(),
            permissions: PermissionSet::default(),
            created_at: chrono::Utc::now(),
        }
    }

    /// The bot's state over real JSON stores in a temp dir and a fake platform.
    pub struct Harness {
        pub platform: Arc<FakePlatform>,
        pub data: Data,
        pub context: Arc<BotContext>,
        _dir: TempDir,
    }

    impl Harness {
        pub fn new() -> Self {
            Self::with_config(BotConfig {
                mod_log_channel_id: Some(MOD_LOG),
                ..BotConfig::default()
            })
        }

        pub fn with_config(config: BotConfig) -> Self {
            Self::in_dir(tempfile::tempdir().unwrap(), config)
        }

        /// Open the stores in `dir`, which may already hold documents.
        pub fn in_dir(dir: TempDir, config: BotConfig) -> Self {
            let platform = Arc::new(FakePlatform::new());
            let shared: Arc<dyn Platform> = platform.clone();
            let leveling = JsonCounterStore::open(dir.path(), Namespace::Leveling);
            let economy = JsonCounterStore::open(dir.path(), Namespace::Economy);
            let context = Arc::new(BotContext {
                config: Arc::new(config),
                leveling: Arc::new(LevelingService::new(leveling)),
                economy: Arc::new(EconomyService::new(economy)),
                giveaways: Arc::new(GiveawayScheduler::new(Arc::clone(&shared))),
            });
            let data = Data::new(Arc::clone(&context), build_registry().unwrap(), shared);
            Self {
                platform,
                data,
                context,
                _dir: dir,
            }
        }

        pub async fn run(&self, content: &str, permissions: &[Permission]) -> DispatchOutcome {
            self.run_with_mentions(content, permissions, Vec::new())
                .await
        }

        pub async fn run_with_mentions(
            &self,
            content: &str,
            permissions: &[Permission],
            mentions: Vec<u64>,
        ) -> DispatchOutcome {
            let invocation = Invocation {
                mentions,
                permissions: PermissionSet::new(permissions.iter().copied()),
                ..invocation(content)
            };
            self.data.dispatcher.dispatch(&invocation).await
        }
    }
}
