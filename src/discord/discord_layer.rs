// Discord layer - serenity adapters, gateway events and the text commands.

#[path = "commands/command_catalog.rs"]
pub mod commands;
#[path = "events/event_handler.rs"]
pub mod events;
#[path = "leveling/leveling_announcements.rs"]
pub mod leveling;
#[path = "platform/serenity_platform.rs"]
pub mod platform;

use crate::core::commands::{CommandRegistry, Dispatcher};
use crate::core::platform::Platform;
use crate::core::reaction_roles::ReactionRoleBinder;
use commands::BotContext;
use std::sync::Arc;

pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// State poise hands to the event handler.
pub struct Data {
    pub dispatcher: Arc<Dispatcher<BotContext>>,
    pub bot: Arc<BotContext>,
    pub reaction_roles: Arc<ReactionRoleBinder>,
    pub platform: Arc<dyn Platform>,
}

impl Data {
    /// Wire the dispatcher and the reaction role binder around `bot`.
    pub fn new(
        bot: Arc<BotContext>,
        registry: CommandRegistry<BotContext>,
        platform: Arc<dyn Platform>,
    ) -> Self {
        let dispatcher = Arc::new(Dispatcher::new(
            bot.config.prefix.clone(),
            registry,
            Arc::clone(&bot),
            Arc::clone(&platform),
        ));
        let reaction_roles = Arc::new(ReactionRoleBinder::new(
            bot.config.reaction_roles.clone(),
            Arc::clone(&platform),
        ));

        Self {
            dispatcher,
            bot,
            reaction_roles,
            platform,
        }
    }
}
