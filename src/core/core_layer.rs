// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "platform/mod.rs"]
pub mod platform;

#[path = "counters/mod.rs"]
pub mod counters;

#[path = "commands/mod.rs"]
pub mod commands;

#[path = "leveling/leveling_service.rs"]
pub mod leveling;

#[path = "economy/mod.rs"]
pub mod economy;

#[path = "reaction_roles/mod.rs"]
pub mod reaction_roles;

#[path = "giveaway/mod.rs"]
pub mod giveaway;

#[path = "config/bot_config.rs"]
pub mod config;
