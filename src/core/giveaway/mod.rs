// Giveaway module - timed draws over reaction entrants.

pub mod draw;
mod giveaway_service;

pub use draw::parse_duration;
pub use giveaway_service::{GiveawayError, GiveawayRequest, GiveawayScheduler};
