// Economy module - domain logic for the coin balance system

mod economy_service;

pub use economy_service::{EconomyConfig, EconomyService};
