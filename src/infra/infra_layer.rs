// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "counters/counter_stores.rs"]
pub mod counters;
