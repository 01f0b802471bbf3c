// Counters module - per-user persistent records split by namespace.

mod counter_store;

pub use counter_store::{CounterStore, KeyedLocks, Namespace, StoreError};
