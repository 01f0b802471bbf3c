// Implementations of the counter store.

#[cfg(test)]
pub mod in_memory;
pub mod json_store;

// Re-export for convenience
pub use json_store::JsonCounterStore;
