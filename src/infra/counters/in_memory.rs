// In-memory implementation of CounterStore.
//
// Nothing is durable here; it exists so the services can be tested without
// touching the filesystem. Same contract as the JSON store.

use crate::core::counters::{CounterStore, StoreError};
use async_trait::async_trait;
use dashmap::DashMap;

pub struct InMemoryCounterStore<R> {
    /// Maps user_id -> record
    data: DashMap<u64, R>,
}

impl<R> InMemoryCounterStore<R> {
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
        }
    }

    /// Number of users with a stored record.
    pub fn len(&self) -> usize {
        self.data.len()
    }
}

#[async_trait]
impl<R> CounterStore<R> for InMemoryCounterStore<R>
where
    R: Default + Clone + Send + Sync,
{
    async fn get(&self, user_id: u64) -> Result<R, StoreError> {
        Ok(self
            .data
            .get(&user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }

    async fn set(&self, user_id: u64, record: R) -> Result<(), StoreError> {
        self.data.insert(user_id, record);
        Ok(())
    }

    async fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
