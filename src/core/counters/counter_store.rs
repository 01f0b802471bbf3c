// Counter storage - the port for per-user persistent numbers.
//
// Leveling and economy both keep one small record per user. They share the
// same store contract but live in separate namespaces so a user id in one can
// never clobber the other.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// ============================================================================
// NAMESPACES
// ============================================================================

/// An isolated key space inside the counter store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Leveling,
    Economy,
}

impl Namespace {
    /// The document each namespace is persisted to.
    pub fn file_name(self) -> &'static str {
        match self {
            Namespace::Leveling => "levels.json",
            Namespace::Economy => "economy.json",
        }
    }
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

/// Trait for persisting one namespace of per-user records.
#[async_trait]
pub trait CounterStore<R>: Send + Sync {
    /// Get a user's record. Returns the default record if the user has none;
    /// nothing is written until the first `set`.
    async fn get(&self, user_id: u64) -> Result<R, StoreError>;

    /// Replace a user's record and write the whole namespace through to disk.
    async fn set(&self, user_id: u64, record: R) -> Result<(), StoreError>;

    /// Rewrite the namespace to durable storage.
    async fn flush(&self) -> Result<(), StoreError>;
}

// ============================================================================
// PER-USER SERIALIZATION
// ============================================================================

/// One async mutex per user id.
///
/// Services hold the guard across their get -> modify -> set sequence so two
/// near-simultaneous events for the same user can't lose an update. Entries
/// are never pruned; the map grows with the number of distinct users seen.
#[derive(Default)]
pub struct KeyedLocks {
    locks: DashMap<u64, Arc<Mutex<()>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, key: u64) -> OwnedMutexGuard<()> {
        let lock = Arc::clone(self.locks.entry(key).or_default().value());
        lock.lock_owned().await
    }
}
