// This is the leveling module - it contains the business logic for XP and levels.
// Notice how this module has NO Discord-specific code (no serenity, no poise imports).
// It works with primitive types (u64) and the CounterStore port.

use crate::core::counters::{CounterStore, KeyedLocks, StoreError};
use serde::{Deserialize, Serialize};

// ============================================================================
// DOMAIN MODELS
// ============================================================================

/// A user's progress within their current level.
///
/// `xp` is the XP earned since reaching `level`, not a lifetime total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRecord {
    pub xp: u64,
    pub level: u32,
}

/// Represents when a user levels up.
/// This is returned by the service so the Discord layer can announce it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelUpEvent {
    pub user_id: u64,
    pub new_level: u32,
    /// XP carried over into the new level.
    pub carried_xp: u64,
}

/// What the `level` command shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelProgress {
    pub level: u32,
    pub xp: u64,
    pub next_threshold: u64,
}

/// XP awarded for each qualifying message.
pub const XP_PER_MESSAGE: u64 = 10;

/// XP needed to step into `level` from the level below it.
///
/// `5 * level^2 + 50 * level + 100`
pub fn xp_threshold(level: u32) -> u64 {
    let level = u64::from(level);
    5 * level * level + 50 * level + 100
}

/// Apply an XP gain to a record.
///
/// At most one level is granted per call. Leftover XP carries into the new
/// level without being checked against the following threshold.
pub fn apply_xp(record: &mut LevelRecord, gained: u64) -> bool {
    record.xp = record.xp.saturating_add(gained);
    let threshold = xp_threshold(record.level + 1);
    if record.xp >= threshold {
        record.level += 1;
        record.xp -= threshold;
        true
    } else {
        false
    }
}

// ============================================================================
// CORE SERVICE
// ============================================================================

/// The main service for leveling operations.
///
/// **Generic over S: CounterStore**
/// The service doesn't care if records live in a JSON file or in memory.
pub struct LevelingService<S: CounterStore<LevelRecord>> {
    store: S,
    locks: KeyedLocks,
    xp_per_message: u64,
}

impl<S: CounterStore<LevelRecord>> LevelingService<S> {
    pub fn new(store: S) -> Self {
        Self::with_xp_per_message(store, XP_PER_MESSAGE)
    }

    pub fn with_xp_per_message(store: S, xp_per_message: u64) -> Self {
        Self {
            store,
            locks: KeyedLocks::new(),
            xp_per_message,
        }
    }

    /// Award XP for a message from a human sender.
    ///
    /// **Returns:**
    /// - `Ok(Some(LevelUpEvent))` if the user leveled up
    /// - `Ok(None)` if XP was awarded but no level up occurred
    /// - `Err(...)` if the record could not be persisted
    ///
    /// The record is written back after every message, level up or not.
    pub async fn process_message(&self, user_id: u64) -> Result<Option<LevelUpEvent>, StoreError> {
        let _guard = self.locks.lock(user_id).await;

        let mut record = self.store.get(user_id).await?;
        let leveled_up = apply_xp(&mut record, self.xp_per_message);
        self.store.set(user_id, record).await?;

        Ok(leveled_up.then(|| LevelUpEvent {
            user_id,
            new_level: record.level,
            carried_xp: record.xp,
        }))
    }

    /// Get a user's current level and how far they are from the next one.
    pub async fn progress(&self, user_id: u64) -> Result<LevelProgress, StoreError> {
        let record = self.store.get(user_id).await?;
        Ok(LevelProgress {
            level: record.level,
            xp: record.xp,
            next_threshold: xp_threshold(record.level + 1),
        })
    }

    pub async fn flush(&self) -> Result<(), StoreError> {
        self.store.flush().await
    }
}

// ============================================================================
// TESTS
// ============================================================================
