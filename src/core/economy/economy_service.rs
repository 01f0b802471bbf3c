// Economy system core - business logic for coin balances.
//
// Following the same pattern as the leveling system, this is platform-agnostic
// with no Discord-specific code. Balances live in their own counter namespace.

use crate::core::counters::{CounterStore, KeyedLocks, StoreError};

// ============================================================================
// DOMAIN MODELS
// ============================================================================

/// Result of a daily claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyClaimResult {
    pub coins_awarded: u64,
    pub new_balance: u64,
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Configuration for the economy system.
#[derive(Debug, Clone)]
pub struct EconomyConfig {
    /// How many coins to award for a daily claim.
    pub daily_reward: u64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self { daily_reward: 100 }
    }
}

// ============================================================================
// CORE SERVICE
// ============================================================================

/// The main service for economy operations.
///
/// Generic over S: CounterStore so we can swap implementations.
pub struct EconomyService<S: CounterStore<u64>> {
    store: S,
    locks: KeyedLocks,
    config: EconomyConfig,
}

impl<S: CounterStore<u64>> EconomyService<S> {
    /// Create a new economy service with the given store.
    #[cfg(test)]
    pub fn new(store: S) -> Self {
        Self::new_with_config(store, EconomyConfig::default())
    }

    /// Create a new economy service with custom configuration.
    pub fn new_with_config(store: S, config: EconomyConfig) -> Self {
        Self {
            store,
            locks: KeyedLocks::new(),
            config,
        }
    }

    /// Get a user's current balance. Users who never earned anything have 0.
    pub async fn balance(&self, user_id: u64) -> Result<u64, StoreError> {
        self.store.get(user_id).await
    }

    /// Claim the daily reward.
    ///
    /// There is no cooldown between claims.
    pub async fn claim_daily(&self, user_id: u64) -> Result<DailyClaimResult, StoreError> {
        let new_balance = self.award_coins(user_id, self.config.daily_reward).await?;
        Ok(DailyClaimResult {
            coins_awarded: self.config.daily_reward,
            new_balance,
        })
    }

    /// Add coins to a balance and return the new balance.
    pub async fn award_coins(&self, user_id: u64, amount: u64) -> Result<u64, StoreError> {
        let _guard = self.locks.lock(user_id).await;

        let balance = self.store.get(user_id).await?.saturating_add(amount);
        self.store.set(user_id, balance).await?;
        Ok(balance)
    }

    pub async fn flush(&self) -> Result<(), StoreError> {
        self.store.flush().await
    }
}
