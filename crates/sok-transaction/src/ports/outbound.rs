//! # Outbound Ports (Driven Ports / SPI)
//!
//! Ledger state needed by the validation policy.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Read access to account balances.
///
/// Implementations may be remote or contended; no consistency is assumed
/// between two calls.
#[async_trait]
pub trait BalanceSource: Send + Sync {
    /// Current balance of an address; unknown addresses have balance 0.
    async fn get_balance(&self, address: &str) -> f64;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// In-memory balances for tests.
#[derive(Default)]
pub struct MockBalances {
    balances: RwLock<HashMap<String, f64>>,
}

impl MockBalances {
    /// Empty balance table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance table with one funded address.
    pub fn with_balance(address: impl Into<String>, balance: f64) -> Self {
        let mock = Self::new();
        mock.set_balance(address, balance);
        mock
    }

    /// Overwrite an address balance.
    pub fn set_balance(&self, address: impl Into<String>, balance: f64) {
        self.balances.write().insert(address.into(), balance);
    }
}

#[async_trait]
impl BalanceSource for MockBalances {
    async fn get_balance(&self, address: &str) -> f64 {
        self.balances.read().get(address).copied().unwrap_or(0.0)
    }
}
