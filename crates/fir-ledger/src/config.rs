use serde::{Deserialize, Serialize};

/// Configuration for a [`Ledger`](crate::Ledger).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Leading zero hex digits every sealed block hash must carry.
    /// Fixed for the life of the ledger; there is no retargeting.
    pub difficulty: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self { difficulty: 2 }
    }
}

impl LedgerConfig {
    pub fn with_difficulty(difficulty: usize) -> Self {
        Self { difficulty }
    }
}
