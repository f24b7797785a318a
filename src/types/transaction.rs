//! Transaction history types.

use alloy::primitives::TxHash;
use serde::Serialize;
use std::time::SystemTime;

/// Kind of transaction recorded in the history panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// ERC20 approval for the router.
    Approval,
    /// Swap through the router.
    Swap,
}

/// One entry of the transaction history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRecord {
    pub kind: TransactionKind,
    /// Transaction hash.
    pub tx_hash: TxHash,
    /// Symbol of the token involved.
    pub token: String,
    /// Human-readable amount.
    pub amount: String,
    /// Unix timestamp (seconds) when the entry was recorded.
    pub timestamp: u64,
}

impl TransactionRecord {
    /// Record a transaction observed now.
    pub fn now(
        kind: TransactionKind,
        tx_hash: TxHash,
        token: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            tx_hash,
            token: token.into(),
            amount: amount.into(),
            timestamp: current_timestamp(),
        }
    }
}

/// Get current Unix timestamp in seconds.
/// Returns 0 if system time is before Unix epoch.
fn current_timestamp() -> u64 {
    SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}
