//! Approval status types.

use alloy::primitives::TxHash;
use serde::Serialize;

/// Outcome of the most recent approval attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ApprovalStatus {
    /// No approval attempted yet.
    #[default]
    Idle,
    /// Approval submitted, waiting for confirmation.
    Pending,
    /// Approval confirmed on-chain.
    Success {
        /// Hash of the confirmed transaction.
        tx_hash: TxHash,
    },
    /// Approval could not be completed.
    Error {
        /// Diagnostic for the failure.
        message: String,
    },
}

impl ApprovalStatus {
    /// Whether an approval is in flight.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Transaction hash of a successful approval.
    pub fn tx_hash(&self) -> Option<TxHash> {
        match self {
            Self::Success { tx_hash } => Some(*tx_hash),
            _ => None,
        }
    }
}
