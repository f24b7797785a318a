//! Bounded transaction history.

use std::collections::VecDeque;

use crate::types::TransactionRecord;

/// Maximum number of entries kept in the history.
pub const MAX_TX_HISTORY: usize = 10;

/// Most recent transactions, newest first.
#[derive(Debug, Clone, Default)]
pub struct TxHistory {
    entries: VecDeque<TransactionRecord>,
}

impl TxHistory {
    /// Record a transaction at the front, dropping the oldest beyond the limit.
    pub fn push(&mut self, record: TransactionRecord) {
        self.entries.push_front(record);
        self.entries.truncate(MAX_TX_HISTORY);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries, newest first.
    pub fn to_vec(&self) -> Vec<TransactionRecord> {
        self.entries.iter().cloned().collect()
    }
}
