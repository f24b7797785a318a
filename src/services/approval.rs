//! Router approval service.

use std::sync::Arc;

use alloy::primitives::{Address, TxHash};
use tokio::sync::watch;

use crate::{
    error::{AppError, Result},
    ethereum::AccountSigner,
    session::{ConnectedWallet, SessionStore},
    types::{parse_units, ApprovalStatus, Token, TransactionKind, TransactionRecord},
};

/// Submits `approve(router, amount)` for the connected account.
///
/// Each attempt goes Pending -> Success | Error. There is no retry; a failed
/// approval needs another call.
#[derive(Clone)]
pub struct ApprovalService {
    store: SessionStore,
    router: Address,
    status: Arc<watch::Sender<ApprovalStatus>>,
}

impl ApprovalService {
    /// Create a service approving `router` as spender.
    pub fn new(store: SessionStore, router: Address) -> Self {
        let (status, _) = watch::channel(ApprovalStatus::Idle);
        Self { store, router, status: Arc::new(status) }
    }

    /// Status of the latest attempt.
    pub fn status(&self) -> ApprovalStatus {
        self.status.borrow().clone()
    }

    /// Receiver notified on every status transition.
    pub fn subscribe(&self) -> watch::Receiver<ApprovalStatus> {
        self.status.subscribe()
    }

    /// Approve the router to spend `amount` of `token` and wait for confirmation.
    pub async fn approve(&self, token: &Token, amount: &str) -> ApprovalStatus {
        let Some(wallet) = self.store.snapshot().wallet() else {
            tracing::error!(token = %token.symbol, "Wallet not connected");
            return self.finish(Err(AppError::NotConnected));
        };

        tracing::info!(
            token = %token.symbol,
            amount = %amount,
            spender = %self.router,
            "Approving..."
        );
        self.status.send_replace(ApprovalStatus::Pending);

        let result = self.submit(&wallet, token, amount).await;

        match &result {
            Ok(tx_hash) => {
                tracing::info!(token = %token.symbol, tx_hash = %tx_hash, "Token approved");
                self.store
                    .add_transaction(TransactionRecord::now(
                        TransactionKind::Approval,
                        *tx_hash,
                        token.symbol.clone(),
                        amount.trim(),
                    ))
                    .await;
            }
            Err(e) => tracing::error!(token = %token.symbol, error = %e, "Approval failed"),
        }

        self.finish(result)
    }

    async fn submit(
        &self,
        wallet: &ConnectedWallet,
        token: &Token,
        amount: &str,
    ) -> Result<TxHash> {
        let value = parse_units(amount, token.decimals)?;
        wallet.signer.approve(token.address, self.router, value).await
    }

    fn finish(&self, result: Result<TxHash>) -> ApprovalStatus {
        let status = match result {
            Ok(tx_hash) => ApprovalStatus::Success { tx_hash },
            Err(e) => ApprovalStatus::Error { message: e.to_string() },
        };
        self.status.send_replace(status.clone());
        status
    }
}
