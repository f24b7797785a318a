//! Process-wide session store.

use std::sync::Arc;

use alloy::primitives::Address;
use tokio::{
    sync::{broadcast::error::RecvError, watch, RwLock},
    task::JoinHandle,
};
use tracing::{debug, error, info, warn};

use crate::{
    error::{AppError, Result},
    ethereum::{AccountSigner, InjectedWallet, WalletEvent},
    session::{
        history::TxHistory,
        state::{Session, SessionAction},
    },
    types::TransactionRecord,
};

struct StoreInner {
    wallet: Option<Arc<dyn InjectedWallet>>,
    session: watch::Sender<Session>,
    history: RwLock<TxHistory>,
}

/// Shared handle to the wallet session and transaction history.
///
/// Cloning is cheap; every clone observes the same session. The session is
/// only mutated through [`SessionStore::dispatch`].
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<StoreInner>,
}

impl SessionStore {
    /// Create a store bound to an injected wallet.
    pub fn new(wallet: Arc<dyn InjectedWallet>) -> Self {
        Self::build(Some(wallet))
    }

    /// Create a store for an environment with no injected wallet.
    pub fn without_wallet() -> Self {
        Self::build(None)
    }

    fn build(wallet: Option<Arc<dyn InjectedWallet>>) -> Self {
        let (session, _) = watch::channel(Session::default());
        Self {
            inner: Arc::new(StoreInner {
                wallet,
                session,
                history: RwLock::new(TxHistory::default()),
            }),
        }
    }

    /// Copy of the current session.
    pub fn snapshot(&self) -> Session {
        self.inner.session.borrow().clone()
    }

    /// Receiver notified on every session change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.session.subscribe()
    }

    /// Apply an action to the session. Sole mutation entry point.
    pub fn dispatch(&self, action: SessionAction) {
        debug!(action = ?action, "Session action");
        self.inner.session.send_modify(|session| session.apply(action));
    }

    /// Connect the wallet, logging any failure.
    pub async fn connect(&self) {
        if let Err(e) = self.try_connect().await {
            error!(error = %e, "Error connecting wallet");
        }
    }

    /// Request account access and move to Connected.
    ///
    /// On error the session is left untouched.
    pub async fn try_connect(&self) -> Result<Address> {
        let wallet = self.inner.wallet.as_ref().ok_or(AppError::WalletUnavailable)?;

        let accounts = wallet.request_accounts().await.map_err(|e| match e {
            AppError::ConnectFailed(_) => e,
            other => AppError::ConnectFailed(other.to_string()),
        })?;
        if accounts.is_empty() {
            return Err(AppError::ConnectFailed("wallet returned no accounts".to_string()));
        }

        let handles = wallet.open().await?;
        let address = handles.signer.address().await?;

        self.dispatch(SessionAction::Connected {
            address,
            provider: handles.provider,
            signer: handles.signer,
        });
        info!(address = %address, "Wallet connected");

        Ok(address)
    }

    /// Drop the connection.
    pub fn disconnect(&self) {
        self.dispatch(SessionAction::Disconnected);
        info!("Wallet disconnected");
    }

    /// React to an event pushed by the wallet.
    pub async fn handle_event(&self, event: WalletEvent) {
        match event {
            WalletEvent::AccountsChanged(accounts) => match accounts.first() {
                None => {
                    info!("Wallet reported no accounts");
                    self.disconnect();
                }
                Some(&address) => {
                    info!(address = %address, "Wallet account changed");
                    self.dispatch(SessionAction::AccountChanged(address));
                }
            },
            WalletEvent::ChainChanged(chain_id) => {
                let Some(wallet) = self.inner.wallet.as_ref() else {
                    return;
                };
                match wallet.open().await {
                    Ok(handles) => {
                        info!(chain_id = chain_id, "Wallet chain changed");
                        self.dispatch(SessionAction::ChainChanged {
                            provider: handles.provider,
                            signer: handles.signer,
                        });
                    }
                    Err(e) => {
                        warn!(chain_id = chain_id, error = %e, "Failed to re-derive wallet handles")
                    }
                }
            }
        }
    }

    /// Start listening to wallet events.
    ///
    /// Returns `None` when there is no wallet or it does not emit events. The
    /// subscription lives exactly as long as the returned guard.
    pub fn mount(&self) -> Option<ListenerGuard> {
        let wallet = self.inner.wallet.as_ref()?;
        let mut events = wallet.subscribe()?;
        let store = self.clone();

        let task = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => store.handle_event(event).await,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped = skipped, "Wallet listener lagged behind");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!("Wallet listener stopped");
        });

        debug!("Wallet listener mounted");
        Some(ListenerGuard { task })
    }

    /// Record a transaction in the history.
    pub async fn add_transaction(&self, record: TransactionRecord) {
        self.inner.history.write().await.push(record);
    }

    /// Recorded transactions, newest first.
    pub async fn transactions(&self) -> Vec<TransactionRecord> {
        self.inner.history.read().await.to_vec()
    }
}

/// Owns the wallet listener task. Dropping it unsubscribes.
pub struct ListenerGuard {
    task: JoinHandle<()>,
}

impl ListenerGuard {
    /// Stop listening and wait until the subscription is released.
    pub async fn unmount(mut self) {
        self.task.abort();
        let _ = (&mut self.task).await;
        debug!("Wallet listener unmounted");
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.task.abort();
    }
}
