//! Injected wallet capability and the local-key wallet backend.

use std::sync::Arc;
use std::time::Duration;

use alloy::{
    primitives::{Address, TxHash, U256},
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;
use tokio::{
    sync::broadcast,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

use crate::{
    error::Result,
    ethereum::client::{ClientSigner, EthereumClient},
};

/// Capacity of the wallet event channel.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// How often the local wallet polls its endpoint for the chain ID.
pub const CHAIN_POLL_INTERVAL: Duration = Duration::from_secs(12);

/// Read access to the chain the wallet is pointed at.
#[async_trait]
pub trait ChainProvider: Send + Sync {
    /// Chain ID of the connected network.
    async fn chain_id(&self) -> Result<u64>;
}

/// Capability bound to one account, used for token reads and approvals.
#[async_trait]
pub trait AccountSigner: Send + Sync {
    /// Address of the account this signer authorizes for.
    async fn address(&self) -> Result<Address>;

    /// ERC20 `allowance(owner, spender)`.
    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256>;

    /// ERC20 `balanceOf(owner)`.
    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256>;

    /// ERC20 `approve(spender, value)`, resolved once the receipt is available.
    async fn approve(&self, token: Address, spender: Address, value: U256) -> Result<TxHash>;
}

/// Shared provider handle held by the session.
pub type ProviderHandle = Arc<dyn ChainProvider>;

/// Shared signer handle held by the session.
pub type SignerHandle = Arc<dyn AccountSigner>;

/// Provider and signer derived together from the injected wallet.
#[derive(Clone)]
pub struct WalletHandles {
    pub provider: ProviderHandle,
    pub signer: SignerHandle,
}

/// Events pushed by the wallet outside of any request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    /// The set of linked accounts changed; empty means the wallet was locked or revoked.
    AccountsChanged(Vec<Address>),
    /// The wallet moved to another network.
    ChainChanged(u64),
}

/// The injected wallet provider.
#[async_trait]
pub trait InjectedWallet: Send + Sync {
    /// Ask the wallet for account access (`eth_requestAccounts`).
    async fn request_accounts(&self) -> Result<Vec<Address>>;

    /// Derive a fresh provider and signer from the wallet.
    async fn open(&self) -> Result<WalletHandles>;

    /// Subscribe to wallet events, if the wallet supports them.
    fn subscribe(&self) -> Option<broadcast::Receiver<WalletEvent>>;
}

/// Wallet backed by a local private key and a JSON-RPC endpoint.
///
/// The key is always unlocked, so the wallet never reports an empty account
/// list. `ChainChanged` is emitted by [`LocalWallet::monitor_chain`] when the
/// endpoint starts answering for a different chain.
pub struct LocalWallet {
    /// The local signer.
    signer: PrivateKeySigner,
    /// Wallet address.
    address: Address,
    /// Endpoint used when deriving providers.
    rpc_url: String,
    /// Outgoing wallet events.
    events: broadcast::Sender<WalletEvent>,
}

impl LocalWallet {
    /// Create a wallet from a private key string and an RPC endpoint.
    pub fn from_private_key(private_key: &str, rpc_url: &str) -> Result<Self> {
        // Remove 0x prefix if present
        let key = private_key.trim().strip_prefix("0x").unwrap_or(private_key.trim());

        let signer: PrivateKeySigner = key.parse()?;

        let address = signer.address();
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        tracing::info!(address = %address, "Wallet initialized");

        Ok(Self { signer, address, rpc_url: rpc_url.to_string(), events })
    }

    /// Get the wallet address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Number of live event subscriptions.
    pub fn listener_count(&self) -> usize {
        self.events.receiver_count()
    }

    /// Poll the endpoint's chain ID every `interval` and emit `ChainChanged`
    /// when it moves. Polling stops when the returned monitor is dropped.
    pub fn monitor_chain(self: Arc<Self>, interval: Duration) -> ChainMonitor {
        let task = tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut last = None;

            loop {
                ticker.tick().await;
                match self.fetch_chain_id().await {
                    Ok(chain_id) => self.observe_chain(&mut last, chain_id),
                    Err(e) => tracing::warn!(error = %e, "Failed to poll chain ID"),
                }
            }
        });

        tracing::debug!(interval = ?interval, "Chain monitor started");
        ChainMonitor { task }
    }

    async fn fetch_chain_id(&self) -> Result<u64> {
        // A fresh client each time; `EthereumClient` caches the chain ID.
        EthereumClient::with_signer(&self.rpc_url, self.signer.clone())?.chain_id().await
    }

    /// Record a polled chain ID, emitting `ChainChanged` if it differs from
    /// the previous one.
    fn observe_chain(&self, last: &mut Option<u64>, chain_id: u64) {
        match last.replace(chain_id) {
            Some(previous) if previous != chain_id => {
                tracing::info!(from = previous, to = chain_id, "Endpoint chain changed");
                self.emit(WalletEvent::ChainChanged(chain_id));
            }
            _ => {}
        }
    }

    fn emit(&self, event: WalletEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("Wallet event dropped: no listeners");
        }
    }
}

/// Owns the chain polling task. Dropping it stops polling.
pub struct ChainMonitor {
    task: JoinHandle<()>,
}

impl Drop for ChainMonitor {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[async_trait]
impl InjectedWallet for LocalWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>> {
        Ok(vec![self.address])
    }

    async fn open(&self) -> Result<WalletHandles> {
        let client = Arc::new(EthereumClient::with_signer(&self.rpc_url, self.signer.clone())?);
        let signer = ClientSigner::new(client.clone(), self.address);

        Ok(WalletHandles { provider: client, signer: Arc::new(signer) })
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<WalletEvent>> {
        Some(self.events.subscribe())
    }
}

impl std::fmt::Debug for LocalWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalWallet").field("address", &self.address).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::AppError,
        ethereum::constants::{ETHEREUM_MAINNET_CHAIN_ID, SEPOLIA_CHAIN_ID},
    };

    // Well-known Hardhat/Foundry test key. DO NOT use in production!
    const TEST_PRIVATE_KEY: &str =
        "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_RPC_URL: &str = "http://127.0.0.1:8545";

    #[test]
    fn test_wallet_from_private_key() {
        let wallet = LocalWallet::from_private_key(TEST_PRIVATE_KEY, TEST_RPC_URL).unwrap();
        let addr_str = format!("{:?}", wallet.address()).to_lowercase();
        assert_eq!(addr_str, "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266");
    }

    #[test]
    fn test_wallet_invalid_private_key() {
        for key in ["0x1234", "0xZZZZ", ""] {
            match LocalWallet::from_private_key(key, TEST_RPC_URL) {
                Err(AppError::Wallet(msg)) => assert!(!msg.is_empty()),
                other => panic!("Expected Wallet error, got {:?}", other.map(|w| w.address())),
            }
        }
    }

    #[test]
    fn test_wallet_debug_hides_key() {
        let wallet = LocalWallet::from_private_key(TEST_PRIVATE_KEY, TEST_RPC_URL).unwrap();
        let debug_str = format!("{:?}", wallet);
        assert!(debug_str.contains("LocalWallet"));
        assert!(
            !debug_str.contains("ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80")
        );
    }

    #[tokio::test]
    async fn test_request_accounts_returns_own_address() {
        let wallet = LocalWallet::from_private_key(TEST_PRIVATE_KEY, TEST_RPC_URL).unwrap();
        let accounts = wallet.request_accounts().await.unwrap();
        assert_eq!(accounts, vec![wallet.address()]);
    }

    #[tokio::test]
    async fn test_open_derives_signer_for_wallet_address() {
        let wallet = LocalWallet::from_private_key(TEST_PRIVATE_KEY, TEST_RPC_URL).unwrap();
        let handles = wallet.open().await.unwrap();
        assert_eq!(handles.signer.address().await.unwrap(), wallet.address());
    }

    #[tokio::test]
    async fn test_chain_change_is_emitted_only_on_difference() {
        let wallet = LocalWallet::from_private_key(TEST_PRIVATE_KEY, TEST_RPC_URL).unwrap();
        let mut rx = wallet.subscribe().unwrap();
        assert_eq!(wallet.listener_count(), 1);

        let mut last = None;
        wallet.observe_chain(&mut last, ETHEREUM_MAINNET_CHAIN_ID);
        wallet.observe_chain(&mut last, ETHEREUM_MAINNET_CHAIN_ID);
        assert!(rx.try_recv().is_err());

        wallet.observe_chain(&mut last, SEPOLIA_CHAIN_ID);
        assert_eq!(rx.try_recv().unwrap(), WalletEvent::ChainChanged(SEPOLIA_CHAIN_ID));
        assert_eq!(last, Some(SEPOLIA_CHAIN_ID));

        drop(rx);
        assert_eq!(wallet.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_monitor_on_unreachable_endpoint_emits_nothing() {
        let wallet = Arc::new(
            LocalWallet::from_private_key(TEST_PRIVATE_KEY, "http://127.0.0.1:1").unwrap(),
        );
        let mut rx = wallet.subscribe().unwrap();

        let monitor = wallet.clone().monitor_chain(Duration::from_millis(10));
        let received = time::timeout(Duration::from_millis(100), rx.recv()).await;
        assert!(received.is_err());

        drop(monitor);
    }
}
