//! Common utilities for integration tests.
//!
//! Provides an in-memory injected wallet whose token state lives in a shared
//! ledger, so tests can drive wallet events and inspect chain calls.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

use alloy::primitives::{address, Address, TxHash, U256};
use async_trait::async_trait;
use tokio::sync::{broadcast, watch, Notify};

use swap_widget::{
    ethereum::{AccountSigner, ChainProvider, WalletHandles},
    services::TokenList,
    types::Token,
    AppError, Config, InjectedWallet, Result, Session, SwapWidgetServer, WalletEvent,
    USDC_ADDRESS, WETH_ADDRESS,
};

/// First Hardhat account.
pub const ALICE: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
/// Second Hardhat account.
pub const BOB: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");

pub fn usdc() -> Token {
    Token::new(USDC_ADDRESS, "USDC", "USD Coin", 6)
}

pub fn weth() -> Token {
    Token::new(WETH_ADDRESS, "WETH", "Wrapped Ether", 18)
}

/// Token state shared by every signer the mock wallet hands out.
#[derive(Default)]
pub struct MockLedger {
    balances: Mutex<HashMap<(Address, Address), U256>>,
    allowances: Mutex<HashMap<(Address, Address, Address), U256>>,
    pub approvals: Mutex<Vec<(Address, Address, U256)>>,
    pub reads: AtomicUsize,
    pub fail_reads: AtomicBool,
    pub fail_approvals: AtomicBool,
    /// When set, approvals wait for a notification before confirming.
    pub approval_gate: Mutex<Option<Arc<Notify>>>,
    next_tx: AtomicU64,
}

impl MockLedger {
    pub fn set_balance(&self, token: Address, owner: Address, value: U256) {
        self.balances.lock().unwrap().insert((token, owner), value);
    }

    pub fn set_allowance(&self, token: Address, owner: Address, spender: Address, value: U256) {
        self.allowances.lock().unwrap().insert((token, owner, spender), value);
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

pub struct MockChain {
    chain_id: u64,
}

#[async_trait]
impl ChainProvider for MockChain {
    async fn chain_id(&self) -> Result<u64> {
        Ok(self.chain_id)
    }
}

pub struct MockSigner {
    address: Address,
    ledger: Arc<MockLedger>,
}

#[async_trait]
impl AccountSigner for MockSigner {
    async fn address(&self) -> Result<Address> {
        Ok(self.address)
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        self.ledger.reads.fetch_add(1, Ordering::SeqCst);
        if self.ledger.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::FetchFailed("execution reverted".to_string()));
        }
        let allowances = self.ledger.allowances.lock().unwrap();
        Ok(allowances.get(&(token, owner, spender)).copied().unwrap_or_default())
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256> {
        self.ledger.reads.fetch_add(1, Ordering::SeqCst);
        if self.ledger.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::FetchFailed("execution reverted".to_string()));
        }
        let balances = self.ledger.balances.lock().unwrap();
        Ok(balances.get(&(token, owner)).copied().unwrap_or_default())
    }

    async fn approve(&self, token: Address, spender: Address, value: U256) -> Result<TxHash> {
        let gate = self.ledger.approval_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.ledger.fail_approvals.load(Ordering::SeqCst) {
            return Err(AppError::ApprovalFailed("user denied transaction signature".to_string()));
        }

        self.ledger.approvals.lock().unwrap().push((token, spender, value));
        self.ledger.set_allowance(token, self.address, spender, value);

        let n = self.ledger.next_tx.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(TxHash::with_last_byte(n as u8))
    }
}

/// Injected wallet held entirely in memory.
pub struct MockWallet {
    pub ledger: Arc<MockLedger>,
    accounts: Mutex<Vec<Address>>,
    chain_id: AtomicU64,
    pub reject: AtomicBool,
    pub opens: AtomicUsize,
    events: broadcast::Sender<WalletEvent>,
}

impl MockWallet {
    pub fn new(accounts: Vec<Address>) -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            ledger: Arc::new(MockLedger::default()),
            accounts: Mutex::new(accounts),
            chain_id: AtomicU64::new(1),
            reject: AtomicBool::new(false),
            opens: AtomicUsize::new(0),
            events,
        })
    }

    pub fn listener_count(&self) -> usize {
        self.events.receiver_count()
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Change the linked accounts and notify listeners.
    pub fn set_accounts(&self, accounts: Vec<Address>) {
        *self.accounts.lock().unwrap() = accounts.clone();
        let _ = self.events.send(WalletEvent::AccountsChanged(accounts));
    }

    /// Switch networks and notify listeners.
    pub fn set_chain(&self, chain_id: u64) {
        self.chain_id.store(chain_id, Ordering::SeqCst);
        let _ = self.events.send(WalletEvent::ChainChanged(chain_id));
    }
}

#[async_trait]
impl InjectedWallet for MockWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>> {
        if self.reject.load(Ordering::SeqCst) {
            return Err(AppError::ConnectFailed("User rejected the request.".to_string()));
        }
        Ok(self.accounts.lock().unwrap().clone())
    }

    async fn open(&self) -> Result<WalletHandles> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let address = self.accounts.lock().unwrap().first().copied().unwrap_or(Address::ZERO);

        Ok(WalletHandles {
            provider: Arc::new(MockChain { chain_id: self.chain_id.load(Ordering::SeqCst) }),
            signer: Arc::new(MockSigner { address, ledger: self.ledger.clone() }),
        })
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<WalletEvent>> {
        Some(self.events.subscribe())
    }
}

/// Wait for the next session change, failing the test after one second.
pub async fn next_session(rx: &mut watch::Receiver<Session>) -> Session {
    tokio::time::timeout(Duration::from_secs(1), rx.changed())
        .await
        .expect("timed out waiting for session change")
        .expect("session store dropped");
    rx.borrow_and_update().clone()
}

/// Token list that never touches the network.
pub fn fixed_tokens() -> Arc<TokenList> {
    Arc::new(TokenList::fixed(1, vec![usdc(), weth()]).unwrap())
}

/// Helper to create a live server from environment variables.
pub fn create_live_server() -> Option<SwapWidgetServer> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let rpc_url = std::env::var("ETHEREUM_RPC_URL").ok()?;
    let private_key = std::env::var("ETHEREUM_PRIVATE_KEY").ok()?;

    if rpc_url.is_empty() || private_key.is_empty() {
        return None;
    }

    let config = Config {
        rpc_url,
        private_key,
        router: swap_widget::DEFAULT_SWAP_ROUTER,
        token_list_url: swap_widget::services::token_list::UNISWAP_TOKEN_LIST_URL.to_string(),
        log_level: "warn".to_string(),
    };

    SwapWidgetServer::new(config).ok()
}

/// Skip test if the live server cannot be created (missing env vars).
#[macro_export]
macro_rules! skip_if_no_server {
    () => {
        match common::create_live_server() {
            Some(server) => server,
            None => {
                eprintln!("Skipping test: ETHEREUM_RPC_URL or ETHEREUM_PRIVATE_KEY not set");
                return;
            }
        }
    };
}
