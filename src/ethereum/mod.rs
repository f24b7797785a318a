//! Ethereum interaction module.
//!
//! Contains the RPC client, the injected wallet seam, and contract bindings.

pub mod client;
pub mod constants;
pub mod contracts;
pub mod wallet;

pub use client::{ClientSigner, EthereumClient};
pub use wallet::{
    AccountSigner, ChainMonitor, ChainProvider, InjectedWallet, LocalWallet, ProviderHandle,
    SignerHandle, WalletEvent, WalletHandles, CHAIN_POLL_INTERVAL,
};
