//! Ethereum RPC client.

use alloy::{
    network::{EthereumWallet, ReceiptResponse},
    primitives::{Address, TxHash, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::{
    error::{AppError, Result},
    ethereum::{
        contracts::erc20::IERC20,
        wallet::{AccountSigner, ChainProvider},
    },
};

/// Ethereum RPC client wrapper with lazy initialization.
#[derive(Clone)]
pub struct EthereumClient {
    /// The underlying provider, with the wallet filler attached.
    provider: DynProvider,
    /// RPC URL for logging.
    rpc_url: String,
    /// Lazily initialized chain ID.
    chain_id: Arc<OnceCell<u64>>,
}

impl EthereumClient {
    /// Create a client that signs transactions with `signer`.
    ///
    /// Note: This does NOT make any network calls. The connection is
    /// established lazily when the first operation is performed.
    pub fn with_signer(rpc_url: &str, signer: PrivateKeySigner) -> Result<Self> {
        let url: reqwest::Url = rpc_url
            .parse()
            .map_err(|_| AppError::Config(format!("Invalid RPC URL: {}", rpc_url)))?;

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url)
            .erased();

        tracing::debug!(rpc_url = %rpc_url, "Ethereum client created (lazy initialization)");

        Ok(Self {
            provider,
            rpc_url: rpc_url.to_string(),
            chain_id: Arc::new(OnceCell::new()),
        })
    }

    /// Get the RPC endpoint this client talks to.
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    fn erc20(&self, token: Address) -> IERC20::IERC20Instance<DynProvider> {
        IERC20::new(token, self.provider.clone())
    }
}

#[async_trait]
impl ChainProvider for EthereumClient {
    /// Get the chain ID (fetches from network on first call).
    async fn chain_id(&self) -> Result<u64> {
        self.chain_id
            .get_or_try_init(|| async {
                let chain_id = self.provider.get_chain_id().await?;
                tracing::info!(
                    chain_id = chain_id,
                    rpc_url = %self.rpc_url,
                    "Connected to Ethereum node"
                );
                Ok(chain_id)
            })
            .await
            .copied()
    }
}

/// Signer handle for one account on top of an [`EthereumClient`].
#[derive(Clone)]
pub struct ClientSigner {
    client: Arc<EthereumClient>,
    address: Address,
}

impl ClientSigner {
    /// Bind `address` to the client's wallet filler.
    pub fn new(client: Arc<EthereumClient>, address: Address) -> Self {
        Self { client, address }
    }
}

#[async_trait]
impl AccountSigner for ClientSigner {
    async fn address(&self) -> Result<Address> {
        Ok(self.address)
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        tracing::debug!(token = %token, owner = %owner, spender = %spender, "Querying allowance");

        self.client
            .erc20(token)
            .allowance(owner, spender)
            .call()
            .await
            .map_err(|e| AppError::FetchFailed(e.to_string()))
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256> {
        tracing::debug!(token = %token, owner = %owner, "Querying ERC20 balance");

        self.client
            .erc20(token)
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| AppError::FetchFailed(e.to_string()))
    }

    async fn approve(&self, token: Address, spender: Address, value: U256) -> Result<TxHash> {
        tracing::info!(token = %token, spender = %spender, value = %value, "Sending approve");

        let pending = self
            .client
            .erc20(token)
            .approve(spender, value)
            .from(self.address)
            .send()
            .await
            .map_err(|e| AppError::ApprovalFailed(e.to_string()))?;

        let tx_hash = *pending.tx_hash();
        tracing::debug!(tx_hash = %tx_hash, "Approve submitted, waiting for receipt");

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| AppError::ApprovalFailed(e.to_string()))?;

        if !ReceiptResponse::status(&receipt) {
            return Err(AppError::ApprovalFailed(format!("transaction {} reverted", tx_hash)));
        }

        Ok(receipt.transaction_hash)
    }
}
