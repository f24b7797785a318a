//! Balance and allowance reads for the connected wallet.

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, Result},
    ethereum::AccountSigner,
    session::SessionStore,
    types::{format_units, parse_units, Token},
};

/// Display value used whenever a read cannot produce one.
pub const ZERO_DISPLAY: &str = "0";

/// Which token figure a read produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenMetric {
    /// `balanceOf(owner)`.
    Balance,
    /// `allowance(owner, router)`.
    Allowance,
}

impl std::fmt::Display for TokenMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Balance => f.write_str("balance"),
            Self::Allowance => f.write_str("allowance"),
        }
    }
}

/// Reads token figures through the session's signer.
///
/// Every read is keyed by (token, current session). Without a connected
/// wallet no call is made.
#[derive(Clone)]
pub struct TokenDataService {
    store: SessionStore,
    router: Address,
}

impl TokenDataService {
    /// Create a service approving and querying against `router`.
    pub fn new(store: SessionStore, router: Address) -> Self {
        Self { store, router }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// The spender every allowance is checked against.
    pub fn router(&self) -> Address {
        self.router
    }

    /// Raw figure for the connected account.
    pub async fn fetch(&self, token: &Token, metric: TokenMetric) -> Result<U256> {
        let wallet = self.store.snapshot().wallet().ok_or(AppError::NotConnected)?;

        match metric {
            TokenMetric::Balance => wallet.signer.balance_of(token.address, wallet.address).await,
            TokenMetric::Allowance => {
                wallet.signer.allowance(token.address, wallet.address, self.router).await
            }
        }
    }

    /// Decimal-formatted figure; `"0"` when disconnected or on any error.
    pub async fn display(&self, token: &Token, metric: TokenMetric) -> String {
        match self.fetch(token, metric).await {
            Ok(value) => format_units(value, token.decimals),
            Err(AppError::NotConnected) => {
                tracing::debug!(token = %token.symbol, metric = %metric, "No wallet connected");
                ZERO_DISPLAY.to_string()
            }
            Err(e) => {
                tracing::error!(
                    token = %token.symbol,
                    metric = %metric,
                    error = %e,
                    "Error fetching token data"
                );
                ZERO_DISPLAY.to_string()
            }
        }
    }

    /// Token balance of the connected account.
    pub async fn balance(&self, token: &Token) -> String {
        self.display(token, TokenMetric::Balance).await
    }

    /// Allowance the connected account granted the router.
    pub async fn allowance(&self, token: &Token) -> String {
        self.display(token, TokenMetric::Allowance).await
    }

    /// Whether `amount` exceeds the current allowance.
    pub async fn needs_approval(&self, token: &Token, amount: &str) -> Result<bool> {
        let wanted = parse_units(amount, token.decimals)?;
        let granted = self.fetch(token, TokenMetric::Allowance).await?;
        Ok(granted < wanted)
    }
}
