//! MCP server implementation.

use std::sync::Arc;

use alloy::primitives::Address;
use rmcp::{
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{Implementation, ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use serde::Serialize;

use crate::{
    config::Config,
    error::AppError,
    ethereum::{constants::ETHEREUM_MAINNET_CHAIN_ID, ChainProvider, InjectedWallet, LocalWallet},
    services::{
        token_list::DEFAULT_CACHE_TTL, ApprovalService, TokenDataService, TokenList, TokenLookup,
        TokenMetric,
    },
    session::{ConnectionState, SessionStore},
    types::{ApprovalStatus, Token, TransactionRecord},
};

/// Swap widget MCP server.
///
/// Exposes the wallet session, token figures and router approvals as tools.
#[derive(Clone)]
pub struct SwapWidgetServer {
    store: SessionStore,
    token_data: TokenDataService,
    approvals: ApprovalService,
    tokens: Arc<TokenList>,
    tool_router: ToolRouter<Self>,
}

impl SwapWidgetServer {
    /// Create the server with a local-key wallet.
    ///
    /// No network calls are made here; the wallet is only asked for accounts
    /// when `connect_wallet` is invoked.
    pub fn new(config: Config) -> Result<Self, AppError> {
        let wallet = LocalWallet::from_private_key(&config.private_key, &config.rpc_url)?;
        Self::with_wallet(&config, Arc::new(wallet))
    }

    /// Create the server around an already constructed wallet.
    pub fn with_wallet(config: &Config, wallet: Arc<dyn InjectedWallet>) -> Result<Self, AppError> {
        tracing::info!("Initializing swap widget MCP server");

        let store = SessionStore::new(wallet);
        let tokens = TokenList::with_options(
            ETHEREUM_MAINNET_CHAIN_ID,
            config.token_list_url.clone(),
            DEFAULT_CACHE_TTL,
        )?;

        Ok(Self::from_parts(store, Arc::new(tokens), config.router))
    }

    /// Assemble the server from an existing store and token list.
    pub fn from_parts(store: SessionStore, tokens: Arc<TokenList>, router: Address) -> Self {
        tracing::info!(router = %router, "Swap widget MCP server ready");

        Self {
            token_data: TokenDataService::new(store.clone(), router),
            approvals: ApprovalService::new(store.clone(), router),
            store,
            tokens,
            tool_router: Self::tool_router(),
        }
    }

    /// The session store backing the tools.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    async fn wallet_status_snapshot(&self) -> WalletStatus {
        let session = self.store.snapshot();
        let chain_id = match session.provider() {
            Some(provider) if session.is_connected() => provider.chain_id().await.ok(),
            _ => None,
        };

        WalletStatus {
            state: session.state(),
            connected: session.is_connected(),
            address: session.address().filter(|_| session.is_connected()),
            label: session.label(),
            chain_id,
        }
    }

    async fn token_figure(&self, query: &str, metric: TokenMetric) -> Result<String, McpError> {
        let token = self.tokens.resolve(query).await?;
        let owner = self.store.snapshot().wallet().map(|w| w.address);
        let value = self.token_data.display(&token, metric).await;
        let spender = (metric == TokenMetric::Allowance).then(|| self.token_data.router());

        to_json(&TokenFigure { token, metric, owner, spender, value })
    }
}

/// Input naming a single token.
#[derive(Debug, Clone, serde::Deserialize, schemars::JsonSchema)]
pub struct TokenInput {
    /// Token symbol (e.g., "USDC") or contract address (0x...).
    pub token: String,
}

/// Input parameters for the approve_token tool.
#[derive(Debug, Clone, serde::Deserialize, schemars::JsonSchema)]
pub struct ApproveTokenInput {
    /// Token symbol (e.g., "USDC") or contract address (0x...).
    pub token: String,
    /// Amount to approve (human-readable, e.g., "1.5").
    pub amount: String,
}

/// Connection summary returned by the wallet tools.
#[derive(Debug, Clone, Serialize)]
pub struct WalletStatus {
    pub state: ConnectionState,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    /// Connect button text.
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
}

/// A balance or allowance reading.
#[derive(Debug, Clone, Serialize)]
pub struct TokenFigure {
    pub token: Token,
    pub metric: TokenMetric,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spender: Option<Address>,
    /// Human-readable value; "0" when unavailable.
    pub value: String,
}

/// Result of the approve_token tool.
#[derive(Debug, Clone, Serialize)]
pub struct ApprovalOutcome {
    pub token: Token,
    pub spender: Address,
    pub amount: String,
    #[serde(flatten)]
    pub status: ApprovalStatus,
}

fn to_json<T: Serialize>(value: &T) -> Result<String, McpError> {
    serde_json::to_string_pretty(value).map_err(|e| McpError::internal_error(e.to_string(), None))
}

#[tool_router]
impl SwapWidgetServer {
    /// Connect the injected wallet.
    #[tool(description = "Connect the wallet and return the session status")]
    pub async fn connect_wallet(&self) -> Result<String, McpError> {
        tracing::info!("connect_wallet called");

        self.store.try_connect().await?;
        to_json(&self.wallet_status_snapshot().await)
    }

    /// Disconnect the wallet. Always succeeds.
    #[tool(description = "Disconnect the wallet and clear the session")]
    pub async fn disconnect_wallet(&self) -> Result<String, McpError> {
        tracing::info!("disconnect_wallet called");

        self.store.disconnect();
        to_json(&self.wallet_status_snapshot().await)
    }

    #[tool(description = "Show whether a wallet is connected, its address and chain")]
    pub async fn wallet_status(&self) -> Result<String, McpError> {
        to_json(&self.wallet_status_snapshot().await)
    }

    /// Token balance of the connected wallet.
    ///
    /// Reads "0" when no wallet is connected or the read fails.
    #[tool(description = "Get the connected wallet's balance of an ERC20 token")]
    pub async fn get_balance(
        &self,
        Parameters(input): Parameters<TokenInput>,
    ) -> Result<String, McpError> {
        tracing::info!(token = %input.token, "get_balance called");
        self.token_figure(&input.token, TokenMetric::Balance).await
    }

    /// Allowance granted to the swap router.
    ///
    /// Reads "0" when no wallet is connected or the read fails.
    #[tool(
        description = "Get how much of a token the swap router may spend for the connected wallet"
    )]
    pub async fn get_allowance(
        &self,
        Parameters(input): Parameters<TokenInput>,
    ) -> Result<String, McpError> {
        tracing::info!(token = %input.token, "get_allowance called");
        self.token_figure(&input.token, TokenMetric::Allowance).await
    }

    /// Approve the swap router and wait for confirmation.
    ///
    /// Failures are reported in the returned status, not as tool errors.
    #[tool(
        description = "Approve the swap router to spend an amount of a token; \
                       waits for the transaction to confirm"
    )]
    pub async fn approve_token(
        &self,
        Parameters(input): Parameters<ApproveTokenInput>,
    ) -> Result<String, McpError> {
        tracing::info!(token = %input.token, amount = %input.amount, "approve_token called");

        let token = self.tokens.resolve(&input.token).await?;
        let status = self.approvals.approve(&token, &input.amount).await;

        to_json(&ApprovalOutcome {
            token,
            spender: self.token_data.router(),
            amount: input.amount.trim().to_string(),
            status,
        })
    }

    #[tool(description = "List the most recent transactions, newest first")]
    pub async fn get_transaction_history(&self) -> Result<String, McpError> {
        let history: Vec<TransactionRecord> = self.store.transactions().await;
        to_json(&history)
    }

    #[tool(description = "List the tokens available in the token picker")]
    pub async fn list_tokens(&self) -> Result<String, McpError> {
        to_json(&self.tokens.list_tokens().await)
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for SwapWidgetServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "swap-widget".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Swap widget MCP server. Connect a wallet, read token balances and \
                 router allowances, and approve the router ahead of a swap."
                    .to_string(),
            ),
        }
    }
}
