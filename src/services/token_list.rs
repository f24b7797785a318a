//! Token picker backed by a remote token list.
//!
//! Fetches tokens from a tokenlists.org-style endpoint and caches them for
//! lookups by symbol or address. Well-known mainnet tokens are always
//! available, even when the remote list cannot be reached.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use alloy::primitives::Address;
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::{RwLock, Semaphore};
use tracing::{info, warn};

use crate::{
    error::{AppError, Result},
    ethereum::constants::{
        ETHEREUM_MAINNET_CHAIN_ID, UNI_ADDRESS, USDC_ADDRESS, WBTC_ADDRESS, WETH_ADDRESS,
    },
    types::Token,
};

/// Uniswap default token list URL.
pub const UNISWAP_TOKEN_LIST_URL: &str = "https://tokens.uniswap.org";

/// Default cache TTL (24 hours).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(86400);

/// Minimum spacing between refreshes triggered by lookups.
pub const REFRESH_COOLDOWN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Deserialize)]
struct ListedToken {
    #[serde(rename = "chainId")]
    chain_id: u64,
    address: String,
    symbol: String,
    name: String,
    decimals: u8,
}

#[derive(Debug, Clone, Deserialize)]
struct ListResponse {
    tokens: Vec<ListedToken>,
}

/// Token lookups used to turn user input into [`Token`] values.
#[async_trait]
pub trait TokenLookup: Send + Sync {
    /// Find a token by symbol (case-insensitive).
    async fn resolve_symbol(&self, symbol: &str) -> Option<Token>;

    /// Find a token by contract address.
    async fn lookup_address(&self, address: Address) -> Option<Token>;

    /// Resolve a symbol or `0x` address.
    async fn resolve(&self, query: &str) -> Result<Token> {
        let query = query.trim();
        let found = if query.starts_with("0x") || query.starts_with("0X") {
            let address = query
                .parse::<Address>()
                .map_err(|e| AppError::InvalidAddress(format!("{}: {}", query, e)))?;
            self.lookup_address(address).await
        } else {
            self.resolve_symbol(query).await
        };
        found.ok_or_else(|| AppError::TokenNotFound(query.to_string()))
    }
}

struct CacheState {
    by_symbol: HashMap<String, Token>,
    by_address: HashMap<Address, Token>,
    last_updated: Option<Instant>,
    /// Last lookup-driven refresh, successful or not.
    last_attempt: Option<Instant>,
}

impl CacheState {
    fn new() -> Self {
        Self {
            by_symbol: HashMap::new(),
            by_address: HashMap::new(),
            last_updated: None,
            last_attempt: None,
        }
    }

    fn attempted_recently(&self) -> bool {
        self.last_attempt.is_some_and(|at| at.elapsed() < REFRESH_COOLDOWN)
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        match self.last_updated {
            Some(last) => last.elapsed() > ttl,
            None => true,
        }
    }

    fn insert(&mut self, token: Token) {
        self.by_symbol.insert(token.symbol.to_uppercase(), token.clone());
        self.by_address.insert(token.address, token);
    }
}

/// Cached token list for one chain.
pub struct TokenList {
    client: reqwest::Client,
    /// Remote source; `None` for a fixed list.
    url: Option<String>,
    chain_id: u64,
    cache_ttl: Duration,
    cache: RwLock<CacheState>,
    /// Only one refresh runs at a time.
    refresh_semaphore: Semaphore,
}

impl TokenList {
    /// Token list for `chain_id` fetched from the Uniswap list.
    pub fn new(chain_id: u64) -> Result<Self> {
        Self::with_options(chain_id, UNISWAP_TOKEN_LIST_URL.to_string(), DEFAULT_CACHE_TTL)
    }

    /// Token list with a custom source and cache lifetime.
    pub fn with_options(chain_id: u64, url: String, cache_ttl: Duration) -> Result<Self> {
        let list = Self::build(chain_id, Some(url), cache_ttl)?;
        if chain_id == ETHEREUM_MAINNET_CHAIN_ID {
            list.seed(fallback_tokens());
        }
        Ok(list)
    }

    /// Token list that never goes to the network.
    pub fn fixed(chain_id: u64, tokens: Vec<Token>) -> Result<Self> {
        let list = Self::build(chain_id, None, DEFAULT_CACHE_TTL)?;
        list.seed(tokens);
        Ok(list)
    }

    fn build(chain_id: u64, url: Option<String>, cache_ttl: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url,
            chain_id,
            cache_ttl,
            cache: RwLock::new(CacheState::new()),
            refresh_semaphore: Semaphore::new(1),
        })
    }

    fn seed(&self, tokens: Vec<Token>) {
        // Freshly built, so the lock is free.
        if let Ok(mut cache) = self.cache.try_write() {
            let count = tokens.len();
            for token in tokens {
                cache.insert(token);
            }
            info!(count = count, chain_id = self.chain_id, "Seeded token list");
        }
    }

    /// Refresh when the cache has expired; a no-op for fixed lists.
    async fn ensure_fresh(&self) -> Result<()> {
        self.refresh_if(|cache| cache.is_expired(self.cache_ttl)).await
    }

    /// Refresh while `wanted` holds, one at a time and at most once per
    /// [`REFRESH_COOLDOWN`].
    async fn refresh_if<W>(&self, wanted: W) -> Result<()>
    where
        W: Fn(&CacheState) -> bool,
    {
        if self.url.is_none() {
            return Ok(());
        }
        {
            let cache = self.cache.read().await;
            if !wanted(&cache) || cache.attempted_recently() {
                return Ok(());
            }
        }

        let _permit = self
            .refresh_semaphore
            .acquire()
            .await
            .map_err(|_| AppError::Transport("Failed to acquire refresh semaphore".to_string()))?;

        // Another task may have refreshed while we waited.
        {
            let mut cache = self.cache.write().await;
            if !wanted(&cache) || cache.attempted_recently() {
                return Ok(());
            }
            cache.last_attempt = Some(Instant::now());
        }

        self.refresh().await.map(|_| ())
    }

    /// Reload the list from its source and return how many tokens were loaded.
    pub async fn refresh(&self) -> Result<usize> {
        let Some(url) = self.url.as_deref() else {
            return Ok(0);
        };
        info!(url = %url, "Refreshing token list");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("Failed to fetch token list: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Transport(format!(
                "Token list API returned status: {}",
                response.status()
            )));
        }

        let list: ListResponse = response
            .json()
            .await
            .map_err(|e| AppError::Parse(format!("Failed to parse token list: {}", e)))?;

        let tokens = parse_listed(list.tokens, self.chain_id);
        let count = tokens.len();

        let mut cache = self.cache.write().await;
        for token in tokens {
            cache.insert(token);
        }
        cache.last_updated = Some(Instant::now());

        info!(count = count, chain_id = self.chain_id, "Loaded token list");
        Ok(count)
    }

    /// Every cached token, sorted by symbol.
    pub async fn list_tokens(&self) -> Vec<Token> {
        if let Err(e) = self.ensure_fresh().await {
            warn!(error = %e, "Failed to refresh token list");
        }

        let mut tokens: Vec<Token> = self.cache.read().await.by_address.values().cloned().collect();
        tokens.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        tokens
    }

    async fn lookup<F>(&self, find: F, what: &str) -> Option<Token>
    where
        F: Fn(&CacheState) -> Option<Token>,
    {
        if let Err(e) = self.ensure_fresh().await {
            warn!(error = %e, "Failed to refresh token list");
        }

        if let Some(token) = find(&*self.cache.read().await) {
            return Some(token);
        }
        if self.url.is_none() {
            return None;
        }

        info!(query = %what, "Token not cached, refreshing");
        if let Err(e) = self.refresh_if(|cache| find(cache).is_none()).await {
            warn!(error = %e, "Failed to refresh token list on cache miss");
            return None;
        }

        find(&*self.cache.read().await)
    }
}

#[async_trait]
impl TokenLookup for TokenList {
    async fn resolve_symbol(&self, symbol: &str) -> Option<Token> {
        let key = symbol.to_uppercase();
        self.lookup(|cache| cache.by_symbol.get(&key).cloned(), symbol).await
    }

    async fn lookup_address(&self, address: Address) -> Option<Token> {
        self.lookup(|cache| cache.by_address.get(&address).cloned(), &address.to_string()).await
    }
}

/// Keep entries for `chain_id` with a parseable address.
fn parse_listed(listed: Vec<ListedToken>, chain_id: u64) -> Vec<Token> {
    listed
        .into_iter()
        .filter(|t| t.chain_id == chain_id)
        .filter_map(|t| match t.address.parse::<Address>() {
            Ok(address) => Some(Token::new(address, t.symbol, t.name, t.decimals)),
            Err(e) => {
                warn!(address = %t.address, error = %e, "Skipping token with invalid address");
                None
            }
        })
        .collect()
}

fn fallback_tokens() -> Vec<Token> {
    vec![
        Token::new(WETH_ADDRESS, "WETH", "Wrapped Ether", 18),
        Token::new(USDC_ADDRESS, "USDC", "USD Coin", 6),
        Token::new(WBTC_ADDRESS, "WBTC", "Wrapped BTC", 8),
        Token::new(UNI_ADDRESS, "UNI", "Uniswap", 18),
    ]
}
