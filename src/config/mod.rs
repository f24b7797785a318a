//! Configuration management module.
//!
//! Handles loading configuration from environment variables.

use std::env;

use alloy::primitives::Address;

use crate::{
    error::AppError,
    ethereum::constants::DEFAULT_SWAP_ROUTER,
    services::token_list::UNISWAP_TOKEN_LIST_URL,
};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Ethereum JSON-RPC endpoint URL.
    pub rpc_url: String,
    /// Private key backing the local wallet (hex string with 0x prefix).
    pub private_key: String,
    /// Router that receives token-spend approvals.
    pub router: Address,
    /// Token list consulted by the token picker.
    pub token_list_url: String,
    /// Logging level (default: info).
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `ETHEREUM_RPC_URL`: Ethereum JSON-RPC endpoint
    /// - `ETHEREUM_PRIVATE_KEY`: Private key for the wallet (hex)
    ///
    /// Optional environment variables:
    /// - `SWAP_ROUTER_ADDRESS`: approval target (default: Uniswap V2 Router02)
    /// - `TOKEN_LIST_URL`: token list source (default: Uniswap token list)
    /// - `LOG_LEVEL`: Logging level (default: info)
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let rpc_url = env::var("ETHEREUM_RPC_URL").map_err(|_| {
            AppError::Config("ETHEREUM_RPC_URL environment variable not set".into())
        })?;

        let private_key = env::var("ETHEREUM_PRIVATE_KEY").map_err(|_| {
            AppError::Config("ETHEREUM_PRIVATE_KEY environment variable not set".into())
        })?;

        let router = match env::var("SWAP_ROUTER_ADDRESS") {
            Ok(raw) => parse_router(&raw)?,
            Err(_) => DEFAULT_SWAP_ROUTER,
        };

        let token_list_url =
            env::var("TOKEN_LIST_URL").unwrap_or_else(|_| UNISWAP_TOKEN_LIST_URL.to_string());

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self { rpc_url, private_key, router, token_list_url, log_level })
    }
}

fn parse_router(raw: &str) -> Result<Address, AppError> {
    raw.trim()
        .parse::<Address>()
        .map_err(|e| AppError::Config(format!("Invalid SWAP_ROUTER_ADDRESS '{}': {}", raw, e)))
}
