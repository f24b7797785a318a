//! Error types and handling module.
//!
//! Defines the widget's error taxonomy and its conversions.

use rmcp::ErrorData as McpError;
use thiserror::Error;

/// Application-wide error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No injected wallet is available to the session.
    #[error("No injected wallet found")]
    WalletUnavailable,

    /// The wallet refused or failed the account request.
    #[error("Wallet connection failed: {0}")]
    ConnectFailed(String),

    /// An operation needed a connected wallet.
    #[error("Wallet not connected")]
    NotConnected,

    /// A read call (`allowance`, `balanceOf`) failed.
    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    /// The `approve` call failed or reverted.
    #[error("Approval failed: {0}")]
    ApprovalFailed(String),

    /// Transport errors.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Invalid Ethereum address.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Token not present in the token list.
    #[error("Token not found: {0}")]
    TokenNotFound(String),

    /// Signer errors.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<alloy::transports::TransportError> for AppError {
    fn from(err: alloy::transports::TransportError) -> Self {
        AppError::Transport(err.to_string())
    }
}

impl From<alloy::signers::local::LocalSignerError> for AppError {
    fn from(err: alloy::signers::local::LocalSignerError) -> Self {
        AppError::Wallet(err.to_string())
    }
}

impl From<AppError> for McpError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::InvalidAddress(_) | AppError::TokenNotFound(_) | AppError::Parse(_) => {
                McpError::invalid_params(err.to_string(), None)
            }
            AppError::Config(_) | AppError::WalletUnavailable | AppError::NotConnected => {
                McpError::invalid_request(err.to_string(), None)
            }
            _ => McpError::internal_error(err.to_string(), None),
        }
    }
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;
