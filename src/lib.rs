//! Swap Widget Library
//!
//! Wallet session and token approval core of a DEX swap widget, exposed as a
//! Model Context Protocol server.
//!
//! # Features
//!
//! - **Wallet Session**: connect/disconnect plus wallet-driven account and
//!   chain changes, held in a single store
//! - **Token Data**: ERC20 balances and router allowances for the connected account
//! - **Approvals**: `approve` the swap router and wait for confirmation
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use swap_widget::{LocalWallet, SessionStore, TokenDataService, DEFAULT_SWAP_ROUTER};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let wallet = LocalWallet::from_private_key(&key, "http://127.0.0.1:8545")?;
//!     let store = SessionStore::new(Arc::new(wallet));
//!     let _listener = store.mount();
//!     store.connect().await;
//!
//!     let data = TokenDataService::new(store.clone(), DEFAULT_SWAP_ROUTER);
//!     println!("{}", data.balance(&usdc).await);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod ethereum;
pub mod mcp;
pub mod services;
pub mod session;
pub mod types;

pub use config::Config;
pub use error::{AppError, Result};
pub use ethereum::constants::*;
pub use ethereum::{InjectedWallet, LocalWallet, WalletEvent};
pub use mcp::SwapWidgetServer;
pub use services::{ApprovalService, TokenDataService, TokenList, TokenWatch};
pub use session::{Session, SessionStore};
