//! MCP server module.
//!
//! Contains the MCP server implementation with tool handlers.

pub mod server;

pub use server::SwapWidgetServer;
pub use server::{ApprovalOutcome, ApproveTokenInput, TokenFigure, TokenInput, WalletStatus};
