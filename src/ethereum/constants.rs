//! Ethereum network constants.
//!
//! Contains chain IDs and mainnet contract addresses.

use alloy::primitives::{address, Address};

// ============================================================================
// Chain IDs
// ============================================================================

/// Ethereum Mainnet chain ID.
pub const ETHEREUM_MAINNET_CHAIN_ID: u64 = 1;

/// Sepolia testnet chain ID.
pub const SEPOLIA_CHAIN_ID: u64 = 11155111;

// ============================================================================
// Core Token Addresses (Ethereum Mainnet)
// ============================================================================

/// Wrapped Ether (WETH) address on Ethereum Mainnet.
pub const WETH_ADDRESS: Address = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");

/// USDC address on Ethereum Mainnet.
pub const USDC_ADDRESS: Address = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");

/// WBTC address on Ethereum Mainnet.
pub const WBTC_ADDRESS: Address = address!("2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599");

/// UNI token address on Ethereum Mainnet.
pub const UNI_ADDRESS: Address = address!("1f9840a85d5aF5bf1D1762F925BDADdC4201F984");

// ============================================================================
// Router
// ============================================================================

/// Uniswap V2 Router02 address on Ethereum Mainnet.
pub const UNISWAP_V2_ROUTER: Address = address!("7a250d5630B4cF539739dF2C5dAcb4c659F2488D");

/// Spender used for every approval unless configured otherwise.
pub const DEFAULT_SWAP_ROUTER: Address = UNISWAP_V2_ROUTER;
