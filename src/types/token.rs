//! Token-related types.

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Immutable reference data for an ERC20 token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    /// Token contract address.
    pub address: Address,
    /// Token symbol (e.g., "USDC").
    pub symbol: String,
    /// Token name (e.g., "USD Coin").
    pub name: String,
    /// Number of decimals.
    pub decimals: u8,
}

impl Token {
    /// Create a token description.
    pub fn new(
        address: Address,
        symbol: impl Into<String>,
        name: impl Into<String>,
        decimals: u8,
    ) -> Self {
        Self { address, symbol: symbol.into(), name: name.into(), decimals }
    }
}

/// Shorten an address to `0x1234...abcd` for display.
pub fn short_address(address: Address) -> String {
    let full = address.to_checksum(None);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

/// Format a U256 value with decimals to a human-readable string.
pub fn format_units(value: U256, decimals: u8) -> String {
    if value.is_zero() {
        return "0".to_string();
    }

    let digits = value.to_string();
    let decimals = decimals as usize;

    if decimals == 0 {
        return digits;
    }

    let (integer, fraction) = if digits.len() <= decimals {
        ("0".to_string(), format!("{:0>width$}", digits, width = decimals))
    } else {
        let (integer, fraction) = digits.split_at(digits.len() - decimals);
        (integer.to_string(), fraction.to_string())
    };

    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        integer
    } else {
        format!("{}.{}", integer, fraction)
    }
}

/// Parse a human-readable amount string to U256 with decimals.
///
/// Fails when the amount has more fractional digits than `decimals`.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256, AppError> {
    let amount = amount.trim();

    if amount.is_empty() {
        return Err(AppError::Parse("Amount cannot be empty".to_string()));
    }
    if amount.starts_with('-') {
        return Err(AppError::Parse("Amount cannot be negative".to_string()));
    }

    let (integer, fraction) = match amount.split_once('.') {
        Some((_, rest)) if rest.contains('.') => {
            return Err(AppError::Parse("Invalid amount format".to_string()));
        }
        Some((integer, fraction)) => (integer, fraction),
        None => (amount, ""),
    };

    if integer.is_empty() && fraction.is_empty() {
        return Err(AppError::Parse("Invalid amount format".to_string()));
    }

    let decimals = decimals as usize;
    let mut fraction = fraction.to_string();
    if fraction.len() > decimals {
        return Err(AppError::Parse(format!(
            "Fractional component exceeds {} decimals: {}",
            decimals, amount
        )));
    }
    fraction.push_str(&"0".repeat(decimals - fraction.len()));

    let integer_value = parse_digits(integer, "integer part")?;
    let fraction_value = parse_digits(&fraction, "fraction part")?;

    let multiplier = U256::from(10).pow(U256::from(decimals));
    integer_value
        .checked_mul(multiplier)
        .and_then(|scaled| scaled.checked_add(fraction_value))
        .ok_or_else(|| AppError::Parse(format!("Amount too large: {}", amount)))
}

fn parse_digits(digits: &str, what: &str) -> Result<U256, AppError> {
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::Parse(format!("Invalid {}: {}", what, digits)));
    }
    digits.parse::<U256>().map_err(|e| AppError::Parse(format!("Invalid {}: {}", what, e)))
}
