//! Type definitions module.
//!
//! Contains shared types used across the application.

pub mod approval;
pub mod token;
pub mod transaction;

pub use approval::*;
pub use token::*;
pub use transaction::*;
