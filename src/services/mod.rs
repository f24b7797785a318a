//! Business logic services module.

pub mod approval;
pub mod token_data;
pub mod token_list;
pub mod watcher;

pub use approval::ApprovalService;
pub use token_data::{TokenDataService, TokenMetric, ZERO_DISPLAY};
pub use token_list::{TokenList, TokenLookup};
pub use watcher::TokenWatch;
