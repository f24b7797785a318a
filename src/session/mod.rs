//! Wallet session module.
//!
//! Holds the connection state machine, the store that owns it, and the
//! transaction history shown alongside it.

pub mod history;
pub mod state;
pub mod store;

pub use history::{TxHistory, MAX_TX_HISTORY};
pub use state::{ConnectedWallet, ConnectionState, Session, SessionAction, CONNECT_LABEL};
pub use store::{ListenerGuard, SessionStore};
