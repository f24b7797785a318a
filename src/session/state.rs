//! Wallet session state and its reducer.

use alloy::primitives::Address;
use serde::Serialize;

use crate::{
    ethereum::{ProviderHandle, SignerHandle},
    types::short_address,
};

/// Button text shown while no wallet is connected.
pub const CONNECT_LABEL: &str = "Connect Wallet";

/// Coarse connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Every way the session can change. Applied only through [`Session::apply`].
#[derive(Clone)]
pub enum SessionAction {
    /// Account access granted and handles derived.
    Connected { address: Address, provider: ProviderHandle, signer: SignerHandle },
    /// User disconnect or wallet reported no accounts.
    Disconnected,
    /// Wallet switched to another account.
    AccountChanged(Address),
    /// Wallet switched network; handles were re-derived.
    ChainChanged { provider: ProviderHandle, signer: SignerHandle },
}

impl std::fmt::Debug for SessionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connected { address, .. } => {
                f.debug_struct("Connected").field("address", address).finish_non_exhaustive()
            }
            Self::Disconnected => f.write_str("Disconnected"),
            Self::AccountChanged(address) => {
                f.debug_tuple("AccountChanged").field(address).finish()
            }
            Self::ChainChanged { .. } => f.debug_struct("ChainChanged").finish_non_exhaustive(),
        }
    }
}

/// The connected account together with its signer.
#[derive(Clone)]
pub struct ConnectedWallet {
    pub address: Address,
    pub signer: SignerHandle,
}

/// Current wallet connection.
///
/// `is_connected` is derived from the three fields, so the session can never
/// claim a connection it has no handles for.
#[derive(Clone, Default)]
pub struct Session {
    address: Option<Address>,
    provider: Option<ProviderHandle>,
    signer: Option<SignerHandle>,
}

impl Session {
    pub fn address(&self) -> Option<Address> {
        self.address
    }

    pub fn provider(&self) -> Option<&ProviderHandle> {
        self.provider.as_ref()
    }

    pub fn signer(&self) -> Option<&SignerHandle> {
        self.signer.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.address.is_some() && self.signer.is_some() && self.provider.is_some()
    }

    pub fn state(&self) -> ConnectionState {
        if self.is_connected() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    /// Account and signer, only while connected.
    pub fn wallet(&self) -> Option<ConnectedWallet> {
        if !self.is_connected() {
            return None;
        }
        match (self.address, &self.signer) {
            (Some(address), Some(signer)) => {
                Some(ConnectedWallet { address, signer: signer.clone() })
            }
            _ => None,
        }
    }

    /// Text for the connect button.
    pub fn label(&self) -> String {
        match self.address {
            Some(address) if self.is_connected() => short_address(address),
            _ => CONNECT_LABEL.to_string(),
        }
    }

    /// Apply one action.
    pub fn apply(&mut self, action: SessionAction) {
        match action {
            SessionAction::Connected { address, provider, signer } => {
                self.address = Some(address);
                self.provider = Some(provider);
                self.signer = Some(signer);
            }
            SessionAction::Disconnected => *self = Session::default(),
            SessionAction::AccountChanged(address) => self.address = Some(address),
            SessionAction::ChainChanged { provider, signer } => {
                self.provider = Some(provider);
                self.signer = Some(signer);
            }
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("address", &self.address)
            .field("provider", &self.provider.is_some())
            .field("signer", &self.signer.is_some())
            .field("connected", &self.is_connected())
            .finish()
    }
}
