#![forbid(unsafe_code)]

//! The connected wallet entity.

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::chain::ChainId;

/// Kind of wallet backend behind a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletProvider {
    Metamask,
    Walletconnect,
    Coinbase,
    Safe,
    Ledger,
    Trezor,
    Injected,
    #[default]
    Unknown,
}

impl WalletProvider {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Metamask => "metamask",
            Self::Walletconnect => "walletconnect",
            Self::Coinbase => "coinbase",
            Self::Safe => "safe",
            Self::Ledger => "ledger",
            Self::Trezor => "trezor",
            Self::Injected => "injected",
            Self::Unknown => "unknown",
        }
    }
}

/// A connected account on a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub address: Address,
    pub chain_id: ChainId,
    pub provider: WalletProvider,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ens_name: Option<String>,
}

impl Wallet {
    #[must_use]
    pub fn new(address: Address, chain_id: ChainId, provider: WalletProvider) -> Self {
        Self {
            address,
            chain_id,
            provider,
            ens_name: None,
        }
    }

    #[must_use]
    pub fn with_ens_name(mut self, name: impl Into<String>) -> Self {
        self.ens_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn is_on_network(&self, chain_id: ChainId) -> bool {
        self.chain_id == chain_id
    }

    /// ENS name if known, otherwise the short address.
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.ens_name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => self.address.short(),
        }
    }
}
