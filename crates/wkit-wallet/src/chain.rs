#![forbid(unsafe_code)]

//! Chain identifiers.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DomainError;

/// A positive EVM chain id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainId(u64);

impl ChainId {
    pub const ETHEREUM_MAINNET: Self = Self(1);
    pub const OPTIMISM: Self = Self(10);
    pub const BSC: Self = Self(56);
    pub const POLYGON: Self = Self(137);
    pub const ARBITRUM: Self = Self(42161);
    pub const AVALANCHE: Self = Self(43114);

    /// Fails for zero and negative values.
    pub fn new(value: i64) -> Result<Self, DomainError> {
        match u64::try_from(value) {
            Ok(v) if v > 0 => Ok(Self(v)),
            _ => Err(DomainError::InvalidChainId(value)),
        }
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// `0x`-prefixed lower-case hex, as used by `wallet_switchEthereumChain`.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("0x{:x}", self.0)
    }

    #[must_use]
    pub fn network_name(self) -> String {
        let known = match self.0 {
            1 => "Ethereum Mainnet",
            137 => "Polygon",
            56 => "Binance Smart Chain",
            42161 => "Arbitrum One",
            10 => "Optimism",
            43114 => "Avalanche C-Chain",
            other => return format!("Chain {other}"),
        };
        known.to_string()
    }
}

impl Default for ChainId {
    fn default() -> Self {
        Self::ETHEREUM_MAINNET
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for ChainId {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

impl Serialize for ChainId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> Deserialize<'de> for ChainId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}
