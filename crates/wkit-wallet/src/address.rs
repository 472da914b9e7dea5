#![forbid(unsafe_code)]

//! Ethereum account address.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DomainError;

const HEX_DIGITS: usize = 40;

/// A validated `0x`-prefixed, 40-hex-digit address stored in lower case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(String);

impl Address {
    /// Validate and normalize `raw`.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        if !Self::is_valid(raw) {
            return Err(DomainError::InvalidAddress(raw.to_string()));
        }
        Ok(Self(raw.to_ascii_lowercase()))
    }

    /// Build an address from 20 raw bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(format!("0x{}", hex::encode(bytes)))
    }

    /// Matches `^0x[a-fA-F0-9]{40}$`.
    #[must_use]
    pub fn is_valid(raw: &str) -> bool {
        raw.strip_prefix("0x")
            .is_some_and(|digits| digits.len() == HEX_DIGITS && digits.bytes().all(|b| b.is_ascii_hexdigit()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `0x1234...abcd`: the first six characters and the last four.
    #[must_use]
    pub fn short(&self) -> String {
        let s = &self.0;
        format!("{}...{}", &s[..6], &s[s.len() - 4..])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
