#![forbid(unsafe_code)]

//! Host-page configuration, read once at initialization.
//!
//! Values are passed through as given. The only interpretation applied is
//! the chain id, which follows integer-prefix parsing and falls back to `1`
//! when nothing usable is present.

use serde::{Deserialize, Serialize};
use tracing::warn;
use wkit_wallet::ChainId;

use crate::error::ConfigError;

pub const ATTR_POSITION: &str = "data-position";
pub const ATTR_THEME: &str = "data-theme";
pub const ATTR_SUBSCRIPTION_CONTRACT: &str = "data-subscription-contract";
pub const ATTR_CHAIN_ID: &str = "data-chain-id";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WidgetConfig {
    pub position: String,
    pub theme: String,
    pub subscription_contract: Option<String>,
    pub chain_id: i64,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            position: "bottom-right".to_string(),
            theme: "light".to_string(),
            subscription_contract: None,
            chain_id: 1,
        }
    }
}

impl WidgetConfig {
    /// Build from `(name, value)` markup attributes; unknown names are ignored.
    pub fn from_attributes<'a>(attrs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut config = Self::default();
        for (name, value) in attrs {
            match name {
                ATTR_POSITION if !value.is_empty() => config.position = value.to_string(),
                ATTR_THEME if !value.is_empty() => config.theme = value.to_string(),
                ATTR_SUBSCRIPTION_CONTRACT => config.subscription_contract = Some(value.to_string()),
                ATTR_CHAIN_ID => config.chain_id = parse_chain_id(value),
                _ => {}
            }
        }
        config
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Chain requested on connect; mainnet when the configured id is not
    /// a valid chain id.
    #[must_use]
    pub fn chain(&self) -> ChainId {
        ChainId::new(self.chain_id).unwrap_or_else(|_| {
            warn!(chain_id = self.chain_id, "configured chain id is invalid; using mainnet");
            ChainId::ETHEREUM_MAINNET
        })
    }
}

/// Leading optional sign and digits; empty, zero, or unparsable input gives 1.
pub fn parse_chain_id(raw: &str) -> i64 {
    let s = raw.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    match digits[..end].parse::<i64>() {
        Ok(0) | Err(_) => 1,
        Ok(n) => sign * n,
    }
}
