#![forbid(unsafe_code)]

//! Network configuration and structural validation.
//!
//! Reachability of RPC endpoints is delegated to an [`RpcProbe`]; this crate
//! never talks to a node itself.

use serde::{Deserialize, Serialize};
use url::{Host, Url};

use crate::error::NetworkConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// One EVM network as shown in the network picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// Kept as a raw integer so invalid user input can be reported rather
    /// than rejected during deserialization.
    pub chain_id: i64,
    pub name: String,
    pub rpc_urls: Vec<String>,
    pub default_rpc_url: String,
    pub native_currency: NativeCurrency,
    pub block_explorers: Vec<String>,
    pub default_block_explorer: String,
}

/// Partial update for [`NetworkConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkUpdate {
    /// Must be absent or equal to the target's chain id; never applied.
    pub chain_id: Option<i64>,
    pub name: Option<String>,
    pub rpc_urls: Option<Vec<String>>,
    pub default_rpc_url: Option<String>,
    pub native_currency: Option<NativeCurrency>,
    pub block_explorers: Option<Vec<String>>,
    pub default_block_explorer: Option<String>,
}

impl NetworkConfig {
    /// Apply `update` on top of `self`. `update.chain_id` is ignored.
    #[must_use]
    pub fn merged(&self, update: NetworkUpdate) -> Self {
        let mut next = self.clone();
        if let Some(v) = update.name {
            next.name = v;
        }
        if let Some(v) = update.rpc_urls {
            next.rpc_urls = v;
        }
        if let Some(v) = update.default_rpc_url {
            next.default_rpc_url = v;
        }
        if let Some(v) = update.native_currency {
            next.native_currency = v;
        }
        if let Some(v) = update.block_explorers {
            next.block_explorers = v;
        }
        if let Some(v) = update.default_block_explorer {
            next.default_block_explorer = v;
        }
        next
    }

    /// Collect every structural problem in this configuration.
    pub fn validate(&self) -> Result<(), NetworkConfigError> {
        let mut problems = Vec::new();

        if self.chain_id <= 0 {
            problems.push("Invalid chainId".to_string());
        }
        if self.name.trim().is_empty() {
            problems.push("Network name is required".to_string());
        }
        if self.rpc_urls.is_empty() {
            problems.push("At least one RPC URL is required".to_string());
        }
        if self.default_rpc_url.is_empty() {
            problems.push("Default RPC URL is required".to_string());
        } else if !self.rpc_urls.contains(&self.default_rpc_url) {
            problems.push("Default RPC URL must be in the rpcUrls list".to_string());
        }
        if self.native_currency.symbol.is_empty() {
            problems.push("Native currency information is required".to_string());
        }
        if self.block_explorers.is_empty() {
            problems.push("At least one block explorer is required".to_string());
        }
        if self.default_block_explorer.is_empty() {
            problems.push("Default block explorer is required".to_string());
        } else if !self.block_explorers.contains(&self.default_block_explorer) {
            problems.push("Default block explorer must be in the blockExplorers list".to_string());
        }

        if problems.is_empty()
            && let Err(reason) = validate_block_explorer(&self.default_block_explorer)
        {
            problems.push(format!("Default block explorer validation failed: {reason}"));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(NetworkConfigError { problems })
        }
    }
}

/// Check that `raw` is an http(s) URL with a plausible host name.
pub fn validate_block_explorer(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|_| "Invalid URL format".to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err("URL must use HTTP or HTTPS protocol".to_string());
    }
    match url.host() {
        None => Err("Invalid URL: missing hostname".to_string()),
        Some(Host::Ipv4(_)) => Ok(()),
        Some(Host::Ipv6(_)) => Err("Invalid hostname format".to_string()),
        Some(Host::Domain(domain)) => {
            if domain == "localhost" || is_valid_hostname(domain) {
                Ok(())
            } else {
                Err("Invalid hostname format".to_string())
            }
        }
    }
}

/// Dot-separated labels of 1..=63 alphanumerics or inner hyphens.
fn is_valid_hostname(host: &str) -> bool {
    host.split('.').all(|label| {
        let bytes = label.as_bytes();
        !bytes.is_empty()
            && bytes.len() <= 63
            && bytes.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'-')
            && bytes.first().is_some_and(u8::is_ascii_alphanumeric)
            && bytes.last().is_some_and(u8::is_ascii_alphanumeric)
    })
}

/// Outcome of probing one RPC endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcProbeResult {
    Reachable,
    Unreachable(String),
}

impl RpcProbeResult {
    #[must_use]
    pub const fn is_reachable(&self) -> bool {
        matches!(self, Self::Reachable)
    }
}

/// Pass/fail reachability check for an RPC endpoint.
pub trait RpcProbe {
    fn probe(&self, rpc_url: &str, expected_chain_id: i64) -> RpcProbeResult;
}

/// Probe that reports every endpoint as reachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeReachable;

impl RpcProbe for AssumeReachable {
    fn probe(&self, _rpc_url: &str, _expected_chain_id: i64) -> RpcProbeResult {
        RpcProbeResult::Reachable
    }
}
