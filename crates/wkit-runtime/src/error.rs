#![forbid(unsafe_code)]

use thiserror::Error;
use wkit_wallet::NetworkConfigError;

/// Rejected subscription purchase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("connect a wallet before purchasing a subscription")]
    NotConnected,
    #[error("unknown plan id: {0}")]
    UnknownPlan(String),
}

impl PurchaseError {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotConnected => "not_connected",
            Self::UnknownPlan(_) => "unknown_plan",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkManagerError {
    #[error("network with chainId {0} already exists")]
    AlreadyExists(i64),
    #[error("network with chainId {0} not found")]
    NotFound(i64),
    #[error("cannot remove currently active network {0}")]
    ActiveNetwork(i64),
    #[error(transparent)]
    Invalid(#[from] NetworkConfigError),
    #[error("network RPC {url} is not available: {reason}")]
    RpcUnavailable { url: String, reason: String },
    #[error("chainId cannot be changed")]
    ChainIdImmutable,
}

/// Failure of the custom-network persistence backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("stored networks are not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}
