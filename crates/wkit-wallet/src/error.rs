#![forbid(unsafe_code)]

use thiserror::Error;

/// Invalid domain value rejected at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("invalid Ethereum address: {0}")]
    InvalidAddress(String),
    #[error("invalid chain id: {0}")]
    InvalidChainId(i64),
    #[error("unknown plan id: {0}")]
    UnknownPlan(String),
}

/// Structural problems found in a network configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid network configuration: {}", problems.join(", "))]
pub struct NetworkConfigError {
    pub problems: Vec<String>,
}

/// Failure reported by a wallet provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletPortError {
    #[error("connection request rejected: {0}")]
    Rejected(String),
    #[error("no wallet provider installed")]
    NotInstalled,
    #[error("provider returned an invalid connection: {0}")]
    InvalidConnection(#[from] DomainError),
}

impl WalletPortError {
    /// Stable machine-readable code for host pages.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Rejected(_) => "provider_rejected",
            Self::NotInstalled => "provider_not_installed",
            Self::InvalidConnection(_) => "provider_invalid_connection",
        }
    }
}
