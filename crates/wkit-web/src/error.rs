#![forbid(unsafe_code)]

use thiserror::Error;

/// Failure to reach the installed widget handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InitError {
    #[error("WalletKit widget is already initialized")]
    AlreadyInitialized,
    #[error("WalletKit widget is not initialized")]
    NotInitialized,
    #[error("WalletKit widget has been destroyed")]
    Destroyed,
}

/// Host configuration that could not be read.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("widget configuration is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
