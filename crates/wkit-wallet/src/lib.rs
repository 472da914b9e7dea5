#![forbid(unsafe_code)]

//! Wallet domain for WalletKit.
//!
//! Value objects validate on construction ([`Address::parse`],
//! [`ChainId::new`], [`Plan::from_id`]) so an invalid value never exists.
//! The [`WalletPort`] trait is the seam to the wallet backend;
//! [`SimulatedWallet`] is the deterministic implementation used by default
//! and in tests. Network configurations carry their own structural
//! validation, while endpoint reachability goes through [`RpcProbe`].

pub mod address;
pub mod chain;
pub mod error;
pub mod network;
pub mod plan;
pub mod presets;
pub mod provider;
pub mod wallet;

pub use address::Address;
pub use chain::ChainId;
pub use error::{DomainError, NetworkConfigError, WalletPortError};
pub use network::{
    AssumeReachable, NativeCurrency, NetworkConfig, NetworkUpdate, RpcProbe, RpcProbeResult,
    validate_block_explorer,
};
pub use plan::Plan;
pub use presets::{is_preset_network, preset_network, preset_networks};
pub use provider::{
    DEFAULT_CONNECT_LATENCY, ProviderNotification, SimulatedWallet, SimulatedWalletConfig,
    WalletConnection, WalletPort,
};
pub use wallet::{Wallet, WalletProvider};
