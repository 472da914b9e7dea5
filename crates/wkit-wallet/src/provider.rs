#![forbid(unsafe_code)]

//! Wallet provider port and the simulated provider.
//!
//! A [`WalletPort`] is the capability the connection store drives. The
//! handshake latency is reported up front so the host-driven store can
//! schedule completion; [`WalletPort::request_connection`] is then called
//! once the latency has elapsed.

use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::address::Address;
use crate::chain::ChainId;
use crate::error::{DomainError, WalletPortError};
use crate::wallet::WalletProvider;

/// Latency of the simulated handshake.
pub const DEFAULT_CONNECT_LATENCY: Duration = Duration::from_millis(1000);

/// Result of a successful handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletConnection {
    pub address: Address,
    pub chain_id: ChainId,
    pub provider: WalletProvider,
    /// Native balance formatted with two decimals.
    pub balance: String,
}

impl WalletConnection {
    /// Validate raw provider output.
    pub fn from_raw(
        address: &str,
        chain_id: i64,
        provider: WalletProvider,
        balance: impl Into<String>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            address: Address::parse(address)?,
            chain_id: ChainId::new(chain_id)?,
            provider,
            balance: balance.into(),
        })
    }
}

/// Change pushed by the provider after connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum ProviderNotification {
    /// `None` means the provider no longer exposes an account.
    AccountChanged(Option<Address>),
    ChainChanged(ChainId),
}

/// Capability interface for a wallet backend.
pub trait WalletPort {
    fn provider(&self) -> WalletProvider;

    /// Time the handshake takes before `request_connection` may be called.
    fn latency(&self) -> Duration;

    /// Complete a handshake for `chain_id`.
    fn request_connection(&mut self, chain_id: ChainId) -> Result<WalletConnection, WalletPortError>;

    /// Release any provider-side session.
    fn disconnect(&mut self) {}
}

impl<P: WalletPort + ?Sized> WalletPort for Box<P> {
    fn provider(&self) -> WalletProvider {
        (**self).provider()
    }

    fn latency(&self) -> Duration {
        (**self).latency()
    }

    fn request_connection(&mut self, chain_id: ChainId) -> Result<WalletConnection, WalletPortError> {
        (**self).request_connection(chain_id)
    }

    fn disconnect(&mut self) {
        (**self).disconnect();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedWalletConfig {
    pub latency: Duration,
    pub seed: u64,
}

impl Default for SimulatedWalletConfig {
    fn default() -> Self {
        Self {
            latency: DEFAULT_CONNECT_LATENCY,
            seed: 0x5eed_0f_ba1a,
        }
    }
}

/// Deterministic stand-in for a browser wallet.
///
/// Each handshake yields a fresh random address and a balance in `[0, 10)`.
#[derive(Debug, Clone)]
pub struct SimulatedWallet {
    config: SimulatedWalletConfig,
    rng: SmallRng,
    pending_failure: Option<WalletPortError>,
}

impl SimulatedWallet {
    #[must_use]
    pub fn new(config: SimulatedWalletConfig) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(config.seed),
            config,
            pending_failure: None,
        }
    }

    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::new(SimulatedWalletConfig {
            seed,
            ..SimulatedWalletConfig::default()
        })
    }

    /// Make the next handshake fail with `error`.
    pub fn fail_next(&mut self, error: WalletPortError) {
        self.pending_failure = Some(error);
    }

    fn random_address(&mut self) -> Address {
        let mut bytes = [0u8; 20];
        self.rng.fill(&mut bytes);
        Address::from_bytes(bytes)
    }

    fn random_balance(&mut self) -> String {
        let value: f64 = self.rng.random_range(0.0..10.0);
        format!("{value:.2}")
    }
}

impl Default for SimulatedWallet {
    fn default() -> Self {
        Self::new(SimulatedWalletConfig::default())
    }
}

impl WalletPort for SimulatedWallet {
    fn provider(&self) -> WalletProvider {
        WalletProvider::Injected
    }

    fn latency(&self) -> Duration {
        self.config.latency
    }

    fn request_connection(&mut self, chain_id: ChainId) -> Result<WalletConnection, WalletPortError> {
        if let Some(err) = self.pending_failure.take() {
            return Err(err);
        }
        let connection = WalletConnection {
            address: self.random_address(),
            chain_id,
            provider: self.provider(),
            balance: self.random_balance(),
        };
        debug!(address = %connection.address, chain_id = %chain_id, "simulated wallet handshake");
        Ok(connection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_valid_connections() {
        let mut wallet = SimulatedWallet::with_seed(7);
        for _ in 0..50 {
            let c = wallet.request_connection(ChainId::ETHEREUM_MAINNET).unwrap();
            assert!(Address::is_valid(c.address.as_str()));
            assert_eq!(c.address.as_str(), c.address.as_str().to_lowercase());
            let value: f64 = c.balance.parse().unwrap();
            assert!((0.0..=10.0).contains(&value));
            assert_eq!(c.balance.split('.').nth(1).map(str::len), Some(2));
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SimulatedWallet::with_seed(42);
        let mut b = SimulatedWallet::with_seed(42);
        assert_eq!(
            a.request_connection(ChainId::POLYGON).unwrap(),
            b.request_connection(ChainId::POLYGON).unwrap()
        );
    }

    #[test]
    fn consecutive_addresses_differ() {
        let mut w = SimulatedWallet::default();
        let first = w.request_connection(ChainId::ETHEREUM_MAINNET).unwrap();
        let second = w.request_connection(ChainId::ETHEREUM_MAINNET).unwrap();
        assert_ne!(first.address, second.address);
    }

    #[test]
    fn queued_failure_fires_once() {
        let mut w = SimulatedWallet::default();
        w.fail_next(WalletPortError::Rejected("user denied".into()));
        assert_eq!(
            w.request_connection(ChainId::ETHEREUM_MAINNET),
            Err(WalletPortError::Rejected("user denied".into()))
        );
        assert!(w.request_connection(ChainId::ETHEREUM_MAINNET).is_ok());
    }

    #[test]
    fn default_latency_is_one_second() {
        assert_eq!(SimulatedWallet::default().latency(), Duration::from_millis(1000));
    }

    #[test]
    fn from_raw_validates() {
        assert!(WalletConnection::from_raw("0x12", 1, WalletProvider::Injected, "0.00").is_err());
        assert!(
            WalletConnection::from_raw(
                "0x1111111111111111111111111111111111111111",
                0,
                WalletProvider::Injected,
                "0.00"
            )
            .is_err()
        );
    }

    #[test]
    fn notification_json() {
        let n = ProviderNotification::ChainChanged(ChainId::POLYGON);
        assert_eq!(
            serde_json::to_value(&n).unwrap(),
            serde_json::json!({"type": "chainChanged", "value": 137})
        );
        let n: ProviderNotification =
            serde_json::from_value(serde_json::json!({"type": "accountChanged", "value": null})).unwrap();
        assert_eq!(n, ProviderNotification::AccountChanged(None));
    }
}
