#![forbid(unsafe_code)]

//! Wallet connection state.
//!
//! Connecting is a two-phase, host-driven operation: [`ConnectionStore::connect`]
//! starts an attempt and returns a [`ConnectTicket`] whose deadline is the
//! provider's latency after `now`; [`ConnectionStore::tick`] completes the
//! attempt once the host's clock reaches that deadline.
//!
//! # State Machine
//!
//! ```text
//!   Disconnected --connect--> Connecting --tick(deadline)--> Connected
//!        ^                       |   \                          |
//!        |                       |    +--provider error--+      |
//!        +------disconnect-------+-----------------------+------+
//! ```
//!
//! # Invariants
//!
//! 1. `is_connected() == address.is_some()` in every reachable state.
//! 2. At most one attempt is in flight; a second `connect` joins it.
//! 3. `disconnect` during an attempt cancels it, so its completion never
//!    lands.
//! 4. `disconnect` keeps the last `chain_id`.

use std::collections::VecDeque;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use wkit_wallet::{
    Address, ChainId, ProviderNotification, Wallet, WalletConnection, WalletPort, WalletPortError,
    WalletProvider,
};

use crate::event_bus::{EventBus, WidgetEvent};
use crate::reactive::{Observable, Subscription};

/// Balance shown while disconnected.
pub const ZERO_BALANCE: &str = "0.00";

/// Chain requested on every connect. The host's configured chain is not
/// interpreted here.
pub const CONNECT_CHAIN: ChainId = ChainId::ETHEREUM_MAINNET;

const SETTLEMENT_HISTORY: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionState {
    pub address: Option<Address>,
    /// Meaningful only while connected; kept across disconnects.
    pub chain_id: ChainId,
    pub is_connecting: bool,
    pub balance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<WalletProvider>,
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self {
            address: None,
            chain_id: ChainId::ETHEREUM_MAINNET,
            is_connecting: false,
            balance: ZERO_BALANCE.to_string(),
            provider: None,
        }
    }
}

impl ConnectionState {
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.address.is_some()
    }

    /// Short address, or an empty string while disconnected.
    #[must_use]
    pub fn display_address(&self) -> String {
        self.address.as_ref().map(Address::short).unwrap_or_default()
    }

    /// The connected wallet, or `None` while disconnected.
    #[must_use]
    pub fn wallet(&self) -> Option<Wallet> {
        let address = self.address.clone()?;
        Some(Wallet::new(address, self.chain_id, self.provider.unwrap_or_default()))
    }

    #[must_use]
    pub fn account(&self) -> Option<Account> {
        self.address.as_ref().map(|address| Account {
            address: address.clone(),
            chain_id: self.chain_id,
            balance: self.balance.clone(),
        })
    }
}

/// Public view of a connected account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub address: Address,
    pub chain_id: ChainId,
    pub balance: String,
}

/// Handle for one connect attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectTicket {
    pub id: u64,
    /// Host time at which [`ConnectionStore::tick`] completes the attempt.
    pub deadline: Duration,
}

/// How a connect attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectSettlement {
    Connected(Account),
    Failed(WalletPortError),
    /// Cancelled by `disconnect` before completion.
    Cancelled,
}

/// Owns [`ConnectionState`] and drives the wallet port.
pub struct ConnectionStore {
    state: Observable<ConnectionState>,
    port: Box<dyn WalletPort>,
    bus: EventBus,
    pending: Option<ConnectTicket>,
    next_ticket: u64,
    settlements: VecDeque<(u64, ConnectSettlement)>,
}

impl std::fmt::Debug for ConnectionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionStore")
            .field("state", &self.state)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl ConnectionStore {
    pub fn new(port: Box<dyn WalletPort>, bus: EventBus) -> Self {
        Self {
            state: Observable::new(ConnectionState::default()),
            port,
            bus,
            pending: None,
            next_ticket: 0,
            settlements: VecDeque::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state.with(ConnectionState::is_connected)
    }

    #[must_use]
    pub fn is_connecting(&self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub fn account(&self) -> Option<Account> {
        self.state.with(ConnectionState::account)
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.state.version()
    }

    #[must_use]
    pub fn pending(&self) -> Option<ConnectTicket> {
        self.pending
    }

    pub fn subscribe(&self, f: impl Fn(&ConnectionState) + 'static) -> Subscription {
        self.state.subscribe(f)
    }

    /// Start a connect attempt, or join the one already in flight.
    pub fn connect(&mut self, now: Duration) -> ConnectTicket {
        if let Some(ticket) = self.pending {
            debug!(ticket = ticket.id, "connect joined in-flight attempt");
            return ticket;
        }
        self.next_ticket += 1;
        let ticket = ConnectTicket {
            id: self.next_ticket,
            deadline: now + self.port.latency(),
        };
        self.pending = Some(ticket);
        self.state.update(|s| s.is_connecting = true);
        debug!(ticket = ticket.id, deadline_ms = ticket.deadline.as_millis() as u64, "connect started");
        ticket
    }

    /// Complete the in-flight attempt if its deadline has passed.
    pub fn tick(&mut self, now: Duration) -> Option<ConnectSettlement> {
        let ticket = self.pending.filter(|t| now >= t.deadline)?;
        self.pending = None;

        let settlement = match self.port.request_connection(CONNECT_CHAIN) {
            Ok(connection) => self.apply_connection(connection),
            Err(err) => {
                error!(ticket = ticket.id, code = err.code(), error = %err, "wallet connection failed");
                self.state.update(|s| s.is_connecting = false);
                self.bus.emit(&WidgetEvent::error(err.code(), err.to_string()));
                ConnectSettlement::Failed(err)
            }
        };
        self.record(ticket.id, settlement.clone());
        Some(settlement)
    }

    fn apply_connection(&mut self, connection: WalletConnection) -> ConnectSettlement {
        let WalletConnection {
            address,
            chain_id,
            provider,
            balance,
        } = connection;
        self.state.update(|s| {
            s.address = Some(address.clone());
            s.chain_id = chain_id;
            s.balance = balance;
            s.is_connecting = false;
            s.provider = Some(provider);
        });
        info!(address = %address, chain_id = %chain_id, "wallet connected");
        self.bus.emit(&WidgetEvent::Connected {
            address,
            chain_id,
        });
        self.account()
            .map_or(ConnectSettlement::Cancelled, ConnectSettlement::Connected)
    }

    /// Reset to disconnected; cancels an in-flight attempt.
    pub fn disconnect(&mut self) {
        if let Some(ticket) = self.pending.take() {
            warn!(ticket = ticket.id, "disconnect cancelled in-flight connect");
            self.record(ticket.id, ConnectSettlement::Cancelled);
        }
        self.port.disconnect();
        self.state.update(|s| {
            s.address = None;
            s.balance = ZERO_BALANCE.to_string();
            s.is_connecting = false;
            s.provider = None;
        });
        info!("wallet disconnected");
        self.bus.emit(&WidgetEvent::Disconnected);
    }

    /// Apply an account or chain change pushed by the provider.
    pub fn handle_provider_notification(&mut self, notification: ProviderNotification) {
        match notification {
            ProviderNotification::AccountChanged(None) => {
                if self.is_connected() {
                    self.disconnect();
                }
            }
            ProviderNotification::AccountChanged(Some(address)) => {
                let current = self.state.with(|s| s.address.clone());
                match current {
                    None => debug!(address = %address, "account change ignored while disconnected"),
                    Some(current) if current == address => {}
                    Some(_) => {
                        self.state.update(|s| s.address = Some(address.clone()));
                        info!(address = %address, "wallet account changed");
                        self.bus.emit(&WidgetEvent::AccountChanged { address });
                    }
                }
            }
            ProviderNotification::ChainChanged(chain_id) => {
                if self.state.with(|s| s.chain_id) == chain_id {
                    return;
                }
                self.state.update(|s| s.chain_id = chain_id);
                info!(chain_id = %chain_id, "wallet chain changed");
                self.bus.emit(&WidgetEvent::ChainChanged { chain_id });
            }
        }
    }

    /// Remove and return how ticket `id` ended, if it has.
    pub fn take_settlement(&mut self, id: u64) -> Option<ConnectSettlement> {
        let index = self.settlements.iter().position(|(t, _)| *t == id)?;
        self.settlements.remove(index).map(|(_, s)| s)
    }

    fn record(&mut self, id: u64, settlement: ConnectSettlement) {
        if self.settlements.len() == SETTLEMENT_HISTORY {
            self.settlements.pop_front();
        }
        self.settlements.push_back((id, settlement));
    }
}
