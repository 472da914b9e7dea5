#![forbid(unsafe_code)]

//! One widget instance's runtime: stores, bus, and collaborators.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use wkit_runtime::{ManualWallClock, WalletContext};
//! use wkit_wallet::SimulatedWallet;
//!
//! let mut ctx = WalletContext::builder()
//!     .with_wallet(SimulatedWallet::with_seed(7))
//!     .with_clock(ManualWallClock::new(0))
//!     .build();
//!
//! let ticket = ctx.connect(Duration::ZERO);
//! ctx.tick(ticket.deadline);
//! assert!(ctx.is_connected());
//! assert!(ctx.purchase("1").is_ok());
//! ```

use std::time::Duration;

use wkit_wallet::{AssumeReachable, ProviderNotification, RpcProbe, SimulatedWallet, WalletPort};

use crate::clock::{SystemWallClock, WallClock};
use crate::connection::{Account, ConnectSettlement, ConnectTicket, ConnectionState, ConnectionStore};
use crate::error::PurchaseError;
use crate::event_bus::EventBus;
use crate::network_manager::{MemoryNetworkStorage, NetworkManager, NetworkStorage};
use crate::reactive::Subscription;
use crate::subscription::{SubscriptionState, SubscriptionStore};

pub struct WalletContextBuilder {
    wallet: Box<dyn WalletPort>,
    storage: Box<dyn NetworkStorage>,
    probe: Box<dyn RpcProbe>,
    clock: Box<dyn WallClock>,
    bus: EventBus,
}

impl Default for WalletContextBuilder {
    fn default() -> Self {
        Self {
            wallet: Box::new(SimulatedWallet::default()),
            storage: Box::new(MemoryNetworkStorage::new()),
            probe: Box::new(AssumeReachable),
            clock: Box::new(SystemWallClock),
            bus: EventBus::new(),
        }
    }
}

impl WalletContextBuilder {
    #[must_use]
    pub fn with_wallet(mut self, wallet: impl WalletPort + 'static) -> Self {
        self.wallet = Box::new(wallet);
        self
    }

    #[must_use]
    pub fn with_storage(mut self, storage: impl NetworkStorage + 'static) -> Self {
        self.storage = Box::new(storage);
        self
    }

    #[must_use]
    pub fn with_probe(mut self, probe: impl RpcProbe + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl WallClock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Share an existing bus instead of creating one.
    #[must_use]
    pub fn with_bus(mut self, bus: EventBus) -> Self {
        self.bus = bus;
        self
    }

    #[must_use]
    pub fn build(self) -> WalletContext {
        WalletContext {
            connection: ConnectionStore::new(self.wallet, self.bus.clone()),
            subscription: SubscriptionStore::new(self.bus.clone()),
            networks: NetworkManager::new(self.storage, self.probe),
            clock: self.clock,
            bus: self.bus,
        }
    }
}

/// Connection, subscription, and network state behind one event bus.
pub struct WalletContext {
    connection: ConnectionStore,
    subscription: SubscriptionStore,
    networks: NetworkManager,
    clock: Box<dyn WallClock>,
    bus: EventBus,
}

impl std::fmt::Debug for WalletContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletContext")
            .field("connection", &self.connection)
            .field("subscription", &self.subscription)
            .field("networks", &self.networks)
            .finish_non_exhaustive()
    }
}

impl Default for WalletContext {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl WalletContext {
    #[must_use]
    pub fn builder() -> WalletContextBuilder {
        WalletContextBuilder::default()
    }

    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn connect(&mut self, now: Duration) -> ConnectTicket {
        self.connection.connect(now)
    }

    /// Advance host time; completes a connect attempt whose deadline passed.
    pub fn tick(&mut self, now: Duration) -> Option<ConnectSettlement> {
        self.connection.tick(now)
    }

    pub fn take_settlement(&mut self, ticket: u64) -> Option<ConnectSettlement> {
        self.connection.take_settlement(ticket)
    }

    pub fn disconnect(&mut self) {
        self.connection.disconnect();
    }

    pub fn handle_provider_notification(&mut self, notification: ProviderNotification) {
        self.connection.handle_provider_notification(notification);
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    #[must_use]
    pub fn account(&self) -> Option<Account> {
        self.connection.account()
    }

    #[must_use]
    pub fn connection(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn pending_connect(&self) -> Option<ConnectTicket> {
        self.connection.pending()
    }

    /// Purchase `plan_id` with expiry measured from the context clock.
    pub fn purchase(&self, plan_id: &str) -> Result<SubscriptionState, PurchaseError> {
        self.subscription
            .purchase(plan_id, self.connection.is_connected(), self.clock.now_millis())
    }

    #[must_use]
    pub fn check_subscription(&self) -> SubscriptionState {
        self.subscription.check_subscription()
    }

    #[must_use]
    pub fn networks(&self) -> &NetworkManager {
        &self.networks
    }

    pub fn networks_mut(&mut self) -> &mut NetworkManager {
        &mut self.networks
    }

    /// Sum of store versions; changes whenever any store changes.
    #[must_use]
    pub fn state_version(&self) -> u64 {
        self.connection.version() + self.subscription.version()
    }

    pub fn subscribe_connection(&self, f: impl Fn(&ConnectionState) + 'static) -> Subscription {
        self.connection.subscribe(f)
    }

    pub fn subscribe_subscription(&self, f: impl Fn(&SubscriptionState) + 'static) -> Subscription {
        self.subscription.subscribe(f)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use wkit_wallet::ChainId;

    use super::*;
    use crate::clock::ManualWallClock;
    use crate::event_bus::WidgetEvent;
    use crate::subscription::SUBSCRIPTION_PERIOD_MS;

    fn ctx(clock: &ManualWallClock) -> WalletContext {
        WalletContext::builder()
            .with_wallet(SimulatedWallet::with_seed(3))
            .with_clock(clock.clone())
            .build()
    }

    #[test]
    fn purchase_uses_context_clock() {
        let clock = ManualWallClock::new(10_000);
        let mut c = ctx(&clock);
        let t = c.connect(Duration::ZERO);
        c.tick(t.deadline);
        let state = c.purchase("2").unwrap();
        assert_eq!(state.expires_at, Some(10_000 + SUBSCRIPTION_PERIOD_MS));
        assert_eq!(c.check_subscription(), state);
    }

    #[test]
    fn purchase_checks_connection_before_plan() {
        let c = ctx(&ManualWallClock::new(0));
        assert_eq!(c.purchase("nope"), Err(PurchaseError::NotConnected));
    }

    #[test]
    fn stores_share_one_bus() {
        let mut c = ctx(&ManualWallClock::new(0));
        let names = Rc::new(RefCell::new(Vec::new()));
        for name in [WidgetEvent::CONNECTED, WidgetEvent::SUBSCRIPTION_CHANGED] {
            let n = Rc::clone(&names);
            c.bus().on(name, move |e| n.borrow_mut().push(e.name()));
        }
        let t = c.connect(Duration::ZERO);
        c.tick(t.deadline);
        c.purchase("1").unwrap();
        assert_eq!(*names.borrow(), vec!["connected", "subscriptionChanged"]);
    }

    #[test]
    fn state_version_tracks_both_stores() {
        let mut c = ctx(&ManualWallClock::new(0));
        let v0 = c.state_version();
        let t = c.connect(Duration::ZERO);
        let v1 = c.state_version();
        assert!(v1 > v0);
        c.tick(t.deadline);
        c.purchase("1").unwrap();
        assert!(c.state_version() > v1);
    }

    #[test]
    fn boxed_wallet_is_accepted() {
        let wallet: Box<dyn WalletPort> = Box::new(SimulatedWallet::with_seed(2));
        let mut c = WalletContext::builder().with_wallet(wallet).build();
        let t = c.connect(Duration::ZERO);
        assert_eq!(t.deadline, Duration::from_millis(1000));
        c.tick(t.deadline);
        assert!(c.is_connected());
    }

    #[test]
    fn connect_lands_on_mainnet() {
        let mut c = ctx(&ManualWallClock::new(0));
        let t = c.connect(Duration::ZERO);
        c.tick(t.deadline);
        assert_eq!(c.account().map(|a| a.chain_id), Some(ChainId::ETHEREUM_MAINNET));
    }
}
