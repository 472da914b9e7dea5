#![forbid(unsafe_code)]

//! Callers waiting on a connect ticket.
//!
//! A `connect` issued while an attempt is in flight joins that attempt and
//! shares its ticket, but the store hands out a settlement only once. The
//! registry keeps every waiter per ticket so one poll can settle all of them.

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;
use wkit_layout::ListenerHost;
use wkit_runtime::ConnectSettlement;

use crate::api::WalletKitWidget;

/// Waiters keyed by connect ticket id.
#[derive(Debug)]
pub struct SettlementWaiters<W> {
    waiting: HashMap<u64, Vec<W>>,
}

impl<W> Default for SettlementWaiters<W> {
    fn default() -> Self {
        Self {
            waiting: HashMap::new(),
        }
    }
}

impl<W> SettlementWaiters<W> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `waiter` for `ticket`. Returns `true` for the first waiter, whose
    /// caller is then responsible for polling the ticket.
    pub fn register(&mut self, ticket: u64, waiter: W) -> bool {
        let entry = self.waiting.entry(ticket).or_default();
        entry.push(waiter);
        entry.len() == 1
    }

    #[must_use]
    pub fn waiting_on(&self, ticket: u64) -> usize {
        self.waiting.get(&ticket).map_or(0, Vec::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }

    /// Remove and return every waiter on `ticket`.
    pub fn drain(&mut self, ticket: u64) -> Vec<W> {
        self.waiting.remove(&ticket).unwrap_or_default()
    }

    /// Advance `widget` to `now` and, if `ticket` has settled, hand back the
    /// settlement together with all of its waiters.
    pub fn poll<H: ListenerHost>(
        &mut self,
        widget: &mut WalletKitWidget<H>,
        ticket: u64,
        now: Duration,
    ) -> Option<(ConnectSettlement, Vec<W>)> {
        widget.tick(now);
        let settlement = widget.take_settlement(ticket)?;
        let waiters = self.drain(ticket);
        debug!(ticket, waiters = waiters.len(), "connect ticket settled");
        Some((settlement, waiters))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use wkit_core::Viewport;
    use wkit_layout::NoopListenerHost;
    use wkit_runtime::WalletContext;
    use wkit_wallet::SimulatedWallet;

    use super::*;
    use crate::config::WidgetConfig;
    use crate::shell::ShellConfig;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn widget() -> WalletKitWidget<NoopListenerHost> {
        WalletKitWidget::mount(
            WidgetConfig::default(),
            WalletContext::builder().with_wallet(SimulatedWallet::with_seed(9)),
            ShellConfig::default(),
            Viewport::new(800.0, 600.0),
            NoopListenerHost,
        )
    }

    #[test]
    fn only_first_waiter_polls() {
        let mut waiters = SettlementWaiters::new();
        assert!(waiters.register(1, "a"));
        assert!(!waiters.register(1, "b"));
        assert!(waiters.register(2, "c"));
        assert_eq!(waiters.waiting_on(1), 2);
        assert_eq!(waiters.drain(1), vec!["a", "b"]);
        assert_eq!(waiters.waiting_on(1), 0);
        assert_eq!(waiters.drain(1), Vec::<&str>::new());
    }

    #[test]
    fn joined_connect_settles_every_waiter() {
        let mut w = widget();
        let mut waiters = SettlementWaiters::new();

        let first = w.connect(ms(0));
        let second = w.connect(ms(300));
        assert_eq!(first.id, second.id);
        assert!(waiters.register(first.id, "first"));
        assert!(!waiters.register(second.id, "second"));

        assert!(waiters.poll(&mut w, first.id, ms(500)).is_none());
        assert_eq!(waiters.waiting_on(first.id), 2);

        let (settlement, settled) = waiters
            .poll(&mut w, first.id, first.deadline)
            .expect("ticket settles at its deadline");
        assert!(matches!(settlement, ConnectSettlement::Connected(_)));
        assert_eq!(settled, vec!["first", "second"]);
        assert!(waiters.is_empty());
        assert!(w.is_connected());
    }

    #[test]
    fn cancelled_ticket_releases_joined_waiters() {
        let mut w = widget();
        let mut waiters = SettlementWaiters::new();
        let ticket = w.connect(ms(0));
        waiters.register(ticket.id, 1);
        waiters.register(w.connect(ms(10)).id, 2);
        w.disconnect();

        let (settlement, settled) = waiters.poll(&mut w, ticket.id, ms(20)).expect("cancelled");
        assert_eq!(settlement, ConnectSettlement::Cancelled);
        assert_eq!(settled, vec![1, 2]);
        assert!(!w.is_connected());
    }
}
