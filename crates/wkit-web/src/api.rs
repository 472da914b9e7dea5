#![forbid(unsafe_code)]

//! Host-page API over one widget instance.
//!
//! [`WalletKitWidget`] is a thin adapter: state lives in the
//! [`WalletContext`] and the [`WidgetShell`]; the facade only routes calls
//! and keeps the two consistent (for example, a purchase leaves the plans
//! view).

use std::time::Duration;

use tracing::info;
use wkit_core::{PointerInput, PointerKind, Viewport};
use wkit_layout::{DragStep, ListenerHost, NoopListenerHost};
use wkit_runtime::{
    Account, ConnectSettlement, ConnectTicket, ListenerId, NetworkManager, PurchaseError,
    SubscriptionState, WalletContext, WalletContextBuilder, WidgetEvent,
};
use wkit_wallet::ProviderNotification;

use crate::config::WidgetConfig;
use crate::shell::{PanelView, ShellConfig, WidgetShell};

/// One mounted widget: shell plus wallet context.
#[derive(Debug)]
pub struct WalletKitWidget<H: ListenerHost = NoopListenerHost> {
    config: WidgetConfig,
    shell: WidgetShell<H>,
    ctx: WalletContext,
}

impl<H: ListenerHost> WalletKitWidget<H> {
    /// Build the context, mount the shell, and emit `ready`.
    ///
    /// `config` is kept as given; its chain id is not requested on connect.
    pub fn mount(
        config: WidgetConfig,
        context: WalletContextBuilder,
        shell: ShellConfig,
        viewport: Viewport,
        host: H,
    ) -> Self {
        let ctx = context.build();
        let widget = Self {
            shell: WidgetShell::new(shell, viewport, host),
            ctx,
            config,
        };
        info!(
            position = %widget.config.position,
            theme = %widget.config.theme,
            chain_id = widget.config.chain_id,
            "WalletKit widget initialized"
        );
        widget.ctx.bus().emit(&WidgetEvent::Ready);
        widget
    }

    #[must_use]
    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    #[must_use]
    pub fn shell(&self) -> &WidgetShell<H> {
        &self.shell
    }

    #[must_use]
    pub fn context(&self) -> &WalletContext {
        &self.ctx
    }

    // --- state queries ---

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.ctx.is_connected()
    }

    #[must_use]
    pub fn get_account(&self) -> Option<Account> {
        self.ctx.account()
    }

    #[must_use]
    pub fn check_subscription(&self) -> SubscriptionState {
        self.ctx.check_subscription()
    }

    /// Snapshot passed to `callback` before being returned.
    pub fn check_subscription_with(&self, callback: impl FnOnce(&SubscriptionState)) -> SubscriptionState {
        let status = self.ctx.check_subscription();
        callback(&status);
        status
    }

    /// What the rendering surface should show right now.
    #[must_use]
    pub fn view(&self) -> PanelView {
        self.shell
            .view(&self.ctx.connection(), &self.ctx.check_subscription())
    }

    /// Changes whenever connection or subscription state changes.
    #[must_use]
    pub fn state_version(&self) -> u64 {
        self.ctx.state_version()
    }

    // --- actions ---

    /// Start connecting; completes on the first `tick` at or after the
    /// ticket's deadline.
    pub fn connect(&mut self, now: Duration) -> ConnectTicket {
        self.ctx.connect(now)
    }

    pub fn disconnect(&mut self) {
        self.ctx.disconnect();
    }

    /// How ticket `id` ended, once it has.
    pub fn take_settlement(&mut self, id: u64) -> Option<ConnectSettlement> {
        self.ctx.take_settlement(id)
    }

    /// Open the panel if no wallet is connected. Returns `true` if it opened.
    pub fn prompt_connect(&mut self) -> bool {
        if self.ctx.is_connected() {
            return false;
        }
        self.shell.open();
        true
    }

    /// Whether the subscription is active; if not, open the plans view.
    pub fn require_subscription(&mut self) -> bool {
        let has_access = self.ctx.check_subscription().is_active;
        if !has_access {
            self.shell.open_plans();
        }
        has_access
    }

    /// [`Self::require_subscription`], also passing the result to `callback`.
    pub fn require_subscription_with(&mut self, callback: impl FnOnce(bool)) -> bool {
        let has_access = self.require_subscription();
        callback(has_access);
        has_access
    }

    pub fn purchase(&mut self, plan_id: &str) -> Result<SubscriptionState, PurchaseError> {
        let state = self.ctx.purchase(plan_id)?;
        self.shell.set_viewing_plans(false);
        Ok(state)
    }

    pub fn handle_provider_notification(&mut self, notification: ProviderNotification) {
        self.ctx.handle_provider_notification(notification);
    }

    #[must_use]
    pub fn networks(&self) -> &NetworkManager {
        self.ctx.networks()
    }

    pub fn networks_mut(&mut self) -> &mut NetworkManager {
        self.ctx.networks_mut()
    }

    // --- panel and container ---

    pub fn open(&mut self) {
        self.shell.open();
    }

    pub fn close(&mut self) {
        self.shell.close();
    }

    pub fn toggle(&mut self) {
        self.shell.toggle();
    }

    pub fn show(&mut self) {
        self.shell.show();
    }

    pub fn hide(&mut self) {
        self.shell.hide();
    }

    // --- events ---

    /// Listen for `name` (`ready`, `connected`, ...). Remove with [`Self::off`].
    pub fn on(&self, name: &str, handler: impl Fn(&WidgetEvent) + 'static) -> ListenerId {
        self.ctx.bus().on(name, handler)
    }

    pub fn once(&self, name: &str, handler: impl Fn(&WidgetEvent) + 'static) -> ListenerId {
        self.ctx.bus().once(name, handler)
    }

    pub fn off(&self, id: ListenerId) -> bool {
        self.ctx.bus().off(id)
    }

    // --- host input ---

    pub fn pointer_down(&mut self, input: PointerInput, now: Duration) -> DragStep {
        self.shell.pointer_down(input, now)
    }

    pub fn pointer_move(&mut self, input: PointerInput) -> DragStep {
        self.shell.pointer_move(input)
    }

    pub fn pointer_up(&mut self, kind: PointerKind, now: Duration) -> DragStep {
        self.shell.pointer_up(kind, now)
    }

    /// Click on the floating button. Returns `true` if the panel toggled.
    pub fn click(&mut self, now: Duration) -> bool {
        self.shell.click(now)
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.shell.resize(viewport);
    }

    /// Advance host time: ends the snap transition and completes a pending
    /// connect whose deadline has passed.
    pub fn tick(&mut self, now: Duration) -> Option<ConnectSettlement> {
        self.shell.tick(now);
        self.ctx.tick(now)
    }

    /// Release host listeners and every event handler.
    pub fn destroy(mut self) {
        self.shell.teardown();
        self.ctx.bus().clear();
        info!("WalletKit widget destroyed");
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;
    use wkit_layout::RecordingListenerHost;
    use wkit_runtime::{EventBus, ManualWallClock};
    use wkit_wallet::{ChainId, SimulatedWallet};

    use super::*;
    use crate::config::ATTR_CHAIN_ID;

    fn widget(config: WidgetConfig) -> (WalletKitWidget<RecordingListenerHost>, Rc<RefCell<Vec<&'static str>>>) {
        let bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for name in [
            WidgetEvent::READY,
            WidgetEvent::CONNECTED,
            WidgetEvent::DISCONNECTED,
            WidgetEvent::SUBSCRIPTION_CHANGED,
            WidgetEvent::ERROR,
        ] {
            let l = Rc::clone(&log);
            bus.on(name, move |e| l.borrow_mut().push(e.name()));
        }
        let context = WalletContext::builder()
            .with_wallet(SimulatedWallet::with_seed(11))
            .with_clock(ManualWallClock::new(0))
            .with_bus(bus);
        let w = WalletKitWidget::mount(
            config,
            context,
            ShellConfig::default(),
            Viewport::new(800.0, 600.0),
            RecordingListenerHost::new(),
        );
        (w, log)
    }

    fn connect(w: &mut WalletKitWidget<RecordingListenerHost>) {
        let t = w.connect(Duration::ZERO);
        w.tick(t.deadline);
    }

    #[test]
    fn mount_emits_ready_once() {
        let (_w, log) = widget(WidgetConfig::default());
        assert_eq!(*log.borrow(), vec!["ready"]);
    }

    #[test]
    fn configured_chain_is_passed_through() {
        let (mut w, _) = widget(WidgetConfig::from_attributes([(ATTR_CHAIN_ID, "137")]));
        connect(&mut w);
        assert_eq!(w.config().chain_id, 137);
        assert_eq!(w.get_account().map(|a| a.chain_id), Some(ChainId::ETHEREUM_MAINNET));
    }

    #[test]
    fn prompt_connect_only_when_disconnected() {
        let (mut w, _) = widget(WidgetConfig::default());
        connect(&mut w);
        assert!(!w.prompt_connect());
        assert!(!w.shell().is_open());
        w.disconnect();
        assert!(w.prompt_connect());
        assert!(w.shell().is_open());
    }

    #[test]
    fn require_subscription_reports_access() {
        let (mut w, _) = widget(WidgetConfig::default());
        connect(&mut w);
        let mut seen = None;
        assert!(!w.require_subscription_with(|ok| seen = Some(ok)));
        assert_eq!(seen, Some(false));
        assert!(w.shell().is_viewing_plans());

        w.purchase("1").unwrap();
        assert!(!w.shell().is_viewing_plans());
        w.close();
        assert!(w.require_subscription());
        assert!(!w.shell().is_open());
    }

    #[test]
    fn check_subscription_invokes_callback() {
        let (w, _) = widget(WidgetConfig::default());
        let mut got = None;
        let returned = w.check_subscription_with(|s| got = Some(s.clone()));
        assert_eq!(got, Some(returned));
    }

    #[test]
    fn off_removes_handler() {
        let (mut w, _) = widget(WidgetConfig::default());
        let hits = Rc::new(RefCell::new(0));
        let h = Rc::clone(&hits);
        let id = w.on(WidgetEvent::DISCONNECTED, move |_| *h.borrow_mut() += 1);
        w.disconnect();
        assert!(w.off(id));
        w.disconnect();
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn state_version_moves_on_connect() {
        let (mut w, _) = widget(WidgetConfig::default());
        let before = w.state_version();
        connect(&mut w);
        assert!(w.state_version() > before);
    }

    #[test]
    fn destroy_clears_handlers() {
        let (w, _) = widget(WidgetConfig::default());
        let bus = w.context().bus().clone();
        assert!(bus.handler_count(WidgetEvent::READY) > 0);
        w.destroy();
        assert_eq!(bus.event_names(), Vec::<String>::new());
    }
}
