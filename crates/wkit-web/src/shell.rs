#![forbid(unsafe_code)]

//! Widget shell: floating button, panel state, and click-vs-drag guard.
//!
//! The shell owns the drag controller and the panel flags, and derives what
//! should be rendered ([`PanelView`]) from them plus the connection and
//! subscription snapshots. It never renders anything itself.
//!
//! # Click disambiguation
//!
//! A press arms the [`ClickGuard`]. The click that follows only toggles the
//! panel if the guard is still armed, no drag started since the press, and
//! the press is younger than [`ClickGuardConfig::max_press`].
//!
//! # Invariants
//!
//! 1. The drag controller is disabled exactly while the panel is open.
//! 2. `close()` is idempotent and always clears the plans view.
//! 3. Container visibility (`show`/`hide`) is independent of the panel.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;
use wkit_core::{PointerInput, PointerKind, Rect, Size, Viewport};
use wkit_layout::{DockSide, DragDockConfig, DragPhase, DragStep, DraggableWidgetController, ListenerHost};
use wkit_runtime::{ConnectionState, SubscriptionState};
use wkit_wallet::Plan;

/// Longest press still accepted as a click.
pub const DEFAULT_MAX_PRESS: Duration = Duration::from_millis(200);

/// Default floating button size in CSS pixels.
pub const DEFAULT_BUTTON_SIZE: Size = Size::new(56.0, 56.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickGuardConfig {
    pub max_press: Duration,
}

impl Default for ClickGuardConfig {
    fn default() -> Self {
        Self {
            max_press: DEFAULT_MAX_PRESS,
        }
    }
}

/// Provisional "this press is a click" flag. Clones share the flag.
#[derive(Debug, Clone, Default)]
pub struct ClickGuard {
    config: ClickGuardConfig,
    armed_at: Rc<Cell<Option<Duration>>>,
}

impl ClickGuard {
    #[must_use]
    pub fn new(config: ClickGuardConfig) -> Self {
        Self {
            config,
            armed_at: Rc::new(Cell::new(None)),
        }
    }

    pub fn arm(&self, now: Duration) {
        self.armed_at.set(Some(now));
    }

    pub fn disarm(&self) {
        self.armed_at.set(None);
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed_at.get().is_some()
    }

    /// Consume the flag; `true` if it still qualifies as a click at `now`.
    pub fn take(&self, now: Duration) -> bool {
        self.armed_at
            .take()
            .is_some_and(|at| now.saturating_sub(at) <= self.config.max_press)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShellConfig {
    pub drag: DragDockConfig,
    pub click: ClickGuardConfig,
    pub button_size: Size,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            drag: DragDockConfig::default(),
            click: ClickGuardConfig::default(),
            button_size: DEFAULT_BUTTON_SIZE,
        }
    }
}

/// Connected-account summary shown in the panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    /// ENS name when known, otherwise the short address.
    pub display_name: String,
    pub display_address: String,
    pub network_name: String,
    pub balance: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SubscriptionView {
    /// No subscription; offer the plans.
    Inactive,
    #[serde(rename_all = "camelCase")]
    Active { plan: Plan, expires_at: Option<u64> },
    ViewingPlans { plans: Vec<Plan> },
}

/// Panel contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PanelContent {
    Closed,
    #[serde(rename_all = "camelCase")]
    ConnectPrompt { is_connecting: bool },
    Connected {
        account: AccountView,
        subscription: SubscriptionView,
    },
}

/// Everything the rendering surface needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelView {
    pub visible: bool,
    pub open: bool,
    pub dragging: bool,
    pub snapping: bool,
    pub side: DockSide,
    pub vertical_offset: f64,
    /// Live bounds while dragging, docked bounds otherwise.
    pub button: Rect,
    pub content: PanelContent,
}

/// Top-level widget state over one drag controller.
#[derive(Debug)]
pub struct WidgetShell<H: ListenerHost> {
    controller: DraggableWidgetController<H>,
    guard: ClickGuard,
    button_size: Size,
    viewport: Viewport,
    open: bool,
    visible: bool,
    viewing_plans: bool,
}

impl<H: ListenerHost> WidgetShell<H> {
    pub fn new(config: ShellConfig, viewport: Viewport, host: H) -> Self {
        let guard = ClickGuard::new(config.click);
        let mut controller = DraggableWidgetController::new(config.drag, config.button_size, viewport, host);
        let on_start = guard.clone();
        controller.on_drag_start(move || on_start.disarm());
        controller.on_drag_end(|info| debug!(side = info.side.as_str(), y = info.y, "drag ended"));
        Self {
            controller,
            guard,
            button_size: config.button_size,
            viewport,
            open: false,
            visible: true,
            viewing_plans: false,
        }
    }

    #[must_use]
    pub fn controller(&self) -> &DraggableWidgetController<H> {
        &self.controller
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub const fn is_viewing_plans(&self) -> bool {
        self.viewing_plans
    }

    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Current bounds of the floating button.
    #[must_use]
    pub fn button_rect(&self) -> Rect {
        self.controller
            .live_rect()
            .unwrap_or_else(|| self.controller.docked_rect(self.button_size, self.viewport))
    }

    pub fn pointer_down(&mut self, input: PointerInput, now: Duration) -> DragStep {
        self.guard.arm(now);
        let rect = self.button_rect();
        self.controller.pointer_down(input, rect)
    }

    pub fn pointer_move(&mut self, input: PointerInput) -> DragStep {
        self.controller.pointer_move(input)
    }

    pub fn pointer_up(&mut self, kind: PointerKind, now: Duration) -> DragStep {
        self.controller.pointer_up(kind, self.viewport, now)
    }

    /// Click on the floating button. Returns `true` if the panel toggled.
    pub fn click(&mut self, now: Duration) -> bool {
        if self.guard.take(now) && !self.controller.is_dragging() {
            self.toggle();
            true
        } else {
            debug!("click suppressed");
            false
        }
    }

    pub fn open(&mut self) {
        self.set_open(true);
    }

    pub fn close(&mut self) {
        self.set_open(false);
        self.viewing_plans = false;
    }

    pub fn toggle(&mut self) {
        if self.open {
            self.close();
        } else {
            self.open();
        }
    }

    fn set_open(&mut self, open: bool) {
        if self.open != open {
            debug!(open, "panel toggled");
        }
        self.open = open;
        self.controller.set_disabled(open);
    }

    /// Open the panel on the plans view.
    pub fn open_plans(&mut self) {
        self.open();
        self.viewing_plans = true;
    }

    pub fn set_viewing_plans(&mut self, viewing: bool) {
        self.viewing_plans = viewing;
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Advance host time. Returns `true` if the drag phase changed.
    pub fn tick(&mut self, now: Duration) -> bool {
        self.controller.tick(now)
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.controller.fit_to_viewport(self.button_size, viewport);
    }

    /// Abort any gesture and release host listeners.
    pub fn teardown(&mut self) {
        self.guard.disarm();
        self.controller.teardown();
    }

    #[must_use]
    pub fn view(&self, connection: &ConnectionState, subscription: &SubscriptionState) -> PanelView {
        let docked = self.controller.docked();
        PanelView {
            visible: self.visible,
            open: self.open,
            dragging: self.controller.phase() == DragPhase::Dragging,
            snapping: self.controller.is_snapping(),
            side: docked.side,
            vertical_offset: docked.vertical_offset,
            button: self.button_rect(),
            content: self.content(connection, subscription),
        }
    }

    fn content(&self, connection: &ConnectionState, subscription: &SubscriptionState) -> PanelContent {
        if !self.open {
            return PanelContent::Closed;
        }
        if !connection.is_connected() {
            return PanelContent::ConnectPrompt {
                is_connecting: connection.is_connecting,
            };
        }
        let account = AccountView {
            display_name: connection
                .wallet()
                .map(|w| w.display_name())
                .unwrap_or_default(),
            display_address: connection.display_address(),
            network_name: connection.chain_id.network_name(),
            balance: connection.balance.clone(),
        };
        let subscription = match (subscription.is_active, subscription.plan) {
            (true, Some(plan)) => SubscriptionView::Active {
                plan,
                expires_at: subscription.expires_at,
            },
            _ if self.viewing_plans => SubscriptionView::ViewingPlans {
                plans: Plan::ALL.to_vec(),
            },
            _ => SubscriptionView::Inactive,
        };
        PanelContent::Connected {
            account,
            subscription,
        }
    }
}
