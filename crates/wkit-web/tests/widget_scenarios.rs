#![forbid(unsafe_code)]

//! End-to-end widget scenarios driven through the host-page facade.
//!
//! Every scenario uses a seeded wallet, a manual wall clock, and explicit
//! host time, so runs are deterministic.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;
use wkit_core::{PointerInput, PointerKind, Viewport};
use wkit_layout::{DockSide, DragStep, RecordingListenerHost};
use wkit_runtime::{
    EventBus, ManualWallClock, PurchaseError, SUBSCRIPTION_PERIOD_MS, SubscriptionState, WalletContext,
    WidgetEvent,
};
use wkit_wallet::{Plan, SimulatedWallet};
use wkit_web::{InitError, PanelContent, ShellConfig, WalletKitWidget, WidgetConfig, WidgetSlot};

type Widget = WalletKitWidget<RecordingListenerHost>;
type EventLog = Rc<RefCell<Vec<(&'static str, Value)>>>;

const NOW_MS: u64 = 1_700_000_000_000;

const ALL_EVENTS: [&str; 7] = [
    WidgetEvent::READY,
    WidgetEvent::CONNECTED,
    WidgetEvent::DISCONNECTED,
    WidgetEvent::SUBSCRIPTION_CHANGED,
    WidgetEvent::CHAIN_CHANGED,
    WidgetEvent::ACCOUNT_CHANGED,
    WidgetEvent::ERROR,
];

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn names(log: &EventLog) -> Vec<&'static str> {
    log.borrow().iter().map(|(n, _)| *n).collect()
}

fn connect(w: &mut Widget) {
    let ticket = w.connect(Duration::ZERO);
    assert_eq!(ticket.deadline, ms(1000));
    w.tick(ticket.deadline);
}

fn is_lower_hex_address(s: &str) -> bool {
    s.len() == 42
        && s.starts_with("0x")
        && s[2..].bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

#[test]
fn click_without_movement_opens_panel() {
    let (mut w, log) = mount();
    let c = w.shell().button_rect().center();

    assert_eq!(w.pointer_down(PointerInput::mouse(c.x, c.y), ms(0)), DragStep::Pressed);
    assert_eq!(w.pointer_up(PointerKind::Mouse, ms(80)), DragStep::Click);
    assert!(w.click(ms(80)));

    assert!(w.shell().is_open());
    assert_eq!(w.view().content, PanelContent::ConnectPrompt { is_connecting: false });
    assert_eq!(names(&log), vec![WidgetEvent::READY]);
}

#[test]
fn drag_right_docks_right_and_suppresses_click() {
    let (mut w, _log) = mount();
    let c = w.shell().button_rect().center();

    w.pointer_down(PointerInput::mouse(c.x, c.y), ms(0));
    let step = w.pointer_move(PointerInput::mouse(c.x + 200.0, c.y));
    assert!(matches!(step, DragStep::DragStarted { .. }));
    assert!(matches!(w.pointer_up(PointerKind::Mouse, ms(60)), DragStep::Docked(_)));
    assert!(!w.click(ms(60)));

    assert_eq!(w.shell().controller().docked().side, DockSide::Right);
    assert!(!w.shell().is_open());
}

#[test]
fn drag_across_the_midline_switches_side() {
    let (mut w, _log) = mount();
    let c = w.shell().button_rect().center();
    w.pointer_down(PointerInput::touch(c.x, c.y), ms(0));
    w.pointer_move(PointerInput::touch(100.0, c.y));
    w.pointer_up(PointerKind::Touch, ms(30));
    assert_eq!(w.shell().controller().docked().side, DockSide::Left);

    let c = w.shell().button_rect().center();
    w.pointer_down(PointerInput::mouse(c.x, c.y), ms(500));
    w.pointer_move(PointerInput::mouse(c.x + 400.0, c.y));
    w.pointer_up(PointerKind::Mouse, ms(540));
    assert_eq!(w.shell().controller().docked().side, DockSide::Right);
    assert!(!w.shell().is_open());
}

#[test]
fn connect_completes_after_latency() {
    let (mut w, log) = mount();
    let ticket = w.connect(Duration::ZERO);

    assert_eq!(w.tick(ms(999)), None);
    assert!(!w.is_connected());
    assert!(w.tick(ms(1000)).is_some());
    assert!(w.is_connected());

    let account = w.get_account().expect("connected account");
    assert!(is_lower_hex_address(account.address.as_str()));
    assert_eq!(account.chain_id.get(), 1);
    assert!(w.take_settlement(ticket.id).is_some());

    let log = log.borrow();
    let (name, payload) = log.last().expect("connected event");
    assert_eq!(*name, WidgetEvent::CONNECTED);
    assert_eq!(payload["address"], json!(account.address.as_str()));
}

#[test]
fn require_subscription_while_disconnected_opens_panel() {
    let (mut w, _log) = mount();
    let mut seen = Vec::new();
    let has_access = w.require_subscription_with(|ok| seen.push(ok));

    assert!(!has_access);
    assert_eq!(seen, vec![false]);
    assert!(w.shell().is_open());
}

#[test]
fn purchase_pro_activates_for_thirty_days() {
    let (mut w, log) = mount();
    connect(&mut w);

    let state = w.purchase("2").expect("purchase succeeds");
    assert_eq!(state.plan, Some(Plan::Pro));
    assert_eq!(state.expires_at, Some(NOW_MS + 2_592_000_000));
    assert_eq!(SUBSCRIPTION_PERIOD_MS, 2_592_000_000);
    assert!(w.check_subscription().is_active);

    let log = log.borrow();
    let (name, payload) = log.last().expect("subscription event");
    assert_eq!(*name, WidgetEvent::SUBSCRIPTION_CHANGED);
    assert_eq!(payload["isActive"], json!(true));
    assert_eq!(payload["plan"], json!("Pro"));
}

#[test]
fn purchase_while_disconnected_is_rejected() {
    let (mut w, log) = mount();
    let before = w.state_version();

    assert_eq!(w.purchase("1"), Err(PurchaseError::NotConnected));
    assert_eq!(w.check_subscription(), SubscriptionState::default());
    assert_eq!(w.state_version(), before);
    assert_eq!(names(&log), vec![WidgetEvent::READY, WidgetEvent::ERROR]);
}

#[test]
fn disconnect_during_connect_cancels() {
    let (mut w, log) = mount();
    let ticket = w.connect(Duration::ZERO);
    w.disconnect();
    assert_eq!(w.tick(ms(1000)), None);
    assert!(!w.is_connected());
    assert!(w.take_settlement(ticket.id).is_some());
    assert_eq!(names(&log), vec![WidgetEvent::READY, WidgetEvent::DISCONNECTED]);
}

// --- Single instance -----------------------------------------------------

#[derive(Clone, Default)]
struct WarnCapture(Arc<Mutex<Vec<String>>>);

struct MessageVisitor(Option<String>);

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = Some(format!("{value:?}"));
        }
    }
}

impl<S: tracing::Subscriber> Layer<S> for WarnCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != tracing::Level::WARN {
            return;
        }
        let mut visitor = MessageVisitor(None);
        event.record(&mut visitor);
        if let Some(message) = visitor.0 {
            self.0.lock().expect("capture lock").push(message);
        }
    }
}

#[test]
fn second_init_warns_and_keeps_first_widget() {
    let capture = WarnCapture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());

    tracing::subscriber::with_default(subscriber, || {
        tracing::callsite::rebuild_interest_cache();
        let mut slot: WidgetSlot<Widget> = WidgetSlot::new();
        slot.install(|| mount().0).expect("first init");
        slot.get_mut().expect("installed").open();

        let mut built_again = false;
        let second = slot.install(|| {
            built_again = true;
            mount().0
        });
        assert_eq!(second.err(), Some(InitError::AlreadyInitialized));
        assert!(!built_again);
        assert!(slot.get().expect("still installed").shell().is_open());

        let widget = slot.take().expect("take");
        widget.destroy();
        assert_eq!(slot.get().err(), Some(InitError::Destroyed));
    });

    let warnings = capture.0.lock().expect("capture lock").clone();
    assert_eq!(warnings, vec!["WalletKit widget is already initialized".to_string()]);
}

#[test]
fn destroy_mid_drag_releases_host_listeners() {
    let host = RecordingListenerHost::new();
    let (mut w, log) = mount_with_host(host.clone());
    let c = w.shell().button_rect().center();
    w.pointer_down(PointerInput::mouse(c.x, c.y), ms(0));
    w.pointer_move(PointerInput::mouse(c.x - 50.0, c.y));
    assert_eq!(host.attached(PointerKind::Mouse), 1);

    w.destroy();
    assert_eq!(host.attached(PointerKind::Mouse), 0);
    assert_eq!(names(&log), vec![WidgetEvent::READY]);
}

fn mount() -> (Widget, EventLog) {
    mount_with_host(RecordingListenerHost::new())
}

/// Mount with a recorder registered before `ready` fires.
fn mount_with_host(host: RecordingListenerHost) -> (Widget, EventLog) {
    let bus = EventBus::new();
    let log: EventLog = Rc::new(RefCell::new(Vec::new()));
    for name in ALL_EVENTS {
        let l = Rc::clone(&log);
        bus.on(name, move |e| l.borrow_mut().push((e.name(), e.payload())));
    }
    let ctx = WalletContext::builder()
        .with_wallet(SimulatedWallet::with_seed(42))
        .with_clock(ManualWallClock::new(NOW_MS))
        .with_bus(bus);
    let widget = WalletKitWidget::mount(
        WidgetConfig::default(),
        ctx,
        ShellConfig::default(),
        Viewport::new(800.0, 600.0),
        host,
    );
    (widget, log)
}
