#![forbid(unsafe_code)]

//! Log levels emitted by the runtime stores.
//!
//! `info` for lifecycle milestones, `warn` for recoverable conditions,
//! `error` only for provider rejections.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use tracing::Level;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};
use wkit_runtime::{ManualWallClock, WalletContext};
use wkit_wallet::{SimulatedWallet, WalletPortError};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Captured {
    level: Level,
    target: String,
    message: String,
}

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<Captured>>>);

struct MessageVisitor(String);

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: tracing::Subscriber> Layer<S> for Capture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.0.lock().unwrap().push(Captured {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message: visitor.0,
        });
    }
}

fn with_captured_tracing(f: impl FnOnce()) -> Vec<Captured> {
    let capture = Capture::default();
    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::filter::LevelFilter::INFO)
        .with(capture.clone());
    tracing::subscriber::with_default(subscriber, || {
        tracing::callsite::rebuild_interest_cache();
        f();
    });
    let events = capture.0.lock().unwrap().clone();
    events
}

fn at(events: &[Captured], level: Level) -> Vec<&str> {
    events
        .iter()
        .filter(|e| e.level == level && e.target.starts_with("wkit_runtime"))
        .map(|e| e.message.as_str())
        .collect()
}

fn context(wallet: SimulatedWallet) -> WalletContext {
    WalletContext::builder()
        .with_wallet(wallet)
        .with_clock(ManualWallClock::new(0))
        .build()
}

#[test]
fn happy_path_logs_only_info() {
    let events = with_captured_tracing(|| {
        let mut ctx = context(SimulatedWallet::with_seed(1));
        let ticket = ctx.connect(Duration::ZERO);
        ctx.tick(ticket.deadline);
        ctx.purchase("2").unwrap();
        ctx.disconnect();
    });

    assert_eq!(
        at(&events, Level::INFO),
        vec!["wallet connected", "subscription purchased", "wallet disconnected"]
    );
    assert!(at(&events, Level::WARN).is_empty());
    assert!(at(&events, Level::ERROR).is_empty());
}

#[test]
fn recoverable_conditions_warn() {
    let events = with_captured_tracing(|| {
        let mut ctx = context(SimulatedWallet::with_seed(1));
        assert!(ctx.purchase("1").is_err());
        ctx.connect(Duration::ZERO);
        ctx.disconnect();
    });

    assert_eq!(
        at(&events, Level::WARN),
        vec!["subscription purchase rejected", "disconnect cancelled in-flight connect"]
    );
    assert!(at(&events, Level::ERROR).is_empty());
}

#[test]
fn provider_rejection_is_an_error() {
    let events = with_captured_tracing(|| {
        let mut wallet = SimulatedWallet::with_seed(1);
        wallet.fail_next(WalletPortError::Rejected("user closed the prompt".into()));
        let mut ctx = context(wallet);
        let ticket = ctx.connect(Duration::ZERO);
        ctx.tick(ticket.deadline);
        assert!(!ctx.is_connected());
    });

    assert_eq!(at(&events, Level::ERROR), vec!["wallet connection failed"]);
}
