#![forbid(unsafe_code)]

//! Typed widget-lifecycle event bus.
//!
//! Each widget instance owns one [`EventBus`]; instances never cross-talk.
//! Events carry a stable name (`connected`, ...), a namespaced channel
//! (`walletkit:connected`), and a plain JSON payload for host pages.
//!
//! # Invariants
//!
//! 1. Handlers for one name run in registration order.
//! 2. A handler registered during an emission is not invoked for that event.
//! 3. A handler removed during an emission is not invoked afterwards, even
//!    for the event in flight.
//! 4. A `once` handler runs at most one time.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;
use wkit_wallet::{Address, ChainId, Plan};

/// Prefix of every channel name.
pub const CHANNEL_PREFIX: &str = "walletkit:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Inactive,
}

/// Everything the widget broadcasts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    Ready,
    Connected {
        address: Address,
        chain_id: ChainId,
    },
    Disconnected,
    SubscriptionChanged {
        status: SubscriptionStatus,
        is_active: bool,
        plan: Option<Plan>,
    },
    ChainChanged {
        chain_id: ChainId,
    },
    AccountChanged {
        address: Address,
    },
    /// User-visible failure (precondition, provider rejection).
    Error {
        code: String,
        message: String,
    },
}

impl WidgetEvent {
    pub const READY: &'static str = "ready";
    pub const CONNECTED: &'static str = "connected";
    pub const DISCONNECTED: &'static str = "disconnected";
    pub const SUBSCRIPTION_CHANGED: &'static str = "subscriptionChanged";
    pub const CHAIN_CHANGED: &'static str = "chainChanged";
    pub const ACCOUNT_CHANGED: &'static str = "accountChanged";
    pub const ERROR: &'static str = "error";

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Ready => Self::READY,
            Self::Connected { .. } => Self::CONNECTED,
            Self::Disconnected => Self::DISCONNECTED,
            Self::SubscriptionChanged { .. } => Self::SUBSCRIPTION_CHANGED,
            Self::ChainChanged { .. } => Self::CHAIN_CHANGED,
            Self::AccountChanged { .. } => Self::ACCOUNT_CHANGED,
            Self::Error { .. } => Self::ERROR,
        }
    }

    /// `walletkit:<name>`.
    #[must_use]
    pub fn channel(&self) -> String {
        format!("{CHANNEL_PREFIX}{}", self.name())
    }

    /// Plain data handed to host-page handlers; `null` for bare signals.
    #[must_use]
    pub fn payload(&self) -> Value {
        match self {
            Self::Ready | Self::Disconnected => Value::Null,
            Self::Connected { address, chain_id } => json!({
                "address": address.as_str(),
                "chainId": chain_id.get(),
            }),
            Self::SubscriptionChanged {
                status,
                is_active,
                plan,
            } => json!({
                "status": status,
                "isActive": is_active,
                "plan": plan.map(Plan::name),
            }),
            Self::ChainChanged { chain_id } => json!({ "chainId": chain_id.get() }),
            Self::AccountChanged { address } => json!({ "address": address.as_str() }),
            Self::Error { code, message } => json!({ "code": code, "message": message }),
        }
    }
}

/// Handle returned by [`EventBus::on`], used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Handler = Rc<dyn Fn(&WidgetEvent)>;

struct Registration {
    id: ListenerId,
    name: String,
    once: bool,
    handler: Handler,
}

#[derive(Default)]
struct BusInner {
    next_id: u64,
    registrations: Vec<Registration>,
}

/// Per-instance pub/sub channel. Clones share registrations.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Rc<RefCell<BusInner>>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.inner.borrow().registrations.len())
            .finish()
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&self, name: &str, once: bool, handler: Handler) -> ListenerId {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = ListenerId(inner.next_id);
        inner.registrations.push(Registration {
            id,
            name: name.to_string(),
            once,
            handler,
        });
        id
    }

    /// Register `handler` for events named `name`.
    pub fn on(&self, name: &str, handler: impl Fn(&WidgetEvent) + 'static) -> ListenerId {
        self.register(name, false, Rc::new(handler))
    }

    /// Register `handler` for the next event named `name` only.
    pub fn once(&self, name: &str, handler: impl Fn(&WidgetEvent) + 'static) -> ListenerId {
        self.register(name, true, Rc::new(handler))
    }

    /// Unregister; returns `false` if `id` was unknown or already removed.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.registrations.len();
        inner.registrations.retain(|r| r.id != id);
        inner.registrations.len() != before
    }

    /// Deliver `event` to every handler registered for its name.
    pub fn emit(&self, event: &WidgetEvent) {
        let name = event.name();
        let targets: Vec<(ListenerId, bool, Handler)> = {
            let mut inner = self.inner.borrow_mut();
            let targets = inner
                .registrations
                .iter()
                .filter(|r| r.name == name)
                .map(|r| (r.id, r.once, Rc::clone(&r.handler)))
                .collect();
            inner.registrations.retain(|r| !(r.once && r.name == name));
            targets
        };
        debug!(event = name, handlers = targets.len(), "widget event emitted");
        for (id, once, handler) in targets {
            // `once` entries are already unregistered; the rest may have been
            // removed by an earlier handler in this loop.
            if once || self.is_live(id) {
                handler(event);
            }
        }
    }

    fn is_live(&self, id: ListenerId) -> bool {
        self.inner.borrow().registrations.iter().any(|r| r.id == id)
    }

    /// Remove every handler.
    pub fn clear(&self) {
        self.inner.borrow_mut().registrations.clear();
    }

    #[must_use]
    pub fn handler_count(&self, name: &str) -> usize {
        self.inner
            .borrow()
            .registrations
            .iter()
            .filter(|r| r.name == name)
            .count()
    }

    /// Names with at least one handler, in first-registration order.
    #[must_use]
    pub fn event_names(&self) -> Vec<String> {
        let inner = self.inner.borrow();
        let mut names: Vec<String> = Vec::new();
        for r in &inner.registrations {
            if !names.contains(&r.name) {
                names.push(r.name.clone());
            }
        }
        names
    }
}
