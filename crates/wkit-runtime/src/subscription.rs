#![forbid(unsafe_code)]

//! Subscription state.
//!
//! # Invariants
//!
//! 1. `is_active` implies `plan` and `expires_at` are both set.
//! 2. A purchase sets all three fields in one store update.
//! 3. Expiry is advisory; nothing sweeps an expired subscription.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use wkit_wallet::Plan;

use crate::error::PurchaseError;
use crate::event_bus::{EventBus, SubscriptionStatus, WidgetEvent};
use crate::reactive::{Observable, Subscription};

/// Length of a purchased subscription: 30 days.
pub const SUBSCRIPTION_PERIOD_MS: u64 = 30 * 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionState {
    pub is_active: bool,
    pub plan: Option<Plan>,
    /// Epoch milliseconds.
    pub expires_at: Option<u64>,
}

/// Owns [`SubscriptionState`] and announces purchases on the bus.
#[derive(Debug, Clone)]
pub struct SubscriptionStore {
    state: Observable<SubscriptionState>,
    bus: EventBus,
}

impl SubscriptionStore {
    #[must_use]
    pub fn new(bus: EventBus) -> Self {
        Self {
            state: Observable::new(SubscriptionState::default()),
            bus,
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn check_subscription(&self) -> SubscriptionState {
        self.state.get()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state.with(|s| s.is_active)
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.state.version()
    }

    pub fn subscribe(&self, f: impl Fn(&SubscriptionState) + 'static) -> Subscription {
        self.state.subscribe(f)
    }

    /// Activate `plan_id` for 30 days from `now_ms`.
    ///
    /// Fails without touching state when `connected` is false or the plan is
    /// unknown; the failure is also broadcast as an `error` event.
    pub fn purchase(
        &self,
        plan_id: &str,
        connected: bool,
        now_ms: u64,
    ) -> Result<SubscriptionState, PurchaseError> {
        let result = if connected {
            Plan::from_id(plan_id).map_err(|_| PurchaseError::UnknownPlan(plan_id.to_string()))
        } else {
            Err(PurchaseError::NotConnected)
        };
        let plan = match result {
            Ok(plan) => plan,
            Err(err) => {
                warn!(plan_id, code = err.code(), "subscription purchase rejected");
                self.bus.emit(&WidgetEvent::error(err.code(), err.to_string()));
                return Err(err);
            }
        };

        let next = SubscriptionState {
            is_active: true,
            plan: Some(plan),
            expires_at: Some(now_ms.saturating_add(SUBSCRIPTION_PERIOD_MS)),
        };
        self.state.set(next.clone());
        info!(plan = plan.name(), expires_at = ?next.expires_at, "subscription purchased");
        self.bus.emit(&WidgetEvent::SubscriptionChanged {
            status: SubscriptionStatus::Active,
            is_active: true,
            plan: Some(plan),
        });
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    use super::*;

    fn store_with_log() -> (SubscriptionStore, Rc<RefCell<Vec<(String, Value)>>>) {
        let bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for name in [WidgetEvent::SUBSCRIPTION_CHANGED, WidgetEvent::ERROR] {
            let l = Rc::clone(&log);
            bus.on(name, move |e| l.borrow_mut().push((e.name().to_string(), e.payload())));
        }
        (SubscriptionStore::new(bus), log)
    }

    #[test]
    fn default_is_inactive() {
        let (store, _) = store_with_log();
        assert_eq!(store.check_subscription(), SubscriptionState::default());
        assert!(!store.is_active());
    }

    #[test]
    fn purchase_pro() {
        let (store, log) = store_with_log();
        let state = store.purchase("2", true, 1_000).unwrap();
        assert_eq!(
            state,
            SubscriptionState {
                is_active: true,
                plan: Some(Plan::Pro),
                expires_at: Some(1_000 + 2_592_000_000),
            }
        );
        assert_eq!(store.check_subscription(), state);
        assert_eq!(
            *log.borrow(),
            vec![(
                "subscriptionChanged".to_string(),
                json!({"status": "active", "isActive": true, "plan": "Pro"})
            )]
        );
    }

    #[test]
    fn purchase_requires_connection() {
        let (store, log) = store_with_log();
        assert_eq!(store.purchase("1", false, 0), Err(PurchaseError::NotConnected));
        assert_eq!(store.check_subscription(), SubscriptionState::default());
        assert_eq!(store.version(), 0);
        assert_eq!(log.borrow()[0].0, "error");
        assert_eq!(log.borrow()[0].1["code"], "not_connected");
    }

    #[test]
    fn unknown_plan_rejected() {
        let (store, _) = store_with_log();
        assert_eq!(
            store.purchase("9", true, 0),
            Err(PurchaseError::UnknownPlan("9".into()))
        );
        assert!(!store.is_active());
    }

    #[test]
    fn snapshot_serializes_camel_case() {
        let (store, _) = store_with_log();
        store.purchase("1", true, 5).unwrap();
        let json = serde_json::to_value(store.check_subscription()).unwrap();
        assert_eq!(
            json,
            json!({"isActive": true, "plan": "Basic", "expiresAt": 2_592_000_005u64})
        );
    }
}
