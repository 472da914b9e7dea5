#![forbid(unsafe_code)]

//! `wasm-bindgen` exports for the page-wide widget handle.
//!
//! Only compiled on `wasm32`. Every export runs against one thread-local
//! [`WidgetSlot`]. Calls into JavaScript (event handlers, listener-host
//! commands, callbacks) are queued while the widget is borrowed and run once
//! the borrow is released, so a handler may call back into the widget.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::Duration;

use js_sys::{Array, Function, JSON, Object, Promise, Reflect};
use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_time::Instant;
use wkit_core::{ListenerCommand, PointerInput, PointerKind, Viewport};
use wkit_layout::{DragStep, ListenerHost};
use wkit_runtime::{ConnectSettlement, EventBus, WalletContext, WidgetEvent};
use wkit_wallet::ProviderNotification;

use crate::api::WalletKitWidget;
use crate::config::WidgetConfig;
use crate::global::WidgetSlot;
use crate::shell::ShellConfig;
use crate::waiters::SettlementWaiters;

type Widget = WalletKitWidget<JsListenerHost>;
type Deferred = Box<dyn FnOnce()>;

const EVENT_NAMES: [&str; 7] = [
    WidgetEvent::READY,
    WidgetEvent::CONNECTED,
    WidgetEvent::DISCONNECTED,
    WidgetEvent::SUBSCRIPTION_CHANGED,
    WidgetEvent::CHAIN_CHANGED,
    WidgetEvent::ACCOUNT_CHANGED,
    WidgetEvent::ERROR,
];

/// Re-check interval when a connect timer fires before its deadline.
const SETTLE_RETRY_MS: f64 = 10.0;

thread_local! {
    static SLOT: RefCell<WidgetSlot<Widget>> = const { RefCell::new(WidgetSlot::new()) };
    static PENDING: RefCell<VecDeque<Deferred>> = RefCell::new(VecDeque::new());
    static EPOCH: Instant = Instant::now();
    static WAITERS: RefCell<SettlementWaiters<(Function, Function)>> =
        RefCell::new(SettlementWaiters::new());
}

fn now() -> Duration {
    EPOCH.with(Instant::elapsed)
}

fn defer(call: impl FnOnce() + 'static) {
    PENDING.with(|q| q.borrow_mut().push_back(Box::new(call)));
}

fn flush() {
    while let Some(call) = PENDING.with(|q| q.borrow_mut().pop_front()) {
        call();
    }
}

fn with_widget<R>(f: impl FnOnce(&mut Widget) -> R) -> Result<R, JsValue> {
    let result = SLOT.with(|slot| {
        let mut slot = slot
            .try_borrow_mut()
            .map_err(|_| JsValue::from_str("WalletKit widget is busy"))?;
        let widget = slot
            .get_mut()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok::<R, JsValue>(f(widget))
    });
    flush();
    result
}

fn global_fn(name: &str) -> Option<Function> {
    Reflect::get(&js_sys::global(), &JsValue::from_str(name))
        .ok()?
        .dyn_into::<Function>()
        .ok()
}

fn console(level: &str, msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(f) = Reflect::get(&console, &level.into()) else {
        return;
    };
    let Ok(f) = f.dyn_into::<Function>() else {
        return;
    };
    let _ = f.call1(&console, &JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = match info.location() {
                Some(loc) => format!("panic at {}:{}:{}: {info}", loc.file(), loc.line(), loc.column()),
                None => format!("panic: {info}"),
            };
            console("error", &msg);
        }));
    });
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    serde_json::to_string(value)
        .ok()
        .and_then(|json| JSON::parse(&json).ok())
        .unwrap_or(JsValue::NULL)
}

/// `window.dispatchEvent(new CustomEvent(channel, { detail }))`.
fn dispatch_window_event(channel: &str, detail: &JsValue) {
    let global = js_sys::global();
    let (Some(ctor), Some(dispatch)) = (global_fn("CustomEvent"), global_fn("dispatchEvent")) else {
        return;
    };
    let init = Object::new();
    let _ = Reflect::set(&init, &"detail".into(), detail);
    let args = Array::of2(&JsValue::from_str(channel), &init);
    if let Ok(event) = Reflect::construct(&ctor, &args) {
        let _ = dispatch.call1(&global, &event);
    }
}

fn set_timeout(callback: JsValue, ms: f64) {
    if let Some(set_timeout) = global_fn("setTimeout") {
        let _ = set_timeout.call2(&js_sys::global(), &callback, &JsValue::from_f64(ms));
    }
}

/// Forwards listener commands to a JS `(action, kind)` callback.
#[derive(Debug, Default)]
pub struct JsListenerHost {
    callback: Option<Function>,
}

impl ListenerHost for JsListenerHost {
    fn apply(&mut self, command: ListenerCommand) {
        let Some(callback) = self.callback.clone() else {
            return;
        };
        let action = match command {
            ListenerCommand::Attach { .. } => "attach",
            ListenerCommand::Detach { .. } => "detach",
        };
        let kind = command.kind().as_str();
        defer(move || {
            let _ = callback.call2(&JsValue::NULL, &action.into(), &kind.into());
        });
    }
}

fn parse_kind(kind: &str) -> Result<PointerKind, JsValue> {
    match kind {
        "mouse" => Ok(PointerKind::Mouse),
        "touch" => Ok(PointerKind::Touch),
        other => Err(JsValue::from_str(&format!("unknown pointer kind: {other}"))),
    }
}

fn config_from_attributes(attributes: &JsValue) -> WidgetConfig {
    let Some(obj) = attributes.dyn_ref::<Object>() else {
        return WidgetConfig::default();
    };
    let pairs: Vec<(String, String)> = Object::entries(obj)
        .iter()
        .filter_map(|entry| {
            let entry = entry.dyn_into::<Array>().ok()?;
            Some((entry.get(0).as_string()?, entry.get(1).as_string()?))
        })
        .collect();
    WidgetConfig::from_attributes(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
}

/// Mount the widget. `attributes` holds the host markup's `data-*`
/// attributes; `listener_host` receives `(action, kind)` for the
/// document-level move/up listeners.
///
/// A second call while a widget is live logs a warning and does nothing.
#[wasm_bindgen(js_name = init)]
pub fn init(
    attributes: JsValue,
    viewport_width: f64,
    viewport_height: f64,
    listener_host: Option<Function>,
) -> Result<(), JsValue> {
    install_panic_hook();
    let config = config_from_attributes(&attributes);

    let bus = EventBus::new();
    for name in EVENT_NAMES {
        bus.on(name, |event| {
            let channel = event.channel();
            let detail = to_js(&event.payload());
            defer(move || dispatch_window_event(&channel, &detail));
        });
    }

    let installed = SLOT.with(|slot| {
        let mut slot = slot
            .try_borrow_mut()
            .map_err(|_| JsValue::from_str("WalletKit widget is busy"))?;
        let result = slot.install(|| {
            WalletKitWidget::mount(
                config,
                WalletContext::builder().with_bus(bus),
                ShellConfig::default(),
                Viewport::new(viewport_width, viewport_height),
                JsListenerHost {
                    callback: listener_host,
                },
            )
        });
        Ok::<_, JsValue>(result.is_ok())
    });
    flush();
    if !installed? {
        console("warn", "WalletKit widget is already initialized");
    }
    Ok(())
}

#[wasm_bindgen(js_name = isConnected)]
pub fn is_connected() -> Result<bool, JsValue> {
    with_widget(|w| w.is_connected())
}

/// `{address, chainId, balance}` or `null`.
#[wasm_bindgen(js_name = getAccount)]
pub fn get_account() -> Result<JsValue, JsValue> {
    with_widget(|w| w.get_account().as_ref().map_or(JsValue::NULL, to_js))
}

#[wasm_bindgen(js_name = checkSubscription)]
pub fn check_subscription(callback: Option<Function>) -> Result<JsValue, JsValue> {
    let status = with_widget(|w| to_js(&w.check_subscription()))?;
    if let Some(callback) = callback {
        callback.call1(&JsValue::NULL, &status)?;
    }
    Ok(status)
}

fn settle_waiters(settlement: &ConnectSettlement, waiters: Vec<(Function, Function)>) {
    for (resolve, reject) in waiters {
        let _ = match settlement {
            ConnectSettlement::Failed(err) => {
                reject.call1(&JsValue::NULL, &JsValue::from_str(&err.to_string()))
            }
            _ => resolve.call0(&JsValue::NULL),
        };
    }
}

/// Poll `ticket` after `delay_ms`. Only the first waiter on a ticket runs
/// this loop; a settlement releases every waiter registered on it.
fn settle_later(ticket: u64, delay_ms: f64) {
    let callback = Closure::once_into_js(move || {
        let polled = SLOT.with(|slot| {
            let mut slot = slot
                .try_borrow_mut()
                .map_err(|_| JsValue::from_str("WalletKit widget is busy"))?;
            let widget = slot
                .get_mut()
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
            Ok::<_, JsValue>(WAITERS.with(|w| w.borrow_mut().poll(widget, ticket, now())))
        });
        flush();
        match polled {
            Ok(Some((settlement, waiters))) => settle_waiters(&settlement, waiters),
            Ok(None) => settle_later(ticket, SETTLE_RETRY_MS),
            Err(err) => {
                for (_, reject) in WAITERS.with(|w| w.borrow_mut().drain(ticket)) {
                    let _ = reject.call1(&JsValue::NULL, &err);
                }
            }
        }
    });
    set_timeout(callback, delay_ms);
}

/// Resolves once the connect attempt settles. A call made while an attempt
/// is pending joins it and settles with it. A disconnect during the attempt
/// resolves it without connecting.
#[wasm_bindgen]
pub fn connect() -> Result<Promise, JsValue> {
    let start = now();
    let ticket = with_widget(|w| w.connect(start))?;
    let delay_ms = ticket.deadline.saturating_sub(start).as_secs_f64() * 1000.0;
    Ok(Promise::new(&mut |resolve, reject| {
        let first = WAITERS.with(|w| w.borrow_mut().register(ticket.id, (resolve, reject)));
        if first {
            settle_later(ticket.id, delay_ms);
        }
    }))
}

#[wasm_bindgen]
pub fn disconnect() -> Result<(), JsValue> {
    with_widget(|w| w.disconnect())
}

#[wasm_bindgen(js_name = promptConnect)]
pub fn prompt_connect() -> Result<bool, JsValue> {
    with_widget(|w| w.prompt_connect())
}

#[wasm_bindgen(js_name = requireSubscription)]
pub fn require_subscription(callback: Option<Function>) -> Result<bool, JsValue> {
    let has_access = with_widget(|w| w.require_subscription())?;
    if let Some(callback) = callback {
        callback.call1(&JsValue::NULL, &JsValue::from_bool(has_access))?;
    }
    Ok(has_access)
}

/// Activate plan `"1"` (Basic) or `"2"` (Pro). Returns the new
/// subscription snapshot synchronously; throws on failure.
#[wasm_bindgen]
pub fn purchase(plan_id: &str) -> Result<JsValue, JsValue> {
    with_widget(|w| w.purchase(plan_id))?
        .map(|state| to_js(&state))
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen]
pub fn open() -> Result<(), JsValue> {
    with_widget(|w| w.open())
}

#[wasm_bindgen]
pub fn close() -> Result<(), JsValue> {
    with_widget(|w| w.close())
}

#[wasm_bindgen]
pub fn toggle() -> Result<(), JsValue> {
    with_widget(|w| w.toggle())
}

#[wasm_bindgen]
pub fn show() -> Result<(), JsValue> {
    with_widget(|w| w.show())
}

#[wasm_bindgen]
pub fn hide() -> Result<(), JsValue> {
    with_widget(|w| w.hide())
}

/// Subscribe to a widget event; returns the unsubscribe function.
#[wasm_bindgen]
pub fn on(event_name: &str, handler: Function) -> Result<Function, JsValue> {
    let id = with_widget(|w| {
        w.on(event_name, move |event| {
            let handler = handler.clone();
            let payload = to_js(&event.payload());
            defer(move || {
                let _ = handler.call1(&JsValue::NULL, &payload);
            });
        })
    })?;
    let unsubscribe = Closure::once_into_js(move || {
        let _ = with_widget(|w| w.off(id));
    });
    Ok(unsubscribe.unchecked_into::<Function>())
}

/// Tear down the widget and free the global handle.
#[wasm_bindgen]
pub fn destroy() -> Result<(), JsValue> {
    let widget = SLOT.with(|slot| {
        slot.try_borrow_mut()
            .map_err(|_| JsValue::from_str("WalletKit widget is busy"))?
            .take()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    })?;
    widget.destroy();
    flush();
    Ok(())
}

fn step_label(step: DragStep) -> &'static str {
    match step {
        DragStep::Pressed => "pressed",
        DragStep::Pending => "pending",
        DragStep::DragStarted { .. } => "drag_started",
        DragStep::Moved { .. } => "moved",
        DragStep::Click => "click",
        DragStep::Docked(_) => "docked",
        DragStep::Ignored(_) => "ignored",
    }
}

#[wasm_bindgen(js_name = pointerDown)]
pub fn pointer_down(kind: &str, x: f64, y: f64) -> Result<String, JsValue> {
    let kind = parse_kind(kind)?;
    with_widget(|w| step_label(w.pointer_down(PointerInput { kind, x, y }, now())).to_string())
}

/// Returns `true` when the host should call `preventDefault()` on the
/// native event.
#[wasm_bindgen(js_name = pointerMove)]
pub fn pointer_move(kind: &str, x: f64, y: f64) -> Result<bool, JsValue> {
    let kind = parse_kind(kind)?;
    with_widget(|w| match w.pointer_move(PointerInput { kind, x, y }) {
        DragStep::DragStarted { prevent_default, .. } | DragStep::Moved { prevent_default, .. } => {
            prevent_default
        }
        _ => false,
    })
}

#[wasm_bindgen(js_name = pointerUp)]
pub fn pointer_up(kind: &str) -> Result<String, JsValue> {
    let kind = parse_kind(kind)?;
    with_widget(|w| step_label(w.pointer_up(kind, now())).to_string())
}

/// Click on the floating button; returns `true` if the panel toggled.
#[wasm_bindgen]
pub fn click() -> Result<bool, JsValue> {
    with_widget(|w| w.click(now()))
}

#[wasm_bindgen]
pub fn resize(width: f64, height: f64) -> Result<(), JsValue> {
    with_widget(|w| w.resize(Viewport::new(width, height)))
}

/// Advance host time. Call from `requestAnimationFrame` while snapping.
#[wasm_bindgen]
pub fn tick() -> Result<(), JsValue> {
    with_widget(|w| {
        w.tick(now());
    })
}

/// Render model for the current state.
#[wasm_bindgen]
pub fn view() -> Result<JsValue, JsValue> {
    with_widget(|w| to_js(&w.view()))
}

#[wasm_bindgen(js_name = stateVersion)]
pub fn state_version() -> Result<f64, JsValue> {
    with_widget(|w| w.state_version() as f64)
}

/// Forward a provider notification, e.g.
/// `{"type":"chainChanged","value":137}`.
#[wasm_bindgen(js_name = providerNotification)]
pub fn provider_notification(json: &str) -> Result<(), JsValue> {
    let notification: ProviderNotification =
        serde_json::from_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    with_widget(|w| w.handle_provider_notification(notification))
}
