#![forbid(unsafe_code)]

//! WalletKit web surface: the widget shell and the host-page API.
//!
//! # Key Components
//!
//! - [`WidgetShell`] - Floating button, panel open/close, click-vs-drag guard
//! - [`WalletKitWidget`] - The host-page facade over shell and wallet context
//! - [`WidgetConfig`] - Configuration read from the host markup's `data-*`
//!   attributes
//! - [`WidgetSlot`] - The single page-wide widget handle
//!
//! # How it fits in the system
//! The rendering surface forwards pointer events and a monotonic clock into
//! [`WalletKitWidget`], then draws whatever [`WalletKitWidget::view`] returns.
//! On `wasm32` the same facade is exported to JavaScript through
//! `wasm-bindgen`, backed by one thread-local [`WidgetSlot`].

pub mod api;
pub mod config;
pub mod error;
pub mod global;
#[cfg(feature = "tracing-json")]
pub mod logging;
pub mod shell;
pub mod waiters;

#[cfg(target_arch = "wasm32")]
mod wasm;

pub use api::WalletKitWidget;
pub use config::{
    ATTR_CHAIN_ID, ATTR_POSITION, ATTR_SUBSCRIPTION_CONTRACT, ATTR_THEME, WidgetConfig,
    parse_chain_id,
};
pub use error::{ConfigError, InitError};
pub use global::WidgetSlot;
#[cfg(feature = "tracing-json")]
pub use logging::init_json_logging;
pub use shell::{
    AccountView, ClickGuard, ClickGuardConfig, DEFAULT_BUTTON_SIZE, DEFAULT_MAX_PRESS, PanelContent,
    PanelView, ShellConfig, SubscriptionView, WidgetShell,
};
pub use waiters::SettlementWaiters;
