#![forbid(unsafe_code)]

//! WalletKit public facade crate.
//!
//! Re-exports the stable surface of the internal crates and offers a small
//! prelude for host integrations.

// --- Core re-exports -------------------------------------------------------

pub use wkit_core::{ListenerCommand, Point, PointerInput, PointerKind, Rect, Size, Viewport};

// --- Layout re-exports -----------------------------------------------------

pub use wkit_layout::{
    DockSide, DockedPosition, DragStep, EdgeSnapResolver, ListenerHost, NoopListenerHost,
};

// --- Wallet re-exports -----------------------------------------------------

pub use wkit_wallet::{
    Address, ChainId, NetworkConfig, NetworkUpdate, Plan, ProviderNotification, SimulatedWallet,
    WalletPort,
};

// --- Runtime re-exports ----------------------------------------------------

pub use wkit_runtime::{
    Account, ConnectSettlement, ConnectTicket, ConnectionState, EventBus, ListenerId,
    NetworkManager, SubscriptionState, WallClock, WalletContext, WidgetEvent,
};

// --- Web re-exports --------------------------------------------------------

#[cfg(feature = "web")]
pub use wkit_web::{PanelView, ShellConfig, WalletKitWidget, WidgetConfig, WidgetSlot};

// --- Errors ---------------------------------------------------------------

/// Any failure surfaced by the WalletKit API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Domain(#[from] wkit_wallet::DomainError),
    #[error(transparent)]
    NetworkConfig(#[from] wkit_wallet::NetworkConfigError),
    #[error(transparent)]
    Wallet(#[from] wkit_wallet::WalletPortError),
    #[error(transparent)]
    Purchase(#[from] wkit_runtime::PurchaseError),
    #[error(transparent)]
    Network(#[from] wkit_runtime::NetworkManagerError),
    #[error(transparent)]
    Storage(#[from] wkit_runtime::StorageError),
    #[cfg(feature = "web")]
    #[error(transparent)]
    Init(#[from] wkit_web::InitError),
    #[cfg(feature = "web")]
    #[error(transparent)]
    Config(#[from] wkit_web::ConfigError),
}

/// Standard result type for WalletKit APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Account, Address, ChainId, ConnectSettlement, DockSide, Error, Plan, PointerInput,
        PointerKind, Result, SubscriptionState, Viewport, WalletContext, WidgetEvent,
    };

    #[cfg(feature = "web")]
    pub use crate::{WalletKitWidget, WidgetConfig};

    pub use crate::{core, layout, runtime, wallet};
    #[cfg(feature = "web")]
    pub use crate::web;
}

pub use wkit_core as core;
pub use wkit_layout as layout;
pub use wkit_runtime as runtime;
pub use wkit_wallet as wallet;
#[cfg(feature = "web")]
pub use wkit_web as web;
