#![forbid(unsafe_code)]

//! WalletKit Runtime
//!
//! State and coordination for one widget instance.
//!
//! # Key Components
//!
//! - [`Observable`] - Version-tracked shared value with change notification
//! - [`EventBus`] - Named-event broadcast to host-page listeners
//! - [`ConnectionStore`] - Wallet connection state, driven by host time
//! - [`SubscriptionStore`] - Purchased plan and its expiry
//! - [`NetworkManager`] - Preset and custom networks with persistence
//! - [`WalletContext`] - All of the above wired to one bus
//!
//! # How it fits in the system
//! `wkit-runtime` sits between the wallet domain (`wkit-wallet`) and the
//! widget shell (`wkit-web`). Nothing here reads a clock by itself: the shell
//! passes monotonic time into `connect`/`tick`, and a [`WallClock`] supplies
//! epoch timestamps for subscription expiry.

pub mod clock;
pub mod connection;
pub mod context;
pub mod error;
pub mod event_bus;
pub mod network_manager;
pub mod reactive;
pub mod subscription;

pub use clock::{ManualWallClock, SystemWallClock, WallClock};
pub use connection::{
    Account, CONNECT_CHAIN, ConnectSettlement, ConnectTicket, ConnectionState, ConnectionStore,
    ZERO_BALANCE,
};
pub use context::{WalletContext, WalletContextBuilder};
pub use error::{NetworkManagerError, PurchaseError, StorageError};
pub use event_bus::{CHANNEL_PREFIX, EventBus, ListenerId, SubscriptionStatus, WidgetEvent};
pub use network_manager::{MemoryNetworkStorage, NetworkEvent, NetworkManager, NetworkStorage};
pub use reactive::{Observable, Subscription};
pub use subscription::{SUBSCRIPTION_PERIOD_MS, SubscriptionState, SubscriptionStore};
