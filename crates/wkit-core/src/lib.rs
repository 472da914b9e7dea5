#![forbid(unsafe_code)]

//! Core: geometry primitives, normalized pointer input, and drag tracking.
//!
//! # Role in WalletKit
//! `wkit-core` is the input layer. It knows nothing about wallets or panels;
//! it turns raw mouse and single-finger touch samples into one gesture
//! abstraction and tells the host which global listeners to attach and
//! detach for the lifetime of a gesture.
//!
//! # Primary responsibilities
//! - **Geometry**: [`geometry::Point`], [`geometry::Rect`], [`geometry::Viewport`]
//!   in CSS pixels.
//! - **Pointer input**: [`event::PointerInput`] normalizes mouse and touch.
//! - **Tracking**: [`pointer::PointerTracker`] classifies a press as a click or
//!   a drag using an axis-wise movement threshold.
//!
//! # How it fits in the system
//! `wkit-layout` composes the tracker with edge snapping into the drag/dock
//! controller; `wkit-web` feeds it events forwarded by the rendering surface.

pub mod event;
pub mod geometry;
pub mod pointer;

pub use event::{ListenerCommand, PointerInput, PointerKind};
pub use geometry::{Point, Rect, Size, Viewport};
pub use pointer::{
    DEFAULT_DRAG_THRESHOLD_PX, PointerMove, PointerRelease, PointerTracker, PointerTrackerConfig,
    ReleaseKind,
};
