#![forbid(unsafe_code)]

//! Edge docking for the floating widget.
//!
//! - [`snap::EdgeSnapResolver`] is a pure function from a rectangle and a
//!   viewport to a [`dock::DockedPosition`].
//! - [`drag_dock::DraggableWidgetController`] composes the pointer tracker
//!   from `wkit-core` with the resolver, owns the docked position, and applies
//!   listener commands through a [`host::ListenerHost`].

pub mod dock;
pub mod drag_dock;
pub mod host;
pub mod snap;

pub use dock::{DEFAULT_EDGE_MARGIN_PX, DockSide, DockedPosition};
pub use drag_dock::{
    DEFAULT_SNAP_ANIMATION, DragDockConfig, DragEndInfo, DragIgnoredReason, DragPhase, DragStep,
    DraggableWidgetController,
};
pub use host::{ListenerHost, NoopListenerHost, RecordingListenerHost};
pub use snap::{EdgeSnapConfig, EdgeSnapResolver, clamp_center, vertical_bounds};
