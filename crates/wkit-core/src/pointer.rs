#![forbid(unsafe_code)]

//! Pointer tracking: classifies a press as a click or a drag.
//!
//! [`PointerTracker`] owns at most one gesture session at a time. A session
//! starts on mouse-down / touch-start, is updated on every move sample, and
//! ends on mouse-up / touch-end (or on teardown via [`PointerTracker::abort`]).
//!
//! # State Machine
//!
//! ```text
//!   Idle --begin--> Pressed --move beyond threshold--> Dragging
//!    ^                 |                                   |
//!    +------end--------+ (Click)              end (DragEnd)+
//! ```
//!
//! # Invariants
//!
//! 1. While the cumulative displacement is `<= threshold` on both axes the
//!    session reports `crossed_threshold = false` and produces no position.
//! 2. Once crossed, the flag stays set for the rest of the session.
//! 3. Every `begin` that returns [`ListenerCommand::Attach`] is matched by
//!    exactly one [`ListenerCommand::Detach`], returned from `end` or `abort`.
//! 4. Touch moves request `preventDefault` only after the threshold is
//!    crossed, so a plain tap keeps native scrolling behavior.
//!
//! # Failure Modes
//!
//! - A `begin` while a session is active is ignored (returns `None`). Browser
//!   event semantics never produce it; a leaked session would otherwise attach
//!   listeners twice.
//! - Move or end samples from a different device kind than the session's are
//!   ignored.

use tracing::{debug, warn};

use crate::event::{ListenerCommand, PointerInput, PointerKind};
use crate::geometry::{Point, Rect};

/// Minimum per-axis displacement (px) before a press becomes a drag.
pub const DEFAULT_DRAG_THRESHOLD_PX: f64 = 5.0;

/// Thresholds for pointer tracking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerTrackerConfig {
    /// A drag starts once `|dx| > threshold_px` or `|dy| > threshold_px`
    /// (default: 5.0).
    pub threshold_px: f64,
}

impl Default for PointerTrackerConfig {
    fn default() -> Self {
        Self {
            threshold_px: DEFAULT_DRAG_THRESHOLD_PX,
        }
    }
}

/// Ephemeral state of one press-move-release gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DragSession {
    kind: PointerKind,
    pointer_origin: Point,
    element_origin_rect: Rect,
    has_crossed_threshold: bool,
    current_rect: Rect,
}

/// Result of one move sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerMove {
    /// Whether the session has crossed the drag threshold.
    pub crossed_threshold: bool,
    /// True only for the sample that crossed the threshold.
    pub just_crossed: bool,
    /// New absolute top-left of the element, once the threshold is crossed.
    pub position: Option<Point>,
    /// The host should call `preventDefault()` on the native event.
    pub prevent_default: bool,
}

/// How a gesture ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseKind {
    /// The threshold was never crossed.
    Click,
    /// The threshold was crossed; the caller proceeds to snap resolution.
    DragEnd,
}

/// Result of ending a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerRelease {
    pub kind: ReleaseKind,
    /// Element bounds at release (the last dragged position).
    pub final_rect: Rect,
    /// Listener detach command for the session's device kind.
    pub command: ListenerCommand,
}

/// Stateful click-vs-drag classifier.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    config: PointerTrackerConfig,
    session: Option<DragSession>,
}

impl PointerTracker {
    #[must_use]
    pub fn new(config: PointerTrackerConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    #[must_use]
    pub const fn config(&self) -> PointerTrackerConfig {
        self.config
    }

    /// Whether a session is in progress.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Whether the active session has crossed the drag threshold.
    #[inline]
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.session.is_some_and(|s| s.has_crossed_threshold)
    }

    /// Device kind of the active session.
    #[must_use]
    pub fn session_kind(&self) -> Option<PointerKind> {
        self.session.map(|s| s.kind)
    }

    /// Element bounds as currently dragged, if a session is active.
    #[must_use]
    pub fn current_rect(&self) -> Option<Rect> {
        self.session.map(|s| s.current_rect)
    }

    /// Start a session at `input`, recording the element's current bounds.
    ///
    /// Returns the listener command the host must apply, or `None` when a
    /// session is already active.
    pub fn begin(&mut self, input: PointerInput, element_rect: Rect) -> Option<ListenerCommand> {
        if let Some(active) = self.session {
            warn!(
                active = active.kind.as_str(),
                incoming = input.kind.as_str(),
                "pointer begin ignored: session already active"
            );
            return None;
        }
        self.session = Some(DragSession {
            kind: input.kind,
            pointer_origin: input.position(),
            element_origin_rect: element_rect,
            has_crossed_threshold: false,
            current_rect: element_rect,
        });
        debug!(kind = input.kind.as_str(), x = input.x, y = input.y, "pointer session begin");
        Some(ListenerCommand::Attach { kind: input.kind })
    }

    /// Feed one move sample. Returns `None` if there is no matching session.
    pub fn move_to(&mut self, input: PointerInput) -> Option<PointerMove> {
        let threshold = self.config.threshold_px;
        let session = self.session.as_mut().filter(|s| s.kind == input.kind)?;

        let (dx, dy) = input.position().delta_from(session.pointer_origin);
        let mut just_crossed = false;
        if !session.has_crossed_threshold && (dx.abs() > threshold || dy.abs() > threshold) {
            session.has_crossed_threshold = true;
            just_crossed = true;
            debug!(dx, dy, "pointer drag threshold crossed");
        }

        if !session.has_crossed_threshold {
            return Some(PointerMove {
                crossed_threshold: false,
                just_crossed: false,
                position: None,
                prevent_default: false,
            });
        }

        let origin = session.element_origin_rect.origin();
        let position = Point::new(origin.x + dx, origin.y + dy);
        session.current_rect = session.element_origin_rect.with_origin(position);
        Some(PointerMove {
            crossed_threshold: true,
            just_crossed,
            position: Some(position),
            prevent_default: input.kind == PointerKind::Touch,
        })
    }

    /// End the session for `kind`.
    ///
    /// `touchend` carries no coordinates for the lifted finger, so the release
    /// position is the last dragged position rather than the end sample.
    pub fn end(&mut self, kind: PointerKind) -> Option<PointerRelease> {
        let session = self.session.filter(|s| s.kind == kind)?;
        self.session = None;
        let release_kind = if session.has_crossed_threshold {
            ReleaseKind::DragEnd
        } else {
            ReleaseKind::Click
        };
        debug!(kind = kind.as_str(), release = ?release_kind, "pointer session end");
        Some(PointerRelease {
            kind: release_kind,
            final_rect: session.current_rect,
            command: ListenerCommand::Detach { kind },
        })
    }

    /// Drop any active session without classifying it (teardown path).
    pub fn abort(&mut self) -> Option<ListenerCommand> {
        let session = self.session.take()?;
        debug!(kind = session.kind.as_str(), "pointer session aborted");
        Some(ListenerCommand::Detach { kind: session.kind })
    }
}
