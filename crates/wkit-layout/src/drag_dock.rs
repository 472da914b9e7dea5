#![forbid(unsafe_code)]

//! Drag/dock controller: pointer tracking plus edge snapping.
//!
//! # State Machine
//!
//! ```text
//!   Idle --threshold crossed--> Dragging --release--> Snapping --tick(>= 300ms)--> Idle
//!    ^  \                                                |
//!    |   +--press+release below threshold (click)--+     +--threshold crossed--> Dragging
//!    +-----------------------------------------------+
//! ```
//!
//! `Snapping` only gates a cosmetic transition; it never blocks a new gesture.
//!
//! # Invariants
//!
//! 1. [`DraggableWidgetController::docked`] only changes when a drag ends.
//! 2. While disabled, `pointer_down` starts no session and attaches nothing.
//! 3. Listener attach/detach commands are balanced, including on teardown
//!    and on drop mid-gesture.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use wkit_core::{PointerInput, PointerKind, Rect, Size, Viewport};
//! use wkit_layout::{DockSide, DragDockConfig, DragStep, DraggableWidgetController, NoopListenerHost};
//!
//! let viewport = Viewport::new(800.0, 600.0);
//! let size = Size::new(56.0, 56.0);
//! let mut ctl = DraggableWidgetController::new(DragDockConfig::default(), size, viewport, NoopListenerHost);
//! let rect = Rect::new(724.0, 272.0, 56.0, 56.0);
//! ctl.pointer_down(PointerInput::mouse(750.0, 300.0), rect);
//! ctl.pointer_move(PointerInput::mouse(100.0, 300.0));
//! let step = ctl.pointer_up(PointerKind::Mouse, viewport, Duration::ZERO);
//! assert!(matches!(step, DragStep::Docked(pos) if pos.side == DockSide::Left));
//! ```

use std::fmt;
use std::time::Duration;

use tracing::{debug, info};
use wkit_core::{
    Point, PointerInput, PointerKind, PointerTracker, PointerTrackerConfig, Rect, ReleaseKind,
    Size, Viewport,
};

use crate::dock::{DockSide, DockedPosition};
use crate::host::ListenerHost;
use crate::snap::{EdgeSnapConfig, EdgeSnapResolver};

/// Duration of the cosmetic snap transition.
pub const DEFAULT_SNAP_ANIMATION: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragDockConfig {
    pub pointer: PointerTrackerConfig,
    pub snap: EdgeSnapConfig,
    pub snap_animation: Duration,
}

impl Default for DragDockConfig {
    fn default() -> Self {
        Self {
            pointer: PointerTrackerConfig::default(),
            snap: EdgeSnapConfig::default(),
            snap_animation: DEFAULT_SNAP_ANIMATION,
        }
    }
}

/// Controller phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging,
    /// Cosmetic transition that ends at `until`.
    Snapping { until: Duration },
}

/// Why a pointer dispatch was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragIgnoredReason {
    Disabled,
    SessionAlreadyActive,
    /// No session, or the sample came from a different device kind.
    NoMatchingSession,
}

/// Outcome of one pointer dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragStep {
    /// Press accepted; listeners attached.
    Pressed,
    /// Moved, still below the threshold.
    Pending,
    /// This sample crossed the threshold.
    DragStarted {
        position: Point,
        prevent_default: bool,
    },
    Moved {
        position: Point,
        prevent_default: bool,
    },
    /// Released without crossing the threshold.
    Click,
    /// Released after dragging; the new docked position is applied.
    Docked(DockedPosition),
    Ignored(DragIgnoredReason),
}

/// Payload of the drag-end notification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragEndInfo {
    pub side: DockSide,
    pub y: f64,
}

type DragStartFn = Box<dyn FnMut()>;
type SnapFn = Box<dyn FnMut(DockSide, f64)>;
type DragEndFn = Box<dyn FnMut(DragEndInfo)>;

#[derive(Default)]
struct Callbacks {
    on_drag_start: Option<DragStartFn>,
    on_snap: Option<SnapFn>,
    on_drag_end: Option<DragEndFn>,
}

/// Owns the drag session and the docked position of the widget.
pub struct DraggableWidgetController<H: ListenerHost> {
    config: DragDockConfig,
    tracker: PointerTracker,
    resolver: EdgeSnapResolver,
    docked: DockedPosition,
    phase: DragPhase,
    disabled: bool,
    host: H,
    callbacks: Callbacks,
}

impl<H: ListenerHost> fmt::Debug for DraggableWidgetController<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DraggableWidgetController")
            .field("config", &self.config)
            .field("tracker", &self.tracker)
            .field("docked", &self.docked)
            .field("phase", &self.phase)
            .field("disabled", &self.disabled)
            .finish_non_exhaustive()
    }
}

impl<H: ListenerHost> DraggableWidgetController<H> {
    /// Create a controller for a widget of `size`, docked right and
    /// vertically centered in `viewport`.
    pub fn new(config: DragDockConfig, size: Size, viewport: Viewport, host: H) -> Self {
        let resolver = EdgeSnapResolver::new(config.snap);
        Self {
            tracker: PointerTracker::new(config.pointer),
            docked: DockedPosition::initial(size, viewport, resolver.margin()),
            resolver,
            phase: DragPhase::Idle,
            disabled: false,
            host,
            callbacks: Callbacks::default(),
            config,
        }
    }

    pub fn on_drag_start(&mut self, f: impl FnMut() + 'static) {
        self.callbacks.on_drag_start = Some(Box::new(f));
    }

    pub fn on_snap(&mut self, f: impl FnMut(DockSide, f64) + 'static) {
        self.callbacks.on_snap = Some(Box::new(f));
    }

    pub fn on_drag_end(&mut self, f: impl FnMut(DragEndInfo) + 'static) {
        self.callbacks.on_drag_end = Some(Box::new(f));
    }

    #[must_use]
    pub const fn docked(&self) -> DockedPosition {
        self.docked
    }

    /// Bounds of a widget of `size` at the docked position.
    #[must_use]
    pub fn docked_rect(&self, size: Size, viewport: Viewport) -> Rect {
        self.docked.to_rect(size, viewport, self.resolver.margin())
    }

    /// Transient bounds while dragging.
    #[must_use]
    pub fn live_rect(&self) -> Option<Rect> {
        if self.phase == DragPhase::Dragging {
            self.tracker.current_rect()
        } else {
            None
        }
    }

    #[must_use]
    pub const fn phase(&self) -> DragPhase {
        self.phase
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.phase == DragPhase::Dragging
    }

    #[must_use]
    pub fn is_snapping(&self) -> bool {
        matches!(self.phase, DragPhase::Snapping { .. })
    }

    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Enable or disable new gestures. An active session is left alone.
    pub fn set_disabled(&mut self, disabled: bool) {
        if self.disabled != disabled {
            debug!(disabled, "drag controller disabled flag changed");
        }
        self.disabled = disabled;
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mouse-down / touch-start on the widget, with its current bounds.
    pub fn pointer_down(&mut self, input: PointerInput, element_rect: Rect) -> DragStep {
        if self.disabled {
            return DragStep::Ignored(DragIgnoredReason::Disabled);
        }
        match self.tracker.begin(input, element_rect) {
            Some(command) => {
                self.host.apply(command);
                DragStep::Pressed
            }
            None => DragStep::Ignored(DragIgnoredReason::SessionAlreadyActive),
        }
    }

    pub fn pointer_move(&mut self, input: PointerInput) -> DragStep {
        let Some(mv) = self.tracker.move_to(input) else {
            return DragStep::Ignored(DragIgnoredReason::NoMatchingSession);
        };
        let Some(position) = mv.position else {
            return DragStep::Pending;
        };
        if mv.just_crossed {
            self.phase = DragPhase::Dragging;
            debug!(kind = input.kind.as_str(), x = position.x, y = position.y, "drag started");
            if let Some(cb) = self.callbacks.on_drag_start.as_mut() {
                cb();
            }
            return DragStep::DragStarted {
                position,
                prevent_default: mv.prevent_default,
            };
        }
        DragStep::Moved {
            position,
            prevent_default: mv.prevent_default,
        }
    }

    /// Mouse-up / touch-end. A drag snaps to the nearer edge of `viewport`.
    pub fn pointer_up(&mut self, kind: PointerKind, viewport: Viewport, now: Duration) -> DragStep {
        let Some(release) = self.tracker.end(kind) else {
            return DragStep::Ignored(DragIgnoredReason::NoMatchingSession);
        };
        self.host.apply(release.command);
        match release.kind {
            ReleaseKind::Click => DragStep::Click,
            ReleaseKind::DragEnd => {
                let docked = self.resolver.resolve(release.final_rect, viewport);
                self.docked = docked;
                self.phase = DragPhase::Snapping {
                    until: now + self.config.snap_animation,
                };
                info!(side = docked.side.as_str(), y = docked.vertical_offset, "widget docked");
                if let Some(cb) = self.callbacks.on_snap.as_mut() {
                    cb(docked.side, docked.vertical_offset);
                }
                if let Some(cb) = self.callbacks.on_drag_end.as_mut() {
                    cb(DragEndInfo {
                        side: docked.side,
                        y: docked.vertical_offset,
                    });
                }
                DragStep::Docked(docked)
            }
        }
    }

    /// Advance host time; ends the snap transition once its deadline passes.
    ///
    /// Returns `true` if the phase changed.
    pub fn tick(&mut self, now: Duration) -> bool {
        match self.phase {
            DragPhase::Snapping { until } if now >= until => {
                self.phase = DragPhase::Idle;
                true
            }
            _ => false,
        }
    }

    /// Re-clamp the docked position after a viewport resize.
    pub fn fit_to_viewport(&mut self, size: Size, viewport: Viewport) {
        self.docked.vertical_offset =
            self.resolver
                .clamp_vertical(self.docked.vertical_offset, size.height, viewport);
    }

    /// Drop any in-flight session and detach its listeners.
    pub fn teardown(&mut self) {
        if let Some(command) = self.tracker.abort() {
            self.host.apply(command);
        }
        self.phase = DragPhase::Idle;
    }
}

impl<H: ListenerHost> Drop for DraggableWidgetController<H> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use pretty_assertions::assert_eq;
    use wkit_core::ListenerCommand;

    use super::*;
    use crate::host::RecordingListenerHost;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0)
    }

    fn home() -> Rect {
        Rect::new(724.0, 272.0, 56.0, 56.0)
    }

    fn controller() -> (DraggableWidgetController<RecordingListenerHost>, RecordingListenerHost) {
        let host = RecordingListenerHost::new();
        let ctl = DraggableWidgetController::new(DragDockConfig::default(), Size::new(56.0, 56.0), viewport(), host.clone());
        (ctl, host)
    }

    #[test]
    fn starts_docked_right_center() {
        let (ctl, _) = controller();
        assert_eq!(ctl.docked(), DockedPosition::new(DockSide::Right, 300.0));
        assert_eq!(ctl.phase(), DragPhase::Idle);
    }

    #[test]
    fn click_path_leaves_state_unchanged() {
        let (mut ctl, host) = controller();
        assert_eq!(ctl.pointer_down(PointerInput::mouse(750.0, 300.0), home()), DragStep::Pressed);
        assert_eq!(ctl.pointer_move(PointerInput::mouse(752.0, 301.0)), DragStep::Pending);
        assert_eq!(ctl.pointer_up(PointerKind::Mouse, viewport(), ms(50)), DragStep::Click);
        assert_eq!(ctl.phase(), DragPhase::Idle);
        assert_eq!(ctl.docked(), DockedPosition::new(DockSide::Right, 300.0));
        assert_eq!(
            host.commands(),
            vec![
                ListenerCommand::Attach {
                    kind: PointerKind::Mouse
                },
                ListenerCommand::Detach {
                    kind: PointerKind::Mouse
                },
            ]
        );
    }

    #[test]
    fn drag_to_left_half_docks_left() {
        let (mut ctl, host) = controller();
        ctl.pointer_down(PointerInput::mouse(750.0, 300.0), home());
        let step = ctl.pointer_move(PointerInput::mouse(200.0, 150.0));
        assert!(matches!(step, DragStep::DragStarted { .. }));
        assert!(ctl.is_dragging());
        assert_eq!(ctl.live_rect(), Some(Rect::new(174.0, 122.0, 56.0, 56.0)));
        let step = ctl.pointer_up(PointerKind::Mouse, viewport(), ms(1000));
        assert_eq!(step, DragStep::Docked(DockedPosition::new(DockSide::Left, 150.0)));
        assert_eq!(ctl.phase(), DragPhase::Snapping { until: ms(1300) });
        assert_eq!(ctl.live_rect(), None);
        assert_eq!(host.attached(PointerKind::Mouse), 0);
    }

    #[test]
    fn snapping_clears_after_animation() {
        let (mut ctl, _) = controller();
        ctl.pointer_down(PointerInput::mouse(750.0, 300.0), home());
        ctl.pointer_move(PointerInput::mouse(700.0, 300.0));
        ctl.pointer_up(PointerKind::Mouse, viewport(), ms(0));
        assert!(!ctl.tick(ms(299)));
        assert!(ctl.is_snapping());
        assert!(ctl.tick(ms(300)));
        assert_eq!(ctl.phase(), DragPhase::Idle);
    }

    #[test]
    fn snapping_does_not_block_new_gesture() {
        let (mut ctl, _) = controller();
        ctl.pointer_down(PointerInput::mouse(750.0, 300.0), home());
        ctl.pointer_move(PointerInput::mouse(700.0, 300.0));
        ctl.pointer_up(PointerKind::Mouse, viewport(), ms(0));
        assert_eq!(ctl.pointer_down(PointerInput::mouse(750.0, 300.0), home()), DragStep::Pressed);
        assert!(matches!(
            ctl.pointer_move(PointerInput::mouse(100.0, 300.0)),
            DragStep::DragStarted { .. }
        ));
        assert!(ctl.is_dragging());
    }

    #[test]
    fn disabled_ignores_press() {
        let (mut ctl, host) = controller();
        ctl.set_disabled(true);
        assert_eq!(
            ctl.pointer_down(PointerInput::mouse(750.0, 300.0), home()),
            DragStep::Ignored(DragIgnoredReason::Disabled)
        );
        assert!(host.commands().is_empty());
        ctl.set_disabled(false);
        assert_eq!(ctl.pointer_down(PointerInput::mouse(750.0, 300.0), home()), DragStep::Pressed);
    }

    #[test]
    fn reentrant_press_is_ignored() {
        let (mut ctl, host) = controller();
        ctl.pointer_down(PointerInput::touch(750.0, 300.0), home());
        assert_eq!(
            ctl.pointer_down(PointerInput::touch(750.0, 300.0), home()),
            DragStep::Ignored(DragIgnoredReason::SessionAlreadyActive)
        );
        assert_eq!(host.attached(PointerKind::Touch), 1);
    }

    #[test]
    fn callbacks_fire_in_order() {
        let (mut ctl, _) = controller();
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = Rc::clone(&log);
        ctl.on_drag_start(move || l.borrow_mut().push("start".to_string()));
        let l = Rc::clone(&log);
        ctl.on_snap(move |side, y| l.borrow_mut().push(format!("snap {} {y}", side.as_str())));
        let l = Rc::clone(&log);
        ctl.on_drag_end(move |info| l.borrow_mut().push(format!("end {} {}", info.side.as_str(), info.y)));

        ctl.pointer_down(PointerInput::touch(750.0, 300.0), home());
        ctl.pointer_move(PointerInput::touch(740.0, 300.0));
        ctl.pointer_move(PointerInput::touch(730.0, 300.0));
        ctl.pointer_up(PointerKind::Touch, viewport(), ms(0));
        assert_eq!(
            *log.borrow(),
            vec![
                "start".to_string(),
                "snap right 300".to_string(),
                "end right 300".to_string()
            ]
        );
    }

    #[test]
    fn drag_start_fires_once_per_gesture() {
        let (mut ctl, _) = controller();
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        ctl.on_drag_start(move || c.set(c.get() + 1));
        ctl.pointer_down(PointerInput::mouse(750.0, 300.0), home());
        for x in [700.0, 650.0, 600.0] {
            ctl.pointer_move(PointerInput::mouse(x, 300.0));
        }
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn touch_move_prevents_default_after_crossing() {
        let (mut ctl, _) = controller();
        ctl.pointer_down(PointerInput::touch(750.0, 300.0), home());
        assert_eq!(ctl.pointer_move(PointerInput::touch(748.0, 300.0)), DragStep::Pending);
        assert!(matches!(
            ctl.pointer_move(PointerInput::touch(700.0, 300.0)),
            DragStep::DragStarted {
                prevent_default: true,
                ..
            }
        ));
    }

    #[test]
    fn teardown_mid_drag_detaches() {
        let (mut ctl, host) = controller();
        ctl.pointer_down(PointerInput::touch(750.0, 300.0), home());
        ctl.pointer_move(PointerInput::touch(600.0, 300.0));
        ctl.teardown();
        assert_eq!(host.attached(PointerKind::Touch), 0);
        assert_eq!(ctl.phase(), DragPhase::Idle);
        assert_eq!(ctl.docked(), DockedPosition::new(DockSide::Right, 300.0));
    }

    #[test]
    fn drop_mid_drag_detaches() {
        let host = RecordingListenerHost::new();
        {
            let mut ctl = DraggableWidgetController::new(DragDockConfig::default(), Size::new(56.0, 56.0), viewport(), host.clone());
            ctl.pointer_down(PointerInput::mouse(750.0, 300.0), home());
        }
        assert_eq!(host.attached(PointerKind::Mouse), 0);
    }

    #[test]
    fn starts_clamped_in_short_viewport() {
        let ctl = DraggableWidgetController::new(
            DragDockConfig::default(),
            Size::new(56.0, 56.0),
            Viewport::new(800.0, 50.0),
            RecordingListenerHost::new(),
        );
        assert_eq!(ctl.docked().vertical_offset, 25.0);
    }

    #[test]
    fn fit_to_viewport_reclamps() {
        let (mut ctl, _) = controller();
        ctl.fit_to_viewport(Size::new(56.0, 56.0), Viewport::new(800.0, 200.0));
        assert_eq!(ctl.docked().vertical_offset, 152.0);
    }

    #[test]
    fn docked_rect_uses_margin() {
        let (ctl, _) = controller();
        assert_eq!(ctl.docked_rect(Size::new(56.0, 56.0), viewport()), home());
    }
}
