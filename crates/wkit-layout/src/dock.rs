#![forbid(unsafe_code)]

//! Docked position of the widget along a viewport edge.

use serde::{Deserialize, Serialize};
use wkit_core::{Point, Rect, Size, Viewport};

use crate::snap::clamp_center;

/// Gap between the widget and the viewport edges, in pixels.
pub const DEFAULT_EDGE_MARGIN_PX: f64 = 20.0;

/// Horizontal viewport edge the widget is docked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DockSide {
    Left,
    #[default]
    Right,
}

impl DockSide {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Result of the last completed snap.
///
/// Never holds a mid-drag position: it only changes when a drag ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DockedPosition {
    pub side: DockSide,
    /// Vertical center of the widget, in pixels from the viewport top.
    pub vertical_offset: f64,
}

impl DockedPosition {
    #[must_use]
    pub const fn new(side: DockSide, vertical_offset: f64) -> Self {
        Self {
            side,
            vertical_offset,
        }
    }

    /// Right edge, vertically centered, for a widget of `size`. The center is
    /// clamped the same way a snap is.
    #[must_use]
    pub fn initial(size: Size, viewport: Viewport, margin: f64) -> Self {
        Self::new(DockSide::Right, clamp_center(viewport.mid_y(), size.height, viewport, margin))
    }

    /// Bounds of a widget of `size` rendered at this docked position.
    #[must_use]
    pub fn to_rect(self, size: Size, viewport: Viewport, margin: f64) -> Rect {
        let left = match self.side {
            DockSide::Left => margin,
            DockSide::Right => viewport.width - margin - size.width,
        };
        let top = self.vertical_offset - size.height / 2.0;
        Rect::from_origin(Point::new(left, top), size)
    }
}
