#![forbid(unsafe_code)]

//! Edge-snap resolution.
//!
//! Maps a free-floating rectangle to a [`DockedPosition`]: the nearer
//! horizontal edge (ties go right) and a vertical center clamped so the
//! widget stays fully on-screen.

use tracing::debug;
use wkit_core::{Rect, Viewport};

use crate::dock::{DEFAULT_EDGE_MARGIN_PX, DockSide, DockedPosition};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeSnapConfig {
    /// Minimum distance between the widget and the top/bottom edges
    /// (default: 20.0).
    pub margin_px: f64,
}

impl Default for EdgeSnapConfig {
    fn default() -> Self {
        Self {
            margin_px: DEFAULT_EDGE_MARGIN_PX,
        }
    }
}

/// Stateless snap resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeSnapResolver {
    config: EdgeSnapConfig,
}

impl EdgeSnapResolver {
    #[must_use]
    pub const fn new(config: EdgeSnapConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn margin(&self) -> f64 {
        self.config.margin_px
    }

    /// Resolve `rect` to a docked position inside `viewport`.
    #[must_use]
    pub fn resolve(&self, rect: Rect, viewport: Viewport) -> DockedPosition {
        let center = rect.center();
        let distance_to_left = center.x;
        let distance_to_right = viewport.width - center.x;
        let side = if distance_to_left < distance_to_right {
            DockSide::Left
        } else {
            DockSide::Right
        };
        let vertical_offset = self.clamp_vertical(center.y, rect.height, viewport);
        debug!(side = side.as_str(), cx = center.x, cy = center.y, vertical_offset, "snap resolved");
        DockedPosition::new(side, vertical_offset)
    }

    /// Clamp a vertical center into `[h/2 + margin, H - h/2 - margin]`.
    ///
    /// When the viewport is too short for that range, the midpoint of the
    /// (inverted) bounds is returned instead.
    #[must_use]
    pub fn clamp_vertical(&self, cy: f64, height: f64, viewport: Viewport) -> f64 {
        clamp_center(cy, height, viewport, self.config.margin_px)
    }
}

/// Free-function form of [`EdgeSnapResolver::clamp_vertical`].
#[must_use]
pub fn clamp_center(cy: f64, height: f64, viewport: Viewport, margin: f64) -> f64 {
    let (min, max) = vertical_bounds(height, viewport, margin);
    if min <= max {
        cy.max(min).min(max)
    } else {
        (min + max) / 2.0
    }
}

/// Inclusive bounds for the vertical center of a widget of `height`.
#[must_use]
pub fn vertical_bounds(height: f64, viewport: Viewport, margin: f64) -> (f64, f64) {
    let half = height / 2.0;
    (half + margin, viewport.height - half - margin)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> EdgeSnapResolver {
        EdgeSnapResolver::default()
    }

    #[test]
    fn left_half_docks_left() {
        let pos = resolver().resolve(Rect::new(100.0, 200.0, 56.0, 56.0), Viewport::new(800.0, 600.0));
        assert_eq!(pos.side, DockSide::Left);
        assert_eq!(pos.vertical_offset, 228.0);
    }

    #[test]
    fn right_half_docks_right() {
        let pos = resolver().resolve(Rect::new(500.0, 200.0, 56.0, 56.0), Viewport::new(800.0, 600.0));
        assert_eq!(pos.side, DockSide::Right);
    }

    #[test]
    fn exact_midline_docks_right() {
        // center x = 372 + 28 = 400
        let pos = resolver().resolve(Rect::new(372.0, 200.0, 56.0, 56.0), Viewport::new(800.0, 600.0));
        assert_eq!(pos.side, DockSide::Right);
    }

    #[test]
    fn clamps_to_top() {
        let pos = resolver().resolve(Rect::new(0.0, -300.0, 56.0, 56.0), Viewport::new(800.0, 600.0));
        assert_eq!(pos.vertical_offset, 48.0);
    }

    #[test]
    fn clamps_to_bottom() {
        let pos = resolver().resolve(Rect::new(0.0, 900.0, 56.0, 56.0), Viewport::new(800.0, 600.0));
        assert_eq!(pos.vertical_offset, 552.0);
    }

    #[test]
    fn tiny_viewport_uses_midpoint() {
        // min = 48, max = 50 - 48 = 2; midpoint = 25
        let pos = resolver().resolve(Rect::new(0.0, 0.0, 56.0, 56.0), Viewport::new(300.0, 50.0));
        assert_eq!(pos.vertical_offset, 25.0);
    }

    #[test]
    fn custom_margin() {
        let r = EdgeSnapResolver::new(EdgeSnapConfig { margin_px: 0.0 });
        let pos = r.resolve(Rect::new(0.0, -50.0, 40.0, 40.0), Viewport::new(800.0, 600.0));
        assert_eq!(pos.vertical_offset, 20.0);
    }
}
