#![forbid(unsafe_code)]

//! Normalized pointer input and host listener commands.
//!
//! The rendering surface forwards raw `mousedown`/`mousemove`/`mouseup` and
//! `touchstart`/`touchmove`/`touchend` events as [`PointerInput`] samples.
//! Only the first touch point of a touch event is considered.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Input device that produced a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    Mouse,
    Touch,
}

impl PointerKind {
    /// Stable label used in logs and host payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mouse => "mouse",
            Self::Touch => "touch",
        }
    }
}

/// One pointer sample in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    pub kind: PointerKind,
    pub x: f64,
    pub y: f64,
}

impl PointerInput {
    #[must_use]
    pub const fn mouse(x: f64, y: f64) -> Self {
        Self {
            kind: PointerKind::Mouse,
            x,
            y,
        }
    }

    #[must_use]
    pub const fn touch(x: f64, y: f64) -> Self {
        Self {
            kind: PointerKind::Touch,
            x,
            y,
        }
    }

    #[must_use]
    pub const fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Host command for the session-scoped move/up listeners.
///
/// Mouse sessions need document-level `mousemove`/`mouseup` listeners so the
/// gesture keeps tracking when the pointer leaves the widget. Touch sessions
/// need `touchmove`/`touchend`. Every `Attach` is paired with exactly one
/// `Detach` for the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ListenerCommand {
    Attach { kind: PointerKind },
    Detach { kind: PointerKind },
}

impl ListenerCommand {
    #[must_use]
    pub const fn kind(self) -> PointerKind {
        match self {
            Self::Attach { kind } | Self::Detach { kind } => kind,
        }
    }
}
