//! Handles and the adjust-to-handle protocol.
//!
//! A handle is a small draggable square bound to one owner. It has no state of
//! its own: its position is derived from the owner's geometry every time, and
//! dragging it asks the owner to reshape itself through [`Adjustable`].

#[cfg(test)]
#[path = "handle_test.rs"]
mod handle_test;

use crate::camera::Point;
use crate::consts::HANDLE_SIZE_PX;
use crate::element::ViewId;
use crate::error::ModelError;
use crate::geom::{Outline, Rect};
use crate::input::Cursor;
use crate::model::{LineEnd, Pathway};

/// Position of a resize handle on its owner's frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeAnchor {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeAnchor {
    pub const ALL: [ResizeAnchor; 8] = [Self::N, Self::Ne, Self::E, Self::Se, Self::S, Self::Sw, Self::W, Self::Nw];
    pub const CORNERS: [ResizeAnchor; 4] = [Self::Ne, Self::Se, Self::Sw, Self::Nw];

    /// Horizontal side: -1 west, 0 none, 1 east.
    #[must_use]
    pub fn sx(self) -> f64 {
        match self {
            Self::Ne | Self::E | Self::Se => 1.0,
            Self::Sw | Self::W | Self::Nw => -1.0,
            Self::N | Self::S => 0.0,
        }
    }

    /// Vertical side: -1 north, 0 none, 1 south.
    #[must_use]
    pub fn sy(self) -> f64 {
        match self {
            Self::Se | Self::S | Self::Sw => 1.0,
            Self::Ne | Self::N | Self::Nw => -1.0,
            Self::E | Self::W => 0.0,
        }
    }

    /// The anchor on the given sides, if any.
    #[must_use]
    pub fn from_signs(sx: f64, sy: f64) -> Option<Self> {
        let side = |v: f64| if v > 0.0 { 1 } else if v < 0.0 { -1 } else { 0 };
        match (side(sx), side(sy)) {
            (0, -1) => Some(Self::N),
            (1, -1) => Some(Self::Ne),
            (1, 0) => Some(Self::E),
            (1, 1) => Some(Self::Se),
            (0, 1) => Some(Self::S),
            (-1, 1) => Some(Self::Sw),
            (-1, 0) => Some(Self::W),
            (-1, -1) => Some(Self::Nw),
            _ => None,
        }
    }

    /// Mirror east and west.
    #[must_use]
    pub fn flip_h(self) -> Self {
        Self::from_signs(-self.sx(), self.sy()).unwrap_or(self)
    }

    /// Mirror north and south.
    #[must_use]
    pub fn flip_v(self) -> Self {
        Self::from_signs(self.sx(), -self.sy()).unwrap_or(self)
    }

    #[must_use]
    pub fn is_corner(self) -> bool {
        self.sx() != 0.0 && self.sy() != 0.0
    }
}

/// What dragging a handle does to its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Resize(ResizeAnchor),
    Rotate,
    LineEnd(LineEnd),
    /// Waypoint index among the line's waypoints.
    Waypoint(usize),
    /// Slides an anchor along its line.
    AnchorSlide,
    /// Corner of the multi-selection box.
    SelectionCorner(ResizeAnchor),
}

/// How a handle may move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freedom {
    Free,
    /// Horizontal only.
    X,
    /// Vertical only.
    Y,
    Rotation,
    /// Along the owner's path.
    Path,
}

impl HandleKind {
    #[must_use]
    pub fn freedom(self) -> Freedom {
        match self {
            Self::Resize(a) | Self::SelectionCorner(a) => match (a.sx() == 0.0, a.sy() == 0.0) {
                (true, false) => Freedom::Y,
                (false, true) => Freedom::X,
                _ => Freedom::Free,
            },
            Self::Rotate => Freedom::Rotation,
            Self::AnchorSlide => Freedom::Path,
            Self::LineEnd(_) | Self::Waypoint(_) => Freedom::Free,
        }
    }

    #[must_use]
    pub fn cursor(self) -> Cursor {
        match self {
            Self::Resize(a) | Self::SelectionCorner(a) => Cursor::Resize(a),
            Self::Rotate => Cursor::Rotate,
            Self::LineEnd(_) | Self::Waypoint(_) | Self::AnchorSlide => Cursor::Crosshair,
        }
    }
}

/// A handle scene element: one draggable control point of `owner`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub owner: ViewId,
    pub kind: HandleKind,
}

/// Per-drag options passed to [`Adjustable::adjust_to_handle`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjustOptions {
    pub zoom: f64,
    /// Snap rotation to `snap_step`.
    pub snap: bool,
    /// Radians.
    pub snap_step: f64,
}

impl Default for AdjustOptions {
    fn default() -> Self {
        Self { zoom: 1.0, snap: false, snap_step: 15f64.to_radians() }
    }
}

/// A scene element that can be reshaped by dragging its handles.
pub trait Adjustable {
    /// Handles to create when this element is selected on its own.
    fn handle_kinds(&self, pathway: &Pathway) -> Vec<HandleKind>;

    /// Model-space position of one handle.
    fn handle_position(&self, pathway: &Pathway, kind: HandleKind, zoom: f64) -> Option<Point>;

    /// Move handle `kind` to model point `to`.
    ///
    /// Returns the handle that should stay active for the rest of the drag,
    /// which differs from `kind` when a resize crossed the opposite edge.
    ///
    /// # Errors
    ///
    /// Returns a model error when the owner's element is gone.
    fn adjust_to_handle(
        &mut self,
        pathway: &mut Pathway,
        kind: HandleKind,
        to: Point,
        opts: &AdjustOptions,
    ) -> Result<HandleKind, ModelError>;
}

/// Hit-test square of a handle at model point `at`.
#[must_use]
pub fn handle_outline(at: Point, zoom: f64) -> Outline {
    let half = HANDLE_SIZE_PX / zoom / 2.0;
    Outline::Area(Rect::new(at.x - half, at.y - half, 2.0 * half, 2.0 * half).corners().to_vec())
}

/// Move the side(s) of `r` named by `anchor` to `to`.
///
/// Crossing the opposite side swaps the edges, so the result is never
/// inverted, and the returned anchor is the one now under the pointer.
#[must_use]
pub fn resize_rect(r: Rect, anchor: ResizeAnchor, to: Point) -> (Rect, ResizeAnchor) {
    let (mut left, mut right, mut top, mut bottom) = (r.left(), r.right(), r.top(), r.bottom());
    if anchor.sx() < 0.0 {
        left = to.x;
    } else if anchor.sx() > 0.0 {
        right = to.x;
    }
    if anchor.sy() < 0.0 {
        top = to.y;
    } else if anchor.sy() > 0.0 {
        bottom = to.y;
    }
    let mut active = anchor;
    if right < left {
        std::mem::swap(&mut left, &mut right);
        active = active.flip_h();
    }
    if bottom < top {
        std::mem::swap(&mut top, &mut bottom);
        active = active.flip_v();
    }
    (Rect { x: left, y: top, width: right - left, height: bottom - top }, active)
}
