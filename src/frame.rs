//! Absolute geometry of model elements.
//!
//! A [`Frame`] is the rotated rectangle an element occupies in model space.
//! States are placed relative to their parent data node, groups take the union
//! of their members plus a style margin, and lines cover their routed path.

#[cfg(test)]
#[path = "frame_test.rs"]
mod frame_test;

use crate::camera::Point;
use crate::connector;
use crate::consts::MAX_LINK_DEPTH;
use crate::geom::{Rect, rotate_around, union_all};
use crate::model::{ObjectType, Pathway, PathwayElement};

/// Rotated rectangle in model space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub center: Point,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
}

impl Frame {
    #[must_use]
    pub fn from_rect(r: Rect) -> Self {
        Self { center: r.center(), width: r.width, height: r.height, rotation: 0.0 }
    }

    /// Map a frame-relative position (`-1..=1` on each axis) to model space.
    #[must_use]
    pub fn to_absolute(&self, rel_x: f64, rel_y: f64) -> Point {
        let local = Point::new(
            self.center.x + rel_x * self.width / 2.0,
            self.center.y + rel_y * self.height / 2.0,
        );
        rotate_around(local, self.center, self.rotation)
    }

    /// Offset of `p` from the center in the unrotated frame.
    #[must_use]
    pub fn to_internal(&self, p: Point) -> Point {
        let q = rotate_around(p, self.center, -self.rotation);
        Point::new(q.x - self.center.x, q.y - self.center.y)
    }

    /// Inverse of [`Frame::to_absolute`]; degenerate axes map to 0.
    #[must_use]
    pub fn to_relative(&self, p: Point) -> (f64, f64) {
        let q = self.to_internal(p);
        let rel = |v: f64, extent: f64| if extent.abs() > f64::EPSILON { 2.0 * v / extent } else { 0.0 };
        (rel(q.x, self.width), rel(q.y, self.height))
    }

    /// Rotated corners, clockwise from the internal top-left.
    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)].map(|(x, y)| self.to_absolute(x, y))
    }

    /// Axis-aligned box around the rotated frame.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::bounding(&self.corners()).unwrap_or_default()
    }
}

/// Model-space frame of an element. `None` for elements with no geometry.
#[must_use]
pub fn frame(pathway: &Pathway, e: &PathwayElement) -> Option<Frame> {
    frame_at(pathway, e, 0)
}

pub(crate) fn frame_at(pathway: &Pathway, e: &PathwayElement, depth: usize) -> Option<Frame> {
    if depth > MAX_LINK_DEPTH {
        return None;
    }
    match e.object_type {
        ObjectType::State => {
            let parent = e.parent_ref.as_deref().and_then(|p| pathway.get(p));
            let center = parent
                .and_then(|p| frame_at(pathway, p, depth + 1))
                .map_or_else(|| e.center(), |pf| pf.to_absolute(e.rel_x, e.rel_y));
            Some(Frame { center, width: e.width, height: e.height, rotation: 0.0 })
        }
        ObjectType::Group => group_bounds_at(pathway, e, depth).map(Frame::from_rect),
        ObjectType::Line | ObjectType::GraphLine => {
            Rect::bounding(&connector::path_at(pathway, e, depth)).map(Frame::from_rect)
        }
        ObjectType::Biopax => None,
        ObjectType::DataNode | ObjectType::Label | ObjectType::Shape | ObjectType::Info => Some(Frame {
            center: e.center(),
            width: e.width,
            height: e.height,
            rotation: e.rotation,
        }),
    }
}

/// Axis-aligned model bounds of an element.
#[must_use]
pub fn element_bounds(pathway: &Pathway, e: &PathwayElement) -> Option<Rect> {
    bounds_at(pathway, e, 0)
}

fn bounds_at(pathway: &Pathway, e: &PathwayElement, depth: usize) -> Option<Rect> {
    match e.object_type {
        ObjectType::Group => group_bounds_at(pathway, e, depth),
        ObjectType::Line | ObjectType::GraphLine => Rect::bounding(&connector::path_at(pathway, e, depth)),
        _ => frame_at(pathway, e, depth).map(|f| f.bounds()),
    }
}

/// Union of the group's member bounds expanded by the style margin.
/// `None` for an empty group.
#[must_use]
pub fn group_bounds(pathway: &Pathway, group: &PathwayElement) -> Option<Rect> {
    group_bounds_at(pathway, group, 0)
}

fn group_bounds_at(pathway: &Pathway, group: &PathwayElement, depth: usize) -> Option<Rect> {
    if depth > MAX_LINK_DEPTH {
        return None;
    }
    let gid = group.group_id.as_deref()?;
    let members = pathway.group_members(gid);
    union_all(
        members
            .iter()
            .filter_map(|m| pathway.get(m))
            .filter_map(|m| bounds_at(pathway, m, depth + 1)),
    )
    .map(|r| r.expand(group.group_style.margin()))
}
