//! Line elements: interactions and graphical lines.
//!
//! Endpoints are either free or attached; the drawn path comes from
//! [`connector::line_path`]. Dragging an endpoint handle only moves the stored
//! point; attaching and detaching is decided by the canvas link protocol.

#[cfg(test)]
#[path = "line_test.rs"]
mod line_test;

use crate::camera::Point;
use crate::connector;
use crate::consts::MIN_LINE_HIT_WIDTH;
use crate::error::ModelError;
use crate::geom::Outline;
use crate::handle::{AdjustOptions, Adjustable, HandleKind};
use crate::model::{ArrowHead, GraphId, LineEnd, Pathway, PathwayElement};

/// Scene view of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineView {
    pub model: GraphId,
}

impl LineView {
    #[must_use]
    pub fn new(model: &str) -> Self {
        Self { model: model.to_string() }
    }
}

/// Stroke outline along the routed path.
#[must_use]
pub fn outline(pathway: &Pathway, e: &PathwayElement) -> Option<Outline> {
    let points = connector::line_path(pathway, e);
    if points.is_empty() {
        return None;
    }
    Some(Outline::Stroke { points, closed: false, half_width: e.line_thickness.max(MIN_LINE_HIT_WIDTH) / 2.0 })
}

impl Adjustable for LineView {
    fn handle_kinds(&self, pathway: &Pathway) -> Vec<HandleKind> {
        let Some(e) = pathway.get(&self.model) else {
            return Vec::new();
        };
        let mut kinds = vec![HandleKind::LineEnd(LineEnd::Start), HandleKind::LineEnd(LineEnd::End)];
        if e.connector_type.uses_waypoints() {
            kinds.extend((0..e.waypoints().len()).map(HandleKind::Waypoint));
        }
        kinds
    }

    fn handle_position(&self, pathway: &Pathway, kind: HandleKind, _zoom: f64) -> Option<Point> {
        let e = pathway.get(&self.model)?;
        match kind {
            HandleKind::LineEnd(end) => connector::endpoint(pathway, e, end),
            HandleKind::Waypoint(i) => e.waypoints().get(i).map(|p| Point::new(p.x, p.y)),
            _ => None,
        }
    }

    fn adjust_to_handle(
        &mut self,
        pathway: &mut Pathway,
        kind: HandleKind,
        to: Point,
        _opts: &AdjustOptions,
    ) -> Result<HandleKind, ModelError> {
        match kind {
            HandleKind::LineEnd(end) => {
                pathway.update(&self.model, |l| {
                    if let Some(p) = l.point_mut(end) {
                        p.x = to.x;
                        p.y = to.y;
                    }
                })?;
            }
            HandleKind::Waypoint(i) => {
                pathway.update(&self.model, |l| {
                    let last = l.points.len().saturating_sub(1);
                    if i + 1 < last {
                        l.points[i + 1].x = to.x;
                        l.points[i + 1].y = to.y;
                    }
                })?;
            }
            _ => {}
        }
        Ok(kind)
    }
}

/// Shift a line's free endpoints and waypoints. Attached endpoints stay put.
///
/// # Errors
///
/// Returns `NotFound` if the line is gone.
pub fn move_by(pathway: &mut Pathway, id: &str, dx: f64, dy: f64) -> Result<(), ModelError> {
    pathway.update(id, |l| {
        for p in l.points.iter_mut().filter(|p| !p.is_attached()) {
            p.x += dx;
            p.y += dy;
        }
    })
}

/// Detach an endpoint and leave it free at `at`.
///
/// # Errors
///
/// Returns `NotFound` if the line or endpoint is gone.
pub fn detach_at(pathway: &mut Pathway, id: &str, end: LineEnd, at: Point) -> Result<(), ModelError> {
    pathway.unlink_point(id, end)?;
    pathway.update(id, |l| {
        if let Some(p) = l.point_mut(end) {
            p.x = at.x;
            p.y = at.y;
        }
    })
}

/// Store the resolved position of every attached endpoint, so the line keeps
/// a sensible free position if it is later detached or its target is lost.
///
/// # Errors
///
/// Returns `NotFound` if the line is gone.
pub fn refresh(pathway: &mut Pathway, id: &str) -> Result<(), ModelError> {
    let line = pathway.require(id)?;
    let resolved: Vec<(LineEnd, Point)> = [LineEnd::Start, LineEnd::End]
        .into_iter()
        .filter_map(|end| connector::endpoint(pathway, line, end).map(|p| (end, p)))
        .collect();
    pathway.update(id, |l| {
        for (end, at) in resolved {
            if let Some(p) = l.point_mut(end) {
                p.x = at.x;
                p.y = at.y;
            }
        }
    })
}

/// Arrowhead polygon at `tip`, pointing away from `from`. `size` is the head length.
#[must_use]
pub fn arrow_polygon(tip: Point, from: Point, head: ArrowHead, size: f64) -> Option<Vec<Point>> {
    let len = tip.distance(from);
    if len == 0.0 {
        return None;
    }
    let (ux, uy) = ((tip.x - from.x) / len, (tip.y - from.y) / len);
    let (nx, ny) = (-uy, ux);
    match head {
        ArrowHead::None => None,
        ArrowHead::Arrow => {
            let base = Point::new(tip.x - ux * size, tip.y - uy * size);
            let half = size / 2.0;
            Some(vec![
                tip,
                Point::new(base.x + nx * half, base.y + ny * half),
                Point::new(base.x - nx * half, base.y - ny * half),
            ])
        }
        ArrowHead::TBar => {
            let half = size * 0.75;
            let depth = size / 4.0;
            let back = Point::new(tip.x - ux * depth, tip.y - uy * depth);
            Some(vec![
                Point::new(tip.x + nx * half, tip.y + ny * half),
                Point::new(tip.x - nx * half, tip.y - ny * half),
                Point::new(back.x - nx * half, back.y - ny * half),
                Point::new(back.x + nx * half, back.y + ny * half),
            ])
        }
    }
}
