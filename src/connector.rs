//! Line routing and endpoint resolution.
//!
//! An attached endpoint has no meaningful stored position: it is resolved
//! against the frame of the element it is attached to, or against the path of
//! the line owning the anchor it is attached to. Resolution is depth limited so
//! chains of lines attached to anchors on other lines always terminate.

#[cfg(test)]
#[path = "connector_test.rs"]
mod connector_test;

use crate::camera::Point;
use crate::consts::{CURVE_SAMPLES, MAX_LINK_DEPTH};
use crate::frame;
use crate::geom::{point_at_fraction, rotate_vec};
use crate::model::{ConnectorType, LineEnd, LinePoint, LinkTarget, Pathway, PathwayElement};

/// Model-space position of a line point.
#[must_use]
pub fn resolve_point(pathway: &Pathway, point: &LinePoint) -> Point {
    resolve_at(pathway, point, 0)
}

fn resolve_at(pathway: &Pathway, point: &LinePoint, depth: usize) -> Point {
    let stored = Point::new(point.x, point.y);
    let Some(target) = point.graph_ref.as_deref() else {
        return stored;
    };
    if depth >= MAX_LINK_DEPTH {
        return stored;
    }
    match pathway.link_target(target) {
        Some(LinkTarget::Element(e)) if e.object_type.is_linkable() => frame::frame_at(pathway, e, depth + 1)
            .map_or(stored, |f| f.to_absolute(point.rel_x, point.rel_y)),
        Some(LinkTarget::Anchor { line, anchor }) => {
            point_at_fraction(&path_at(pathway, line, depth + 1), anchor.position)
        }
        _ => stored,
    }
}

/// Resolved position of one end of a line.
#[must_use]
pub fn endpoint(pathway: &Pathway, line: &PathwayElement, end: LineEnd) -> Option<Point> {
    line.point(end).map(|p| resolve_point(pathway, p))
}

/// Model-space position of an anchor at `position` along `line`.
#[must_use]
pub fn anchor_position(pathway: &Pathway, line: &PathwayElement, position: f64) -> Point {
    point_at_fraction(&line_path(pathway, line), position)
}

/// The routed polyline of a line, from start to end.
#[must_use]
pub fn line_path(pathway: &Pathway, line: &PathwayElement) -> Vec<Point> {
    path_at(pathway, line, 0)
}

pub(crate) fn path_at(pathway: &Pathway, line: &PathwayElement, depth: usize) -> Vec<Point> {
    let (Some(start_pt), Some(end_pt)) = (line.point(LineEnd::Start), line.point(LineEnd::End)) else {
        return line.points.first().map(|p| vec![Point::new(p.x, p.y)]).unwrap_or_default();
    };
    let start = resolve_at(pathway, start_pt, depth);
    let end = resolve_at(pathway, end_pt, depth);
    let waypoints: Vec<Point> = line.waypoints().iter().map(|p| Point::new(p.x, p.y)).collect();

    match line.connector_type {
        ConnectorType::Straight => vec![start, end],
        ConnectorType::Segmented => {
            let mut path = Vec::with_capacity(waypoints.len() + 2);
            path.push(start);
            path.extend(waypoints);
            path.push(end);
            path
        }
        ConnectorType::Elbow => elbow(
            start,
            direction(pathway, start_pt, depth),
            end,
            direction(pathway, end_pt, depth),
        ),
        ConnectorType::Curved => curved(
            start,
            direction(pathway, start_pt, depth),
            &waypoints,
            end,
            direction(pathway, end_pt, depth),
        ),
    }
}

/// Outward unit direction of an endpoint sitting on a side of its target.
fn direction(pathway: &Pathway, point: &LinePoint, depth: usize) -> Option<Point> {
    let Some(LinkTarget::Element(e)) = pathway.link_target(point.graph_ref.as_deref()?) else {
        return None;
    };
    let (rx, ry) = (point.rel_x, point.rel_y);
    let local = if rx.abs() >= 0.999 && rx.abs() >= ry.abs() {
        Point::new(rx.signum(), 0.0)
    } else if ry.abs() >= 0.999 {
        Point::new(0.0, ry.signum())
    } else {
        return None;
    };
    let rotation = frame::frame_at(pathway, e, depth + 1).map_or(0.0, |f| f.rotation);
    Some(rotate_vec(local, rotation))
}

fn elbow(start: Point, start_dir: Option<Point>, end: Point, end_dir: Option<Point>) -> Vec<Point> {
    let horizontal = |d: Point| d.x.abs() >= d.y.abs();
    let start_h = start_dir.map_or_else(|| (end.x - start.x).abs() >= (end.y - start.y).abs(), horizontal);
    let end_h = end_dir.map_or(start_h, horizontal);

    let mut path = match (start_h, end_h) {
        (true, true) => {
            let mid_x = (start.x + end.x) / 2.0;
            vec![start, Point::new(mid_x, start.y), Point::new(mid_x, end.y), end]
        }
        (false, false) => {
            let mid_y = (start.y + end.y) / 2.0;
            vec![start, Point::new(start.x, mid_y), Point::new(end.x, mid_y), end]
        }
        (true, false) => vec![start, Point::new(end.x, start.y), end],
        (false, true) => vec![start, Point::new(start.x, end.y), end],
    };
    path.dedup();
    path
}

fn curved(start: Point, start_dir: Option<Point>, waypoints: &[Point], end: Point, end_dir: Option<Point>) -> Vec<Point> {
    if !waypoints.is_empty() {
        let mut through = Vec::with_capacity(waypoints.len() + 2);
        through.push(start);
        through.extend_from_slice(waypoints);
        through.push(end);
        return catmull_rom(&through);
    }
    let reach = start.distance(end) / 2.0;
    let mid_x = (start.x + end.x) / 2.0;
    let c1 = start_dir.map_or(Point::new(mid_x, start.y), |d| start.offset(d.x * reach, d.y * reach));
    let c2 = end_dir.map_or(Point::new(mid_x, end.y), |d| end.offset(d.x * reach, d.y * reach));
    let mut path = vec![start];
    path.extend(cubic(start, c1, c2, end).into_iter().skip(1));
    path
}

fn cubic(p0: Point, p1: Point, p2: Point, p3: Point) -> Vec<Point> {
    (0..=CURVE_SAMPLES)
        .map(|i| {
            let t = i as f64 / CURVE_SAMPLES as f64;
            let u = 1.0 - t;
            let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
            Point::new(
                a * p0.x + b * p1.x + c * p2.x + d * p3.x,
                a * p0.y + b * p1.y + c * p2.y + d * p3.y,
            )
        })
        .collect()
}

/// Smooth curve through every point, as a chain of cubic segments.
fn catmull_rom(points: &[Point]) -> Vec<Point> {
    let n = points.len();
    let mut out = Vec::new();
    for i in 0..n.saturating_sub(1) {
        let p0 = points[i.saturating_sub(1)];
        let (p1, p2) = (points[i], points[i + 1]);
        let p3 = points[(i + 2).min(n - 1)];
        let c1 = Point::new(p1.x + (p2.x - p0.x) / 6.0, p1.y + (p2.y - p0.y) / 6.0);
        let c2 = Point::new(p2.x - (p3.x - p1.x) / 6.0, p2.y - (p3.y - p1.y) / 6.0);
        let segment = cubic(p1, c1, c2, p2);
        let skip = usize::from(i > 0);
        out.extend(segment.into_iter().skip(skip));
    }
    out
}
