//! Plane geometry: rectangles, rotation helpers, polylines and hit-test outlines.
//!
//! Every function here is unit-agnostic; callers decide whether the numbers
//! are model or view coordinates. [`Outline`] is the precise hit-test shape of
//! a scene element and [`Outline::bounds`] always contains it.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::camera::Point;

/// Axis-aligned rectangle with a non-negative width and height.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Build a rectangle, normalizing negative extents.
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        let (x, width) = if width < 0.0 { (x + width, -width) } else { (x, width) };
        let (y, height) = if height < 0.0 { (y + height, -height) } else { (y, height) };
        Self { x, y, width, height }
    }

    #[must_use]
    pub fn from_center(center: Point, width: f64, height: f64) -> Self {
        let (w, h) = (width.abs(), height.abs());
        Self { x: center.x - w / 2.0, y: center.y - h / 2.0, width: w, height: h }
    }

    #[must_use]
    pub fn from_points(a: Point, b: Point) -> Self {
        Self::new(a.x, a.y, b.x - a.x, b.y - a.y)
    }

    /// Smallest rectangle containing every point, or `None` for an empty slice.
    #[must_use]
    pub fn bounding(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self { x: min_x, y: min_y, width: max_x - min_x, height: max_y - min_y })
    }

    #[must_use]
    pub fn left(&self) -> f64 {
        self.x
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn top(&self) -> f64 {
        self.y
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() <= other.right()
            && other.left() <= self.right()
            && self.top() <= other.bottom()
            && other.top() <= self.bottom()
    }

    #[must_use]
    pub fn union(&self, other: &Rect) -> Rect {
        let left = self.left().min(other.left());
        let top = self.top().min(other.top());
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect { x: left, y: top, width: right - left, height: bottom - top }
    }

    /// Grow by `margin` on every side.
    #[must_use]
    pub fn expand(&self, margin: f64) -> Rect {
        Rect::new(self.x - margin, self.y - margin, self.width + 2.0 * margin, self.height + 2.0 * margin)
    }

    #[must_use]
    pub fn translate(&self, dx: f64, dy: f64) -> Rect {
        Rect { x: self.x + dx, y: self.y + dy, ..*self }
    }

    #[must_use]
    pub fn scaled(&self, factor: f64) -> Rect {
        Rect::new(self.x * factor, self.y * factor, self.width * factor, self.height * factor)
    }

    /// Corners clockwise from the top-left.
    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.left(), self.top()),
            Point::new(self.right(), self.top()),
            Point::new(self.right(), self.bottom()),
            Point::new(self.left(), self.bottom()),
        ]
    }
}

/// Union of an iterator of rectangles.
pub fn union_all<I: IntoIterator<Item = Rect>>(rects: I) -> Option<Rect> {
    rects.into_iter().reduce(|acc, r| acc.union(&r))
}

// =============================================================
// Rotation
// =============================================================

/// Rotate `p` by `angle` radians (clockwise on a y-down screen) around `center`.
#[must_use]
pub fn rotate_around(p: Point, center: Point, angle: f64) -> Point {
    let (sin, cos) = angle.sin_cos();
    let (dx, dy) = (p.x - center.x, p.y - center.y);
    Point::new(center.x + dx * cos - dy * sin, center.y + dx * sin + dy * cos)
}

/// Rotate a vector by `angle` radians.
#[must_use]
pub fn rotate_vec(v: Point, angle: f64) -> Point {
    rotate_around(v, Point::default(), angle)
}

/// Normalize an angle into `[0, 2π)`.
#[must_use]
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    if a >= TAU { 0.0 } else { a }
}

/// Round `angle` to the nearest multiple of `step` and normalize the result.
#[must_use]
pub fn snap_angle(angle: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return normalize_angle(angle);
    }
    normalize_angle((angle / step).round() * step)
}

// =============================================================
// Polylines
// =============================================================

#[must_use]
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}

#[must_use]
pub fn polyline_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// The point at arc-length fraction `t` (clamped to `[0, 1]`) along a polyline.
#[must_use]
pub fn point_at_fraction(points: &[Point], t: f64) -> Point {
    let Some(first) = points.first() else {
        return Point::default();
    };
    let total = polyline_length(points);
    if total == 0.0 {
        return *first;
    }
    let mut remaining = t.clamp(0.0, 1.0) * total;
    for w in points.windows(2) {
        let seg = w[0].distance(w[1]);
        if remaining <= seg && seg > 0.0 {
            let f = remaining / seg;
            return Point::new(w[0].x + f * (w[1].x - w[0].x), w[0].y + f * (w[1].y - w[0].y));
        }
        remaining -= seg;
    }
    points.last().copied().unwrap_or(*first)
}

/// Arc-length fraction of the point on the polyline nearest to `p`.
#[must_use]
pub fn project_onto_polyline(points: &[Point], p: Point) -> f64 {
    let total = polyline_length(points);
    if total == 0.0 {
        return 0.0;
    }
    let mut best = (f64::INFINITY, 0.0);
    let mut walked = 0.0;
    for w in points.windows(2) {
        let (a, b) = (w[0], w[1]);
        let seg = a.distance(b);
        if seg > 0.0 {
            let t = (((p.x - a.x) * (b.x - a.x) + (p.y - a.y) * (b.y - a.y)) / (seg * seg)).clamp(0.0, 1.0);
            let q = Point::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y));
            let d = p.distance(q);
            if d < best.0 {
                best = (d, (walked + t * seg) / total);
            }
        }
        walked += seg;
    }
    best.1
}

/// Even-odd point-in-polygon test.
#[must_use]
pub fn point_in_polygon(p: Point, polygon: &[Point]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

// =============================================================
// Outline
// =============================================================

/// Precise hit-test shape of a scene element.
#[derive(Debug, Clone, PartialEq)]
pub enum Outline {
    /// Closed polygon whose interior counts as inside.
    Area(Vec<Point>),
    /// Stroked path: only points within `half_width` of the path count.
    Stroke { points: Vec<Point>, closed: bool, half_width: f64 },
}

impl Outline {
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        match self {
            Self::Area(poly) => point_in_polygon(p, poly) || on_path(poly, true, p, 1e-9),
            Self::Stroke { points, closed, half_width } => on_path(points, *closed, p, *half_width),
        }
    }

    /// Axis-aligned box containing the whole outline.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        match self {
            Self::Area(poly) => Rect::bounding(poly).unwrap_or_default(),
            Self::Stroke { points, half_width, .. } => {
                Rect::bounding(points).unwrap_or_default().expand(*half_width)
            }
        }
    }

    #[must_use]
    pub fn scaled(&self, factor: f64) -> Outline {
        let scale = |pts: &[Point]| pts.iter().map(|p| Point::new(p.x * factor, p.y * factor)).collect();
        match self {
            Self::Area(poly) => Self::Area(scale(poly)),
            Self::Stroke { points, closed, half_width } => {
                Self::Stroke { points: scale(points), closed: *closed, half_width: half_width * factor }
            }
        }
    }

    /// The path the outline follows, for drawing.
    #[must_use]
    pub fn path(&self) -> &[Point] {
        match self {
            Self::Area(poly) => poly,
            Self::Stroke { points, .. } => points,
        }
    }
}

fn on_path(points: &[Point], closed: bool, p: Point, tolerance: f64) -> bool {
    if points.len() == 1 {
        return p.distance(points[0]) <= tolerance;
    }
    let open_hit = points.windows(2).any(|w| distance_to_segment(p, w[0], w[1]) <= tolerance);
    if open_hit {
        return true;
    }
    match (closed, points.first(), points.last()) {
        (true, Some(first), Some(last)) if points.len() > 2 => distance_to_segment(p, *last, *first) <= tolerance,
        _ => false,
    }
}
