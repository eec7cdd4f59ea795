#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use serde::{Deserialize, Serialize};

use crate::geom::Rect;

/// A point in either model or view space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }

    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Convert a model-space length or coordinate to view space.
#[must_use]
pub fn to_view(model: f64, zoom: f64) -> f64 {
    model * zoom
}

/// Convert a view-space length or coordinate to model space.
#[must_use]
pub fn to_model(view: f64, zoom: f64) -> f64 {
    view / zoom
}

/// Zoom state for one canvas.
///
/// `zoom` is a scale factor (1.0 = 100%) and is always finite and positive.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { zoom: 1.0 }
    }
}

impl Camera {
    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Set the zoom factor. Returns `false` and leaves the camera untouched when
    /// `zoom` is not a finite positive number.
    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        if !zoom.is_finite() || zoom <= 0.0 {
            return false;
        }
        self.zoom = zoom;
        true
    }

    /// Convert a model-space point to view coordinates.
    #[must_use]
    pub fn point_to_view(&self, p: Point) -> Point {
        Point::new(to_view(p.x, self.zoom), to_view(p.y, self.zoom))
    }

    /// Convert a view-space point to model coordinates.
    #[must_use]
    pub fn point_to_model(&self, p: Point) -> Point {
        Point::new(to_model(p.x, self.zoom), to_model(p.y, self.zoom))
    }

    #[must_use]
    pub fn rect_to_view(&self, r: Rect) -> Rect {
        r.scaled(self.zoom)
    }

    #[must_use]
    pub fn rect_to_model(&self, r: Rect) -> Rect {
        r.scaled(1.0 / self.zoom)
    }

    /// Convert a view-space distance (pixels) to a model-space distance.
    #[must_use]
    pub fn view_dist_to_model(&self, view_dist: f64) -> f64 {
        to_model(view_dist, self.zoom)
    }
}
