//! The host's scrollable viewport around the canvas.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use std::cell::RefCell;
use std::rc::Rc;

use crate::camera::Point;
use crate::geom::Rect;

/// Host viewport. All coordinates are view space.
pub trait Viewport {
    /// Part of the canvas currently on screen.
    fn visible_rect(&self) -> Rect;

    /// Set the scrollable canvas size.
    fn resize_to(&mut self, width: f64, height: f64);

    fn scroll_to(&mut self, top_left: Point);

    /// Schedule a repaint of `region`.
    fn invalidate(&mut self, region: Rect);
}

/// Viewport that records what it was asked to do.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingViewport {
    pub visible: Rect,
    pub size: (f64, f64),
    pub scrolled_to: Option<Point>,
    pub invalidated: Vec<Rect>,
    pub resizes: usize,
}

impl RecordingViewport {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            visible: Rect::new(0.0, 0.0, width, height),
            size: (width, height),
            scrolled_to: None,
            invalidated: Vec::new(),
            resizes: 0,
        }
    }

    /// Wrap in the shared handle the canvas takes, keeping a copy for inspection.
    #[must_use]
    pub fn shared(width: f64, height: f64) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new(width, height)))
    }
}

impl Viewport for RecordingViewport {
    fn visible_rect(&self) -> Rect {
        self.visible
    }

    fn resize_to(&mut self, width: f64, height: f64) {
        self.size = (width, height);
        self.resizes += 1;
    }

    fn scroll_to(&mut self, top_left: Point) {
        self.visible = Rect::new(top_left.x, top_left.y, self.visible.width, self.visible.height);
        self.scrolled_to = Some(top_left);
    }

    fn invalidate(&mut self, region: Rect) {
        self.invalidated.push(region);
    }
}

impl<V: Viewport> Viewport for Rc<RefCell<V>> {
    fn visible_rect(&self) -> Rect {
        self.borrow().visible_rect()
    }

    fn resize_to(&mut self, width: f64, height: f64) {
        self.borrow_mut().resize_to(width, height);
    }

    fn scroll_to(&mut self, top_left: Point) {
        self.borrow_mut().scroll_to(top_left);
    }

    fn invalidate(&mut self, region: Rect) {
        self.borrow_mut().invalidate(region);
    }
}
