//! The selection box: rubber band while selecting, and the frame around a
//! multi-selection afterwards.
//!
//! There is exactly one per canvas. It holds the current selection, and only
//! takes part in hit-testing while a band is being dragged or while it holds
//! at least two members.

#[cfg(test)]
#[path = "selection_test.rs"]
mod selection_test;

use crate::camera::Point;
use crate::element::ViewId;
use crate::error::ModelError;
use crate::geom::{Outline, Rect};
use crate::handle::{AdjustOptions, Adjustable, HandleKind, ResizeAnchor, resize_rect};
use crate::layout;
use crate::model::{GraphId, Pathway};

/// One selected scene element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub view: ViewId,
    /// Model element behind the view, if any.
    pub model: Option<GraphId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionBox {
    start: Point,
    end: Point,
    selecting: bool,
    members: Vec<Member>,
    fitted: Option<Rect>,
}

impl SelectionBox {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_selecting(&mut self, at: Point) {
        self.start = at;
        self.end = at;
        self.selecting = true;
    }

    pub fn drag_to(&mut self, at: Point) {
        self.end = at;
    }

    pub fn stop_selecting(&mut self) {
        self.selecting = false;
    }

    #[must_use]
    pub fn is_selecting(&self) -> bool {
        self.selecting
    }

    /// Rubber band while selecting, otherwise the box around the members.
    #[must_use]
    pub fn rect(&self) -> Rect {
        if self.selecting {
            return Rect::from_points(self.start, self.end);
        }
        self.fitted.unwrap_or_else(|| Rect::from_points(self.start, self.end))
    }

    /// Set the box drawn around the members.
    pub fn fit_to(&mut self, bounds: Option<Rect>) {
        self.fitted = bounds;
    }

    #[must_use]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    #[must_use]
    pub fn contains(&self, view: ViewId) -> bool {
        self.members.iter().any(|m| m.view == view)
    }

    /// Add a member. Returns `false` if it was already present.
    pub fn add(&mut self, member: Member) -> bool {
        if self.contains(member.view) {
            return false;
        }
        self.members.push(member);
        true
    }

    /// Remove a member. Returns `false` if it was not present.
    pub fn remove(&mut self, view: ViewId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m.view != view);
        self.members.len() != before
    }

    pub fn clear(&mut self) {
        self.members.clear();
        self.fitted = None;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[must_use]
    pub fn is_hit_testable(&self) -> bool {
        self.selecting || self.members.len() >= 2
    }

    /// Whether the box is drawn.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.is_hit_testable()
    }

    #[must_use]
    pub fn outline(&self) -> Outline {
        Outline::Area(self.rect().corners().to_vec())
    }

    fn member_models(&self) -> Vec<GraphId> {
        self.members.iter().filter_map(|m| m.model.clone()).collect()
    }
}

impl Adjustable for SelectionBox {
    fn handle_kinds(&self, _pathway: &Pathway) -> Vec<HandleKind> {
        if self.members.len() >= 2 {
            ResizeAnchor::CORNERS.map(HandleKind::SelectionCorner).to_vec()
        } else {
            Vec::new()
        }
    }

    fn handle_position(&self, _pathway: &Pathway, kind: HandleKind, _zoom: f64) -> Option<Point> {
        let HandleKind::SelectionCorner(a) = kind else {
            return None;
        };
        let r = self.rect();
        let x = if a.sx() < 0.0 { r.left() } else { r.right() };
        let y = if a.sy() < 0.0 { r.top() } else { r.bottom() };
        Some(Point::new(x, y))
    }

    /// Resize the box and scale every member into the new box.
    fn adjust_to_handle(
        &mut self,
        pathway: &mut Pathway,
        kind: HandleKind,
        to: Point,
        _opts: &AdjustOptions,
    ) -> Result<HandleKind, ModelError> {
        let HandleKind::SelectionCorner(anchor) = kind else {
            return Ok(kind);
        };
        let from = self.rect();
        let (into, active) = resize_rect(from, anchor, to);
        if from.width <= 0.0 || from.height <= 0.0 {
            return Ok(kind);
        }
        layout::scale_elements(pathway, &self.member_models(), from, into)?;
        self.fitted = Some(into);
        Ok(HandleKind::SelectionCorner(active))
    }
}
