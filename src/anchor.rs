//! Anchors on lines: linkable points at a fractional position along a path.

#[cfg(test)]
#[path = "anchor_test.rs"]
mod anchor_test;

use crate::camera::Point;
use crate::connector;
use crate::consts::ANCHOR_SIZE_PX;
use crate::error::ModelError;
use crate::geom::{Outline, Rect, project_onto_polyline};
use crate::handle::{AdjustOptions, Adjustable, HandleKind};
use crate::model::{GraphId, LineAnchor, Pathway};

/// Scene view of one anchor on a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorView {
    pub line: GraphId,
    pub anchor: GraphId,
}

impl AnchorView {
    #[must_use]
    pub fn new(line: &str, anchor: &str) -> Self {
        Self { line: line.to_string(), anchor: anchor.to_string() }
    }

    /// Current model-space position.
    #[must_use]
    pub fn position(&self, pathway: &Pathway) -> Option<Point> {
        let line = pathway.get(&self.line)?;
        let a = line.anchors.iter().find(|a| a.id == self.anchor)?;
        Some(connector::anchor_position(pathway, line, a.position))
    }

    /// Square hit area of fixed pixel size.
    #[must_use]
    pub fn outline(&self, pathway: &Pathway, zoom: f64) -> Option<Outline> {
        let at = self.position(pathway)?;
        let half = ANCHOR_SIZE_PX / zoom / 2.0;
        Some(Outline::Area(Rect::new(at.x - half, at.y - half, 2.0 * half, 2.0 * half).corners().to_vec()))
    }
}

impl Adjustable for AnchorView {
    fn handle_kinds(&self, _pathway: &Pathway) -> Vec<HandleKind> {
        vec![HandleKind::AnchorSlide]
    }

    fn handle_position(&self, pathway: &Pathway, kind: HandleKind, _zoom: f64) -> Option<Point> {
        match kind {
            HandleKind::AnchorSlide => self.position(pathway),
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
        if kind != HandleKind::AnchorSlide {
            return Ok(kind);
        }
        let path = connector::line_path(pathway, pathway.require(&self.line)?);
        let fraction = project_onto_polyline(&path, to);
        let anchor = self.anchor.clone();
        pathway.update(&self.line, |l| {
            if let Some(a) = l.anchors.iter_mut().find(|a| a.id == anchor) {
                a.position = fraction;
            }
        })?;
        Ok(kind)
    }
}

/// Add an anchor at `position` along `line`, returning its new id.
///
/// # Errors
///
/// Returns `NotFound` if the line is gone.
pub fn place_anchor(pathway: &mut Pathway, line: &str, position: f64) -> Result<GraphId, ModelError> {
    pathway.require(line)?;
    let id = pathway.unique_id();
    let anchor = LineAnchor { id: id.clone(), position: position.clamp(0.0, 1.0) };
    pathway.update(line, |l| l.anchors.push(anchor))?;
    Ok(id)
}
