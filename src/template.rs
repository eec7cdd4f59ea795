//! Templates: factories for the elements a click on the canvas inserts.
//!
//! A template adds its elements to the model at the click point and names the
//! element and handle that should follow the pointer straight away, so one
//! press-drag both creates and sizes the new object. A press released without
//! moving gets the template's default size instead.

#[cfg(test)]
#[path = "template_test.rs"]
mod template_test;

use crate::camera::Point;
use crate::error::ModelError;
use crate::handle::{HandleKind, ResizeAnchor};
use crate::model::{ArrowHead, ConnectorType, GraphId, LineEnd, ObjectType, Pathway, PathwayElement, ShapeType};

/// Size a freshly inserted shape starts with before it is dragged out.
const SEED_SIZE: f64 = 1.0;

/// Length of a line placed with a single click.
pub const DEFAULT_LINE_LENGTH: f64 = 60.0;

/// What follows the pointer right after insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDrag {
    pub model: GraphId,
    /// `None` moves the whole element.
    pub handle: Option<HandleKind>,
}

/// Factory of one kind of diagram fragment.
pub trait Template {
    fn name(&self) -> &str;

    /// Add the fragment at `at` and return the new graph ids.
    ///
    /// # Errors
    ///
    /// Propagates model errors from adding elements.
    fn add_elements(&mut self, pathway: &mut Pathway, at: Point) -> Result<Vec<GraphId>, ModelError>;

    /// Element and handle to drag after insertion.
    fn drag_element(&self, added: &[GraphId]) -> Option<TemplateDrag>;

    /// Hook run once the scene mirrors the new elements.
    ///
    /// # Errors
    ///
    /// Propagates model errors.
    fn post_insert(&mut self, _pathway: &mut Pathway, _added: &[GraphId]) -> Result<(), ModelError> {
        Ok(())
    }

    /// Give click-placed elements their natural size.
    ///
    /// # Errors
    ///
    /// Propagates model errors.
    fn apply_default_size(&self, pathway: &mut Pathway, added: &[GraphId]) -> Result<(), ModelError>;
}

/// Inserts one shaped element: data node, label or shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeTemplate {
    pub object_type: ObjectType,
    pub shape_type: ShapeType,
    pub label: String,
    pub default_size: (f64, f64),
}

impl ShapeTemplate {
    #[must_use]
    pub fn data_node(label: &str) -> Self {
        Self { object_type: ObjectType::DataNode, shape_type: ShapeType::Rectangle, label: label.to_string(), default_size: (90.0, 25.0) }
    }

    #[must_use]
    pub fn label(text: &str) -> Self {
        Self { object_type: ObjectType::Label, shape_type: ShapeType::None, label: text.to_string(), default_size: (90.0, 25.0) }
    }

    #[must_use]
    pub fn shape(shape_type: ShapeType) -> Self {
        Self { object_type: ObjectType::Shape, shape_type, label: String::new(), default_size: (30.0, 30.0) }
    }
}

impl Template for ShapeTemplate {
    fn name(&self) -> &str {
        match self.object_type {
            ObjectType::DataNode => "data node",
            ObjectType::Label => "label",
            _ => "shape",
        }
    }

    fn add_elements(&mut self, pathway: &mut Pathway, at: Point) -> Result<Vec<GraphId>, ModelError> {
        let mut e = PathwayElement::new(self.object_type).at(at.x, at.y).sized(SEED_SIZE, SEED_SIZE).with_label(&self.label);
        e.shape_type = self.shape_type;
        e.z_order = pathway.elements().map(|x| x.z_order).max().map_or(0, |z| z.saturating_add(1));
        Ok(vec![pathway.add(e)?])
    }

    fn drag_element(&self, added: &[GraphId]) -> Option<TemplateDrag> {
        let handle = if self.shape_type.is_resizeable() { Some(HandleKind::Resize(ResizeAnchor::Se)) } else { None };
        added.first().map(|id| TemplateDrag { model: id.clone(), handle })
    }

    /// The click point becomes the top-left corner.
    fn apply_default_size(&self, pathway: &mut Pathway, added: &[GraphId]) -> Result<(), ModelError> {
        let (w, h) = self.default_size;
        for id in added {
            pathway.update(id, |e| {
                let left = e.center_x - e.width / 2.0;
                let top = e.center_y - e.height / 2.0;
                e.width = w;
                e.height = h;
                e.center_x = left + w / 2.0;
                e.center_y = top + h / 2.0;
            })?;
        }
        Ok(())
    }
}

/// Inserts one line, dragged out by its end point.
#[derive(Debug, Clone, PartialEq)]
pub struct LineTemplate {
    pub object_type: ObjectType,
    pub connector_type: ConnectorType,
    pub end_arrow: ArrowHead,
}

impl LineTemplate {
    #[must_use]
    pub fn interaction(end_arrow: ArrowHead) -> Self {
        Self { object_type: ObjectType::Line, connector_type: ConnectorType::Straight, end_arrow }
    }

    #[must_use]
    pub fn graphical(connector_type: ConnectorType) -> Self {
        Self { object_type: ObjectType::GraphLine, connector_type, end_arrow: ArrowHead::None }
    }
}

impl Template for LineTemplate {
    fn name(&self) -> &str {
        match self.object_type {
            ObjectType::GraphLine => "graphical line",
            _ => "interaction",
        }
    }

    fn add_elements(&mut self, pathway: &mut Pathway, at: Point) -> Result<Vec<GraphId>, ModelError> {
        let mut e = PathwayElement::line(at, at);
        e.object_type = self.object_type;
        e.connector_type = self.connector_type;
        e.end_arrow = self.end_arrow;
        e.z_order = pathway.elements().map(|x| x.z_order).max().map_or(0, |z| z.saturating_add(1));
        Ok(vec![pathway.add(e)?])
    }

    fn drag_element(&self, added: &[GraphId]) -> Option<TemplateDrag> {
        added
            .first()
            .map(|id| TemplateDrag { model: id.clone(), handle: Some(HandleKind::LineEnd(LineEnd::End)) })
    }

    fn apply_default_size(&self, pathway: &mut Pathway, added: &[GraphId]) -> Result<(), ModelError> {
        for id in added {
            pathway.update(id, |l| {
                let start = l.point(LineEnd::Start).map(|p| Point::new(p.x, p.y));
                if let (Some(s), Some(end)) = (start, l.point_mut(LineEnd::End)) {
                    if !end.is_attached() {
                        end.x = s.x + DEFAULT_LINE_LENGTH;
                        end.y = s.y;
                    }
                }
            })?;
        }
        Ok(())
    }
}
