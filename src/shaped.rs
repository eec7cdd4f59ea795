//! Shaped elements: data nodes, labels, shapes and states, plus groups, the
//! info box and citation markers.
//!
//! Geometry is always derived from the model element. Handles are placed on
//! the element's rotated frame, and resizing happens in the unrotated internal
//! frame so edges stay parallel to the element's own axes.

#[cfg(test)]
#[path = "shaped_test.rs"]
mod shaped_test;

use crate::camera::Point;
use crate::consts::{
    CITATION_FONT_SIZE, ELLIPSE_SEGMENTS, ESTIMATED_GLYPH_WIDTH, INFO_FONT_SIZE, LINE_SPACING, MIN_LINE_HIT_WIDTH,
    ROTATE_HANDLE_OFFSET_PX, TEXT_MARGIN,
};
use crate::element::ViewId;
use crate::error::ModelError;
use crate::frame::{self, Frame};
use crate::geom::{Outline, Rect, normalize_angle, rotate_around, rotate_vec, snap_angle};
use crate::handle::{AdjustOptions, Adjustable, HandleKind, ResizeAnchor, resize_rect};
use crate::layout;
use crate::model::{GraphId, HAlign, ObjectType, Pathway, PathwayElement, ShapeType, VAlign};

// =============================================================
// Outline
// =============================================================

/// Frame-relative vertices of a shape type, clockwise.
fn unit_polygon(shape: ShapeType) -> Vec<(f64, f64)> {
    match shape {
        ShapeType::Oval | ShapeType::Degradation => (0..ELLIPSE_SEGMENTS)
            .map(|i| {
                let t = std::f64::consts::TAU * i as f64 / ELLIPSE_SEGMENTS as f64;
                (t.cos(), t.sin())
            })
            .collect(),
        ShapeType::Triangle => vec![(-1.0, -1.0), (1.0, 0.0), (-1.0, 1.0)],
        ShapeType::Hexagon => vec![(-0.5, -1.0), (0.5, -1.0), (1.0, 0.0), (0.5, 1.0), (-0.5, 1.0), (-1.0, 0.0)],
        ShapeType::Octagon => octagon(),
        ShapeType::Rectangle | ShapeType::RoundedRectangle | ShapeType::Brace | ShapeType::None => {
            vec![(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)]
        }
    }
}

fn octagon() -> Vec<(f64, f64)> {
    const K: f64 = 0.6;
    vec![(-K, -1.0), (K, -1.0), (1.0, -K), (1.0, K), (K, 1.0), (-K, 1.0), (-1.0, K), (-1.0, -K)]
}

/// Model-space border polygon of a shape type on `frame`.
#[must_use]
pub fn shape_polygon(frame: &Frame, shape: ShapeType) -> Vec<Point> {
    unit_polygon(shape).into_iter().map(|(x, y)| frame.to_absolute(x, y)).collect()
}

/// Octagon polygon inscribed in an axis-aligned rectangle.
#[must_use]
pub fn octagon_in(r: Rect) -> Vec<Point> {
    shape_polygon(&Frame::from_rect(r), ShapeType::Octagon)
}

/// Precise hit-test outline of a shaped element.
///
/// Filled shapes and labels are solid; transparent shapes only count along
/// their border stroke.
#[must_use]
pub fn outline(pathway: &Pathway, e: &PathwayElement) -> Option<Outline> {
    let f = frame::frame(pathway, e)?;
    let poly = shape_polygon(&f, e.shape_type);
    if e.object_type == ObjectType::Label || !e.is_transparent() {
        Some(Outline::Area(poly))
    } else {
        Some(Outline::Stroke { points: poly, closed: true, half_width: e.line_thickness.max(MIN_LINE_HIT_WIDTH) / 2.0 })
    }
}

// =============================================================
// Shaped view
// =============================================================

/// Scene view of a data node, label, shape or state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapedView {
    pub model: GraphId,
}

impl ShapedView {
    #[must_use]
    pub fn new(model: &str) -> Self {
        Self { model: model.to_string() }
    }
}

/// Handles a shaped element shows when selected alone.
#[must_use]
pub fn handle_policy(e: &PathwayElement) -> Vec<HandleKind> {
    if e.object_type == ObjectType::State {
        return ResizeAnchor::CORNERS.map(HandleKind::Resize).to_vec();
    }
    let resize = e.shape_type.is_resizeable();
    let rotate = e.shape_type.is_rotatable() && !matches!(e.object_type, ObjectType::DataNode | ObjectType::Label);
    let mut kinds = Vec::new();
    if resize {
        kinds.extend(ResizeAnchor::ALL.map(HandleKind::Resize));
    }
    if rotate {
        kinds.push(HandleKind::Rotate);
    }
    kinds
}

impl Adjustable for ShapedView {
    fn handle_kinds(&self, pathway: &Pathway) -> Vec<HandleKind> {
        pathway.get(&self.model).map(handle_policy).unwrap_or_default()
    }

    fn handle_position(&self, pathway: &Pathway, kind: HandleKind, zoom: f64) -> Option<Point> {
        let f = frame::frame(pathway, pathway.get(&self.model)?)?;
        match kind {
            HandleKind::Resize(a) => Some(f.to_absolute(a.sx(), a.sy())),
            HandleKind::Rotate => {
                let reach = f.width.abs() / 2.0 + ROTATE_HANDLE_OFFSET_PX / zoom;
                Some(rotate_around(f.center.offset(reach, 0.0), f.center, f.rotation))
            }
            _ => None,
        }
    }

    fn adjust_to_handle(
        &mut self,
        pathway: &mut Pathway,
        kind: HandleKind,
        to: Point,
        opts: &AdjustOptions,
    ) -> Result<HandleKind, ModelError> {
        let e = pathway.require(&self.model)?;
        let Some(f) = frame::frame(pathway, e) else {
            return Ok(kind);
        };
        let is_state = e.object_type == ObjectType::State;
        match kind {
            HandleKind::Resize(_) if is_state => {
                let local = f.to_internal(to);
                let active = ResizeAnchor::from_signs(local.x, local.y).filter(|a| a.is_corner()).map_or(kind, HandleKind::Resize);
                pathway.update(&self.model, |s| {
                    s.width = 2.0 * local.x.abs();
                    s.height = 2.0 * local.y.abs();
                })?;
                Ok(active)
            }
            HandleKind::Resize(anchor) => {
                let local = f.to_internal(to);
                let internal = Rect::from_center(Point::default(), f.width, f.height);
                let (r, active) = resize_rect(internal, anchor, local);
                let center = r.center();
                let shift = rotate_vec(center, f.rotation);
                pathway.update(&self.model, |s| {
                    s.center_x = f.center.x + shift.x;
                    s.center_y = f.center.y + shift.y;
                    s.width = r.width;
                    s.height = r.height;
                })?;
                Ok(HandleKind::Resize(active))
            }
            HandleKind::Rotate => {
                let angle = (to.y - f.center.y).atan2(to.x - f.center.x);
                let angle = if opts.snap { snap_angle(angle, opts.snap_step) } else { normalize_angle(angle) };
                pathway.update(&self.model, |s| s.rotation = angle)?;
                Ok(kind)
            }
            _ => Ok(kind),
        }
    }
}

/// Move a shaped element by a model-space delta.
///
/// States move in their parent's relative frame and stay on the parent's box.
///
/// # Errors
///
/// Returns `NotFound` if the element is gone.
pub fn move_by(pathway: &mut Pathway, id: &str, dx: f64, dy: f64) -> Result<(), ModelError> {
    let e = pathway.require(id)?;
    if e.object_type == ObjectType::State {
        let parent = e.parent_ref.as_deref().and_then(|p| pathway.get(p)).and_then(|p| frame::frame(pathway, p));
        if let Some(pf) = parent {
            let d = rotate_vec(Point::new(dx, dy), -pf.rotation);
            let (hw, hh) = (pf.width.abs() / 2.0, pf.height.abs() / 2.0);
            return pathway.update(id, |s| {
                if hw > 0.0 {
                    s.rel_x = (s.rel_x + d.x / hw).clamp(-1.0, 1.0);
                }
                if hh > 0.0 {
                    s.rel_y = (s.rel_y + d.y / hh).clamp(-1.0, 1.0);
                }
            });
        }
    }
    pathway.update(id, |s| {
        s.center_x += dx;
        s.center_y += dy;
    })
}

// =============================================================
// Group view
// =============================================================

/// Scene view of a group; its box is derived from its members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupView {
    pub model: GraphId,
}

impl GroupView {
    #[must_use]
    pub fn new(model: &str) -> Self {
        Self { model: model.to_string() }
    }
}

impl Adjustable for GroupView {
    fn handle_kinds(&self, _pathway: &Pathway) -> Vec<HandleKind> {
        ResizeAnchor::ALL.map(HandleKind::Resize).to_vec()
    }

    fn handle_position(&self, pathway: &Pathway, kind: HandleKind, _zoom: f64) -> Option<Point> {
        let HandleKind::Resize(a) = kind else {
            return None;
        };
        let b = frame::group_bounds(pathway, pathway.get(&self.model)?)?;
        Some(Frame::from_rect(b).to_absolute(a.sx(), a.sy()))
    }

    fn adjust_to_handle(
        &mut self,
        pathway: &mut Pathway,
        kind: HandleKind,
        to: Point,
        _opts: &AdjustOptions,
    ) -> Result<HandleKind, ModelError> {
        let HandleKind::Resize(anchor) = kind else {
            return Ok(kind);
        };
        let group = pathway.require(&self.model)?;
        let (Some(bounds), Some(gid)) = (frame::group_bounds(pathway, group), group.group_id.clone()) else {
            return Ok(kind);
        };
        let margin = group.group_style.margin();
        let (resized, active) = resize_rect(bounds, anchor, to);
        let from = shrink(bounds, margin);
        let into = shrink(resized, margin);
        let members = pathway.group_members(&gid);
        layout::scale_elements(pathway, &members, from, into)?;
        Ok(HandleKind::Resize(active))
    }
}

fn shrink(r: Rect, margin: f64) -> Rect {
    let w = (r.width - 2.0 * margin).max(1.0);
    let h = (r.height - 2.0 * margin).max(1.0);
    Rect::from_center(r.center(), w, h)
}

// =============================================================
// Info box and citation markers
// =============================================================

/// Scene view of the pathway info box, fixed at the origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoView {
    pub model: GraphId,
}

/// Text lines shown in the info box.
#[must_use]
pub fn info_lines(e: &PathwayElement) -> Vec<String> {
    let mut lines = vec![format!("Title: {}", e.text_label)];
    lines.extend(e.properties.iter().map(|(k, v)| format!("{k}: {v}")));
    lines
}

/// Model-space rectangle of the info box.
#[must_use]
pub fn info_rect(e: &PathwayElement) -> Rect {
    let lines = info_lines(e);
    let widest = lines.iter().map(|l| estimate_text_width(l, INFO_FONT_SIZE)).fold(0.0, f64::max);
    let height = lines.len() as f64 * INFO_FONT_SIZE * LINE_SPACING;
    Rect::new(0.0, 0.0, widest + 2.0 * TEXT_MARGIN, height + 2.0 * TEXT_MARGIN)
}

/// Small marker showing how many citations an element carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationMarker {
    pub owner: ViewId,
    pub model: GraphId,
}

#[must_use]
pub fn citation_label(e: &PathwayElement) -> String {
    format!("[{}]", e.citation_refs.len())
}

/// Model-space rectangle of a citation marker, just above the owner's top-right corner.
#[must_use]
pub fn citation_rect(pathway: &Pathway, e: &PathwayElement) -> Option<Rect> {
    let b = frame::element_bounds(pathway, e)?;
    let w = estimate_text_width(&citation_label(e), CITATION_FONT_SIZE);
    let h = CITATION_FONT_SIZE * LINE_SPACING;
    Some(Rect::new(b.right(), b.top() - h, w, h))
}

// =============================================================
// Text layout
// =============================================================

/// One positioned line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    /// Left end of the baseline.
    pub at: Point,
    pub width: f64,
}

/// Width of `text` when no drawing context can measure it.
#[must_use]
pub fn estimate_text_width(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size * ESTIMATED_GLYPH_WIDTH
}

/// Lay out a possibly multi-line label inside `area`.
///
/// Empty lines produce no run but still take up a line of height.
/// `measure` returns `None` when it cannot measure, in which case the width
/// is estimated.
#[must_use]
pub fn layout_text(
    label: &str,
    area: Rect,
    font_size: f64,
    h_align: HAlign,
    v_align: VAlign,
    measure: impl Fn(&str) -> Option<f64>,
) -> Vec<TextRun> {
    let lines: Vec<&str> = label.split('\n').collect();
    let line_height = font_size * LINE_SPACING;
    let total = line_height * lines.len() as f64;
    let top = match v_align {
        VAlign::Top => area.top() + TEXT_MARGIN,
        VAlign::Middle => area.center().y - total / 2.0,
        VAlign::Bottom => area.bottom() - TEXT_MARGIN - total,
    };
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| !line.is_empty())
        .map(|(idx, line)| {
            let width = measure(line).unwrap_or_else(|| estimate_text_width(line, font_size));
            let x = match h_align {
                HAlign::Left => area.left() + TEXT_MARGIN,
                HAlign::Center => area.center().x - width / 2.0,
                HAlign::Right => area.right() - TEXT_MARGIN - width,
            };
            let y = top + idx as f64 * line_height + font_size;
            TextRun { text: (*line).to_string(), at: Point::new(x, y), width }
        })
        .collect()
}
