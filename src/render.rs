//! Rendering: draws scene elements to an abstract 2D context.
//!
//! Everything here reads the scene and the model and issues view-space
//! drawing commands; nothing mutates application state. The host supplies a
//! [`DrawContext`] over its real graphics backend. [`RecordingContext`]
//! keeps the commands instead, for tests and the inspection binary.
//!
//! Fallible backend calls propagate [`DrawError`]; the caller
//! ([`crate::canvas::Canvas::draw`]) decides what to do with the result.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::camera::{Point, to_view};
use crate::connector;
use crate::consts::{
    ANCHOR_SIZE_PX, CITATION_FONT_SIZE, HANDLE_SIZE_PX, INFO_FONT_SIZE, LINE_SPACING, LINK_ANCHOR_RADIUS_PX, TEXT_MARGIN,
};
use crate::element::{Scene, SceneElement, ViewId, ViewKind};
use crate::error::DrawError;
use crate::frame;
use crate::geom::Rect;
use crate::group_painter::{GroupPaint, PainterRegistry};
use crate::handle::HandleKind;
use crate::line::arrow_polygon;
use crate::model::{Color, LineStyle, Pathway, PathwayElement, ShapeType};
use crate::shaped::{self, layout_text};

/// Arrowhead length in model units.
const ARROW_SIZE: f64 = 10.0;

/// Stroke width of a highlight ring, in view pixels.
const HIGHLIGHT_WIDTH_PX: f64 = 3.0;

/// Stroke color of a selected element.
const SELECTED_COLOR: Color = Color::BLUE;

/// Target surface for drawing. All coordinates are view space.
pub trait DrawContext {
    /// Visible view-space region, if the backend clips.
    fn clip(&self) -> Option<Rect>;

    fn set_stroke(&mut self, color: Color, width: f64, style: LineStyle);

    /// `None` disables filling.
    fn set_fill(&mut self, color: Option<Color>);

    /// Fill a closed polygon with the current fill.
    ///
    /// # Errors
    ///
    /// Returns `Err` when the backend rejects the call.
    fn fill_polygon(&mut self, points: &[Point]) -> Result<(), DrawError>;

    /// Stroke a path with the current stroke.
    ///
    /// # Errors
    ///
    /// Returns `Err` when the backend rejects the call.
    fn stroke_path(&mut self, points: &[Point], closed: bool) -> Result<(), DrawError>;

    /// Draw text with its baseline starting at `at`.
    ///
    /// # Errors
    ///
    /// Returns `Err` when the backend rejects the call.
    fn draw_text(&mut self, text: &str, at: Point, font_size: f64, color: Color) -> Result<(), DrawError>;

    /// Width of `text` at `font_size`, if the backend can measure.
    fn measure_text(&self, _text: &str, _font_size: f64) -> Option<f64> {
        None
    }
}

/// A drawing command captured by [`RecordingContext`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Stroke { color: Color, width: f64, style: LineStyle },
    Fill(Option<Color>),
    Polygon(Vec<Point>),
    Path { points: Vec<Point>, closed: bool },
    Text { text: String, at: Point, font_size: f64, color: Color },
}

/// A context that records commands instead of drawing them.
#[derive(Debug, Clone, Default)]
pub struct RecordingContext {
    pub commands: Vec<DrawCommand>,
    pub clip: Option<Rect>,
    /// Fail every call once this many commands have been recorded.
    pub fail_after: Option<usize>,
}

impl RecordingContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_clip(clip: Rect) -> Self {
        Self { clip: Some(clip), ..Self::default() }
    }

    fn record(&mut self, command: DrawCommand) -> Result<(), DrawError> {
        if self.fail_after.is_some_and(|n| self.commands.len() >= n) {
            return Err(DrawError::Backend("recording limit reached".to_string()));
        }
        self.commands.push(command);
        Ok(())
    }

    /// Texts drawn so far, in order.
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Number of polygon fills and path strokes.
    #[must_use]
    pub fn shape_count(&self) -> usize {
        self.commands.iter().filter(|c| matches!(c, DrawCommand::Polygon(_) | DrawCommand::Path { .. })).count()
    }
}

impl DrawContext for RecordingContext {
    fn clip(&self) -> Option<Rect> {
        self.clip
    }

    fn set_stroke(&mut self, color: Color, width: f64, style: LineStyle) {
        self.commands.push(DrawCommand::Stroke { color, width, style });
    }

    fn set_fill(&mut self, color: Option<Color>) {
        self.commands.push(DrawCommand::Fill(color));
    }

    fn fill_polygon(&mut self, points: &[Point]) -> Result<(), DrawError> {
        self.record(DrawCommand::Polygon(points.to_vec()))
    }

    fn stroke_path(&mut self, points: &[Point], closed: bool) -> Result<(), DrawError> {
        self.record(DrawCommand::Path { points: points.to_vec(), closed })
    }

    fn draw_text(&mut self, text: &str, at: Point, font_size: f64, color: Color) -> Result<(), DrawError> {
        self.record(DrawCommand::Text { text: text.to_string(), at, font_size, color })
    }
}

fn view_points(points: &[Point], zoom: f64) -> Vec<Point> {
    points.iter().map(|p| Point::new(to_view(p.x, zoom), to_view(p.y, zoom))).collect()
}

fn view_point(p: Point, zoom: f64) -> Point {
    Point::new(to_view(p.x, zoom), to_view(p.y, zoom))
}

// =============================================================
// Element dispatch
// =============================================================

/// Draw one scene element. Elements flagged for removal draw nothing.
///
/// # Errors
///
/// Returns `Err` if a context call fails.
pub fn draw_element(
    ctx: &mut dyn DrawContext,
    scene: &Scene,
    id: ViewId,
    pathway: &Pathway,
    zoom: f64,
    painters: &PainterRegistry,
) -> Result<(), DrawError> {
    let Some(el) = scene.get(id) else {
        return Ok(());
    };
    match &el.kind {
        ViewKind::Shaped(v) => match pathway.get(&v.model) {
            Some(e) => draw_shaped(ctx, el, e, pathway, zoom),
            None => Ok(()),
        },
        ViewKind::Group(v) => {
            let Some(g) = pathway.get(&v.model) else {
                return Ok(());
            };
            let Some(bounds) = frame::group_bounds(pathway, g) else {
                return Ok(());
            };
            let alias = g
                .group_id
                .as_deref()
                .filter(|gid| !pathway.aliases_of(gid).is_empty())
                .map(str::to_string);
            let paint = GroupPaint {
                bounds: bounds.scaled(zoom),
                mouse_over: el.mouse_over,
                anchors_shown: el.link_anchors.as_ref().is_some_and(|d| d.is_shown()),
                selected: el.selected,
                alias,
            };
            painters.get(g.group_style.name()).paint(ctx, &paint)?;
            draw_highlight(ctx, el, &bounds.corners(), zoom)
        }
        ViewKind::Line(v) => match pathway.get(&v.model) {
            Some(e) => draw_line(ctx, el, e, pathway, zoom),
            None => Ok(()),
        },
        ViewKind::Anchor(v) => {
            let Some(at) = v.position(pathway) else {
                return Ok(());
            };
            let half = ANCHOR_SIZE_PX / 2.0;
            let c = view_point(at, zoom);
            let square = Rect::new(c.x - half, c.y - half, 2.0 * half, 2.0 * half).corners();
            ctx.set_fill(Some(if el.selected { SELECTED_COLOR } else { Color::GRAY }));
            ctx.fill_polygon(&square)
        }
        ViewKind::Info(v) => match pathway.get(&v.model) {
            Some(e) => draw_info(ctx, e, zoom),
            None => Ok(()),
        },
        ViewKind::Citation(v) => {
            let Some(owner) = pathway.get(&v.model).filter(|o| !o.citation_refs.is_empty()) else {
                return Ok(());
            };
            let Some(r) = shaped::citation_rect(pathway, owner) else {
                return Ok(());
            };
            let at = view_point(Point::new(r.left(), r.top() + CITATION_FONT_SIZE), zoom);
            ctx.draw_text(&shaped::citation_label(owner), at, CITATION_FONT_SIZE * zoom, Color::GRAY)
        }
        ViewKind::Handle(h) => draw_handle(ctx, scene, h.owner, h.kind, pathway, zoom),
        ViewKind::SelectionBox(sb) => {
            if !sb.is_visible() {
                return Ok(());
            }
            ctx.set_stroke(Color::GRAY, 1.0, LineStyle::Dashed);
            ctx.stroke_path(&view_points(&sb.rect().corners(), zoom), true)
        }
    }
}

fn draw_highlight(ctx: &mut dyn DrawContext, el: &SceneElement, outline: &[Point], zoom: f64) -> Result<(), DrawError> {
    let Some(color) = el.highlight else {
        return Ok(());
    };
    ctx.set_stroke(color, HIGHLIGHT_WIDTH_PX, LineStyle::Solid);
    ctx.stroke_path(&view_points(outline, zoom), true)
}

// =============================================================
// Shaped elements
// =============================================================

fn draw_shaped(
    ctx: &mut dyn DrawContext,
    el: &SceneElement,
    e: &PathwayElement,
    pathway: &Pathway,
    zoom: f64,
) -> Result<(), DrawError> {
    let Some(f) = frame::frame(pathway, e) else {
        return Ok(());
    };
    let poly = view_points(&shaped::shape_polygon(&f, e.shape_type), zoom);

    if let Some(fill) = e.fill_color.filter(|c| !c.is_transparent()) {
        ctx.set_fill(Some(fill));
        ctx.fill_polygon(&poly)?;
    }
    if e.shape_type != ShapeType::None {
        let color = if el.selected { SELECTED_COLOR } else { e.color };
        ctx.set_stroke(color, e.line_thickness * zoom, e.line_style);
        ctx.stroke_path(&poly, true)?;
    }

    if !e.text_label.is_empty() {
        let area = Rect::from_center(f.center, f.width.abs(), f.height.abs());
        let runs = layout_text(&e.text_label, area, e.font_size, e.h_align, e.v_align, |t| {
            ctx.measure_text(t, e.font_size)
        });
        let text_color = if e.href.is_some() { Color::BLUE } else { e.color };
        for run in runs {
            let at = view_point(run.at, zoom);
            ctx.draw_text(&run.text, at, e.font_size * zoom, text_color)?;
            if e.href.is_some() {
                let end = view_point(run.at.offset(run.width, 0.0), zoom);
                ctx.set_stroke(text_color, 1.0, LineStyle::Solid);
                ctx.stroke_path(&[at.offset(0.0, 1.0), end.offset(0.0, 1.0)], false)?;
            }
        }
    }

    draw_highlight(ctx, el, &shaped::shape_polygon(&f, e.shape_type), zoom)
}

fn draw_info(ctx: &mut dyn DrawContext, e: &PathwayElement, zoom: f64) -> Result<(), DrawError> {
    let r = shaped::info_rect(e);
    let line_height = INFO_FONT_SIZE * LINE_SPACING;
    for (i, text) in shaped::info_lines(e).iter().enumerate() {
        let at = Point::new(r.left() + TEXT_MARGIN, r.top() + TEXT_MARGIN + i as f64 * line_height + INFO_FONT_SIZE);
        ctx.draw_text(text, view_point(at, zoom), INFO_FONT_SIZE * zoom, Color::BLACK)?;
    }
    Ok(())
}

// =============================================================
// Lines
// =============================================================

fn draw_line(
    ctx: &mut dyn DrawContext,
    el: &SceneElement,
    e: &PathwayElement,
    pathway: &Pathway,
    zoom: f64,
) -> Result<(), DrawError> {
    let path = connector::line_path(pathway, e);
    if path.len() < 2 {
        return Ok(());
    }
    let color = if el.selected { SELECTED_COLOR } else { e.color };
    ctx.set_stroke(color, e.line_thickness * zoom, e.line_style);
    ctx.stroke_path(&view_points(&path, zoom), false)?;

    let ends = [
        (e.start_arrow, path[0], path[1]),
        (e.end_arrow, path[path.len() - 1], path[path.len() - 2]),
    ];
    for (head, tip, from) in ends {
        if let Some(poly) = arrow_polygon(tip, from, head, ARROW_SIZE) {
            ctx.set_fill(Some(color));
            ctx.fill_polygon(&view_points(&poly, zoom))?;
        }
    }

    if let Some(highlight) = el.highlight {
        ctx.set_stroke(highlight, HIGHLIGHT_WIDTH_PX, LineStyle::Solid);
        ctx.stroke_path(&view_points(&path, zoom), false)?;
    }
    Ok(())
}

// =============================================================
// Handles and link anchors
// =============================================================

fn draw_handle(
    ctx: &mut dyn DrawContext,
    scene: &Scene,
    owner: ViewId,
    kind: HandleKind,
    pathway: &Pathway,
    zoom: f64,
) -> Result<(), DrawError> {
    let Some(at) = scene.get(owner).and_then(|o| o.kind.as_adjustable()).and_then(|a| a.handle_position(pathway, kind, zoom))
    else {
        return Ok(());
    };
    let c = view_point(at, zoom);
    let half = HANDLE_SIZE_PX / 2.0;
    let square = Rect::new(c.x - half, c.y - half, HANDLE_SIZE_PX, HANDLE_SIZE_PX).corners();
    ctx.set_fill(Some(if kind == HandleKind::Rotate { Color::GRAY } else { Color::WHITE }));
    ctx.fill_polygon(&square)?;
    ctx.set_stroke(SELECTED_COLOR, 1.0, LineStyle::Solid);
    ctx.stroke_path(&square, true)
}

/// Draw the shown link anchors of one element as small circles.
///
/// # Errors
///
/// Returns `Err` if a context call fails.
pub fn draw_link_anchors(
    ctx: &mut dyn DrawContext,
    scene: &Scene,
    id: ViewId,
    pathway: &Pathway,
    zoom: f64,
) -> Result<(), DrawError> {
    let Some(el) = scene.get(id) else {
        return Ok(());
    };
    let (Some(delegate), Some(f)) = (el.link_anchors.as_ref(), el.kind.link_frame(pathway)) else {
        return Ok(());
    };
    for a in delegate.anchors() {
        let c = view_point(f.to_absolute(a.rel_x, a.rel_y), zoom);
        let circle: Vec<Point> = (0..8)
            .map(|i| {
                let t = std::f64::consts::TAU * f64::from(i) / 8.0;
                c.offset(LINK_ANCHOR_RADIUS_PX * t.cos(), LINK_ANCHOR_RADIUS_PX * t.sin())
            })
            .collect();
        ctx.set_fill(Some(if a.highlighted { Color::RED } else { Color::BLUE }));
        ctx.fill_polygon(&circle)?;
    }
    Ok(())
}
