//! Group painters: one paint strategy per group style.
//!
//! The registry maps a style name to a [`GroupPainter`]. Unknown names fall
//! back to the plain box. Each painter also declares the default visual
//! properties its style implies; the canvas writes those onto the group's
//! model element so a saved document carries the same look.

#[cfg(test)]
#[path = "group_painter_test.rs"]
mod group_painter_test;

use std::collections::HashMap;

use crate::camera::Point;
use crate::consts::TEXT_MARGIN;
use crate::error::DrawError;
use crate::geom::Rect;
use crate::model::{Color, LineStyle, PathwayElement, ShapeType};
use crate::render::DrawContext;
use crate::shaped::{estimate_text_width, octagon_in};

/// Label shown inside a hovered group when it fits.
pub const HOVER_LABEL: &str = "Click to select Group";

const LABEL_FONT_SIZE: f64 = 10.0;

/// What a painter gets to see of a group. Bounds are view space.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupPaint {
    pub bounds: Rect,
    pub mouse_over: bool,
    pub anchors_shown: bool,
    pub selected: bool,
    /// Group id to show when an alias points at this group.
    pub alias: Option<String>,
}

/// Style properties a painter writes back onto its group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupDefaults {
    pub color: Color,
    pub line_style: LineStyle,
    pub fill_color: Option<Color>,
    pub shape_type: ShapeType,
}

/// Copy `defaults` onto a group element. Returns `true` if anything changed.
pub fn apply_defaults(e: &mut PathwayElement, defaults: &GroupDefaults) -> bool {
    let changed = e.color != defaults.color
        || e.line_style != defaults.line_style
        || e.fill_color != defaults.fill_color
        || e.shape_type != defaults.shape_type;
    e.color = defaults.color;
    e.line_style = defaults.line_style;
    e.fill_color = defaults.fill_color;
    e.shape_type = defaults.shape_type;
    changed
}

/// Whether `defaults` already hold on `e`.
#[must_use]
pub fn has_defaults(e: &PathwayElement, defaults: &GroupDefaults) -> bool {
    e.color == defaults.color
        && e.line_style == defaults.line_style
        && e.fill_color == defaults.fill_color
        && e.shape_type == defaults.shape_type
}

/// Paint strategy for one group style.
pub trait GroupPainter {
    fn defaults(&self) -> GroupDefaults;

    /// Draw the group.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a context call fails.
    fn paint(&self, ctx: &mut dyn DrawContext, group: &GroupPaint) -> Result<(), DrawError>;
}

/// Draws the hover label and alias id, each only if it fits inside the bounds.
fn paint_labels(ctx: &mut dyn DrawContext, group: &GroupPaint) -> Result<(), DrawError> {
    let mut lines: Vec<String> = Vec::new();
    if let Some(alias) = &group.alias {
        lines.push(format!("Group: {alias}"));
    }
    if group.mouse_over && !group.selected {
        lines.push(HOVER_LABEL.to_string());
    }
    let b = group.bounds;
    let mut y = b.top() + TEXT_MARGIN + LABEL_FONT_SIZE;
    for line in lines {
        let width = ctx.measure_text(&line, LABEL_FONT_SIZE).unwrap_or_else(|| estimate_text_width(&line, LABEL_FONT_SIZE));
        let fits = width + 2.0 * TEXT_MARGIN <= b.width && y + TEXT_MARGIN <= b.bottom();
        if fits {
            let at = Point::new(b.center().x - width / 2.0, y);
            ctx.draw_text(&line, at, LABEL_FONT_SIZE, Color::GRAY)?;
            y += LABEL_FONT_SIZE + TEXT_MARGIN;
        }
    }
    Ok(())
}

fn paint_box(ctx: &mut dyn DrawContext, group: &GroupPaint, d: &GroupDefaults) -> Result<(), DrawError> {
    let corners = group.bounds.corners();
    if let Some(fill) = d.fill_color {
        ctx.set_fill(Some(fill));
        ctx.fill_polygon(&corners)?;
    }
    let color = if group.selected { Color::BLUE } else { d.color };
    ctx.set_stroke(color, 1.0, d.line_style);
    ctx.stroke_path(&corners, true)
}

/// Translucent box with a dashed border.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainPainter;

impl GroupPainter for PlainPainter {
    fn defaults(&self) -> GroupDefaults {
        GroupDefaults {
            color: Color::GRAY,
            line_style: LineStyle::Dashed,
            fill_color: Some(Color::rgba(180, 180, 100, 40)),
            shape_type: ShapeType::Rectangle,
        }
    }

    fn paint(&self, ctx: &mut dyn DrawContext, group: &GroupPaint) -> Result<(), DrawError> {
        paint_box(ctx, group, &self.defaults())?;
        paint_labels(ctx, group)
    }
}

/// Invisible until hovered, selected or offering link anchors.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransparentPainter;

impl GroupPainter for TransparentPainter {
    fn defaults(&self) -> GroupDefaults {
        GroupDefaults {
            color: Color::GRAY,
            line_style: LineStyle::Solid,
            fill_color: None,
            shape_type: ShapeType::Rectangle,
        }
    }

    fn paint(&self, ctx: &mut dyn DrawContext, group: &GroupPaint) -> Result<(), DrawError> {
        if group.mouse_over || group.selected || group.anchors_shown {
            let d = GroupDefaults { fill_color: Some(Color::rgba(0, 0, 255, 20)), ..self.defaults() };
            paint_box(ctx, group, &d)?;
        }
        paint_labels(ctx, group)
    }
}

/// Octagon with a solid border.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplexPainter;

impl GroupPainter for ComplexPainter {
    fn defaults(&self) -> GroupDefaults {
        GroupDefaults {
            color: Color::GRAY,
            line_style: LineStyle::Solid,
            fill_color: Some(Color::rgba(180, 180, 180, 60)),
            shape_type: ShapeType::Octagon,
        }
    }

    fn paint(&self, ctx: &mut dyn DrawContext, group: &GroupPaint) -> Result<(), DrawError> {
        let d = self.defaults();
        let poly = octagon_in(group.bounds);
        if let Some(fill) = d.fill_color {
            ctx.set_fill(Some(fill));
            ctx.fill_polygon(&poly)?;
        }
        ctx.set_stroke(if group.selected { Color::BLUE } else { d.color }, 1.0, d.line_style);
        ctx.stroke_path(&poly, true)?;
        paint_labels(ctx, group)
    }
}

/// Colored container for a sub-pathway.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathwayPainter;

impl GroupPainter for PathwayPainter {
    fn defaults(&self) -> GroupDefaults {
        GroupDefaults {
            color: Color::rgb(0, 128, 0),
            line_style: LineStyle::Solid,
            fill_color: Some(Color::rgba(0, 255, 0, 20)),
            shape_type: ShapeType::Rectangle,
        }
    }

    fn paint(&self, ctx: &mut dyn DrawContext, group: &GroupPaint) -> Result<(), DrawError> {
        paint_box(ctx, group, &self.defaults())?;
        paint_labels(ctx, group)
    }
}

/// Style name to painter, with a fallback for unknown names.
pub struct PainterRegistry {
    painters: HashMap<String, Box<dyn GroupPainter>>,
    fallback: Box<dyn GroupPainter>,
}

impl Default for PainterRegistry {
    fn default() -> Self {
        let mut registry = Self { painters: HashMap::new(), fallback: Box::new(PlainPainter) };
        registry.register("Group", Box::new(PlainPainter));
        registry.register("None", Box::new(TransparentPainter));
        registry.register("Complex", Box::new(ComplexPainter));
        registry.register("Pathway", Box::new(PathwayPainter));
        registry
    }
}

impl std::fmt::Debug for PainterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.painters.keys().collect();
        names.sort();
        f.debug_struct("PainterRegistry").field("painters", &names).finish_non_exhaustive()
    }
}

impl PainterRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the painter for a style name.
    pub fn register(&mut self, name: &str, painter: Box<dyn GroupPainter>) {
        self.painters.insert(name.to_string(), painter);
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.painters.contains_key(name)
    }

    /// Painter for `name`, or the plain box for unknown names.
    #[must_use]
    pub fn get(&self, name: &str) -> &dyn GroupPainter {
        self.painters.get(name).map_or(self.fallback.as_ref(), |p| p.as_ref())
    }
}
