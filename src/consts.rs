//! Shared numeric constants for the scene graph.

// ── Z layers ────────────────────────────────────────────────────

/// Handles sit above everything else.
pub const HANDLE_Z: i64 = i64::MAX;

/// The selection box sits above content, below handles.
pub const SELECTION_BOX_Z: i64 = i64::MAX - 1;

/// Minimum gap between z-adjacent elements after renumbering.
pub const MIN_Z_SPACING: i64 = 2;

// ── Hit-testing ─────────────────────────────────────────────────

/// Side length of a handle square, in view pixels.
pub const HANDLE_SIZE_PX: f64 = 8.0;

/// Distance from the east edge to the rotate handle, in view pixels.
pub const ROTATE_HANDLE_OFFSET_PX: f64 = 20.0;

/// Half side of the square around a link anchor that counts as a hit, in view pixels.
pub const LINK_ANCHOR_TOLERANCE_PX: f64 = 5.0;

/// Radius of a drawn link anchor, in view pixels.
pub const LINK_ANCHOR_RADIUS_PX: f64 = 3.0;

/// Slop added around bounds for the fuzzy fallback hit-test, in view pixels.
pub const FUZZY_TOLERANCE_PX: f64 = 3.0;

/// Thin lines are hit-tested as if they were at least this wide, in model units.
pub const MIN_LINE_HIT_WIDTH: f64 = 4.0;

/// Side length of the square drawn for an anchor on a line, in view pixels.
pub const ANCHOR_SIZE_PX: f64 = 6.0;

// ── Link anchors ────────────────────────────────────────────────

/// Below this side length (model units) a shape shows one link anchor per side instead of three.
pub const MIN_SIZE_FOR_THREE_ANCHORS: f64 = 25.0;

// ── Text ────────────────────────────────────────────────────────

/// Line height as a multiple of the font size.
pub const LINE_SPACING: f64 = 1.2;

/// Inset between a shape's border and its text, in model units.
pub const TEXT_MARGIN: f64 = 3.0;

/// Average glyph width as a fraction of font size, used when no context can measure text.
pub const ESTIMATED_GLYPH_WIDTH: f64 = 0.6;

// ── Shapes ──────────────────────────────────────────────────────

/// Segments used to approximate an ellipse.
pub const ELLIPSE_SEGMENTS: usize = 32;

/// Samples per cubic segment when flattening curved connectors.
pub const CURVE_SAMPLES: usize = 16;

/// Depth limit when resolving endpoints attached to anchors on other lines.
pub const MAX_LINK_DEPTH: usize = 8;

// ── Info box ────────────────────────────────────────────────────

/// Font size of the pathway info box.
pub const INFO_FONT_SIZE: f64 = 10.0;

// ── Citations ───────────────────────────────────────────────────

/// Font size of citation markers.
pub const CITATION_FONT_SIZE: f64 = 8.0;
