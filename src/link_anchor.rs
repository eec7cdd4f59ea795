//! Link anchors: transient snap targets shown on linkable elements while a
//! line endpoint is being dragged.
//!
//! Positions are frame-relative (`-1..=1` on both axes). A shaped element
//! gets one anchor per side when that side is short and three otherwise;
//! an anchor on a line gets a single anchor at its own position.

#[cfg(test)]
#[path = "link_anchor_test.rs"]
mod link_anchor_test;

use crate::camera::Point;
use crate::consts::{LINK_ANCHOR_TOLERANCE_PX, MIN_SIZE_FOR_THREE_ANCHORS};
use crate::geom::Rect;

/// One snap target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkAnchor {
    pub rel_x: f64,
    pub rel_y: f64,
    pub highlighted: bool,
}

impl LinkAnchor {
    fn at(rel_x: f64, rel_y: f64) -> Self {
        Self { rel_x, rel_y, highlighted: false }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    /// Sides of a rectangle; `true` means three anchors on the horizontal/vertical sides.
    Sides { three_across: bool, three_down: bool },
    Single,
}

/// Owns the link anchors of one scene element.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkAnchorDelegate {
    layout: Option<Layout>,
    single: bool,
    anchors: Vec<LinkAnchor>,
    shown: bool,
}

impl LinkAnchorDelegate {
    /// Delegate for shaped elements and groups.
    #[must_use]
    pub fn for_shape() -> Self {
        Self { layout: None, single: false, anchors: Vec::new(), shown: false }
    }

    /// Delegate for an anchor on a line.
    #[must_use]
    pub fn for_line_anchor() -> Self {
        Self { layout: None, single: true, anchors: Vec::new(), shown: false }
    }

    /// Show anchors for an owner of the given model size, recomputing the
    /// layout only when the one-versus-three decision changes.
    pub fn show(&mut self, width: f64, height: f64) {
        let layout = if self.single {
            Layout::Single
        } else {
            Layout::Sides {
                three_across: width.abs() >= MIN_SIZE_FOR_THREE_ANCHORS,
                three_down: height.abs() >= MIN_SIZE_FOR_THREE_ANCHORS,
            }
        };
        if self.layout != Some(layout) {
            self.anchors = build(layout);
            self.layout = Some(layout);
        }
        self.shown = true;
    }

    pub fn hide(&mut self) {
        self.shown = false;
        self.unhighlight_all();
    }

    #[must_use]
    pub fn is_shown(&self) -> bool {
        self.shown
    }

    #[must_use]
    pub fn anchors(&self) -> &[LinkAnchor] {
        if self.shown { &self.anchors } else { &[] }
    }

    pub fn highlight(&mut self, index: usize) {
        if let Some(a) = self.anchors.get_mut(index) {
            a.highlighted = true;
        }
    }

    pub fn unhighlight_all(&mut self) {
        for a in &mut self.anchors {
            a.highlighted = false;
        }
    }

    /// Index of the first shown anchor within the hit tolerance of `p`.
    ///
    /// `place` maps a relative anchor position to model space.
    #[must_use]
    pub fn hit(&self, p: Point, zoom: f64, place: impl Fn(f64, f64) -> Point) -> Option<usize> {
        self.anchors()
            .iter()
            .position(|a| anchor_hit_box(place(a.rel_x, a.rel_y), zoom).contains(p))
    }
}

/// Square around an anchor that counts as a hit.
#[must_use]
pub fn anchor_hit_box(at: Point, zoom: f64) -> Rect {
    let half = LINK_ANCHOR_TOLERANCE_PX / zoom;
    Rect::new(at.x - half, at.y - half, 2.0 * half, 2.0 * half)
}

fn build(layout: Layout) -> Vec<LinkAnchor> {
    match layout {
        Layout::Single => vec![LinkAnchor::at(0.0, 0.0)],
        Layout::Sides { three_across, three_down } => {
            let across: &[f64] = if three_across { &[-0.5, 0.0, 0.5] } else { &[0.0] };
            let down: &[f64] = if three_down { &[-0.5, 0.0, 0.5] } else { &[0.0] };
            let mut out = Vec::with_capacity(2 * (across.len() + down.len()));
            out.extend(across.iter().map(|&x| LinkAnchor::at(x, -1.0)));
            out.extend(down.iter().map(|&y| LinkAnchor::at(1.0, y)));
            out.extend(across.iter().map(|&x| LinkAnchor::at(x, 1.0)));
            out.extend(down.iter().map(|&y| LinkAnchor::at(-1.0, y)));
            out
        }
    }
}
