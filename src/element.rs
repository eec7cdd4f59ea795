//! Scene elements and the arena that owns them.
//!
//! Every visual thing on the canvas is a [`SceneElement`] stored in the
//! [`Scene`] under a [`ViewId`]. Most mirror one model element; handles,
//! citation markers and the selection box are synthetic and belong to an
//! owner. New elements are staged in a pending list and only join the draw
//! order at [`Scene::sync`]; destroyed elements are flagged and swept at the
//! same point, so the draw order is never mutated mid-iteration.
//!
//! Outlines are computed lazily from the model and cached per element until
//! [`Scene::invalidate`] drops them.

#[cfg(test)]
#[path = "element_test.rs"]
mod element_test;

use std::cell::OnceCell;
use std::collections::{HashMap, HashSet};

use tracing::debug;
use uuid::Uuid;

use crate::anchor::AnchorView;
use crate::consts::{HANDLE_Z, SELECTION_BOX_Z};
use crate::error::CanvasError;
use crate::frame::{self, Frame};
use crate::geom::{Outline, Rect};
use crate::handle::{Adjustable, Handle, HandleKind, handle_outline};
use crate::line::{self, LineView};
use crate::link_anchor::LinkAnchorDelegate;
use crate::model::{Color, GraphId, Pathway};
use crate::selection::SelectionBox;
use crate::shaped::{self, CitationMarker, GroupView, InfoView, ShapedView};

/// Identifier of a scene element.
pub type ViewId = Uuid;

/// What a scene element shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewKind {
    Shaped(ShapedView),
    Group(GroupView),
    Line(LineView),
    Anchor(AnchorView),
    Info(InfoView),
    Citation(CitationMarker),
    Handle(Handle),
    SelectionBox(SelectionBox),
}

impl ViewKind {
    /// Key under which the scene indexes this view: the graph id of the
    /// mirrored element, or the anchor id for anchors. `None` for synthetic views.
    #[must_use]
    pub fn model_key(&self) -> Option<&str> {
        match self {
            Self::Shaped(v) => Some(&v.model),
            Self::Group(v) => Some(&v.model),
            Self::Line(v) => Some(&v.model),
            Self::Info(v) => Some(&v.model),
            Self::Anchor(v) => Some(&v.anchor),
            Self::Citation(_) | Self::Handle(_) | Self::SelectionBox(_) => None,
        }
    }

    /// The pathway element this view draws, if any. Anchors report their line.
    #[must_use]
    pub fn model(&self) -> Option<&str> {
        match self {
            Self::Anchor(v) => Some(&v.line),
            Self::Citation(v) => Some(&v.model),
            _ => self.model_key(),
        }
    }

    #[must_use]
    pub fn as_adjustable(&self) -> Option<&dyn Adjustable> {
        match self {
            Self::Shaped(v) => Some(v),
            Self::Group(v) => Some(v),
            Self::Line(v) => Some(v),
            Self::Anchor(v) => Some(v),
            Self::SelectionBox(v) => Some(v),
            Self::Info(_) | Self::Citation(_) | Self::Handle(_) => None,
        }
    }

    pub fn as_adjustable_mut(&mut self) -> Option<&mut dyn Adjustable> {
        match self {
            Self::Shaped(v) => Some(v),
            Self::Group(v) => Some(v),
            Self::Line(v) => Some(v),
            Self::Anchor(v) => Some(v),
            Self::SelectionBox(v) => Some(v),
            Self::Info(_) | Self::Citation(_) | Self::Handle(_) => None,
        }
    }

    /// Frame that link anchor positions are relative to. An anchor on a
    /// line gets a zero-size frame at its own position.
    #[must_use]
    pub fn link_frame(&self, pathway: &Pathway) -> Option<Frame> {
        match self {
            Self::Shaped(v) => frame::frame(pathway, pathway.get(&v.model)?),
            Self::Group(v) => frame::group_bounds(pathway, pathway.get(&v.model)?).map(Frame::from_rect),
            Self::Anchor(v) => {
                let at = v.position(pathway)?;
                Some(Frame { center: at, width: 0.0, height: 0.0, rotation: 0.0 })
            }
            _ => None,
        }
    }

    /// Whether line endpoints may attach to what this view shows.
    #[must_use]
    pub fn is_linkable(&self, pathway: &Pathway) -> bool {
        match self {
            Self::Anchor(_) => true,
            Self::Shaped(v) => pathway.get(&v.model).is_some_and(|e| e.object_type.is_linkable()),
            Self::Group(_) => true,
            _ => false,
        }
    }
}

/// One node of the scene graph.
#[derive(Debug, Clone)]
pub struct SceneElement {
    pub id: ViewId,
    pub kind: ViewKind,
    pub selected: bool,
    pub highlight: Option<Color>,
    pub mouse_over: bool,
    /// Handles created while this element is selected.
    pub handles: Vec<ViewId>,
    /// Owned compound children, such as a citation marker.
    pub children: Vec<ViewId>,
    pub link_anchors: Option<LinkAnchorDelegate>,
    dirty: bool,
    to_be_removed: bool,
    outline: OnceCell<Outline>,
    last_bounds: Option<Rect>,
}

impl SceneElement {
    fn new(kind: ViewKind) -> Self {
        let link_anchors = match &kind {
            ViewKind::Shaped(_) | ViewKind::Group(_) => Some(LinkAnchorDelegate::for_shape()),
            ViewKind::Anchor(_) => Some(LinkAnchorDelegate::for_line_anchor()),
            _ => None,
        };
        Self {
            id: Uuid::new_v4(),
            kind,
            selected: false,
            highlight: None,
            mouse_over: false,
            handles: Vec::new(),
            children: Vec::new(),
            link_anchors,
            dirty: false,
            to_be_removed: false,
            outline: OnceCell::new(),
            last_bounds: None,
        }
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.to_be_removed
    }

    /// Bounds recorded the last time the element was marked dirty.
    #[must_use]
    pub fn last_bounds(&self) -> Option<Rect> {
        self.last_bounds
    }
}

/// Arena of scene elements in draw order.
#[derive(Debug, Default)]
pub struct Scene {
    elements: HashMap<ViewId, SceneElement>,
    draw_order: Vec<ViewId>,
    pending: Vec<ViewId>,
    by_model: HashMap<GraphId, ViewId>,
    dirty_region: Option<Rect>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Lifecycle ---

    /// Stage a new element. A view whose model key is already mirrored is
    /// not duplicated; the existing id is returned instead.
    pub fn insert(&mut self, kind: ViewKind) -> ViewId {
        if let Some(key) = kind.model_key() {
            if let Some(existing) = self.by_model.get(key) {
                return *existing;
            }
        }
        let element = SceneElement::new(kind);
        let id = element.id;
        if let Some(key) = element.kind.model_key() {
            self.by_model.insert(key.to_string(), id);
        }
        debug!(%id, kind = kind_name(&element.kind), "scene element staged");
        self.elements.insert(id, element);
        self.pending.push(id);
        id
    }

    /// Flag an element and everything it owns for removal. The model index
    /// forgets it immediately; the arena drops it at the next [`Scene::sync`].
    pub fn destroy(&mut self, id: ViewId) {
        let Some(element) = self.elements.get_mut(&id) else {
            return;
        };
        if element.to_be_removed {
            return;
        }
        element.to_be_removed = true;
        element.selected = false;
        let owned: Vec<ViewId> = element.handles.drain(..).chain(element.children.drain(..)).collect();
        let last = element.last_bounds;
        if let Some(key) = element.kind.model_key() {
            if self.by_model.get(key) == Some(&id) {
                self.by_model.remove(key);
            }
        }
        if let Some(b) = last {
            self.add_dirty(b);
        }
        debug!(%id, "scene element destroyed");
        for child in owned {
            self.destroy(child);
        }
    }

    /// Create a handle for `owner`.
    pub fn add_handle(&mut self, owner: ViewId, kind: HandleKind) -> ViewId {
        let id = self.insert(ViewKind::Handle(Handle { owner, kind }));
        if let Some(o) = self.elements.get_mut(&owner) {
            o.handles.push(id);
        }
        id
    }

    pub fn clear_handles(&mut self, owner: ViewId) {
        let handles = self.elements.get_mut(&owner).map(|o| std::mem::take(&mut o.handles)).unwrap_or_default();
        for h in handles {
            self.destroy(h);
        }
    }

    /// Create a compound child owned by `owner`.
    pub fn add_child(&mut self, owner: ViewId, kind: ViewKind) -> ViewId {
        let id = self.insert(kind);
        if let Some(o) = self.elements.get_mut(&owner) {
            o.children.push(id);
        }
        id
    }

    /// Merge pending elements, sweep removed ones and re-sort by z.
    pub fn sync(&mut self, pathway: &Pathway) {
        let pending = std::mem::take(&mut self.pending);
        self.draw_order.extend(pending);
        self.elements.retain(|_, e| !e.to_be_removed);
        let elements = &self.elements;
        self.draw_order.retain(|id| elements.contains_key(id));
        self.prune_owned();
        let mut keyed: Vec<(i64, ViewId)> = self.draw_order.iter().map(|id| (self.z_of(*id, pathway), *id)).collect();
        keyed.sort_by_key(|(z, _)| *z);
        self.draw_order = keyed.into_iter().map(|(_, id)| id).collect();
    }

    fn prune_owned(&mut self) {
        let live: HashSet<ViewId> = self.elements.keys().copied().collect();
        for e in self.elements.values_mut() {
            e.handles.retain(|h| live.contains(h));
            e.children.retain(|c| live.contains(c));
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn get(&self, id: ViewId) -> Option<&SceneElement> {
        self.elements.get(&id).filter(|e| !e.to_be_removed)
    }

    pub fn get_mut(&mut self, id: ViewId) -> Option<&mut SceneElement> {
        self.elements.get_mut(&id).filter(|e| !e.to_be_removed)
    }

    /// Look up a live element, failing with `UnknownView`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownView` if the id is unknown or flagged for removal.
    pub fn require(&self, id: ViewId) -> Result<&SceneElement, CanvasError> {
        self.get(id).ok_or(CanvasError::UnknownView(id))
    }

    /// View mirroring a model element or anchor.
    #[must_use]
    pub fn view_of(&self, model_key: &str) -> Option<ViewId> {
        self.by_model.get(model_key).copied()
    }

    /// Merged elements in draw order (lowest z first).
    pub fn live(&self) -> impl DoubleEndedIterator<Item = &SceneElement> {
        self.draw_order.iter().filter_map(|id| self.get(*id))
    }

    /// Ids in draw order, including any flagged since the last sync.
    #[must_use]
    pub fn draw_order(&self) -> &[ViewId] {
        &self.draw_order
    }

    /// Every element not flagged for removal, merged or pending.
    pub fn all(&self) -> impl Iterator<Item = &SceneElement> {
        self.elements.values().filter(|e| !e.to_be_removed)
    }

    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Paint order key. Anchors and citation markers sit just above what
    /// they belong to.
    #[must_use]
    pub fn z_of(&self, id: ViewId, pathway: &Pathway) -> i64 {
        let Some(e) = self.elements.get(&id) else {
            return i64::MIN;
        };
        let model_z = |model: &str| pathway.get(model).map_or(0, |m| m.z_order);
        match &e.kind {
            ViewKind::Shaped(v) => model_z(&v.model),
            ViewKind::Group(v) => model_z(&v.model),
            ViewKind::Line(v) => model_z(&v.model),
            ViewKind::Info(v) => model_z(&v.model),
            ViewKind::Anchor(v) => model_z(&v.line).saturating_add(1),
            ViewKind::Citation(v) => model_z(&v.model).saturating_add(1),
            ViewKind::Handle(_) => HANDLE_Z,
            ViewKind::SelectionBox(_) => SELECTION_BOX_Z,
        }
    }

    // --- Geometry ---

    /// Precise hit-test outline, computed on first use and cached.
    #[must_use]
    pub fn outline(&self, id: ViewId, pathway: &Pathway, zoom: f64) -> Option<&Outline> {
        let e = self.get(id)?;
        let outline = e.outline.get_or_init(|| {
            self.compute_outline(&e.kind, pathway, zoom).unwrap_or_else(|| Outline::Area(Vec::new()))
        });
        if outline.path().is_empty() { None } else { Some(outline) }
    }

    /// Axis-aligned box around the outline.
    #[must_use]
    pub fn bounds(&self, id: ViewId, pathway: &Pathway, zoom: f64) -> Option<Rect> {
        self.outline(id, pathway, zoom).map(Outline::bounds)
    }

    fn compute_outline(&self, kind: &ViewKind, pathway: &Pathway, zoom: f64) -> Option<Outline> {
        match kind {
            ViewKind::Shaped(v) => shaped::outline(pathway, pathway.get(&v.model)?),
            ViewKind::Group(v) => {
                let b = frame::group_bounds(pathway, pathway.get(&v.model)?)?;
                Some(Outline::Area(b.corners().to_vec()))
            }
            ViewKind::Line(v) => line::outline(pathway, pathway.get(&v.model)?),
            ViewKind::Anchor(v) => v.outline(pathway, zoom),
            ViewKind::Info(v) => Some(Outline::Area(shaped::info_rect(pathway.get(&v.model)?).corners().to_vec())),
            ViewKind::Citation(v) => {
                let owner = pathway.get(&v.model)?;
                if owner.citation_refs.is_empty() {
                    return None;
                }
                Some(Outline::Area(shaped::citation_rect(pathway, owner)?.corners().to_vec()))
            }
            ViewKind::Handle(h) => {
                let owner = self.get(h.owner)?.kind.as_adjustable()?;
                Some(handle_outline(owner.handle_position(pathway, h.kind, zoom)?, zoom))
            }
            ViewKind::SelectionBox(sb) => sb.is_visible().then(|| sb.outline()),
        }
    }

    /// Drop the cached outline of one element.
    pub fn invalidate(&mut self, id: ViewId) {
        if let Some(e) = self.elements.get_mut(&id) {
            e.outline.take();
        }
    }

    pub fn invalidate_all(&mut self) {
        for e in self.elements.values_mut() {
            e.outline.take();
        }
    }

    // --- Dirty tracking ---

    /// Add the element's current and previous bounds to the redraw region.
    pub fn mark_dirty(&mut self, id: ViewId, pathway: &Pathway, zoom: f64) {
        let current = self.bounds(id, pathway, zoom);
        let Some(e) = self.elements.get_mut(&id) else {
            return;
        };
        let previous = e.last_bounds;
        e.last_bounds = current;
        e.dirty = true;
        for r in [previous, current].into_iter().flatten() {
            self.add_dirty(r);
        }
    }

    fn add_dirty(&mut self, r: Rect) {
        self.dirty_region = Some(self.dirty_region.map_or(r, |d| d.union(&r)));
    }

    /// Take the accumulated redraw region and mark every element clean.
    pub fn take_dirty_region(&mut self) -> Option<Rect> {
        for e in self.elements.values_mut() {
            e.dirty = false;
        }
        self.dirty_region.take()
    }

    #[must_use]
    pub fn dirty_region(&self) -> Option<Rect> {
        self.dirty_region
    }
}

fn kind_name(kind: &ViewKind) -> &'static str {
    match kind {
        ViewKind::Shaped(_) => "shaped",
        ViewKind::Group(_) => "group",
        ViewKind::Line(_) => "line",
        ViewKind::Anchor(_) => "anchor",
        ViewKind::Info(_) => "info",
        ViewKind::Citation(_) => "citation",
        ViewKind::Handle(_) => "handle",
        ViewKind::SelectionBox(_) => "selection_box",
    }
}
