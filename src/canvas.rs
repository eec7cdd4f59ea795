//! The canvas controller.
//!
//! `Canvas` owns the pathway document and the scene graph that mirrors it,
//! and turns pointer and keyboard input into model edits. Every entry point
//! first applies queued model events, so edits made through
//! [`Canvas::pathway_mut`] by other collaborators are picked up before the
//! next hit-test or draw.
//!
//! | Concern | Where |
//! |---|---|
//! | Mirroring | `process_model_events`, `mirror_*` |
//! | Hit-testing | `object_at`, `objects_at` |
//! | Selection | `select_ids`, `select_all`, `clear_selection` |
//! | Gestures | `on_pointer_down` / `on_pointer_move` / `on_pointer_up` |
//! | Commands | delete, clipboard, grouping, z-order, layout |
//! | Redraw | `draw`, dirty-region flush to the [`Viewport`] |

#[cfg(test)]
#[path = "canvas_test.rs"]
mod canvas_test;

use std::collections::{BTreeSet, HashSet};

use tracing::{debug, info, warn};

use crate::anchor::AnchorView;
use crate::camera::{Camera, Point};
use crate::clipboard;
use crate::config::CanvasConfig;
use crate::consts::{FUZZY_TOLERANCE_PX, LINK_ANCHOR_TOLERANCE_PX};
use crate::element::{Scene, ViewId, ViewKind};
use crate::error::{CanvasError, DrawError, ModelError};
use crate::geom::{Rect, union_all};
use crate::group_painter::{PainterRegistry, apply_defaults, has_defaults};
use crate::grouping::{self, GroupToggle};
use crate::handle::{AdjustOptions, HandleKind};
use crate::input::{Action, Button, Cursor, DragTarget, DragUndo, Gesture, Key, Modifiers};
use crate::layout::{self, AlignType, Dimension, StackType};
use crate::line::{self, LineView};
use crate::model::{Color, GraphId, LineEnd, ListenerId, ObjectType, Pathway, PathwayElement, PathwayEvent, Snapshot};
use crate::render::{self, DrawContext};
use crate::selection::{Member, SelectionBox};
use crate::shaped::{CitationMarker, GroupView, InfoView, ShapedView};
use crate::template::Template;
use crate::undo::UndoSink;
use crate::viewport::Viewport;
use crate::zorder;

/// A template insertion whose drag is still in progress.
struct Insertion {
    template: Box<dyn Template>,
    added: Vec<GraphId>,
}

/// Interactive view over one pathway document.
pub struct Canvas {
    pathway: Pathway,
    listener: ListenerId,
    scene: Scene,
    camera: Camera,
    config: CanvasConfig,
    painters: PainterRegistry,
    selection_box: ViewId,
    gesture: Gesture,
    drag_undo: DragUndo,
    pre_drag: Option<Snapshot>,
    drag_label: String,
    /// View-space pointer position at press.
    press_at: Option<Point>,
    /// Pointer travelled further than the click tolerance since press.
    moved: bool,
    template: Option<Box<dyn Template>>,
    insertion: Option<Insertion>,
    hovered: Vec<ViewId>,
    cursor: Cursor,
    /// Elements whose link anchors are currently shown.
    link_targets: Vec<ViewId>,
    clipboard: Vec<PathwayElement>,
    paste_count: u32,
    undo: Option<Box<dyn UndoSink>>,
    viewport: Option<Box<dyn Viewport>>,
}

impl Canvas {
    /// Mirror `pathway` into a new canvas. An info element is added when the
    /// pathway has none.
    ///
    /// # Errors
    ///
    /// Returns a model error if the info element cannot be added or a group's
    /// default style cannot be written back.
    pub fn new(pathway: Pathway, config: CanvasConfig) -> Result<Self, CanvasError> {
        let mut pathway = pathway;
        let listener = pathway.subscribe();
        let mut scene = Scene::new();
        let selection_box = scene.insert(ViewKind::SelectionBox(SelectionBox::new()));
        let mut camera = Camera::default();
        if !camera.set_zoom(config.zoom_pct / 100.0) {
            warn!(zoom_pct = config.zoom_pct, "invalid initial zoom ignored");
        }
        let mut canvas = Self {
            pathway,
            listener,
            scene,
            camera,
            config,
            painters: PainterRegistry::default(),
            selection_box,
            gesture: Gesture::Idle,
            drag_undo: DragUndo::NotRecording,
            pre_drag: None,
            drag_label: String::new(),
            press_at: None,
            moved: false,
            template: None,
            insertion: None,
            hovered: Vec::new(),
            cursor: Cursor::Default,
            link_targets: Vec::new(),
            clipboard: Vec::new(),
            paste_count: 0,
            undo: None,
            viewport: None,
        };
        canvas.load()?;
        Ok(canvas)
    }

    /// Send undo boundaries to `sink`.
    #[must_use]
    pub fn with_undo_sink(mut self, sink: Box<dyn UndoSink>) -> Self {
        self.undo = Some(sink);
        self
    }

    /// Report size changes and dirty regions to `viewport`.
    #[must_use]
    pub fn with_viewport(mut self, viewport: Box<dyn Viewport>) -> Self {
        self.viewport = Some(viewport);
        self.resize_viewport();
        self
    }

    fn load(&mut self) -> Result<(), CanvasError> {
        self.ensure_info()?;
        let ids: Vec<GraphId> = self.pathway.elements().map(|e| e.graph_id.clone()).collect();
        for id in &ids {
            self.mirror_added(id)?;
        }
        self.process_model_events()?;
        info!(count = ids.len(), "pathway mirrored");
        Ok(())
    }

    fn ensure_info(&mut self) -> Result<(), CanvasError> {
        if self.pathway.info().is_none() {
            self.pathway.add(PathwayElement::new(ObjectType::Info))?;
        }
        Ok(())
    }

    // --- Accessors ---

    #[must_use]
    pub fn pathway(&self) -> &Pathway {
        &self.pathway
    }

    /// Mutable access for other collaborators. Their edits are mirrored at
    /// the next canvas call or [`Canvas::process_model_events`].
    pub fn pathway_mut(&mut self) -> &mut Pathway {
        &mut self.pathway
    }

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    #[must_use]
    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    #[must_use]
    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    #[must_use]
    pub fn drag_undo(&self) -> DragUndo {
        self.drag_undo
    }

    pub fn painters_mut(&mut self) -> &mut PainterRegistry {
        &mut self.painters
    }

    #[must_use]
    pub fn selection_box_id(&self) -> ViewId {
        self.selection_box
    }

    /// The view mirroring a model element.
    ///
    /// # Errors
    ///
    /// Returns `NoView` if the element has no scene element.
    pub fn require_view(&self, id: &str) -> Result<ViewId, CanvasError> {
        self.scene.view_of(id).ok_or_else(|| CanvasError::NoView(id.to_string()))
    }

    // =============================================================
    // Mirroring
    // =============================================================

    /// Apply every queued model event to the scene graph, then run the sync
    /// point: merge staged elements, sweep removed ones and re-sort by z.
    ///
    /// # Errors
    ///
    /// Returns a model error if a group's default style cannot be written back.
    pub fn process_model_events(&mut self) -> Result<(), CanvasError> {
        loop {
            let events = self.pathway.drain_events(self.listener);
            if events.is_empty() {
                break;
            }
            for event in events {
                match event {
                    PathwayEvent::Added(id) => {
                        self.mirror_added(&id)?;
                        self.invalidate_dependents(&id);
                    }
                    PathwayEvent::Deleted(id) => self.mirror_deleted(&id),
                    PathwayEvent::Modified(id) => self.mirror_modified(&id)?,
                    PathwayEvent::Resized => self.resize_viewport(),
                }
            }
            self.invalidate_groups();
        }
        self.refit_selection();
        self.scene.sync(&self.pathway);
        self.flush_dirty();
        Ok(())
    }

    fn mirror_added(&mut self, id: &str) -> Result<(), CanvasError> {
        let Some(e) = self.pathway.get(id) else {
            return Ok(());
        };
        let kind = match e.object_type {
            ObjectType::DataNode | ObjectType::State | ObjectType::Label | ObjectType::Shape => {
                ViewKind::Shaped(ShapedView::new(id))
            }
            ObjectType::Group => ViewKind::Group(GroupView::new(id)),
            ObjectType::Line | ObjectType::GraphLine => ViewKind::Line(LineView::new(id)),
            ObjectType::Info => ViewKind::Info(InfoView { model: id.to_string() }),
            ObjectType::Biopax => return Ok(()),
        };
        let view = self.scene.insert(kind);
        self.sync_children(view, id)?;
        self.mark_view_dirty(view);
        Ok(())
    }

    fn mirror_deleted(&mut self, id: &str) {
        let Some(view) = self.scene.view_of(id) else {
            return;
        };
        self.forget_view(view);
        self.scene.destroy(view);
    }

    fn mirror_modified(&mut self, id: &str) -> Result<(), CanvasError> {
        if let Some(view) = self.scene.view_of(id) {
            self.sync_children(view, id)?;
        }
        self.invalidate_dependents(id);
        Ok(())
    }

    /// Bring a view's owned children in line with its element: the citation
    /// marker, anchor views of a line, and a group's default style.
    fn sync_children(&mut self, view: ViewId, id: &str) -> Result<(), CanvasError> {
        let Some(e) = self.pathway.get(id) else {
            return Ok(());
        };
        let has_citations = !e.citation_refs.is_empty();
        let anchors: Vec<GraphId> = e.anchors.iter().map(|a| a.id.clone()).collect();
        let is_line = e.object_type.is_line();
        let group_style = (e.object_type == ObjectType::Group).then_some(e.group_style);

        let children: Vec<ViewId> = self.scene.get(view).map(|el| el.children.clone()).unwrap_or_default();
        let marker = children
            .iter()
            .copied()
            .find(|c| self.scene.get(*c).is_some_and(|x| matches!(x.kind, ViewKind::Citation(_))));
        match (has_citations, marker) {
            (true, None) => {
                self.scene.add_child(view, ViewKind::Citation(CitationMarker { owner: view, model: id.to_string() }));
            }
            (false, Some(m)) => self.scene.destroy(m),
            _ => {}
        }

        if is_line {
            let stale: Vec<ViewId> = children
                .iter()
                .copied()
                .filter(|c| {
                    self.scene
                        .get(*c)
                        .is_some_and(|x| matches!(&x.kind, ViewKind::Anchor(a) if !anchors.contains(&a.anchor)))
                })
                .collect();
            for c in stale {
                self.forget_view(c);
                self.scene.destroy(c);
            }
            for anchor in &anchors {
                if self.scene.view_of(anchor).is_none() {
                    self.scene.add_child(view, ViewKind::Anchor(AnchorView::new(id, anchor)));
                }
            }
        }

        if let Some(style) = group_style {
            let defaults = self.painters.get(style.name()).defaults();
            if self.pathway.get(id).is_some_and(|g| !has_defaults(g, &defaults)) {
                self.pathway.update(id, |g| apply_defaults(g, &defaults))?;
            }
        }
        Ok(())
    }

    /// Drop every reference the controller holds to a view about to be destroyed.
    fn forget_view(&mut self, view: ViewId) {
        let mut doomed = vec![view];
        if let Some(e) = self.scene.get(view) {
            doomed.extend(e.children.iter().copied());
        }
        let mut deselected = false;
        for v in &doomed {
            if let Some(sb) = self.selection_box_mut() {
                deselected |= sb.remove(*v);
            }
        }
        self.hovered.retain(|v| !doomed.contains(v));
        self.link_targets.retain(|v| !doomed.contains(v));
        let drag_owner = match &self.gesture {
            Gesture::Dragging { target: DragTarget::Handle { owner, .. }, .. } => Some(*owner),
            _ => None,
        };
        if drag_owner.is_some_and(|o| doomed.contains(&o)) {
            debug!(%view, "drag target destroyed");
            self.gesture = Gesture::Idle;
        }
        if deselected {
            self.refresh_handles();
        }
    }

    fn invalidate_dependents(&mut self, id: &str) {
        for key in dependents(&self.pathway, id) {
            if let Some(view) = self.scene.view_of(&key) {
                self.invalidate_view(view);
            }
        }
    }

    /// Group boxes derive from their members, so any change may move them.
    fn invalidate_groups(&mut self) {
        let groups: Vec<ViewId> =
            self.scene.all().filter(|e| matches!(e.kind, ViewKind::Group(_))).map(|e| e.id).collect();
        for g in groups {
            self.invalidate_view(g);
        }
    }

    /// Drop cached geometry of a view, its handles and children, and mark them dirty.
    fn invalidate_view(&mut self, view: ViewId) {
        let owned: Vec<ViewId> = self
            .scene
            .get(view)
            .map(|e| e.handles.iter().chain(&e.children).copied().collect())
            .unwrap_or_default();
        for v in std::iter::once(view).chain(owned) {
            self.scene.invalidate(v);
            self.mark_view_dirty(v);
        }
    }

    fn mark_view_dirty(&mut self, view: ViewId) {
        self.scene.mark_dirty(view, &self.pathway, self.camera.zoom());
    }

    fn flush_dirty(&mut self) {
        let Some(viewport) = self.viewport.as_mut() else {
            return;
        };
        if let Some(region) = self.scene.take_dirty_region() {
            viewport.invalidate(self.camera.rect_to_view(region));
        }
    }

    fn resize_viewport(&mut self) {
        let (w, h) = self.pathway.extent();
        let zoom = self.camera.zoom();
        if let Some(viewport) = self.viewport.as_mut() {
            viewport.resize_to(w * zoom, h * zoom);
        }
    }

    // =============================================================
    // Hit-testing
    // =============================================================

    /// Highest element under a view-space point: precise outlines first,
    /// then bounds widened by a small tolerance.
    #[must_use]
    pub fn object_at(&self, p: Point) -> Option<ViewId> {
        self.pick(self.camera.point_to_model(p), true)
    }

    /// Every content element whose bounds contain a view-space point.
    #[must_use]
    pub fn objects_at(&self, p: Point) -> Vec<ViewId> {
        self.objects_at_model(self.camera.point_to_model(p))
    }

    fn objects_at_model(&self, m: Point) -> Vec<ViewId> {
        let zoom = self.camera.zoom();
        self.scene
            .live()
            .filter(|e| !matches!(e.kind, ViewKind::Handle(_) | ViewKind::SelectionBox(_)))
            .filter(|e| self.scene.bounds(e.id, &self.pathway, zoom).is_some_and(|b| b.contains(m)))
            .map(|e| e.id)
            .collect()
    }

    /// Hit-test candidates, highest z first.
    fn hit_candidates(&self, include_selection_box: bool) -> Vec<ViewId> {
        self.scene
            .live()
            .rev()
            .filter(|e| match &e.kind {
                ViewKind::SelectionBox(sb) => include_selection_box && sb.is_hit_testable(),
                _ => true,
            })
            .map(|e| e.id)
            .collect()
    }

    fn pick(&self, m: Point, include_selection_box: bool) -> Option<ViewId> {
        let zoom = self.camera.zoom();
        let candidates = self.hit_candidates(include_selection_box);
        let precise = candidates
            .iter()
            .copied()
            .find(|id| self.scene.outline(*id, &self.pathway, zoom).is_some_and(|o| o.contains(m)));
        precise.or_else(|| {
            let tolerance = FUZZY_TOLERANCE_PX / zoom;
            candidates
                .iter()
                .copied()
                .find(|id| self.scene.bounds(*id, &self.pathway, zoom).is_some_and(|b| b.expand(tolerance).contains(m)))
        })
    }

    // =============================================================
    // Selection
    // =============================================================

    fn view_kind(&self, view: ViewId) -> Option<(ViewId, ViewKind)> {
        self.scene.get(view).map(|e| (view, e.kind.clone()))
    }

    /// The view a press on `view` selects. Citations stand for their owner;
    /// without the multi-select modifier a group member stands for its
    /// outermost group.
    fn click_target(&self, view: ViewId, kind: &ViewKind, multi: bool) -> ViewId {
        let view = match kind {
            ViewKind::Citation(c) => c.owner,
            _ => view,
        };
        if multi || matches!(kind, ViewKind::Anchor(_) | ViewKind::Handle(_)) {
            return view;
        }
        self.scene
            .get(view)
            .and_then(|e| e.kind.model_key())
            .and_then(|id| layout::ancestor_groups(&self.pathway, id).last().cloned())
            .and_then(|gid| self.pathway.group(&gid))
            .and_then(|g| self.scene.view_of(&g.graph_id))
            .unwrap_or(view)
    }

    /// Whether a press on `view` lands on something the selection already
    /// holds: a selected element or group around it, or an anchor of a
    /// selected line.
    fn held_by_selection(&self, view: ViewId, kind: &ViewKind) -> bool {
        if self.is_view_selected(self.click_target(view, kind, true))
            || self.is_view_selected(self.click_target(view, kind, false))
        {
            return true;
        }
        match kind {
            ViewKind::Anchor(a) => self.scene.view_of(&a.line).is_some_and(|l| self.is_view_selected(l)),
            _ => false,
        }
    }

    fn selection_box(&self) -> Option<&SelectionBox> {
        match self.scene.get(self.selection_box).map(|e| &e.kind) {
            Some(ViewKind::SelectionBox(sb)) => Some(sb),
            _ => None,
        }
    }

    fn selection_box_mut(&mut self) -> Option<&mut SelectionBox> {
        match self.scene.get_mut(self.selection_box).map(|e| &mut e.kind) {
            Some(ViewKind::SelectionBox(sb)) => Some(sb),
            _ => None,
        }
    }

    /// Current selection in selection order.
    #[must_use]
    pub fn selection(&self) -> &[Member] {
        self.selection_box().map(SelectionBox::members).unwrap_or_default()
    }

    /// Model ids of the selected views. Anchors report their anchor id.
    #[must_use]
    pub fn selected_model_ids(&self) -> Vec<GraphId> {
        self.selection().iter().filter_map(|m| m.model.clone()).collect()
    }

    #[must_use]
    pub fn is_selected(&self, id: &str) -> bool {
        self.scene.view_of(id).is_some_and(|v| self.is_view_selected(v))
    }

    fn is_view_selected(&self, view: ViewId) -> bool {
        self.scene.get(view).is_some_and(|e| e.selected)
    }

    fn select_view(&mut self, view: ViewId) -> bool {
        let Some(el) = self.scene.get_mut(view) else {
            return false;
        };
        if matches!(el.kind, ViewKind::Handle(_) | ViewKind::SelectionBox(_) | ViewKind::Citation(_)) {
            return false;
        }
        el.selected = true;
        let model = el.kind.model_key().map(str::to_string);
        let added = self.selection_box_mut().is_some_and(|sb| sb.add(Member { view, model }));
        self.mark_view_dirty(view);
        added
    }

    fn deselect_view(&mut self, view: ViewId) -> bool {
        if let Some(el) = self.scene.get_mut(view) {
            el.selected = false;
        }
        let removed = self.selection_box_mut().is_some_and(|sb| sb.remove(view));
        self.mark_view_dirty(view);
        removed
    }

    fn clear_selection_inner(&mut self) -> bool {
        let views: Vec<ViewId> = self.selection().iter().map(|m| m.view).collect();
        for v in &views {
            if let Some(el) = self.scene.get_mut(*v) {
                el.selected = false;
            }
            self.mark_view_dirty(*v);
        }
        if let Some(sb) = self.selection_box_mut() {
            sb.clear();
        }
        !views.is_empty()
    }

    /// Rebuild handles and the selection frame after a selection change.
    fn selection_changed(&mut self) -> Action {
        self.refresh_handles();
        self.refit_selection();
        self.scene.sync(&self.pathway);
        let ids = self.selected_model_ids();
        debug!(count = ids.len(), "selection changed");
        Action::SelectionChanged(ids)
    }

    /// A single selected element gets its own handles; a multi-selection
    /// gets the selection box corners.
    fn refresh_handles(&mut self) {
        let owners: Vec<ViewId> = self.scene.all().filter(|e| !e.handles.is_empty()).map(|e| e.id).collect();
        for owner in owners {
            self.scene.clear_handles(owner);
        }
        if self.selection_box().is_some_and(SelectionBox::is_selecting) {
            return;
        }
        let members: Vec<ViewId> = self.selection().iter().map(|m| m.view).collect();
        let owner = match members.as_slice() {
            [] => return,
            [single] => *single,
            _ => self.selection_box,
        };
        let kinds = self
            .scene
            .get(owner)
            .and_then(|e| e.kind.as_adjustable())
            .map(|a| a.handle_kinds(&self.pathway))
            .unwrap_or_default();
        for kind in kinds {
            self.scene.add_handle(owner, kind);
        }
    }

    fn refit_selection(&mut self) {
        let zoom = self.camera.zoom();
        let Some(sb) = self.selection_box() else {
            return;
        };
        if sb.is_selecting() {
            return;
        }
        let views: Vec<ViewId> = sb.members().iter().map(|m| m.view).collect();
        let bounds = if views.len() >= 2 {
            union_all(views.iter().filter_map(|v| self.scene.bounds(*v, &self.pathway, zoom)))
        } else {
            None
        };
        if let Some(sb) = self.selection_box_mut() {
            sb.fit_to(bounds);
        }
        self.invalidate_view(self.selection_box);
    }

    fn replace_selection(&mut self, ids: &[GraphId]) -> Vec<Action> {
        self.clear_selection_inner();
        for id in ids {
            if let Some(view) = self.scene.view_of(id) {
                self.select_view(view);
            }
        }
        vec![self.selection_changed()]
    }

    /// Replace the selection with the views of `ids`.
    ///
    /// # Errors
    ///
    /// Returns `NoView` for an id without a scene element; the selection is
    /// left unchanged in that case.
    pub fn select_ids(&mut self, ids: &[GraphId]) -> Result<Vec<Action>, CanvasError> {
        self.process_model_events()?;
        for id in ids {
            self.require_view(id)?;
        }
        Ok(self.replace_selection(ids))
    }

    /// Select every element, lines and groups included. The info box is left out.
    pub fn select_all(&mut self) -> Vec<Action> {
        let ids: Vec<GraphId> = self
            .scene
            .live()
            .filter(|e| matches!(e.kind, ViewKind::Shaped(_) | ViewKind::Group(_) | ViewKind::Line(_)))
            .filter_map(|e| e.kind.model_key().map(str::to_string))
            .collect();
        self.replace_selection(&ids)
    }

    pub fn clear_selection(&mut self) -> Vec<Action> {
        if self.clear_selection_inner() { vec![self.selection_changed()] } else { Vec::new() }
    }

    // =============================================================
    // Pointer input
    // =============================================================

    /// Press: start an insertion, a handle drag, a move or a rubber band.
    ///
    /// # Errors
    ///
    /// Returns template errors (`EmptyTemplate`, `NoDragTarget`, `NoView`)
    /// and model errors.
    pub fn on_pointer_down(&mut self, p: Point, button: Button, modifiers: Modifiers) -> Result<Vec<Action>, CanvasError> {
        self.process_model_events()?;
        if button != Button::Primary {
            return Ok(Vec::new());
        }
        let m = self.camera.point_to_model(p);
        self.press_at = Some(p);
        self.moved = false;
        if let Some(template) = self.template.take() {
            return self.insert_from_template(template, m);
        }

        let multi = modifiers.multi_select();
        let mut actions = Vec::new();
        let mut hit = self.pick(m, !multi).and_then(|v| self.view_kind(v));
        if let Some((_, ViewKind::SelectionBox(_))) = hit {
            let inner = self.pick(m, false).and_then(|v| self.view_kind(v));
            let on_selection = inner.as_ref().is_none_or(|(v, k)| self.held_by_selection(*v, k));
            if on_selection {
                self.begin_drag(DragTarget::Selection, m, "Move");
                self.scene.sync(&self.pathway);
                return Ok(actions);
            }
            hit = inner;
        }
        match hit {
            Some((_, ViewKind::Handle(h))) => {
                self.begin_drag(DragTarget::Handle { owner: h.owner, kind: h.kind }, m, handle_label(h.kind));
            }
            Some((_, ViewKind::SelectionBox(_))) => self.begin_drag(DragTarget::Selection, m, "Move"),
            Some((view, kind)) => {
                let view = self.click_target(view, &kind, multi);
                let changed = if multi {
                    if self.is_view_selected(view) { self.deselect_view(view) } else { self.select_view(view) }
                } else if self.is_view_selected(view) {
                    false
                } else {
                    self.clear_selection_inner();
                    self.select_view(view)
                };
                if changed {
                    actions.push(self.selection_changed());
                }
                if self.is_view_selected(view) {
                    match kind {
                        ViewKind::Anchor(_) if !multi => self.begin_drag(
                            DragTarget::Handle { owner: view, kind: HandleKind::AnchorSlide },
                            m,
                            "Move anchor",
                        ),
                        _ => self.begin_drag(DragTarget::Selection, m, "Move"),
                    }
                }
            }
            None => {
                let base: BTreeSet<ViewId> =
                    if multi { self.selection().iter().map(|s| s.view).collect() } else { BTreeSet::new() };
                if !multi && self.clear_selection_inner() {
                    actions.push(self.selection_changed());
                }
                if let Some(sb) = self.selection_box_mut() {
                    sb.start_selecting(m);
                }
                self.refresh_handles();
                self.gesture = Gesture::RubberBand { base };
                debug!("rubber band started");
            }
        }
        self.scene.sync(&self.pathway);
        Ok(actions)
    }

    /// Move: hover tracking when idle, otherwise advance the gesture.
    ///
    /// # Errors
    ///
    /// Returns model errors raised while moving or adjusting elements.
    pub fn on_pointer_move(&mut self, p: Point, modifiers: Modifiers) -> Result<Vec<Action>, CanvasError> {
        self.process_model_events()?;
        let m = self.camera.point_to_model(p);
        self.note_travel(p);
        let mut actions = match self.gesture.clone() {
            Gesture::Idle => self.track_hover(m),
            Gesture::Dragging { target, last } => {
                if self.moved {
                    self.drag_to(target, last, m, modifiers)?;
                }
                Vec::new()
            }
            Gesture::RubberBand { base } => self.drag_band(&base, m),
        };
        if let Gesture::Dragging { target, .. } = &self.gesture {
            let cursor = self.drag_cursor(*target);
            if cursor != self.cursor {
                self.cursor = cursor;
                actions.push(Action::SetCursor(cursor));
            }
        }
        self.process_model_events()?;
        Ok(actions)
    }

    /// Release: finish the gesture and commit an undo action if the document changed.
    ///
    /// # Errors
    ///
    /// Returns model errors raised by the final drag step or default sizing.
    pub fn on_pointer_up(&mut self, p: Point, button: Button, modifiers: Modifiers) -> Result<Vec<Action>, CanvasError> {
        self.process_model_events()?;
        if button != Button::Primary {
            return Ok(Vec::new());
        }
        let m = self.camera.point_to_model(p);
        self.note_travel(p);
        let mut actions = Vec::new();
        match self.gesture.clone() {
            Gesture::Dragging { target, last } if self.moved => self.drag_to(target, last, m, modifiers)?,
            Gesture::RubberBand { base } => actions.extend(self.drag_band(&base, m)),
            _ => {}
        }

        match std::mem::take(&mut self.gesture) {
            Gesture::Dragging { .. } => {
                if let Some(insertion) = self.insertion.take() {
                    if !self.moved {
                        insertion.template.apply_default_size(&mut self.pathway, &insertion.added)?;
                    }
                }
                self.hide_link_anchors();
                self.commit_drag();
            }
            Gesture::RubberBand { .. } => {
                if let Some(sb) = self.selection_box_mut() {
                    sb.stop_selecting();
                }
                self.refresh_handles();
                debug!(count = self.selection().len(), "rubber band finished");
            }
            Gesture::Idle => {}
        }
        self.press_at = None;
        self.moved = false;
        self.process_model_events()?;
        Ok(actions)
    }

    /// Double-click asks the host to edit the element under the pointer.
    ///
    /// # Errors
    ///
    /// Returns model errors from applying queued events.
    pub fn on_double_click(&mut self, p: Point) -> Result<Vec<Action>, CanvasError> {
        self.process_model_events()?;
        let m = self.camera.point_to_model(p);
        let Some(el) = self.pick(m, false).and_then(|v| self.scene.get(v)) else {
            return Ok(Vec::new());
        };
        let model = match &el.kind {
            ViewKind::Handle(h) => self.scene.get(h.owner).and_then(|o| o.kind.model()).map(str::to_string),
            kind => kind.model().map(str::to_string),
        };
        Ok(model.map(Action::EditPropertiesRequested).into_iter().collect())
    }

    fn note_travel(&mut self, p: Point) {
        if let Some(press) = self.press_at {
            if press.distance(p) > self.config.min_drag_px {
                self.moved = true;
            }
        }
    }

    fn begin_drag(&mut self, target: DragTarget, at: Point, label: &str) {
        self.gesture = Gesture::Dragging { target, last: at };
        self.pre_drag = Some(self.pathway.snapshot());
        self.drag_undo = DragUndo::NotRecording.start();
        self.drag_label = label.to_string();
        debug!(?target, "drag started");
    }

    fn drag_to(&mut self, target: DragTarget, last: Point, m: Point, modifiers: Modifiers) -> Result<(), CanvasError> {
        if m == last {
            return Ok(());
        }
        let next = match target {
            DragTarget::Selection => {
                self.translate_selection(m.x - last.x, m.y - last.y)?;
                target
            }
            DragTarget::Handle { owner, kind } => {
                let opts = AdjustOptions {
                    zoom: self.camera.zoom(),
                    snap: modifiers.snap() || self.config.snap_to_angle,
                    snap_step: self.config.snap_step(),
                };
                let Some(adjustable) = self.scene.get_mut(owner).and_then(|e| e.kind.as_adjustable_mut()) else {
                    self.gesture = Gesture::Idle;
                    return Ok(());
                };
                let active = adjustable.adjust_to_handle(&mut self.pathway, kind, m, &opts)?;
                if active != kind {
                    debug!(from = ?kind, to = ?active, "handle flipped");
                }
                if let HandleKind::LineEnd(end) = kind {
                    self.update_link(owner, end, m)?;
                }
                DragTarget::Handle { owner, kind: active }
            }
        };
        self.gesture = Gesture::Dragging { target: next, last: m };
        self.drag_undo = self.drag_undo.touch();
        Ok(())
    }

    fn commit_drag(&mut self) {
        let before = self.pre_drag.take();
        let state = std::mem::take(&mut self.drag_undo);
        if state == DragUndo::Changed {
            if let (Some(snapshot), Some(undo)) = (before, self.undo.as_mut()) {
                undo.new_action(&self.drag_label, snapshot);
            }
        }
        debug!(?state, "drag finished");
    }

    fn drag_band(&mut self, base: &BTreeSet<ViewId>, m: Point) -> Vec<Action> {
        let zoom = self.camera.zoom();
        let Some(sb) = self.selection_box_mut() else {
            return Vec::new();
        };
        sb.drag_to(m);
        let band = sb.rect();
        self.invalidate_view(self.selection_box);
        let inside: BTreeSet<ViewId> = self
            .scene
            .live()
            .filter(|e| matches!(e.kind, ViewKind::Shaped(_) | ViewKind::Group(_) | ViewKind::Line(_)))
            .filter(|e| self.scene.bounds(e.id, &self.pathway, zoom).is_some_and(|b| b.intersects(&band)))
            .map(|e| e.id)
            .collect();
        let wanted: BTreeSet<ViewId> = base.union(&inside).copied().collect();
        let current: BTreeSet<ViewId> = self.selection().iter().map(|s| s.view).collect();
        if wanted == current {
            return Vec::new();
        }
        for v in current.difference(&wanted) {
            self.deselect_view(*v);
        }
        for v in wanted.difference(&current) {
            self.select_view(*v);
        }
        vec![self.selection_changed()]
    }

    fn track_hover(&mut self, m: Point) -> Vec<Action> {
        let under = self.objects_at_model(m);
        let entered: Vec<ViewId> = under.iter().filter(|v| !self.hovered.contains(v)).copied().collect();
        let exited: Vec<ViewId> = self.hovered.iter().filter(|v| !under.contains(v)).copied().collect();
        let mut actions = Vec::new();
        if !entered.is_empty() || !exited.is_empty() {
            for (views, over) in [(&exited, false), (&entered, true)] {
                for v in views {
                    if let Some(el) = self.scene.get_mut(*v) {
                        el.mouse_over = over;
                    }
                    self.mark_view_dirty(*v);
                }
            }
            actions.push(Action::Hover { entered: self.models_of(&entered), exited: self.models_of(&exited) });
            self.hovered = under;
        }
        let cursor = match self.pick(m, true).and_then(|v| self.scene.get(v)).map(|e| &e.kind) {
            Some(ViewKind::Handle(h)) => h.kind.cursor(),
            Some(_) => Cursor::Move,
            None => Cursor::Default,
        };
        if cursor != self.cursor {
            self.cursor = cursor;
            actions.push(Action::SetCursor(cursor));
        }
        actions
    }

    fn models_of(&self, views: &[ViewId]) -> Vec<GraphId> {
        views
            .iter()
            .filter_map(|v| self.scene.get(*v))
            .filter_map(|e| e.kind.model_key().map(str::to_string))
            .collect()
    }

    fn drag_cursor(&self, target: DragTarget) -> Cursor {
        match target {
            DragTarget::Selection => Cursor::Move,
            DragTarget::Handle { kind, .. } if self.link_active() => {
                if matches!(kind, HandleKind::LineEnd(_)) { Cursor::Link } else { kind.cursor() }
            }
            DragTarget::Handle { kind, .. } => kind.cursor(),
        }
    }

    fn link_active(&self) -> bool {
        self.link_targets
            .iter()
            .filter_map(|v| self.scene.get(*v))
            .filter_map(|e| e.link_anchors.as_ref())
            .any(|d| d.anchors().iter().any(|a| a.highlighted))
    }

    // =============================================================
    // Line endpoint linking
    // =============================================================

    /// Attach or detach a dragged line endpoint at model point `m`.
    ///
    /// Candidates are linkable elements near `m`, highest first, except the
    /// line's own anchors and the groups the line belongs to. The first one
    /// with a link anchor under `m` wins; with no hit an attached endpoint
    /// is detached where it is.
    fn update_link(&mut self, owner: ViewId, end: LineEnd, m: Point) -> Result<(), CanvasError> {
        self.hide_link_anchors();
        let Some(line_id) = self.scene.get(owner).and_then(|e| match &e.kind {
            ViewKind::Line(v) => Some(v.model.clone()),
            _ => None,
        }) else {
            return Ok(());
        };
        let Some(line) = self.pathway.get(&line_id) else {
            return Ok(());
        };
        let own_anchors: HashSet<GraphId> = line.anchors.iter().map(|a| a.id.clone()).collect();
        let own_groups: HashSet<GraphId> = layout::ancestor_groups(&self.pathway, &line_id)
            .iter()
            .filter_map(|g| self.pathway.group(g))
            .map(|g| g.graph_id.clone())
            .collect();

        let zoom = self.camera.zoom();
        let reach = LINK_ANCHOR_TOLERANCE_PX / zoom;
        let candidates: Vec<(ViewId, GraphId)> = self
            .scene
            .live()
            .rev()
            .filter(|e| e.kind.is_linkable(&self.pathway))
            .filter_map(|e| e.kind.model_key().map(|k| (e.id, k.to_string())))
            .filter(|(_, key)| *key != line_id && !own_anchors.contains(key) && !own_groups.contains(key))
            .filter(|(id, _)| self.scene.bounds(*id, &self.pathway, zoom).is_some_and(|b| b.expand(reach).contains(m)))
            .collect();

        for (view, key) in candidates {
            let Some(frame) = self.scene.get(view).and_then(|e| e.kind.link_frame(&self.pathway)) else {
                continue;
            };
            let Some(delegate) = self.scene.get_mut(view).and_then(|e| e.link_anchors.as_mut()) else {
                continue;
            };
            delegate.show(frame.width, frame.height);
            let hit = delegate.hit(m, zoom, |x, y| frame.to_absolute(x, y));
            let rel = hit.and_then(|i| delegate.anchors().get(i)).map(|a| (a.rel_x, a.rel_y));
            if let Some(i) = hit {
                delegate.highlight(i);
            }
            self.link_targets.push(view);
            self.mark_view_dirty(view);
            if let Some((rel_x, rel_y)) = rel {
                self.pathway.link_point(&line_id, end, &key, rel_x, rel_y)?;
                debug!(line = %line_id, target = %key, "endpoint linked");
                return Ok(());
            }
        }

        let attached = self.pathway.get(&line_id).and_then(|l| l.point(end)).is_some_and(|p| p.is_attached());
        if attached {
            line::detach_at(&mut self.pathway, &line_id, end, m)?;
            debug!(line = %line_id, "endpoint detached");
        }
        Ok(())
    }

    fn hide_link_anchors(&mut self) {
        for view in std::mem::take(&mut self.link_targets) {
            if let Some(delegate) = self.scene.get_mut(view).and_then(|e| e.link_anchors.as_mut()) {
                delegate.hide();
            }
            self.mark_view_dirty(view);
        }
    }

    // =============================================================
    // Templates
    // =============================================================

    /// Arm a template; the next press inserts its elements.
    pub fn set_template(&mut self, template: Box<dyn Template>) {
        debug!(template = template.name(), "template armed");
        self.template = Some(template);
    }

    pub fn clear_template(&mut self) {
        self.template = None;
    }

    #[must_use]
    pub fn has_template(&self) -> bool {
        self.template.is_some()
    }

    fn insert_from_template(&mut self, mut template: Box<dyn Template>, at: Point) -> Result<Vec<Action>, CanvasError> {
        self.scene.sync(&self.pathway);
        let before = self.pathway.snapshot();
        let name = template.name().to_string();
        let added = template.add_elements(&mut self.pathway, at)?;
        if added.is_empty() {
            return Err(CanvasError::EmptyTemplate(name));
        }
        self.process_model_events()?;
        template.post_insert(&mut self.pathway, &added)?;
        self.process_model_events()?;

        let drag = template.drag_element(&added).ok_or_else(|| CanvasError::NoDragTarget(name.clone()))?;
        let view = self.require_view(&drag.model)?;
        self.clear_selection_inner();
        self.select_view(view);
        let selection = self.selection_changed();

        let target = match drag.handle {
            Some(kind) => DragTarget::Handle { owner: view, kind },
            None => DragTarget::Selection,
        };
        self.gesture = Gesture::Dragging { target, last: at };
        self.pre_drag = Some(before);
        self.drag_undo = DragUndo::NotRecording.start().touch();
        self.drag_label = format!("Insert {name}");
        info!(template = %name, count = added.len(), "elements inserted");
        self.insertion = Some(Insertion { template, added: added.clone() });
        Ok(vec![Action::Inserted(added), selection])
    }

    // =============================================================
    // Keyboard
    // =============================================================

    /// Keyboard shortcuts. Ignored while a pointer gesture is in progress.
    ///
    /// # Errors
    ///
    /// Returns model errors from the command the key triggers.
    pub fn on_key_down(&mut self, key: Key, modifiers: Modifiers) -> Result<Vec<Action>, CanvasError> {
        self.process_model_events()?;
        if !self.gesture.is_idle() {
            return Ok(Vec::new());
        }
        if key.is("Delete") || key.is("Backspace") {
            return self.delete_selection();
        }
        if let Some((dx, dy)) = arrow_delta(&key) {
            let step = if modifiers.shift { self.config.nudge * 10.0 } else { self.config.nudge };
            self.move_selection_by(dx * step, dy * step)?;
            return Ok(Vec::new());
        }
        if modifiers.command() {
            if key.is("a") {
                return Ok(self.select_all());
            }
            if key.is("g") {
                return self.toggle_group();
            }
            if key.is("c") {
                self.copy();
                return Ok(Vec::new());
            }
            if key.is("x") {
                return self.cut();
            }
            if key.is("v") {
                return self.paste();
            }
        }
        Ok(Vec::new())
    }

    // =============================================================
    // Commands
    // =============================================================

    fn record_undo(&mut self, label: &str, before: Snapshot) {
        if let Some(undo) = self.undo.as_mut() {
            undo.new_action(label, before);
        }
    }

    /// Run `f` as one undo action, recorded only if the document changed.
    fn undoable<R>(&mut self, label: &str, f: impl FnOnce(&mut Self) -> Result<R, CanvasError>) -> Result<R, CanvasError> {
        let before = self.pathway.snapshot();
        let result = f(self);
        if self.pathway.snapshot() != before {
            self.record_undo(label, before);
        }
        self.process_model_events()?;
        result
    }

    fn translate_selection(&mut self, dx: f64, dy: f64) -> Result<(), CanvasError> {
        let ids = self.selected_model_ids();
        for id in layout::movable(&self.pathway, &ids) {
            layout::translate(&mut self.pathway, &id, dx, dy)?;
        }
        Ok(())
    }

    /// Move the selection by a model-space delta as one undo action.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if a selected element vanished.
    pub fn move_selection_by(&mut self, dx: f64, dy: f64) -> Result<(), CanvasError> {
        self.undoable("Move", |c| c.translate_selection(dx, dy))
    }

    /// Delete the selection. Selected groups take their members with them;
    /// the info box is never deleted.
    ///
    /// # Errors
    ///
    /// Returns model errors raised while removing elements.
    pub fn delete_selection(&mut self) -> Result<Vec<Action>, CanvasError> {
        self.delete_selection_as("Delete")
    }

    fn delete_selection_as(&mut self, label: &str) -> Result<Vec<Action>, CanvasError> {
        self.process_model_events()?;
        let doomed = deletable(&self.pathway, &self.selected_model_ids());
        if doomed.is_empty() {
            return Ok(Vec::new());
        }
        self.clear_selection_inner();
        let action = self.selection_changed();
        self.undoable(label, |c| remove_all(&mut c.pathway, &doomed).map_err(CanvasError::from))?;
        info!(count = doomed.len(), "selection deleted");
        Ok(vec![action])
    }

    /// Copy the selection to the canvas clipboard. Returns the number of elements copied.
    pub fn copy(&mut self) -> usize {
        self.clipboard = clipboard::collect(&self.pathway, &self.selected_model_ids());
        self.paste_count = 0;
        debug!(count = self.clipboard.len(), "selection copied");
        self.clipboard.len()
    }

    /// Copy, then delete the selection.
    ///
    /// # Errors
    ///
    /// Returns model errors raised while removing elements.
    pub fn cut(&mut self) -> Result<Vec<Action>, CanvasError> {
        self.copy();
        self.delete_selection_as("Cut")
    }

    /// Paste the clipboard, each paste offset further than the last, and
    /// select the pasted top-level elements.
    ///
    /// # Errors
    ///
    /// Returns model errors raised while adding the copies.
    pub fn paste(&mut self) -> Result<Vec<Action>, CanvasError> {
        if self.clipboard.is_empty() {
            return Ok(Vec::new());
        }
        self.paste_count = self.paste_count.saturating_add(1);
        let offset = self.config.paste_offset * f64::from(self.paste_count);
        let elements = self.clipboard.clone();
        let added = self.undoable("Paste", |c| {
            clipboard::paste(&mut c.pathway, &elements, (offset, offset)).map_err(CanvasError::from)
        })?;
        let pasted_groups: HashSet<GraphId> =
            added.iter().filter_map(|id| self.pathway.get(id)).filter_map(|e| e.group_id.clone()).collect();
        let top: Vec<GraphId> = added
            .iter()
            .filter(|id| {
                self.pathway.get(id).is_some_and(|e| {
                    e.object_type != ObjectType::State && e.group_ref.as_ref().is_none_or(|g| !pasted_groups.contains(g))
                })
            })
            .cloned()
            .collect();
        let mut actions = vec![Action::Inserted(added)];
        actions.extend(self.replace_selection(&top));
        Ok(actions)
    }

    /// Group or ungroup the selection, selecting the new group or nothing.
    ///
    /// # Errors
    ///
    /// Returns model errors raised while editing groups.
    pub fn toggle_group(&mut self) -> Result<Vec<Action>, CanvasError> {
        let ids = self.selected_model_ids();
        let outcome =
            self.undoable("Toggle group", |c| grouping::toggle_group(&mut c.pathway, &ids).map_err(CanvasError::from))?;
        Ok(match outcome {
            GroupToggle::Grouped(group) => self.replace_selection(&[group]),
            GroupToggle::Ungrouped(_) => self.clear_selection(),
            GroupToggle::Unchanged => Vec::new(),
        })
    }

    /// Bring the selection to the front.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if a selected element vanished.
    pub fn bring_to_front(&mut self) -> Result<(), CanvasError> {
        let ids = self.selected_model_ids();
        self.undoable("Bring to front", |c| zorder::bring_to_front(&mut c.pathway, &ids).map_err(CanvasError::from))
    }

    /// Send the selection to the back.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if a selected element vanished.
    pub fn send_to_back(&mut self) -> Result<(), CanvasError> {
        let ids = self.selected_model_ids();
        self.undoable("Send to back", |c| zorder::send_to_back(&mut c.pathway, &ids).map_err(CanvasError::from))
    }

    /// Move each selected element one step up among what it overlaps.
    /// Returns whether anything moved.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if a selected element vanished.
    pub fn move_up(&mut self) -> Result<bool, CanvasError> {
        let ids = self.existing_selection();
        self.undoable("Move up", |c| step_all(&mut c.pathway, &ids, zorder::move_up))
    }

    /// Move each selected element one step down among what it overlaps.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if a selected element vanished.
    pub fn move_down(&mut self) -> Result<bool, CanvasError> {
        let ids = self.existing_selection();
        self.undoable("Move down", |c| step_all(&mut c.pathway, &ids, zorder::move_down))
    }

    fn existing_selection(&self) -> Vec<GraphId> {
        self.selected_model_ids().into_iter().filter(|id| self.pathway.contains(id)).collect()
    }

    /// Align the selection.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if a selected element vanished.
    pub fn align(&mut self, how: AlignType) -> Result<(), CanvasError> {
        let ids = self.selected_model_ids();
        self.undoable("Align", |c| layout::align(&mut c.pathway, &ids, how).map_err(CanvasError::from))
    }

    /// Stack the selection.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if a selected element vanished.
    pub fn stack(&mut self, how: StackType) -> Result<(), CanvasError> {
        let ids = self.selected_model_ids();
        self.undoable("Stack", |c| layout::stack(&mut c.pathway, &ids, how).map_err(CanvasError::from))
    }

    /// Give the selection a common width or height.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if a selected element vanished.
    pub fn set_common_size(&mut self, dim: Dimension) -> Result<(), CanvasError> {
        let ids = self.selected_model_ids();
        self.undoable("Scale", |c| layout::set_common_size(&mut c.pathway, &ids, dim).map_err(CanvasError::from))
    }

    /// Replace the document with `snapshot` and re-mirror it.
    ///
    /// # Errors
    ///
    /// Returns model errors raised while restoring.
    pub fn restore(&mut self, snapshot: Snapshot) -> Result<Vec<Action>, CanvasError> {
        self.gesture = Gesture::Idle;
        self.insertion = None;
        self.pre_drag = None;
        self.drag_undo = DragUndo::NotRecording;
        self.hide_link_anchors();
        let had_selection = self.clear_selection_inner();
        self.pathway.restore(snapshot)?;
        self.ensure_info()?;
        self.process_model_events()?;
        info!(count = self.pathway.len(), "pathway restored");
        Ok(if had_selection { vec![self.selection_changed()] } else { Vec::new() })
    }

    // =============================================================
    // Highlighting
    // =============================================================

    /// Mark an element with a highlight color, independent of selection.
    ///
    /// # Errors
    ///
    /// Returns `NoView` if the element has no scene element.
    pub fn highlight(&mut self, id: &str, color: Color) -> Result<(), CanvasError> {
        let view = self.require_view(id)?;
        self.set_highlight(view, Some(color));
        Ok(())
    }

    /// Remove an element's highlight.
    ///
    /// # Errors
    ///
    /// Returns `NoView` if the element has no scene element.
    pub fn unhighlight(&mut self, id: &str) -> Result<(), CanvasError> {
        let view = self.require_view(id)?;
        self.set_highlight(view, None);
        Ok(())
    }

    /// Highlight every interaction with a free endpoint. Returns how many.
    pub fn highlight_unlinked_endpoints(&mut self, color: Color) -> usize {
        let unlinked: Vec<ViewId> = self
            .pathway
            .elements()
            .filter(|e| e.object_type == ObjectType::Line)
            .filter(|e| [LineEnd::Start, LineEnd::End].iter().any(|end| e.point(*end).is_some_and(|p| !p.is_attached())))
            .filter_map(|e| self.scene.view_of(&e.graph_id))
            .collect();
        for view in &unlinked {
            self.set_highlight(*view, Some(color));
        }
        unlinked.len()
    }

    pub fn reset_highlights(&mut self) {
        let lit: Vec<ViewId> = self.scene.all().filter(|e| e.highlight.is_some()).map(|e| e.id).collect();
        for view in lit {
            self.set_highlight(view, None);
        }
    }

    fn set_highlight(&mut self, view: ViewId, color: Option<Color>) {
        if let Some(el) = self.scene.get_mut(view) {
            el.highlight = color;
        }
        self.mark_view_dirty(view);
        self.flush_dirty();
    }

    // =============================================================
    // Zoom and drawing
    // =============================================================

    #[must_use]
    pub fn zoom_pct(&self) -> f64 {
        self.camera.zoom() * 100.0
    }

    /// Change the zoom. Every cached outline is dropped and the whole canvas
    /// repainted. Returns `false` for a non-positive or non-finite value.
    pub fn set_zoom_pct(&mut self, pct: f64) -> bool {
        if !self.camera.set_zoom(pct / 100.0) {
            warn!(zoom_pct = pct, "invalid zoom ignored");
            return false;
        }
        self.scene.invalidate_all();
        let ids: Vec<ViewId> = self.scene.all().map(|e| e.id).collect();
        for id in ids {
            self.mark_view_dirty(id);
        }
        self.resize_viewport();
        self.flush_dirty();
        info!(zoom_pct = pct, "zoom changed");
        true
    }

    /// Zoom so the whole pathway fits the viewport. Returns the new zoom
    /// percentage, or `None` without a viewport or content.
    pub fn zoom_to_fit(&mut self) -> Option<f64> {
        let visible = self.viewport.as_ref()?.visible_rect();
        let (w, h) = self.pathway.extent();
        if w <= 0.0 || h <= 0.0 {
            return None;
        }
        let pct = (visible.width / w).min(visible.height / h) * 100.0;
        self.set_zoom_pct(pct).then_some(pct)
    }

    /// Scroll the viewport so the element is centered.
    ///
    /// # Errors
    ///
    /// Returns `NoView` if the element has no scene element.
    pub fn scroll_to(&mut self, id: &str) -> Result<(), CanvasError> {
        let view = self.require_view(id)?;
        let zoom = self.camera.zoom();
        let Some(bounds) = self.scene.bounds(view, &self.pathway, zoom) else {
            return Ok(());
        };
        let center = self.camera.point_to_view(bounds.center());
        if let Some(viewport) = self.viewport.as_mut() {
            let visible = viewport.visible_rect();
            let top_left = Point::new((center.x - visible.width / 2.0).max(0.0), (center.y - visible.height / 2.0).max(0.0));
            viewport.scroll_to(top_left);
        }
        Ok(())
    }

    /// Redraw pass. Runs the sync point, then draws content that meets the
    /// clip, shown link anchors, the selection box and handles. A failing
    /// backend call is logged and ends the pass.
    pub fn draw(&mut self, ctx: &mut dyn DrawContext) {
        if let Err(err) = self.process_model_events() {
            warn!(error = %err, "redraw skipped");
            return;
        }
        self.scene.take_dirty_region();
        let zoom = self.camera.zoom();
        let clip = ctx.clip();
        let mut content = Vec::new();
        let mut handles = Vec::new();
        for e in self.scene.live() {
            match e.kind {
                ViewKind::Handle(_) => handles.push(e.id),
                ViewKind::SelectionBox(_) => {}
                _ => {
                    let bounds = self.scene.bounds(e.id, &self.pathway, zoom);
                    if clip.is_none_or(|c| visible_in(bounds, zoom, &c)) {
                        content.push(e.id);
                    }
                }
            }
        }
        if let Err(err) = self.draw_pass(ctx, &content, &handles) {
            warn!(error = %err, "redraw pass aborted");
        }
    }

    fn draw_pass(&self, ctx: &mut dyn DrawContext, content: &[ViewId], handles: &[ViewId]) -> Result<(), DrawError> {
        let zoom = self.camera.zoom();
        for id in content {
            render::draw_element(ctx, &self.scene, *id, &self.pathway, zoom, &self.painters)?;
        }
        for id in &self.link_targets {
            render::draw_link_anchors(ctx, &self.scene, *id, &self.pathway, zoom)?;
        }
        render::draw_element(ctx, &self.scene, self.selection_box, &self.pathway, zoom, &self.painters)?;
        for id in handles {
            render::draw_element(ctx, &self.scene, *id, &self.pathway, zoom, &self.painters)?;
        }
        Ok(())
    }
}

/// Whether model bounds meet a view-space clip.
fn visible_in(bounds: Option<Rect>, zoom: f64, clip: &Rect) -> bool {
    bounds.is_some_and(|b| b.scaled(zoom).expand(FUZZY_TOLERANCE_PX).intersects(clip))
}

fn handle_label(kind: HandleKind) -> &'static str {
    match kind {
        HandleKind::Resize(_) => "Resize",
        HandleKind::Rotate => "Rotate",
        HandleKind::LineEnd(_) => "Move line end",
        HandleKind::Waypoint(_) => "Move waypoint",
        HandleKind::AnchorSlide => "Move anchor",
        HandleKind::SelectionCorner(_) => "Resize selection",
    }
}

fn arrow_delta(key: &Key) -> Option<(f64, f64)> {
    if key.is("ArrowLeft") {
        Some((-1.0, 0.0))
    } else if key.is("ArrowRight") {
        Some((1.0, 0.0))
    } else if key.is("ArrowUp") {
        Some((0.0, -1.0))
    } else if key.is("ArrowDown") {
        Some((0.0, 1.0))
    } else {
        None
    }
}

/// Model keys whose geometry depends on `id`: the element itself, its
/// states, lines attached to it or to its anchors, and enclosing groups,
/// followed transitively.
fn dependents(pathway: &Pathway, id: &str) -> Vec<GraphId> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    let mut queue = vec![id.to_string()];
    while let Some(key) = queue.pop() {
        if !seen.insert(key.clone()) {
            continue;
        }
        let mut targets = vec![key.clone()];
        if let Some(e) = pathway.get(&key) {
            targets.extend(e.anchors.iter().map(|a| a.id.clone()));
            queue.extend(pathway.states_of(&key));
            queue.extend(
                layout::ancestor_groups(pathway, &key)
                    .iter()
                    .filter_map(|g| pathway.group(g))
                    .map(|g| g.graph_id.clone()),
            );
        }
        for t in &targets {
            queue.extend(pathway.referrers(t).into_iter().map(|r| r.line));
        }
        queue.extend(targets.into_iter().skip(1));
        out.push(key);
    }
    out
}

/// Ids removed when deleting `ids`: groups bring their members, the info
/// box is kept. Anchor ids are kept as is.
fn deletable(pathway: &Pathway, ids: &[GraphId]) -> Vec<GraphId> {
    let mut out: Vec<GraphId> = Vec::new();
    for id in ids {
        match pathway.get(id) {
            Some(e) if e.object_type == ObjectType::Info => {}
            Some(e) => {
                out.push(id.clone());
                if let Some(gid) = &e.group_id {
                    out.extend(pathway.group_members_deep(gid));
                }
            }
            None if pathway.anchor_line(id).is_some() => out.push(id.clone()),
            None => {}
        }
    }
    let mut seen = HashSet::new();
    out.retain(|id| seen.insert(id.clone()));
    out
}

fn remove_all(pathway: &mut Pathway, ids: &[GraphId]) -> Result<(), ModelError> {
    for id in ids {
        if pathway.contains(id) {
            pathway.remove(id)?;
        } else if let Some(line) = pathway.anchor_line(id).map(|l| l.graph_id.clone()) {
            for r in pathway.referrers(id) {
                pathway.unlink_point(&r.line, r.end)?;
            }
            pathway.update(&line, |l| l.anchors.retain(|a| a.id != *id))?;
        }
    }
    Ok(())
}

fn step_all(
    pathway: &mut Pathway,
    ids: &[GraphId],
    step: fn(&mut Pathway, &str) -> Result<bool, ModelError>,
) -> Result<bool, CanvasError> {
    let mut moved = false;
    for id in ids {
        moved |= step(pathway, id)?;
    }
    Ok(moved)
}
