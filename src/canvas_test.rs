#![allow(clippy::float_cmp)]

use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::group_painter::PainterRegistry;
use crate::model::{GroupStyle, LineAnchor};
use crate::render::RecordingContext;
use crate::template::ShapeTemplate;
use crate::undo::UndoHistory;
use crate::viewport::RecordingViewport;

fn node(id: &str, x: f64, y: f64) -> PathwayElement {
    PathwayElement::new(ObjectType::DataNode).with_id(id).at(x, y)
}

fn canvas_with(elements: Vec<PathwayElement>) -> Canvas {
    let mut p = Pathway::with_seed(5);
    for e in elements {
        p.add(e).unwrap();
    }
    Canvas::new(p, CanvasConfig::default()).unwrap()
}

fn two_nodes() -> Canvas {
    canvas_with(vec![node("a", 100.0, 200.0), node("b", 220.0, 200.0)])
}

fn view(c: &Canvas, id: &str) -> ViewId {
    c.scene().view_of(id).unwrap()
}

fn at(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn press(c: &mut Canvas, x: f64, y: f64, m: Modifiers) -> Vec<Action> {
    c.on_pointer_down(at(x, y), Button::Primary, m).unwrap()
}

fn release(c: &mut Canvas, x: f64, y: f64) -> Vec<Action> {
    c.on_pointer_up(at(x, y), Button::Primary, Modifiers::NONE).unwrap()
}

fn click(c: &mut Canvas, x: f64, y: f64, m: Modifiers) -> Vec<Action> {
    let mut actions = press(c, x, y, m);
    actions.extend(release(c, x, y));
    actions
}

fn drag(c: &mut Canvas, from: (f64, f64), to: (f64, f64)) {
    press(c, from.0, from.1, Modifiers::NONE);
    c.on_pointer_move(at(to.0, to.1), Modifiers::NONE).unwrap();
    release(c, to.0, to.1);
}

fn key(c: &mut Canvas, name: &str, m: Modifiers) -> Vec<Action> {
    c.on_key_down(Key::new(name), m).unwrap()
}

fn with_history(c: Canvas) -> (Canvas, Rc<RefCell<UndoHistory>>) {
    let history = Rc::new(RefCell::new(UndoHistory::new()));
    (c.with_undo_sink(Box::new(Rc::clone(&history))), history)
}

fn center_of(c: &Canvas, id: &str) -> Point {
    c.pathway().get(id).unwrap().center()
}

// =============================================================
// Mirroring
// =============================================================

#[test]
fn every_element_is_mirrored_and_info_added() {
    let c = canvas_with(vec![
        node("a", 100.0, 200.0),
        PathwayElement::line(at(0.0, 300.0), at(50.0, 300.0)).with_id("l"),
        PathwayElement::new(ObjectType::Biopax).with_id("bp"),
    ]);
    assert!(c.scene().view_of("a").is_some());
    assert!(c.scene().view_of("l").is_some());
    assert!(c.scene().view_of("bp").is_none());
    let info = c.pathway().info().unwrap().graph_id.clone();
    assert!(c.scene().view_of(&info).is_some());
}

#[test]
fn added_element_gets_exactly_one_view() {
    let mut c = two_nodes();
    c.pathway_mut().add(node("c", 400.0, 200.0)).unwrap();
    c.process_model_events().unwrap();
    c.process_model_events().unwrap();
    let count = c.scene().live().filter(|e| e.kind.model_key() == Some("c")).count();
    assert_eq!(count, 1);
}

#[test]
fn removed_element_loses_its_view() {
    let mut c = two_nodes();
    c.pathway_mut().remove("a").unwrap();
    c.process_model_events().unwrap();
    assert!(c.scene().view_of("a").is_none());
    assert!(c.scene().live().all(|e| e.kind.model_key() != Some("a")));
}

#[test]
fn citation_marker_follows_citation_refs() {
    let mut c = two_nodes();
    let owner = view(&c, "a");
    let markers = |c: &Canvas| {
        c.scene()
            .get(owner)
            .unwrap()
            .children
            .iter()
            .filter(|v| matches!(c.scene().get(**v).map(|e| &e.kind), Some(ViewKind::Citation(_))))
            .count()
    };
    c.pathway_mut().update("a", |e| e.citation_refs.push("c1".into())).unwrap();
    c.process_model_events().unwrap();
    assert_eq!(markers(&c), 1);

    c.pathway_mut().update("a", |e| e.citation_refs.clear()).unwrap();
    c.process_model_events().unwrap();
    assert_eq!(markers(&c), 0);
}

#[test]
fn group_style_defaults_are_written_back() {
    let mut g = PathwayElement::new(ObjectType::Group).with_id("g");
    g.group_id = Some("gid".into());
    g.group_style = GroupStyle::Complex;
    let c = canvas_with(vec![g]);
    let defaults = PainterRegistry::default().get(GroupStyle::Complex.name()).defaults();
    assert!(has_defaults(c.pathway().get("g").unwrap(), &defaults));
}

#[test]
fn line_anchors_get_child_views() {
    let mut c = canvas_with(vec![PathwayElement::line(at(0.0, 300.0), at(100.0, 300.0)).with_id("l")]);
    let anchor = crate::anchor::place_anchor(c.pathway_mut(), "l", 0.5).unwrap();
    c.process_model_events().unwrap();
    let v = view(&c, &anchor);
    assert!(c.scene().get(view(&c, "l")).unwrap().children.contains(&v));
}

// =============================================================
// Hit-testing
// =============================================================

#[test]
fn hit_test_follows_zoom() {
    let shape = PathwayElement::new(ObjectType::Shape).with_id("s").at(125.0, 125.0).sized(50.0, 50.0);
    let mut c = canvas_with(vec![shape]);
    let s = view(&c, "s");

    assert!(c.set_zoom_pct(200.0));
    assert_eq!(c.object_at(at(300.0, 300.0)), Some(s));
    assert_eq!(c.object_at(at(400.0, 400.0)), None);

    assert!(c.set_zoom_pct(50.0));
    assert_eq!(c.object_at(at(75.0, 75.0)), Some(s));
}

#[test]
fn near_miss_hits_within_tolerance() {
    let shape = PathwayElement::new(ObjectType::Shape).with_id("s").at(125.0, 125.0).sized(50.0, 50.0);
    let c = canvas_with(vec![shape]);
    assert_eq!(c.object_at(at(152.0, 125.0)), Some(view(&c, "s")));
    assert_eq!(c.object_at(at(160.0, 125.0)), None);
}

#[test]
fn invalid_zoom_is_rejected() {
    let mut c = two_nodes();
    assert!(!c.set_zoom_pct(0.0));
    assert!(!c.set_zoom_pct(f64::NAN));
    assert_eq!(c.zoom_pct(), 100.0);
}

// =============================================================
// Selection
// =============================================================

#[test]
fn click_selects_and_shows_handles() {
    let mut c = two_nodes();
    let actions = click(&mut c, 100.0, 200.0, Modifiers::NONE);
    assert!(actions.contains(&Action::SelectionChanged(vec!["a".to_string()])));
    assert_eq!(c.scene().get(view(&c, "a")).unwrap().handles.len(), 8);
}

#[test]
fn modifier_click_toggles_and_multi_selection_uses_box_handles() {
    let mut c = two_nodes();
    click(&mut c, 100.0, 200.0, Modifiers::NONE);
    click(&mut c, 220.0, 200.0, Modifiers::SHIFT);
    assert_eq!(c.selected_model_ids(), vec!["a".to_string(), "b".to_string()]);
    assert!(c.scene().get(view(&c, "a")).unwrap().handles.is_empty());
    assert_eq!(c.scene().get(c.selection_box_id()).unwrap().handles.len(), 4);

    click(&mut c, 220.0, 200.0, Modifiers::SHIFT);
    assert_eq!(c.selected_model_ids(), vec!["a".to_string()]);
    assert_eq!(c.scene().get(view(&c, "a")).unwrap().handles.len(), 8);
}

#[test]
fn click_on_empty_canvas_clears_selection() {
    let mut c = two_nodes();
    click(&mut c, 100.0, 200.0, Modifiers::NONE);
    let actions = click(&mut c, 600.0, 600.0, Modifiers::NONE);
    assert!(actions.contains(&Action::SelectionChanged(Vec::new())));
    assert!(c.selection().is_empty());
}

#[test]
fn rubber_band_selects_what_it_touches() {
    let mut c = canvas_with(vec![node("a", 100.0, 200.0), node("b", 220.0, 200.0), node("c", 500.0, 200.0)]);
    drag(&mut c, (50.0, 150.0), (260.0, 260.0));
    let mut ids = c.selected_model_ids();
    ids.sort();
    assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
    assert!(c.gesture().is_idle());
}

#[test]
fn select_ids_rejects_unmirrored() {
    let mut c = two_nodes();
    let err = c.select_ids(&["nope".to_string()]).unwrap_err();
    assert!(matches!(err, CanvasError::NoView(id) if id == "nope"));
    assert!(c.selection().is_empty());
}

#[test]
fn plain_click_on_member_selects_its_group() {
    let mut c = two_nodes();
    key(&mut c, "a", Modifiers::CTRL);
    key(&mut c, "g", Modifiers::CTRL);
    let group = c.selected_model_ids();
    assert_eq!(group.len(), 1);
    c.clear_selection();

    click(&mut c, 100.0, 200.0, Modifiers::NONE);
    assert_eq!(c.selected_model_ids(), group);

    click(&mut c, 600.0, 600.0, Modifiers::NONE);
    click(&mut c, 100.0, 200.0, Modifiers::SHIFT);
    assert_eq!(c.selected_model_ids(), vec!["a".to_string()]);
}

#[test]
fn plain_click_on_nested_member_selects_outermost_group() {
    let mut outer = PathwayElement::new(ObjectType::Group).with_id("outer");
    outer.group_id = Some("outer-gid".into());
    let mut inner = PathwayElement::new(ObjectType::Group).with_id("inner");
    inner.group_id = Some("inner-gid".into());
    inner.group_ref = Some("outer-gid".into());
    let mut a = node("a", 100.0, 200.0);
    a.group_ref = Some("inner-gid".into());
    let mut c = canvas_with(vec![outer, inner, a]);
    click(&mut c, 100.0, 200.0, Modifiers::NONE);
    assert_eq!(c.selected_model_ids(), vec!["outer".to_string()]);
}

#[test]
fn press_on_unselected_element_inside_box_selects_it() {
    let mut c = canvas_with(vec![node("a", 100.0, 200.0), node("b", 220.0, 200.0), node("c", 340.0, 200.0)]);
    c.select_ids(&["a".to_string(), "c".to_string()]).unwrap();
    drag(&mut c, (220.0, 200.0), (220.0, 260.0));
    assert_eq!(c.selected_model_ids(), vec!["b".to_string()]);
    assert_eq!(center_of(&c, "b"), at(220.0, 260.0));
    assert_eq!(center_of(&c, "a"), at(100.0, 200.0));
    assert_eq!(center_of(&c, "c"), at(340.0, 200.0));
}

#[test]
fn press_on_selected_member_inside_box_moves_selection() {
    let mut c = canvas_with(vec![node("a", 100.0, 200.0), node("b", 220.0, 200.0), node("c", 340.0, 200.0)]);
    c.select_ids(&["a".to_string(), "c".to_string()]).unwrap();
    drag(&mut c, (100.0, 200.0), (100.0, 260.0));
    assert_eq!(c.selected_model_ids(), vec!["a".to_string(), "c".to_string()]);
    assert_eq!(center_of(&c, "a"), at(100.0, 260.0));
    assert_eq!(center_of(&c, "c"), at(340.0, 260.0));
    assert_eq!(center_of(&c, "b"), at(220.0, 200.0));
}

#[test]
fn press_on_empty_space_inside_box_moves_selection() {
    let mut c = canvas_with(vec![node("a", 100.0, 200.0), node("c", 340.0, 200.0)]);
    c.select_ids(&["a".to_string(), "c".to_string()]).unwrap();
    drag(&mut c, (220.0, 200.0), (220.0, 230.0));
    assert_eq!(c.selected_model_ids(), vec!["a".to_string(), "c".to_string()]);
    assert_eq!(center_of(&c, "a"), at(100.0, 230.0));
    assert_eq!(center_of(&c, "c"), at(340.0, 230.0));
}

// =============================================================
// Dragging
// =============================================================

#[test]
fn drag_moves_selection_as_one_undo_action() {
    let (mut c, history) = with_history(two_nodes());
    drag(&mut c, (100.0, 200.0), (130.0, 210.0));
    assert_eq!(center_of(&c, "a"), at(130.0, 210.0));
    assert_eq!(center_of(&c, "b"), at(220.0, 200.0));
    assert_eq!(history.borrow().labels(), vec!["Move"]);
    assert_eq!(c.drag_undo(), DragUndo::NotRecording);
}

#[test]
fn click_without_travel_records_nothing() {
    let (mut c, history) = with_history(two_nodes());
    click(&mut c, 100.0, 200.0, Modifiers::NONE);
    c.on_pointer_down(at(100.0, 200.0), Button::Primary, Modifiers::NONE).unwrap();
    c.on_pointer_move(at(101.0, 201.0), Modifiers::NONE).unwrap();
    release(&mut c, 101.0, 201.0);
    assert_eq!(center_of(&c, "a"), at(100.0, 200.0));
    assert!(history.borrow().is_empty());
}

#[test]
fn line_end_links_to_anchor_then_detaches() {
    let mut c = canvas_with(vec![
        node("a", 300.0, 200.0),
        PathwayElement::line(at(100.0, 300.0), at(150.0, 300.0)).with_id("l"),
    ]);
    click(&mut c, 125.0, 300.0, Modifiers::NONE);
    assert_eq!(c.selected_model_ids(), vec!["l".to_string()]);

    press(&mut c, 150.0, 300.0, Modifiers::NONE);
    let actions = c.on_pointer_move(at(255.0, 200.0), Modifiers::NONE).unwrap();
    assert!(actions.contains(&Action::SetCursor(Cursor::Link)));
    let end = c.pathway().get("l").unwrap().point(LineEnd::End).unwrap().clone();
    assert_eq!(end.graph_ref.as_deref(), Some("a"));
    assert_eq!((end.rel_x, end.rel_y), (-1.0, 0.0));
    assert_eq!(c.pathway().referrers("a").len(), 1);

    c.on_pointer_move(at(400.0, 400.0), Modifiers::NONE).unwrap();
    let end = c.pathway().get("l").unwrap().point(LineEnd::End).unwrap().clone();
    assert!(!end.is_attached());
    assert_eq!((end.x, end.y), (400.0, 400.0));

    release(&mut c, 400.0, 400.0);
    let a = c.scene().get(view(&c, "a")).unwrap();
    assert!(!a.link_anchors.as_ref().unwrap().is_shown());
}

#[test]
fn line_end_never_links_to_its_own_anchor() {
    let mut l = PathwayElement::line(at(100.0, 300.0), at(300.0, 300.0)).with_id("l");
    l.anchors.push(LineAnchor { id: "la".into(), position: 0.0 });
    let mut c = canvas_with(vec![l]);
    c.select_ids(&["l".to_string()]).unwrap();

    press(&mut c, 300.0, 300.0, Modifiers::NONE);
    c.on_pointer_move(at(100.0, 302.0), Modifiers::NONE).unwrap();
    let end = c.pathway().get("l").unwrap().point(LineEnd::End).unwrap().clone();
    assert_eq!(end.graph_ref, None);
    assert_eq!((end.x, end.y), (100.0, 302.0));
    release(&mut c, 100.0, 302.0);
    assert!(c.pathway().referrers("la").is_empty());
}

#[test]
fn grouped_line_never_links_to_its_own_group() {
    let mut g = PathwayElement::new(ObjectType::Group).with_id("g");
    g.group_id = Some("gid".into());
    let mut n = node("n", 300.0, 200.0);
    n.group_ref = Some("gid".into());
    let mut l = PathwayElement::line(at(250.0, 200.0), at(200.0, 200.0)).with_id("l");
    l.group_ref = Some("gid".into());
    let mut c = canvas_with(vec![g, n, l]);
    // At 50% the anchor tolerance (10 model units) reaches past the group margin (8).
    assert!(c.set_zoom_pct(50.0));
    c.select_ids(&["l".to_string()]).unwrap();

    press(&mut c, 100.0, 100.0, Modifiers::NONE);
    c.on_pointer_move(at(75.0, 100.0), Modifiers::NONE).unwrap();
    let end = c.pathway().get("l").unwrap().point(LineEnd::End).unwrap().clone();
    assert_eq!((end.x, end.y), (150.0, 200.0));
    assert_eq!(end.graph_ref, None);
    release(&mut c, 75.0, 100.0);
    assert!(c.pathway().referrers("g").is_empty());
}

// =============================================================
// Templates
// =============================================================

#[test]
fn template_click_inserts_at_default_size() {
    let (mut c, history) = with_history(two_nodes());
    c.set_template(Box::new(ShapeTemplate::data_node("Gene")));
    let actions = click(&mut c, 400.0, 400.0, Modifiers::NONE);
    let Some(Action::Inserted(ids)) = actions.first() else {
        panic!("expected an insertion, got {actions:?}");
    };
    let e = c.pathway().get(&ids[0]).unwrap();
    assert_eq!((e.width, e.height), (90.0, 25.0));
    assert_eq!(e.center(), at(444.5, 412.0));
    assert_eq!(c.selected_model_ids(), ids.clone());
    assert!(!c.has_template());
    assert!(history.borrow().last_label().is_some_and(|l| l.starts_with("Insert")));
}

#[test]
fn template_drag_sizes_by_pointer() {
    let mut c = two_nodes();
    c.set_template(Box::new(ShapeTemplate::data_node("Gene")));
    let actions = press(&mut c, 400.0, 400.0, Modifiers::NONE);
    let Some(Action::Inserted(ids)) = actions.first() else {
        panic!("expected an insertion");
    };
    let id = ids[0].clone();
    c.on_pointer_move(at(500.0, 450.0), Modifiers::NONE).unwrap();
    release(&mut c, 500.0, 450.0);
    let e = c.pathway().get(&id).unwrap();
    assert_eq!((e.width, e.height), (100.5, 50.5));
}

// =============================================================
// Keyboard and commands
// =============================================================

#[test]
fn delete_key_removes_selection_and_frees_lines() {
    let mut p = Pathway::with_seed(5);
    p.add(node("a", 100.0, 200.0)).unwrap();
    p.add(PathwayElement::line(at(300.0, 300.0), at(0.0, 0.0)).with_id("l")).unwrap();
    p.link_point("l", LineEnd::End, "a", -1.0, 0.0).unwrap();
    let mut c = Canvas::new(p, CanvasConfig::default()).unwrap();

    c.select_ids(&["a".to_string()]).unwrap();
    let actions = key(&mut c, "Delete", Modifiers::NONE);
    assert!(actions.contains(&Action::SelectionChanged(Vec::new())));
    assert!(!c.pathway().contains("a"));
    assert!(c.scene().view_of("a").is_none());
    let end = c.pathway().get("l").unwrap().point(LineEnd::End).unwrap().clone();
    assert!(!end.is_attached());
    assert_eq!((end.x, end.y), (55.0, 200.0));
}

#[test]
fn info_box_survives_delete() {
    let mut c = two_nodes();
    let info = c.pathway().info().unwrap().graph_id.clone();
    c.select_ids(&[info.clone()]).unwrap();
    key(&mut c, "Backspace", Modifiers::NONE);
    assert!(c.pathway().contains(&info));
}

#[test]
fn deleting_a_group_deletes_its_members() {
    let mut g = PathwayElement::new(ObjectType::Group).with_id("g");
    g.group_id = Some("gid".into());
    let mut a = node("a", 100.0, 200.0);
    a.group_ref = Some("gid".into());
    let mut c = canvas_with(vec![g, a, node("b", 400.0, 200.0)]);
    c.select_ids(&["g".to_string()]).unwrap();
    c.delete_selection().unwrap();
    assert!(!c.pathway().contains("g"));
    assert!(!c.pathway().contains("a"));
    assert!(c.pathway().contains("b"));
}

#[test]
fn arrow_keys_nudge_selection() {
    let (mut c, history) = with_history(two_nodes());
    c.select_ids(&["a".to_string()]).unwrap();
    key(&mut c, "ArrowRight", Modifiers::NONE);
    key(&mut c, "ArrowDown", Modifiers::SHIFT);
    assert_eq!(center_of(&c, "a"), at(101.0, 210.0));
    assert_eq!(history.borrow().labels(), vec!["Move", "Move"]);
}

#[test]
fn select_all_then_group() {
    let mut c = two_nodes();
    key(&mut c, "a", Modifiers::CTRL);
    assert_eq!(c.selection().len(), 2);
    key(&mut c, "g", Modifiers::CTRL);
    let selected = c.selected_model_ids();
    assert_eq!(selected.len(), 1);
    let group = c.pathway().get(&selected[0]).unwrap();
    assert_eq!(group.object_type, ObjectType::Group);
    let gid = group.group_id.clone().unwrap();
    assert_eq!(c.pathway().group_members(&gid).len(), 2);
}

#[test]
fn repeated_paste_steps_further() {
    let mut c = two_nodes();
    c.select_ids(&["a".to_string()]).unwrap();
    key(&mut c, "c", Modifiers::CTRL);
    key(&mut c, "v", Modifiers::CTRL);
    let first = c.selected_model_ids();
    assert_eq!(first.len(), 1);
    assert_ne!(first[0], "a");
    assert_eq!(center_of(&c, &first[0]), at(110.0, 210.0));

    key(&mut c, "v", Modifiers::CTRL);
    let second = c.selected_model_ids();
    assert_eq!(center_of(&c, &second[0]), at(120.0, 220.0));
}

#[test]
fn cut_removes_and_paste_restores_a_copy() {
    let mut c = two_nodes();
    c.select_ids(&["a".to_string()]).unwrap();
    key(&mut c, "x", Modifiers::CTRL);
    assert!(!c.pathway().contains("a"));
    let actions = key(&mut c, "v", Modifiers::CTRL);
    assert!(matches!(actions.first(), Some(Action::Inserted(ids)) if ids.len() == 1));
}

#[test]
fn bring_to_front_raises_selection() {
    let mut c = two_nodes();
    c.select_ids(&["a".to_string()]).unwrap();
    c.bring_to_front().unwrap();
    let za = c.pathway().get("a").unwrap().z_order;
    let zb = c.pathway().get("b").unwrap().z_order;
    assert!(za > zb);
}

// =============================================================
// Hover and double-click
// =============================================================

#[test]
fn hover_reports_enter_and_exit() {
    let mut c = two_nodes();
    let actions = c.on_pointer_move(at(100.0, 200.0), Modifiers::NONE).unwrap();
    assert!(actions.contains(&Action::Hover { entered: vec!["a".to_string()], exited: Vec::new() }));
    assert!(actions.contains(&Action::SetCursor(Cursor::Move)));
    assert!(c.scene().get(view(&c, "a")).unwrap().mouse_over);

    let actions = c.on_pointer_move(at(600.0, 600.0), Modifiers::NONE).unwrap();
    assert!(actions.contains(&Action::Hover { entered: Vec::new(), exited: vec!["a".to_string()] }));
    assert!(actions.contains(&Action::SetCursor(Cursor::Default)));
}

#[test]
fn double_click_requests_editing() {
    let mut c = two_nodes();
    let actions = c.on_double_click(at(100.0, 200.0)).unwrap();
    assert_eq!(actions, vec![Action::EditPropertiesRequested("a".to_string())]);
    assert!(c.on_double_click(at(600.0, 600.0)).unwrap().is_empty());
}

// =============================================================
// Drawing, viewport and highlights
// =============================================================

#[test]
fn draw_skips_content_outside_clip() {
    let mut c = canvas_with(vec![
        node("a", 100.0, 200.0).with_label("Alpha"),
        node("b", 900.0, 900.0).with_label("Beta"),
    ]);
    let mut ctx = RecordingContext::with_clip(Rect::new(50.0, 150.0, 200.0, 100.0));
    c.draw(&mut ctx);
    let texts = ctx.texts();
    assert!(texts.contains(&"Alpha"));
    assert!(!texts.contains(&"Beta"));
}

#[test]
fn failing_backend_does_not_panic() {
    let mut full = RecordingContext::new();
    two_nodes().draw(&mut full);

    let mut c = two_nodes();
    let mut ctx = RecordingContext { fail_after: Some(1), ..RecordingContext::new() };
    c.draw(&mut ctx);
    assert!(!ctx.commands.is_empty());
    assert!(ctx.commands.len() < full.commands.len());
}

#[test]
fn viewport_tracks_zoom_and_edits() {
    let vp = RecordingViewport::shared(800.0, 600.0);
    let mut c = two_nodes().with_viewport(Box::new(Rc::clone(&vp)));
    let (w, h) = c.pathway().extent();
    assert!(c.set_zoom_pct(200.0));
    assert_eq!(vp.borrow().size, (w * 2.0, h * 2.0));

    vp.borrow_mut().invalidated.clear();
    c.pathway_mut().update("a", |e| e.center_x += 50.0).unwrap();
    c.process_model_events().unwrap();
    assert!(!vp.borrow().invalidated.is_empty());
}

#[test]
fn zoom_to_fit_uses_visible_rect() {
    let vp = RecordingViewport::shared(800.0, 600.0);
    let mut c = two_nodes().with_viewport(Box::new(Rc::clone(&vp)));
    let (w, h) = c.pathway().extent();
    let pct = c.zoom_to_fit().unwrap();
    assert_eq!(pct, (800.0 / w).min(600.0 / h) * 100.0);
    assert!((c.zoom_pct() - pct).abs() < 1e-9);
}

#[test]
fn highlights_are_independent_of_selection() {
    let mut c = canvas_with(vec![
        node("a", 100.0, 200.0),
        PathwayElement::line(at(300.0, 300.0), at(350.0, 300.0)).with_id("l"),
    ]);
    assert!(matches!(c.highlight("missing", Color::RED), Err(CanvasError::NoView(_))));
    assert_eq!(c.highlight_unlinked_endpoints(Color::RED), 1);
    assert_eq!(c.scene().get(view(&c, "l")).unwrap().highlight, Some(Color::RED));
    assert!(c.selection().is_empty());

    c.reset_highlights();
    assert!(c.scene().all().all(|e| e.highlight.is_none()));
}

#[test]
fn restore_brings_back_deleted_elements() {
    let mut c = two_nodes();
    let before = c.pathway().snapshot();
    c.select_ids(&["a".to_string()]).unwrap();
    c.delete_selection().unwrap();
    assert!(c.scene().view_of("a").is_none());

    c.restore(before).unwrap();
    assert!(c.scene().view_of("a").is_some());
    assert!(c.selection().is_empty());
    assert_eq!(center_of(&c, "a"), at(100.0, 200.0));
}
