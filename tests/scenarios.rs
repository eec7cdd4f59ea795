//! End-to-end scenarios through the public API.
#![allow(clippy::float_cmp)]

use std::collections::HashSet;

use pathview::camera::Point;
use pathview::canvas::Canvas;
use pathview::config::CanvasConfig;
use pathview::element::ViewKind;
use pathview::frame::{element_bounds, group_bounds};
use pathview::geom::{Rect, union_all};
use pathview::handle::{HandleKind, ResizeAnchor};
use pathview::input::{Button, DragTarget, Gesture, Key, Modifiers};
use pathview::model::{GraphId, LineEnd, ObjectType, Pathway, PathwayElement};
use pathview::{clipboard, zorder};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// =============================================================
// Helpers
// =============================================================

fn node(id: &str, x: f64, y: f64) -> PathwayElement {
    PathwayElement::new(ObjectType::DataNode).with_id(id).at(x, y)
}

fn shape(id: &str, x: f64, y: f64, size: f64) -> PathwayElement {
    PathwayElement::new(ObjectType::Shape).with_id(id).at(x, y).sized(size, size)
}

fn canvas(p: Pathway) -> Canvas {
    Canvas::new(p, CanvasConfig::default()).unwrap()
}

fn ids(list: &[&str]) -> Vec<GraphId> {
    list.iter().map(|s| (*s).to_string()).collect()
}

/// Model ids mirrored by top-level views.
fn mirrored(c: &Canvas) -> HashSet<String> {
    c.scene()
        .live()
        .filter(|e| matches!(e.kind, ViewKind::Shaped(_) | ViewKind::Group(_) | ViewKind::Line(_) | ViewKind::Info(_)))
        .filter_map(|e| e.kind.model_key().map(str::to_string))
        .collect()
}

fn viewable(p: &Pathway) -> HashSet<String> {
    p.elements().filter(|e| e.object_type != ObjectType::Biopax).map(|e| e.graph_id.clone()).collect()
}

fn members_box(p: &Pathway, members: &[&str]) -> Rect {
    union_all(members.iter().filter_map(|m| p.get(m)).filter_map(|m| element_bounds(p, m))).unwrap()
}

// =============================================================
// Mirroring
// =============================================================

#[test]
fn scene_mirrors_model_after_random_edits() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut c = canvas(Pathway::with_seed(42));
    for step in 0..200 {
        let existing: Vec<GraphId> = c
            .pathway()
            .elements()
            .filter(|e| e.object_type != ObjectType::Info)
            .map(|e| e.graph_id.clone())
            .collect();
        if existing.is_empty() || rng.random_bool(0.6) {
            let x = rng.random_range(0.0..800.0);
            let y = rng.random_range(100.0..600.0);
            let e = if rng.random_bool(0.3) {
                PathwayElement::line(Point::new(x, y), Point::new(x + 40.0, y))
            } else {
                PathwayElement::new(ObjectType::DataNode).at(x, y)
            };
            c.pathway_mut().add(e).unwrap();
        } else {
            let victim = &existing[rng.random_range(0..existing.len())];
            c.pathway_mut().remove(victim).unwrap();
        }
        c.process_model_events().unwrap();
        assert_eq!(mirrored(&c), viewable(c.pathway()), "diverged at step {step}");
    }
}

// =============================================================
// Z-order
// =============================================================

#[test]
fn renumbering_spaces_z_values() {
    let mut p = Pathway::with_seed(1);
    let layout = [("a", 0.0, 0), ("b", 100.0, 0), ("c", 200.0, 1), ("d", 300.0, 5), ("e", 400.0, 6), ("f", 500.0, 6)];
    for (id, x, z) in layout {
        p.add(shape(id, x + 50.0, 100.0, 20.0).with_z(z)).unwrap();
    }
    zorder::auto_renumber(&mut p).unwrap();
    let mut zs: Vec<i64> = p.elements().map(|e| e.z_order).collect();
    zs.sort_unstable();
    assert!(zs.windows(2).all(|w| w[1] - w[0] >= 2), "{zs:?}");
}

#[test]
fn moving_topmost_up_is_a_no_op() {
    let mut p = Pathway::with_seed(1);
    p.add(shape("low", 100.0, 100.0, 40.0).with_z(0)).unwrap();
    p.add(shape("high", 110.0, 110.0, 40.0).with_z(10)).unwrap();
    assert!(!zorder::move_up(&mut p, "high").unwrap());
    assert!(p.get("high").unwrap().z_order > p.get("low").unwrap().z_order);
}

// =============================================================
// Handles
// =============================================================

#[test]
fn dragging_corner_through_opposite_flips_handle() {
    let mut p = Pathway::with_seed(1);
    p.add(shape("s", 200.0, 200.0, 40.0)).unwrap();
    let mut c = canvas(p);
    c.select_ids(&ids(&["s"])).unwrap();

    c.on_pointer_down(Point::new(220.0, 220.0), Button::Primary, Modifiers::NONE).unwrap();
    c.on_pointer_move(Point::new(170.0, 170.0), Modifiers::NONE).unwrap();
    let s = c.pathway().get("s").unwrap();
    assert_eq!((s.width, s.height), (10.0, 10.0));
    assert_eq!(s.center(), Point::new(175.0, 175.0));
    let Gesture::Dragging { target: DragTarget::Handle { kind, .. }, .. } = c.gesture() else {
        panic!("expected a handle drag, got {:?}", c.gesture());
    };
    assert_eq!(*kind, HandleKind::Resize(ResizeAnchor::Nw));

    c.on_pointer_move(Point::new(160.0, 160.0), Modifiers::NONE).unwrap();
    let s = c.pathway().get("s").unwrap();
    assert_eq!((s.width, s.height), (20.0, 20.0));
    c.on_pointer_up(Point::new(160.0, 160.0), Button::Primary, Modifiers::NONE).unwrap();
}

// =============================================================
// Clipboard
// =============================================================

#[test]
fn paste_remaps_every_id_and_reference() {
    let mut p = Pathway::with_seed(9);
    let mut g = PathwayElement::new(ObjectType::Group).with_id("g");
    g.group_id = Some("gid".into());
    p.add(g).unwrap();
    for (id, x) in [("a", 100.0), ("b", 300.0)] {
        let mut n = node(id, x, 200.0);
        n.group_ref = Some("gid".into());
        p.add(n).unwrap();
    }
    p.add(node("outside", 600.0, 200.0)).unwrap();
    p.add(PathwayElement::line(Point::default(), Point::default()).with_id("inner")).unwrap();
    p.link_point("inner", LineEnd::Start, "a", 1.0, 0.0).unwrap();
    p.link_point("inner", LineEnd::End, "b", -1.0, 0.0).unwrap();
    p.add(PathwayElement::line(Point::default(), Point::default()).with_id("outer")).unwrap();
    p.link_point("outer", LineEnd::Start, "b", 1.0, 0.0).unwrap();
    p.link_point("outer", LineEnd::End, "outside", -1.0, 0.0).unwrap();

    let before: HashSet<GraphId> = p.elements().map(|e| e.graph_id.clone()).collect();
    let batch = clipboard::collect(&p, &ids(&["g", "inner", "outer"]));
    let n = batch.len();
    let added = clipboard::paste(&mut p, &batch, (10.0, 10.0)).unwrap();

    assert_eq!(added.len(), n);
    let fresh: HashSet<&GraphId> = added.iter().collect();
    assert_eq!(fresh.len(), n);
    assert!(added.iter().all(|id| !before.contains(id)));

    let new_group = added.iter().filter_map(|id| p.get(id)).find(|e| e.object_type == ObjectType::Group).unwrap();
    let new_gid = new_group.group_id.clone().unwrap();
    assert_ne!(new_gid, "gid");
    let new_members = p.group_members(&new_gid);
    assert_eq!(new_members.len(), 2);

    let lines: Vec<&PathwayElement> =
        added.iter().filter_map(|id| p.get(id)).filter(|e| e.object_type == ObjectType::Line).collect();
    assert_eq!(lines.len(), 2);
    for line in lines {
        for end in [LineEnd::Start, LineEnd::End] {
            let point = line.point(end).unwrap();
            match &point.graph_ref {
                Some(target) => assert!(new_members.contains(target), "{target} is not a pasted member"),
                None => assert!(!point.is_attached()),
            }
        }
    }
    assert_eq!(p.referrers("outside").len(), 1);
}

// =============================================================
// Groups
// =============================================================

#[test]
fn group_bounds_follow_members() {
    let mut p = Pathway::with_seed(4);
    let mut g = PathwayElement::new(ObjectType::Group).with_id("g");
    g.group_id = Some("gid".into());
    p.add(g).unwrap();
    for (id, x) in [("a", 100.0), ("b", 300.0)] {
        let mut n = node(id, x, 200.0);
        n.group_ref = Some("gid".into());
        p.add(n).unwrap();
    }
    let mut c = canvas(p);
    let margin = c.pathway().get("g").unwrap().group_style.margin();
    let expected = members_box(c.pathway(), &["a", "b"]).expand(margin);
    assert_eq!(group_bounds(c.pathway(), c.pathway().get("g").unwrap()), Some(expected));

    let view = c.scene().view_of("g").unwrap();
    let zoom = c.camera().zoom();
    assert_eq!(c.scene().bounds(view, c.pathway(), zoom), Some(expected));

    c.select_ids(&ids(&["b"])).unwrap();
    c.move_selection_by(100.0, 50.0).unwrap();
    let moved = members_box(c.pathway(), &["a", "b"]).expand(margin);
    assert_ne!(moved, expected);
    assert_eq!(c.scene().bounds(view, c.pathway(), zoom), Some(moved));

    c.pathway_mut().remove("b").unwrap();
    c.process_model_events().unwrap();
    let shrunk = members_box(c.pathway(), &["a"]).expand(margin);
    assert_eq!(c.scene().bounds(view, c.pathway(), zoom), Some(shrunk));
}

#[test]
fn group_toggle_twice_restores_ungrouped_state() {
    let mut p = Pathway::with_seed(4);
    p.add(shape("a", 100.0, 200.0, 30.0)).unwrap();
    p.add(shape("b", 200.0, 260.0, 30.0)).unwrap();
    let mut c = canvas(p);
    let groups_before = c.pathway().elements().filter(|e| e.object_type == ObjectType::Group).count();

    c.select_ids(&ids(&["a", "b"])).unwrap();
    c.toggle_group().unwrap();
    let groups: Vec<&PathwayElement> =
        c.pathway().elements().filter(|e| e.object_type == ObjectType::Group).collect();
    assert_eq!(groups.len(), groups_before + 1);
    let group = groups[0].clone();
    let expected = members_box(c.pathway(), &["a", "b"]).expand(group.group_style.margin());
    assert_eq!(group_bounds(c.pathway(), &group), Some(expected));
    assert_eq!(c.selected_model_ids(), vec![group.graph_id.clone()]);

    c.toggle_group().unwrap();
    assert!(!c.pathway().contains(&group.graph_id));
    assert_eq!(c.pathway().get("a").unwrap().group_ref, None);
    assert_eq!(c.pathway().get("b").unwrap().group_ref, None);
    assert!(c.scene().view_of(&group.graph_id).is_none());
}

// =============================================================
// Deletion
// =============================================================

#[test]
fn deleting_a_node_frees_the_line_attached_to_it() {
    let mut p = Pathway::with_seed(6);
    p.add(node("n", 200.0, 200.0)).unwrap();
    p.add(PathwayElement::line(Point::new(400.0, 300.0), Point::default()).with_id("l")).unwrap();
    p.link_point("l", LineEnd::End, "n", 1.0, 0.0).unwrap();
    let mut c = canvas(p);

    c.select_ids(&ids(&["n"])).unwrap();
    c.on_key_down(Key::new("Delete"), Modifiers::NONE).unwrap();

    assert!(c.scene().view_of("n").is_none());
    assert!(!c.pathway().contains("n"));
    let end = c.pathway().get("l").unwrap().point(LineEnd::End).unwrap().clone();
    assert!(!end.is_attached());
    assert_eq!((end.x, end.y), (245.0, 200.0));
    assert!(c.scene().view_of("l").is_some());
}

// =============================================================
// Zoom
// =============================================================

#[test]
fn hit_test_agrees_across_zoom_levels() {
    let mut p = Pathway::with_seed(2);
    p.add(shape("s", 125.0, 125.0, 50.0)).unwrap();
    let mut c = canvas(p);
    let s = c.scene().view_of("s").unwrap();

    assert!(c.set_zoom_pct(200.0));
    assert_eq!(c.object_at(Point::new(300.0, 300.0)), Some(s));

    assert!(c.set_zoom_pct(50.0));
    assert_eq!(c.object_at(Point::new(75.0, 75.0)), Some(s));
}
