#![allow(clippy::float_cmp)]

use super::*;
use crate::camera::Point;
use crate::model::{Citation, LineEnd};

fn node(id: &str, x: f64) -> PathwayElement {
    PathwayElement::new(ObjectType::DataNode).with_id(id).at(x, 50.0)
}

fn source() -> Pathway {
    let mut p = Pathway::with_seed(11);
    p.add(node("a", 50.0)).unwrap();
    p.add(node("b", 250.0)).unwrap();
    p.add(node("outside", 450.0)).unwrap();
    let l = PathwayElement::line(Point::new(0.0, 0.0), Point::new(0.0, 0.0)).with_id("l");
    p.add(l).unwrap();
    p.link_point("l", LineEnd::Start, "a", 1.0, 0.0).unwrap();
    p.link_point("l", LineEnd::End, "outside", -1.0, 0.0).unwrap();
    p
}

fn ids(list: &[&str]) -> Vec<GraphId> {
    list.iter().map(|s| (*s).to_string()).collect()
}

// =============================================================
// Collect
// =============================================================

#[test]
fn collect_includes_group_members_and_states() {
    let mut p = Pathway::with_seed(3);
    let mut g = PathwayElement::new(ObjectType::Group).with_id("g");
    g.group_id = Some("gid".into());
    p.add(g).unwrap();
    let mut member = node("m", 10.0);
    member.group_ref = Some("gid".into());
    p.add(member).unwrap();
    let mut state = PathwayElement::new(ObjectType::State).with_id("s");
    state.parent_ref = Some("m".into());
    p.add(state).unwrap();
    p.add(PathwayElement::new(ObjectType::Info).with_id("info")).unwrap();

    let copied: Vec<GraphId> = collect(&p, &ids(&["g", "info"])).into_iter().map(|e| e.graph_id).collect();
    assert_eq!(copied, ids(&["g", "m", "s"]));
}

// =============================================================
// Paste
// =============================================================

#[test]
fn paste_generates_fresh_ids() {
    let mut p = source();
    let before: HashSet<GraphId> = p.elements().map(|e| e.graph_id.clone()).collect();
    let batch = collect(&p, &ids(&["a", "b", "l"]));
    let added = paste(&mut p, &batch, (10.0, 10.0)).unwrap();
    assert_eq!(added.len(), 3);
    let unique: HashSet<&GraphId> = added.iter().collect();
    assert_eq!(unique.len(), 3);
    assert!(added.iter().all(|id| !before.contains(id)));
    assert_eq!(p.len(), 7);
}

#[test]
fn paste_repoints_internal_references_and_drops_external() {
    let mut p = source();
    let batch = collect(&p, &ids(&["a", "l"]));
    let added = paste(&mut p, &batch, (10.0, 10.0)).unwrap();
    let new_a = &added[0];
    let new_l = p.get(&added[1]).unwrap();

    let start = new_l.point(LineEnd::Start).unwrap();
    assert_eq!(start.graph_ref.as_ref(), Some(new_a));
    let end = new_l.point(LineEnd::End).unwrap();
    assert!(!end.is_attached());
    // the original line is untouched
    let old = p.get("l").unwrap();
    assert_eq!(old.point(LineEnd::End).unwrap().graph_ref.as_deref(), Some("outside"));
    assert_eq!(p.referrers(new_a).len(), 1);
}

#[test]
fn paste_offsets_shapes_and_free_points() {
    let mut p = Pathway::with_seed(2);
    p.add(node("a", 50.0)).unwrap();
    p.add(PathwayElement::line(Point::new(0.0, 0.0), Point::new(10.0, 0.0)).with_id("l")).unwrap();
    let batch = collect(&p, &ids(&["a", "l"]));
    let added = paste(&mut p, &batch, (5.0, 7.0)).unwrap();
    assert_eq!(p.get(&added[0]).unwrap().center(), Point::new(55.0, 57.0));
    let start = p.get(&added[1]).unwrap().point(LineEnd::Start).unwrap().clone();
    assert_eq!((start.x, start.y), (5.0, 7.0));
}

#[test]
fn paste_skips_info_and_merges_biopax() {
    let mut p = Pathway::with_seed(2);
    p.add(PathwayElement::new(ObjectType::Info).with_id("info")).unwrap();
    let mut bp = PathwayElement::new(ObjectType::Biopax).with_id("bp");
    bp.citations.push(Citation { id: "c1".into(), title: "one".into() });
    p.add(bp).unwrap();

    let mut copied_bp = PathwayElement::new(ObjectType::Biopax).with_id("bp");
    copied_bp.citations.push(Citation { id: "c1".into(), title: "one".into() });
    copied_bp.citations.push(Citation { id: "c2".into(), title: "two".into() });
    let info = PathwayElement::new(ObjectType::Info).with_id("info");

    let added = paste(&mut p, &[info, copied_bp], (0.0, 0.0)).unwrap();
    assert!(added.is_empty());
    assert_eq!(p.len(), 2);
    assert_eq!(p.biopax().unwrap().citations.len(), 2);
}

#[test]
fn orphan_state_is_dropped() {
    let mut p = Pathway::with_seed(2);
    p.add(node("a", 50.0)).unwrap();
    let mut state = PathwayElement::new(ObjectType::State).with_id("s");
    state.parent_ref = Some("a".into());
    p.add(state).unwrap();
    let only_state = vec![p.get("s").unwrap().clone()];
    let added = paste(&mut p, &only_state, (0.0, 0.0)).unwrap();
    assert!(added.is_empty());
}

#[test]
fn pasted_group_keeps_its_members() {
    let mut p = Pathway::with_seed(3);
    let mut g = PathwayElement::new(ObjectType::Group).with_id("g");
    g.group_id = Some("gid".into());
    p.add(g).unwrap();
    let mut member = node("m", 10.0);
    member.group_ref = Some("gid".into());
    p.add(member).unwrap();

    let batch = collect(&p, &ids(&["g"]));
    let added = paste(&mut p, &batch, (0.0, 0.0)).unwrap();
    let new_gid = p.get(&added[0]).unwrap().group_id.clone().unwrap();
    assert_ne!(new_gid, "gid");
    assert_eq!(p.group_members(&new_gid), vec![added[1].clone()]);
    assert_eq!(p.group_members("gid"), ids(&["m"]));
}
