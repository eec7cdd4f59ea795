use super::*;
use crate::model::{ObjectType, PathwayElement};

fn shape(p: &mut Pathway, id: &str, x: f64, z: i64) {
    p.add(PathwayElement::new(ObjectType::Shape).with_id(id).at(x, 50.0).sized(20.0, 20.0).with_z(z)).unwrap();
}

fn z(p: &Pathway, id: &str) -> i64 {
    p.get(id).unwrap().z_order
}

fn ids(list: &[&str]) -> Vec<GraphId> {
    list.iter().map(|s| (*s).to_string()).collect()
}

// =============================================================
// Renumbering
// =============================================================

#[test]
fn renumber_spreads_ties_and_neighbours() {
    let mut p = Pathway::with_seed(1);
    shape(&mut p, "a", 0.0, 1);
    shape(&mut p, "b", 0.0, 1);
    shape(&mut p, "c", 0.0, 2);
    shape(&mut p, "d", 0.0, 10);
    let changed = auto_renumber(&mut p).unwrap();
    assert_eq!(changed, 2);
    assert_eq!((z(&p, "a"), z(&p, "b"), z(&p, "c"), z(&p, "d")), (1, 3, 5, 10));
}

#[test]
fn renumber_leaves_spaced_order_alone() {
    let mut p = Pathway::with_seed(1);
    shape(&mut p, "a", 0.0, 0);
    shape(&mut p, "b", 0.0, 2);
    assert_eq!(auto_renumber(&mut p).unwrap(), 0);
}

// =============================================================
// Front / back
// =============================================================

#[test]
fn bring_to_front_keeps_relative_order() {
    let mut p = Pathway::with_seed(1);
    shape(&mut p, "a", 0.0, 5);
    shape(&mut p, "b", 0.0, 1);
    shape(&mut p, "c", 0.0, 9);
    bring_to_front(&mut p, &ids(&["a", "b"])).unwrap();
    assert_eq!(z(&p, "b"), 10);
    assert_eq!(z(&p, "a"), 11);
}

#[test]
fn send_to_back_places_block_below_minimum() {
    let mut p = Pathway::with_seed(1);
    shape(&mut p, "a", 0.0, 5);
    shape(&mut p, "b", 0.0, 7);
    shape(&mut p, "c", 0.0, 1);
    send_to_back(&mut p, &ids(&["b", "a"])).unwrap();
    assert_eq!(z(&p, "a"), -1);
    assert_eq!(z(&p, "b"), 0);
    assert!(z(&p, "b") < z(&p, "c"));
}

// =============================================================
// Up / down
// =============================================================

#[test]
fn move_up_jumps_over_nearest_overlapping() {
    let mut p = Pathway::with_seed(1);
    shape(&mut p, "a", 50.0, 0);
    shape(&mut p, "b", 55.0, 2);
    shape(&mut p, "c", 60.0, 4);
    shape(&mut p, "far", 500.0, 1);
    assert!(move_up(&mut p, "a").unwrap());
    // renumbering spreads the four to 0, 2, 4, 6 first
    assert_eq!(z(&p, "a"), 5);
    assert!(z(&p, "b") < z(&p, "a") && z(&p, "a") < z(&p, "c"));
}

#[test]
fn move_up_on_topmost_is_noop() {
    let mut p = Pathway::with_seed(1);
    shape(&mut p, "a", 50.0, 0);
    shape(&mut p, "b", 55.0, 2);
    assert!(!move_up(&mut p, "b").unwrap());
    assert_eq!(z(&p, "b"), 2);
    assert!(z(&p, "a") < z(&p, "b"));
}

#[test]
fn move_down_ignores_disjoint_elements() {
    let mut p = Pathway::with_seed(1);
    shape(&mut p, "a", 50.0, 0);
    shape(&mut p, "far", 500.0, 2);
    shape(&mut p, "b", 55.0, 4);
    assert!(move_down(&mut p, "b").unwrap());
    assert_eq!(z(&p, "b"), -1);
}

#[test]
fn move_unknown_is_not_found() {
    let mut p = Pathway::with_seed(1);
    assert!(matches!(move_up(&mut p, "nope"), Err(ModelError::NotFound(_))));
}
