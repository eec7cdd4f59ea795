use super::*;
use crate::model::{ObjectType, PathwayElement};

fn snapshot(n: usize) -> Snapshot {
    Snapshot { elements: (0..n).map(|_| PathwayElement::new(ObjectType::Shape)).collect() }
}

#[test]
fn new_history_is_empty() {
    let h = UndoHistory::new();
    assert!(h.is_empty());
    assert!(h.last_label().is_none());
}

#[test]
fn actions_stack_in_order() {
    let mut h = UndoHistory::new();
    h.new_action("Move", snapshot(1));
    h.new_action("Delete", snapshot(2));
    assert_eq!(h.labels(), vec!["Move", "Delete"]);
    let top = h.pop().unwrap();
    assert_eq!(top.label, "Delete");
    assert_eq!(top.before.elements.len(), 2);
    assert_eq!(h.len(), 1);
}

#[test]
fn limit_drops_oldest() {
    let mut h = UndoHistory::with_limit(2);
    for label in ["a", "b", "c"] {
        h.new_action(label, snapshot(0));
    }
    assert_eq!(h.labels(), vec!["b", "c"]);
}

#[test]
fn zero_limit_keeps_one() {
    let mut h = UndoHistory::with_limit(0);
    h.new_action("a", snapshot(0));
    h.new_action("b", snapshot(0));
    assert_eq!(h.labels(), vec!["b"]);
}

#[test]
fn shared_history_receives_actions() {
    let shared = Rc::new(RefCell::new(UndoHistory::new()));
    let mut sink: Box<dyn UndoSink> = Box::new(Rc::clone(&shared));
    sink.new_action("Paste", snapshot(0));
    assert_eq!(shared.borrow().last_label(), Some("Paste"));
}
