use super::*;

// =============================================================
// Modifiers
// =============================================================

#[test]
fn no_modifiers_is_plain_click() {
    let m = Modifiers::NONE;
    assert!(!m.multi_select());
    assert!(!m.snap());
    assert!(!m.command());
    assert_eq!(m, Modifiers::default());
}

#[test]
fn shift_ctrl_and_meta_multi_select() {
    assert!(Modifiers::SHIFT.multi_select());
    assert!(Modifiers::CTRL.multi_select());
    assert!(Modifiers { meta: true, ..Modifiers::NONE }.multi_select());
    assert!(!Modifiers { alt: true, ..Modifiers::NONE }.multi_select());
}

#[test]
fn only_shift_snaps() {
    assert!(Modifiers::SHIFT.snap());
    assert!(!Modifiers::CTRL.snap());
}

// =============================================================
// Key
// =============================================================

#[test]
fn key_match_ignores_case() {
    assert!(Key::new("G").is("g"));
    assert!(Key::new("Delete").is("delete"));
    assert!(!Key::new("Delete").is("Backspace"));
}

// =============================================================
// Gesture / DragUndo
// =============================================================

#[test]
fn gesture_default_is_idle() {
    assert!(Gesture::default().is_idle());
    let dragging = Gesture::Dragging { target: DragTarget::Selection, last: Point::default() };
    assert!(!dragging.is_idle());
}

#[test]
fn drag_undo_progression() {
    let s = DragUndo::default();
    assert_eq!(s, DragUndo::NotRecording);
    assert_eq!(s.touch(), DragUndo::NotRecording);
    let started = s.start();
    assert_eq!(started, DragUndo::ChangeStarted);
    assert_eq!(started.touch(), DragUndo::Changed);
    assert_eq!(started.touch().touch(), DragUndo::Changed);
}

#[test]
fn cursor_default() {
    assert_eq!(Cursor::default(), Cursor::Default);
}
