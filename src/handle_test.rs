#![allow(clippy::float_cmp)]

use super::*;

// =============================================================
// ResizeAnchor
// =============================================================

#[test]
fn signs_round_trip() {
    for a in ResizeAnchor::ALL {
        assert_eq!(ResizeAnchor::from_signs(a.sx(), a.sy()), Some(a));
    }
    assert_eq!(ResizeAnchor::from_signs(0.0, 0.0), None);
}

#[test]
fn flips_mirror_sides() {
    assert_eq!(ResizeAnchor::Se.flip_h(), ResizeAnchor::Sw);
    assert_eq!(ResizeAnchor::Se.flip_v(), ResizeAnchor::Ne);
    assert_eq!(ResizeAnchor::N.flip_h(), ResizeAnchor::N);
    assert_eq!(ResizeAnchor::E.flip_h(), ResizeAnchor::W);
}

#[test]
fn corners_are_corners() {
    assert!(ResizeAnchor::CORNERS.iter().all(|a| a.is_corner()));
    assert!(!ResizeAnchor::N.is_corner());
}

// =============================================================
// HandleKind
// =============================================================

#[test]
fn edge_handles_move_along_one_axis() {
    assert_eq!(HandleKind::Resize(ResizeAnchor::N).freedom(), Freedom::Y);
    assert_eq!(HandleKind::Resize(ResizeAnchor::E).freedom(), Freedom::X);
    assert_eq!(HandleKind::Resize(ResizeAnchor::Se).freedom(), Freedom::Free);
    assert_eq!(HandleKind::Rotate.freedom(), Freedom::Rotation);
    assert_eq!(HandleKind::AnchorSlide.freedom(), Freedom::Path);
}

#[test]
fn handle_cursors() {
    assert_eq!(HandleKind::Resize(ResizeAnchor::Nw).cursor(), Cursor::Resize(ResizeAnchor::Nw));
    assert_eq!(HandleKind::Rotate.cursor(), Cursor::Rotate);
}

// =============================================================
// Geometry
// =============================================================

#[test]
fn handle_outline_is_constant_in_pixels() {
    let at = Point::new(100.0, 100.0);
    let at_one = handle_outline(at, 1.0).bounds();
    let at_two = handle_outline(at, 2.0).bounds();
    assert_eq!(at_one.width, HANDLE_SIZE_PX);
    assert_eq!(at_two.width, HANDLE_SIZE_PX / 2.0);
    assert!(handle_outline(at, 1.0).contains(Point::new(103.0, 97.0)));
}

#[test]
fn resize_rect_moves_named_sides() {
    let r = Rect::new(0.0, 0.0, 100.0, 50.0);
    let (out, active) = resize_rect(r, ResizeAnchor::Se, Point::new(120.0, 60.0));
    assert_eq!(out, Rect::new(0.0, 0.0, 120.0, 60.0));
    assert_eq!(active, ResizeAnchor::Se);

    let (out, _) = resize_rect(r, ResizeAnchor::N, Point::new(999.0, 10.0));
    assert_eq!(out, Rect::new(0.0, 10.0, 100.0, 40.0));
}

#[test]
fn resize_rect_crossing_flips_active_anchor() {
    let r = Rect::new(0.0, 0.0, 100.0, 50.0);
    let (out, active) = resize_rect(r, ResizeAnchor::Se, Point::new(-20.0, -10.0));
    assert_eq!(out, Rect::new(-20.0, -10.0, 20.0, 10.0));
    assert_eq!(active, ResizeAnchor::Nw);
}
