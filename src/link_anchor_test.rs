#![allow(clippy::float_cmp)]

use super::*;

fn place_on(center: Point, w: f64, h: f64) -> impl Fn(f64, f64) -> Point {
    move |rx, ry| Point::new(center.x + rx * w / 2.0, center.y + ry * h / 2.0)
}

#[test]
fn hidden_delegate_has_no_anchors() {
    let d = LinkAnchorDelegate::for_shape();
    assert!(!d.is_shown());
    assert!(d.anchors().is_empty());
}

#[test]
fn large_shape_gets_three_per_side() {
    let mut d = LinkAnchorDelegate::for_shape();
    d.show(100.0, 60.0);
    assert_eq!(d.anchors().len(), 12);
}

#[test]
fn small_shape_gets_one_per_side() {
    let mut d = LinkAnchorDelegate::for_shape();
    d.show(10.0, 10.0);
    assert_eq!(d.anchors().len(), 4);
}

#[test]
fn mixed_sizes_choose_per_side() {
    let mut d = LinkAnchorDelegate::for_shape();
    d.show(100.0, 10.0);
    // three on top and bottom, one on left and right
    assert_eq!(d.anchors().len(), 8);
}

#[test]
fn layout_recomputed_when_decision_flips() {
    let mut d = LinkAnchorDelegate::for_shape();
    d.show(100.0, 100.0);
    d.highlight(0);
    d.show(90.0, 90.0);
    // same decision: cached anchors kept, highlight included
    assert!(d.anchors()[0].highlighted);
    d.show(10.0, 10.0);
    assert_eq!(d.anchors().len(), 4);
    assert!(!d.anchors()[0].highlighted);
}

#[test]
fn line_anchor_has_single_center_anchor() {
    let mut d = LinkAnchorDelegate::for_line_anchor();
    d.show(0.0, 0.0);
    assert_eq!(d.anchors(), &[LinkAnchor { rel_x: 0.0, rel_y: 0.0, highlighted: false }]);
}

#[test]
fn hide_clears_highlight() {
    let mut d = LinkAnchorDelegate::for_shape();
    d.show(100.0, 100.0);
    d.highlight(1);
    d.hide();
    d.show(100.0, 100.0);
    assert!(d.anchors().iter().all(|a| !a.highlighted));
}

#[test]
fn hit_uses_pixel_tolerance() {
    let mut d = LinkAnchorDelegate::for_shape();
    d.show(10.0, 10.0);
    let place = place_on(Point::new(50.0, 50.0), 10.0, 10.0);
    // top anchor sits at (50, 45)
    assert_eq!(d.hit(Point::new(53.0, 44.0), 1.0, &place), Some(0));
    assert_eq!(d.hit(Point::new(57.0, 44.0), 1.0, &place), None);
    // at 200% the tolerance shrinks to 2.5 model units
    assert_eq!(d.hit(Point::new(53.0, 44.0), 2.0, &place), None);
}

#[test]
fn hidden_delegate_never_hits() {
    let d = LinkAnchorDelegate::for_line_anchor();
    assert_eq!(d.hit(Point::default(), 1.0, |_, _| Point::default()), None);
}
