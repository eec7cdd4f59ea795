//! Alignment, stacking, common sizing and scaling of element sets.
//!
//! Alignment and stacking work on rotated bounding boxes, so a rotated shape
//! lines up by its visible extent. States are never laid out on their own
//! (they follow their parent), groups are skipped, and lines take part in
//! alignment and stacking but are never resized.

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

use std::collections::HashSet;

use crate::camera::Point;
use crate::error::ModelError;
use crate::frame;
use crate::geom::Rect;
use crate::line;
use crate::model::{GraphId, ObjectType, Pathway};
use crate::shaped;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignType {
    CenterX,
    CenterY,
    Left,
    Right,
    Top,
    Bottom,
}

/// Stack direction and cross-axis alignment.
///
/// `CenterX`, `Left` and `Right` stack downwards; `CenterY`, `Top` and
/// `Bottom` stack to the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackType {
    CenterX,
    CenterY,
    Left,
    Right,
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Width,
    Height,
}

/// Move any element by a model-space delta. Groups move their members.
///
/// # Errors
///
/// Returns `NotFound` if the element is gone.
pub fn translate(pathway: &mut Pathway, id: &str, dx: f64, dy: f64) -> Result<(), ModelError> {
    let e = pathway.require(id)?;
    let (object_type, group_id) = (e.object_type, e.group_id.clone());
    match object_type {
        ObjectType::Line | ObjectType::GraphLine => line::move_by(pathway, id, dx, dy),
        ObjectType::Group => {
            let Some(gid) = group_id else {
                return Ok(());
            };
            for member in movable(pathway, &pathway.group_members_deep(&gid)) {
                translate(pathway, &member, dx, dy)?;
            }
            Ok(())
        }
        ObjectType::Info | ObjectType::Biopax => Ok(()),
        ObjectType::DataNode | ObjectType::State | ObjectType::Label | ObjectType::Shape => {
            shaped::move_by(pathway, id, dx, dy)
        }
    }
}

/// Drop ids whose movement is implied by another id in the set: states of a
/// listed data node and members of a listed group, at any depth. Unknown ids
/// and repeats are dropped too.
#[must_use]
pub fn movable(pathway: &Pathway, ids: &[GraphId]) -> Vec<GraphId> {
    let listed: HashSet<&str> = ids.iter().map(String::as_str).collect();
    let listed_groups: HashSet<&str> = ids
        .iter()
        .filter_map(|id| pathway.get(id))
        .filter_map(|e| e.group_id.as_deref())
        .collect();
    let mut seen = HashSet::new();
    ids.iter()
        .filter(|id| seen.insert(id.as_str()))
        .filter(|id| {
            let Some(e) = pathway.get(id) else {
                return false;
            };
            let parent_listed = e.parent_ref.as_deref().is_some_and(|p| listed.contains(p));
            let group_listed = ancestor_groups(pathway, id).iter().any(|g| listed_groups.contains(g.as_str()));
            !parent_listed && !group_listed
        })
        .cloned()
        .collect()
}

/// Group ids enclosing an element, innermost first.
#[must_use]
pub fn ancestor_groups(pathway: &Pathway, id: &str) -> Vec<GraphId> {
    let mut out: Vec<GraphId> = Vec::new();
    let mut current = pathway.get(id).and_then(|e| e.group_ref.clone());
    while let Some(gid) = current {
        if out.contains(&gid) {
            break;
        }
        current = pathway.group(&gid).and_then(|g| g.group_ref.clone());
        out.push(gid);
    }
    out
}

/// Elements that can be laid out: everything but groups, states and the
/// info and biopax singletons.
fn layoutable(pathway: &Pathway, ids: &[GraphId]) -> Vec<(GraphId, Rect)> {
    ids.iter()
        .filter_map(|id| pathway.get(id))
        .filter(|e| e.object_type.is_shaped() || e.object_type.is_line())
        .filter(|e| e.object_type != ObjectType::State)
        .filter_map(|e| frame::element_bounds(pathway, e).map(|b| (e.graph_id.clone(), b)))
        .collect()
}

/// Align every element to the first one after sorting along the other axis.
///
/// # Errors
///
/// Returns `NotFound` if an element vanishes mid-operation.
pub fn align(pathway: &mut Pathway, ids: &[GraphId], how: AlignType) -> Result<(), ModelError> {
    let mut items = layoutable(pathway, ids);
    let horizontal = matches!(how, AlignType::CenterX | AlignType::Left | AlignType::Right);
    if horizontal {
        items.sort_by(|a, b| a.1.top().total_cmp(&b.1.top()));
    } else {
        items.sort_by(|a, b| a.1.left().total_cmp(&b.1.left()));
    }
    let Some((_, reference)) = items.first().cloned() else {
        return Ok(());
    };
    for (id, b) in items.iter().skip(1) {
        let (dx, dy) = match how {
            AlignType::CenterX => (reference.center().x - b.center().x, 0.0),
            AlignType::Left => (reference.left() - b.left(), 0.0),
            AlignType::Right => (reference.right() - b.right(), 0.0),
            AlignType::CenterY => (0.0, reference.center().y - b.center().y),
            AlignType::Top => (0.0, reference.top() - b.top()),
            AlignType::Bottom => (0.0, reference.bottom() - b.bottom()),
        };
        translate(pathway, id, dx, dy)?;
    }
    Ok(())
}

/// Chain elements one after another, aligned on the cross axis to the first.
///
/// # Errors
///
/// Returns `NotFound` if an element vanishes mid-operation.
pub fn stack(pathway: &mut Pathway, ids: &[GraphId], how: StackType) -> Result<(), ModelError> {
    let mut items = layoutable(pathway, ids);
    let vertical = matches!(how, StackType::CenterX | StackType::Left | StackType::Right);
    if vertical {
        items.sort_by(|a, b| a.1.top().total_cmp(&b.1.top()));
    } else {
        items.sort_by(|a, b| a.1.left().total_cmp(&b.1.left()));
    }
    let Some((_, first)) = items.first().cloned() else {
        return Ok(());
    };
    let mut previous = first;
    for (id, b) in items.iter().skip(1) {
        let (dx, dy) = match how {
            StackType::CenterX => (first.center().x - b.center().x, previous.bottom() - b.top()),
            StackType::Left => (first.left() - b.left(), previous.bottom() - b.top()),
            StackType::Right => (first.right() - b.right(), previous.bottom() - b.top()),
            StackType::CenterY => (previous.right() - b.left(), first.center().y - b.center().y),
            StackType::Top => (previous.right() - b.left(), first.top() - b.top()),
            StackType::Bottom => (previous.right() - b.left(), first.bottom() - b.bottom()),
        };
        translate(pathway, id, dx, dy)?;
        previous = b.translate(dx, dy);
    }
    Ok(())
}

/// Give every shaped element the largest width or height in the set,
/// keeping centers fixed and the sign of each element's own dimension.
///
/// # Errors
///
/// Returns `NotFound` if an element vanishes mid-operation.
pub fn set_common_size(pathway: &mut Pathway, ids: &[GraphId], dim: Dimension) -> Result<(), ModelError> {
    let shaped: Vec<GraphId> = layoutable(pathway, ids)
        .into_iter()
        .map(|(id, _)| id)
        .filter(|id| pathway.get(id).is_some_and(|e| e.object_type.is_shaped()))
        .collect();
    let size_of = |id: &GraphId| {
        pathway.get(id).map_or(0.0, |e| match dim {
            Dimension::Width => e.width.abs(),
            Dimension::Height => e.height.abs(),
        })
    };
    let max = shaped.iter().map(size_of).fold(0.0, f64::max);
    for id in &shaped {
        pathway.update(id, |e| match dim {
            Dimension::Width => e.width = max.copysign(e.width),
            Dimension::Height => e.height = max.copysign(e.height),
        })?;
    }
    Ok(())
}

/// Map elements from rectangle `from` into rectangle `into`: positions are
/// mapped linearly and shaped sizes scaled by the same factors.
///
/// # Errors
///
/// Returns `NotFound` if an element vanishes mid-operation.
pub fn scale_elements(pathway: &mut Pathway, ids: &[GraphId], from: Rect, into: Rect) -> Result<(), ModelError> {
    let sx = if from.width > 0.0 { into.width / from.width } else { 1.0 };
    let sy = if from.height > 0.0 { into.height / from.height } else { 1.0 };
    let map = |p: Point| Point::new(into.x + (p.x - from.x) * sx, into.y + (p.y - from.y) * sy);

    let mut expanded: Vec<GraphId> = Vec::new();
    for id in ids {
        let nested = pathway.get(id).and_then(|e| e.group_id.clone());
        expanded.push(id.clone());
        if let Some(gid) = nested {
            expanded.extend(pathway.group_members_deep(&gid));
        }
    }
    let mut seen = HashSet::new();
    expanded.retain(|id| seen.insert(id.clone()));

    for id in &expanded {
        let Some((object_type, old_center)) = pathway.get(id).map(|e| (e.object_type, e.center())) else {
            continue;
        };
        match object_type {
            ObjectType::DataNode | ObjectType::Label | ObjectType::Shape => {
                let c = map(old_center);
                pathway.update(id, |s| {
                    s.center_x = c.x;
                    s.center_y = c.y;
                    s.width *= sx;
                    s.height *= sy;
                })?;
            }
            ObjectType::Line | ObjectType::GraphLine => {
                pathway.update(id, |l| {
                    for p in l.points.iter_mut().filter(|p| !p.is_attached()) {
                        let q = map(Point::new(p.x, p.y));
                        p.x = q.x;
                        p.y = q.y;
                    }
                })?;
            }
            ObjectType::State | ObjectType::Group | ObjectType::Info | ObjectType::Biopax => {}
        }
    }
    Ok(())
}
