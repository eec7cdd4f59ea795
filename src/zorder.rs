//! Z-order operations on pathway elements.
//!
//! Front and back moves assign a contiguous block past the current extreme and
//! keep the moved elements in their relative order. Single steps up or down
//! only consider elements whose bounds overlap the target, and renumber first
//! so the slot next to the neighbour is always free.

#[cfg(test)]
#[path = "zorder_test.rs"]
mod zorder_test;

use std::collections::HashSet;

use tracing::debug;

use crate::consts::MIN_Z_SPACING;
use crate::error::ModelError;
use crate::frame;
use crate::model::{GraphId, Pathway};

/// Existing ids sorted by current z, ties kept in document order.
fn by_z(pathway: &Pathway, ids: &[GraphId]) -> Vec<(GraphId, i64)> {
    let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
    let mut out: Vec<(GraphId, i64)> = pathway
        .elements()
        .filter(|e| wanted.contains(e.graph_id.as_str()))
        .map(|e| (e.graph_id.clone(), e.z_order))
        .collect();
    out.sort_by_key(|(_, z)| *z);
    out
}

/// Spread z values so consecutive elements are at least [`MIN_Z_SPACING`]
/// apart. Relative order is preserved. Returns the number of elements changed.
///
/// # Errors
///
/// Returns `NotFound` if an element vanishes mid-operation.
pub fn auto_renumber(pathway: &mut Pathway) -> Result<usize, ModelError> {
    let all: Vec<GraphId> = pathway.elements().map(|e| e.graph_id.clone()).collect();
    let mut prev: Option<i64> = None;
    let mut changed = 0;
    for (id, z) in by_z(pathway, &all) {
        let wanted = match prev {
            Some(p) if z < p.saturating_add(MIN_Z_SPACING) => p.saturating_add(MIN_Z_SPACING),
            _ => z,
        };
        if wanted != z {
            pathway.update(&id, |e| e.z_order = wanted)?;
            changed += 1;
        }
        prev = Some(wanted);
    }
    if changed > 0 {
        debug!(count = changed, "z order renumbered");
    }
    Ok(changed)
}

/// Move `ids` above everything else.
///
/// # Errors
///
/// Returns `NotFound` if an element vanishes mid-operation.
pub fn bring_to_front(pathway: &mut Pathway, ids: &[GraphId]) -> Result<(), ModelError> {
    let moved = by_z(pathway, ids);
    let Some(top) = pathway.elements().map(|e| e.z_order).max() else {
        return Ok(());
    };
    let mut z = top;
    for (id, _) in moved {
        z = z.saturating_add(1);
        pathway.update(&id, |e| e.z_order = z)?;
    }
    Ok(())
}

/// Move `ids` below everything else.
///
/// # Errors
///
/// Returns `NotFound` if an element vanishes mid-operation.
pub fn send_to_back(pathway: &mut Pathway, ids: &[GraphId]) -> Result<(), ModelError> {
    let moved = by_z(pathway, ids);
    let Some(bottom) = pathway.elements().map(|e| e.z_order).min() else {
        return Ok(());
    };
    let count = i64::try_from(moved.len()).unwrap_or(i64::MAX);
    let mut z = bottom.saturating_sub(count);
    for (id, _) in moved {
        pathway.update(&id, |e| e.z_order = z)?;
        z = z.saturating_add(1);
    }
    Ok(())
}

/// Z values of the other elements whose bounds overlap `id`.
fn overlapping_z(pathway: &Pathway, id: &str) -> Vec<i64> {
    let Some(target) = pathway.get(id) else {
        return Vec::new();
    };
    let Some(bounds) = frame::element_bounds(pathway, target) else {
        return Vec::new();
    };
    pathway
        .elements()
        .filter(|e| e.graph_id != id)
        .filter(|e| frame::element_bounds(pathway, e).is_some_and(|b| b.intersects(&bounds)))
        .map(|e| e.z_order)
        .collect()
}

/// Place `id` just above the nearest overlapping element above it.
/// Returns `false` when nothing overlapping sits above.
///
/// # Errors
///
/// Returns `NotFound` if the element is gone.
pub fn move_up(pathway: &mut Pathway, id: &str) -> Result<bool, ModelError> {
    pathway.require(id)?;
    auto_renumber(pathway)?;
    let z = pathway.require(id)?.z_order;
    let Some(next) = overlapping_z(pathway, id).into_iter().filter(|o| *o > z).min() else {
        return Ok(false);
    };
    pathway.update(id, |e| e.z_order = next.saturating_add(1))?;
    Ok(true)
}

/// Place `id` just below the nearest overlapping element below it.
/// Returns `false` when nothing overlapping sits below.
///
/// # Errors
///
/// Returns `NotFound` if the element is gone.
pub fn move_down(pathway: &mut Pathway, id: &str) -> Result<bool, ModelError> {
    pathway.require(id)?;
    auto_renumber(pathway)?;
    let z = pathway.require(id)?.z_order;
    let Some(prev) = overlapping_z(pathway, id).into_iter().filter(|o| *o < z).max() else {
        return Ok(false);
    };
    pathway.update(id, |e| e.z_order = prev.saturating_sub(1))?;
    Ok(true)
}
