//! Copy and paste of pathway elements with id remapping.
//!
//! A paste never reuses an id: every graph id, group id, point id and anchor
//! id in the batch gets a fresh one first, then references are rewritten
//! through that map. References that leave the batch are dropped, so a pasted
//! line whose target was not copied comes out free.

#[cfg(test)]
#[path = "clipboard_test.rs"]
mod clipboard_test;

use std::collections::{HashMap, HashSet};

use tracing::info;

use crate::error::ModelError;
use crate::line;
use crate::model::{GraphId, ObjectType, Pathway, PathwayElement};

/// Elements to copy for `ids`: the elements themselves, the states of copied
/// data nodes and everything inside copied groups. The info element is left out.
#[must_use]
pub fn collect(pathway: &Pathway, ids: &[GraphId]) -> Vec<PathwayElement> {
    let mut wanted: Vec<GraphId> = Vec::new();
    for id in ids {
        let Some(e) = pathway.get(id) else {
            continue;
        };
        wanted.push(id.clone());
        if let Some(gid) = &e.group_id {
            wanted.extend(pathway.group_members_deep(gid));
        }
    }
    let mut with_states = wanted.clone();
    for id in &wanted {
        with_states.extend(pathway.states_of(id));
    }
    let mut seen = HashSet::new();
    with_states
        .into_iter()
        .filter(|id| seen.insert(id.clone()))
        .filter_map(|id| pathway.get(&id).cloned())
        .filter(|e| e.object_type != ObjectType::Info)
        .collect()
}

/// Fresh id for every id owned by the batch.
fn remap_ids(pathway: &mut Pathway, elements: &[PathwayElement]) -> HashMap<GraphId, GraphId> {
    let mut reserved: HashSet<GraphId> = HashSet::new();
    let mut map = HashMap::new();
    for e in elements {
        for old in e.owned_ids() {
            if map.contains_key(old) {
                continue;
            }
            let fresh = pathway.unique_id_excluding(&reserved);
            reserved.insert(fresh.clone());
            map.insert(old.to_string(), fresh);
        }
    }
    map
}

fn remapped(map: &HashMap<GraphId, GraphId>, reference: Option<&GraphId>) -> Option<GraphId> {
    reference.and_then(|r| map.get(r)).cloned()
}

/// Deep copy of `e` with every id and reference rewritten, moved by `offset`.
fn relocate(e: &PathwayElement, map: &HashMap<GraphId, GraphId>, offset: (f64, f64)) -> PathwayElement {
    let mut copy = e.clone();
    copy.graph_id = map.get(&e.graph_id).cloned().unwrap_or_default();
    copy.group_id = remapped(map, e.group_id.as_ref());
    copy.group_ref = remapped(map, e.group_ref.as_ref());
    copy.alias_ref = remapped(map, e.alias_ref.as_ref());
    copy.parent_ref = remapped(map, e.parent_ref.as_ref());
    for p in &mut copy.points {
        p.id = map.get(&p.id).cloned().unwrap_or_default();
        p.graph_ref = remapped(map, p.graph_ref.as_ref());
        if !p.is_attached() {
            p.rel_x = 0.0;
            p.rel_y = 0.0;
            p.x += offset.0;
            p.y += offset.1;
        }
    }
    for a in &mut copy.anchors {
        a.id = map.get(&a.id).cloned().unwrap_or_default();
    }
    if copy.object_type.is_shaped() && copy.object_type != ObjectType::State {
        copy.center_x += offset.0;
        copy.center_y += offset.1;
    }
    copy
}

/// Fold a copied biopax container into the existing one.
fn merge_biopax(pathway: &mut Pathway, copied: &PathwayElement) -> Result<(), ModelError> {
    let Some(existing) = pathway.biopax().map(|b| b.graph_id.clone()) else {
        return Ok(());
    };
    pathway.update(&existing, |b| {
        for c in &copied.citations {
            if !b.citations.iter().any(|x| x.id == c.id) {
                b.citations.push(c.clone());
            }
        }
        for (k, v) in &copied.properties {
            b.properties.entry(k.clone()).or_insert_with(|| v.clone());
        }
    })
}

/// Paste `elements` into the pathway, returning the new graph ids.
///
/// The info element is skipped, a biopax container is merged into an existing
/// one, and states whose parent was not copied are dropped. Copied lines have
/// their attached endpoints re-resolved afterwards.
///
/// # Errors
///
/// Propagates model errors from adding the copies.
pub fn paste(pathway: &mut Pathway, elements: &[PathwayElement], offset: (f64, f64)) -> Result<Vec<GraphId>, ModelError> {
    let mut batch: Vec<&PathwayElement> = Vec::new();
    for e in elements {
        match e.object_type {
            ObjectType::Info => {}
            ObjectType::Biopax if pathway.biopax().is_some() => merge_biopax(pathway, e)?,
            _ => batch.push(e),
        }
    }
    let owned: Vec<PathwayElement> = batch.iter().map(|e| (*e).clone()).collect();
    let map = remap_ids(pathway, &owned);

    let copies: Vec<PathwayElement> = owned.iter().map(|e| relocate(e, &map, offset)).collect();
    let (states, others): (Vec<_>, Vec<_>) = copies.into_iter().partition(|e| e.object_type == ObjectType::State);

    let mut added = Vec::new();
    for e in others {
        added.push(pathway.add(e)?);
    }
    for s in states.into_iter().filter(|s| s.parent_ref.is_some()) {
        added.push(pathway.add(s)?);
    }
    let lines: Vec<GraphId> = added
        .iter()
        .filter(|id| pathway.get(id).is_some_and(|e| e.object_type.is_line()))
        .cloned()
        .collect();
    for id in &lines {
        line::refresh(pathway, id)?;
    }
    info!(count = added.len(), "pasted elements");
    Ok(added)
}
