//! The group toggle: one command that groups or ungroups depending on the
//! selection.

#[cfg(test)]
#[path = "grouping_test.rs"]
mod grouping_test;

use std::collections::HashSet;

use tracing::info;

use crate::error::ModelError;
use crate::layout::ancestor_groups;
use crate::model::{GraphId, ObjectType, Pathway, PathwayElement};

/// Outcome of [`toggle_group`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupToggle {
    /// A new group was created; holds its graph id.
    Grouped(GraphId),
    /// These group elements were dissolved.
    Ungrouped(Vec<GraphId>),
    /// Nothing groupable was selected.
    Unchanged,
}

/// The group id a selected element stands for: its own if it is a group,
/// otherwise its outermost enclosing group.
fn enclosing(pathway: &Pathway, e: &PathwayElement) -> Option<GraphId> {
    let outer = ancestor_groups(pathway, &e.graph_id).pop();
    outer.or_else(|| if e.object_type == ObjectType::Group { e.group_id.clone() } else { None })
}

/// Group or ungroup `ids`.
///
/// If every selected element lies in one and the same group (or is that
/// group), the group is dissolved. Otherwise any group elements in the
/// selection are dissolved and their members, together with the other
/// selected elements, join one new group.
///
/// # Errors
///
/// Propagates model errors from adding or removing elements.
pub fn toggle_group(pathway: &mut Pathway, ids: &[GraphId]) -> Result<GroupToggle, ModelError> {
    let selected: Vec<PathwayElement> = ids
        .iter()
        .filter_map(|id| pathway.get(id))
        .filter(|e| !matches!(e.object_type, ObjectType::Info | ObjectType::Biopax | ObjectType::State))
        .cloned()
        .collect();
    if selected.is_empty() {
        return Ok(GroupToggle::Unchanged);
    }

    let enclosing_groups: HashSet<Option<GraphId>> = selected.iter().map(|e| enclosing(pathway, e)).collect();
    if enclosing_groups.len() == 1 {
        if let Some(Some(gid)) = enclosing_groups.into_iter().next() {
            let Some(group) = pathway.group(&gid).map(|g| g.graph_id.clone()) else {
                return Ok(GroupToggle::Unchanged);
            };
            pathway.remove(&group)?;
            info!(%group, "group dissolved");
            return Ok(GroupToggle::Ungrouped(vec![group]));
        }
    }

    let mut members: Vec<GraphId> = Vec::new();
    let mut dissolved: Vec<GraphId> = Vec::new();
    for e in &selected {
        match (&e.object_type, &e.group_id) {
            (ObjectType::Group, Some(gid)) => {
                members.extend(pathway.group_members(gid));
                dissolved.push(e.graph_id.clone());
            }
            _ => members.push(e.graph_id.clone()),
        }
    }
    for group in &dissolved {
        pathway.remove(group)?;
    }
    let mut seen = HashSet::new();
    members.retain(|m| pathway.contains(m) && seen.insert(m.clone()));
    if members.is_empty() {
        return Ok(GroupToggle::Ungrouped(dissolved));
    }

    let bottom = members.iter().filter_map(|m| pathway.get(m)).map(|m| m.z_order).min().unwrap_or_default();
    let group = pathway.add(PathwayElement::new(ObjectType::Group).with_z(bottom.saturating_sub(1)))?;
    let Some(gid) = pathway.get(&group).and_then(|g| g.group_id.clone()) else {
        return Err(ModelError::WrongType { id: group, expected: ObjectType::Group });
    };
    for m in &members {
        let gid = gid.clone();
        pathway.update(m, move |e| e.group_ref = Some(gid))?;
    }
    info!(%group, count = members.len(), "group created");
    Ok(GroupToggle::Grouped(group))
}
