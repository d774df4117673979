//! Drag-and-drop reconciliation over the menu forest.
//!
//! A move is an [`extract`] of the dragged node (subtree intact) followed
//! by an [`insert`] at the drop position. Cycle-producing moves are
//! rejected before any mutation; sibling lists touched by either half are
//! renumbered to `0..n-1`, untouched lists are left alone.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::forest::MenuForest;
use crate::menu::{MenuItem, ROOT_PARENT_ID};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Drop intent
// ---------------------------------------------------------------------------

/// Where a dragged node lands relative to the drop target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropPosition {
    Before,
    After,
    Inside,
}

/// Transient description of a drop gesture; consumed once per drop.
///
/// `target_id = None` with [`DropPosition::Inside`] means "drop at root
/// level". `parent_id` is advisory display state: the reconciler derives
/// the receiving parent from the forest itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropZone {
    pub target_id: Option<DbId>,
    pub position: DropPosition,
    pub parent_id: DbId,
}

impl DropZone {
    /// A drop onto the root-level zone.
    pub fn at_root() -> Self {
        Self {
            target_id: None,
            position: DropPosition::Inside,
            parent_id: ROOT_PARENT_ID,
        }
    }
}

/// Result of a successful [`move_item`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Nothing changed: dropped on itself, or the dragged/target id is
    /// not in the forest.
    Noop,
    /// The node moved. `expanded` carries the target a session should
    /// mark expanded after an `Inside` drop.
    Moved { expanded: Option<DbId> },
}

/// A node detached from a forest together with its entire subtree,
/// ids, records, and child order unchanged.
#[derive(Debug, Clone)]
pub struct DetachedSubtree {
    root: DbId,
    nodes: HashMap<DbId, MenuItem>,
    children: HashMap<DbId, Vec<DbId>>,
}

impl DetachedSubtree {
    /// Id of the detached root node.
    pub fn root_id(&self) -> DbId {
        self.root
    }

    /// Number of nodes in the detached subtree, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

/// Detach the node `id` and its subtree from the forest.
///
/// The vacated sibling list is renumbered. An absent id returns `None`
/// and leaves the forest untouched.
pub fn extract(forest: &mut MenuForest, id: DbId) -> Option<DetachedSubtree> {
    let parent_id = forest.get(id)?.parent_id;
    forest.detach_from_siblings(parent_id, id);
    forest.normalize_sequences(parent_id);

    let mut detached = DetachedSubtree {
        root: id,
        nodes: HashMap::new(),
        children: HashMap::new(),
    };
    collect_subtree(forest, id, &mut detached);
    Some(detached)
}

fn collect_subtree(forest: &mut MenuForest, id: DbId, into: &mut DetachedSubtree) {
    let child_ids = forest.children_of(id).to_vec();
    for &child in &child_ids {
        collect_subtree(forest, child, into);
    }
    if let Some(node) = forest.nodes.remove(&id) {
        into.nodes.insert(id, node);
    }
    forest.children.remove(&id);
    if !child_ids.is_empty() {
        into.children.insert(id, child_ids);
    }
}

/// Reattach a detached subtree relative to `target_id`.
///
/// - `target_id = None` + `Inside`: append at the end of the root list.
/// - `Before` / `After`: splice into the target's sibling list; the moved
///   node adopts the target's parent.
/// - `Inside`: append as the target's last child.
///
/// The receiving sibling list is renumbered. A `Some` target missing
/// from the forest falls back to a root-level append instead of dropping
/// the subtree.
pub fn insert(
    forest: &mut MenuForest,
    detached: DetachedSubtree,
    target_id: Option<DbId>,
    position: DropPosition,
) {
    let root = detached.root;
    attach_nodes(forest, detached);

    let (parent_id, index) = match (target_id, position) {
        (Some(target), DropPosition::Before | DropPosition::After) => {
            match forest.get(target).map(|t| t.parent_id) {
                Some(sibling_parent) => {
                    let siblings: &[DbId] = if sibling_parent == ROOT_PARENT_ID {
                        forest.roots()
                    } else {
                        forest.children_of(sibling_parent)
                    };
                    match siblings.iter().position(|&id| id == target) {
                        Some(at) if position == DropPosition::Before => (sibling_parent, at),
                        Some(at) => (sibling_parent, at + 1),
                        None => (sibling_parent, siblings.len()),
                    }
                }
                None => (ROOT_PARENT_ID, forest.roots().len()),
            }
        }
        (Some(target), DropPosition::Inside) if forest.contains(target) => {
            (target, forest.children_of(target).len())
        }
        _ => (ROOT_PARENT_ID, forest.roots().len()),
    };

    let list = forest.sibling_list_mut(parent_id);
    list.insert(index, root);
    if let Some(node) = forest.get_mut(root) {
        node.parent_id = parent_id;
    }
    forest.normalize_sequences(parent_id);
}

fn attach_nodes(forest: &mut MenuForest, detached: DetachedSubtree) {
    forest.nodes.extend(detached.nodes);
    forest.children.extend(detached.children);
}

/// Returns `true` iff `ancestor` is a strict ancestor of `id`.
///
/// Walks `parent_id` links upward, so cost is the depth of `id`, not the
/// size of the forest.
pub fn is_ancestor(forest: &MenuForest, ancestor: DbId, id: DbId) -> bool {
    let mut current = match forest.get(id) {
        Some(node) => node.parent_id,
        None => return false,
    };
    while current != ROOT_PARENT_ID {
        if current == ancestor {
            return true;
        }
        current = match forest.get(current) {
            Some(node) => node.parent_id,
            None => return false,
        };
    }
    false
}

// ---------------------------------------------------------------------------
// Composed move
// ---------------------------------------------------------------------------

/// Move `dragged_id` to the position described by `zone`.
///
/// Dropping a node onto itself, or dragging an id that is no longer in
/// the forest, is a no-op. Dropping onto a descendant of the dragged
/// node is rejected with [`CoreError::Conflict`] before any mutation.
pub fn move_item(
    forest: &mut MenuForest,
    dragged_id: DbId,
    zone: DropZone,
) -> Result<MoveOutcome, CoreError> {
    if zone.target_id == Some(dragged_id) {
        return Ok(MoveOutcome::Noop);
    }
    if !forest.contains(dragged_id) {
        return Ok(MoveOutcome::Noop);
    }
    if let Some(target_id) = zone.target_id {
        if !forest.contains(target_id) {
            return Ok(MoveOutcome::Noop);
        }
        if is_ancestor(forest, dragged_id, target_id) {
            return Err(CoreError::Conflict(format!(
                "Cannot move menu {dragged_id} into its own children"
            )));
        }
    }

    let Some(detached) = extract(forest, dragged_id) else {
        return Ok(MoveOutcome::Noop);
    };
    insert(forest, detached, zone.target_id, zone.position);

    let expanded = match (zone.position, zone.target_id) {
        (DropPosition::Inside, Some(target)) => Some(target),
        _ => None,
    };
    Ok(MoveOutcome::Moved { expanded })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
