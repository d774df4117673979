//! Arena representation of the menu hierarchy.
//!
//! The forest keeps a flat id-indexed map of records plus explicit
//! ordered child-id lists, so ancestor checks walk `parent_id` links in
//! O(depth) and reparenting never clones untouched subtrees. A nested
//! [`MenuTree`] view is built on demand for snapshots and serialization.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::menu::{MenuItem, ROOT_PARENT_ID};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// MenuForest
// ---------------------------------------------------------------------------

/// A menu hierarchy held as a flat arena.
///
/// Invariants: `roots` and the `children` lists carry sibling order;
/// every id in them has a record in `nodes`; each record's `parent_id`
/// agrees with the list that contains it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MenuForest {
    pub(crate) nodes: HashMap<DbId, MenuItem>,
    pub(crate) children: HashMap<DbId, Vec<DbId>>,
    pub(crate) roots: Vec<DbId>,
}

impl MenuForest {
    /// Nest a flat record list by `parent_id`.
    ///
    /// Edge cases, all adopted as roots: `parent_id == 0`, a record whose
    /// parent is itself, and a record whose parent is absent from the
    /// list. Adopted records get `parent_id` rewritten to 0 so ancestor
    /// walks stay well-founded. Each sibling list is sorted by `sequence`
    /// (stable, ties keep input order) and then renumbered to `0..n-1`.
    /// A duplicated id keeps the last record.
    pub fn from_flat(records: Vec<MenuItem>) -> Self {
        let mut nodes: HashMap<DbId, MenuItem> = HashMap::with_capacity(records.len());
        let mut order: Vec<DbId> = Vec::with_capacity(records.len());
        for record in records {
            let id = record.id;
            if nodes.insert(id, record).is_none() {
                order.push(id);
            }
        }

        let mut forest = MenuForest {
            nodes,
            children: HashMap::new(),
            roots: Vec::new(),
        };

        for id in order {
            let parent_id = match forest.nodes.get(&id) {
                Some(node) => node.parent_id,
                None => continue,
            };
            let is_root = parent_id == ROOT_PARENT_ID
                || parent_id == id
                || !forest.nodes.contains_key(&parent_id);
            if is_root {
                if let Some(node) = forest.nodes.get_mut(&id) {
                    node.parent_id = ROOT_PARENT_ID;
                }
                forest.roots.push(id);
            } else {
                forest.children.entry(parent_id).or_default().push(id);
            }
        }

        forest.sort_siblings_by_sequence();
        forest.normalize_all_sequences();
        forest
    }

    /// Number of nodes in the forest.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: DbId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: DbId) -> Option<&MenuItem> {
        self.nodes.get(&id)
    }

    /// Ordered root-level ids.
    pub fn roots(&self) -> &[DbId] {
        &self.roots
    }

    /// Ordered child ids of `id` (empty for leaves and unknown ids).
    pub fn children_of(&self, id: DbId) -> &[DbId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Build the owned nested view, in sibling order.
    pub fn to_tree(&self) -> Vec<MenuTree> {
        self.roots
            .iter()
            .filter_map(|&id| self.subtree(id))
            .collect()
    }

    /// Flatten back to records, depth-first in sibling order.
    pub fn flatten(&self) -> Vec<MenuItem> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for &id in &self.roots {
            self.flatten_into(id, &mut out);
        }
        out
    }

    /// Remove a childless node from the forest. Siblings are not
    /// renumbered. Returns `false` when the node is missing or still has
    /// children.
    pub fn remove_leaf(&mut self, id: DbId) -> bool {
        if !self.children_of(id).is_empty() {
            return false;
        }
        let parent_id = match self.nodes.get(&id) {
            Some(node) => node.parent_id,
            None => return false,
        };
        self.detach_from_siblings(parent_id, id);
        self.children.remove(&id);
        self.nodes.remove(&id);
        true
    }

    // -- crate-internal plumbing for the reconciler -------------------------

    pub(crate) fn get_mut(&mut self, id: DbId) -> Option<&mut MenuItem> {
        self.nodes.get_mut(&id)
    }

    pub(crate) fn sibling_list_mut(&mut self, parent_id: DbId) -> &mut Vec<DbId> {
        if parent_id == ROOT_PARENT_ID {
            &mut self.roots
        } else {
            self.children.entry(parent_id).or_default()
        }
    }

    /// Drop `id` from its parent's list. An emptied child list is removed
    /// outright so forests that never had the entry compare equal.
    pub(crate) fn detach_from_siblings(&mut self, parent_id: DbId, id: DbId) {
        if parent_id == ROOT_PARENT_ID {
            self.roots.retain(|&sib| sib != id);
        } else if let Some(list) = self.children.get_mut(&parent_id) {
            list.retain(|&sib| sib != id);
            if list.is_empty() {
                self.children.remove(&parent_id);
            }
        }
    }

    /// Renumber one sibling list to `0..n-1` in list order.
    pub(crate) fn normalize_sequences(&mut self, parent_id: DbId) {
        let ids: Vec<DbId> = if parent_id == ROOT_PARENT_ID {
            self.roots.clone()
        } else {
            self.children.get(&parent_id).cloned().unwrap_or_default()
        };
        for (index, id) in ids.into_iter().enumerate() {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.sequence = index as i32;
            }
        }
    }

    fn normalize_all_sequences(&mut self) {
        self.normalize_sequences(ROOT_PARENT_ID);
        let parents: Vec<DbId> = self.children.keys().copied().collect();
        for parent_id in parents {
            self.normalize_sequences(parent_id);
        }
    }

    fn sort_siblings_by_sequence(&mut self) {
        let nodes = &self.nodes;
        let by_sequence = |&id: &DbId| nodes.get(&id).map(|n| n.sequence).unwrap_or(0);
        self.roots.sort_by_key(by_sequence);
        for list in self.children.values_mut() {
            list.sort_by_key(|&id| nodes.get(&id).map(|n| n.sequence).unwrap_or(0));
        }
    }

    fn subtree(&self, id: DbId) -> Option<MenuTree> {
        let item = self.nodes.get(&id)?.clone();
        let children = self
            .children
            .get(&id)
            .map(|ids| ids.iter().filter_map(|&cid| self.subtree(cid)).collect())
            .unwrap_or_default();
        Some(MenuTree { item, children })
    }

    fn flatten_into(&self, id: DbId, out: &mut Vec<MenuItem>) {
        if let Some(node) = self.nodes.get(&id) {
            out.push(node.clone());
        }
        for &child in self.children_of(id) {
            self.flatten_into(child, out);
        }
    }
}

// ---------------------------------------------------------------------------
// MenuTree
// ---------------------------------------------------------------------------

/// Owned nested view of a forest, used for snapshots and serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuTree {
    #[serde(flatten)]
    pub item: MenuItem,
    #[serde(default)]
    pub children: Vec<MenuTree>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
