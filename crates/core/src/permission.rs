//! Role permission tree: cascade and aggregation.
//!
//! Toggling a flag on a node overwrites that flag on the node and every
//! descendant, then every ancestor is recomputed as the OR of its
//! children. Two passes, no fixed-point iteration: OR-of-children is
//! monotonic and the tree has finite depth.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

/// One of the four CRUD permission flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionKind {
    CanCreate,
    CanRead,
    CanUpdate,
    CanDelete,
}

impl PermissionKind {
    /// All four flags, in wire order.
    pub const ALL: [PermissionKind; 4] = [
        Self::CanCreate,
        Self::CanRead,
        Self::CanUpdate,
        Self::CanDelete,
    ];

    /// Wire/field name for the flag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CanCreate => "can_create",
            Self::CanRead => "can_read",
            Self::CanUpdate => "can_update",
            Self::CanDelete => "can_delete",
        }
    }
}

/// The four CRUD flags carried by every permission node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    pub can_create: bool,
    pub can_read: bool,
    pub can_update: bool,
    pub can_delete: bool,
}

impl PermissionSet {
    /// All four flags off.
    pub const NONE: PermissionSet = PermissionSet {
        can_create: false,
        can_read: false,
        can_update: false,
        can_delete: false,
    };

    /// Broadcast one value to all four flags.
    pub fn splat(value: bool) -> Self {
        Self {
            can_create: value,
            can_read: value,
            can_update: value,
            can_delete: value,
        }
    }

    pub fn get(&self, kind: PermissionKind) -> bool {
        match kind {
            PermissionKind::CanCreate => self.can_create,
            PermissionKind::CanRead => self.can_read,
            PermissionKind::CanUpdate => self.can_update,
            PermissionKind::CanDelete => self.can_delete,
        }
    }

    pub fn set(&mut self, kind: PermissionKind, value: bool) {
        match kind {
            PermissionKind::CanCreate => self.can_create = value,
            PermissionKind::CanRead => self.can_read = value,
            PermissionKind::CanUpdate => self.can_update = value,
            PermissionKind::CanDelete => self.can_delete = value,
        }
    }

    /// `true` iff every flag is set.
    pub fn all(&self) -> bool {
        self.can_create && self.can_read && self.can_update && self.can_delete
    }

    /// `true` iff any flag is set.
    pub fn any(&self) -> bool {
        self.can_create || self.can_read || self.can_update || self.can_delete
    }

    /// Flag-wise OR.
    pub fn or(self, other: Self) -> Self {
        Self {
            can_create: self.can_create || other.can_create,
            can_read: self.can_read || other.can_read,
            can_update: self.can_update || other.can_update,
            can_delete: self.can_delete || other.can_delete,
        }
    }
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

/// A node in a permission tree.
///
/// `is_expanded` is display state only; it takes no part in aggregation
/// or change detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionNode {
    pub id: DbId,
    pub name: String,
    pub permissions: PermissionSet,
    #[serde(default)]
    pub is_expanded: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PermissionNode>,
}

impl PermissionNode {
    /// A childless node with every flag off.
    pub fn leaf(id: DbId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            permissions: PermissionSet::NONE,
            is_expanded: false,
            children: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Propagation
// ---------------------------------------------------------------------------

/// Flip `kind` on the node `id`, overwrite the new value on its whole
/// subtree, then re-aggregate every ancestor. Returns `false` (and leaves
/// the forest untouched) when the id is absent.
pub fn toggle_permission(nodes: &mut [PermissionNode], id: DbId, kind: PermissionKind) -> bool {
    let found = toggle_at(nodes, id, kind);
    if found {
        sync_parent_permissions(nodes);
    }
    found
}

/// Flip all four flags on the node `id` at once: the new value is the
/// negation of "all four set", broadcast to every flag, cascaded and
/// re-aggregated exactly like [`toggle_permission`].
pub fn toggle_all_permissions(nodes: &mut [PermissionNode], id: DbId) -> bool {
    let found = toggle_all_at(nodes, id);
    if found {
        sync_parent_permissions(nodes);
    }
    found
}

/// Recompute every non-leaf node's flags as the OR of its children,
/// bottom-up. Leaves are untouched.
pub fn sync_parent_permissions(nodes: &mut [PermissionNode]) {
    for node in nodes {
        if node.children.is_empty() {
            continue;
        }
        sync_parent_permissions(&mut node.children);
        node.permissions = node
            .children
            .iter()
            .fold(PermissionSet::NONE, |acc, child| acc.or(child.permissions));
    }
}

/// Flip `is_expanded` on the node `id`. No propagation.
pub fn toggle_expanded(nodes: &mut [PermissionNode], id: DbId) -> bool {
    for node in nodes {
        if node.id == id {
            node.is_expanded = !node.is_expanded;
            return true;
        }
        if toggle_expanded(&mut node.children, id) {
            return true;
        }
    }
    false
}

/// Post-hoc invariant check: every non-leaf node's flags equal the OR of
/// its direct children's flags, at every depth.
pub fn aggregation_holds(nodes: &[PermissionNode]) -> bool {
    nodes.iter().all(|node| {
        if node.children.is_empty() {
            return true;
        }
        let expected = node
            .children
            .iter()
            .fold(PermissionSet::NONE, |acc, child| acc.or(child.permissions));
        node.permissions == expected && aggregation_holds(&node.children)
    })
}

fn toggle_at(nodes: &mut [PermissionNode], id: DbId, kind: PermissionKind) -> bool {
    for node in nodes {
        if node.id == id {
            let value = !node.permissions.get(kind);
            cascade_flag(node, kind, value);
            return true;
        }
        if toggle_at(&mut node.children, id, kind) {
            return true;
        }
    }
    false
}

fn toggle_all_at(nodes: &mut [PermissionNode], id: DbId) -> bool {
    for node in nodes {
        if node.id == id {
            let value = !node.permissions.all();
            cascade_set(node, PermissionSet::splat(value));
            return true;
        }
        if toggle_all_at(&mut node.children, id) {
            return true;
        }
    }
    false
}

fn cascade_flag(node: &mut PermissionNode, kind: PermissionKind, value: bool) {
    node.permissions.set(kind, value);
    for child in &mut node.children {
        cascade_flag(child, kind, value);
    }
}

fn cascade_set(node: &mut PermissionNode, permissions: PermissionSet) {
    node.permissions = permissions;
    for child in &mut node.children {
        cascade_set(child, permissions);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
