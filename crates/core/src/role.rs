//! Role editor domain: permission categories, grant payloads, and the
//! changed-only submit collection.
//!
//! A role grants CRUD flags over two trees: the flat service list and the
//! nested menu hierarchy. Both are edited as [`PermissionNode`] forests;
//! submission sends only the entries whose flags differ from the loaded
//! baseline.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::forest::{MenuForest, MenuTree};
use crate::menu::MenuItem;
use crate::permission::{PermissionNode, PermissionSet};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum allowed length for a role name.
pub const MAX_ROLE_NAME_LENGTH: usize = 100;

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// The two permission trees a role grants access over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionCategory {
    Services,
    Menus,
}

impl PermissionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Services => "services",
            Self::Menus => "menus",
        }
    }
}

/// Both permission categories of one role editor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePermissions {
    pub services: Vec<PermissionNode>,
    pub menus: Vec<PermissionNode>,
}

impl RolePermissions {
    pub fn category(&self, category: PermissionCategory) -> &Vec<PermissionNode> {
        match category {
            PermissionCategory::Services => &self.services,
            PermissionCategory::Menus => &self.menus,
        }
    }

    pub fn category_mut(&mut self, category: PermissionCategory) -> &mut Vec<PermissionNode> {
        match category {
            PermissionCategory::Services => &mut self.services,
            PermissionCategory::Menus => &mut self.menus,
        }
    }
}

// ---------------------------------------------------------------------------
// Form and wire shapes
// ---------------------------------------------------------------------------

/// Role editor form fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleForm {
    pub role_name: String,
    pub role_description: String,
    pub scope_id: Option<DbId>,
    pub status_active: bool,
}

impl Default for RoleForm {
    fn default() -> Self {
        Self {
            role_name: String::new(),
            role_description: String::new(),
            scope_id: None,
            status_active: true,
        }
    }
}

/// A service row as supplied by the service source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub id: DbId,
    pub service_name: String,
}

/// A stored or submitted service permission entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceGrant {
    pub service_id: DbId,
    pub service_name: String,
    #[serde(flatten)]
    pub permissions: PermissionSet,
}

/// A stored or submitted menu permission entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuGrant {
    pub menu_id: DbId,
    #[serde(flatten)]
    pub permissions: PermissionSet,
}

/// A stored role with its grants, as supplied by the role source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub id: DbId,
    pub role_name: String,
    #[serde(default)]
    pub scope_id: Option<DbId>,
    #[serde(default)]
    pub services: Vec<ServiceGrant>,
    #[serde(default)]
    pub menus: Vec<MenuGrant>,
}

/// Submit payload: form fields plus only the grants that changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePayload {
    pub role_name: String,
    pub scope_id: DbId,
    pub services: Vec<ServiceGrant>,
    pub menus: Vec<MenuGrant>,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a role name: non-empty, trimmed, within
/// [`MAX_ROLE_NAME_LENGTH`].
pub fn validate_role_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Role name must not be empty".to_string(),
        ));
    }
    if trimmed.len() != name.len() {
        return Err(CoreError::Validation(
            "Role name must not have leading or trailing whitespace".to_string(),
        ));
    }
    if name.len() > MAX_ROLE_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Role name must not exceed {MAX_ROLE_NAME_LENGTH} characters, got {}",
            name.len()
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Mapping into permission trees
// ---------------------------------------------------------------------------

/// Expansion policy applied when menus are mapped into a permission tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandPolicy {
    /// Every node starts collapsed.
    Collapsed,
    /// Nodes with children start expanded.
    WhenHasChildren,
}

/// Map service rows to childless permission nodes with every flag off.
/// Service names are displayed upper-cased.
pub fn services_to_permission_nodes(services: &[ServiceRecord]) -> Vec<PermissionNode> {
    services
        .iter()
        .map(|service| PermissionNode::leaf(service.id, service.service_name.to_uppercase()))
        .collect()
}

/// Nest flat menu records and map them to permission nodes with every
/// flag off.
pub fn menus_to_permission_nodes(menus: Vec<MenuItem>, policy: ExpandPolicy) -> Vec<PermissionNode> {
    let forest = MenuForest::from_flat(menus);
    forest
        .to_tree()
        .into_iter()
        .map(|tree| tree_to_permission_node(tree, policy))
        .collect()
}

fn tree_to_permission_node(tree: MenuTree, policy: ExpandPolicy) -> PermissionNode {
    let is_expanded = match policy {
        ExpandPolicy::Collapsed => false,
        ExpandPolicy::WhenHasChildren => !tree.children.is_empty(),
    };
    PermissionNode {
        id: tree.item.id,
        name: tree.item.menu_name,
        permissions: PermissionSet::NONE,
        is_expanded,
        children: tree
            .children
            .into_iter()
            .map(|child| tree_to_permission_node(child, policy))
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Grant overlay
// ---------------------------------------------------------------------------

/// Overlay stored service grants onto permission nodes by id. Ids without
/// a grant keep their current flags.
pub fn apply_service_grants(nodes: &mut [PermissionNode], grants: &[ServiceGrant]) {
    let by_id: HashMap<DbId, PermissionSet> = grants
        .iter()
        .map(|grant| (grant.service_id, grant.permissions))
        .collect();
    apply_grants(nodes, &by_id);
}

/// Overlay stored menu grants onto permission nodes by id, at any depth.
/// Callers re-aggregate parents afterwards.
pub fn apply_menu_grants(nodes: &mut [PermissionNode], grants: &[MenuGrant]) {
    let by_id: HashMap<DbId, PermissionSet> = grants
        .iter()
        .map(|grant| (grant.menu_id, grant.permissions))
        .collect();
    apply_grants(nodes, &by_id);
}

fn apply_grants(nodes: &mut [PermissionNode], by_id: &HashMap<DbId, PermissionSet>) {
    for node in nodes {
        if let Some(&permissions) = by_id.get(&node.id) {
            node.permissions = permissions;
        }
        apply_grants(&mut node.children, by_id);
    }
}

// ---------------------------------------------------------------------------
// Changed-only collection
// ---------------------------------------------------------------------------

/// Service entries whose flags differ from the baseline. Entries missing
/// from the baseline are always collected.
pub fn changed_service_grants(
    current: &[PermissionNode],
    original: &[PermissionNode],
) -> Vec<ServiceGrant> {
    collect_changed(current, original)
        .into_iter()
        .map(|node| ServiceGrant {
            service_id: node.id,
            service_name: node.name.clone(),
            permissions: node.permissions,
        })
        .collect()
}

/// Menu entries whose flags differ from the baseline, collected at every
/// depth.
pub fn changed_menu_grants(
    current: &[PermissionNode],
    original: &[PermissionNode],
) -> Vec<MenuGrant> {
    collect_changed(current, original)
        .into_iter()
        .map(|node| MenuGrant {
            menu_id: node.id,
            permissions: node.permissions,
        })
        .collect()
}

fn collect_changed<'a>(
    current: &'a [PermissionNode],
    original: &[PermissionNode],
) -> Vec<&'a PermissionNode> {
    let mut baseline: HashMap<DbId, PermissionSet> = HashMap::new();
    index_permissions(original, &mut baseline);

    let mut changed = Vec::new();
    collect_into(current, &baseline, &mut changed);
    changed
}

fn index_permissions(nodes: &[PermissionNode], into: &mut HashMap<DbId, PermissionSet>) {
    for node in nodes {
        into.insert(node.id, node.permissions);
        index_permissions(&node.children, into);
    }
}

fn collect_into<'a>(
    nodes: &'a [PermissionNode],
    baseline: &HashMap<DbId, PermissionSet>,
    into: &mut Vec<&'a PermissionNode>,
) {
    for node in nodes {
        match baseline.get(&node.id) {
            Some(&original) if original == node.permissions => {}
            _ => into.push(node),
        }
        collect_into(&node.children, baseline, into);
    }
}

/// Build the submit payload from the form and the changed grants.
pub fn build_role_payload(
    form: &RoleForm,
    current: &RolePermissions,
    original: &RolePermissions,
) -> RolePayload {
    RolePayload {
        role_name: form.role_name.clone(),
        scope_id: form.scope_id.unwrap_or(0),
        services: changed_service_grants(&current.services, &original.services),
        menus: changed_menu_grants(&current.menus, &original.menus),
    }
}

// ---------------------------------------------------------------------------
// Navigation feed
// ---------------------------------------------------------------------------

/// Prune a permission tree down to nodes with `can_read`, at every depth.
/// An unreadable parent drops its whole subtree.
pub fn readable_menus(nodes: &[PermissionNode]) -> Vec<PermissionNode> {
    nodes
        .iter()
        .filter(|node| node.permissions.can_read)
        .map(|node| PermissionNode {
            children: readable_menus(&node.children),
            ..node.clone()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
