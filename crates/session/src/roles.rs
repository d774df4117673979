//! Role editing session: form state, the two permission categories, and
//! changed-only submission.
//!
//! The editor owns a current and a baseline copy of both permission
//! trees. Loading a role overlays its stored grants and then
//! re-baselines, so an untouched editor submits an empty grant list and
//! every toggle afterwards is reported relative to the stored state.

use backoffice_core::error::CoreError;
use backoffice_core::menu::MenuItem;
use backoffice_core::permission::{self, PermissionKind, PermissionNode};
use backoffice_core::role::{
    self, ExpandPolicy, PermissionCategory, RoleForm, RolePayload, RolePermissions, ServiceRecord,
};
use backoffice_core::types::DbId;
use tracing::{debug, info};

use crate::source::{MenuQuery, MenuSource, RoleSink, RoleSource};

/// Session-scoped state for the role editor.
#[derive(Debug, Default)]
pub struct RoleEditor {
    form: RoleForm,
    permissions: RolePermissions,
    original: RolePermissions,
    role_id: Option<DbId>,
}

impl RoleEditor {
    pub fn new() -> Self {
        Self::default()
    }

    // -- loading ------------------------------------------------------------

    /// Fetch services and menus and seed both categories with every flag
    /// off. Used when creating a new role.
    pub async fn initialize(
        &mut self,
        roles: &impl RoleSource,
        menus: &impl MenuSource,
    ) -> Result<(), CoreError> {
        let services = roles.fetch_services().await?;
        let menu_records = menus.fetch_menus(&MenuQuery::default()).await?;
        info!(
            services = services.len(),
            menus = menu_records.len(),
            "initialized role editor"
        );
        self.seed(&services, menu_records);
        Ok(())
    }

    /// Initialize, then overlay the stored role's grants and re-baseline.
    pub async fn load_role(
        &mut self,
        roles: &impl RoleSource,
        menus: &impl MenuSource,
        id: DbId,
    ) -> Result<(), CoreError> {
        self.initialize(roles, menus).await?;
        let record = roles.fetch_role(id).await?;
        info!(role_id = record.id, "loaded role");

        self.form.role_name = record.role_name;
        self.form.scope_id = record.scope_id;

        role::apply_service_grants(&mut self.permissions.services, &record.services);
        role::apply_menu_grants(&mut self.permissions.menus, &record.menus);
        permission::sync_parent_permissions(&mut self.permissions.menus);

        self.original = self.permissions.clone();
        self.role_id = Some(record.id);
        Ok(())
    }

    /// Seed both categories from already-fetched rows.
    pub fn seed(&mut self, services: &[ServiceRecord], menu_records: Vec<MenuItem>) {
        self.permissions = RolePermissions {
            services: role::services_to_permission_nodes(services),
            menus: role::menus_to_permission_nodes(menu_records, ExpandPolicy::Collapsed),
        };
        self.original = self.permissions.clone();
        self.role_id = None;
    }

    // -- form ---------------------------------------------------------------

    pub fn form(&self) -> &RoleForm {
        &self.form
    }

    pub fn set_role_name(&mut self, name: impl Into<String>) {
        self.form.role_name = name.into();
    }

    pub fn set_role_description(&mut self, description: impl Into<String>) {
        self.form.role_description = description.into();
    }

    pub fn set_scope_id(&mut self, scope_id: Option<DbId>) {
        self.form.scope_id = scope_id;
    }

    pub fn set_status_active(&mut self, active: bool) {
        self.form.status_active = active;
    }

    // -- permission toggles -------------------------------------------------

    pub fn permissions(&self) -> &RolePermissions {
        &self.permissions
    }

    pub fn role_id(&self) -> Option<DbId> {
        self.role_id
    }

    /// Toggle one flag on one node of the given category; cascades and
    /// re-aggregates. Returns whether the id was found.
    pub fn toggle(&mut self, category: PermissionCategory, id: DbId, kind: PermissionKind) -> bool {
        let found = permission::toggle_permission(self.permissions.category_mut(category), id, kind);
        if !found {
            debug!(category = category.as_str(), id, "toggle target not found");
        }
        found
    }

    /// Toggle all four flags on one node of the given category.
    pub fn toggle_all(&mut self, category: PermissionCategory, id: DbId) -> bool {
        let found = permission::toggle_all_permissions(self.permissions.category_mut(category), id);
        if !found {
            debug!(category = category.as_str(), id, "toggle target not found");
        }
        found
    }

    /// Flip one node's expansion display state.
    pub fn toggle_expanded(&mut self, category: PermissionCategory, id: DbId) -> bool {
        permission::toggle_expanded(self.permissions.category_mut(category), id)
    }

    // -- outputs ------------------------------------------------------------

    /// The menu nodes the navigation sidebar may show: `can_read` only,
    /// pruned at every depth.
    pub fn readable_menus(&self) -> Vec<PermissionNode> {
        role::readable_menus(&self.permissions.menus)
    }

    /// The payload a submit would send right now: form fields plus only
    /// the grants that differ from the baseline.
    pub fn payload(&self) -> RolePayload {
        role::build_role_payload(&self.form, &self.permissions, &self.original)
    }

    /// Validate the form and persist the role: update when one is loaded,
    /// create otherwise. Re-baselines on success so a second submit sends
    /// an empty grant list.
    pub async fn submit(&mut self, sink: &impl RoleSink) -> Result<DbId, CoreError> {
        role::validate_role_name(&self.form.role_name)?;
        let payload = self.payload();

        let id = match self.role_id {
            Some(id) => {
                sink.update_role(id, &payload).await?;
                id
            }
            None => {
                let id = sink.create_role(&payload).await?;
                self.role_id = Some(id);
                id
            }
        };

        self.original = self.permissions.clone();
        info!(
            role_id = id,
            services = payload.services.len(),
            menus = payload.menus.len(),
            "submitted role"
        );
        Ok(id)
    }

    /// Back to a pristine editor: initial form, empty categories, no role.
    pub fn reset(&mut self) {
        self.form = RoleForm::default();
        self.permissions = RolePermissions::default();
        self.original = RolePermissions::default();
        self.role_id = None;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use backoffice_core::menu::MenuStatus;

    fn menu_record(id: DbId, parent_id: DbId, name: &str, sequence: i32) -> MenuItem {
        MenuItem {
            id,
            parent_id,
            menu_name: name.into(),
            path: String::new(),
            icon: String::new(),
            status: MenuStatus::Active,
            sequence,
        }
    }

    fn seeded() -> RoleEditor {
        let mut editor = RoleEditor::new();
        editor.seed(
            &[ServiceRecord {
                id: 10,
                service_name: "billing".into(),
            }],
            vec![
                menu_record(1, 0, "Settings", 0),
                menu_record(2, 1, "Users", 0),
            ],
        );
        editor
    }

    #[test]
    fn seed_starts_with_all_flags_off() {
        let editor = seeded();

        assert_eq!(editor.permissions().services.len(), 1);
        assert_eq!(editor.permissions().menus.len(), 1);
        assert!(editor.payload().services.is_empty());
        assert!(editor.payload().menus.is_empty());
    }

    #[test]
    fn toggle_dispatches_into_the_right_category() {
        let mut editor = seeded();

        assert!(editor.toggle(PermissionCategory::Services, 10, PermissionKind::CanRead));
        assert!(editor.permissions().services[0].permissions.can_read);
        // The same id does not exist under menus.
        assert!(!editor.toggle(PermissionCategory::Menus, 10, PermissionKind::CanRead));
    }

    #[test]
    fn payload_reports_only_toggled_entries() {
        let mut editor = seeded();
        editor.set_role_name("Auditor");
        editor.toggle(PermissionCategory::Menus, 2, PermissionKind::CanRead);

        let payload = editor.payload();

        assert!(payload.services.is_empty());
        // The toggled leaf and its re-aggregated parent.
        assert_eq!(payload.menus.len(), 2);
    }

    #[test]
    fn toggle_expanded_is_invisible_to_the_payload() {
        let mut editor = seeded();

        editor.toggle_expanded(PermissionCategory::Menus, 1);

        assert!(editor.permissions().menus[0].is_expanded);
        assert!(editor.payload().menus.is_empty());
    }

    #[test]
    fn readable_menus_follow_can_read() {
        let mut editor = seeded();
        assert!(editor.readable_menus().is_empty());

        editor.toggle(PermissionCategory::Menus, 2, PermissionKind::CanRead);

        let readable = editor.readable_menus();
        assert_eq!(readable.len(), 1);
        assert_eq!(readable[0].children.len(), 1);
    }

    #[test]
    fn reset_returns_to_pristine_state() {
        let mut editor = seeded();
        editor.set_role_name("Auditor");
        editor.toggle(PermissionCategory::Services, 10, PermissionKind::CanRead);

        editor.reset();

        assert_eq!(editor.form().role_name, "");
        assert!(editor.form().status_active);
        assert!(editor.permissions().services.is_empty());
        assert_eq!(editor.role_id(), None);
    }
}
