//! Shared fixtures for session integration tests: a canned menu list and
//! in-memory fakes for every collaborator trait.

use std::sync::Mutex;

use backoffice_core::error::CoreError;
use backoffice_core::menu::{MenuItem, MenuStatus};
use backoffice_core::role::{RolePayload, RoleRecord, ServiceRecord};
use backoffice_core::tree_diff::ChangeSet;
use backoffice_core::types::DbId;
use backoffice_session::source::{ChangeSink, MenuQuery, MenuSource, RoleSink, RoleSource};

pub fn menu(id: DbId, parent_id: DbId, name: &str, sequence: i32) -> MenuItem {
    MenuItem {
        id,
        parent_id,
        menu_name: name.into(),
        path: format!("/{}", name.to_lowercase()),
        icon: String::new(),
        status: MenuStatus::Active,
        sequence,
    }
}

/// `[Settings(1){Users(2),Roles(3)}, Reports(4)]`
pub fn sample_menus() -> Vec<MenuItem> {
    vec![
        menu(1, 0, "Settings", 0),
        menu(2, 1, "Users", 0),
        menu(3, 1, "Roles", 1),
        menu(4, 0, "Reports", 1),
    ]
}

// ---------------------------------------------------------------------------
// Menu collaborators
// ---------------------------------------------------------------------------

pub struct FakeMenuSource {
    pub menus: Vec<MenuItem>,
}

impl FakeMenuSource {
    pub fn new(menus: Vec<MenuItem>) -> Self {
        Self { menus }
    }
}

impl MenuSource for FakeMenuSource {
    async fn fetch_menus(&self, query: &MenuQuery) -> Result<Vec<MenuItem>, CoreError> {
        let matches = |item: &MenuItem| {
            let search_ok = query
                .search
                .as_deref()
                .map_or(true, |needle| item.menu_name.contains(needle));
            let status_ok = query.status.map_or(true, |status| item.status == status);
            search_ok && status_ok
        };
        Ok(self.menus.iter().filter(|m| matches(m)).cloned().collect())
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub fail: bool,
    pub applied: Mutex<Vec<ChangeSet>>,
}

impl RecordingSink {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn applied(&self) -> Vec<ChangeSet> {
        self.applied.lock().unwrap().clone()
    }
}

impl ChangeSink for RecordingSink {
    async fn apply(&self, changes: &ChangeSet) -> Result<(), CoreError> {
        if self.fail {
            return Err(CoreError::Internal("change sink unavailable".to_string()));
        }
        self.applied.lock().unwrap().push(changes.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Role collaborators
// ---------------------------------------------------------------------------

pub struct FakeRoleSource {
    pub services: Vec<ServiceRecord>,
    pub role: Option<RoleRecord>,
}

impl FakeRoleSource {
    pub fn new(services: Vec<ServiceRecord>, role: Option<RoleRecord>) -> Self {
        Self { services, role }
    }
}

impl RoleSource for FakeRoleSource {
    async fn fetch_services(&self) -> Result<Vec<ServiceRecord>, CoreError> {
        Ok(self.services.clone())
    }

    async fn fetch_role(&self, id: DbId) -> Result<RoleRecord, CoreError> {
        self.role
            .clone()
            .filter(|role| role.id == id)
            .ok_or(CoreError::NotFound { entity: "role", id })
    }
}

#[derive(Default)]
pub struct RecordingRoleSink {
    pub next_id: DbId,
    pub created: Mutex<Vec<RolePayload>>,
    pub updated: Mutex<Vec<(DbId, RolePayload)>>,
}

impl RecordingRoleSink {
    pub fn with_next_id(next_id: DbId) -> Self {
        Self {
            next_id,
            ..Self::default()
        }
    }
}

impl RoleSink for RecordingRoleSink {
    async fn create_role(&self, payload: &RolePayload) -> Result<DbId, CoreError> {
        self.created.lock().unwrap().push(payload.clone());
        Ok(self.next_id)
    }

    async fn update_role(&self, id: DbId, payload: &RolePayload) -> Result<(), CoreError> {
        self.updated.lock().unwrap().push((id, payload.clone()));
        Ok(())
    }
}
