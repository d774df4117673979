//! Collaborator contracts for the session layer.
//!
//! The editors never perform I/O themselves: they call these traits and
//! operate on the returned values. Implementations belong to the
//! embedding application (HTTP client, test fake, …); past these seams
//! the wire format is not the session's concern.

use std::future::Future;

use backoffice_core::error::CoreError;
use backoffice_core::menu::{MenuItem, MenuStatus};
use backoffice_core::role::{RolePayload, RoleRecord, ServiceRecord};
use backoffice_core::tree_diff::ChangeSet;
use backoffice_core::types::DbId;
use serde::{Deserialize, Serialize};

/// List filter accepted by the menu source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MenuStatus>,
}

/// Supplies the flat menu list the editors nest into a forest.
pub trait MenuSource: Send + Sync {
    fn fetch_menus(
        &self,
        query: &MenuQuery,
    ) -> impl Future<Output = Result<Vec<MenuItem>, CoreError>> + Send;
}

/// Applies a menu change-set remotely.
pub trait ChangeSink: Send + Sync {
    fn apply(&self, changes: &ChangeSet) -> impl Future<Output = Result<(), CoreError>> + Send;
}

/// Supplies service rows and stored roles for the role editor.
pub trait RoleSource: Send + Sync {
    fn fetch_services(&self) -> impl Future<Output = Result<Vec<ServiceRecord>, CoreError>> + Send;

    fn fetch_role(&self, id: DbId) -> impl Future<Output = Result<RoleRecord, CoreError>> + Send;
}

/// Persists role payloads. `create_role` returns the new role's id.
pub trait RoleSink: Send + Sync {
    fn create_role(
        &self,
        payload: &RolePayload,
    ) -> impl Future<Output = Result<DbId, CoreError>> + Send;

    fn update_role(
        &self,
        id: DbId,
        payload: &RolePayload,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;
}
