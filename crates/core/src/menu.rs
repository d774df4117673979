//! Menu entity model and field validation.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Parent id carried by root-level menus.
pub const ROOT_PARENT_ID: DbId = 0;

/// Maximum allowed length for a menu name.
pub const MAX_MENU_NAME_LENGTH: usize = 100;

/// Maximum allowed length for a menu path.
pub const MAX_MENU_PATH_LENGTH: usize = 255;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Active/inactive flag, stored as `"A"` / `"I"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MenuStatus {
    #[serde(rename = "A")]
    Active,
    #[serde(rename = "I")]
    Inactive,
}

impl MenuStatus {
    /// Parse a status string from the wire.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "A" => Ok(Self::Active),
            "I" => Ok(Self::Inactive),
            _ => Err(CoreError::Validation(format!(
                "Invalid menu status '{s}'. Must be one of: A, I"
            ))),
        }
    }

    /// Convert to the wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "A",
            Self::Inactive => "I",
        }
    }
}

// ---------------------------------------------------------------------------
// Menu record
// ---------------------------------------------------------------------------

/// A single menu record as supplied by the tree source.
///
/// `parent_id == 0` marks a root-level menu. `sequence` orders a node
/// within its sibling list and is renumbered to `0..n-1` whenever that
/// list is touched by a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: DbId,
    pub parent_id: DbId,
    pub menu_name: String,
    pub path: String,
    pub icon: String,
    pub status: MenuStatus,
    pub sequence: i32,
}

impl MenuItem {
    /// Returns `true` if this record sits at the root level.
    pub fn is_root(&self) -> bool {
        self.parent_id == ROOT_PARENT_ID
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a menu name: non-empty, trimmed, and within
/// [`MAX_MENU_NAME_LENGTH`].
pub fn validate_menu_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Menu name must not be empty".to_string(),
        ));
    }
    if trimmed.len() != name.len() {
        return Err(CoreError::Validation(
            "Menu name must not have leading or trailing whitespace".to_string(),
        ));
    }
    if name.len() > MAX_MENU_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Menu name must not exceed {MAX_MENU_NAME_LENGTH} characters, got {}",
            name.len()
        )));
    }
    Ok(())
}

/// Validate a menu path. Paths are free-form (the placeholder `"#"` is
/// common for container menus) but length-capped.
pub fn validate_menu_path(path: &str) -> Result<(), CoreError> {
    if path.len() > MAX_MENU_PATH_LENGTH {
        return Err(CoreError::Validation(format!(
            "Menu path must not exceed {MAX_MENU_PATH_LENGTH} characters, got {}",
            path.len()
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
