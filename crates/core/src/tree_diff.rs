//! Change tracking between a baseline and an edited menu forest.
//!
//! Both forests are flattened to id-keyed records and compared per field;
//! the result is grouped into creates, updates, and deletes for the
//! persistence sink. Sibling order by itself never produces a change —
//! only the `sequence` values do.

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::forest::{MenuForest, MenuTree};
use crate::menu::{MenuItem, MenuStatus};
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Change records
// ---------------------------------------------------------------------------

/// Fields of one menu that differ from the baseline.
///
/// `menu_name` is always populated for identification (and doubles as the
/// new value when the name itself changed); every other field is present
/// only when it changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuChange {
    pub id: DbId,
    pub menu_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<DbId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MenuStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<i32>,
}

/// A menu present in the baseline but gone from the edited forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuDelete {
    pub id: DbId,
    pub menu_name: String,
}

/// The minimal difference between two forests, grouped for the sink.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub creates: Vec<MenuItem>,
    pub updates: Vec<MenuChange>,
    pub deletes: Vec<MenuDelete>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.creates.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }

    /// Total number of change records across all three groups.
    pub fn total(&self) -> usize {
        self.creates.len() + self.updates.len() + self.deletes.len()
    }
}

// ---------------------------------------------------------------------------
// Diff
// ---------------------------------------------------------------------------

/// Compare `current` against the `original` baseline.
///
/// Guarantees: `diff(x, x)` is empty for any forest `x`; reordering an
/// untouched sibling list without changing `sequence` values produces no
/// record.
pub fn diff(original: &MenuForest, current: &MenuForest) -> ChangeSet {
    let original_flat = original.flatten();
    let original_by_id: HashMap<DbId, &MenuItem> =
        original_flat.iter().map(|item| (item.id, item)).collect();

    let mut changes = ChangeSet::default();

    for item in current.flatten() {
        match original_by_id.get(&item.id) {
            None => changes.creates.push(item),
            Some(baseline) => {
                if let Some(update) = field_diff(baseline, &item) {
                    changes.updates.push(update);
                }
            }
        }
    }

    for item in &original_flat {
        if !current.contains(item.id) {
            changes.deletes.push(MenuDelete {
                id: item.id,
                menu_name: item.menu_name.clone(),
            });
        }
    }

    changes
}

fn field_diff(baseline: &MenuItem, current: &MenuItem) -> Option<MenuChange> {
    let mut change = MenuChange {
        id: current.id,
        menu_name: current.menu_name.clone(),
        parent_id: None,
        path: None,
        icon: None,
        status: None,
        sequence: None,
    };
    let mut changed = baseline.menu_name != current.menu_name;

    if baseline.parent_id != current.parent_id {
        change.parent_id = Some(current.parent_id);
        changed = true;
    }
    if baseline.path != current.path {
        change.path = Some(current.path.clone());
        changed = true;
    }
    if baseline.icon != current.icon {
        change.icon = Some(current.icon.clone());
        changed = true;
    }
    if baseline.status != current.status {
        change.status = Some(current.status);
        changed = true;
    }
    if baseline.sequence != current.sequence {
        change.sequence = Some(current.sequence);
        changed = true;
    }

    changed.then_some(change)
}

// ---------------------------------------------------------------------------
// Export envelope
// ---------------------------------------------------------------------------

/// Headline counts for a change-set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub total_changes: usize,
    pub creates: usize,
    pub updates: usize,
    pub deletes: usize,
}

/// Export payload: a timestamped change-set plus the full current
/// structure for reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeSetEnvelope {
    pub generated_at: Timestamp,
    pub summary: ChangeSummary,
    pub changes: ChangeSet,
    pub full_structure: Vec<MenuTree>,
}

impl ChangeSetEnvelope {
    pub fn new(changes: ChangeSet, full_structure: Vec<MenuTree>) -> Self {
        Self {
            generated_at: Utc::now(),
            summary: ChangeSummary {
                total_changes: changes.total(),
                creates: changes.creates.len(),
                updates: changes.updates.len(),
                deletes: changes.deletes.len(),
            },
            changes,
            full_structure,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
