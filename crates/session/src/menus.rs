//! Menu tree editing session: load, drag-and-drop, pending deletes, save.
//!
//! The editor holds two forests: the baseline snapshot taken at load time
//! and the working copy every gesture mutates. Deletions are only marks
//! until [`MenuEditor::save`]; a save diffs the (deletion-applied)
//! working copy against the baseline, hands the change-set to the sink,
//! and re-baselines only after the sink succeeds.

use std::collections::HashSet;

use backoffice_core::error::CoreError;
use backoffice_core::forest::{MenuForest, MenuTree};
use backoffice_core::menu::MenuItem;
use backoffice_core::reconcile::{self, DropZone, MoveOutcome};
use backoffice_core::tree_diff::{self, ChangeSet, ChangeSetEnvelope};
use backoffice_core::types::DbId;
use tracing::{debug, info, warn};

use crate::source::{ChangeSink, MenuQuery, MenuSource};

/// Result of [`MenuEditor::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Nothing differed from the baseline; the sink was not called.
    NoChanges,
    /// The change-set was applied and the session re-baselined.
    Saved(ChangeSet),
}

/// Session-scoped state for the drag-and-drop menu editor.
#[derive(Debug, Default)]
pub struct MenuEditor {
    original: MenuForest,
    working: MenuForest,
    expanded: HashSet<DbId>,
    pending_delete: HashSet<DbId>,
    dragged: Option<DbId>,
    drop_zone: Option<DropZone>,
    reorder_mode: bool,
}

impl MenuEditor {
    pub fn new() -> Self {
        Self::default()
    }

    // -- loading ------------------------------------------------------------

    /// Fetch the flat list from the source and seed the session.
    pub async fn load(
        &mut self,
        source: &impl MenuSource,
        query: &MenuQuery,
    ) -> Result<(), CoreError> {
        let records = source.fetch_menus(query).await?;
        info!(count = records.len(), "loaded menu tree");
        self.load_records(records);
        Ok(())
    }

    /// Seed the session from an already-fetched flat list. The nested
    /// forest becomes both the working copy and the baseline; all marks
    /// and drag state are cleared.
    pub fn load_records(&mut self, records: Vec<MenuItem>) {
        self.working = MenuForest::from_flat(records);
        self.original = self.working.clone();
        self.expanded.clear();
        self.pending_delete.clear();
        self.dragged = None;
        self.drop_zone = None;
    }

    // -- views --------------------------------------------------------------

    /// The working forest.
    pub fn forest(&self) -> &MenuForest {
        &self.working
    }

    /// Nested view of the working forest.
    pub fn tree(&self) -> Vec<MenuTree> {
        self.working.to_tree()
    }

    // -- reorder mode and expansion -----------------------------------------

    pub fn reorder_mode(&self) -> bool {
        self.reorder_mode
    }

    /// Enter or leave reorder mode. Leaving aborts any drag in flight.
    pub fn set_reorder_mode(&mut self, on: bool) {
        self.reorder_mode = on;
        if !on {
            self.cancel_drag();
        }
    }

    pub fn is_expanded(&self, id: DbId) -> bool {
        self.expanded.contains(&id)
    }

    pub fn toggle_expanded(&mut self, id: DbId) {
        if !self.expanded.remove(&id) {
            self.expanded.insert(id);
        }
    }

    // -- drag lifecycle -----------------------------------------------------

    /// Begin dragging `id`. Ignored outside reorder mode or for unknown
    /// ids; returns whether a drag actually started.
    pub fn begin_drag(&mut self, id: DbId) -> bool {
        if !self.reorder_mode || !self.working.contains(id) {
            return false;
        }
        self.dragged = Some(id);
        true
    }

    pub fn dragged(&self) -> Option<DbId> {
        self.dragged
    }

    pub fn drop_zone(&self) -> Option<DropZone> {
        self.drop_zone
    }

    /// Track the zone currently hovered. `None` clears it (drag left the
    /// zone).
    pub fn set_drop_zone(&mut self, zone: Option<DropZone>) {
        self.drop_zone = zone;
    }

    /// Abort the drag: drop target cleared, tree unchanged.
    pub fn cancel_drag(&mut self) {
        self.dragged = None;
        self.drop_zone = None;
    }

    /// Complete the drag onto `zone`.
    ///
    /// Cycle-producing drops return [`CoreError::Conflict`] with the tree
    /// untouched. Drag state is consumed either way. A successful
    /// `Inside` drop marks the target expanded.
    pub fn drop_on(&mut self, zone: DropZone) -> Result<MoveOutcome, CoreError> {
        let Some(dragged) = self.dragged.take() else {
            self.drop_zone = None;
            return Ok(MoveOutcome::Noop);
        };
        self.drop_zone = None;

        match reconcile::move_item(&mut self.working, dragged, zone) {
            Ok(MoveOutcome::Moved { expanded }) => {
                if let Some(target) = expanded {
                    self.expanded.insert(target);
                }
                Ok(MoveOutcome::Moved { expanded })
            }
            Ok(MoveOutcome::Noop) => Ok(MoveOutcome::Noop),
            Err(err) => {
                warn!(dragged, error = %err, "rejected drop");
                Err(err)
            }
        }
    }

    // -- pending deletes ----------------------------------------------------

    /// Mark a menu for deletion on the next save.
    ///
    /// A menu that still has children is rejected; an id that is not in
    /// the working tree is a no-op. Sibling sequences stay untouched
    /// until the save applies the mark.
    pub fn mark_deleted(&mut self, id: DbId) -> Result<(), CoreError> {
        let Some(node) = self.working.get(id) else {
            debug!(id, "delete mark for unknown menu ignored");
            return Ok(());
        };
        let child_count = self.working.children_of(id).len();
        if child_count > 0 {
            return Err(CoreError::Validation(format!(
                "Cannot delete \"{}\" because it has {child_count} child menu(s). \
                 Delete the children first.",
                node.menu_name
            )));
        }
        self.pending_delete.insert(id);
        Ok(())
    }

    /// Discard a pending delete mark (modal dismissed).
    pub fn unmark_deleted(&mut self, id: DbId) {
        self.pending_delete.remove(&id);
    }

    pub fn is_marked_deleted(&self, id: DbId) -> bool {
        self.pending_delete.contains(&id)
    }

    // -- change tracking ----------------------------------------------------

    /// Number of changes the save button advertises: field/structure
    /// diffs plus pending delete marks.
    pub fn pending_change_count(&self) -> usize {
        tree_diff::diff(&self.original, &self.working).total() + self.pending_delete.len()
    }

    /// The change-set a save would send right now.
    pub fn pending_changes(&self) -> Result<ChangeSet, CoreError> {
        let scratch = self.apply_deletions()?;
        Ok(tree_diff::diff(&self.original, &scratch))
    }

    /// Export the current edits (pending delete marks not applied) as a
    /// timestamped envelope.
    pub fn export(&self) -> ChangeSetEnvelope {
        let changes = tree_diff::diff(&self.original, &self.working);
        ChangeSetEnvelope::new(changes, self.working.to_tree())
    }

    /// Restore the baseline snapshot and clear every mark.
    pub fn reset(&mut self) {
        self.working = self.original.clone();
        self.pending_delete.clear();
        self.cancel_drag();
    }

    /// Apply pending deletions, diff against the baseline, and hand the
    /// change-set to the sink.
    ///
    /// An empty diff returns [`SaveOutcome::NoChanges`] without touching
    /// the sink. The session re-baselines (and leaves reorder mode) only
    /// after the sink succeeds; on error every mark and both forests are
    /// left as they were.
    pub async fn save(&mut self, sink: &impl ChangeSink) -> Result<SaveOutcome, CoreError> {
        let scratch = self.apply_deletions()?;
        let changes = tree_diff::diff(&self.original, &scratch);
        if changes.is_empty() {
            debug!("no changes to save");
            return Ok(SaveOutcome::NoChanges);
        }

        sink.apply(&changes).await?;

        self.working = scratch;
        self.original = self.working.clone();
        self.pending_delete.clear();
        self.reorder_mode = false;
        info!(
            creates = changes.creates.len(),
            updates = changes.updates.len(),
            deletes = changes.deletes.len(),
            "saved menu changes"
        );
        Ok(SaveOutcome::Saved(changes))
    }

    fn apply_deletions(&self) -> Result<MenuForest, CoreError> {
        let mut scratch = self.working.clone();
        for &id in &self.pending_delete {
            if !scratch.contains(id) {
                continue;
            }
            if !scratch.remove_leaf(id) {
                // Children were dragged under the mark after it was set.
                let name = scratch
                    .get(id)
                    .map(|node| node.menu_name.clone())
                    .unwrap_or_default();
                return Err(CoreError::Validation(format!(
                    "Cannot delete \"{name}\" because it has child menu(s). \
                     Delete the children first."
                )));
            }
        }
        Ok(scratch)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
