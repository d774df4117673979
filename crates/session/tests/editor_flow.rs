//! End-to-end session tests: load → edit → save against in-memory
//! collaborator fakes.

mod common;

use assert_matches::assert_matches;
use backoffice_core::error::CoreError;
use backoffice_core::permission::{PermissionKind, PermissionSet};
use backoffice_core::reconcile::{DropPosition, DropZone};
use backoffice_core::role::{MenuGrant, PermissionCategory, RoleRecord, ServiceGrant, ServiceRecord};
use backoffice_session::source::MenuQuery;
use backoffice_session::{MenuEditor, RoleEditor, SaveOutcome};
use common::{sample_menus, FakeMenuSource, FakeRoleSource, RecordingRoleSink, RecordingSink};

fn zone(target_id: i64, position: DropPosition, parent_id: i64) -> DropZone {
    DropZone {
        target_id: Some(target_id),
        position,
        parent_id,
    }
}

// ---------------------------------------------------------------------------
// Menu editor
// ---------------------------------------------------------------------------

#[tokio::test]
async fn load_builds_hierarchy_with_clean_baseline() {
    let source = FakeMenuSource::new(sample_menus());
    let mut editor = MenuEditor::new();

    editor.load(&source, &MenuQuery::default()).await.unwrap();

    let tree = editor.tree();
    assert_eq!(tree.len(), 2);
    assert_eq!(tree[0].item.menu_name, "Settings");
    assert_eq!(tree[0].children.len(), 2);
    assert_eq!(editor.pending_change_count(), 0);
}

#[tokio::test]
async fn search_filter_reaches_the_source() {
    let source = FakeMenuSource::new(sample_menus());
    let mut editor = MenuEditor::new();

    let query = MenuQuery {
        search: Some("Reports".into()),
        status: None,
    };
    editor.load(&source, &query).await.unwrap();

    assert_eq!(editor.tree().len(), 1);
    assert_eq!(editor.tree()[0].item.menu_name, "Reports");
}

#[tokio::test]
async fn reorder_save_round_trip() {
    let source = FakeMenuSource::new(sample_menus());
    let sink = RecordingSink::default();
    let mut editor = MenuEditor::new();
    editor.load(&source, &MenuQuery::default()).await.unwrap();
    editor.set_reorder_mode(true);

    // Move Roles(3) before Users(2) inside Settings(1).
    assert!(editor.begin_drag(3));
    editor.drop_on(zone(2, DropPosition::Before, 1)).unwrap();

    let outcome = editor.save(&sink).await.unwrap();
    let changes = match outcome {
        SaveOutcome::Saved(changes) => changes,
        other => panic!("expected a saved change-set, got {other:?}"),
    };

    assert!(changes.creates.is_empty() && changes.deletes.is_empty());
    assert_eq!(changes.updates.len(), 2);
    assert_eq!(sink.applied().len(), 1);

    // The session re-baselined and left reorder mode.
    assert_eq!(editor.pending_change_count(), 0);
    assert!(!editor.reorder_mode());
    assert_eq!(editor.forest().children_of(1), &[3, 2]);

    // A second save finds nothing to do.
    assert_matches!(editor.save(&sink).await.unwrap(), SaveOutcome::NoChanges);
    assert_eq!(sink.applied().len(), 1);
}

#[tokio::test]
async fn save_with_no_changes_never_touches_the_sink() {
    let source = FakeMenuSource::new(sample_menus());
    let sink = RecordingSink::default();
    let mut editor = MenuEditor::new();
    editor.load(&source, &MenuQuery::default()).await.unwrap();

    assert_matches!(editor.save(&sink).await.unwrap(), SaveOutcome::NoChanges);
    assert!(sink.applied().is_empty());
}

#[tokio::test]
async fn failed_sink_leaves_the_session_intact() {
    let source = FakeMenuSource::new(sample_menus());
    let sink = RecordingSink::failing();
    let mut editor = MenuEditor::new();
    editor.load(&source, &MenuQuery::default()).await.unwrap();
    editor.set_reorder_mode(true);
    editor.mark_deleted(4).unwrap();

    let err = editor.save(&sink).await.unwrap_err();

    assert_matches!(err, CoreError::Internal(_));
    // Mark, working tree, and baseline all survive for a retry.
    assert!(editor.is_marked_deleted(4));
    assert!(editor.forest().contains(4));
    assert!(editor.reorder_mode());
    assert_eq!(editor.pending_change_count(), 1);
}

#[tokio::test]
async fn deleting_a_leaf_flows_to_the_sink() {
    let source = FakeMenuSource::new(sample_menus());
    let sink = RecordingSink::default();
    let mut editor = MenuEditor::new();
    editor.load(&source, &MenuQuery::default()).await.unwrap();

    editor.mark_deleted(4).unwrap();
    let outcome = editor.save(&sink).await.unwrap();

    let changes = match outcome {
        SaveOutcome::Saved(changes) => changes,
        other => panic!("expected a saved change-set, got {other:?}"),
    };
    assert_eq!(changes.deletes.len(), 1);
    assert_eq!(changes.deletes[0].id, 4);
    assert_eq!(changes.deletes[0].menu_name, "Reports");
    assert!(!editor.forest().contains(4));
    assert!(!editor.is_marked_deleted(4));
}

#[tokio::test]
async fn cross_parent_move_is_reported_as_reparent() {
    let source = FakeMenuSource::new(sample_menus());
    let sink = RecordingSink::default();
    let mut editor = MenuEditor::new();
    editor.load(&source, &MenuQuery::default()).await.unwrap();
    editor.set_reorder_mode(true);

    // Drop Reports(4) inside Settings(1).
    editor.begin_drag(4);
    editor.drop_on(zone(1, DropPosition::Inside, 1)).unwrap();
    assert!(editor.is_expanded(1));

    let changes = editor.pending_changes().unwrap();
    let reparented = changes.updates.iter().find(|u| u.id == 4).unwrap();
    assert_eq!(reparented.parent_id, Some(1));
    assert_eq!(reparented.sequence, Some(2));

    editor.save(&sink).await.unwrap();
    assert_eq!(editor.forest().get(4).unwrap().parent_id, 1);
}

// ---------------------------------------------------------------------------
// Role editor
// ---------------------------------------------------------------------------

fn billing_service() -> ServiceRecord {
    ServiceRecord {
        id: 10,
        service_name: "billing".into(),
    }
}

fn stored_role() -> RoleRecord {
    RoleRecord {
        id: 5,
        role_name: "Support".into(),
        scope_id: Some(2),
        services: vec![ServiceGrant {
            service_id: 10,
            service_name: "BILLING".into(),
            permissions: PermissionSet {
                can_read: true,
                ..PermissionSet::NONE
            },
        }],
        menus: vec![MenuGrant {
            menu_id: 2,
            permissions: PermissionSet {
                can_read: true,
                can_update: true,
                ..PermissionSet::NONE
            },
        }],
    }
}

#[tokio::test]
async fn loaded_role_overlays_grants_and_aggregates() {
    let roles = FakeRoleSource::new(vec![billing_service()], Some(stored_role()));
    let menus = FakeMenuSource::new(sample_menus());
    let mut editor = RoleEditor::new();

    editor.load_role(&roles, &menus, 5).await.unwrap();

    assert_eq!(editor.form().role_name, "Support");
    assert_eq!(editor.form().scope_id, Some(2));
    assert!(editor.permissions().services[0].permissions.can_read);
    // Settings(1) aggregates can_read/can_update from the granted Users(2).
    let settings = &editor.permissions().menus[0];
    assert!(settings.permissions.can_read && settings.permissions.can_update);
    assert!(!settings.permissions.can_create);
}

#[tokio::test]
async fn untouched_loaded_role_submits_no_grants() {
    let roles = FakeRoleSource::new(vec![billing_service()], Some(stored_role()));
    let menus = FakeMenuSource::new(sample_menus());
    let mut editor = RoleEditor::new();
    editor.load_role(&roles, &menus, 5).await.unwrap();

    let payload = editor.payload();

    assert!(payload.services.is_empty());
    assert!(payload.menus.is_empty());
}

#[tokio::test]
async fn toggled_role_submits_only_the_changed_entries() {
    let roles = FakeRoleSource::new(vec![billing_service()], Some(stored_role()));
    let menus = FakeMenuSource::new(sample_menus());
    let sink = RecordingRoleSink::default();
    let mut editor = RoleEditor::new();
    editor.load_role(&roles, &menus, 5).await.unwrap();

    editor.toggle(PermissionCategory::Menus, 3, PermissionKind::CanRead);
    let submitted_to = editor.submit(&sink).await.unwrap();

    assert_eq!(submitted_to, 5);
    let updated = sink.updated.lock().unwrap();
    assert_eq!(updated.len(), 1);
    let (id, payload) = &updated[0];
    assert_eq!(*id, 5);
    assert!(payload.services.is_empty());
    // Only Roles(3) is resent: Settings(1) already aggregated can_read
    // from the stored grant on Users(2), so its flags did not move.
    let menu_ids: Vec<i64> = payload.menus.iter().map(|g| g.menu_id).collect();
    assert_eq!(menu_ids, vec![3]);
    assert!(payload.menus[0].permissions.can_read);
}

#[tokio::test]
async fn second_submit_after_success_sends_nothing_new() {
    let roles = FakeRoleSource::new(vec![billing_service()], Some(stored_role()));
    let menus = FakeMenuSource::new(sample_menus());
    let sink = RecordingRoleSink::default();
    let mut editor = RoleEditor::new();
    editor.load_role(&roles, &menus, 5).await.unwrap();

    editor.toggle(PermissionCategory::Services, 10, PermissionKind::CanDelete);
    editor.submit(&sink).await.unwrap();
    editor.submit(&sink).await.unwrap();

    let updated = sink.updated.lock().unwrap();
    assert_eq!(updated.len(), 2);
    assert!(updated[1].1.services.is_empty());
    assert!(updated[1].1.menus.is_empty());
}

#[tokio::test]
async fn creating_a_role_assigns_the_new_id() {
    let roles = FakeRoleSource::new(vec![billing_service()], None);
    let menus = FakeMenuSource::new(sample_menus());
    let sink = RecordingRoleSink::with_next_id(42);
    let mut editor = RoleEditor::new();
    editor.initialize(&roles, &menus).await.unwrap();

    editor.set_role_name("Auditor");
    editor.toggle_all(PermissionCategory::Services, 10);
    let id = editor.submit(&sink).await.unwrap();

    assert_eq!(id, 42);
    assert_eq!(editor.role_id(), Some(42));
    let created = sink.created.lock().unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].role_name, "Auditor");
    assert!(created[0].services[0].permissions.all());
}

#[tokio::test]
async fn submit_without_a_role_name_is_rejected() {
    let roles = FakeRoleSource::new(vec![billing_service()], None);
    let menus = FakeMenuSource::new(sample_menus());
    let sink = RecordingRoleSink::default();
    let mut editor = RoleEditor::new();
    editor.initialize(&roles, &menus).await.unwrap();

    let err = editor.submit(&sink).await.unwrap_err();

    assert_matches!(err, CoreError::Validation(_));
    assert!(sink.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn loading_an_unknown_role_reports_not_found() {
    let roles = FakeRoleSource::new(vec![billing_service()], None);
    let menus = FakeMenuSource::new(sample_menus());
    let mut editor = RoleEditor::new();

    let err = editor.load_role(&roles, &menus, 99).await.unwrap_err();

    assert_matches!(err, CoreError::NotFound { entity: "role", id: 99 });
}
