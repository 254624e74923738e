//! Integration tests for schema, item and audit log operations

use inventory_service::config::Config;
use inventory_service::contract::*;
use inventory_service::domain::EventKind;
use serde_json::json;
use uuid::Uuid;

mod common;
use common::{data, standard_columns, TestEnv};

// ===== Schema =====

#[tokio::test]
async fn test_first_schema_update_logs_every_column_as_added() {
    let env = TestEnv::new();
    assert!(env.service.get_schema(&env.staff).await.unwrap().is_none());

    let schema = env
        .service
        .update_schema(&env.boss, standard_columns())
        .await
        .unwrap();
    assert_eq!(schema.columns.len(), 5);
    assert_eq!(schema.tenant_id, env.tenant_id);

    let log = env
        .service
        .list_audit_log(&env.owner, AuditLogFilter::default())
        .await
        .unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].action, AuditAction::SchemaUpdated);
    assert!(!log[0].undoable);

    let changes = log[0].schema_changes.as_ref().unwrap();
    assert_eq!(changes.len(), 5);
    assert!(changes
        .iter()
        .all(|c| c.change_type == SchemaChangeType::Added && c.details == "Column added"));

    assert_eq!(env.sink.kinds(), vec![EventKind::SchemaUpdated]);
}

#[tokio::test]
async fn test_schema_columns_are_sorted_by_order() {
    let env = TestEnv::new();
    let mut columns = standard_columns();
    columns.reverse();

    let schema = env.service.update_schema(&env.owner, columns).await.unwrap();
    let ids: Vec<&str> = schema.columns.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["name", "qty", "cost", "category", "received"]);
}

#[tokio::test]
async fn test_duplicate_role_rejected_before_persistence() {
    let env = TestEnv::new();
    let mut columns = standard_columns();
    columns.push(
        ColumnDefinition::new("stock", "Stock", ColumnKind::Number)
            .with_role(ColumnRole::Quantity)
            .at(9),
    );

    let err = env
        .service
        .update_schema(&env.owner, columns)
        .await
        .unwrap_err();
    match err {
        InventoryError::Conflict { reason } => {
            assert!(reason.contains("quantity"));
            assert!(reason.contains("Quantity"));
            assert!(reason.contains("Stock"));
        }
        other => panic!("Expected Conflict, got {:?}", other),
    }
    assert_eq!(env.store.commit_count(), 0);
}

#[tokio::test]
async fn test_select_without_options_rejected_naming_column() {
    let env = TestEnv::new();
    let columns = vec![ColumnDefinition::new("size", "Size", ColumnKind::Select)];

    let err = env
        .service
        .update_schema(&env.owner, columns)
        .await
        .unwrap_err();
    match err {
        InventoryError::Validation { errors } => {
            assert_eq!(errors.len(), 1);
            assert!(errors[0].contains("'Size'"));
        }
        other => panic!("Expected Validation, got {:?}", other),
    }
    assert_eq!(env.store.commit_count(), 0);
}

#[tokio::test]
async fn test_unchanged_schema_is_not_rewritten() {
    let env = TestEnv::with_standard_schema().await;
    let commits = env.store.commit_count();

    env.service
        .update_schema(&env.owner, standard_columns())
        .await
        .unwrap();

    assert_eq!(env.store.commit_count(), commits);
    assert_eq!(env.store.audit_count(env.tenant_id), 1);
    assert!(env.sink.kinds().is_empty());
}

#[tokio::test]
async fn test_schema_change_details() {
    let env = TestEnv::with_standard_schema().await;

    let mut columns = standard_columns();
    columns.retain(|c| c.id != "received");
    columns[1].name = "On Hand".to_string();
    columns[1].required = true;

    env.service.update_schema(&env.owner, columns).await.unwrap();

    let log = env
        .service
        .list_audit_log(
            &env.owner,
            AuditLogFilter {
                action: Some(AuditAction::SchemaUpdated),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let changes = log[0].schema_changes.as_ref().unwrap();

    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0].change_type, SchemaChangeType::Modified);
    assert_eq!(changes[0].column_id, "qty");
    assert_eq!(
        changes[0].details,
        "Name: Quantity → On Hand, Required: false → true"
    );
    assert_eq!(changes[1].change_type, SchemaChangeType::Removed);
    assert_eq!(changes[1].column_id, "received");
}

#[tokio::test]
async fn test_schema_update_requires_privileged_role() {
    let env = TestEnv::new();

    let err = env
        .service
        .update_schema(&env.staff, standard_columns())
        .await
        .unwrap_err();
    assert!(matches!(err, InventoryError::Forbidden { .. }));

    let anonymous = SecurityContext::anonymous(env.tenant_id);
    let err = env
        .service
        .update_schema(&anonymous, standard_columns())
        .await
        .unwrap_err();
    assert_eq!(err, InventoryError::Unauthorized);
}

// ===== Items =====

#[tokio::test]
async fn test_create_item_without_schema() {
    let env = TestEnv::new();

    let err = env
        .service
        .create_item(&env.owner, data(json!({"name": "Hammer"})))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        InventoryError::validation("No inventory columns are configured for this business")
    );
}

#[tokio::test]
async fn test_create_item_collects_validation_errors() {
    let env = TestEnv::with_standard_schema().await;

    let err = env
        .service
        .create_item(
            &env.owner,
            data(json!({"name": "", "qty": "lots", "category": "Food", "received": "soon"})),
        )
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Validation error: Name is required, Quantity must be a number, \
         Category must be one of: Tools, Parts, Received must be a valid date"
    );
    assert_eq!(env.store.item_count(env.tenant_id), 0);
}

#[tokio::test]
async fn test_create_item_writes_item_and_audit_entry() {
    let env = TestEnv::with_standard_schema().await;

    let item = env
        .service
        .create_item(
            &env.boss,
            data(json!({"name": "Hammer", "qty": 4, "category": "Tools", "notes": "kept"})),
        )
        .await
        .unwrap();

    assert_eq!(item.created_by_id, env.boss.actor_id.unwrap());
    assert_eq!(item.data["notes"], json!("kept"));

    let fetched = env.service.get_item(&env.staff, item.id).await.unwrap();
    assert_eq!(fetched, item);

    let log = env
        .service
        .list_audit_log(
            &env.owner,
            AuditLogFilter {
                item_id: Some(item.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].action, AuditAction::ItemCreated);
    assert_eq!(log[0].item_name.as_deref(), Some("Hammer"));
    assert!(!log[0].undoable);

    assert_eq!(env.sink.kinds(), vec![EventKind::ItemCreated]);
}

#[tokio::test]
async fn test_update_item_records_field_changes() {
    let env = TestEnv::with_standard_schema().await;
    let item = env.stocked_item("Hammer", 4.0, 12.5).await;

    let updated = env
        .service
        .update_item(
            &env.owner,
            item.id,
            data(json!({"name": "Claw Hammer", "qty": 4, "cost": 12.5, "category": "Tools"})),
        )
        .await
        .unwrap();
    assert_eq!(updated.data["name"], json!("Claw Hammer"));
    assert_eq!(updated.created_at, item.created_at);

    let log = env
        .service
        .list_audit_log(
            &env.owner,
            AuditLogFilter {
                action: Some(AuditAction::ItemUpdated),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(log.len(), 1);
    assert!(log[0].undoable);

    let changes = log[0].changes.as_ref().unwrap();
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0].field, "name");
    assert_eq!(changes[0].old_value, json!("Hammer"));
    assert_eq!(changes[0].new_value, json!("Claw Hammer"));
    assert_eq!(changes[1].field, "category");
    assert_eq!(changes[1].field_name, "Category");
    assert_eq!(changes[1].old_value, serde_json::Value::Null);
}

#[tokio::test]
async fn test_update_without_changes_writes_nothing() {
    let env = TestEnv::with_standard_schema().await;
    let item = env.stocked_item("Hammer", 4.0, 12.5).await;
    let commits = env.store.commit_count();

    // 4 and 4.0 are the same quantity
    let same = env
        .service
        .update_item(
            &env.owner,
            item.id,
            data(json!({"name": "Hammer", "qty": 4, "cost": 12.5})),
        )
        .await
        .unwrap();

    assert_eq!(same, item);
    assert_eq!(env.store.commit_count(), commits);
}

#[tokio::test]
async fn test_delete_item_keeps_snapshot() {
    let env = TestEnv::with_standard_schema().await;
    let item = env.stocked_item("Hammer", 4.0, 12.5).await;

    env.service.delete_item(&env.owner, item.id).await.unwrap();

    let err = env.service.get_item(&env.owner, item.id).await.unwrap_err();
    assert!(matches!(err, InventoryError::NotFound { .. }));

    let log = env
        .service
        .list_audit_log(&env.owner, AuditLogFilter::default())
        .await
        .unwrap();
    assert_eq!(log[0].action, AuditAction::ItemDeleted);
    assert_eq!(log[0].snapshot.as_ref(), Some(&item));
    assert!(log[0].undoable);
}

#[tokio::test]
async fn test_items_are_tenant_scoped() {
    let env = TestEnv::with_standard_schema().await;
    let item = env.stocked_item("Hammer", 4.0, 12.5).await;

    let outsider = SecurityContext::owner(Uuid::new_v4(), Uuid::new_v4());
    let err = env.service.get_item(&outsider, item.id).await.unwrap_err();
    assert_eq!(err, InventoryError::not_found("item", item.id));

    let err = env
        .service
        .delete_item(&outsider, item.id)
        .await
        .unwrap_err();
    assert!(matches!(err, InventoryError::NotFound { .. }));
    assert!(env.service.list_items(&outsider).await.unwrap().is_empty());
    assert_eq!(env.service.list_items(&env.staff).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_staff_can_read_but_not_write() {
    let env = TestEnv::with_standard_schema().await;
    let item = env.stocked_item("Hammer", 4.0, 12.5).await;

    assert!(env.service.list_items(&env.staff).await.is_ok());
    let err = env
        .service
        .update_item(&env.staff, item.id, data(json!({"name": "Mallet"})))
        .await
        .unwrap_err();
    assert!(matches!(err, InventoryError::Forbidden { .. }));
}

// ===== Audit log =====

#[tokio::test]
async fn test_audit_log_is_newest_first_and_limited() {
    let env = TestEnv::with_config(Config {
        audit_log_page_size: 2,
        ..Config::default()
    });
    env.service
        .update_schema(&env.owner, standard_columns())
        .await
        .unwrap();
    for name in ["A", "B", "C"] {
        env.stocked_item(name, 1.0, 1.0).await;
    }

    let page = env
        .service
        .list_audit_log(&env.owner, AuditLogFilter::default())
        .await
        .unwrap();
    let names: Vec<_> = page.iter().map(|e| e.item_name.clone()).collect();
    assert_eq!(names, vec![Some("C".to_string()), Some("B".to_string())]);

    let all = env
        .service
        .list_audit_log(
            &env.owner,
            AuditLogFilter {
                limit: Some(10),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(all.len(), 4);
}

// ===== Reset & notifications =====

#[tokio::test]
async fn test_reset_is_owner_only_and_wipes_tenant() {
    let env = TestEnv::with_standard_schema().await;
    env.stocked_item("Hammer", 4.0, 12.5).await;

    let err = env.service.reset_inventory(&env.boss).await.unwrap_err();
    assert!(matches!(err, InventoryError::Forbidden { .. }));

    env.service.reset_inventory(&env.owner).await.unwrap();

    assert!(env.service.get_schema(&env.owner).await.unwrap().is_none());
    assert!(env.service.list_items(&env.owner).await.unwrap().is_empty());
    assert_eq!(env.store.audit_count(env.tenant_id), 0);
    assert_eq!(env.sink.kinds().last(), Some(&EventKind::InventoryReset));
}

#[tokio::test]
async fn test_notifications_can_be_disabled() {
    let env = TestEnv::with_config(Config {
        notifications_enabled: false,
        ..Config::default()
    });
    env.service
        .update_schema(&env.owner, standard_columns())
        .await
        .unwrap();
    env.stocked_item("Hammer", 4.0, 12.5).await;

    assert!(env.sink.kinds().is_empty());
}
