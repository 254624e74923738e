//! SeaORM repository implementations

use crate::contract::{AuditLogEntry, AuditLogFilter, InventoryItem, InventorySchema, Operation};
use crate::domain::repository::{
    AuditLogRepository, ChangeSet, ItemRepository, OperationRepository, SchemaRepository,
    StoreError, StoreWrite, UnitOfWork,
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    prelude::Expr, sea_query::OnConflict, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use super::entity;

/// Store backed by a SeaORM connection; every change set runs in one transaction
pub struct SeaOrmInventoryStore {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmInventoryStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

// ===== Reads =====

#[async_trait]
impl SchemaRepository for SeaOrmInventoryStore {
    async fn find_schema(&self, tenant_id: Uuid) -> Result<Option<InventorySchema>> {
        let result = entity::schema::Entity::find_by_id(tenant_id)
            .one(&*self.db)
            .await?;

        result.map(InventorySchema::try_from).transpose()
    }
}

#[async_trait]
impl ItemRepository for SeaOrmInventoryStore {
    async fn find_item(&self, item_id: Uuid) -> Result<Option<InventoryItem>> {
        let result = entity::item::Entity::find_by_id(item_id)
            .one(&*self.db)
            .await?;

        result.map(InventoryItem::try_from).transpose()
    }

    async fn find_items(&self, tenant_id: Uuid, item_ids: &[Uuid]) -> Result<Vec<InventoryItem>> {
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }

        let results = entity::item::Entity::find()
            .filter(entity::item::Column::TenantId.eq(tenant_id))
            .filter(entity::item::Column::Id.is_in(item_ids.iter().copied()))
            .all(&*self.db)
            .await?;

        results
            .into_iter()
            .map(InventoryItem::try_from)
            .collect::<Result<Vec<_>>>()
    }

    async fn list_items(&self, tenant_id: Uuid) -> Result<Vec<InventoryItem>> {
        let results = entity::item::Entity::find()
            .filter(entity::item::Column::TenantId.eq(tenant_id))
            .order_by_asc(entity::item::Column::CreatedAt)
            .order_by_asc(entity::item::Column::Id)
            .all(&*self.db)
            .await?;

        results
            .into_iter()
            .map(InventoryItem::try_from)
            .collect::<Result<Vec<_>>>()
    }
}

#[async_trait]
impl AuditLogRepository for SeaOrmInventoryStore {
    async fn find_entry(&self, entry_id: Uuid) -> Result<Option<AuditLogEntry>> {
        let result = entity::audit_entry::Entity::find_by_id(entry_id)
            .one(&*self.db)
            .await?;

        result.map(AuditLogEntry::try_from).transpose()
    }

    async fn list_entries(
        &self,
        tenant_id: Uuid,
        filter: &AuditLogFilter,
        limit: u64,
    ) -> Result<Vec<AuditLogEntry>> {
        let mut query = entity::audit_entry::Entity::find()
            .filter(entity::audit_entry::Column::TenantId.eq(tenant_id));

        if let Some(action) = filter.action {
            query = query.filter(entity::audit_entry::Column::Action.eq(action.as_str()));
        }
        if let Some(item_id) = filter.item_id {
            query = query.filter(entity::audit_entry::Column::ItemId.eq(item_id));
        }

        let results = query
            .order_by_desc(entity::audit_entry::Column::CreatedAt)
            .order_by_desc(entity::audit_entry::Column::Id)
            .limit(limit)
            .all(&*self.db)
            .await?;

        results
            .into_iter()
            .map(AuditLogEntry::try_from)
            .collect::<Result<Vec<_>>>()
    }
}

#[async_trait]
impl OperationRepository for SeaOrmInventoryStore {
    async fn find_operation(&self, operation_id: Uuid) -> Result<Option<Operation>> {
        let result = entity::operation::Entity::find_by_id(operation_id)
            .one(&*self.db)
            .await?;

        result.map(Operation::try_from).transpose()
    }

    async fn list_operations(&self, tenant_id: Uuid) -> Result<Vec<Operation>> {
        let results = entity::operation::Entity::find()
            .filter(entity::operation::Column::TenantId.eq(tenant_id))
            .order_by_desc(entity::operation::Column::CreatedAt)
            .order_by_desc(entity::operation::Column::Id)
            .all(&*self.db)
            .await?;

        results
            .into_iter()
            .map(Operation::try_from)
            .collect::<Result<Vec<_>>>()
    }
}

// ===== Writes =====

#[async_trait]
impl UnitOfWork for SeaOrmInventoryStore {
    async fn commit(&self, changes: ChangeSet) -> Result<()> {
        let tenant_id = changes.tenant_id;
        let count = changes.writes.len();

        // Dropping the transaction on error rolls it back
        let txn = self.db.begin().await?;
        for write in changes.writes {
            apply(&txn, tenant_id, write).await?;
        }
        txn.commit().await?;

        tracing::debug!(tenant_id = %tenant_id, writes = count, "Change set committed");
        Ok(())
    }
}

async fn apply(txn: &DatabaseTransaction, tenant_id: Uuid, write: StoreWrite) -> Result<()> {
    match write {
        StoreWrite::PutSchema(schema) => {
            let active = entity::schema::ActiveModel::try_from(&schema)?;
            entity::schema::Entity::insert(active)
                .on_conflict(
                    OnConflict::column(entity::schema::Column::TenantId)
                        .update_columns([
                            entity::schema::Column::Columns,
                            entity::schema::Column::UpdatedAt,
                        ])
                        .to_owned(),
                )
                .exec_without_returning(txn)
                .await?;
        }
        StoreWrite::InsertItem(item) => {
            let taken = entity::item::Entity::find_by_id(item.id)
                .count(txn)
                .await?;
            if taken > 0 {
                return Err(StoreError::DuplicateItem(item.id).into());
            }
            entity::item::Entity::insert(entity::item::ActiveModel::from(&item))
                .exec_without_returning(txn)
                .await?;
        }
        StoreWrite::UpdateItem(item) => {
            let result = entity::item::Entity::update_many()
                .col_expr(entity::item::Column::Data, Expr::value(Value::Object(item.data)))
                .col_expr(entity::item::Column::UpdatedAt, Expr::value(item.updated_at))
                .filter(entity::item::Column::Id.eq(item.id))
                .filter(entity::item::Column::TenantId.eq(tenant_id))
                .exec(txn)
                .await?;
            if result.rows_affected == 0 {
                return Err(StoreError::MissingRow {
                    entity: "item",
                    id: item.id,
                }
                .into());
            }
        }
        StoreWrite::DeleteItem(item_id) => {
            let result = entity::item::Entity::delete_many()
                .filter(entity::item::Column::Id.eq(item_id))
                .filter(entity::item::Column::TenantId.eq(tenant_id))
                .exec(txn)
                .await?;
            if result.rows_affected == 0 {
                return Err(StoreError::MissingRow {
                    entity: "item",
                    id: item_id,
                }
                .into());
            }
        }
        StoreWrite::AppendAudit(entry) => {
            entity::audit_entry::Entity::insert(entity::audit_entry::ActiveModel::try_from(&entry)?)
                .exec_without_returning(txn)
                .await?;
        }
        StoreWrite::MarkAuditUndone {
            entry_id,
            undone_by_id,
            undone_at,
        } => mark_audit_undone(txn, tenant_id, entry_id, undone_by_id, undone_at).await?,
        StoreWrite::InsertOperation(operation) => {
            entity::operation::Entity::insert(entity::operation::ActiveModel::try_from(&operation)?)
                .exec_without_returning(txn)
                .await?;
        }
        StoreWrite::MarkOperationUndone {
            operation_id,
            undone_by_id,
            undone_at,
        } => mark_operation_undone(txn, tenant_id, operation_id, undone_by_id, undone_at).await?,
        StoreWrite::PurgeTenant => purge_tenant(txn, tenant_id).await?,
    }
    Ok(())
}

async fn mark_audit_undone(
    txn: &DatabaseTransaction,
    tenant_id: Uuid,
    entry_id: Uuid,
    undone_by_id: Uuid,
    undone_at: DateTime<Utc>,
) -> Result<()> {
    use entity::audit_entry::{Column, Entity};

    let result = Entity::update_many()
        .col_expr(Column::UndoneAt, Expr::value(undone_at))
        .col_expr(Column::UndoneById, Expr::value(undone_by_id))
        .filter(Column::Id.eq(entry_id))
        .filter(Column::TenantId.eq(tenant_id))
        .filter(Column::UndoneAt.is_null())
        .exec(txn)
        .await?;

    if result.rows_affected == 0 {
        let exists = Entity::find_by_id(entry_id)
            .filter(Column::TenantId.eq(tenant_id))
            .count(txn)
            .await?
            > 0;
        return Err(if exists {
            StoreError::AuditEntryAlreadyUndone(entry_id)
        } else {
            StoreError::MissingRow {
                entity: "audit_entry",
                id: entry_id,
            }
        }
        .into());
    }
    Ok(())
}

async fn mark_operation_undone(
    txn: &DatabaseTransaction,
    tenant_id: Uuid,
    operation_id: Uuid,
    undone_by_id: Uuid,
    undone_at: DateTime<Utc>,
) -> Result<()> {
    use entity::operation::{Column, Entity};

    let result = Entity::update_many()
        .col_expr(Column::UndoneAt, Expr::value(undone_at))
        .col_expr(Column::UndoneById, Expr::value(undone_by_id))
        .filter(Column::Id.eq(operation_id))
        .filter(Column::TenantId.eq(tenant_id))
        .filter(Column::UndoneAt.is_null())
        .exec(txn)
        .await?;

    if result.rows_affected == 0 {
        let exists = Entity::find_by_id(operation_id)
            .filter(Column::TenantId.eq(tenant_id))
            .count(txn)
            .await?
            > 0;
        return Err(if exists {
            StoreError::OperationAlreadyUndone(operation_id)
        } else {
            StoreError::MissingRow {
                entity: "operation",
                id: operation_id,
            }
        }
        .into());
    }
    Ok(())
}

async fn purge_tenant(txn: &DatabaseTransaction, tenant_id: Uuid) -> Result<()> {
    let items = entity::item::Entity::delete_many()
        .filter(entity::item::Column::TenantId.eq(tenant_id))
        .exec(txn)
        .await?;
    let entries = entity::audit_entry::Entity::delete_many()
        .filter(entity::audit_entry::Column::TenantId.eq(tenant_id))
        .exec(txn)
        .await?;
    let operations = entity::operation::Entity::delete_many()
        .filter(entity::operation::Column::TenantId.eq(tenant_id))
        .exec(txn)
        .await?;
    entity::schema::Entity::delete_many()
        .filter(entity::schema::Column::TenantId.eq(tenant_id))
        .exec(txn)
        .await?;

    tracing::debug!(
        tenant_id = %tenant_id,
        items = items.rows_affected,
        audit_entries = entries.rows_affected,
        operations = operations.rows_affected,
        "Tenant inventory purged"
    );
    Ok(())
}
