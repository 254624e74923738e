//! Domain service - business logic orchestration
//!
//! Every mutation follows the same path: authorize, read the tenant's current
//! schema, validate, build one [`ChangeSet`], commit it, then dispatch the
//! [`PostCommit`] notifications.

use super::access::{authorize, Permission};
use super::diff::{diff_changes, diff_schema_changes};
use super::events::{InventoryEvent, NotificationSink, PostCommit};
use super::repository::{ChangeSet, InventoryStore, StoreError, StoreWrite};
use super::validation::{ensure_valid_item_data, validate_columns};
use crate::config::Config;
use crate::contract::{
    AuditAction, AuditLogEntry, AuditLogFilter, ColumnDefinition, ColumnRole, InventoryError,
    InventoryItem, InventorySchema, ItemData, SecurityContext,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Domain service for inventory management
pub struct Service {
    pub(super) store: Arc<dyn InventoryStore>,
    notifier: Arc<dyn NotificationSink>,
    pub(super) config: Config,
}

/// Log a repository failure and hide it behind `Internal`
pub(super) fn storage_failure(error: anyhow::Error) -> InventoryError {
    tracing::error!("Inventory storage failure: {:?}", error);
    InventoryError::Internal
}

/// Map a failed commit, surfacing typed store refusals
pub(super) fn commit_failure(error: anyhow::Error) -> InventoryError {
    match error.downcast_ref::<StoreError>() {
        Some(StoreError::AuditEntryAlreadyUndone(id)) => {
            InventoryError::conflict(format!("Audit entry {} has already been undone", id))
        }
        Some(StoreError::OperationAlreadyUndone(id)) => {
            InventoryError::conflict(format!("Operation {} has already been undone", id))
        }
        Some(StoreError::DuplicateItem(id)) => {
            InventoryError::conflict(format!("Item {} already exists", id))
        }
        Some(StoreError::MissingRow { entity, id }) => InventoryError::not_found(entity, id),
        None => storage_failure(error),
    }
}

/// Display name of an item, read from the column with the `name` role
pub(super) fn display_name(columns: &[ColumnDefinition], data: &ItemData) -> Option<String> {
    columns
        .iter()
        .find(|c| c.role == Some(ColumnRole::Name))
        .and_then(|c| data.get(&c.id))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

/// Audit entry skeleton; callers fill in the action-specific payload
pub(super) fn audit_entry(
    tenant_id: Uuid,
    actor_id: Uuid,
    action: AuditAction,
    now: DateTime<Utc>,
) -> AuditLogEntry {
    AuditLogEntry {
        id: Uuid::new_v4(),
        tenant_id,
        actor_id,
        action,
        item_id: None,
        item_name: None,
        snapshot: None,
        changes: None,
        schema_changes: None,
        undoable: false,
        undone_at: None,
        undone_by_id: None,
        created_at: now,
    }
}

impl Service {
    /// Create a new service instance
    pub fn new(
        store: Arc<dyn InventoryStore>,
        notifier: Arc<dyn NotificationSink>,
        config: Config,
    ) -> Self {
        Self {
            store,
            notifier,
            config,
        }
    }

    // ===== Helper Methods =====

    /// Load the tenant's schema, failing when none was configured
    pub(super) async fn require_schema(
        &self,
        tenant_id: Uuid,
    ) -> Result<InventorySchema, InventoryError> {
        self.store
            .find_schema(tenant_id)
            .await
            .map_err(storage_failure)?
            .ok_or_else(|| {
                InventoryError::validation("No inventory columns are configured for this business")
            })
    }

    /// Load an item owned by the tenant
    pub(super) async fn require_item(
        &self,
        tenant_id: Uuid,
        item_id: Uuid,
    ) -> Result<InventoryItem, InventoryError> {
        self.store
            .find_item(item_id)
            .await
            .map_err(storage_failure)?
            .filter(|item| item.tenant_id == tenant_id)
            .ok_or_else(|| InventoryError::not_found("item", item_id))
    }

    /// Commit a change set, then fire its notifications
    pub(super) async fn commit(
        &self,
        changes: ChangeSet,
        hooks: PostCommit,
    ) -> Result<(), InventoryError> {
        self.store.commit(changes).await.map_err(commit_failure)?;
        if self.config.notifications_enabled {
            hooks.dispatch(&self.notifier).await;
        }
        Ok(())
    }

    /// Writes that create one validated item and its audit entry
    pub(super) fn item_creation(
        &self,
        schema: &InventorySchema,
        actor_id: Uuid,
        data: ItemData,
    ) -> Result<(InventoryItem, ChangeSet), InventoryError> {
        ensure_valid_item_data(&data, &schema.columns)?;

        let now = Utc::now();
        let item = InventoryItem {
            id: Uuid::new_v4(),
            tenant_id: schema.tenant_id,
            data,
            created_by_id: actor_id,
            created_at: now,
            updated_at: now,
        };

        let mut entry = audit_entry(schema.tenant_id, actor_id, AuditAction::ItemCreated, now);
        entry.item_id = Some(item.id);
        entry.item_name = display_name(&schema.columns, &item.data);

        let mut changes = ChangeSet::new(schema.tenant_id);
        changes
            .push(StoreWrite::InsertItem(item.clone()))
            .push(StoreWrite::AppendAudit(entry));
        Ok((item, changes))
    }

    // ===== Schema Operations =====

    /// Get the tenant's schema, `None` if never configured
    pub async fn get_schema(
        &self,
        ctx: &SecurityContext,
    ) -> Result<Option<InventorySchema>, InventoryError> {
        authorize(ctx, Permission::Read)?;
        self.store
            .find_schema(ctx.tenant_id)
            .await
            .map_err(storage_failure)
    }

    /// Replace the tenant's column list
    pub async fn update_schema(
        &self,
        ctx: &SecurityContext,
        mut columns: Vec<ColumnDefinition>,
    ) -> Result<InventorySchema, InventoryError> {
        let actor_id = authorize(ctx, Permission::Mutate)?;

        // Rejected before anything is read or written
        validate_columns(&columns)?;
        columns.sort_by_key(|c| c.order);

        let previous = self
            .store
            .find_schema(ctx.tenant_id)
            .await
            .map_err(storage_failure)?;

        let old_columns = previous.as_ref().map(|s| s.columns.as_slice()).unwrap_or(&[]);
        let schema_changes = diff_schema_changes(old_columns, &columns);

        if let Some(previous) = &previous {
            if schema_changes.is_empty() {
                tracing::debug!(tenant_id = %ctx.tenant_id, "Schema update without changes");
                return Ok(previous.clone());
            }
        }

        let now = Utc::now();
        let schema = InventorySchema {
            tenant_id: ctx.tenant_id,
            columns,
            created_at: previous.as_ref().map(|s| s.created_at).unwrap_or(now),
            updated_at: now,
        };

        let mut entry = audit_entry(ctx.tenant_id, actor_id, AuditAction::SchemaUpdated, now);
        let change_count = schema_changes.len();
        entry.schema_changes = Some(schema_changes);

        let mut changes = ChangeSet::new(ctx.tenant_id);
        changes
            .push(StoreWrite::PutSchema(schema.clone()))
            .push(StoreWrite::AppendAudit(entry));

        let mut hooks = PostCommit::new(ctx.tenant_id);
        hooks.push(InventoryEvent::schema_updated(
            schema.columns.iter().map(|c| c.id.clone()).collect(),
            change_count,
            actor_id,
        ));

        self.commit(changes, hooks).await?;
        tracing::info!(
            tenant_id = %ctx.tenant_id,
            columns = schema.columns.len(),
            changes = change_count,
            "Inventory schema updated"
        );
        Ok(schema)
    }

    /// Wipe the tenant's items, operations, audit log and schema
    pub async fn reset_inventory(&self, ctx: &SecurityContext) -> Result<(), InventoryError> {
        let actor_id = authorize(ctx, Permission::Reset)?;

        let mut changes = ChangeSet::new(ctx.tenant_id);
        changes.push(StoreWrite::PurgeTenant);

        let mut hooks = PostCommit::new(ctx.tenant_id);
        hooks.push(InventoryEvent::inventory_reset(actor_id));

        self.commit(changes, hooks).await?;
        tracing::info!(tenant_id = %ctx.tenant_id, actor_id = %actor_id, "Inventory reset");
        Ok(())
    }

    // ===== Item Operations =====

    /// Get a specific item
    pub async fn get_item(
        &self,
        ctx: &SecurityContext,
        item_id: Uuid,
    ) -> Result<InventoryItem, InventoryError> {
        authorize(ctx, Permission::Read)?;
        self.require_item(ctx.tenant_id, item_id).await
    }

    /// List the tenant's items
    pub async fn list_items(
        &self,
        ctx: &SecurityContext,
    ) -> Result<Vec<InventoryItem>, InventoryError> {
        authorize(ctx, Permission::Read)?;
        self.store
            .list_items(ctx.tenant_id)
            .await
            .map_err(storage_failure)
    }

    /// Create an item validated against the current schema
    pub async fn create_item(
        &self,
        ctx: &SecurityContext,
        data: ItemData,
    ) -> Result<InventoryItem, InventoryError> {
        let actor_id = authorize(ctx, Permission::Mutate)?;
        let schema = self.require_schema(ctx.tenant_id).await?;

        let (item, changes) = self.item_creation(&schema, actor_id, data)?;

        let mut hooks = PostCommit::new(ctx.tenant_id);
        hooks.push(InventoryEvent::item_created(&item, actor_id));

        self.commit(changes, hooks).await?;
        tracing::info!(tenant_id = %ctx.tenant_id, item_id = %item.id, "Item created");
        Ok(item)
    }

    /// Replace an item's data; a no-op when nothing changed
    pub async fn update_item(
        &self,
        ctx: &SecurityContext,
        item_id: Uuid,
        data: ItemData,
    ) -> Result<InventoryItem, InventoryError> {
        let actor_id = authorize(ctx, Permission::Mutate)?;
        let schema = self.require_schema(ctx.tenant_id).await?;
        let existing = self.require_item(ctx.tenant_id, item_id).await?;

        ensure_valid_item_data(&data, &schema.columns)?;

        let field_changes = diff_changes(&existing.data, &data, &schema.columns);
        if field_changes.is_empty() {
            tracing::debug!(tenant_id = %ctx.tenant_id, item_id = %item_id, "Item update without changes");
            return Ok(existing);
        }

        let now = Utc::now();
        let item = InventoryItem {
            data,
            updated_at: now,
            ..existing
        };

        let mut entry = audit_entry(ctx.tenant_id, actor_id, AuditAction::ItemUpdated, now);
        entry.item_id = Some(item.id);
        entry.item_name = display_name(&schema.columns, &item.data);
        entry.changes = Some(field_changes);
        entry.undoable = true;

        let mut changes = ChangeSet::new(ctx.tenant_id);
        changes
            .push(StoreWrite::UpdateItem(item.clone()))
            .push(StoreWrite::AppendAudit(entry));

        let mut hooks = PostCommit::new(ctx.tenant_id);
        hooks.push(InventoryEvent::item_updated(&item, actor_id));

        self.commit(changes, hooks).await?;
        tracing::info!(tenant_id = %ctx.tenant_id, item_id = %item.id, "Item updated");
        Ok(item)
    }

    /// Delete an item, keeping its last state as an audit snapshot
    pub async fn delete_item(
        &self,
        ctx: &SecurityContext,
        item_id: Uuid,
    ) -> Result<(), InventoryError> {
        let actor_id = authorize(ctx, Permission::Mutate)?;
        let existing = self.require_item(ctx.tenant_id, item_id).await?;
        let schema = self
            .store
            .find_schema(ctx.tenant_id)
            .await
            .map_err(storage_failure)?;

        let mut entry = audit_entry(ctx.tenant_id, actor_id, AuditAction::ItemDeleted, Utc::now());
        entry.item_id = Some(item_id);
        entry.item_name = schema
            .as_ref()
            .and_then(|s| display_name(&s.columns, &existing.data));
        entry.snapshot = Some(existing);
        entry.undoable = true;

        let mut changes = ChangeSet::new(ctx.tenant_id);
        changes
            .push(StoreWrite::DeleteItem(item_id))
            .push(StoreWrite::AppendAudit(entry));

        let mut hooks = PostCommit::new(ctx.tenant_id);
        hooks.push(InventoryEvent::item_deleted(item_id, actor_id));

        self.commit(changes, hooks).await?;
        tracing::info!(tenant_id = %ctx.tenant_id, item_id = %item_id, "Item deleted");
        Ok(())
    }

    // ===== Audit Log Operations =====

    /// List the tenant's audit entries, newest first
    pub async fn list_audit_log(
        &self,
        ctx: &SecurityContext,
        filter: AuditLogFilter,
    ) -> Result<Vec<AuditLogEntry>, InventoryError> {
        authorize(ctx, Permission::Read)?;
        let limit = filter.limit.unwrap_or(self.config.audit_log_page_size);
        self.store
            .list_entries(ctx.tenant_id, &filter, limit)
            .await
            .map_err(storage_failure)
    }
}
