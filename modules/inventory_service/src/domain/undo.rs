//! Selective undo of audit log entries

use super::access::{authorize, Permission};
use super::events::{InventoryEvent, PostCommit};
use super::repository::{ChangeSet, StoreWrite};
use super::service::{storage_failure, Service};
use super::validation::ensure_valid_item_data;
use crate::contract::{
    AuditAction, AuditLogEntry, InventoryError, InventoryItem, SecurityContext,
};
use chrono::Utc;
use uuid::Uuid;

impl Service {
    /// Reverse a logged item deletion or update and mark the entry undone.
    ///
    /// Deletions are restored from the snapshot; updates have each recorded
    /// field set back to its old value. Either way the resulting data must
    /// satisfy the schema as it is now, not as it was when logged.
    pub async fn undo_audit_entry(
        &self,
        ctx: &SecurityContext,
        entry_id: Uuid,
    ) -> Result<AuditLogEntry, InventoryError> {
        let actor_id = authorize(ctx, Permission::Undo)?;

        let entry = self
            .store
            .find_entry(entry_id)
            .await
            .map_err(storage_failure)?
            .filter(|e| e.tenant_id == ctx.tenant_id)
            .ok_or_else(|| InventoryError::not_found("audit_entry", entry_id))?;

        if entry.is_undone() {
            return Err(InventoryError::conflict(format!(
                "Audit entry {} has already been undone",
                entry_id
            )));
        }
        if !entry.undoable {
            return Err(InventoryError::invalid_operation(format!(
                "{} entries cannot be undone",
                entry.action.as_str()
            )));
        }

        let now = Utc::now();
        let mut changes = ChangeSet::new(ctx.tenant_id);
        let mut hooks = PostCommit::new(ctx.tenant_id);

        match entry.action {
            AuditAction::ItemDeleted => {
                let snapshot = entry.snapshot.clone().ok_or_else(|| {
                    InventoryError::invalid_operation("Deletion entry carries no item snapshot")
                })?;
                let schema = self.require_schema(ctx.tenant_id).await?;
                ensure_valid_item_data(&snapshot.data, &schema.columns)?;

                let restored = InventoryItem {
                    tenant_id: entry.tenant_id,
                    updated_at: now,
                    ..snapshot
                };
                hooks.push(InventoryEvent::item_created(&restored, actor_id));
                changes.push(StoreWrite::InsertItem(restored));
            }
            AuditAction::ItemUpdated => {
                let field_changes = entry.changes.as_ref().ok_or_else(|| {
                    InventoryError::invalid_operation("Update entry carries no field changes")
                })?;
                let item_id = entry.item_id.ok_or_else(|| {
                    InventoryError::invalid_operation("Update entry does not reference an item")
                })?;

                let live = self
                    .store
                    .find_item(item_id)
                    .await
                    .map_err(storage_failure)?
                    .ok_or_else(|| {
                        InventoryError::invalid_operation("The item no longer exists")
                    })?;
                if live.tenant_id != entry.tenant_id {
                    return Err(InventoryError::forbidden(
                        "Item belongs to a different business",
                    ));
                }

                let mut data = live.data.clone();
                for change in field_changes {
                    if change.old_value.is_null() {
                        data.remove(&change.field);
                    } else {
                        data.insert(change.field.clone(), change.old_value.clone());
                    }
                }

                let schema = self.require_schema(ctx.tenant_id).await?;
                ensure_valid_item_data(&data, &schema.columns)?;

                let reverted = InventoryItem {
                    data,
                    updated_at: now,
                    ..live
                };
                hooks.push(InventoryEvent::item_updated(&reverted, actor_id));
                changes.push(StoreWrite::UpdateItem(reverted));
            }
            AuditAction::ItemCreated | AuditAction::SchemaUpdated => {
                return Err(InventoryError::invalid_operation(
                    "This action type cannot be undone",
                ));
            }
        }

        changes.push(StoreWrite::MarkAuditUndone {
            entry_id,
            undone_by_id: actor_id,
            undone_at: now,
        });
        hooks.push(InventoryEvent::audit_entry_undone(entry_id, entry.item_id, actor_id));

        self.commit(changes, hooks).await?;
        tracing::info!(
            tenant_id = %ctx.tenant_id,
            entry_id = %entry_id,
            action = entry.action.as_str(),
            "Audit entry undone"
        );

        Ok(AuditLogEntry {
            undone_at: Some(now),
            undone_by_id: Some(actor_id),
            ..entry
        })
    }
}
