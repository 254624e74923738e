//! Native client trait for inter-module communication
//!
//! This trait defines the API that transport layers and other modules use to
//! interact with the inventory service.
//! NO HTTP - direct function calls for performance.

use super::{
    error::InventoryError,
    model::{
        AuditLogEntry, AuditLogFilter, ColumnDefinition, ImportReport, InventoryItem,
        InventorySchema, ItemData, Operation, ReceiveRequest, SecurityContext,
    },
};
use async_trait::async_trait;
use uuid::Uuid;

/// Inventory service API for inter-module communication
#[async_trait]
pub trait InventoryApi: Send + Sync {
    // ===== Schema Operations =====

    /// Get the tenant's schema; `None` when no columns were ever configured
    async fn get_schema(
        &self,
        ctx: &SecurityContext,
    ) -> Result<Option<InventorySchema>, InventoryError>;

    /// Replace the tenant's column list
    async fn update_schema(
        &self,
        ctx: &SecurityContext,
        columns: Vec<ColumnDefinition>,
    ) -> Result<InventorySchema, InventoryError>;

    /// Wipe the tenant's items, operations, audit log and schema
    async fn reset_inventory(&self, ctx: &SecurityContext) -> Result<(), InventoryError>;

    // ===== Item Operations =====

    async fn get_item(
        &self,
        ctx: &SecurityContext,
        item_id: Uuid,
    ) -> Result<InventoryItem, InventoryError>;

    async fn list_items(&self, ctx: &SecurityContext)
        -> Result<Vec<InventoryItem>, InventoryError>;

    async fn create_item(
        &self,
        ctx: &SecurityContext,
        data: ItemData,
    ) -> Result<InventoryItem, InventoryError>;

    /// Replace an item's data
    async fn update_item(
        &self,
        ctx: &SecurityContext,
        item_id: Uuid,
        data: ItemData,
    ) -> Result<InventoryItem, InventoryError>;

    async fn delete_item(&self, ctx: &SecurityContext, item_id: Uuid)
        -> Result<(), InventoryError>;

    /// Sanitize, validate and create rows independently of each other
    async fn import_items(
        &self,
        ctx: &SecurityContext,
        rows: Vec<ItemData>,
    ) -> Result<ImportReport, InventoryError>;

    // ===== Audit Log Operations =====

    async fn list_audit_log(
        &self,
        ctx: &SecurityContext,
        filter: AuditLogFilter,
    ) -> Result<Vec<AuditLogEntry>, InventoryError>;

    /// Reverse a logged action and mark the entry undone
    async fn undo_audit_entry(
        &self,
        ctx: &SecurityContext,
        entry_id: Uuid,
    ) -> Result<AuditLogEntry, InventoryError>;

    // ===== Receiving Operations =====

    async fn receive(
        &self,
        ctx: &SecurityContext,
        request: ReceiveRequest,
    ) -> Result<Operation, InventoryError>;

    async fn undo_operation(
        &self,
        ctx: &SecurityContext,
        operation_id: Uuid,
    ) -> Result<Operation, InventoryError>;

    async fn get_operation(
        &self,
        ctx: &SecurityContext,
        operation_id: Uuid,
    ) -> Result<Operation, InventoryError>;

    async fn list_operations(&self, ctx: &SecurityContext)
        -> Result<Vec<Operation>, InventoryError>;
}
