//! Native client implementation - wraps domain service for in-process calls

use crate::contract::{
    AuditLogEntry, AuditLogFilter, ColumnDefinition, ImportReport, InventoryApi, InventoryError,
    InventoryItem, InventorySchema, ItemData, Operation, ReceiveRequest, SecurityContext,
};
use crate::domain::Service;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Native client implementation that directly calls the domain service
///
/// Transport layers hold it as `Arc<dyn InventoryApi>`.
#[derive(Clone)]
pub struct NativeClient {
    service: Arc<Service>,
}

impl NativeClient {
    /// Create a new native client
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl InventoryApi for NativeClient {
    async fn get_schema(
        &self,
        ctx: &SecurityContext,
    ) -> Result<Option<InventorySchema>, InventoryError> {
        self.service.get_schema(ctx).await
    }

    async fn update_schema(
        &self,
        ctx: &SecurityContext,
        columns: Vec<ColumnDefinition>,
    ) -> Result<InventorySchema, InventoryError> {
        self.service.update_schema(ctx, columns).await
    }

    async fn reset_inventory(&self, ctx: &SecurityContext) -> Result<(), InventoryError> {
        self.service.reset_inventory(ctx).await
    }

    async fn get_item(
        &self,
        ctx: &SecurityContext,
        item_id: Uuid,
    ) -> Result<InventoryItem, InventoryError> {
        self.service.get_item(ctx, item_id).await
    }

    async fn list_items(
        &self,
        ctx: &SecurityContext,
    ) -> Result<Vec<InventoryItem>, InventoryError> {
        self.service.list_items(ctx).await
    }

    async fn create_item(
        &self,
        ctx: &SecurityContext,
        data: ItemData,
    ) -> Result<InventoryItem, InventoryError> {
        self.service.create_item(ctx, data).await
    }

    async fn update_item(
        &self,
        ctx: &SecurityContext,
        item_id: Uuid,
        data: ItemData,
    ) -> Result<InventoryItem, InventoryError> {
        self.service.update_item(ctx, item_id, data).await
    }

    async fn delete_item(
        &self,
        ctx: &SecurityContext,
        item_id: Uuid,
    ) -> Result<(), InventoryError> {
        self.service.delete_item(ctx, item_id).await
    }

    async fn import_items(
        &self,
        ctx: &SecurityContext,
        rows: Vec<ItemData>,
    ) -> Result<ImportReport, InventoryError> {
        self.service.import_items(ctx, rows).await
    }

    async fn list_audit_log(
        &self,
        ctx: &SecurityContext,
        filter: AuditLogFilter,
    ) -> Result<Vec<AuditLogEntry>, InventoryError> {
        self.service.list_audit_log(ctx, filter).await
    }

    async fn undo_audit_entry(
        &self,
        ctx: &SecurityContext,
        entry_id: Uuid,
    ) -> Result<AuditLogEntry, InventoryError> {
        self.service.undo_audit_entry(ctx, entry_id).await
    }

    async fn receive(
        &self,
        ctx: &SecurityContext,
        request: ReceiveRequest,
    ) -> Result<Operation, InventoryError> {
        self.service.receive(ctx, request).await
    }

    async fn undo_operation(
        &self,
        ctx: &SecurityContext,
        operation_id: Uuid,
    ) -> Result<Operation, InventoryError> {
        self.service.undo_operation(ctx, operation_id).await
    }

    async fn get_operation(
        &self,
        ctx: &SecurityContext,
        operation_id: Uuid,
    ) -> Result<Operation, InventoryError> {
        self.service.get_operation(ctx, operation_id).await
    }

    async fn list_operations(
        &self,
        ctx: &SecurityContext,
    ) -> Result<Vec<Operation>, InventoryError> {
        self.service.list_operations(ctx).await
    }
}
