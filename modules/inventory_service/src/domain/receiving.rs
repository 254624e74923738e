//! Receiving operations and their reversal

use super::access::{authorize, Permission};
use super::cost::{apply_receipt, reverse_receipt, ReversalInput};
use super::events::{InventoryEvent, PostCommit};
use super::repository::{ChangeSet, StoreWrite};
use super::service::{display_name, storage_failure, Service};
use super::validation::parse_instant;
use super::values::{number_value, read_number};
use crate::contract::{
    ColumnDefinition, ColumnRole, InventoryError, InventoryItem, InventorySchema, Operation,
    OperationItem, OperationType, ReceiveRequest, SecurityContext,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

const UNNAMED_ITEM: &str = "Unnamed item";

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_request(request: &ReceiveRequest) -> Result<DateTime<Utc>, InventoryError> {
    let mut errors = Vec::new();

    if request.items.is_empty() {
        errors.push("At least one item is required".to_string());
    }
    for (index, line) in request.items.iter().enumerate() {
        if line.quantity <= 0 {
            errors.push(format!("Line {}: quantity must be a positive integer", index + 1));
        }
        if let Some(cost) = line.cost_per_item {
            if !cost.is_finite() || cost < 0.0 {
                errors.push(format!("Line {}: cost per item must be zero or greater", index + 1));
            }
        }
    }
    if total_quantity(request).is_none() {
        errors.push("Total quantity is too large".to_string());
    }
    let date = parse_instant(&request.date);
    if date.is_none() {
        errors.push(format!("Date '{}' is not a valid date", request.date));
    }

    match date {
        Some(date) if errors.is_empty() => Ok(date),
        _ => Err(InventoryError::Validation { errors }),
    }
}

fn total_quantity(request: &ReceiveRequest) -> Option<i64> {
    request
        .items
        .iter()
        .try_fold(0i64, |total, line| total.checked_add(line.quantity))
}

/// Quantity column, plus the cost column when the schema has one
fn stock_columns(
    schema: &InventorySchema,
) -> Result<(&ColumnDefinition, Option<&ColumnDefinition>), InventoryError> {
    let mut quantity = schema
        .columns
        .iter()
        .filter(|c| c.role == Some(ColumnRole::Quantity));
    let column = match (quantity.next(), quantity.next()) {
        (Some(column), None) => column,
        (None, _) => {
            return Err(InventoryError::validation(
                "The inventory schema has no quantity column",
            ))
        }
        (Some(_), Some(_)) => {
            return Err(InventoryError::conflict(
                "The inventory schema has more than one quantity column",
            ))
        }
    };
    Ok((column, schema.column_with_role(ColumnRole::Cost)))
}

/// Ids in first-seen order without duplicates
fn distinct_ids(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    let mut seen = Vec::new();
    for id in ids {
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}

impl Service {
    /// Receive stock for several items as one atomic operation
    pub async fn receive(
        &self,
        ctx: &SecurityContext,
        request: ReceiveRequest,
    ) -> Result<Operation, InventoryError> {
        let actor_id = authorize(ctx, Permission::Mutate)?;
        let date = validate_request(&request)?;

        let schema = self.require_schema(ctx.tenant_id).await?;
        let (qty_column, cost_column) = stock_columns(&schema)?;

        let ids = distinct_ids(request.items.iter().map(|line| line.item_id));
        let mut working: HashMap<Uuid, InventoryItem> = self
            .store
            .find_items(ctx.tenant_id, &ids)
            .await
            .map_err(storage_failure)?
            .into_iter()
            .map(|item| (item.id, item))
            .collect();
        if let Some(missing) = ids.iter().find(|id| !working.contains_key(id)) {
            return Err(InventoryError::not_found("item", missing));
        }

        let total_qty = total_quantity(&request).unwrap_or_default();
        let now = Utc::now();
        let mut lines = Vec::with_capacity(request.items.len());

        for line in &request.items {
            let Some(item) = working.get_mut(&line.item_id) else {
                continue;
            };

            let previous_qty = read_number(item.data.get(&qty_column.id)).unwrap_or(0.0);
            let unit_cost = cost_column.and(line.cost_per_item);
            // Only lines that move the average record a cost to reverse from
            let previous_cost = cost_column
                .filter(|_| unit_cost.is_some())
                .map(|c| read_number(item.data.get(&c.id)).unwrap_or(0.0));

            let forward = apply_receipt(
                previous_qty,
                previous_cost.unwrap_or(0.0),
                line.quantity,
                unit_cost,
            );

            item.data
                .insert(qty_column.id.clone(), number_value(forward.new_qty));
            if let (Some(column), Some(cost)) = (cost_column, forward.new_cost) {
                item.data.insert(column.id.clone(), number_value(cost));
            }
            item.updated_at = now;

            lines.push(OperationItem {
                item_id: item.id,
                item_name: display_name(&schema.columns, &item.data)
                    .unwrap_or_else(|| UNNAMED_ITEM.to_string()),
                quantity: line.quantity,
                previous_qty,
                new_qty: forward.new_qty,
                cost_per_item: line.cost_per_item,
                previous_cost,
                new_cost: forward.new_cost,
            });
        }

        let operation = Operation {
            id: Uuid::new_v4(),
            tenant_id: ctx.tenant_id,
            operation_type: OperationType::Receiving,
            date,
            reference: non_blank(request.reference),
            supplier: non_blank(request.supplier),
            notes: non_blank(request.notes),
            total_qty,
            items: lines,
            user_id: actor_id,
            undone_at: None,
            undone_by_id: None,
            created_at: now,
        };

        let mut changes = ChangeSet::new(ctx.tenant_id);
        let mut hooks = PostCommit::new(ctx.tenant_id);
        for id in &ids {
            if let Some(item) = working.remove(id) {
                hooks.push(InventoryEvent::item_updated(&item, actor_id));
                changes.push(StoreWrite::UpdateItem(item));
            }
        }
        changes.push(StoreWrite::InsertOperation(operation.clone()));
        hooks.push(InventoryEvent::operation_created(&operation, actor_id));

        self.commit(changes, hooks).await?;
        tracing::info!(
            tenant_id = %ctx.tenant_id,
            operation_id = %operation.id,
            lines = operation.items.len(),
            total_qty = operation.total_qty,
            "Receiving operation recorded"
        );
        Ok(operation)
    }

    /// Take a receiving operation back out of stock.
    ///
    /// Items deleted since the receive are skipped. Cost reversal is
    /// best-effort; approximate lines are logged.
    pub async fn undo_operation(
        &self,
        ctx: &SecurityContext,
        operation_id: Uuid,
    ) -> Result<Operation, InventoryError> {
        let actor_id = authorize(ctx, Permission::Undo)?;

        let operation = self.require_operation(ctx.tenant_id, operation_id).await?;
        if operation.undone_at.is_some() {
            return Err(InventoryError::conflict(format!(
                "Operation {} has already been undone",
                operation_id
            )));
        }

        let schema = self.require_schema(ctx.tenant_id).await?;
        let (qty_column, cost_column) = stock_columns(&schema)?;

        let ids = distinct_ids(operation.items.iter().map(|line| line.item_id));
        let mut working: HashMap<Uuid, InventoryItem> = self
            .store
            .find_items(ctx.tenant_id, &ids)
            .await
            .map_err(storage_failure)?
            .into_iter()
            .map(|item| (item.id, item))
            .collect();

        let now = Utc::now();

        // Later lines were applied on top of earlier ones
        for line in operation.items.iter().rev() {
            let Some(item) = working.get_mut(&line.item_id) else {
                tracing::debug!(
                    operation_id = %operation_id,
                    item_id = %line.item_id,
                    "Skipping deleted item during operation undo"
                );
                continue;
            };

            let reversed = reverse_receipt(ReversalInput {
                current_qty: read_number(item.data.get(&qty_column.id)).unwrap_or(0.0),
                current_cost: cost_column
                    .and_then(|c| read_number(item.data.get(&c.id)))
                    .unwrap_or(0.0),
                quantity: line.quantity,
                cost_per_item: line.cost_per_item,
                previous_cost: line.previous_cost,
            });
            if reversed.is_approximate() {
                tracing::warn!(
                    operation_id = %operation_id,
                    item_id = %line.item_id,
                    reconciliation = ?reversed.reconciliation,
                    clamped = reversed.quantity_clamped,
                    "Approximate cost reversal"
                );
            }

            item.data
                .insert(qty_column.id.clone(), number_value(reversed.new_qty));
            if let (Some(column), Some(cost)) = (cost_column, reversed.new_cost) {
                item.data.insert(column.id.clone(), number_value(cost));
            }
            item.updated_at = now;
        }

        let mut changes = ChangeSet::new(ctx.tenant_id);
        let mut hooks = PostCommit::new(ctx.tenant_id);
        for id in &ids {
            if let Some(item) = working.remove(id) {
                hooks.push(InventoryEvent::item_updated(&item, actor_id));
                changes.push(StoreWrite::UpdateItem(item));
            }
        }
        changes.push(StoreWrite::MarkOperationUndone {
            operation_id,
            undone_by_id: actor_id,
            undone_at: now,
        });

        let undone = Operation {
            undone_at: Some(now),
            undone_by_id: Some(actor_id),
            ..operation
        };
        hooks.push(InventoryEvent::operation_undone(&undone, actor_id));

        self.commit(changes, hooks).await?;
        tracing::info!(tenant_id = %ctx.tenant_id, operation_id = %operation_id, "Receiving operation undone");
        Ok(undone)
    }

    /// Get a specific operation
    pub async fn get_operation(
        &self,
        ctx: &SecurityContext,
        operation_id: Uuid,
    ) -> Result<Operation, InventoryError> {
        authorize(ctx, Permission::Read)?;
        self.require_operation(ctx.tenant_id, operation_id).await
    }

    /// List the tenant's operations, newest first
    pub async fn list_operations(
        &self,
        ctx: &SecurityContext,
    ) -> Result<Vec<Operation>, InventoryError> {
        authorize(ctx, Permission::Read)?;
        self.store
            .list_operations(ctx.tenant_id)
            .await
            .map_err(storage_failure)
    }

    async fn require_operation(
        &self,
        tenant_id: Uuid,
        operation_id: Uuid,
    ) -> Result<Operation, InventoryError> {
        self.store
            .find_operation(operation_id)
            .await
            .map_err(storage_failure)?
            .filter(|op| op.tenant_id == tenant_id)
            .ok_or_else(|| InventoryError::not_found("operation", operation_id))
    }
}
