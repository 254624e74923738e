//! Entity to model mappers
//!
//! Conversions between SeaORM entities and contract models. Contract models
//! carry no serde derives, so the JSON columns go through the private
//! `*Json` mirrors below.

use super::entity;
use crate::contract::{
    AuditAction, AuditLogEntry, ColumnDefinition, ColumnKind, ColumnRole, FieldChange,
    InventoryItem, InventorySchema, ItemData, Operation, OperationItem, OperationType,
    SchemaChange, SchemaChangeType,
};
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

// ===== Schema Conversions =====

impl TryFrom<entity::schema::Model> for InventorySchema {
    type Error = anyhow::Error;

    fn try_from(entity: entity::schema::Model) -> Result<Self, Self::Error> {
        let columns: Vec<ColumnJson> = serde_json::from_value(entity.columns)?;

        Ok(Self {
            tenant_id: entity.tenant_id,
            columns: columns
                .into_iter()
                .map(ColumnDefinition::try_from)
                .collect::<Result<_>>()?,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

impl TryFrom<&InventorySchema> for entity::schema::ActiveModel {
    type Error = anyhow::Error;

    fn try_from(model: &InventorySchema) -> Result<Self, Self::Error> {
        let columns: Vec<ColumnJson> = model.columns.iter().map(ColumnJson::from).collect();

        Ok(Self {
            tenant_id: Set(model.tenant_id),
            columns: Set(serde_json::to_value(columns)?),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
        })
    }
}

// ===== Item Conversions =====

fn object(value: Value, what: &str) -> Result<ItemData> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(anyhow!("{} is not a JSON object: {}", what, other)),
    }
}

impl TryFrom<entity::item::Model> for InventoryItem {
    type Error = anyhow::Error;

    fn try_from(entity: entity::item::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: entity.id,
            tenant_id: entity.tenant_id,
            data: object(entity.data, "Item data")?,
            created_by_id: entity.created_by_id,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

impl From<&InventoryItem> for entity::item::ActiveModel {
    fn from(model: &InventoryItem) -> Self {
        Self {
            id: Set(model.id),
            tenant_id: Set(model.tenant_id),
            data: Set(Value::Object(model.data.clone())),
            created_by_id: Set(model.created_by_id),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
        }
    }
}

// ===== Audit Entry Conversions =====

impl TryFrom<entity::audit_entry::Model> for AuditLogEntry {
    type Error = anyhow::Error;

    fn try_from(entity: entity::audit_entry::Model) -> Result<Self, Self::Error> {
        let action = AuditAction::parse(&entity.action)
            .ok_or_else(|| anyhow!("Unknown audit action: {}", entity.action))?;

        let snapshot = entity
            .snapshot
            .map(serde_json::from_value::<SnapshotJson>)
            .transpose()?
            .map(InventoryItem::from);

        let changes = entity
            .changes
            .map(serde_json::from_value::<Vec<FieldChangeJson>>)
            .transpose()?
            .map(|changes| changes.into_iter().map(FieldChange::from).collect());

        let schema_changes = entity
            .schema_changes
            .map(serde_json::from_value::<Vec<SchemaChangeJson>>)
            .transpose()?
            .map(|changes| {
                changes
                    .into_iter()
                    .map(SchemaChange::try_from)
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?;

        Ok(Self {
            id: entity.id,
            tenant_id: entity.tenant_id,
            actor_id: entity.actor_id,
            action,
            item_id: entity.item_id,
            item_name: entity.item_name,
            snapshot,
            changes,
            schema_changes,
            undoable: entity.undoable,
            undone_at: entity.undone_at,
            undone_by_id: entity.undone_by_id,
            created_at: entity.created_at,
        })
    }
}

impl TryFrom<&AuditLogEntry> for entity::audit_entry::ActiveModel {
    type Error = anyhow::Error;

    fn try_from(model: &AuditLogEntry) -> Result<Self, Self::Error> {
        let snapshot = model
            .snapshot
            .as_ref()
            .map(|item| serde_json::to_value(SnapshotJson::from(item)))
            .transpose()?;
        let changes = model
            .changes
            .as_ref()
            .map(|changes| {
                serde_json::to_value(changes.iter().map(FieldChangeJson::from).collect::<Vec<_>>())
            })
            .transpose()?;
        let schema_changes = model
            .schema_changes
            .as_ref()
            .map(|changes| {
                serde_json::to_value(
                    changes.iter().map(SchemaChangeJson::from).collect::<Vec<_>>(),
                )
            })
            .transpose()?;

        Ok(Self {
            id: Set(model.id),
            tenant_id: Set(model.tenant_id),
            actor_id: Set(model.actor_id),
            action: Set(model.action.as_str().to_string()),
            item_id: Set(model.item_id),
            item_name: Set(model.item_name.clone()),
            snapshot: Set(snapshot),
            changes: Set(changes),
            schema_changes: Set(schema_changes),
            undoable: Set(model.undoable),
            undone_at: Set(model.undone_at),
            undone_by_id: Set(model.undone_by_id),
            created_at: Set(model.created_at),
        })
    }
}

// ===== Operation Conversions =====

impl TryFrom<entity::operation::Model> for Operation {
    type Error = anyhow::Error;

    fn try_from(entity: entity::operation::Model) -> Result<Self, Self::Error> {
        let operation_type = OperationType::parse(&entity.operation_type)
            .ok_or_else(|| anyhow!("Unknown operation type: {}", entity.operation_type))?;
        let items: Vec<OperationItemJson> = serde_json::from_value(entity.items)?;

        Ok(Self {
            id: entity.id,
            tenant_id: entity.tenant_id,
            operation_type,
            date: entity.date,
            reference: entity.reference,
            supplier: entity.supplier,
            notes: entity.notes,
            items: items.into_iter().map(OperationItem::from).collect(),
            total_qty: entity.total_qty,
            user_id: entity.user_id,
            undone_at: entity.undone_at,
            undone_by_id: entity.undone_by_id,
            created_at: entity.created_at,
        })
    }
}

impl TryFrom<&Operation> for entity::operation::ActiveModel {
    type Error = anyhow::Error;

    fn try_from(model: &Operation) -> Result<Self, Self::Error> {
        let items: Vec<OperationItemJson> =
            model.items.iter().map(OperationItemJson::from).collect();

        Ok(Self {
            id: Set(model.id),
            tenant_id: Set(model.tenant_id),
            operation_type: Set(model.operation_type.as_str().to_string()),
            date: Set(model.date),
            reference: Set(model.reference.clone()),
            supplier: Set(model.supplier.clone()),
            notes: Set(model.notes.clone()),
            items: Set(serde_json::to_value(items)?),
            total_qty: Set(model.total_qty),
            user_id: Set(model.user_id),
            undone_at: Set(model.undone_at),
            undone_by_id: Set(model.undone_by_id),
            created_at: Set(model.created_at),
        })
    }
}

// ===== JSON Serialization Helpers =====

/// JSON representation of a column definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ColumnJson {
    id: String,
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    order: u32,
}

impl From<&ColumnDefinition> for ColumnJson {
    fn from(column: &ColumnDefinition) -> Self {
        Self {
            id: column.id.clone(),
            name: column.name.clone(),
            kind: column.kind.as_str().to_string(),
            role: column.role.map(|r| r.as_str().to_string()),
            options: column.options.clone(),
            required: column.required,
            order: column.order,
        }
    }
}

impl TryFrom<ColumnJson> for ColumnDefinition {
    type Error = anyhow::Error;

    fn try_from(json: ColumnJson) -> Result<Self, Self::Error> {
        let kind = ColumnKind::parse(&json.kind)
            .ok_or_else(|| anyhow!("Unknown column type: {}", json.kind))?;
        let role = json
            .role
            .map(|r| ColumnRole::parse(&r).ok_or_else(|| anyhow!("Unknown column role: {}", r)))
            .transpose()?;

        Ok(Self {
            id: json.id,
            name: json.name,
            kind,
            role,
            options: json.options,
            required: json.required,
            order: json.order,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldChangeJson {
    field: String,
    field_name: String,
    #[serde(default)]
    old_value: Value,
    #[serde(default)]
    new_value: Value,
}

impl From<&FieldChange> for FieldChangeJson {
    fn from(change: &FieldChange) -> Self {
        Self {
            field: change.field.clone(),
            field_name: change.field_name.clone(),
            old_value: change.old_value.clone(),
            new_value: change.new_value.clone(),
        }
    }
}

impl From<FieldChangeJson> for FieldChange {
    fn from(json: FieldChangeJson) -> Self {
        Self {
            field: json.field,
            field_name: json.field_name,
            old_value: json.old_value,
            new_value: json.new_value,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchemaChangeJson {
    #[serde(rename = "type")]
    change_type: String,
    column_id: String,
    column_name: String,
    details: String,
}

impl From<&SchemaChange> for SchemaChangeJson {
    fn from(change: &SchemaChange) -> Self {
        Self {
            change_type: change.change_type.as_str().to_string(),
            column_id: change.column_id.clone(),
            column_name: change.column_name.clone(),
            details: change.details.clone(),
        }
    }
}

impl TryFrom<SchemaChangeJson> for SchemaChange {
    type Error = anyhow::Error;

    fn try_from(json: SchemaChangeJson) -> Result<Self, Self::Error> {
        Ok(Self {
            change_type: SchemaChangeType::parse(&json.change_type)
                .ok_or_else(|| anyhow!("Unknown schema change type: {}", json.change_type))?,
            column_id: json.column_id,
            column_name: json.column_name,
            details: json.details,
        })
    }
}

/// Item state captured in a deletion entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotJson {
    id: Uuid,
    tenant_id: Uuid,
    data: ItemData,
    created_by_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<&InventoryItem> for SnapshotJson {
    fn from(item: &InventoryItem) -> Self {
        Self {
            id: item.id,
            tenant_id: item.tenant_id,
            data: item.data.clone(),
            created_by_id: item.created_by_id,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

impl From<SnapshotJson> for InventoryItem {
    fn from(json: SnapshotJson) -> Self {
        Self {
            id: json.id,
            tenant_id: json.tenant_id,
            data: json.data,
            created_by_id: json.created_by_id,
            created_at: json.created_at,
            updated_at: json.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationItemJson {
    item_id: Uuid,
    item_name: String,
    quantity: i64,
    previous_qty: f64,
    new_qty: f64,
    cost_per_item: Option<f64>,
    previous_cost: Option<f64>,
    new_cost: Option<f64>,
}

impl From<&OperationItem> for OperationItemJson {
    fn from(line: &OperationItem) -> Self {
        Self {
            item_id: line.item_id,
            item_name: line.item_name.clone(),
            quantity: line.quantity,
            previous_qty: line.previous_qty,
            new_qty: line.new_qty,
            cost_per_item: line.cost_per_item,
            previous_cost: line.previous_cost,
            new_cost: line.new_cost,
        }
    }
}

impl From<OperationItemJson> for OperationItem {
    fn from(json: OperationItemJson) -> Self {
        Self {
            item_id: json.item_id,
            item_name: json.item_name,
            quantity: json.quantity,
            previous_qty: json.previous_qty,
            new_qty: json.new_qty,
            cost_per_item: json.cost_per_item,
            previous_cost: json.previous_cost,
            new_cost: json.new_cost,
        }
    }
}
