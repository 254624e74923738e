//! Contract models for inventory service
//!
//! These models are transport-agnostic and used for inter-module communication.
//! NO serde derives - these are pure domain models.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Field map of an inventory item, keyed by column id
pub type ItemData = Map<String, Value>;

/// Value type of a tenant-defined column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Text,
    Number,
    Currency,
    Date,
    Select,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Text => "text",
            ColumnKind::Number => "number",
            ColumnKind::Currency => "currency",
            ColumnKind::Date => "date",
            ColumnKind::Select => "select",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(ColumnKind::Text),
            "number" => Some(ColumnKind::Number),
            "currency" => Some(ColumnKind::Currency),
            "date" => Some(ColumnKind::Date),
            "select" => Some(ColumnKind::Select),
            _ => None,
        }
    }
}

/// Semantic tag telling generic algorithms which column to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    Name,
    Quantity,
    Cost,
    Price,
    MinQuantity,
    Sku,
    Category,
    Location,
    Supplier,
    Notes,
}

impl ColumnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnRole::Name => "name",
            ColumnRole::Quantity => "quantity",
            ColumnRole::Cost => "cost",
            ColumnRole::Price => "price",
            ColumnRole::MinQuantity => "minQuantity",
            ColumnRole::Sku => "sku",
            ColumnRole::Category => "category",
            ColumnRole::Location => "location",
            ColumnRole::Supplier => "supplier",
            ColumnRole::Notes => "notes",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "name" => Some(ColumnRole::Name),
            "quantity" => Some(ColumnRole::Quantity),
            "cost" => Some(ColumnRole::Cost),
            "price" => Some(ColumnRole::Price),
            "minQuantity" => Some(ColumnRole::MinQuantity),
            "sku" => Some(ColumnRole::Sku),
            "category" => Some(ColumnRole::Category),
            "location" => Some(ColumnRole::Location),
            "supplier" => Some(ColumnRole::Supplier),
            "notes" => Some(ColumnRole::Notes),
            _ => None,
        }
    }
}

/// One tenant-defined column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    /// Stable identifier, used as the key in item data
    pub id: String,
    /// Display name
    pub name: String,
    pub kind: ColumnKind,
    pub role: Option<ColumnRole>,
    /// Allowed values; required and non-empty for select columns
    pub options: Vec<String>,
    pub required: bool,
    pub order: u32,
}

impl ColumnDefinition {
    /// Convenience constructor for a plain optional column
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            role: None,
            options: Vec::new(),
            required: false,
            order: 0,
        }
    }

    pub fn with_role(mut self, role: ColumnRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn at(mut self, order: u32) -> Self {
        self.order = order;
        self
    }
}

/// Active column list of one tenant
#[derive(Debug, Clone, PartialEq)]
pub struct InventorySchema {
    pub tenant_id: Uuid,
    pub columns: Vec<ColumnDefinition>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventorySchema {
    /// Column carrying the given role, if any
    pub fn column_with_role(&self, role: ColumnRole) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.role == Some(role))
    }
}

/// A single inventory record
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryItem {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub data: ItemData,
    pub created_by_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Kind of mutation an audit entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditAction {
    ItemCreated,
    ItemUpdated,
    ItemDeleted,
    SchemaUpdated,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::ItemCreated => "ITEM_CREATED",
            AuditAction::ItemUpdated => "ITEM_UPDATED",
            AuditAction::ItemDeleted => "ITEM_DELETED",
            AuditAction::SchemaUpdated => "SCHEMA_UPDATED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ITEM_CREATED" => Some(AuditAction::ItemCreated),
            "ITEM_UPDATED" => Some(AuditAction::ItemUpdated),
            "ITEM_DELETED" => Some(AuditAction::ItemDeleted),
            "SCHEMA_UPDATED" => Some(AuditAction::SchemaUpdated),
            _ => None,
        }
    }
}

/// Field-level delta between two item snapshots
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    /// Column id
    pub field: String,
    /// Column name at diff time
    pub field_name: String,
    /// `Value::Null` when the field had no value
    pub old_value: Value,
    pub new_value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaChangeType {
    Added,
    Removed,
    Modified,
}

impl SchemaChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaChangeType::Added => "added",
            SchemaChangeType::Removed => "removed",
            SchemaChangeType::Modified => "modified",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "added" => Some(SchemaChangeType::Added),
            "removed" => Some(SchemaChangeType::Removed),
            "modified" => Some(SchemaChangeType::Modified),
            _ => None,
        }
    }
}

/// Structural delta between two column lists
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaChange {
    pub change_type: SchemaChangeType,
    pub column_id: String,
    pub column_name: String,
    /// Human-readable summary, e.g. `"Name: Qty → Quantity, Required: false → true"`
    pub details: String,
}

/// Append-only audit record; only the undo markers ever change
#[derive(Debug, Clone, PartialEq)]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub actor_id: Uuid,
    pub action: AuditAction,
    pub item_id: Option<Uuid>,
    /// Display name cached at write time
    pub item_name: Option<String>,
    /// Full item state, present for deletions
    pub snapshot: Option<InventoryItem>,
    /// Present for updates
    pub changes: Option<Vec<FieldChange>>,
    /// Present for schema updates
    pub schema_changes: Option<Vec<SchemaChange>>,
    pub undoable: bool,
    pub undone_at: Option<DateTime<Utc>>,
    pub undone_by_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl AuditLogEntry {
    pub fn is_undone(&self) -> bool {
        self.undone_at.is_some()
    }
}

/// Filter for listing audit entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditLogFilter {
    pub action: Option<AuditAction>,
    pub item_id: Option<Uuid>,
    /// Falls back to the configured page size
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    Receiving,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Receiving => "RECEIVING",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "RECEIVING" => Some(OperationType::Receiving),
            _ => None,
        }
    }
}

/// One line of a receiving operation
#[derive(Debug, Clone, PartialEq)]
pub struct OperationItem {
    pub item_id: Uuid,
    pub item_name: String,
    pub quantity: i64,
    pub previous_qty: f64,
    pub new_qty: f64,
    pub cost_per_item: Option<f64>,
    /// Set only when the line's unit cost was applied to a cost column
    pub previous_cost: Option<f64>,
    pub new_cost: Option<f64>,
}

/// Receiving workflow record
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub operation_type: OperationType,
    pub date: DateTime<Utc>,
    pub reference: Option<String>,
    pub supplier: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<OperationItem>,
    pub total_qty: i64,
    pub user_id: Uuid,
    pub undone_at: Option<DateTime<Utc>>,
    pub undone_by_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// One requested line of a receive
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiveLine {
    pub item_id: Uuid,
    pub quantity: i64,
    pub cost_per_item: Option<f64>,
}

/// Input of a receiving operation
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiveRequest {
    /// RFC 3339 instant or `YYYY-MM-DD`
    pub date: String,
    pub reference: Option<String>,
    pub supplier: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<ReceiveLine>,
}

/// Row that failed during a batch import
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRowFailure {
    /// Zero-based row index in the submitted batch
    pub row: usize,
    pub message: String,
}

/// Cell coerced with a warning during a batch import
#[derive(Debug, Clone, PartialEq)]
pub struct ImportWarning {
    pub row: usize,
    /// Column id
    pub column: String,
    pub detail: String,
}

/// Outcome of a batch import
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    pub imported: Vec<Uuid>,
    pub failures: Vec<ImportRowFailure>,
    pub warnings: Vec<ImportWarning>,
}

/// Tenant role of the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Owner,
    Boss,
    Staff,
}

/// Pre-authenticated identity of the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityContext {
    /// `None` when the request carries no identity
    pub actor_id: Option<Uuid>,
    pub tenant_id: Uuid,
    pub role: Role,
}

impl SecurityContext {
    pub fn new(actor_id: Uuid, tenant_id: Uuid, role: Role) -> Self {
        Self {
            actor_id: Some(actor_id),
            tenant_id,
            role,
        }
    }

    pub fn owner(actor_id: Uuid, tenant_id: Uuid) -> Self {
        Self::new(actor_id, tenant_id, Role::Owner)
    }

    /// Context of an unauthenticated request
    pub fn anonymous(tenant_id: Uuid) -> Self {
        Self {
            actor_id: None,
            tenant_id,
            role: Role::Staff,
        }
    }
}
