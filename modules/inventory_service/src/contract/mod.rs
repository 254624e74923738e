//! Contract layer - public API for inter-module communication
//!
//! This layer contains transport-agnostic models and the native client trait.
//! NO serde derives on models - these are pure domain types.

pub mod client;
pub mod error;
pub mod model;

pub use client::InventoryApi;
pub use error::InventoryError;
pub use model::{
    AuditAction, AuditLogEntry, AuditLogFilter, ColumnDefinition, ColumnKind, ColumnRole,
    FieldChange, ImportReport, ImportRowFailure, ImportWarning, InventoryItem, InventorySchema,
    ItemData, Operation, OperationItem, OperationType, ReceiveLine, ReceiveRequest, Role,
    SchemaChange, SchemaChangeType, SecurityContext,
};
