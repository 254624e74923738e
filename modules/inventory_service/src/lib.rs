//! Inventory Service Module
//!
//! Per-business inventories whose record shape is defined at runtime.
//! Each business configures an ordered set of typed columns; items are
//! free-form maps validated against those columns. Mutations are recorded
//! in an audit log that supports selective undo, and receiving operations
//! maintain a weighted-average unit cost.

// Public exports
pub mod contract;
pub use contract::{
    client::InventoryApi, error::InventoryError, AuditLogEntry, ColumnDefinition, ColumnKind,
    ColumnRole, InventoryItem, InventorySchema, Operation, SecurityContext,
};

pub mod config;
pub use config::Config;

pub mod module;
pub use module::InventoryServiceModule;

// Internal modules (hidden from public API)
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
