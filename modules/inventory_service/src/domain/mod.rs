//! Domain layer - business logic and services

pub mod access;
pub mod cost;
pub mod diff;
pub mod events;
pub mod import;
pub mod receiving;
pub mod repository;
pub mod sanitize;
pub mod service;
pub mod undo;
pub mod validation;
pub mod values;

pub use events::{EventKind, InventoryEvent, NoOpNotificationSink, NotificationSink, PostCommit};
pub use repository::{
    AuditLogRepository, ChangeSet, InventoryStore, ItemRepository, OperationRepository,
    SchemaRepository, StoreError, StoreWrite, UnitOfWork,
};
pub use service::Service;
