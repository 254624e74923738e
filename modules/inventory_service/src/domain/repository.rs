//! Repository traits for data access
//!
//! These traits define the interface for data access operations.
//! Implementations are in infra/storage/repositories.rs
//!
//! Reads go through the per-entity traits. Every mutation is expressed as a
//! [`ChangeSet`] that the store applies atomically through [`UnitOfWork`].

use crate::contract::{AuditLogEntry, AuditLogFilter, InventoryItem, InventorySchema, Operation};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Typed refusals a store reports from inside a commit
///
/// The service downcasts these out of `anyhow::Error` to map them to
/// contract errors; anything else is an internal failure.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Audit entry already undone: {0}")]
    AuditEntryAlreadyUndone(Uuid),

    #[error("Operation already undone: {0}")]
    OperationAlreadyUndone(Uuid),

    #[error("Item already exists: {0}")]
    DuplicateItem(Uuid),

    #[error("{entity} not found in tenant: {id}")]
    MissingRow { entity: &'static str, id: Uuid },
}

/// One write inside a change set
#[derive(Debug, Clone, PartialEq)]
pub enum StoreWrite {
    /// Insert or replace the tenant's schema
    PutSchema(InventorySchema),
    /// Fails with [`StoreError::DuplicateItem`] if the id is taken
    InsertItem(InventoryItem),
    /// Fails with [`StoreError::MissingRow`] if the item is gone
    UpdateItem(InventoryItem),
    /// Fails with [`StoreError::MissingRow`] if the item is gone
    DeleteItem(Uuid),
    AppendAudit(AuditLogEntry),
    /// Compare-and-set on `undone_at IS NULL`
    MarkAuditUndone {
        entry_id: Uuid,
        undone_by_id: Uuid,
        undone_at: DateTime<Utc>,
    },
    InsertOperation(Operation),
    /// Compare-and-set on `undone_at IS NULL`
    MarkOperationUndone {
        operation_id: Uuid,
        undone_by_id: Uuid,
        undone_at: DateTime<Utc>,
    },
    /// Remove every item, audit entry, operation and the schema of the tenant
    PurgeTenant,
}

/// Writes scoped to one tenant, applied all-or-nothing
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeSet {
    pub tenant_id: Uuid,
    pub writes: Vec<StoreWrite>,
}

impl ChangeSet {
    pub fn new(tenant_id: Uuid) -> Self {
        Self {
            tenant_id,
            writes: Vec::new(),
        }
    }

    pub fn push(&mut self, write: StoreWrite) -> &mut Self {
        self.writes.push(write);
        self
    }
}

/// Repository for tenant schemas
#[async_trait]
pub trait SchemaRepository: Send + Sync {
    /// Find the schema of a tenant
    async fn find_schema(&self, tenant_id: Uuid) -> Result<Option<InventorySchema>>;
}

/// Repository for inventory items
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Find an item by id regardless of tenant
    async fn find_item(&self, item_id: Uuid) -> Result<Option<InventoryItem>>;

    /// Find the tenant's items among the given ids; missing ids are omitted
    async fn find_items(&self, tenant_id: Uuid, item_ids: &[Uuid]) -> Result<Vec<InventoryItem>>;

    /// List all items of a tenant, oldest first
    async fn list_items(&self, tenant_id: Uuid) -> Result<Vec<InventoryItem>>;
}

/// Repository for the audit log
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// Find an entry by id regardless of tenant
    async fn find_entry(&self, entry_id: Uuid) -> Result<Option<AuditLogEntry>>;

    /// List a tenant's entries, newest first
    async fn list_entries(
        &self,
        tenant_id: Uuid,
        filter: &AuditLogFilter,
        limit: u64,
    ) -> Result<Vec<AuditLogEntry>>;
}

/// Repository for receiving operations
#[async_trait]
pub trait OperationRepository: Send + Sync {
    /// Find an operation by id regardless of tenant
    async fn find_operation(&self, operation_id: Uuid) -> Result<Option<Operation>>;

    /// List a tenant's operations, newest first
    async fn list_operations(&self, tenant_id: Uuid) -> Result<Vec<Operation>>;
}

/// Transactional write side of the store
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Apply every write in order inside one transaction
    async fn commit(&self, changes: ChangeSet) -> Result<()>;
}

/// Everything the domain service needs from storage
pub trait InventoryStore:
    SchemaRepository + ItemRepository + AuditLogRepository + OperationRepository + UnitOfWork
{
}

impl<T> InventoryStore for T where
    T: SchemaRepository + ItemRepository + AuditLogRepository + OperationRepository + UnitOfWork
{
}
