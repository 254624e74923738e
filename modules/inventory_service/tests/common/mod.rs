//! Common test utilities: in-memory store, recording sink and fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use inventory_service::config::Config;
use inventory_service::contract::*;
use inventory_service::domain::repository::{
    AuditLogRepository, ChangeSet, ItemRepository, OperationRepository, SchemaRepository,
    StoreError, StoreWrite, UnitOfWork,
};
use inventory_service::domain::{EventKind, NotificationSink, Service};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

// ===== In-memory store =====

#[derive(Debug, Clone, Default)]
struct State {
    schemas: HashMap<Uuid, InventorySchema>,
    /// Insertion order
    items: Vec<InventoryItem>,
    /// Append order
    audit: Vec<AuditLogEntry>,
    operations: Vec<Operation>,
}

impl State {
    fn apply(&mut self, tenant_id: Uuid, write: StoreWrite) -> anyhow::Result<()> {
        match write {
            StoreWrite::PutSchema(schema) => {
                self.schemas.insert(schema.tenant_id, schema);
            }
            StoreWrite::InsertItem(item) => {
                if self.items.iter().any(|i| i.id == item.id) {
                    return Err(StoreError::DuplicateItem(item.id).into());
                }
                self.items.push(item);
            }
            StoreWrite::UpdateItem(item) => {
                let slot = self
                    .items
                    .iter_mut()
                    .find(|i| i.id == item.id && i.tenant_id == tenant_id)
                    .ok_or(StoreError::MissingRow {
                        entity: "item",
                        id: item.id,
                    })?;
                *slot = item;
            }
            StoreWrite::DeleteItem(item_id) => {
                let before = self.items.len();
                self.items
                    .retain(|i| !(i.id == item_id && i.tenant_id == tenant_id));
                if self.items.len() == before {
                    return Err(StoreError::MissingRow {
                        entity: "item",
                        id: item_id,
                    }
                    .into());
                }
            }
            StoreWrite::AppendAudit(entry) => self.audit.push(entry),
            StoreWrite::MarkAuditUndone {
                entry_id,
                undone_by_id,
                undone_at,
            } => {
                let entry = self
                    .audit
                    .iter_mut()
                    .find(|e| e.id == entry_id && e.tenant_id == tenant_id)
                    .ok_or(StoreError::MissingRow {
                        entity: "audit_entry",
                        id: entry_id,
                    })?;
                if entry.undone_at.is_some() {
                    return Err(StoreError::AuditEntryAlreadyUndone(entry_id).into());
                }
                entry.undone_at = Some(undone_at);
                entry.undone_by_id = Some(undone_by_id);
            }
            StoreWrite::InsertOperation(operation) => self.operations.push(operation),
            StoreWrite::MarkOperationUndone {
                operation_id,
                undone_by_id,
                undone_at,
            } => {
                let operation = self
                    .operations
                    .iter_mut()
                    .find(|o| o.id == operation_id && o.tenant_id == tenant_id)
                    .ok_or(StoreError::MissingRow {
                        entity: "operation",
                        id: operation_id,
                    })?;
                if operation.undone_at.is_some() {
                    return Err(StoreError::OperationAlreadyUndone(operation_id).into());
                }
                operation.undone_at = Some(undone_at);
                operation.undone_by_id = Some(undone_by_id);
            }
            StoreWrite::PurgeTenant => {
                self.schemas.remove(&tenant_id);
                self.items.retain(|i| i.tenant_id != tenant_id);
                self.audit.retain(|e| e.tenant_id != tenant_id);
                self.operations.retain(|o| o.tenant_id != tenant_id);
            }
        }
        Ok(())
    }
}

/// Store keeping everything in memory; commits are all-or-nothing
#[derive(Default)]
pub struct MockStore {
    state: RwLock<State>,
    commits: Mutex<usize>,
    /// Zero-based commit numbers that fail with a plain storage error
    failing_commits: Mutex<Vec<usize>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of commit attempts so far, successful or not
    pub fn commit_count(&self) -> usize {
        *self.commits.lock()
    }

    /// Make the n-th commit attempt (zero-based) fail
    pub fn fail_commit(&self, n: usize) {
        self.failing_commits.lock().push(n);
    }

    pub fn item_count(&self, tenant_id: Uuid) -> usize {
        self.state
            .read()
            .items
            .iter()
            .filter(|i| i.tenant_id == tenant_id)
            .count()
    }

    pub fn audit_count(&self, tenant_id: Uuid) -> usize {
        self.state
            .read()
            .audit
            .iter()
            .filter(|e| e.tenant_id == tenant_id)
            .count()
    }

    /// Print verbose information about store state
    pub fn print_state(&self, context: &str) {
        let state = self.state.read();
        println!("\n========== Store State: {} ==========", context);
        println!("Schemas: {}", state.schemas.len());
        for item in &state.items {
            println!(
                "  Item {} (tenant {}): {}",
                item.id,
                item.tenant_id,
                Value::Object(item.data.clone())
            );
        }
        for entry in &state.audit {
            println!(
                "  Audit {} {} undone={:?}",
                entry.id,
                entry.action.as_str(),
                entry.undone_at
            );
        }
        println!("Operations: {}", state.operations.len());
        println!("=====================================\n");
    }
}

#[async_trait]
impl SchemaRepository for MockStore {
    async fn find_schema(&self, tenant_id: Uuid) -> anyhow::Result<Option<InventorySchema>> {
        Ok(self.state.read().schemas.get(&tenant_id).cloned())
    }
}

#[async_trait]
impl ItemRepository for MockStore {
    async fn find_item(&self, item_id: Uuid) -> anyhow::Result<Option<InventoryItem>> {
        Ok(self
            .state
            .read()
            .items
            .iter()
            .find(|i| i.id == item_id)
            .cloned())
    }

    async fn find_items(
        &self,
        tenant_id: Uuid,
        item_ids: &[Uuid],
    ) -> anyhow::Result<Vec<InventoryItem>> {
        Ok(self
            .state
            .read()
            .items
            .iter()
            .filter(|i| i.tenant_id == tenant_id && item_ids.contains(&i.id))
            .cloned()
            .collect())
    }

    async fn list_items(&self, tenant_id: Uuid) -> anyhow::Result<Vec<InventoryItem>> {
        Ok(self
            .state
            .read()
            .items
            .iter()
            .filter(|i| i.tenant_id == tenant_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AuditLogRepository for MockStore {
    async fn find_entry(&self, entry_id: Uuid) -> anyhow::Result<Option<AuditLogEntry>> {
        Ok(self
            .state
            .read()
            .audit
            .iter()
            .find(|e| e.id == entry_id)
            .cloned())
    }

    async fn list_entries(
        &self,
        tenant_id: Uuid,
        filter: &AuditLogFilter,
        limit: u64,
    ) -> anyhow::Result<Vec<AuditLogEntry>> {
        Ok(self
            .state
            .read()
            .audit
            .iter()
            .rev()
            .filter(|e| e.tenant_id == tenant_id)
            .filter(|e| filter.action.map_or(true, |a| e.action == a))
            .filter(|e| filter.item_id.map_or(true, |id| e.item_id == Some(id)))
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl OperationRepository for MockStore {
    async fn find_operation(&self, operation_id: Uuid) -> anyhow::Result<Option<Operation>> {
        Ok(self
            .state
            .read()
            .operations
            .iter()
            .find(|o| o.id == operation_id)
            .cloned())
    }

    async fn list_operations(&self, tenant_id: Uuid) -> anyhow::Result<Vec<Operation>> {
        Ok(self
            .state
            .read()
            .operations
            .iter()
            .rev()
            .filter(|o| o.tenant_id == tenant_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UnitOfWork for MockStore {
    async fn commit(&self, changes: ChangeSet) -> anyhow::Result<()> {
        let attempt = {
            let mut commits = self.commits.lock();
            let attempt = *commits;
            *commits += 1;
            attempt
        };
        if self.failing_commits.lock().contains(&attempt) {
            anyhow::bail!("simulated storage outage");
        }

        let mut state = self.state.write();
        let mut next = state.clone();
        for write in changes.writes {
            next.apply(changes.tenant_id, write)?;
        }
        *state = next;
        Ok(())
    }
}

// ===== Recording sink =====

/// Notification sink that remembers every delivery
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<(EventKind, Uuid, Value)>>,
}

impl RecordingSink {
    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.lock().iter().map(|(kind, _, _)| *kind).collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify(
        &self,
        kind: EventKind,
        tenant_id: Uuid,
        payload: Value,
    ) -> anyhow::Result<()> {
        self.events.lock().push((kind, tenant_id, payload));
        Ok(())
    }
}

// ===== Fixtures =====

/// Route service logs to the test harness, filtered by `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Turn a `json!({...})` literal into item data
pub fn data(value: Value) -> ItemData {
    match value {
        Value::Object(map) => map,
        other => panic!("Expected JSON object, got {}", other),
    }
}

/// Name, quantity, cost, category and received-date columns
pub fn standard_columns() -> Vec<ColumnDefinition> {
    vec![
        ColumnDefinition::new("name", "Name", ColumnKind::Text)
            .with_role(ColumnRole::Name)
            .required()
            .at(0),
        ColumnDefinition::new("qty", "Quantity", ColumnKind::Number)
            .with_role(ColumnRole::Quantity)
            .at(1),
        ColumnDefinition::new("cost", "Unit Cost", ColumnKind::Currency)
            .with_role(ColumnRole::Cost)
            .at(2),
        ColumnDefinition::new("category", "Category", ColumnKind::Select)
            .with_role(ColumnRole::Category)
            .with_options(["Tools", "Parts"])
            .at(3),
        ColumnDefinition::new("received", "Received", ColumnKind::Date).at(4),
    ]
}

/// Service over a fresh in-memory store, with one context per role
pub struct TestEnv {
    pub store: Arc<MockStore>,
    pub sink: Arc<RecordingSink>,
    pub service: Service,
    pub tenant_id: Uuid,
    pub owner: SecurityContext,
    pub boss: SecurityContext,
    pub staff: SecurityContext,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        init_tracing();
        let store = Arc::new(MockStore::new());
        let sink = Arc::new(RecordingSink::default());
        let service = Service::new(store.clone(), sink.clone(), config);
        let tenant_id = Uuid::new_v4();

        Self {
            store,
            sink,
            service,
            tenant_id,
            owner: SecurityContext::new(Uuid::new_v4(), tenant_id, Role::Owner),
            boss: SecurityContext::new(Uuid::new_v4(), tenant_id, Role::Boss),
            staff: SecurityContext::new(Uuid::new_v4(), tenant_id, Role::Staff),
        }
    }

    /// Fresh environment with [`standard_columns`] already configured
    pub async fn with_standard_schema() -> Self {
        let env = Self::new();
        env.service
            .update_schema(&env.owner, standard_columns())
            .await
            .unwrap();
        env.sink.clear();
        env
    }

    /// Create an item with the given name, quantity and cost
    pub async fn stocked_item(&self, name: &str, qty: f64, cost: f64) -> InventoryItem {
        self.service
            .create_item(
                &self.owner,
                data(serde_json::json!({"name": name, "qty": qty, "cost": cost})),
            )
            .await
            .unwrap()
    }
}
