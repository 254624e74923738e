/// Domain events for inventory service
///
/// Events are dispatched to the external broadcaster only after the change
/// set they describe has been committed. Delivery is fire-and-forget:
/// failures are logged and never reach the caller.

use crate::contract::model::{InventoryItem, Operation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Kind tag handed to the notification sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ItemCreated,
    ItemUpdated,
    ItemDeleted,
    SchemaUpdated,
    OperationCreated,
    OperationUndone,
    AuditEntryUndone,
    InventoryReset,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::ItemCreated => "item_created",
            EventKind::ItemUpdated => "item_updated",
            EventKind::ItemDeleted => "item_deleted",
            EventKind::SchemaUpdated => "schema_updated",
            EventKind::OperationCreated => "operation_created",
            EventKind::OperationUndone => "operation_undone",
            EventKind::AuditEntryUndone => "audit_entry_undone",
            EventKind::InventoryReset => "inventory_reset",
        }
    }
}

/// Item payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemPayload {
    pub item_id: Uuid,
    pub data: serde_json::Map<String, serde_json::Value>,
    pub updated_at: DateTime<Utc>,
    /// Actor responsible for the change
    pub actor_id: Uuid,
}

/// Payload for deletions, which have no data left to send
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRemovedPayload {
    pub item_id: Uuid,
    pub actor_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaPayload {
    pub column_ids: Vec<String>,
    pub changes: usize,
    pub actor_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationPayload {
    pub operation_id: Uuid,
    pub item_ids: Vec<Uuid>,
    pub total_qty: i64,
    pub actor_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditUndoPayload {
    pub entry_id: Uuid,
    pub item_id: Option<Uuid>,
    pub actor_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetPayload {
    pub actor_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

/// Domain event types for inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum InventoryEvent {
    ItemCreated(ItemPayload),
    ItemUpdated(ItemPayload),
    ItemDeleted(ItemRemovedPayload),
    SchemaUpdated(SchemaPayload),
    OperationCreated(OperationPayload),
    OperationUndone(OperationPayload),
    AuditEntryUndone(AuditUndoPayload),
    InventoryReset(ResetPayload),
}

impl InventoryEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            InventoryEvent::ItemCreated(_) => EventKind::ItemCreated,
            InventoryEvent::ItemUpdated(_) => EventKind::ItemUpdated,
            InventoryEvent::ItemDeleted(_) => EventKind::ItemDeleted,
            InventoryEvent::SchemaUpdated(_) => EventKind::SchemaUpdated,
            InventoryEvent::OperationCreated(_) => EventKind::OperationCreated,
            InventoryEvent::OperationUndone(_) => EventKind::OperationUndone,
            InventoryEvent::AuditEntryUndone(_) => EventKind::AuditEntryUndone,
            InventoryEvent::InventoryReset(_) => EventKind::InventoryReset,
        }
    }

    pub fn item_created(item: &InventoryItem, actor_id: Uuid) -> Self {
        InventoryEvent::ItemCreated(ItemPayload::from_item(item, actor_id))
    }

    pub fn item_updated(item: &InventoryItem, actor_id: Uuid) -> Self {
        InventoryEvent::ItemUpdated(ItemPayload::from_item(item, actor_id))
    }

    pub fn item_deleted(item_id: Uuid, actor_id: Uuid) -> Self {
        InventoryEvent::ItemDeleted(ItemRemovedPayload { item_id, actor_id })
    }

    pub fn schema_updated(column_ids: Vec<String>, changes: usize, actor_id: Uuid) -> Self {
        InventoryEvent::SchemaUpdated(SchemaPayload {
            column_ids,
            changes,
            actor_id,
        })
    }

    pub fn operation_created(operation: &Operation, actor_id: Uuid) -> Self {
        InventoryEvent::OperationCreated(OperationPayload::from_operation(operation, actor_id))
    }

    pub fn operation_undone(operation: &Operation, actor_id: Uuid) -> Self {
        InventoryEvent::OperationUndone(OperationPayload::from_operation(operation, actor_id))
    }

    pub fn audit_entry_undone(entry_id: Uuid, item_id: Option<Uuid>, actor_id: Uuid) -> Self {
        InventoryEvent::AuditEntryUndone(AuditUndoPayload {
            entry_id,
            item_id,
            actor_id,
        })
    }

    pub fn inventory_reset(actor_id: Uuid) -> Self {
        InventoryEvent::InventoryReset(ResetPayload {
            actor_id,
            timestamp: Utc::now(),
        })
    }
}

impl ItemPayload {
    fn from_item(item: &InventoryItem, actor_id: Uuid) -> Self {
        Self {
            item_id: item.id,
            data: item.data.clone(),
            updated_at: item.updated_at,
            actor_id,
        }
    }
}

impl OperationPayload {
    fn from_operation(operation: &Operation, actor_id: Uuid) -> Self {
        Self {
            operation_id: operation.id,
            item_ids: operation.items.iter().map(|line| line.item_id).collect(),
            total_qty: operation.total_qty,
            actor_id,
        }
    }
}

/// Broadcast collaborator
///
/// Implementations deliver to whatever real-time channel the deployment
/// uses. Errors are reported back only so they can be logged.
#[async_trait::async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver one event for a tenant
    async fn notify(
        &self,
        kind: EventKind,
        tenant_id: Uuid,
        payload: serde_json::Value,
    ) -> anyhow::Result<()>;
}

/// No-op sink for testing or when broadcasting is disabled
pub struct NoOpNotificationSink;

#[async_trait::async_trait]
impl NotificationSink for NoOpNotificationSink {
    async fn notify(
        &self,
        _kind: EventKind,
        _tenant_id: Uuid,
        _payload: serde_json::Value,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Events collected while building a change set, dispatched once it commits
#[derive(Debug)]
pub struct PostCommit {
    tenant_id: Uuid,
    events: Vec<InventoryEvent>,
}

impl PostCommit {
    pub fn new(tenant_id: Uuid) -> Self {
        Self {
            tenant_id,
            events: Vec::new(),
        }
    }

    pub fn push(&mut self, event: InventoryEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Deliver every queued event; failures are logged and swallowed
    pub async fn dispatch(self, sink: &Arc<dyn NotificationSink>) {
        let tenant_id = self.tenant_id;
        for event in self.events {
            let kind = event.kind();
            let payload = match serde_json::to_value(&event) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::warn!(tenant_id = %tenant_id, kind = kind.as_str(), "Failed to encode notification: {}", e);
                    continue;
                }
            };
            if let Err(e) = sink.notify(kind, tenant_id, payload).await {
                tracing::warn!(tenant_id = %tenant_id, kind = kind.as_str(), "Failed to deliver notification: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    struct FlakySink {
        seen: Mutex<Vec<EventKind>>,
    }

    #[async_trait::async_trait]
    impl NotificationSink for FlakySink {
        async fn notify(
            &self,
            kind: EventKind,
            _tenant_id: Uuid,
            _payload: serde_json::Value,
        ) -> anyhow::Result<()> {
            self.seen.lock().push(kind);
            if kind == EventKind::ItemDeleted {
                anyhow::bail!("broadcaster unavailable");
            }
            Ok(())
        }
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let event = InventoryEvent::item_deleted(Uuid::nil(), Uuid::nil());
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event_type"], "item_deleted");
        assert_eq!(event.kind(), EventKind::ItemDeleted);
    }

    #[tokio::test]
    async fn test_dispatch_continues_after_failure() {
        let sink = Arc::new(FlakySink {
            seen: Mutex::new(Vec::new()),
        });
        let dyn_sink: Arc<dyn NotificationSink> = sink.clone();

        let mut hooks = PostCommit::new(Uuid::new_v4());
        hooks.push(InventoryEvent::item_deleted(Uuid::new_v4(), Uuid::new_v4()));
        hooks.push(InventoryEvent::inventory_reset(Uuid::new_v4()));
        assert_eq!(hooks.len(), 2);

        hooks.dispatch(&dyn_sink).await;

        assert_eq!(
            *sink.seen.lock(),
            vec![EventKind::ItemDeleted, EventKind::InventoryReset]
        );
    }

    #[tokio::test]
    async fn test_noop_sink() {
        let sink = NoOpNotificationSink;
        let result = sink
            .notify(EventKind::SchemaUpdated, Uuid::new_v4(), serde_json::json!({}))
            .await;
        assert!(result.is_ok());
    }
}
