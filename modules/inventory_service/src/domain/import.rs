//! Batch import of loosely typed rows

use super::access::{authorize, Permission};
use super::events::{InventoryEvent, PostCommit};
use super::sanitize::sanitize;
use super::service::Service;
use crate::contract::{
    ColumnDefinition, ImportReport, ImportRowFailure, ImportWarning, InventoryError, ItemData,
    SecurityContext,
};
use serde_json::Value;
use std::collections::HashMap;

/// Resolves a row key to a column by id, or by trimmed case-insensitive name
struct ColumnLookup<'a> {
    by_id: HashMap<&'a str, &'a ColumnDefinition>,
    by_name: HashMap<String, &'a ColumnDefinition>,
}

impl<'a> ColumnLookup<'a> {
    fn new(columns: &'a [ColumnDefinition]) -> Self {
        Self {
            by_id: columns.iter().map(|c| (c.id.as_str(), c)).collect(),
            by_name: columns
                .iter()
                .map(|c| (c.name.trim().to_lowercase(), c))
                .collect(),
        }
    }

    fn resolve(&self, key: &str) -> Option<&'a ColumnDefinition> {
        self.by_id
            .get(key)
            .or_else(|| self.by_name.get(&key.trim().to_lowercase()))
            .copied()
    }
}

fn failure_message(error: &InventoryError) -> String {
    match error {
        InventoryError::Validation { errors } => errors.join(", "),
        other => other.to_string(),
    }
}

impl Service {
    /// Import rows one by one; a bad row never blocks the others
    pub async fn import_items(
        &self,
        ctx: &SecurityContext,
        rows: Vec<ItemData>,
    ) -> Result<ImportReport, InventoryError> {
        let actor_id = authorize(ctx, Permission::Mutate)?;

        if rows.len() > self.config.max_import_rows {
            return Err(InventoryError::validation(format!(
                "Import is limited to {} rows, got {}",
                self.config.max_import_rows,
                rows.len()
            )));
        }

        let schema = self.require_schema(ctx.tenant_id).await?;
        let lookup = ColumnLookup::new(&schema.columns);
        let mut report = ImportReport::default();

        for (row, raw) in rows.into_iter().enumerate() {
            let mut data = ItemData::new();
            for (key, value) in &raw {
                let Some(column) = lookup.resolve(key) else {
                    tracing::debug!(row, key = %key, "Ignoring unknown import column");
                    continue;
                };
                let cell = sanitize(value, column.kind);
                if let Some(detail) = cell.warning_detail {
                    report.warnings.push(ImportWarning {
                        row,
                        column: column.id.clone(),
                        detail,
                    });
                }
                if !matches!(cell.value, Value::Null) {
                    data.insert(column.id.clone(), cell.value);
                }
            }

            let outcome = match self.item_creation(&schema, actor_id, data) {
                Ok((item, changes)) => {
                    let mut hooks = PostCommit::new(ctx.tenant_id);
                    hooks.push(InventoryEvent::item_created(&item, actor_id));
                    self.commit(changes, hooks).await.map(|()| item.id)
                }
                Err(error) => Err(error),
            };

            match outcome {
                Ok(item_id) => report.imported.push(item_id),
                Err(error) => report.failures.push(ImportRowFailure {
                    row,
                    message: failure_message(&error),
                }),
            }
        }

        tracing::info!(
            tenant_id = %ctx.tenant_id,
            imported = report.imported.len(),
            failed = report.failures.len(),
            warnings = report.warnings.len(),
            "Inventory import finished"
        );
        Ok(report)
    }
}
