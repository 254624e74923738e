//! Field-level and schema-level change diffing

use crate::contract::{
    ColumnDefinition, FieldChange, ItemData, SchemaChange, SchemaChangeType,
};
use serde_json::{Number, Value};
use std::collections::HashMap;

/// Deep structural equality where `null` and a missing value are the same
/// and numbers compare by numeric value (`1 == 1.0`).
pub fn values_equal(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (a, b) {
        (None | Some(Value::Null), None | Some(Value::Null)) => true,
        (Some(a), Some(b)) => deep_equal(a, b),
        _ => false,
    }
}

fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| deep_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(k, x)| b.get(k).is_some_and(|y| deep_equal(x, y)))
        }
        _ => false,
    }
}

fn integer(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

/// Integers compare exactly; `f64` only when either side is fractional
fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (integer(a), integer(b)) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn recorded(value: Option<&Value>) -> Value {
    value.cloned().unwrap_or(Value::Null)
}

/// Field changes between two snapshots, one per differing column, in column order.
///
/// Keys that are not columns of the current schema are never compared.
pub fn diff_changes(old: &ItemData, new: &ItemData, columns: &[ColumnDefinition]) -> Vec<FieldChange> {
    columns
        .iter()
        .filter_map(|column| {
            let before = old.get(&column.id);
            let after = new.get(&column.id);
            if values_equal(before, after) {
                return None;
            }
            Some(FieldChange {
                field: column.id.clone(),
                field_name: column.name.clone(),
                old_value: recorded(before),
                new_value: recorded(after),
            })
        })
        .collect()
}

fn role_label(column: &ColumnDefinition) -> &'static str {
    column.role.map(|r| r.as_str()).unwrap_or("none")
}

fn options_label(column: &ColumnDefinition) -> String {
    format!("[{}]", column.options.join(", "))
}

fn column_details(old: &ColumnDefinition, new: &ColumnDefinition) -> Vec<String> {
    let mut details = Vec::new();
    if old.name != new.name {
        details.push(format!("Name: {} → {}", old.name, new.name));
    }
    if old.kind != new.kind {
        details.push(format!("Type: {} → {}", old.kind.as_str(), new.kind.as_str()));
    }
    if old.role != new.role {
        details.push(format!("Role: {} → {}", role_label(old), role_label(new)));
    }
    if old.required != new.required {
        details.push(format!("Required: {} → {}", old.required, new.required));
    }
    if old.order != new.order {
        details.push(format!("Order: {} → {}", old.order, new.order));
    }
    if old.options != new.options {
        details.push(format!("Options: {} → {}", options_label(old), options_label(new)));
    }
    details
}

/// Structural changes between two column lists, keyed by column id.
///
/// Added and modified entries follow `new` order; removed entries follow
/// and keep `old` order.
pub fn diff_schema_changes(old: &[ColumnDefinition], new: &[ColumnDefinition]) -> Vec<SchemaChange> {
    let old_by_id: HashMap<&str, &ColumnDefinition> =
        old.iter().map(|c| (c.id.as_str(), c)).collect();
    let new_by_id: HashMap<&str, &ColumnDefinition> =
        new.iter().map(|c| (c.id.as_str(), c)).collect();

    let mut changes = Vec::new();

    for column in new {
        match old_by_id.get(column.id.as_str()) {
            None => changes.push(SchemaChange {
                change_type: SchemaChangeType::Added,
                column_id: column.id.clone(),
                column_name: column.name.clone(),
                details: "Column added".to_string(),
            }),
            Some(previous) => {
                let details = column_details(previous, column);
                if !details.is_empty() {
                    changes.push(SchemaChange {
                        change_type: SchemaChangeType::Modified,
                        column_id: column.id.clone(),
                        column_name: column.name.clone(),
                        details: details.join(", "),
                    });
                }
            }
        }
    }

    for column in old {
        if !new_by_id.contains_key(column.id.as_str()) {
            changes.push(SchemaChange {
                change_type: SchemaChangeType::Removed,
                column_id: column.id.clone(),
                column_name: column.name.clone(),
                details: "Column removed".to_string(),
            });
        }
    }

    changes
}
