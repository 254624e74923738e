//! Dynamic validation of item data and column lists

use crate::contract::{ColumnDefinition, ColumnKind, ColumnRole, InventoryError, ItemData};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Parse an instant from RFC 3339, `YYYY-MM-DD` (midnight UTC) or
/// `YYYY-MM-DD HH:MM:SS` (UTC)
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// True for null, missing and empty-string values
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

fn check_kind(column: &ColumnDefinition, value: &Value) -> Option<String> {
    match column.kind {
        ColumnKind::Text => {
            if value.is_string() {
                None
            } else {
                Some(format!("{} must be text", column.name))
            }
        }
        ColumnKind::Number | ColumnKind::Currency => match value.as_f64() {
            Some(n) if n.is_finite() => None,
            _ => Some(format!("{} must be a number", column.name)),
        },
        ColumnKind::Date => {
            let valid = match value {
                Value::String(s) => parse_instant(s).is_some(),
                Value::Number(n) => n
                    .as_i64()
                    .and_then(DateTime::<Utc>::from_timestamp_millis)
                    .is_some(),
                _ => false,
            };
            if valid {
                None
            } else {
                Some(format!("{} must be a valid date", column.name))
            }
        }
        ColumnKind::Select => match value.as_str() {
            Some(s) if column.options.iter().any(|o| o == s) => None,
            _ => Some(format!(
                "{} must be one of: {}",
                column.name,
                column.options.join(", ")
            )),
        },
    }
}

/// Type-check an item's field map against the active columns.
///
/// Keys without a matching column are ignored. Every failing column
/// contributes one message; nothing short-circuits.
pub fn validate_item_data(data: &ItemData, columns: &[ColumnDefinition]) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    for column in columns {
        let value = data.get(&column.id);
        if is_blank(value) {
            if column.required {
                errors.push(format!("{} is required", column.name));
            }
            continue;
        }
        if let Some(value) = value {
            if let Some(message) = check_kind(column, value) {
                errors.push(message);
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Same as [`validate_item_data`] but shaped as a contract error
pub fn ensure_valid_item_data(
    data: &ItemData,
    columns: &[ColumnDefinition],
) -> Result<(), InventoryError> {
    validate_item_data(data, columns).map_err(|errors| InventoryError::Validation { errors })
}

/// Validate a column list before it replaces a tenant's schema.
///
/// A role assigned twice is a `Conflict`; every other defect is collected
/// into one `Validation` error.
pub fn validate_columns(columns: &[ColumnDefinition]) -> Result<(), InventoryError> {
    let mut roles: HashMap<ColumnRole, &str> = HashMap::new();
    for column in columns {
        if let Some(role) = column.role {
            if let Some(first) = roles.insert(role, &column.name) {
                return Err(InventoryError::conflict(format!(
                    "Role '{}' is assigned to both '{}' and '{}'",
                    role.as_str(),
                    first,
                    column.name
                )));
            }
        }
    }

    let mut errors = Vec::new();
    let mut ids = HashSet::new();
    for column in columns {
        if column.id.trim().is_empty() {
            errors.push(format!("Column '{}' has an empty id", column.name));
        } else if !ids.insert(column.id.as_str()) {
            errors.push(format!("Duplicate column id '{}'", column.id));
        }
        if column.name.trim().is_empty() {
            errors.push(format!("Column '{}' has an empty name", column.id));
        }
        if column.kind == ColumnKind::Select && column.options.is_empty() {
            errors.push(format!(
                "Select column '{}' must define at least one option",
                column.name
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(InventoryError::Validation { errors })
    }
}
