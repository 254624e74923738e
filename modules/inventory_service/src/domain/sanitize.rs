//! Best-effort coercion of loosely typed import cells
//!
//! Sanitizing never rejects a cell. Anything that cannot be coerced becomes
//! `null` with a warning and is left to the dynamic validator.

use super::validation::parse_instant;
use super::values::number_value;
use crate::contract::ColumnKind;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

#[allow(clippy::expect_used)]
static NUMBER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("static number pattern"));

const STRIPPED_CHARS: &[char] = &['$', '€', '£', '¥', '₹', ',', '_', '\'', ' ', '\u{a0}'];

/// Extra day formats tolerated from spreadsheets
const LOOSE_DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%d.%m.%Y", "%Y/%m/%d"];

/// Outcome of sanitizing one cell
#[derive(Debug, Clone, PartialEq)]
pub struct Sanitized {
    pub value: Value,
    pub warned: bool,
    pub warning_detail: Option<String>,
}

impl Sanitized {
    fn clean(value: Value) -> Self {
        Self {
            value,
            warned: false,
            warning_detail: None,
        }
    }

    fn warn(value: Value, detail: String) -> Self {
        Self {
            value,
            warned: true,
            warning_detail: Some(detail),
        }
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn sanitize_text(value: &Value) -> Sanitized {
    match value {
        Value::Null => Sanitized::clean(Value::Null),
        Value::String(s) => {
            let collapsed = collapse_whitespace(s);
            if collapsed.is_empty() {
                Sanitized::clean(Value::Null)
            } else {
                Sanitized::clean(Value::String(collapsed))
            }
        }
        Value::Number(_) | Value::Bool(_) => Sanitized::clean(Value::String(value.to_string())),
        other => Sanitized::warn(
            Value::Null,
            format!("Expected text but got structured value {}", other),
        ),
    }
}

fn sanitize_number(value: &Value) -> Sanitized {
    let raw = match value {
        Value::Null => return Sanitized::clean(Value::Null),
        Value::Number(_) => return Sanitized::clean(value.clone()),
        Value::String(s) => s.trim(),
        other => {
            return Sanitized::warn(
                Value::Null,
                format!("Could not parse a number from {}", other),
            )
        }
    };
    if raw.is_empty() {
        return Sanitized::clean(Value::Null);
    }

    let stripped: String = raw.chars().filter(|c| !STRIPPED_CHARS.contains(c)).collect();
    if let Ok(n) = stripped.parse::<f64>() {
        if n.is_finite() {
            return Sanitized::clean(number_value(n));
        }
    }

    match NUMBER_PATTERN
        .find(&stripped)
        .and_then(|m| m.as_str().parse::<f64>().ok())
    {
        Some(n) => Sanitized::warn(
            number_value(n),
            format!("Extracted {} from '{}'", n, raw),
        ),
        None => Sanitized::warn(
            Value::Null,
            format!("Could not parse a number from '{}'", raw),
        ),
    }
}

fn normalize_instant(instant: DateTime<Utc>) -> Value {
    Value::String(instant.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn sanitize_date(value: &Value) -> Sanitized {
    match value {
        Value::Null => Sanitized::clean(Value::Null),
        Value::String(s) if s.trim().is_empty() => Sanitized::clean(Value::Null),
        Value::String(s) => {
            let raw = s.trim();
            let parsed = parse_instant(raw).or_else(|| {
                LOOSE_DATE_FORMATS.iter().find_map(|fmt| {
                    NaiveDate::parse_from_str(raw, fmt)
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                        .map(|naive| naive.and_utc())
                })
            });
            match parsed {
                Some(instant) => Sanitized::clean(normalize_instant(instant)),
                None => Sanitized::warn(Value::Null, format!("Could not parse a date from '{}'", raw)),
            }
        }
        Value::Number(n) => match n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis) {
            Some(instant) => Sanitized::clean(normalize_instant(instant)),
            None => Sanitized::warn(Value::Null, format!("Could not parse a date from {}", n)),
        },
        other => Sanitized::warn(
            Value::Null,
            format!("Could not parse a date from {}", display(other)),
        ),
    }
}

fn sanitize_select(value: &Value) -> Sanitized {
    match value {
        Value::Null | Value::Array(_) | Value::Object(_) => Sanitized::clean(Value::Null),
        other => {
            let trimmed = display(other).trim().to_string();
            if trimmed.is_empty() {
                Sanitized::clean(Value::Null)
            } else {
                Sanitized::clean(Value::String(trimmed))
            }
        }
    }
}

/// Coerce one cell toward its column type
pub fn sanitize(value: &Value, kind: ColumnKind) -> Sanitized {
    match kind {
        ColumnKind::Text => sanitize_text(value),
        ColumnKind::Number | ColumnKind::Currency => sanitize_number(value),
        ColumnKind::Date => sanitize_date(value),
        ColumnKind::Select => sanitize_select(value),
    }
}
