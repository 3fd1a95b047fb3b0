//! Parse phase: rows JSON → typed `SheetRecord`s.
//!
//! Coercion is the type layer the validators rely on. A value that cannot be
//! typed is annotated at the `Coerce` stage and kept as raw text, so typed
//! validators skip it instead of reporting a second, misleading issue.

use chrono::{DateTime, NaiveDate};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{SheetError, Stage};
use crate::record::{Annotation, FieldValue, Record, SheetRecord};
use crate::schema::{FieldKind, SheetSchema};
use crate::validate::Severity;

pub type RawRow = Map<String, Value>;

/// Deserialize a JSON array of row objects.
pub fn parse_rows(json: &str) -> Result<Vec<RawRow>, SheetError> {
    serde_json::from_str::<Vec<RawRow>>(json).map_err(SheetError::RowsJson)
}

/// Type every declared field of `raw`, filling defaults, and carry undeclared
/// fields through with a warning.
pub fn coerce_row(schema: &SheetSchema, row: usize, raw: &RawRow) -> SheetRecord {
    let mut record = SheetRecord::new(row);

    for decl in &schema.fields {
        let value = raw
            .get(&decl.name)
            .filter(|v| !is_missing(decl.kind, v))
            .or(decl.default.as_ref());
        let Some(value) = value else {
            record.set(&decl.name, FieldValue::Null);
            continue;
        };

        match coerce_value(decl.kind, value) {
            Ok(typed) => record.set(&decl.name, typed),
            Err(message) => {
                record.annotate(Annotation {
                    field: decl.name.clone(),
                    message,
                    severity: Severity::Error,
                    stage: Stage::Coerce,
                });
                record.set(&decl.name, FieldValue::from_json(value));
            }
        }
    }

    for (key, value) in raw {
        if schema.field(key).is_some() {
            continue;
        }
        warn!(sheet = %schema.name, row, field = %key, "undeclared field");
        record.annotate(Annotation {
            field: key.clone(),
            message: format!("Field '{}' is not declared in sheet '{}'", key, schema.name),
            severity: Severity::Warn,
            stage: Stage::Coerce,
        });
        record.set(key, FieldValue::from_json(value));
    }

    debug!(sheet = %schema.name, row, fields = record.values.len(), "coerced row");
    record
}

/// Null, or a blank cell in a non-text column.
fn is_missing(kind: FieldKind, value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => kind != FieldKind::Text && s.trim().is_empty(),
        _ => false,
    }
}

/// Convert one raw JSON value to the primitive type of `kind`.
///
/// Blank strings become `Null` for every kind except text.
pub fn coerce_value(kind: FieldKind, value: &Value) -> Result<FieldValue, String> {
    if value.is_null() {
        return Ok(FieldValue::Null);
    }
    if let Value::String(s) = value {
        if kind != FieldKind::Text && s.trim().is_empty() {
            return Ok(FieldValue::Null);
        }
    }

    match (kind, value) {
        (FieldKind::Text, Value::String(s)) => Ok(FieldValue::Text(s.clone())),
        (FieldKind::Text, Value::Number(n)) => Ok(FieldValue::Text(n.to_string())),
        (FieldKind::Text, Value::Bool(b)) => Ok(FieldValue::Text(b.to_string())),

        (FieldKind::Number, Value::Number(n)) => n
            .as_f64()
            .map(FieldValue::Number)
            .ok_or_else(|| format!("Expected a number, found '{n}'")),
        (FieldKind::Number, Value::String(s)) => match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(FieldValue::Number(n)),
            _ => Err(format!("Expected a number, found '{s}'")),
        },

        (FieldKind::Boolean, Value::Bool(b)) => Ok(FieldValue::Bool(*b)),
        (FieldKind::Boolean, Value::String(s)) => parse_bool(s)
            .map(FieldValue::Bool)
            .ok_or_else(|| format!("Expected true/false, found '{s}'")),
        (FieldKind::Boolean, Value::Number(n)) => match n.as_i64() {
            Some(0) => Ok(FieldValue::Bool(false)),
            Some(1) => Ok(FieldValue::Bool(true)),
            _ => Err(format!("Expected true/false, found '{n}'")),
        },

        (FieldKind::Date, Value::String(s)) => parse_date(s.trim())
            .map(FieldValue::Date)
            .ok_or_else(|| format!("Expected a date (YYYY-MM-DD), found '{s}'")),

        (kind, other) => Err(format!(
            "Expected {}, found {}",
            kind.as_str(),
            json_type_name(other)
        )),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

/// Plain `YYYY-MM-DD`, or the date part of an RFC 3339 timestamp.
fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "text",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_strings_become_numbers() {
        assert_eq!(
            coerce_value(FieldKind::Number, &json!(" 4.5 ")),
            Ok(FieldValue::Number(4.5))
        );
        assert!(coerce_value(FieldKind::Number, &json!("NaN")).is_err());
        assert!(coerce_value(FieldKind::Number, &json!("four")).is_err());
    }

    #[test]
    fn blank_strings_are_null_except_for_text() {
        assert_eq!(coerce_value(FieldKind::Number, &json!("")), Ok(FieldValue::Null));
        assert_eq!(
            coerce_value(FieldKind::Text, &json!("")),
            Ok(FieldValue::Text(String::new()))
        );
    }

    #[test]
    fn blank_cells_count_as_missing_except_for_text() {
        assert!(is_missing(FieldKind::Boolean, &json!("  ")));
        assert!(is_missing(FieldKind::Number, &json!(null)));
        assert!(!is_missing(FieldKind::Text, &json!("")));
        assert!(!is_missing(FieldKind::Number, &json!(0)));
    }

    #[test]
    fn numbers_become_text_for_text_fields() {
        assert_eq!(
            coerce_value(FieldKind::Text, &json!(4006381333931_u64)),
            Ok(FieldValue::Text("4006381333931".into()))
        );
    }

    #[test]
    fn dates_accept_plain_and_rfc3339() {
        let expected = FieldValue::Date(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(coerce_value(FieldKind::Date, &json!("2024-03-09")), Ok(expected.clone()));
        assert_eq!(
            coerce_value(FieldKind::Date, &json!("2024-03-09T12:30:00Z")),
            Ok(expected)
        );
        assert!(coerce_value(FieldKind::Date, &json!("2024-13-40")).is_err());
    }

    #[test]
    fn booleans_accept_common_spellings() {
        assert_eq!(coerce_value(FieldKind::Boolean, &json!("Yes")), Ok(FieldValue::Bool(true)));
        assert_eq!(coerce_value(FieldKind::Boolean, &json!(0)), Ok(FieldValue::Bool(false)));
        assert!(coerce_value(FieldKind::Boolean, &json!("maybe")).is_err());
    }

    #[test]
    fn arrays_are_rejected() {
        assert_eq!(
            coerce_value(FieldKind::Number, &json!([1])),
            Err("Expected number, found array".to_string())
        );
    }

    #[test]
    fn parse_rows_rejects_non_array() {
        let err = parse_rows(r#"{"page_id": "p"}"#).unwrap_err();
        assert_eq!(err.code(), "S002");
    }
}
