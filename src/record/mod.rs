//! Records, field values and the annotation contract rules write through.

pub mod rules;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Stage;
use crate::validate::{Issues, Severity};

/// A typed scalar held by a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    /// Only produced by coercion; raw JSON dates arrive as `Text`.
    Date(NaiveDate),
}

impl FieldValue {
    /// Null, or text that is empty after trimming.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Untyped conversion used for fields a sheet does not declare.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => FieldValue::Null,
            serde_json::Value::Bool(b) => FieldValue::Bool(*b),
            serde_json::Value::Number(n) => n
                .as_f64()
                .map(FieldValue::Number)
                .unwrap_or_else(|| FieldValue::Text(n.to_string())),
            serde_json::Value::String(s) => FieldValue::Text(s.clone()),
            other => FieldValue::Text(other.to_string()),
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Text(s) => write!(f, "{s}"),
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// An issue attached to a record field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub field: String,
    pub message: String,
    pub severity: Severity,
    pub stage: Stage,
}

impl std::fmt::Display for Annotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}:{}] {}: {}",
            self.stage, self.severity, self.field, self.message
        )
    }
}

/// What the validation core needs from a caller-owned record.
pub trait Record {
    fn get(&self, field: &str) -> Option<&FieldValue>;

    /// Append a validation-stage annotation.
    fn add_issue(&mut self, field: &str, message: String, severity: Severity);

    /// Replace a field value, e.g. with its normalized form.
    fn set(&mut self, field: &str, value: FieldValue);
}

/// One row of a sheet: typed values plus every annotation found so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SheetRecord {
    /// Zero-based position in the source rows.
    pub row: usize,
    pub values: BTreeMap<String, FieldValue>,
    pub issues: Vec<Annotation>,
}

impl SheetRecord {
    pub fn new(row: usize) -> Self {
        SheetRecord {
            row,
            ..Default::default()
        }
    }

    pub fn with(mut self, field: &str, value: FieldValue) -> Self {
        self.set(field, value);
        self
    }

    pub fn annotate(&mut self, annotation: Annotation) {
        self.issues.push(annotation);
    }

    /// Copy validator issues onto `field`, keeping their stage.
    pub fn record_issues(&mut self, field: &str, issues: Issues) {
        for issue in issues {
            self.annotate(Annotation {
                field: field.to_string(),
                message: issue.text,
                severity: issue.severity,
                stage: issue.stage,
            });
        }
    }

    pub fn errors(&self) -> impl Iterator<Item = &Annotation> {
        self.issues.iter().filter(|a| a.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Annotation> {
        self.issues.iter().filter(|a| a.severity == Severity::Warn)
    }

    /// No error-severity annotations. Warnings do not block.
    pub fn is_accepted(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn issues_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a Annotation> {
        self.issues.iter().filter(move |a| a.field == field)
    }
}

impl Record for SheetRecord {
    fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    fn add_issue(&mut self, field: &str, message: String, severity: Severity) {
        self.annotate(Annotation {
            field: field.to_string(),
            message,
            severity,
            stage: Stage::Validation,
        });
    }

    fn set(&mut self, field: &str, value: FieldValue) {
        self.values.insert(field.to_string(), value);
    }
}
