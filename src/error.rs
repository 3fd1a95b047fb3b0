//! Stage tags for issues and the configuration-time error type.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pipeline stage that produced an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Raw row value could not be typed according to the field kind.
    Coerce,
    /// Field validators and record rules.
    Validation,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Coerce => write!(f, "Coerce"),
            Stage::Validation => write!(f, "Validation"),
        }
    }
}

/// Failures while loading sheet configuration or raw rows.
///
/// These never describe a bad record value; those surface as annotations.
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("[S001] failed to parse sheet schema JSON: {0}")]
    SchemaJson(#[source] serde_json::Error),

    #[error("[S002] failed to parse rows JSON: {0}")]
    RowsJson(#[source] serde_json::Error),

    #[error("[S003] field '{field}' is declared more than once in sheet '{sheet}'")]
    DuplicateField { sheet: String, field: String },

    #[error("[S004] field '{field}' has an invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        field: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("[S005] validator '{validator}' cannot be applied to {kind} field '{field}'")]
    IncompatibleValidator {
        field: String,
        validator: &'static str,
        kind: &'static str,
    },

    #[error("[S006] field '{field}' declares range {min}..={max} with min greater than max")]
    InvertedRange { field: String, min: f64, max: f64 },

    #[error("[S007] rule '{rule}' references undeclared field '{field}'")]
    UnknownRuleField { rule: &'static str, field: String },

    #[error("[S008] unknown built-in sheet '{0}'")]
    UnknownSheet(String),
}

impl SheetError {
    /// Stable diagnostic code, e.g. `S003`.
    pub fn code(&self) -> &'static str {
        match self {
            SheetError::SchemaJson(_) => "S001",
            SheetError::RowsJson(_) => "S002",
            SheetError::DuplicateField { .. } => "S003",
            SheetError::InvalidPattern { .. } => "S004",
            SheetError::IncompatibleValidator { .. } => "S005",
            SheetError::InvertedRange { .. } => "S006",
            SheetError::UnknownRuleField { .. } => "S007",
            SheetError::UnknownSheet(_) => "S008",
        }
    }
}
