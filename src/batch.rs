//! Whole-sheet validation: coerce, run rules, then check uniqueness across rows.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::error::SheetError;
use crate::parse::{self, RawRow};
use crate::record::{FieldValue, Record, SheetRecord};
use crate::schema::CompiledSheet;
use crate::validate::Severity;

/// Every validated record of one sheet plus acceptance counts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetReport {
    pub sheet: String,
    /// Records with no error-severity annotation.
    pub accepted: usize,
    pub blocked: usize,
    /// Total warning annotations across all records.
    pub warnings: usize,
    pub records: Vec<SheetRecord>,
}

impl SheetReport {
    pub fn blocked_records(&self) -> impl Iterator<Item = &SheetRecord> {
        self.records.iter().filter(|r| !r.is_accepted())
    }
}

/// Parse `rows_json` and validate every row against `sheet`.
pub fn validate_sheet(sheet: &CompiledSheet, rows_json: &str) -> Result<SheetReport, SheetError> {
    let rows = parse::parse_rows(rows_json)?;
    Ok(validate_rows(sheet, &rows))
}

#[instrument(skip_all, fields(sheet = %sheet.name(), rows = rows.len()))]
pub fn validate_rows(sheet: &CompiledSheet, rows: &[RawRow]) -> SheetReport {
    let mut records: Vec<SheetRecord> = rows
        .iter()
        .enumerate()
        .map(|(row, raw)| sheet.check_row(row, raw))
        .collect();

    flag_duplicates(sheet, &mut records);

    let accepted = records.iter().filter(|r| r.is_accepted()).count();
    let blocked = records.len() - accepted;
    let warnings = records.iter().map(|r| r.warnings().count()).sum();

    for record in records.iter().filter(|r| !r.is_accepted()) {
        debug!(
            row = record.row,
            errors = record.errors().count(),
            "row blocked"
        );
    }
    info!(accepted, blocked, warnings, "validated sheet");

    SheetReport {
        sheet: sheet.name().to_string(),
        accepted,
        blocked,
        warnings,
        records,
    }
}

/// Flag every repeat of a value in a `unique` field, pointing at its first row.
///
/// Runs after normalization, so equivalent spellings of one code collide.
fn flag_duplicates(sheet: &CompiledSheet, records: &mut [SheetRecord]) {
    for decl in sheet.schema().fields.iter().filter(|f| f.unique) {
        let mut first_seen: HashMap<String, usize> = HashMap::new();
        for record in records.iter_mut() {
            let Some(value) = record.get(&decl.name).filter(|v| !v.is_blank()) else {
                continue;
            };
            let key = unique_key(value);
            match first_seen.get(&key) {
                Some(&first_row) => record.add_issue(
                    &decl.name,
                    format!(
                        "Duplicate value '{}' for '{}', first seen in row {}",
                        key, decl.name, first_row
                    ),
                    Severity::Error,
                ),
                None => {
                    first_seen.insert(key, record.row);
                }
            }
        }
    }
}

fn unique_key(value: &FieldValue) -> String {
    match value {
        FieldValue::Text(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::builtin;

    fn products() -> CompiledSheet {
        builtin::products().unwrap().compile().unwrap()
    }

    #[test]
    fn normalized_upcs_collide() {
        let report = validate_sheet(
            &products(),
            r#"[
                {"page_id":"p1","sku":"A-1","name":"Mug","upc":"036000291452","price":9.5},
                {"page_id":"p1","sku":"A-2","name":"Cup","upc":"0036000291452","price":4}
            ]"#,
        )
        .unwrap();
        assert_eq!(report.accepted, 1);
        assert_eq!(report.blocked, 1);
        let dup = &report.records[1].issues[0];
        assert_eq!(dup.field, "upc");
        assert!(dup.message.contains("first seen in row 0"));
    }

    #[test]
    fn bad_rows_json_is_an_error() {
        let err = validate_sheet(&products(), "[1, 2").unwrap_err();
        assert_eq!(err.code(), "S002");
    }
}
