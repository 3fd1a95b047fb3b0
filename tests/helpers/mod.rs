use sheetguard::batch::{self, SheetReport};
use sheetguard::record::FieldValue;
use sheetguard::schema::{CompiledSheet, builtin};
use sheetguard::validate::{Issue, Severity, ValidationResult};

// =============================================================================
// Values and results
// =============================================================================

pub fn text(s: &str) -> FieldValue {
    FieldValue::Text(s.to_string())
}

pub fn num(n: f64) -> FieldValue {
    FieldValue::Number(n)
}

pub fn issue_texts<T>(result: &ValidationResult<T>) -> Vec<String> {
    result.issues().iter().map(|i| i.text.clone()).collect()
}

pub fn severities<T>(result: &ValidationResult<T>) -> Vec<Severity> {
    result.issues().iter().map(|i| i.severity).collect()
}

/// A failing result whose single issue text is `label`.
pub fn failing<T>(label: &str) -> ValidationResult<T> {
    ValidationResult::fail(Issue::error(label))
}

// =============================================================================
// GTIN codes
// =============================================================================

/// GS1 check digit, weighted from the right: the digit next to the check
/// digit has weight 3. Works for 11-digit UPC and 12-digit EAN payloads.
pub fn gs1_check_digit(payload: &str) -> char {
    let sum: u32 = payload
        .chars()
        .rev()
        .enumerate()
        .map(|(i, c)| {
            let d = c.to_digit(10).expect("payload must be digits");
            if i % 2 == 0 { d * 3 } else { d }
        })
        .sum();
    char::from_digit((10 - sum % 10) % 10, 10).expect("single digit")
}

pub fn with_check_digit(payload: &str) -> String {
    format!("{payload}{}", gs1_check_digit(payload))
}

// =============================================================================
// Sheets
// =============================================================================

pub fn compiled(name: &str) -> CompiledSheet {
    builtin::by_name(name)
        .expect("built-in sheet should parse")
        .compile()
        .expect("built-in sheet should compile")
}

pub fn run_sheet(name: &str, rows_json: &str) -> SheetReport {
    batch::validate_sheet(&compiled(name), rows_json).expect("rows should parse")
}

/// `(field, severity)` pairs for one record, in annotation order.
pub fn annotation_pairs(report: &SheetReport, row: usize) -> Vec<(String, Severity)> {
    report.records[row]
        .issues
        .iter()
        .map(|a| (a.field.clone(), a.severity))
        .collect()
}
