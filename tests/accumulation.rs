//! Integration tests for the runner, the sequencer and record rule chains.

#[allow(dead_code)]
mod helpers;

use helpers::*;
use sheetguard::record::rules::{self, RuleFn, fold, required};
use sheetguard::record::{FieldValue, Record, SheetRecord};
use sheetguard::validate::combinators::*;
use sheetguard::validate::{
    Issue, Issues, Severity, ValidationResult, run_checks, run_validations, sequence,
};

// =============================================================================
// Runner
// =============================================================================

#[test]
fn runner_reports_every_failing_validator() {
    let title = "An unusually long product title that keeps going";
    let result = run_checks(&[
        max_length(40).on(title),
        regex_match(regex::Regex::new("^[a-z ]+$").unwrap()).on(title),
        max_length(100).on(title),
    ]);
    assert_eq!(severities(&result), vec![Severity::Warn, Severity::Warn]);
    assert!(!result.is_blocking());
}

#[test]
fn runner_keeps_invocation_order() {
    let result = run_validations(vec![
        failing::<f64>("third-from-last"),
        ValidationResult::pass(1.0),
        failing("second-from-last"),
        failing("last"),
    ]);
    assert_eq!(
        issue_texts(&result),
        vec!["third-from-last", "second-from-last", "last"]
    );
}

#[test]
fn runner_pass_carries_last_value() {
    let result = run_validations(vec![ValidationResult::pass(1), ValidationResult::pass(2)]);
    assert_eq!(result, ValidationResult::pass(Some(2)));
}

// =============================================================================
// Sequencer
// =============================================================================

#[test]
fn sequence_unions_failures() {
    let mut bc = Issues::one(Issue::error("b"));
    bc.push(Issue::error("c"));
    let result = sequence(vec![
        ValidationResult::pass("ok"),
        failing("a"),
        ValidationResult::Fail(bc),
    ]);
    assert_eq!(issue_texts(&result), vec!["a", "b", "c"]);
}

#[test]
fn sequence_collects_values_across_fields() {
    let rating = range_inclusive(1.0, 5.0).on(4).invoke();
    let votes = whole_number().on(12).invoke();
    assert_eq!(
        sequence(vec![rating, votes]),
        ValidationResult::pass(vec![4.0, 12.0])
    );
}

#[test]
fn zip_combines_differently_typed_fields() {
    let upc = upc_or_ean().on("036000291452").invoke();
    let price = positive().on(0).invoke();
    let combined = upc.zip(price);
    assert_eq!(combined.issues().len(), 1);
    assert!(combined.is_blocking());
}

// =============================================================================
// Record rules
// =============================================================================

#[test]
fn required_page_id_null() {
    let chain = fold([required::<SheetRecord>("page_id")]);
    let record = chain.apply(SheetRecord::new(0).with("page_id", FieldValue::Null));
    assert_eq!(record.issues.len(), 1);
    assert_eq!(record.issues[0].field, "page_id");
    assert_eq!(record.issues[0].severity, Severity::Error);
    assert!(!record.is_accepted());
}

#[test]
fn required_absent_field() {
    let chain = fold([required::<SheetRecord>("sku")]);
    let record = chain.apply(SheetRecord::new(0));
    assert_eq!(record.issues[0].message, "'sku' is required");
}

#[test]
fn custom_rules_run_in_declared_order() {
    let tag = |label: &'static str| -> RuleFn<SheetRecord> {
        rules::rule(move |mut record: SheetRecord| {
            record.add_issue("order", label.to_string(), Severity::Warn);
            record
        })
    };
    let chain = fold([tag("one"), tag("two"), tag("three")]);
    let record = chain.apply(SheetRecord::new(0));
    let messages: Vec<&str> = record.issues.iter().map(|a| a.message.as_str()).collect();
    assert_eq!(messages, vec!["one", "two", "three"]);
    assert!(record.is_accepted());
}

#[test]
fn chain_accumulates_across_rules() {
    let chain = fold([
        required::<SheetRecord>("page_id"),
        rules::field_rule("rating", |value: &FieldValue| {
            let rating = value.as_number().unwrap_or(f64::NAN);
            run_validations([
                whole_number().on(rating).invoke(),
                range_inclusive(1.0, 5.0).on(rating).invoke(),
            ])
            .map(|v| v.map(FieldValue::Number))
        }),
        rules::not_greater_than("sale_price", "price"),
    ]);
    let record = chain.apply(
        SheetRecord::new(0)
            .with("rating", num(7.5))
            .with("price", num(2.0))
            .with("sale_price", num(3.0)),
    );
    let fields: Vec<&str> = record.issues.iter().map(|a| a.field.as_str()).collect();
    assert_eq!(fields, vec!["page_id", "rating", "rating", "sale_price"]);
}

#[test]
fn empty_chain_is_identity() {
    let chain = fold(Vec::<RuleFn<SheetRecord>>::new());
    assert!(chain.is_empty());
    let input = SheetRecord::new(4).with("page_id", text("p"));
    assert_eq!(chain.apply(input.clone()), input);
}
