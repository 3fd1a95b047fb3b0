//! Record-scope rules applied in a fixed order.
//!
//! A rule takes the record by value, appends annotations for anything it finds
//! wrong, and hands the record back. Rules never see each other's state except
//! through the record itself.

use tracing::debug;

use super::{FieldValue, Record};
use crate::validate::{Severity, ValidationResult};

pub type RuleFn<R> = Box<dyn Fn(R) -> R + Send + Sync>;

/// An ordered list of rules run as one function.
pub struct RuleChain<R> {
    rules: Vec<RuleFn<R>>,
}

/// Compose `rules` into a chain that applies them in the given order.
pub fn fold<R>(rules: impl IntoIterator<Item = RuleFn<R>>) -> RuleChain<R> {
    RuleChain {
        rules: rules.into_iter().collect(),
    }
}

/// Box a closure as a rule.
pub fn rule<R>(f: impl Fn(R) -> R + Send + Sync + 'static) -> RuleFn<R> {
    Box::new(f)
}

impl<R> RuleChain<R> {
    pub fn apply(&self, record: R) -> R {
        debug!(rules = self.rules.len(), "applying record rules");
        self.rules.iter().fold(record, |record, rule| rule(record))
    }

    pub fn push(&mut self, rule: RuleFn<R>) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<R> Default for RuleChain<R> {
    fn default() -> Self {
        RuleChain { rules: Vec::new() }
    }
}

impl<R> std::fmt::Debug for RuleChain<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleChain")
            .field("rules", &self.rules.len())
            .finish()
    }
}

fn is_missing<R: Record>(record: &R, field: &str) -> bool {
    record.get(field).is_none_or(FieldValue::is_blank)
}

/// Missing, null or blank `field` is a blocking error.
pub fn required<R: Record + 'static>(field: impl Into<String>) -> RuleFn<R> {
    let field = field.into();
    rule(move |mut record: R| {
        if is_missing(&record, &field) {
            record.add_issue(&field, format!("'{field}' is required"), Severity::Error);
        }
        record
    })
}

/// Run a per-field validation and copy its outcome onto the record.
///
/// Blank values are skipped; `required` reports those. A passing validation
/// that yields a value writes it back, which is how normalization lands.
pub fn field_rule<R, F>(field: impl Into<String>, validate: F) -> RuleFn<R>
where
    R: Record + 'static,
    F: Fn(&FieldValue) -> ValidationResult<Option<FieldValue>> + Send + Sync + 'static,
{
    let field = field.into();
    rule(move |mut record: R| {
        let outcome = record
            .get(&field)
            .filter(|value| !value.is_blank())
            .map(|value| validate(value));
        let Some(outcome) = outcome else {
            return record;
        };
        match outcome {
            ValidationResult::Pass(Some(normalized)) => {
                if record.get(&field) != Some(&normalized) {
                    record.set(&field, normalized);
                }
            }
            ValidationResult::Pass(None) => {}
            ValidationResult::Fail(issues) => {
                for issue in issues {
                    record.add_issue(&field, issue.text, issue.severity);
                }
            }
        }
        record
    })
}

/// `field` must not exceed `limit` when both are numbers.
pub fn not_greater_than<R: Record + 'static>(
    field: impl Into<String>,
    limit: impl Into<String>,
) -> RuleFn<R> {
    let field = field.into();
    let limit = limit.into();
    rule(move |mut record: R| {
        let value = record.get(&field).and_then(FieldValue::as_number);
        let bound = record.get(&limit).and_then(FieldValue::as_number);
        if let (Some(value), Some(bound)) = (value, bound) {
            if value > bound {
                record.add_issue(
                    &field,
                    format!("'{field}' ({value}) must not exceed '{limit}' ({bound})"),
                    Severity::Error,
                );
            }
        }
        record
    })
}

/// `field` becomes required once `trigger` holds a value.
pub fn required_with<R: Record + 'static>(
    field: impl Into<String>,
    trigger: impl Into<String>,
) -> RuleFn<R> {
    let field = field.into();
    let trigger = trigger.into();
    rule(move |mut record: R| {
        if !is_missing(&record, &trigger) && is_missing(&record, &field) {
            record.add_issue(
                &field,
                format!("'{field}' is required when '{trigger}' is set"),
                Severity::Error,
            );
        }
        record
    })
}
