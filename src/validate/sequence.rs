//! Applicative combination of independent validation results.

use super::result::{Issues, ValidationResult};

/// Combine independent results into one.
///
/// Passes with every value in input order when all inputs pass. Otherwise fails
/// with the issues of every failing input, concatenated in input order.
pub fn sequence<T>(results: impl IntoIterator<Item = ValidationResult<T>>) -> ValidationResult<Vec<T>> {
    let mut values = Vec::new();
    let mut failures: Option<Issues> = None;

    for result in results {
        match result {
            // Values are irrelevant once anything has failed.
            ValidationResult::Pass(v) => {
                if failures.is_none() {
                    values.push(v);
                }
            }
            ValidationResult::Fail(issues) => match failures.as_mut() {
                Some(acc) => acc.append(issues),
                None => failures = Some(issues),
            },
        }
    }

    match failures {
        None => ValidationResult::Pass(values),
        Some(issues) => ValidationResult::Fail(issues),
    }
}

impl<T> FromIterator<ValidationResult<T>> for ValidationResult<Vec<T>> {
    fn from_iter<I: IntoIterator<Item = ValidationResult<T>>>(iter: I) -> Self {
        sequence(iter)
    }
}
