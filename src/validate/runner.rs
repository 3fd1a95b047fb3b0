//! Runs every validator for one field and accumulates all failures.

use super::combinators::Check;
use super::result::ValidationResult;
use super::sequence::sequence;

/// Aggregate already-invoked results for a single field.
///
/// Passes with the last success value (`None` for no inputs) when all pass;
/// otherwise fails with every issue from every failing input, in order.
/// Nothing short-circuits: a failure never hides a later one.
pub fn run_validations<T>(
    results: impl IntoIterator<Item = ValidationResult<T>>,
) -> ValidationResult<Option<T>> {
    sequence(results).map(|mut values| values.pop())
}

/// Invoke each deferred check, then aggregate as [`run_validations`].
pub fn run_checks<T>(checks: &[Check<T>]) -> ValidationResult<Option<T>> {
    run_validations(checks.iter().map(Check::invoke))
}
