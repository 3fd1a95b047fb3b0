//! Two-armed validation outcome with severity-tagged issues.

use serde::{Deserialize, Serialize};

use crate::error::Stage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks acceptance of the record.
    Error,
    /// Advisory only.
    Warn,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warn => write!(f, "warn"),
        }
    }
}

/// A single problem found by a validator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub text: String,
    pub severity: Severity,
    pub stage: Stage,
}

impl Issue {
    pub fn new(text: impl Into<String>, severity: Severity) -> Self {
        Issue {
            text: text.into(),
            severity,
            stage: Stage::Validation,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Issue::new(text, Severity::Error)
    }

    pub fn warn(text: impl Into<String>) -> Self {
        Issue::new(text, Severity::Warn)
    }

    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}:{}] {}", self.stage, self.severity, self.text)
    }
}

/// Ordered, non-empty list of issues.
///
/// There is no way to build an empty `Issues`, so a `Fail` always explains itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Issues(Vec<Issue>);

impl Issues {
    pub fn one(issue: Issue) -> Self {
        Issues(vec![issue])
    }

    /// Returns `None` for an empty vector.
    pub fn from_vec(issues: Vec<Issue>) -> Option<Self> {
        if issues.is_empty() {
            None
        } else {
            Some(Issues(issues))
        }
    }

    /// Concatenate `other` after `self`, preserving order.
    pub fn append(&mut self, other: Issues) {
        self.0.extend(other.0);
    }

    pub fn push(&mut self, issue: Issue) {
        self.0.push(issue);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Issue> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Issue] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Issue> {
        self.0
    }

    pub fn has_blocking(&self) -> bool {
        self.0.iter().any(Issue::is_blocking)
    }
}

impl IntoIterator for Issues {
    type Item = Issue;
    type IntoIter = std::vec::IntoIter<Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Issues {
    type Item = &'a Issue;
    type IntoIter = std::slice::Iter<'a, Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Issue> for Issues {
    fn from(issue: Issue) -> Self {
        Issues::one(issue)
    }
}

/// Outcome of a validation: the (possibly normalized) value, or every issue found.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "lowercase")]
pub enum ValidationResult<T> {
    Pass(T),
    Fail(Issues),
}

impl<T> ValidationResult<T> {
    pub fn pass(value: T) -> Self {
        ValidationResult::Pass(value)
    }

    pub fn fail(issue: Issue) -> Self {
        ValidationResult::Fail(Issues::one(issue))
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, ValidationResult::Pass(_))
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, ValidationResult::Fail(_))
    }

    /// True when at least one issue has error severity.
    pub fn is_blocking(&self) -> bool {
        match self {
            ValidationResult::Pass(_) => false,
            ValidationResult::Fail(issues) => issues.has_blocking(),
        }
    }

    /// Issues carried by a failure; empty for a pass.
    pub fn issues(&self) -> &[Issue] {
        match self {
            ValidationResult::Pass(_) => &[],
            ValidationResult::Fail(issues) => issues.as_slice(),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ValidationResult<U> {
        match self {
            ValidationResult::Pass(v) => ValidationResult::Pass(f(v)),
            ValidationResult::Fail(issues) => ValidationResult::Fail(issues),
        }
    }

    /// Short-circuiting chain: `f` only runs on a pass.
    ///
    /// Use `zip` or [`sequence`](super::sequence::sequence) when sibling failures
    /// must all be reported.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> ValidationResult<U>) -> ValidationResult<U> {
        match self {
            ValidationResult::Pass(v) => f(v),
            ValidationResult::Fail(issues) => ValidationResult::Fail(issues),
        }
    }

    /// Accumulating pair: both sides are always inspected.
    pub fn zip<U>(self, other: ValidationResult<U>) -> ValidationResult<(T, U)> {
        match (self, other) {
            (ValidationResult::Pass(a), ValidationResult::Pass(b)) => ValidationResult::Pass((a, b)),
            (ValidationResult::Fail(mut a), ValidationResult::Fail(b)) => {
                a.append(b);
                ValidationResult::Fail(a)
            }
            (ValidationResult::Fail(a), ValidationResult::Pass(_))
            | (ValidationResult::Pass(_), ValidationResult::Fail(a)) => ValidationResult::Fail(a),
        }
    }
}
