//! Parametrized field validators.
//!
//! Each factory returns a validator configured once; binding it to a value with
//! [`FieldValidator::on`] yields a deferred [`Check`] that runs when invoked.
//!
//! ```
//! use sheetguard::validate::combinators::{max_length, FieldValidator};
//!
//! let check = max_length(40).on("Wireless Earbuds");
//! assert!(check.invoke().is_pass());
//! ```

use regex::Regex;

use super::checksum::{self, GtinError};
use super::result::{Issue, Severity, ValidationResult};

/// Smallest accepted price when no explicit minimum is given (one cent).
pub const DEFAULT_POSITIVE_MIN: f64 = 0.01;

/// A validator bound to a value, evaluated on demand.
pub struct Check<T> {
    run: Box<dyn Fn() -> ValidationResult<T> + Send + Sync>,
}

impl<T> Check<T> {
    pub fn new(run: impl Fn() -> ValidationResult<T> + Send + Sync + 'static) -> Self {
        Check { run: Box::new(run) }
    }

    pub fn invoke(&self) -> ValidationResult<T> {
        (self.run)()
    }

    /// Transform the success value once the check runs.
    pub fn map<U>(self, f: impl Fn(T) -> U + Send + Sync + 'static) -> Check<U>
    where
        T: 'static,
    {
        Check::new(move || self.invoke().map(&f))
    }
}

impl<T> std::fmt::Debug for Check<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Check").finish_non_exhaustive()
    }
}

/// A configured constraint over one primitive field value.
pub trait FieldValidator: Send + Sync + 'static {
    type Value: Clone + Send + Sync + 'static;

    /// Short name used in diagnostics, e.g. `maxLength`.
    fn name(&self) -> &'static str;

    fn severity(&self) -> Severity;

    fn validate(&self, value: &Self::Value) -> ValidationResult<Self::Value>;

    /// Close over `value` and defer evaluation.
    fn on(self, value: impl Into<Self::Value>) -> Check<Self::Value>
    where
        Self: Sized,
    {
        let value = value.into();
        Check::new(move || self.validate(&value))
    }
}

// ---------------------------------------------------------------------------
// max-length
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct MaxLength {
    pub max: usize,
}

pub fn max_length(max: usize) -> MaxLength {
    MaxLength { max }
}

impl FieldValidator for MaxLength {
    type Value = String;

    fn name(&self) -> &'static str {
        "maxLength"
    }

    fn severity(&self) -> Severity {
        Severity::Warn
    }

    fn validate(&self, value: &String) -> ValidationResult<String> {
        let len = value.chars().count();
        if len > self.max {
            return ValidationResult::fail(Issue::new(
                format!("Must be at most {} characters, found {}", self.max, len),
                self.severity(),
            ));
        }
        ValidationResult::pass(value.clone())
    }
}

// ---------------------------------------------------------------------------
// whole-number
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct WholeNumber;

pub fn whole_number() -> WholeNumber {
    WholeNumber
}

impl FieldValidator for WholeNumber {
    type Value = f64;

    fn name(&self) -> &'static str {
        "wholeNumber"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn validate(&self, value: &f64) -> ValidationResult<f64> {
        // NaN and infinities have a non-zero (NaN) fractional part.
        if value.fract() != 0.0 {
            return ValidationResult::fail(Issue::new(
                format!("Must be a whole number, found {value}"),
                self.severity(),
            ));
        }
        ValidationResult::pass(*value)
    }
}

// ---------------------------------------------------------------------------
// range-inclusive
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct RangeInclusive {
    pub min: f64,
    pub max: f64,
}

pub fn range_inclusive(min: f64, max: f64) -> RangeInclusive {
    RangeInclusive { min, max }
}

impl FieldValidator for RangeInclusive {
    type Value = f64;

    fn name(&self) -> &'static str {
        "rangeInclusive"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn validate(&self, value: &f64) -> ValidationResult<f64> {
        if !(self.min..=self.max).contains(value) {
            return ValidationResult::fail(Issue::new(
                format!(
                    "Must be between {} and {} inclusive, found {}",
                    self.min, self.max, value
                ),
                self.severity(),
            ));
        }
        ValidationResult::pass(*value)
    }
}

// ---------------------------------------------------------------------------
// regex-match
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RegexMatch {
    pub pattern: Regex,
}

/// Unanchored match; anchor the pattern with `^...$` for whole-value matching.
pub fn regex_match(pattern: Regex) -> RegexMatch {
    RegexMatch { pattern }
}

impl FieldValidator for RegexMatch {
    type Value = String;

    fn name(&self) -> &'static str {
        "regexMatch"
    }

    fn severity(&self) -> Severity {
        Severity::Warn
    }

    fn validate(&self, value: &String) -> ValidationResult<String> {
        if !self.pattern.is_match(value) {
            return ValidationResult::fail(Issue::new(
                format!("Does not match pattern '{}'", self.pattern.as_str()),
                self.severity(),
            ));
        }
        ValidationResult::pass(value.clone())
    }
}

// ---------------------------------------------------------------------------
// positive
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct Positive {
    pub min: f64,
}

/// Positive amount with the default one-cent minimum.
pub fn positive() -> Positive {
    Positive {
        min: DEFAULT_POSITIVE_MIN,
    }
}

pub fn positive_min(min: f64) -> Positive {
    Positive { min }
}

impl FieldValidator for Positive {
    type Value = f64;

    fn name(&self) -> &'static str {
        "positive"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn validate(&self, value: &f64) -> ValidationResult<f64> {
        // Written as a negated `>=` so NaN is rejected.
        if !(*value >= self.min) {
            return ValidationResult::fail(Issue::new(
                format!("Must be at least {}, found {}", self.min, value),
                self.severity(),
            ));
        }
        ValidationResult::pass(*value)
    }
}

// ---------------------------------------------------------------------------
// upc-or-ean
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct UpcOrEan;

pub fn upc_or_ean() -> UpcOrEan {
    UpcOrEan
}

impl FieldValidator for UpcOrEan {
    type Value = String;

    fn name(&self) -> &'static str {
        "upcOrEan"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    /// Passes with the normalized 13-digit code.
    fn validate(&self, value: &String) -> ValidationResult<String> {
        match checksum::validate_gtin(value) {
            Ok(code) => ValidationResult::pass(code),
            Err(GtinError::Malformed) => ValidationResult::fail(Issue::new(
                format!("'{value}' is not a 12-digit UPC or 13-digit EAN"),
                self.severity(),
            )),
            Err(GtinError::CheckDigit { expected, found }) => ValidationResult::fail(Issue::new(
                format!("Invalid check digit in '{value}': expected {expected}, found {found}"),
                self.severity(),
            )),
        }
    }
}
