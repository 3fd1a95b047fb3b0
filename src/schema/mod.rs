//! Declarative sheet schemas and their compilation into rule chains.
//!
//! A sheet is plain configuration: field names, kinds, flags and validator
//! lists. Compiling it checks the configuration once and produces a
//! [`CompiledSheet`] whose rule chain drives the validation engine.

pub mod builtin;

use std::collections::HashSet;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::SheetError;
use crate::record::rules::{self, RuleChain};
use crate::record::{FieldValue, SheetRecord};
use crate::validate::combinators::{self, Check, FieldValidator};
use crate::validate::run_checks;

// =============================================================================
// DECLARATIONS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetSchema {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub fields: Vec<FieldDecl>,
    /// Record-scope rules, run after every field rule.
    #[serde(default)]
    pub rules: Vec<RecordRuleSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDecl {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    /// Checked across all rows of one sheet run.
    #[serde(default)]
    pub unique: bool,
    /// Raw value used when the row omits the field or holds null.
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    /// Run in order; the last passing value is written back.
    #[serde(default)]
    pub validators: Vec<ValidatorSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Boolean,
    Date,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Date => "date",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "camelCase")]
pub enum ValidatorSpec {
    MaxLength {
        max: usize,
    },
    WholeNumber,
    RangeInclusive {
        min: f64,
        max: f64,
    },
    RegexMatch {
        pattern: String,
    },
    Positive {
        #[serde(default = "default_positive_min")]
        min: f64,
    },
    UpcOrEan,
}

fn default_positive_min() -> f64 {
    combinators::DEFAULT_POSITIVE_MIN
}

impl ValidatorSpec {
    pub fn name(&self) -> &'static str {
        match self {
            ValidatorSpec::MaxLength { .. } => "maxLength",
            ValidatorSpec::WholeNumber => "wholeNumber",
            ValidatorSpec::RangeInclusive { .. } => "rangeInclusive",
            ValidatorSpec::RegexMatch { .. } => "regexMatch",
            ValidatorSpec::Positive { .. } => "positive",
            ValidatorSpec::UpcOrEan => "upcOrEan",
        }
    }

    fn accepts(&self) -> FieldKind {
        match self {
            ValidatorSpec::MaxLength { .. }
            | ValidatorSpec::RegexMatch { .. }
            | ValidatorSpec::UpcOrEan => FieldKind::Text,
            ValidatorSpec::WholeNumber
            | ValidatorSpec::RangeInclusive { .. }
            | ValidatorSpec::Positive { .. } => FieldKind::Number,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "camelCase")]
pub enum RecordRuleSpec {
    /// `field` must not exceed `limit` when both hold numbers.
    NotGreaterThan { field: String, limit: String },
    /// `field` is required whenever `when` holds a value.
    RequiredWith { field: String, when: String },
}

impl RecordRuleSpec {
    fn name(&self) -> &'static str {
        match self {
            RecordRuleSpec::NotGreaterThan { .. } => "notGreaterThan",
            RecordRuleSpec::RequiredWith { .. } => "requiredWith",
        }
    }

    fn referenced_fields(&self) -> [&str; 2] {
        match self {
            RecordRuleSpec::NotGreaterThan { field, limit } => [field.as_str(), limit.as_str()],
            RecordRuleSpec::RequiredWith { field, when } => [field.as_str(), when.as_str()],
        }
    }
}

impl SheetSchema {
    /// Deserialize a sheet from its JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, SheetError> {
        serde_json::from_str(json).map_err(SheetError::SchemaJson)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check the configuration and build the rule chain.
    ///
    /// Per field, in declaration order: the required rule, then the field's
    /// validators as one accumulating rule. Record rules follow in order.
    pub fn compile(self) -> Result<CompiledSheet, SheetError> {
        let mut seen = HashSet::new();
        let mut chain: RuleChain<SheetRecord> = RuleChain::default();

        for decl in &self.fields {
            if !seen.insert(decl.name.as_str()) {
                return Err(SheetError::DuplicateField {
                    sheet: self.name.clone(),
                    field: decl.name.clone(),
                });
            }

            if decl.required {
                chain.push(rules::required(decl.name.clone()));
            }

            let binders = decl
                .validators
                .iter()
                .map(|spec| compile_validator(decl, spec))
                .collect::<Result<Vec<_>, _>>()?;
            if !binders.is_empty() {
                chain.push(rules::field_rule(decl.name.clone(), move |value: &FieldValue| {
                    let checks: Vec<Check<FieldValue>> =
                        binders.iter().filter_map(|bind| bind(value)).collect();
                    run_checks(&checks)
                }));
            }
        }

        for spec in &self.rules {
            if let Some(missing) = spec
                .referenced_fields()
                .into_iter()
                .find(|name| !seen.contains(name))
            {
                return Err(SheetError::UnknownRuleField {
                    rule: spec.name(),
                    field: missing.to_string(),
                });
            }
            chain.push(match spec {
                RecordRuleSpec::NotGreaterThan { field, limit } => {
                    rules::not_greater_than(field.clone(), limit.clone())
                }
                RecordRuleSpec::RequiredWith { field, when } => {
                    rules::required_with(field.clone(), when.clone())
                }
            });
        }

        Ok(CompiledSheet {
            schema: self,
            chain,
        })
    }
}

// =============================================================================
// COMPILATION
// =============================================================================

/// Binds a configured validator to a field value. `None` when the value is not
/// of the validator's primitive type; coercion has already reported that.
type Binder = Box<dyn Fn(&FieldValue) -> Option<Check<FieldValue>> + Send + Sync>;

fn bind_text<V>(validator: V) -> Binder
where
    V: FieldValidator<Value = String> + Clone,
{
    Box::new(move |value: &FieldValue| {
        let text = value.as_text()?;
        Some(validator.clone().on(text).map(FieldValue::Text))
    })
}

fn bind_number<V>(validator: V) -> Binder
where
    V: FieldValidator<Value = f64> + Clone,
{
    Box::new(move |value: &FieldValue| {
        let number = value.as_number()?;
        Some(validator.clone().on(number).map(FieldValue::Number))
    })
}

fn compile_validator(decl: &FieldDecl, spec: &ValidatorSpec) -> Result<Binder, SheetError> {
    if spec.accepts() != decl.kind {
        return Err(SheetError::IncompatibleValidator {
            field: decl.name.clone(),
            validator: spec.name(),
            kind: decl.kind.as_str(),
        });
    }

    let binder = match spec {
        ValidatorSpec::MaxLength { max } => bind_text(combinators::max_length(*max)),
        ValidatorSpec::WholeNumber => bind_number(combinators::whole_number()),
        ValidatorSpec::RangeInclusive { min, max } => {
            if min > max {
                return Err(SheetError::InvertedRange {
                    field: decl.name.clone(),
                    min: *min,
                    max: *max,
                });
            }
            bind_number(combinators::range_inclusive(*min, *max))
        }
        ValidatorSpec::RegexMatch { pattern } => {
            let regex = Regex::new(pattern).map_err(|source| SheetError::InvalidPattern {
                field: decl.name.clone(),
                pattern: pattern.clone(),
                source,
            })?;
            bind_text(combinators::regex_match(regex))
        }
        ValidatorSpec::Positive { min } => bind_number(combinators::positive_min(*min)),
        ValidatorSpec::UpcOrEan => bind_text(combinators::upc_or_ean()),
    };
    Ok(binder)
}

/// A checked sheet ready to validate records.
#[derive(Debug)]
pub struct CompiledSheet {
    schema: SheetSchema,
    chain: RuleChain<SheetRecord>,
}

impl CompiledSheet {
    pub fn name(&self) -> &str {
        &self.schema.name
    }

    pub fn schema(&self) -> &SheetSchema {
        &self.schema
    }

    pub fn rule_count(&self) -> usize {
        self.chain.len()
    }

    /// Run every rule over an already-coerced record.
    pub fn validate_record(&self, record: SheetRecord) -> SheetRecord {
        self.chain.apply(record)
    }

    /// Coerce a raw row and validate it.
    pub fn check_row(
        &self,
        row: usize,
        raw: &serde_json::Map<String, serde_json::Value>,
    ) -> SheetRecord {
        self.validate_record(crate::parse::coerce_row(&self.schema, row, raw))
    }
}
