//! Field validation engine.
//!
//! Combinators produce deferred checks; the runner and sequencer fold their
//! results while keeping every failure.

pub mod checksum;
pub mod combinators;
pub mod result;
pub mod runner;
pub mod sequence;

pub use combinators::{Check, FieldValidator};
pub use result::{Issue, Issues, Severity, ValidationResult};
pub use runner::{run_checks, run_validations};
pub use sequence::sequence;
