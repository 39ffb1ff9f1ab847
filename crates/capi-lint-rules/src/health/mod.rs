//! Condition-based health rules used by `health`.
//!
//! The two rules are additive: a condition that is not `True` and also
//! carries a known failure reason yields one finding from each.

pub mod expected_conditions;
pub mod failure_reasons;

pub use expected_conditions::ExpectedConditions;
pub use failure_reasons::FailureReasons;

use crate::conditions::Condition;
use std::fmt::Write;

/// Category of health findings.
pub const CATEGORY: &str = "Health";

fn describe(condition: &Condition) -> String {
    let mut text = format!("{} = {}", condition.condition_type, condition.status);
    if !condition.reason.is_empty() {
        let _ = write!(text, " ({})", condition.reason);
    }
    if !condition.message.is_empty() {
        let _ = write!(text, ": {}", condition.message);
    }
    text
}
