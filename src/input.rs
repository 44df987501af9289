//! Turns user-entered text into [`LoanParameters`].
//!
//! Formatting characters are stripped, each field is clamped to its own range and an
//! empty field falls back to a default (`0`, or `1` for the term so it never divides
//! by zero).

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::AmortisationError;
use crate::types::{LoanParameters, PaymentFrequency};
use crate::EngineResult;

/// Inclusive range accepted for a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl FieldRange {
    /// `min` and `max` are both inclusive.
    pub const fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    /// Pulls `value` into the range.
    pub fn clamp(&self, value: Decimal) -> Decimal {
        value.max(self.min).min(self.max)
    }
}

/// Ranges applied to each field before a calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputLimits {
    pub loan_amount: FieldRange,
    pub term_years: FieldRange,
    pub interest_rate: FieldRange,
    pub balloon: FieldRange,
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            loan_amount: FieldRange::new(dec!(0), dec!(100000)),
            term_years: FieldRange::new(dec!(1), dec!(30)),
            interest_rate: FieldRange::new(dec!(0), dec!(15)),
            balloon: FieldRange::new(dec!(0), dec!(10000)),
        }
    }
}

impl InputLimits {
    /// Accepts any non-negative value. A zero term is left for validation to reject.
    pub fn unbounded() -> Self {
        let any = FieldRange::new(Decimal::ZERO, Decimal::MAX);
        Self {
            loan_amount: any,
            term_years: any,
            interest_rate: any,
            balloon: any,
        }
    }
}

/// Keeps ASCII digits and `.` only, so `"$100,000"` becomes `"100000"`.
pub fn sanitize_numeric(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect()
}

/// Sanitizes `raw`, parses it and clamps it into `range`.
///
/// Empty input yields `default` before clamping.
///
/// # Errors
///
/// Returns [`AmortisationError::InvalidParameter`] when the sanitized text is not a
/// decimal number (e.g. `"1.2.3"`).
pub fn clamp_value(field: &str, raw: &str, range: FieldRange, default: Decimal) -> EngineResult<Decimal> {
    let cleaned = sanitize_numeric(raw);
    let value = if cleaned.is_empty() {
        default
    } else {
        Decimal::from_str(&cleaned)
            .map_err(|_| AmortisationError::invalid(field, format!("'{raw}' is not a number")))?
    };
    Ok(range.clamp(value))
}

/// Raw text of the loan form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoanInputs {
    pub loan_amount: String,
    pub term_years: String,
    pub interest_rate: String,
    pub frequency: String,
    pub balloon: String,
}

impl LoanInputs {
    /// Sanitizes and clamps every field. An empty frequency means monthly.
    ///
    /// # Errors
    ///
    /// Returns [`AmortisationError::InvalidParameter`] when a field is not a number or the
    /// frequency is neither a known name nor a number.
    pub fn to_parameters(&self, limits: &InputLimits) -> EngineResult<LoanParameters> {
        let frequency = if self.frequency.trim().is_empty() {
            PaymentFrequency::default()
        } else {
            self.frequency.parse::<PaymentFrequency>()?
        };

        Ok(LoanParameters::new(
            clamp_value("loan_amount", &self.loan_amount, limits.loan_amount, Decimal::ZERO)?,
            clamp_value("interest_rate", &self.interest_rate, limits.interest_rate, Decimal::ZERO)?,
            clamp_value("term_years", &self.term_years, limits.term_years, Decimal::ONE)?,
            frequency,
            clamp_value("balloon", &self.balloon, limits.balloon, Decimal::ZERO)?,
        ))
    }
}
