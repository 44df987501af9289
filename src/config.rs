use std::fs;
use std::path::Path;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::AmortisationError;
use crate::EngineResult;

/// How a fractional `term_years * frequency` becomes a whole number of periods.
///
/// The count feeds every `(1 + r)^n` exponent and the straight-line divisor of a
/// zero-rate loan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExponentPolicy {
    /// Drop the fractional part (2.5 periods -> 2).
    #[default]
    Truncate,
    /// Round half away from zero (2.5 periods -> 3).
    Round,
    /// Fail unless the count is already integral.
    Reject,
}

impl ExponentPolicy {
    /// Resolves `periods` to a whole count.
    ///
    /// # Errors
    ///
    /// Returns [`AmortisationError::InvalidParameter`] under [`ExponentPolicy::Reject`] for a
    /// fractional count, when the resolved count is zero, or when it does not fit in a `u64`.
    pub fn whole_periods(&self, periods: Decimal) -> EngineResult<u64> {
        let resolved = match self {
            ExponentPolicy::Truncate => periods.trunc(),
            ExponentPolicy::Round => periods.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
            ExponentPolicy::Reject => {
                if !periods.fract().is_zero() {
                    return Err(AmortisationError::invalid(
                        "term_years",
                        format!("term spans {periods} periods, which is not a whole number"),
                    ));
                }
                periods
            }
        };

        let whole = resolved.to_u64().ok_or_else(|| {
            AmortisationError::invalid("term_years", format!("{periods} periods is out of range"))
        })?;
        if whole == 0 {
            return Err(AmortisationError::invalid(
                "term_years",
                "term is shorter than one payment period",
            ));
        }
        Ok(whole)
    }
}

/// Tunables of the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub exponent_policy: ExponentPolicy,
    /// The schedule gives up after `total_periods * safety_factor + 1` rows.
    pub safety_factor: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            exponent_policy: ExponentPolicy::default(),
            safety_factor: 4,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a TOML document. Missing keys keep their defaults.
    ///
    /// ```
    /// use loan_amortisation::{EngineConfig, ExponentPolicy};
    ///
    /// let config = EngineConfig::from_toml_str("exponent_policy = \"round\"").unwrap();
    /// assert_eq!(config.exponent_policy, ExponentPolicy::Round);
    /// assert_eq!(config.safety_factor, 4);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`AmortisationError::InvalidConfig`] when the document does not parse or
    /// fails [`EngineConfig::validate`].
    pub fn from_toml_str(contents: &str) -> EngineResult<Self> {
        let config: EngineConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path` and parses it with [`EngineConfig::from_toml_str`].
    ///
    /// # Errors
    ///
    /// Returns [`AmortisationError::InvalidConfig`] when the file cannot be read, does not
    /// parse, or fails validation.
    pub fn from_file(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            AmortisationError::InvalidConfig(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Checks the values serde cannot constrain.
    ///
    /// # Errors
    ///
    /// Returns [`AmortisationError::InvalidConfig`] when `safety_factor` is zero.
    pub fn validate(&self) -> EngineResult<()> {
        if self.safety_factor == 0 {
            return Err(AmortisationError::InvalidConfig(
                "safety_factor must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Maximum number of rows a schedule sized for `total_periods` may emit.
    pub fn max_schedule_rows(&self, total_periods: u64) -> usize {
        let bound = total_periods
            .saturating_mul(u64::from(self.safety_factor))
            .saturating_add(1);
        usize::try_from(bound).unwrap_or(usize::MAX)
    }
}
