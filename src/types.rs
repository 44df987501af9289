use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::AmortisationError;
use crate::EngineResult;

/// Monetary amounts. Always `Decimal`, never `f64`.
pub type Money = Decimal;

/// Rates expressed as decimal fractions (0.005 = 0.5% per period).
pub type Rate = Decimal;

/// Number of fraction digits kept on every emitted amount.
pub const DISPLAY_SCALE: u32 = 2;

/// Distance from zero (or from the balloon) within which a loan counts as settled.
pub const SETTLEMENT_TOLERANCE: Decimal = dec!(0.01);

/// Rounds half away from zero to [`DISPLAY_SCALE`] places.
///
/// Used both for the threshold comparisons of the schedule and for emitted values.
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds like [`round_half_up`] and pins the scale, so `0` renders as `0.00`.
pub fn to_display(value: Decimal) -> Decimal {
    let mut rounded = round_half_up(value);
    if rounded.is_zero() {
        // drops the sign of a negative zero left over from rounding drift
        rounded = Decimal::ZERO;
    }
    rounded.rescale(DISPLAY_SCALE);
    rounded
}

/// Input parameters of a single amortisation calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanParameters {
    /// Amount owed at period 0.
    pub principal: Money,
    /// Nominal annual rate as a percentage (e.g., 6.5 for 6.5%).
    pub annual_rate_percent: Decimal,
    /// Years the loan nominally runs for.
    pub term_years: Decimal,
    /// Number of payment periods per year.
    pub frequency: Decimal,
    /// Residual still owed at the contractual end of term. Zero for a fully amortising loan.
    #[serde(default)]
    pub balloon: Money,
}

impl LoanParameters {
    /// Builds parameters from a named frequency or a raw periods-per-year figure.
    ///
    /// Nothing is checked here; [`LoanParameters::validate`] runs before any calculation.
    ///
    /// # Arguments
    ///
    /// * `principal` - Amount borrowed.
    /// * `annual_rate_percent` - Nominal annual rate in percent, `6` for 6%.
    /// * `term_years` - Length of the loan in years. May be fractional.
    /// * `frequency` - A [`PaymentFrequency`] or a `Decimal` number of periods per year.
    /// * `balloon` - Lump sum left owing at term end, `0` for none.
    pub fn new(
        principal: Money,
        annual_rate_percent: Decimal,
        term_years: Decimal,
        frequency: impl Into<PaymentFrequency>,
        balloon: Money,
    ) -> Self {
        Self {
            principal,
            annual_rate_percent,
            term_years,
            frequency: frequency.into().periods_per_year(),
            balloon,
        }
    }

    /// Rejects parameter combinations for which the formulas are undefined.
    ///
    /// # Errors
    ///
    /// Returns [`AmortisationError::InvalidParameter`] when an amount or the rate is negative,
    /// or when `frequency` or `term_years` is not strictly positive.
    pub fn validate(&self) -> EngineResult<()> {
        if self.principal < Decimal::ZERO {
            return Err(AmortisationError::invalid("principal", "must not be negative"));
        }
        if self.annual_rate_percent < Decimal::ZERO {
            return Err(AmortisationError::invalid(
                "annual_rate_percent",
                "must not be negative",
            ));
        }
        if self.balloon < Decimal::ZERO {
            return Err(AmortisationError::invalid("balloon", "must not be negative"));
        }
        if self.frequency <= Decimal::ZERO {
            return Err(AmortisationError::invalid(
                "frequency",
                "must be greater than zero",
            ));
        }
        if self.term_years <= Decimal::ZERO {
            return Err(AmortisationError::invalid(
                "term_years",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// How often a payment falls due.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFrequency {
    Weekly,
    Fortnightly,
    #[default]
    Monthly,
    /// Any other positive number of periods per year.
    Custom(Decimal),
}

impl PaymentFrequency {
    /// Payment periods in one year.
    pub fn periods_per_year(&self) -> Decimal {
        match self {
            PaymentFrequency::Weekly => dec!(52),
            PaymentFrequency::Fortnightly => dec!(26),
            PaymentFrequency::Monthly => dec!(12),
            PaymentFrequency::Custom(periods) => *periods,
        }
    }
}

impl From<Decimal> for PaymentFrequency {
    fn from(periods: Decimal) -> Self {
        match periods {
            p if p == dec!(52) => PaymentFrequency::Weekly,
            p if p == dec!(26) => PaymentFrequency::Fortnightly,
            p if p == dec!(12) => PaymentFrequency::Monthly,
            p => PaymentFrequency::Custom(p),
        }
    }
}

impl FromStr for PaymentFrequency {
    type Err = AmortisationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(PaymentFrequency::Weekly),
            "fortnightly" => Ok(PaymentFrequency::Fortnightly),
            "monthly" => Ok(PaymentFrequency::Monthly),
            other => {
                let periods = Decimal::from_str(other).map_err(|_| {
                    AmortisationError::invalid(
                        "frequency",
                        format!("'{s}' is neither weekly, fortnightly, monthly nor a number"),
                    )
                })?;
                if periods <= Decimal::ZERO {
                    return Err(AmortisationError::invalid(
                        "frequency",
                        "must be greater than zero",
                    ));
                }
                Ok(PaymentFrequency::from(periods))
            }
        }
    }
}

impl fmt::Display for PaymentFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentFrequency::Weekly => write!(f, "weekly"),
            PaymentFrequency::Fortnightly => write!(f, "fortnightly"),
            PaymentFrequency::Monthly => write!(f, "monthly"),
            PaymentFrequency::Custom(periods) => write!(f, "{periods} per year"),
        }
    }
}

/// One row of the schedule. Every field is rounded to two decimal places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortisationEntry {
    /// Cash paid in the period.
    pub payment: Money,
    /// Interest accrued on the opening balance of the period.
    pub interest_payment: Money,
    /// Principal repaid, derived from the nominal payment of the period.
    pub principal_amount: Money,
    /// Outstanding balance after the payment.
    pub balance: Money,
}

impl AmortisationEntry {
    /// Rounds every column half-up to two decimal places.
    pub fn new(payment: Money, interest_payment: Money, principal_amount: Money, balance: Money) -> Self {
        Self {
            payment: to_display(payment),
            interest_payment: to_display(interest_payment),
            principal_amount: to_display(principal_amount),
            balance: to_display(balance),
        }
    }
}

/// Rows indexed by period number, starting at 0.
pub type AmortisationSchedule = Vec<AmortisationEntry>;

/// Full result of a calculation: the sized payment, its schedule and the totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanAmortisation {
    /// The fixed periodic payment, rounded to two decimal places.
    pub periodic_payment: Money,
    /// Whole number of periods the payment was sized for.
    pub total_periods: u64,
    /// Sum of the payment column.
    pub total_paid: Money,
    /// Sum of the interest column.
    pub total_interest: Money,
    pub schedule: AmortisationSchedule,
}

impl LoanAmortisation {
    /// Wraps a built schedule and totals its payment and interest columns.
    ///
    /// # Errors
    ///
    /// Returns [`AmortisationError::Overflow`] when a column total leaves the decimal range.
    pub fn from_schedule(
        periodic_payment: Money,
        total_periods: u64,
        schedule: AmortisationSchedule,
    ) -> EngineResult<Self> {
        let total_paid = column_total(&schedule, "payment", |entry| entry.payment)?;
        let total_interest = column_total(&schedule, "interest", |entry| entry.interest_payment)?;

        Ok(Self {
            periodic_payment: to_display(periodic_payment),
            total_periods,
            total_paid: to_display(total_paid),
            total_interest: to_display(total_interest),
            schedule,
        })
    }

    /// Balance left after the last row, or `None` for an empty schedule.
    pub fn final_balance(&self) -> Option<Money> {
        self.schedule.last().map(|entry| entry.balance)
    }

    /// Whether the last balance sits within a cent of zero or of `balloon`.
    ///
    /// An empty schedule has nothing outstanding and is settled.
    pub fn is_settled(&self, balloon: Money) -> bool {
        match self.final_balance() {
            None => true,
            Some(balance) => {
                balance.abs() <= SETTLEMENT_TOLERANCE
                    || balance
                        .checked_sub(balloon)
                        .is_some_and(|gap| gap.abs() <= SETTLEMENT_TOLERANCE)
            }
        }
    }
}

fn column_total(
    schedule: &AmortisationSchedule,
    column: &str,
    value: impl Fn(&AmortisationEntry) -> Money,
) -> EngineResult<Money> {
    schedule.iter().try_fold(Decimal::ZERO, |total, entry| {
        total
            .checked_add(value(entry))
            .ok_or_else(|| AmortisationError::Overflow {
                context: format!("total of the {column} column"),
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_half_up_midpoint() {
        assert_eq!(round_half_up(dec!(2.345)), dec!(2.35));
        assert_eq!(round_half_up(dec!(2.344999)), dec!(2.34));
        assert_eq!(round_half_up(dec!(-2.345)), dec!(-2.35));
    }

    #[test]
    fn test_to_display_pins_two_places() {
        assert_eq!(to_display(dec!(1000)).to_string(), "1000.00");
        assert_eq!(to_display(dec!(0.1)).to_string(), "0.10");
        assert_eq!(to_display(dec!(-0.000000000000000000097)).to_string(), "0.00");
    }

    #[test]
    fn test_entry_rounds_every_field() {
        let entry = AmortisationEntry::new(
            dec!(599.5505251527),
            dec!(500),
            dec!(99.5505251527),
            dec!(99900.4494748472),
        );
        assert_eq!(entry.payment, dec!(599.55));
        assert_eq!(entry.interest_payment.to_string(), "500.00");
        assert_eq!(entry.principal_amount, dec!(99.55));
        assert_eq!(entry.balance, dec!(99900.45));
    }

    #[test]
    fn test_entry_serializes_amounts_as_strings() {
        let entry = AmortisationEntry::new(dec!(10), dec!(1.5), dec!(8.5), dec!(0));
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["payment"], "10.00");
        assert_eq!(json["interest_payment"], "1.50");
        assert_eq!(json["balance"], "0.00");
    }

    #[test]
    fn test_payment_frequency_from_str() {
        assert_eq!("weekly".parse::<PaymentFrequency>().unwrap(), PaymentFrequency::Weekly);
        assert_eq!(" Fortnightly ".parse::<PaymentFrequency>().unwrap(), PaymentFrequency::Fortnightly);
        assert_eq!("12".parse::<PaymentFrequency>().unwrap(), PaymentFrequency::Monthly);
        assert_eq!(
            "4".parse::<PaymentFrequency>().unwrap(),
            PaymentFrequency::Custom(dec!(4))
        );
        assert!("0".parse::<PaymentFrequency>().is_err());
        assert!("daily".parse::<PaymentFrequency>().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_frequency_and_term() {
        let mut params = LoanParameters::new(dec!(1000), dec!(5), dec!(1), PaymentFrequency::Monthly, dec!(0));
        assert!(params.validate().is_ok());

        params.frequency = dec!(0);
        assert!(matches!(
            params.validate(),
            Err(AmortisationError::InvalidParameter { ref field, .. }) if field == "frequency"
        ));

        params.frequency = dec!(12);
        params.term_years = dec!(0);
        assert!(matches!(
            params.validate(),
            Err(AmortisationError::InvalidParameter { ref field, .. }) if field == "term_years"
        ));
    }

    #[test]
    fn test_validate_rejects_negative_amounts() {
        let params = LoanParameters::new(dec!(1000), dec!(5), dec!(1), PaymentFrequency::Monthly, dec!(-1));
        assert!(params.validate().is_err());

        let params = LoanParameters::new(dec!(-1000), dec!(5), dec!(1), PaymentFrequency::Monthly, dec!(0));
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_is_settled_within_a_cent() {
        let schedule = vec![AmortisationEntry::new(dec!(100), dec!(0), dec!(100), dec!(0.01))];
        let result = LoanAmortisation::from_schedule(dec!(100), 1, schedule).unwrap();
        assert!(result.is_settled(dec!(0)));
        assert_eq!(result.total_paid, dec!(100));

        let schedule = vec![AmortisationEntry::new(dec!(100), dec!(0), dec!(100), dec!(4999.99))];
        let result = LoanAmortisation::from_schedule(dec!(100), 1, schedule).unwrap();
        assert!(result.is_settled(dec!(5000)));
        assert!(!result.is_settled(dec!(0)));
    }

    #[test]
    fn test_column_totals_overflow() {
        let half = Decimal::MAX / dec!(2);
        let schedule = vec![
            AmortisationEntry::new(half, dec!(0), half, dec!(0)),
            AmortisationEntry::new(half, dec!(0), half, dec!(0)),
            AmortisationEntry::new(half, dec!(0), half, dec!(0)),
        ];

        let result = LoanAmortisation::from_schedule(half, 3, schedule);
        assert!(matches!(result, Err(AmortisationError::Overflow { .. })));
    }
}
