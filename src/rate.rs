use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use crate::error::AmortisationError;
use crate::types::{Money, Rate};
use crate::EngineResult;

/// Converts an annual percentage rate into the rate applied once per payment period.
///
/// `(annual_rate_percent / 100) / frequency`, carried at full precision.
///
/// # Errors
///
/// Returns [`AmortisationError::DivisionByZero`] when `frequency` is zero, or
/// [`AmortisationError::Overflow`] when the quotient leaves the decimal range.
pub fn periodic_rate(annual_rate_percent: Decimal, frequency: Decimal) -> EngineResult<Rate> {
    if frequency.is_zero() {
        return Err(AmortisationError::DivisionByZero {
            context: "periodic rate (frequency is zero)".into(),
        });
    }
    let annual = annual_rate_percent / dec!(100);
    annual
        .checked_div(frequency)
        .ok_or_else(|| AmortisationError::Overflow {
            context: format!("periodic rate {annual} / {frequency}"),
        })
}

/// Number of payment periods over the life of the loan. May be fractional.
///
/// # Errors
///
/// Returns [`AmortisationError::Overflow`] when `term_years * frequency` leaves the decimal range.
pub fn total_periods(term_years: Decimal, frequency: Decimal) -> EngineResult<Decimal> {
    term_years
        .checked_mul(frequency)
        .ok_or_else(|| AmortisationError::Overflow {
            context: format!("total periods {term_years} * {frequency}"),
        })
}

/// Interest accrued on `balance` over one period.
///
/// # Errors
///
/// Propagates [`periodic_rate`] failures, and returns [`AmortisationError::Overflow`]
/// when the interest leaves the decimal range.
pub fn interest_for_period(
    balance: Money,
    annual_rate_percent: Decimal,
    frequency: Decimal,
) -> EngineResult<Money> {
    let rate = periodic_rate(annual_rate_percent, frequency)?;
    balance
        .checked_mul(rate)
        .ok_or_else(|| AmortisationError::Overflow {
            context: format!("interest on {balance} at {rate}"),
        })
}

/// `(1 + rate)^-periods`, the present value of 1 due `periods` from now.
///
/// Always in `(0, 1]` for a non-negative rate. A long term at a high rate
/// underflows to zero instead of overflowing the way `(1 + rate)^periods` would.
///
/// # Errors
///
/// Returns [`AmortisationError::Overflow`] when `1 + rate` leaves the decimal range.
pub fn discount_factor(rate: Rate, periods: u64) -> EngineResult<Decimal> {
    let one_and_rate = Decimal::ONE
        .checked_add(rate)
        .ok_or_else(|| AmortisationError::Overflow {
            context: format!("1 + {rate}"),
        })?;
    let per_period = Decimal::ONE
        .checked_div(one_and_rate)
        .ok_or_else(|| AmortisationError::DivisionByZero {
            context: format!("discount factor at rate {rate}"),
        })?;

    per_period
        .checked_powu(periods)
        .ok_or_else(|| AmortisationError::Overflow {
            context: format!("(1 + {rate})^-{periods}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_periodic_rate_monthly() {
        assert_eq!(periodic_rate(dec!(6), dec!(12)).unwrap(), dec!(0.005));
        assert_eq!(periodic_rate(dec!(0), dec!(52)).unwrap(), dec!(0));
    }

    #[test]
    fn test_periodic_rate_keeps_full_precision() {
        let rate = periodic_rate(dec!(5), dec!(12)).unwrap();
        assert!(rate > dec!(0.0041666666) && rate < dec!(0.0041666667));
        assert!(rate.scale() > 10);
    }

    #[test]
    fn test_periodic_rate_zero_frequency() {
        let result = periodic_rate(dec!(6), dec!(0));
        assert!(matches!(result, Err(AmortisationError::DivisionByZero { .. })));
    }

    #[test]
    fn test_periodic_rate_overflow() {
        let result = periodic_rate(Decimal::MAX, dec!(0.0001));
        assert!(matches!(result, Err(AmortisationError::Overflow { .. })));
    }

    #[test]
    fn test_total_periods() {
        assert_eq!(total_periods(dec!(30), dec!(12)).unwrap(), dec!(360));
        assert_eq!(total_periods(dec!(2.5), dec!(26)).unwrap(), dec!(65));
    }

    #[test]
    fn test_total_periods_overflow() {
        let result = total_periods(Decimal::MAX, dec!(12));
        assert!(matches!(result, Err(AmortisationError::Overflow { .. })));
    }

    #[test]
    fn test_interest_for_period() {
        let interest = interest_for_period(dec!(100000), dec!(6), dec!(12)).unwrap();
        assert_eq!(interest, dec!(500));
    }

    #[test]
    fn test_interest_for_period_overflow() {
        let result = interest_for_period(Decimal::MAX, dec!(2400), dec!(12));
        assert!(matches!(result, Err(AmortisationError::Overflow { .. })));
    }

    #[test]
    fn test_discount_factor() {
        assert_eq!(discount_factor(dec!(0.25), 2).unwrap(), dec!(0.64));
        assert_eq!(discount_factor(dec!(0), 360).unwrap(), dec!(1));
    }

    #[test]
    fn test_discount_factor_underflows_to_zero() {
        // 0.8^360 is about 1e-35, below the smallest representable step
        assert_eq!(discount_factor(dec!(0.25), 360).unwrap(), dec!(0));
        assert_eq!(discount_factor(dec!(9), 100).unwrap(), dec!(0));
    }
}
