use rust_decimal::Decimal;

use crate::error::AmortisationError;
use crate::rate::discount_factor;
use crate::types::{round_half_up, Money, Rate};
use crate::EngineResult;

/// Amount to take off the pure-annuity payment so the regular installments leave
/// `balloon` owing at the end of the term.
///
/// `i * B / ((1 + i)^(n + 1) - (1 + i))`
///
/// Evaluated as `i * B * (1 + i)^-(n + 1) / (1 - (1 + i)^-n)`, so a long term at a high
/// rate discounts the balloon towards zero instead of overflowing.
///
/// `total_periods` is the whole period count already resolved by the configured
/// [`ExponentPolicy`](crate::config::ExponentPolicy). A balloon that rounds to zero
/// yields no deduction. At a zero rate the deduction is the limit of the formula,
/// `B / n`, which makes the loan amortise `principal - balloon` in a straight line.
///
/// # Errors
///
/// Returns [`AmortisationError::Overflow`] if `i * B` leaves the decimal range,
/// or [`AmortisationError::DivisionByZero`] if the denominator collapses.
pub fn balloon_payment(balloon: Money, periodic_rate: Rate, total_periods: u64) -> EngineResult<Money> {
    if round_half_up(balloon) <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }

    if periodic_rate.is_zero() {
        return balloon
            .checked_div(Decimal::from(total_periods))
            .ok_or_else(|| AmortisationError::DivisionByZero {
                context: "zero-rate balloon deduction".into(),
            });
    }

    let residual = discount_factor(periodic_rate, total_periods.saturating_add(1))?;
    let numerator = periodic_rate
        .checked_mul(balloon)
        .and_then(|value| value.checked_mul(residual))
        .ok_or_else(|| AmortisationError::Overflow {
            context: format!("balloon deduction {periodic_rate} * {balloon}"),
        })?;
    let denominator = Decimal::ONE - discount_factor(periodic_rate, total_periods)?;

    numerator
        .checked_div(denominator)
        .ok_or_else(|| AmortisationError::DivisionByZero {
            context: "balloon deduction".into(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_no_balloon_no_deduction() {
        assert_eq!(balloon_payment(dec!(0), dec!(0.005), 360).unwrap(), dec!(0));
        // rounds to 0.00
        assert_eq!(balloon_payment(dec!(0.004), dec!(0.005), 360).unwrap(), dec!(0));
    }

    #[test]
    fn test_balloon_deduction() {
        // i = 1%, n = 1: 0.01 * 1000 / (1.01^2 - 1.01) = 10 / 0.0101
        let deduction = balloon_payment(dec!(1000), dec!(0.01), 1).unwrap();
        assert_eq!(deduction.round_dp(4), dec!(990.0990));
    }

    #[test]
    fn test_balloon_deduction_five_year_loan() {
        let rate = dec!(5) / dec!(100) / dec!(12);
        let deduction = balloon_payment(dec!(5000), rate, 60).unwrap();
        assert_eq!(deduction.round_dp(2), dec!(73.22));
    }

    #[test]
    fn test_balloon_fades_over_long_high_rate_terms() {
        // 25% a month for 360 months discounts the balloon to nothing
        assert_eq!(balloon_payment(dec!(5000), dec!(0.25), 360).unwrap(), dec!(0));
    }

    #[test]
    fn test_balloon_deduction_overflow() {
        let result = balloon_payment(Decimal::MAX, dec!(2), 1);
        assert!(matches!(result, Err(AmortisationError::Overflow { .. })));
    }

    #[test]
    fn test_zero_rate_balloon_is_straight_line() {
        assert_eq!(balloon_payment(dec!(2000), dec!(0), 12).unwrap().round_dp(2), dec!(166.67));
    }
}
