use rust_decimal::Decimal;
use tracing::debug;

use crate::balloon::balloon_payment;
use crate::config::ExponentPolicy;
use crate::error::AmortisationError;
use crate::rate::{discount_factor, periodic_rate, total_periods};
use crate::types::{LoanParameters, Money, Rate};
use crate::EngineResult;

/// Fixed payment that retires `principal` over `periods` at `rate`, with nothing left owing.
///
/// Price formula: PMT = P * [i(1 + i)^n] / [(1 + i)^n – 1]
///
/// Evaluated in its discounted form, PMT = P * i / [1 – (1 + i)^-n], which stays in range
/// for any term. As `n` grows the payment approaches `P * i`.
///
/// A zero rate falls back to straight-line division, `P / n`.
///
/// # Errors
///
/// Returns [`AmortisationError::DivisionByZero`] when there are no periods or the rate is
/// too small to discount, and [`AmortisationError::Overflow`] when the payment leaves the
/// decimal range.
pub fn annuity_payment(principal: Money, rate: Rate, periods: u64) -> EngineResult<Money> {
    if rate.is_zero() {
        return principal
            .checked_div(Decimal::from(periods))
            .ok_or_else(|| AmortisationError::DivisionByZero {
                context: "zero-rate annuity (no periods)".into(),
            });
    }

    let discount = discount_factor(rate, periods)?;
    let factor = rate
        .checked_div(Decimal::ONE - discount)
        .ok_or_else(|| AmortisationError::DivisionByZero {
            context: format!("annuity factor at rate {rate} over {periods} periods"),
        })?;

    principal
        .checked_mul(factor)
        .ok_or_else(|| AmortisationError::Overflow {
            context: format!("annuity payment {principal} * {factor}"),
        })
}

/// Calculates the fixed periodic payment of a loan that leaves `balloon` owing at term end.
///
/// The pure-annuity payment minus the balloon deduction. The fractional
/// `term_years * frequency` is resolved to whole periods with `policy`.
///
/// # Errors
///
/// Returns [`AmortisationError::InvalidParameter`] when `frequency` or `term_years`
/// is not strictly positive, when an amount is negative, or when `policy` cannot
/// resolve the period count. Returns [`AmortisationError::Overflow`] when an
/// intermediate amount leaves the decimal range.
pub fn periodic_payment(
    principal: Money,
    annual_rate_percent: Decimal,
    term_years: Decimal,
    frequency: Decimal,
    balloon: Money,
    policy: ExponentPolicy,
) -> EngineResult<Money> {
    LoanParameters {
        principal,
        annual_rate_percent,
        term_years,
        frequency,
        balloon,
    }
    .validate()?;

    let rate = periodic_rate(annual_rate_percent, frequency)?;
    let periods = policy.whole_periods(total_periods(term_years, frequency)?)?;
    let deduction = balloon_payment(balloon, rate, periods)?;
    let annuity = annuity_payment(principal, rate, periods)?;
    let payment = annuity
        .checked_sub(deduction)
        .ok_or_else(|| AmortisationError::Overflow {
            context: format!("payment {annuity} - {deduction}"),
        })?;

    debug!(%rate, periods, %deduction, %payment, "sized periodic payment");
    Ok(payment)
}
