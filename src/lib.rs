//! `loan_amortisation` is a Rust library for building the amortisation schedule of an
//! installment loan.
//!
//! Given the principal, the nominal annual rate, the term, the payment frequency and an
//! optional balloon, it:
//! - sizes the **fixed periodic payment** with the annuity formula, reduced by the
//!   present value of the balloon;
//! - unrolls that payment **period by period** into interest, principal and the
//!   remaining balance, until the loan is paid off.
//!
//! All arithmetic uses [`rust_decimal::Decimal`]. Full precision is carried between
//! periods and every emitted amount is rounded half-up to two decimal places.
//!
//! ## Usage
//!
//! Add `loan_amortisation` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! loan_amortisation = "0.1.0"
//! rust_decimal = "1.39.0"
//! rust_decimal_macros = "1.39.0"
//! ```
//!
//! Then, use the `calculate_amortisation` function to get the payment and its schedule:
//!
//! ```rust
//! use loan_amortisation::{calculate_amortisation, LoanParameters, PaymentFrequency};
//! use rust_decimal_macros::dec;
//!
//! fn main() {
//!     let params = LoanParameters::new(
//!         dec!(100_000),
//!         dec!(6),
//!         dec!(30),
//!         PaymentFrequency::Monthly,
//!         dec!(0),
//!     );
//!
//!     match calculate_amortisation(&params) {
//!         Ok(result) => {
//!             println!("Periodic payment: {}", result.periodic_payment);
//!             println!("Total paid:       {}", result.total_paid);
//!             println!("Total interest:   {}", result.total_interest);
//!             for (period, entry) in result.schedule.iter().enumerate().take(3) {
//!                 println!("{period}: {} = {} + {} -> {}",
//!                     entry.payment, entry.interest_payment, entry.principal_amount, entry.balance);
//!             }
//!         }
//!         Err(e) => {
//!             eprintln!("Error calculating amortisation: {}", e);
//!         }
//!     }
//! }
//! ```

pub mod balloon;
pub mod config;
pub mod error;
pub mod input;
pub mod payment;
pub mod rate;
pub mod schedule;
pub mod types;

use tracing::debug;

pub use config::{EngineConfig, ExponentPolicy};
pub use error::AmortisationError;
pub use input::{InputLimits, LoanInputs};
pub use types::{AmortisationEntry, AmortisationSchedule, LoanAmortisation, LoanParameters, PaymentFrequency};

pub type EngineResult<T> = Result<T, AmortisationError>;

/// Calculates the periodic payment and the full schedule with the default [`EngineConfig`].
///
/// This is the main entry point of the library.
///
/// # Errors
///
/// See [`calculate_amortisation_with_config`].
pub fn calculate_amortisation(params: &LoanParameters) -> EngineResult<LoanAmortisation> {
    calculate_amortisation_with_config(params, &EngineConfig::default())
}

/// Calculates the periodic payment and the full schedule.
///
/// # Arguments
///
/// * `params` - The loan being amortised. It is only read.
/// * `config` - How to resolve fractional period counts and how far the schedule may run.
///
/// # Errors
///
/// - [`AmortisationError::InvalidParameter`] if `frequency` or `term_years` is not strictly
///   positive, an amount is negative, or the period count cannot be resolved.
/// - [`AmortisationError::Overflow`] if an amount, a schedule column or a column total
///   leaves the decimal range.
/// - [`AmortisationError::UnconvergedSchedule`] if the payment never retires the balance,
///   including when it only matches the interest at working precision.
/// - [`AmortisationError::InvalidConfig`] if `config` fails validation.
pub fn calculate_amortisation_with_config(
    params: &LoanParameters,
    config: &EngineConfig,
) -> EngineResult<LoanAmortisation> {
    config.validate()?;
    params.validate()?;

    let total_periods = config
        .exponent_policy
        .whole_periods(rate::total_periods(params.term_years, params.frequency)?)?;

    let periodic_payment = payment::periodic_payment(
        params.principal,
        params.annual_rate_percent,
        params.term_years,
        params.frequency,
        params.balloon,
        config.exponent_policy,
    )?;

    let schedule = schedule::build_schedule(
        periodic_payment,
        params.principal,
        params.annual_rate_percent,
        params.frequency,
        params.balloon,
        config.max_schedule_rows(total_periods),
    )?;

    debug!(
        periods = total_periods,
        rows = schedule.len(),
        "built amortisation schedule"
    );

    LoanAmortisation::from_schedule(periodic_payment, total_periods, schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_calculate_amortisation_happy_path() {
        let params = LoanParameters::new(dec!(12000), dec!(12), dec!(1), PaymentFrequency::Monthly, dec!(0));

        let result = calculate_amortisation(&params).unwrap();

        assert_eq!(result.periodic_payment, dec!(1066.19));
        assert_eq!(result.total_periods, 12);
        assert_eq!(result.schedule.len(), 12);
        assert_eq!(result.total_paid, dec!(12783.72));
        assert_eq!(result.total_interest, dec!(794.24));
        assert_eq!(result.final_balance(), Some(dec!(0)));
        assert!(result.is_settled(params.balloon));
    }

    #[test]
    fn test_zero_frequency_error() {
        let params = LoanParameters {
            principal: dec!(100000),
            annual_rate_percent: dec!(10),
            term_years: dec!(30),
            frequency: dec!(0),
            balloon: dec!(0),
        };
        let result = calculate_amortisation(&params);
        assert!(matches!(result, Err(AmortisationError::InvalidParameter { .. })));
    }

    #[test]
    fn test_invalid_config_error() {
        let params = LoanParameters::new(dec!(1000), dec!(5), dec!(1), PaymentFrequency::Monthly, dec!(0));
        let config = EngineConfig {
            safety_factor: 0,
            ..EngineConfig::default()
        };
        let result = calculate_amortisation_with_config(&params, &config);
        assert!(matches!(result, Err(AmortisationError::InvalidConfig(_))));
    }

    #[test]
    fn test_totals_overflow_error() {
        let params = LoanParameters::new(dec!(70000000000000000000000000000), dec!(6), dec!(30), PaymentFrequency::Monthly, dec!(0));
        let result = calculate_amortisation(&params);
        assert!(matches!(result, Err(AmortisationError::Overflow { .. })));
    }
}
