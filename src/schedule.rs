use rust_decimal::Decimal;
use tracing::{trace, warn};

use crate::error::AmortisationError;
use crate::rate::interest_for_period;
use crate::types::{round_half_up, to_display, AmortisationEntry, AmortisationSchedule, Money};
use crate::EngineResult;

/// Unrolls a fixed payment into one row per period until the balance is exhausted.
///
/// Each period:
/// - interest accrues on the opening balance;
/// - the cash paid is the whole balance once it is at or below the payment or the
///   balloon, and the nominal payment otherwise;
/// - the principal column is always the nominal payment minus interest;
/// - a balance that rounds to at most `balloon` closes to zero, otherwise it drops by
///   the principal.
///
/// The cash paid in one period becomes the nominal payment of the next. The balloon
/// therefore acts as a payoff threshold, not as a separate lump sum at term end.
///
/// # Errors
///
/// - [`AmortisationError::UnconvergedSchedule`] if the balance is still open after
///   `max_rows` rows, or as soon as a row that does not close the loan leaves the balance
///   no lower than it was. Neither the payment nor the interest can improve after such a
///   row, so the balance would never reach zero.
/// - [`AmortisationError::Overflow`] if a column leaves the decimal range.
pub fn build_schedule(
    payment: Money,
    outstanding_balance: Money,
    annual_rate_percent: Decimal,
    frequency: Decimal,
    balloon: Money,
    max_rows: usize,
) -> EngineResult<AmortisationSchedule> {
    let mut payment = payment;
    let mut balance = outstanding_balance;
    let mut schedule = AmortisationSchedule::new();

    while round_half_up(balance) > Decimal::ZERO {
        if schedule.len() >= max_rows {
            warn!(rows = schedule.len(), %balance, "schedule did not converge");
            return Err(AmortisationError::UnconvergedSchedule {
                periods: schedule.len(),
                remaining_balance: to_display(balance),
            });
        }

        let interest = interest_for_period(balance, annual_rate_percent, frequency)?;
        let period_payment = if balance <= payment || balance <= balloon {
            balance
        } else {
            payment
        };
        let principal = payment
            .checked_sub(interest)
            .ok_or_else(|| overflow("principal", payment, interest))?;
        let closes = round_half_up(balance) <= balloon;
        let new_balance = if closes {
            Decimal::ZERO
        } else {
            balance
                .checked_sub(principal)
                .ok_or_else(|| overflow("balance", balance, principal))?
        };

        trace!(
            period = schedule.len(),
            %period_payment,
            %interest,
            %principal,
            %new_balance,
            "amortised period"
        );
        schedule.push(AmortisationEntry::new(period_payment, interest, principal, new_balance));

        if !closes && new_balance >= balance {
            warn!(rows = schedule.len(), %balance, %interest, "payment does not reduce the balance");
            return Err(AmortisationError::UnconvergedSchedule {
                periods: schedule.len(),
                remaining_balance: to_display(new_balance),
            });
        }

        payment = period_payment;
        balance = new_balance;
    }

    Ok(schedule)
}

fn overflow(column: &str, lhs: Money, rhs: Money) -> AmortisationError {
    AmortisationError::Overflow {
        context: format!("{column} {lhs} - {rhs}"),
    }
}
