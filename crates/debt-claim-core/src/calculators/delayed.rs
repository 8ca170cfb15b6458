use crate::calculators::{Accrual, Period, RateBasis};
use crate::day_count::{daily_interest, DateWindow};
use crate::types::{Money, Rate};
use crate::ClaimResult;

/// Interest on delayed performance: `base_amount × daily_rate × days`.
///
/// The base amount is taken as supplied; it may already combine principal
/// with other confirmed amounts.
pub fn compute(base_amount: Money, window: DateWindow, daily_rate: Rate) -> ClaimResult<Accrual> {
    let days = window.days();
    Ok(Accrual::from_periods(vec![Period {
        start_date: window.start(),
        end_date: window.end(),
        days,
        applicable_rate: daily_rate,
        rate_basis: RateBasis::Daily,
        base_principal: base_amount,
        period_interest: daily_interest(base_amount, daily_rate, days)?,
    }]))
}
