use crate::calculators::{Accrual, Period};
use crate::day_count::{DateWindow, DayCountBasis};
use crate::types::{Money, Rate};
use crate::ClaimResult;

/// Fixed-rate simple interest over a single period.
pub fn compute(principal: Money, window: DateWindow, annual_rate: Rate, basis: DayCountBasis) -> ClaimResult<Accrual> {
    Ok(Accrual::from_periods(vec![Period::annual(window, principal, annual_rate, basis)?]))
}
