use rust_decimal::Decimal;
use tracing::debug;

use crate::calculators::{Accrual, Period};
use crate::day_count::{DateWindow, DayCountBasis};
use crate::rate_table::{RateSource, Tenor};
use crate::segmentation::segment;
use crate::types::Money;
use crate::ClaimResult;

/// Floating-rate interest: one period per benchmark segment, each at
/// `benchmark × multiplier`.
pub fn compute(
    principal: Money,
    window: DateWindow,
    tenor: Tenor,
    multiplier: Decimal,
    basis: DayCountBasis,
    rates: &dyn RateSource,
) -> ClaimResult<Accrual> {
    let periods = periods(principal, window, tenor, multiplier, basis, rates)?;
    Ok(Accrual::from_periods(periods))
}

pub(crate) fn periods(
    principal: Money,
    window: DateWindow,
    tenor: Tenor,
    multiplier: Decimal,
    basis: DayCountBasis,
    rates: &dyn RateSource,
) -> ClaimResult<Vec<Period>> {
    let segments = segment(window, tenor, rates)?;
    let periods: Vec<Period> = segments
        .into_iter()
        .map(|seg| {
            let piece = DateWindow::new(seg.start_date, seg.end_date)?;
            Period::annual(piece, principal, seg.benchmark_rate * multiplier, basis)
        })
        .collect::<ClaimResult<_>>()?;
    debug!(%window, %tenor, %multiplier, periods = periods.len(), "floating accrual");
    Ok(periods)
}
