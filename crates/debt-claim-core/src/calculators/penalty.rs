use chrono::NaiveDate;
use tracing::debug;

use crate::calculators::{require_tenor, Accrual, CalcContext, ModeKind, Period, RateSpec};
use crate::cap::{cap_periods, CapAccrual};
use crate::day_count::{DateWindow, DayCountBasis};
use crate::error::ClaimCalcError;
use crate::rate_table::Tenor;
use crate::segmentation::split_at;
use crate::types::Money;
use crate::ClaimResult;

/// Benchmark tenor the ceiling is measured against. A floating penalty
/// defaults to its own tenor; a fixed penalty must name one.
pub(crate) fn reference_tenor(rate: &RateSpec, explicit: Option<Tenor>) -> ClaimResult<Tenor> {
    let implied = match rate {
        RateSpec::Floating { tenor, .. } => *tenor,
        RateSpec::Fixed { .. } => None,
    };
    explicit.or(implied).ok_or_else(|| ClaimCalcError::TermNotSpecified {
        mode: ModeKind::Penalty.to_string(),
    })
}

/// Contractual penalty over `window` with its ceiling computed alongside.
///
/// Both figures share one period structure: the window is cut at every
/// change of the reference tenor and, for floating contracts, of the
/// contract tenor.
pub fn compute(
    principal: Money,
    window: DateWindow,
    rate: &RateSpec,
    basis: DayCountBasis,
    reference: Option<Tenor>,
    ctx: CalcContext<'_>,
) -> ClaimResult<Accrual> {
    let ref_tenor = reference_tenor(rate, reference)?;

    let mut cuts: Vec<NaiveDate> = ctx.rates.change_dates(ref_tenor, window.start(), window.end());
    if let RateSpec::Floating { tenor, .. } = rate {
        let contract_tenor = require_tenor(*tenor, ModeKind::Penalty)?;
        if contract_tenor != ref_tenor {
            cuts.extend(ctx.rates.change_dates(contract_tenor, window.start(), window.end()));
        }
    }
    let pieces = split_at(window, &cuts);

    let periods = pieces
        .iter()
        .map(|piece| {
            let annual_rate = match rate {
                RateSpec::Fixed { annual_rate } => *annual_rate,
                RateSpec::Floating { tenor, multiplier } => {
                    let t = require_tenor(*tenor, ModeKind::Penalty)?;
                    ctx.rates.lookup(t, piece.start())? * *multiplier
                }
            };
            Period::annual(*piece, principal, annual_rate, basis)
        })
        .collect::<ClaimResult<Vec<Period>>>()?;

    let multiplier = ctx.statutory.cap_multiplier;
    let ceiling = cap_periods(principal, &pieces, ref_tenor, multiplier, basis, ctx.rates)?;
    let cap_interest: Money = ceiling.iter().map(|p| p.period_interest).sum();

    let mut accrual = Accrual::from_periods(periods);
    debug!(%window, contractual = %accrual.interest, cap = %cap_interest, "penalty accrual");
    accrual.cap = Some(CapAccrual {
        reference_tenor: ref_tenor,
        multiplier,
        interest: cap_interest,
        periods: ceiling,
    });
    Ok(accrual)
}
