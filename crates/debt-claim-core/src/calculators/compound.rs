//! Compound interest over settlement cycles.
//!
//! Each settlement date closes a cycle; that cycle's interest joins the
//! balance on which the next cycle accrues. The final cycle may be partial
//! and accrues for its own day count only.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculators::{rate_spec_periods, Accrual, ModeKind, Period, RateSpec};
use crate::day_count::{overflow, DateWindow, DayCountBasis};
use crate::error::ClaimCalcError;
use crate::rate_table::RateSource;
use crate::segmentation::split_at;
use crate::types::Money;
use crate::ClaimResult;

/// Explicit compounding cycle. There is no default cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cycle", rename_all = "snake_case")]
pub enum CompoundingCycle {
    /// Settlement dates listed individually.
    SettlementDates { dates: Vec<NaiveDate> },
    /// Settlement on `settlement_day` of every month (clamped to month end).
    Monthly { settlement_day: u32 },
    /// Settlement on `settlement_day` of March, June, September, December.
    Quarterly { settlement_day: u32 },
}

impl CompoundingCycle {
    pub fn validate(&self) -> ClaimResult<()> {
        match self {
            CompoundingCycle::SettlementDates { dates } => {
                if dates.is_empty() {
                    return Err(ClaimCalcError::MissingCycleParameter);
                }
                Ok(())
            }
            CompoundingCycle::Monthly { settlement_day } | CompoundingCycle::Quarterly { settlement_day } => {
                if *settlement_day == 0 || *settlement_day > 31 {
                    return Err(ClaimCalcError::InvalidInput {
                        field: "settlement_day".into(),
                        reason: format!("{settlement_day} is not a day of the month"),
                    });
                }
                Ok(())
            }
        }
    }

    /// Settlement dates `d` with `start <= d < end`, ascending. A settlement
    /// on the end date has no following cycle and is not returned.
    pub fn settlement_dates(&self, window: DateWindow) -> ClaimResult<Vec<NaiveDate>> {
        self.validate()?;
        let in_window = |d: &NaiveDate| *d >= window.start() && *d < window.end();
        let mut dates: Vec<NaiveDate> = match self {
            CompoundingCycle::SettlementDates { dates } => dates.iter().copied().filter(in_window).collect(),
            CompoundingCycle::Monthly { settlement_day } => {
                monthly_dates(window, *settlement_day, |_| true).into_iter().filter(in_window).collect()
            }
            CompoundingCycle::Quarterly { settlement_day } => {
                monthly_dates(window, *settlement_day, |m| m % 3 == 0)
                    .into_iter()
                    .filter(in_window)
                    .collect()
            }
        };
        dates.sort();
        dates.dedup();
        Ok(dates)
    }
}

fn monthly_dates(window: DateWindow, day: u32, keep_month: impl Fn(u32) -> bool) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let (mut year, mut month) = (window.start().year(), window.start().month());
    loop {
        let first = match NaiveDate::from_ymd_opt(year, month, 1) {
            Some(f) => f,
            None => break,
        };
        if first > window.end() {
            break;
        }
        if keep_month(month) {
            if let Some(date) = clamped_day(year, month, day) {
                out.push(date);
            }
        }
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    out
}

fn clamped_day(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    (1..=day).rev().find_map(|d| NaiveDate::from_ymd_opt(year, month, d))
}

/// Walk the window cycle by cycle, capitalising interest at each settlement.
pub fn compute(
    principal: Money,
    window: DateWindow,
    rate: &RateSpec,
    basis: DayCountBasis,
    cycle: &CompoundingCycle,
    rates: &dyn RateSource,
) -> ClaimResult<Accrual> {
    let cuts: Vec<NaiveDate> = cycle
        .settlement_dates(window)?
        .into_iter()
        .map(|d| d + Duration::days(1))
        .collect();
    let cycles = split_at(window, &cuts);

    let mut balance = principal;
    let mut periods: Vec<Period> = Vec::new();
    for piece in &cycles {
        let cycle_periods = rate_spec_periods(balance, *piece, rate, basis, ModeKind::Compound, rates)?;
        let cycle_interest: Money = cycle_periods.iter().map(|p| p.period_interest).sum();
        debug!(cycle = %piece, %balance, %cycle_interest, "compound cycle");
        balance = balance
            .checked_add(cycle_interest)
            .ok_or_else(|| overflow(principal))?;
        periods.extend(cycle_periods);
    }

    Ok(Accrual {
        interest: balance - principal,
        periods,
        cap: None,
    })
}
