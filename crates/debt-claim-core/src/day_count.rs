//! Inclusive day counting and rate-to-period conversion.
//!
//! Both endpoints of a window count: 2024-01-01..=2024-01-01 is one day.
//! Annual rates convert to a period by `days / basis`, where the basis is
//! always supplied by the caller.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ClaimCalcError;
use crate::types::{Money, Rate};
use crate::ClaimResult;

/// Day-count denominator for annual rates (e.g. 360 or 365).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct DayCountBasis(u32);

impl DayCountBasis {
    pub const ACT_360: DayCountBasis = DayCountBasis(360);
    pub const ACT_365: DayCountBasis = DayCountBasis(365);

    pub fn new(days: u32) -> ClaimResult<Self> {
        if days == 0 {
            return Err(ClaimCalcError::InvalidInput {
                field: "day_count_basis".into(),
                reason: "Day-count basis must be a positive number of days".into(),
            });
        }
        Ok(DayCountBasis(days))
    }

    pub fn days(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for DayCountBasis {
    type Error = ClaimCalcError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        DayCountBasis::new(value)
    }
}

impl From<DayCountBasis> for u32 {
    fn from(basis: DayCountBasis) -> Self {
        basis.0
    }
}

impl std::fmt::Display for DayCountBasis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ACT/{}", self.0)
    }
}

/// Inclusive date window `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> ClaimResult<Self> {
        if start > end {
            return Err(ClaimCalcError::InvalidDateRange { start, end });
        }
        Ok(DateWindow { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days, both endpoints included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Split so that `date` begins the second half. Returns `None` for the
    /// first half when `date` is the window start, and `None` for the second
    /// half when `date` lies after the window.
    pub fn split_before(&self, date: NaiveDate) -> (Option<DateWindow>, Option<DateWindow>) {
        if date <= self.start {
            return (None, Some(*self));
        }
        if date > self.end {
            return (Some(*self), None);
        }
        let first = DateWindow {
            start: self.start,
            end: date - Duration::days(1),
        };
        let second = DateWindow {
            start: date,
            end: self.end,
        };
        (Some(first), Some(second))
    }
}

impl std::fmt::Display for DateWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Inclusive day count between two dates.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> ClaimResult<i64> {
    Ok(DateWindow::new(start, end)?.days())
}

/// Simple interest for `days` at an annual rate over an explicit basis.
pub fn period_interest(principal: Money, annual_rate: Rate, days: i64, basis: DayCountBasis) -> ClaimResult<Money> {
    principal
        .checked_mul(annual_rate)
        .and_then(|v| v.checked_mul(Decimal::from(days)))
        .and_then(|v| v.checked_div(Decimal::from(basis.days())))
        .ok_or_else(|| overflow(principal))
}

/// Simple interest for `days` at a daily rate; no annualisation.
pub fn daily_interest(principal: Money, daily_rate: Rate, days: i64) -> ClaimResult<Money> {
    principal
        .checked_mul(daily_rate)
        .and_then(|v| v.checked_mul(Decimal::from(days)))
        .ok_or_else(|| overflow(principal))
}

pub(crate) fn overflow(principal: Money) -> ClaimCalcError {
    ClaimCalcError::InvalidInput {
        field: "principal".into(),
        reason: format!("interest on {principal} exceeds the decimal range"),
    }
}
