//! Splitting a window into rate-constant sub-periods.
//!
//! Every rate-change effective date strictly inside `(start, end]` opens a
//! new segment; the previous segment closes the day before. The resulting
//! segments partition the window exactly.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::day_count::DateWindow;
use crate::rate_table::{RateSource, Tenor};
use crate::types::Rate;
use crate::ClaimResult;

/// A sub-period with one benchmark rate in force.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSegment {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: i64,
    /// Benchmark rate in force on `start_date`, before any multiplier.
    pub benchmark_rate: Rate,
}

/// Cut `window` before each date in `cuts` that falls in `(start, end]`.
///
/// Cuts outside that range, and repeated cuts, are ignored.
pub fn split_at(window: DateWindow, cuts: &[NaiveDate]) -> Vec<DateWindow> {
    let mut sorted: Vec<NaiveDate> = cuts
        .iter()
        .copied()
        .filter(|c| *c > window.start() && *c <= window.end())
        .collect();
    sorted.sort();
    sorted.dedup();

    let mut pieces = Vec::with_capacity(sorted.len() + 1);
    let mut rest = window;
    for cut in sorted {
        if let (Some(head), Some(tail)) = rest.split_before(cut) {
            pieces.push(head);
            rest = tail;
        }
    }
    pieces.push(rest);
    pieces
}

/// Segment `window` at every `tenor` rate change in `(start, end]`.
pub fn segment(window: DateWindow, tenor: Tenor, rates: &dyn RateSource) -> ClaimResult<Vec<RateSegment>> {
    let boundaries = rates.change_dates(tenor, window.start(), window.end());
    debug!(
        %window,
        %tenor,
        boundaries = boundaries.len(),
        "segmenting window at rate changes"
    );

    split_at(window, &boundaries)
        .into_iter()
        .map(|piece| {
            Ok(RateSegment {
                start_date: piece.start(),
                end_date: piece.end(),
                days: piece.days(),
                benchmark_rate: rates.lookup(tenor, piece.start())?,
            })
        })
        .collect()
}

/// Segment the window given as raw dates, validating the range first.
pub fn segment_dates(
    start: NaiveDate,
    end: NaiveDate,
    tenor: Tenor,
    rates: &dyn RateSource,
) -> ClaimResult<Vec<RateSegment>> {
    segment(DateWindow::new(start, end)?, tenor, rates)
}
