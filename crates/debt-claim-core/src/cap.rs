//! Statutory ceiling for penalty interest.
//!
//! The ceiling is computed over the same periods as the contractual figure,
//! at `multiplier × reference rate`. The smaller total wins and both totals
//! are kept.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calculators::Period;
use crate::day_count::{DateWindow, DayCountBasis};
use crate::rate_table::{RateSource, Tenor};
use crate::types::Money;
use crate::ClaimResult;

/// Ceiling figures accompanying a contractual penalty accrual.
#[derive(Debug, Clone, PartialEq)]
pub struct CapAccrual {
    pub reference_tenor: Tenor,
    pub multiplier: Decimal,
    pub interest: Money,
    pub periods: Vec<Period>,
}

/// Result of comparing a contractual amount against its ceiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapOutcome {
    pub contractual_amount: Money,
    pub cap_amount: Money,
    pub final_amount: Money,
    pub capped: bool,
}

/// Ceiling periods over `pieces`, one per contractual period.
pub fn cap_periods(
    principal: Money,
    pieces: &[DateWindow],
    reference_tenor: Tenor,
    multiplier: Decimal,
    basis: DayCountBasis,
    rates: &dyn RateSource,
) -> ClaimResult<Vec<Period>> {
    pieces
        .iter()
        .map(|piece| {
            let reference = rates.lookup(reference_tenor, piece.start())?;
            Period::annual(*piece, principal, reference * multiplier, basis)
        })
        .collect()
}

/// `final = min(contractual, cap)`.
pub fn enforce(contractual_amount: Money, cap_amount: Money) -> CapOutcome {
    let capped = contractual_amount > cap_amount;
    if capped {
        warn!(%contractual_amount, %cap_amount, "penalty exceeds statutory ceiling; capping");
    }
    CapOutcome {
        contractual_amount,
        cap_amount,
        final_amount: if capped { cap_amount } else { contractual_amount },
        capped,
    }
}
