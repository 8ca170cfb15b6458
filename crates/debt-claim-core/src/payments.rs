//! Partial-payment offsets.
//!
//! Each payment closes the current sub-window, settles what is owed in the
//! order costs, interest, principal, and opens the next sub-window the day
//! after with the reduced principal.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::aggregate::ResultAggregator;
use crate::calculators::{accrue, CalcContext, CalculationMode};
use crate::day_count::DateWindow;
use crate::types::{CalculationWarning, Money};
use crate::ClaimResult;

/// A payment received against the debt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentEvent {
    pub date: NaiveDate,
    pub amount: Money,
}

/// How one payment was applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentAllocation {
    pub date: NaiveDate,
    pub amount: Money,
    pub costs_paid: Money,
    pub interest_paid: Money,
    pub principal_paid: Money,
    pub overpayment: Money,
    pub remaining_principal: Money,
    pub outstanding_interest: Money,
    pub outstanding_costs: Money,
}

/// Amounts owed at a point on the timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Outstanding {
    pub costs: Money,
    pub interest: Money,
    pub principal: Money,
}

impl Outstanding {
    /// Apply `event` in the fixed order: costs, interest, principal. Whatever
    /// is left over is reported as overpayment.
    pub fn apply(&mut self, event: &PaymentEvent) -> PaymentAllocation {
        let mut left = event.amount;

        let costs_paid = left.min(self.costs);
        self.costs -= costs_paid;
        left -= costs_paid;

        let interest_paid = left.min(self.interest);
        self.interest -= interest_paid;
        left -= interest_paid;

        let principal_paid = left.min(self.principal);
        self.principal -= principal_paid;
        left -= principal_paid;

        PaymentAllocation {
            date: event.date,
            amount: event.amount,
            costs_paid,
            interest_paid,
            principal_paid,
            overpayment: left,
            remaining_principal: self.principal,
            outstanding_interest: self.interest,
            outstanding_costs: self.costs,
        }
    }
}

/// Accrue `mode` across `window`, re-segmenting at every payment.
///
/// With no payments this is a single accrual over the whole window.
pub fn run_offsets(
    mode: &CalculationMode,
    window: DateWindow,
    opening: Outstanding,
    payments: &[PaymentEvent],
    ctx: CalcContext<'_>,
    agg: &mut ResultAggregator,
) -> ClaimResult<Outstanding> {
    let mut events = payments.to_vec();
    events.sort_by_key(|e| e.date);

    let mut owed = opening;
    let mut recognised = Decimal::ZERO;
    let mut cursor = Some(window.start());

    for event in &events {
        if let Some(from) = cursor.filter(|from| *from <= event.date) {
            let sub = DateWindow::new(from, event.date)?;
            debug!(%sub, principal = %owed.principal, "accruing to payment date");
            agg.add(accrue(mode, owed.principal, sub, ctx)?);
            let now = agg.recognised_interest();
            owed.interest += now - recognised;
            recognised = now;
        }

        let allocation = owed.apply(event);
        if allocation.overpayment > Decimal::ZERO {
            warn!(date = %event.date, excess = %allocation.overpayment, "overpayment detected");
            agg.warn(CalculationWarning::OverpaymentDetected {
                date: event.date,
                excess: allocation.overpayment,
            });
        }
        if allocation.principal_paid > Decimal::ZERO
            && owed.principal.is_zero()
            && event.date < window.end()
        {
            agg.warn(CalculationWarning::PrincipalExhausted { date: event.date });
        }
        agg.record_payment(allocation);
        cursor = event.date.succ_opt();
    }

    if let Some(from) = cursor.filter(|from| *from <= window.end()) {
        let sub = DateWindow::new(from, window.end())?;
        debug!(%sub, principal = %owed.principal, "accruing final sub-window");
        agg.add(accrue(mode, owed.principal, sub, ctx)?);
        owed.interest += agg.recognised_interest() - recognised;
    }

    Ok(owed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn event(amount: Decimal) -> PaymentEvent {
        PaymentEvent {
            date: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            amount,
        }
    }

    #[test]
    fn test_allocation_order() {
        let mut owed = Outstanding {
            costs: dec!(500),
            interest: dec!(1200),
            principal: dec!(10000),
        };
        let a = owed.apply(&event(dec!(3000)));
        assert_eq!(a.costs_paid, dec!(500));
        assert_eq!(a.interest_paid, dec!(1200));
        assert_eq!(a.principal_paid, dec!(1300));
        assert_eq!(a.overpayment, dec!(0));
        assert_eq!(a.remaining_principal, dec!(8700));
    }

    #[test]
    fn test_partial_payment_covers_costs_only() {
        let mut owed = Outstanding {
            costs: dec!(500),
            interest: dec!(1200),
            principal: dec!(10000),
        };
        let a = owed.apply(&event(dec!(300)));
        assert_eq!(a.costs_paid, dec!(300));
        assert_eq!(a.interest_paid, dec!(0));
        assert_eq!(owed.costs, dec!(200));
        assert_eq!(owed.principal, dec!(10000));
    }

    #[test]
    fn test_overpayment_never_negative_principal() {
        let mut owed = Outstanding {
            costs: dec!(0),
            interest: dec!(100),
            principal: dec!(1000),
        };
        let a = owed.apply(&event(dec!(1500)));
        assert_eq!(a.overpayment, dec!(400));
        assert_eq!(a.remaining_principal, dec!(0));
        assert_eq!(
            a.costs_paid + a.interest_paid + a.principal_paid + a.overpayment,
            a.amount
        );
    }
}
