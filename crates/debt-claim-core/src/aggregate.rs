use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculators::{Accrual, ModeKind, Period};
use crate::cap::{self, CapOutcome};
use crate::payments::PaymentAllocation;
use crate::types::{CalculationWarning, Money};

/// Final output of one calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub mode: ModeKind,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_interest: Money,
    pub initial_principal: Money,
    /// Principal remaining after all payment offsets.
    pub principal_used: Money,
    pub periods: Vec<Period>,
    pub capped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cap_amount: Option<Money>,
    /// Uncapped penalty figure; present whenever a ceiling was computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contractual_interest: Option<Money>,
    pub payments: Vec<PaymentAllocation>,
    pub outstanding_interest: Money,
    pub outstanding_costs: Money,
    pub rate_table_version: String,
    pub warnings: Vec<CalculationWarning>,
}

impl CalculationResult {
    pub fn total_days(&self) -> i64 {
        self.periods.iter().map(|p| p.days).sum()
    }
}

/// Collects sub-window accruals and payment allocations in timeline order.
#[derive(Debug, Clone)]
pub struct ResultAggregator {
    mode: ModeKind,
    contractual_periods: Vec<Period>,
    contractual_total: Money,
    cap_periods: Vec<Period>,
    cap_total: Money,
    has_cap: bool,
    payments: Vec<PaymentAllocation>,
    warnings: Vec<CalculationWarning>,
}

/// Closing balances handed to [`ResultAggregator::finish`].
#[derive(Debug, Clone)]
pub struct Closing {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_principal: Money,
    pub principal_used: Money,
    pub outstanding_interest: Money,
    pub outstanding_costs: Money,
    pub rate_table_version: String,
}

impl ResultAggregator {
    pub fn new(mode: ModeKind) -> Self {
        ResultAggregator {
            mode,
            contractual_periods: Vec::new(),
            contractual_total: Decimal::ZERO,
            cap_periods: Vec::new(),
            cap_total: Decimal::ZERO,
            has_cap: false,
            payments: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add(&mut self, accrual: Accrual) {
        self.contractual_total += accrual.interest;
        self.contractual_periods.extend(accrual.periods);
        if let Some(ceiling) = accrual.cap {
            self.has_cap = true;
            self.cap_total += ceiling.interest;
            self.cap_periods.extend(ceiling.periods);
        }
    }

    /// Interest owed so far, after the ceiling where one applies.
    pub fn recognised_interest(&self) -> Money {
        if self.has_cap {
            self.contractual_total.min(self.cap_total)
        } else {
            self.contractual_total
        }
    }

    pub fn record_payment(&mut self, allocation: PaymentAllocation) {
        self.payments.push(allocation);
    }

    pub fn warn(&mut self, warning: CalculationWarning) {
        self.warnings.push(warning);
    }

    /// Apply the ceiling decision over totals and build the result.
    pub fn finish(mut self, closing: Closing) -> CalculationResult {
        let outcome: Option<CapOutcome> = self
            .has_cap
            .then(|| cap::enforce(self.contractual_total, self.cap_total));

        let (total_interest, periods, capped) = match &outcome {
            Some(o) if o.capped => {
                self.warnings.push(CalculationWarning::CapApplied {
                    contractual_amount: o.contractual_amount,
                    cap_amount: o.cap_amount,
                });
                (o.final_amount, self.cap_periods, true)
            }
            Some(o) => (o.final_amount, self.contractual_periods, false),
            None => (self.contractual_total, self.contractual_periods, false),
        };

        CalculationResult {
            mode: self.mode,
            start_date: closing.start_date,
            end_date: closing.end_date,
            total_interest,
            initial_principal: closing.initial_principal,
            principal_used: closing.principal_used,
            periods,
            capped,
            cap_amount: outcome.as_ref().map(|o| o.cap_amount),
            contractual_interest: outcome.as_ref().map(|o| o.contractual_amount),
            payments: self.payments,
            outstanding_interest: closing.outstanding_interest,
            outstanding_costs: closing.outstanding_costs,
            rate_table_version: closing.rate_table_version,
            warnings: self.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::RateBasis;
    use crate::cap::CapAccrual;
    use crate::rate_table::Tenor;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn period(start: NaiveDate, end: NaiveDate, interest: Money) -> Period {
        Period {
            start_date: start,
            end_date: end,
            days: (end - start).num_days() + 1,
            applicable_rate: dec!(0.1),
            rate_basis: RateBasis::Annual,
            base_principal: dec!(1000),
            period_interest: interest,
        }
    }

    fn closing() -> Closing {
        Closing {
            start_date: d(2024, 1, 1),
            end_date: d(2024, 1, 20),
            initial_principal: dec!(1000),
            principal_used: dec!(1000),
            outstanding_interest: dec!(0),
            outstanding_costs: dec!(0),
            rate_table_version: "test".into(),
        }
    }

    #[test]
    fn test_sums_sub_windows_in_order() {
        let mut agg = ResultAggregator::new(ModeKind::FixedSimple);
        agg.add(Accrual::from_periods(vec![period(d(2024, 1, 1), d(2024, 1, 10), dec!(3))]));
        agg.add(Accrual::from_periods(vec![period(d(2024, 1, 11), d(2024, 1, 20), dec!(2))]));
        let result = agg.finish(closing());
        assert_eq!(result.total_interest, dec!(5));
        assert_eq!(result.periods.len(), 2);
        assert_eq!(result.total_days(), 20);
        assert!(!result.capped);
        assert!(result.cap_amount.is_none());
    }

    #[test]
    fn test_cap_over_totals_keeps_both_figures() {
        let mut agg = ResultAggregator::new(ModeKind::Penalty);
        let mut acc = Accrual::from_periods(vec![period(d(2024, 1, 1), d(2024, 1, 20), dec!(10))]);
        acc.cap = Some(CapAccrual {
            reference_tenor: Tenor::Short,
            multiplier: dec!(4),
            interest: dec!(7),
            periods: vec![period(d(2024, 1, 1), d(2024, 1, 20), dec!(7))],
        });
        agg.add(acc);
        assert_eq!(agg.recognised_interest(), dec!(7));

        let result = agg.finish(closing());
        assert!(result.capped);
        assert_eq!(result.total_interest, dec!(7));
        assert_eq!(result.contractual_interest, Some(dec!(10)));
        assert_eq!(result.cap_amount, Some(dec!(7)));
        assert_eq!(result.periods[0].period_interest, dec!(7));
        assert!(matches!(result.warnings[0], CalculationWarning::CapApplied { .. }));
    }
}
