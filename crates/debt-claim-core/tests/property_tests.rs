use chrono::{Duration, NaiveDate};
use debt_claim_core::{
    CalculationMode, CalculationRequest, ClaimEngine, DayCountBasis, PaymentEvent, RateSpec, Tenor,
};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 9, 1).unwrap()
}

fn window() -> impl Strategy<Value = (NaiveDate, NaiveDate)> {
    (0i64..2000, 0i64..1500).prop_map(|(offset, len)| {
        let start = base() + Duration::days(offset);
        (start, start + Duration::days(len))
    })
}

fn tenor() -> impl Strategy<Value = Tenor> {
    prop_oneof![Just(Tenor::Short), Just(Tenor::Long)]
}

fn request(mode: CalculationMode, principal: i64, start: NaiveDate, end: NaiveDate) -> CalculationRequest {
    CalculationRequest {
        mode,
        principal: Decimal::from(principal),
        start_date: start,
        end_date: end,
        payments: vec![],
        outstanding_costs: Decimal::ZERO,
        audit: None,
        debtor_label: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn floating_periods_partition_window(
        (start, end) in window(),
        tenor in tenor(),
        principal in 0i64..10_000_000,
        mult_bp in 50i64..300,
    ) {
        let engine = ClaimEngine::with_builtin_rates();
        let mode = CalculationMode::Floating {
            tenor: Some(tenor),
            multiplier: Decimal::new(mult_bp, 2),
            day_count_basis: DayCountBasis::ACT_365,
        };
        let result = engine.calculate(&request(mode, principal, start, end)).unwrap();

        prop_assert_eq!(result.total_days(), (end - start).num_days() + 1);
        prop_assert!(result.total_interest >= Decimal::ZERO);
        prop_assert_eq!(result.periods.first().unwrap().start_date, start);
        prop_assert_eq!(result.periods.last().unwrap().end_date, end);
        for pair in result.periods.windows(2) {
            prop_assert_eq!(pair[0].end_date.succ_opt().unwrap(), pair[1].start_date);
        }
    }

    #[test]
    fn penalty_never_exceeds_ceiling(
        (start, end) in window(),
        tenor in tenor(),
        rate_bp in 0i64..4000,
    ) {
        let engine = ClaimEngine::with_builtin_rates();
        let mode = CalculationMode::Penalty {
            rate: RateSpec::Fixed { annual_rate: Decimal::new(rate_bp, 4) },
            day_count_basis: DayCountBasis::ACT_365,
            reference_tenor: Some(tenor),
        };
        let result = engine.calculate(&request(mode, 100_000, start, end)).unwrap();
        let cap = result.cap_amount.unwrap();
        prop_assert!(result.total_interest <= cap);
        prop_assert_eq!(result.capped, result.contractual_interest.unwrap() > cap);
    }

    #[test]
    fn payments_conserve_amounts(
        (start, end) in window(),
        offsets in proptest::collection::vec((0i64..1500, 0i64..200_000), 0..5),
    ) {
        let engine = ClaimEngine::with_builtin_rates();
        let span = (end - start).num_days();
        let payments: Vec<PaymentEvent> = offsets
            .iter()
            .map(|(off, amt)| PaymentEvent {
                date: start + Duration::days(off % (span + 1)),
                amount: Decimal::from(*amt),
            })
            .collect();
        let mut req = request(
            CalculationMode::Floating {
                tenor: Some(Tenor::Short),
                multiplier: Decimal::ONE,
                day_count_basis: DayCountBasis::ACT_365,
            },
            500_000,
            start,
            end,
        );
        req.payments = payments;
        let result = engine.calculate(&req).unwrap();

        let paid: Decimal = req.payments.iter().map(|p| p.amount).sum();
        let attributed: Decimal = result
            .payments
            .iter()
            .map(|a| a.costs_paid + a.interest_paid + a.principal_paid + a.overpayment)
            .sum();
        prop_assert_eq!(paid, attributed);
        let interest_paid: Decimal = result.payments.iter().map(|a| a.interest_paid).sum();
        prop_assert_eq!(result.outstanding_interest + interest_paid, result.total_interest);
        prop_assert_eq!(result.total_days(), span + 1);
    }

    #[test]
    fn calculation_is_idempotent(
        (start, end) in window(),
        tenor in tenor(),
    ) {
        let engine = ClaimEngine::with_builtin_rates();
        let mode = CalculationMode::Floating {
            tenor: Some(tenor),
            multiplier: Decimal::ONE,
            day_count_basis: DayCountBasis::ACT_360,
        };
        let req = request(mode, 1_000_000, start, end);
        prop_assert_eq!(engine.calculate(&req).unwrap(), engine.calculate(&req).unwrap());
    }
}
