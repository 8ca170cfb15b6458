use chrono::NaiveDate;
use debt_claim_core::types::CalculationWarning;
use debt_claim_core::{
    CalculationMode, CalculationRequest, CalculationResult, ClaimCalcError, ClaimEngine,
    CompoundingCycle, DayCountBasis, PaymentEvent, RateSpec, Tenor,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn fixed_ten_percent(payments: Vec<PaymentEvent>, costs: Decimal) -> CalculationRequest {
    CalculationRequest {
        mode: CalculationMode::FixedSimple {
            annual_rate: dec!(0.10),
            day_count_basis: DayCountBasis::ACT_365,
        },
        principal: dec!(100000),
        start_date: d(2023, 1, 1),
        end_date: d(2023, 12, 31),
        payments,
        outstanding_costs: costs,
        audit: None,
        debtor_label: None,
    }
}

fn pay(date: NaiveDate, amount: Decimal) -> PaymentEvent {
    PaymentEvent { date, amount }
}

/// Every unit paid is attributed, and interest owed reconciles with what
/// was paid against it.
fn assert_conserved(result: &CalculationResult, costs: Decimal) {
    for a in &result.payments {
        assert_eq!(a.amount, a.costs_paid + a.interest_paid + a.principal_paid + a.overpayment);
    }
    let principal_paid: Decimal = result.payments.iter().map(|a| a.principal_paid).sum();
    let interest_paid: Decimal = result.payments.iter().map(|a| a.interest_paid).sum();
    let costs_paid: Decimal = result.payments.iter().map(|a| a.costs_paid).sum();
    assert_eq!(result.principal_used + principal_paid, result.initial_principal);
    assert_eq!(result.outstanding_interest + interest_paid, result.total_interest);
    assert_eq!(result.outstanding_costs + costs_paid, costs);
}

#[test]
fn test_payment_resegments_on_reduced_principal() {
    let engine = ClaimEngine::with_builtin_rates();
    let req = fixed_ten_percent(vec![pay(d(2023, 6, 30), dec!(50000))], dec!(0));
    let result = engine.calculate(&req).unwrap();

    assert_eq!(result.periods.len(), 2);
    assert_eq!(result.periods[0].end_date, d(2023, 6, 30));
    assert_eq!(result.periods[0].days, 181);
    assert_eq!(result.periods[1].start_date, d(2023, 7, 1));
    assert_eq!(result.periods[1].days, 184);
    assert_eq!(result.total_days(), 365);

    // 181 days on 100000, then 184 days on what principal remains.
    let first = dec!(100000) * dec!(0.10) * dec!(181) / dec!(365);
    let a = &result.payments[0];
    assert_eq!(a.interest_paid, first);
    assert_eq!(a.principal_paid, dec!(50000) - first);
    assert_eq!(result.periods[1].base_principal, a.remaining_principal);
    assert_conserved(&result, dec!(0));
}

#[test]
fn test_costs_paid_before_interest() {
    let engine = ClaimEngine::with_builtin_rates();
    let req = fixed_ten_percent(vec![pay(d(2023, 3, 31), dec!(1500))], dec!(1000));
    let result = engine.calculate(&req).unwrap();

    let a = &result.payments[0];
    assert_eq!(a.costs_paid, dec!(1000));
    assert_eq!(a.interest_paid, dec!(500));
    assert_eq!(a.principal_paid, dec!(0));
    assert_eq!(result.principal_used, dec!(100000));
    assert!(a.outstanding_interest > dec!(0));
    assert_conserved(&result, dec!(1000));
}

#[test]
fn test_same_day_payments_applied_in_input_order() {
    let engine = ClaimEngine::with_builtin_rates();
    let req = fixed_ten_percent(
        vec![pay(d(2023, 6, 30), dec!(1000)), pay(d(2023, 6, 30), dec!(20000))],
        dec!(0),
    );
    let result = engine.calculate(&req).unwrap();
    assert_eq!(result.payments.len(), 2);
    assert_eq!(result.payments[0].amount, dec!(1000));
    assert_eq!(result.payments[0].principal_paid, dec!(0));
    assert!(result.payments[1].principal_paid > dec!(0));
    // Second payment on the same day adds no accrual period.
    assert_eq!(result.periods.len(), 2);
    assert_conserved(&result, dec!(0));
}

#[test]
fn test_overpayment_reported() {
    let engine = ClaimEngine::with_builtin_rates();
    let req = fixed_ten_percent(vec![pay(d(2023, 1, 31), dec!(200000))], dec!(0));
    let result = engine.calculate(&req).unwrap();

    let a = &result.payments[0];
    assert_eq!(a.remaining_principal, dec!(0));
    assert!(a.overpayment > dec!(0));
    assert!(result
        .warnings
        .iter()
        .any(|w| matches!(w, CalculationWarning::OverpaymentDetected { .. })));
    assert!(result
        .warnings
        .iter()
        .any(|w| matches!(w, CalculationWarning::PrincipalExhausted { .. })));
    // Nothing accrues once principal is gone.
    assert_eq!(result.periods[1].period_interest, dec!(0));
    assert_conserved(&result, dec!(0));
}

#[test]
fn test_payment_on_last_day() {
    let engine = ClaimEngine::with_builtin_rates();
    let req = fixed_ten_percent(vec![pay(d(2023, 12, 31), dec!(5000))], dec!(0));
    let result = engine.calculate(&req).unwrap();
    assert_eq!(result.periods.len(), 1);
    assert_eq!(result.total_interest, dec!(10000));
    assert_eq!(result.outstanding_interest, dec!(5000));
    assert_conserved(&result, dec!(0));
}

#[test]
fn test_payment_outside_window_rejected() {
    let engine = ClaimEngine::with_builtin_rates();
    let req = fixed_ten_percent(vec![pay(d(2024, 1, 1), dec!(10))], dec!(0));
    assert!(matches!(
        engine.calculate(&req).unwrap_err(),
        ClaimCalcError::InvalidInput { .. }
    ));
}

#[test]
fn test_negative_payment_rejected() {
    let engine = ClaimEngine::with_builtin_rates();
    let req = fixed_ten_percent(vec![pay(d(2023, 5, 1), dec!(-10))], dec!(0));
    assert!(matches!(
        engine.calculate(&req).unwrap_err(),
        ClaimCalcError::NegativeAmount { .. }
    ));
}

#[test]
fn test_capped_penalty_with_payment() {
    let engine = ClaimEngine::with_builtin_rates();
    let req = CalculationRequest {
        mode: CalculationMode::Penalty {
            rate: RateSpec::Fixed {
                annual_rate: dec!(0.24),
            },
            day_count_basis: DayCountBasis::ACT_365,
            reference_tenor: Some(Tenor::Short),
        },
        principal: dec!(100000),
        start_date: d(2024, 1, 1),
        end_date: d(2024, 12, 31),
        payments: vec![pay(d(2024, 8, 31), dec!(30000))],
        outstanding_costs: dec!(0),
        audit: None,
        debtor_label: None,
    };
    let result = engine.calculate(&req).unwrap();
    assert!(result.capped);
    assert!(result.total_interest <= result.cap_amount.unwrap());
    assert_conserved(&result, dec!(0));
}

#[test]
fn test_compound_restarts_after_payment() {
    let engine = ClaimEngine::with_builtin_rates();
    let req = CalculationRequest {
        mode: CalculationMode::Compound {
            rate: RateSpec::Fixed {
                annual_rate: dec!(0.10),
            },
            day_count_basis: DayCountBasis::ACT_365,
            cycle: Some(CompoundingCycle::SettlementDates {
                dates: vec![d(2023, 3, 31), d(2023, 9, 30)],
            }),
        },
        principal: dec!(100000),
        start_date: d(2023, 1, 1),
        end_date: d(2023, 12, 31),
        payments: vec![pay(d(2023, 6, 30), dec!(5000))],
        outstanding_costs: dec!(0),
        audit: None,
        debtor_label: None,
    };
    let result = engine.calculate(&req).unwrap();

    // Cycles: Jan-Mar and Apr-Jun before the payment, Jul-Sep and Oct-Dec after.
    let days: Vec<i64> = result.periods.iter().map(|p| p.days).collect();
    assert_eq!(days, vec![90, 91, 92, 92]);
    assert_eq!(result.periods[1].end_date, d(2023, 6, 30));
    assert_eq!(result.periods[1].base_principal, dec!(100000) + result.periods[0].period_interest);

    // Interest owed before the payment exceeds it, so principal is untouched
    // and the unpaid remainder is not capitalised into the next sub-window.
    let a = &result.payments[0];
    assert_eq!(a.interest_paid, dec!(5000));
    assert_eq!(a.principal_paid, dec!(0));
    assert_eq!(result.periods[2].base_principal, dec!(100000));
    assert_eq!(result.periods[3].base_principal, dec!(100000) + result.periods[2].period_interest);

    let accrued: Decimal = result.periods.iter().map(|p| p.period_interest).sum();
    assert!((result.total_interest - accrued).abs() < dec!(0.0000001));
    assert_eq!(result.total_days(), 365);
    assert_conserved(&result, dec!(0));
}
