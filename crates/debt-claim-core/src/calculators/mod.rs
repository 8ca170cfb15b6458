//! Per-mode interest calculators.
//!
//! `CalculationMode` is closed: each variant has exactly one calculator and
//! [`accrue`] is the only place that chooses between them.

pub mod compound;
pub mod delayed;
pub mod fixed;
pub mod floating;
pub mod penalty;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cap::CapAccrual;
use crate::day_count::{period_interest, DateWindow, DayCountBasis};
use crate::error::ClaimCalcError;
use crate::rate_table::{RateSource, Tenor};
use crate::types::{Money, Rate, StatutoryParams};
use crate::ClaimResult;

pub use compound::CompoundingCycle;

/// How `Period::applicable_rate` is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateBasis {
    Annual,
    Daily,
}

impl std::fmt::Display for RateBasis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RateBasis::Annual => write!(f, "annual"),
            RateBasis::Daily => write!(f, "daily"),
        }
    }
}

/// One rate-constant accrual period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: i64,
    pub applicable_rate: Rate,
    pub rate_basis: RateBasis,
    pub base_principal: Money,
    pub period_interest: Money,
}

impl Period {
    /// Simple annual-rate period over `window`.
    pub fn annual(
        window: DateWindow,
        principal: Money,
        annual_rate: Rate,
        basis: DayCountBasis,
    ) -> ClaimResult<Self> {
        Ok(Period {
            start_date: window.start(),
            end_date: window.end(),
            days: window.days(),
            applicable_rate: annual_rate,
            rate_basis: RateBasis::Annual,
            base_principal: principal,
            period_interest: period_interest(principal, annual_rate, window.days(), basis)?,
        })
    }
}

/// Output of one calculator over one window.
#[derive(Debug, Clone, PartialEq)]
pub struct Accrual {
    pub interest: Money,
    pub periods: Vec<Period>,
    /// Statutory ceiling figures; penalty mode only.
    pub cap: Option<CapAccrual>,
}

impl Accrual {
    pub fn from_periods(periods: Vec<Period>) -> Self {
        let interest = periods.iter().map(|p| p.period_interest).sum();
        Accrual {
            interest,
            periods,
            cap: None,
        }
    }
}

/// Contractual rate terms shared by the compound and penalty modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RateSpec {
    Fixed {
        annual_rate: Rate,
    },
    Floating {
        #[serde(default)]
        tenor: Option<Tenor>,
        multiplier: Decimal,
    },
}

/// Calculation mode with its mode-specific parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CalculationMode {
    /// `principal × rate × days / basis`.
    FixedSimple {
        annual_rate: Rate,
        day_count_basis: DayCountBasis,
    },
    /// Benchmark rate × multiplier, segmented at each rate change.
    Floating {
        #[serde(default)]
        tenor: Option<Tenor>,
        multiplier: Decimal,
        day_count_basis: DayCountBasis,
    },
    /// Statutory daily rate on a caller-supplied base amount.
    DelayedPerformance {
        #[serde(default)]
        daily_rate: Option<Rate>,
    },
    /// Interest capitalised at each cycle settlement date.
    Compound {
        rate: RateSpec,
        day_count_basis: DayCountBasis,
        #[serde(default)]
        cycle: Option<CompoundingCycle>,
    },
    /// Contractual penalty bounded by the statutory ceiling.
    Penalty {
        rate: RateSpec,
        day_count_basis: DayCountBasis,
        #[serde(default)]
        reference_tenor: Option<Tenor>,
    },
}

/// Parameter-free mode label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeKind {
    FixedSimple,
    Floating,
    DelayedPerformance,
    Compound,
    Penalty,
}

impl std::fmt::Display for ModeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ModeKind::FixedSimple => "fixed_simple",
            ModeKind::Floating => "floating",
            ModeKind::DelayedPerformance => "delayed_performance",
            ModeKind::Compound => "compound",
            ModeKind::Penalty => "penalty",
        };
        write!(f, "{s}")
    }
}

impl CalculationMode {
    pub fn kind(&self) -> ModeKind {
        match self {
            CalculationMode::FixedSimple { .. } => ModeKind::FixedSimple,
            CalculationMode::Floating { .. } => ModeKind::Floating,
            CalculationMode::DelayedPerformance { .. } => ModeKind::DelayedPerformance,
            CalculationMode::Compound { .. } => ModeKind::Compound,
            CalculationMode::Penalty { .. } => ModeKind::Penalty,
        }
    }

    pub fn methodology(&self) -> &'static str {
        match self {
            CalculationMode::FixedSimple { .. } => "Fixed-rate simple interest",
            CalculationMode::Floating { .. } => "Floating-rate interest segmented at benchmark changes",
            CalculationMode::DelayedPerformance { .. } => {
                "Interest on delayed performance at the statutory daily rate"
            }
            CalculationMode::Compound { .. } => "Compound interest capitalised per settlement cycle",
            CalculationMode::Penalty { .. } => "Penalty interest capped at the statutory ceiling",
        }
    }

    /// Reject missing or out-of-range parameters before any accrual runs.
    pub fn validate(&self) -> ClaimResult<()> {
        match self {
            CalculationMode::FixedSimple { annual_rate, .. } => non_negative_rate("annual_rate", *annual_rate),
            CalculationMode::Floating { tenor, multiplier, .. } => {
                require_tenor(*tenor, ModeKind::Floating)?;
                non_negative_rate("multiplier", *multiplier)
            }
            CalculationMode::DelayedPerformance { daily_rate } => match daily_rate {
                Some(r) => non_negative_rate("daily_rate", *r),
                None => Ok(()),
            },
            CalculationMode::Compound { rate, cycle, .. } => {
                validate_rate_spec(rate, ModeKind::Compound)?;
                match cycle {
                    Some(c) => c.validate(),
                    None => Err(ClaimCalcError::MissingCycleParameter),
                }
            }
            CalculationMode::Penalty {
                rate,
                reference_tenor,
                ..
            } => {
                validate_rate_spec(rate, ModeKind::Penalty)?;
                penalty::reference_tenor(rate, *reference_tenor).map(|_| ())
            }
        }
    }

    /// Benchmark tenors this mode reads from the rate table.
    pub fn tenors(&self) -> Vec<Tenor> {
        let mut tenors = Vec::new();
        match self {
            CalculationMode::Floating { tenor: Some(t), .. } => tenors.push(*t),
            CalculationMode::Compound { rate, .. } => {
                if let RateSpec::Floating { tenor: Some(t), .. } = rate {
                    tenors.push(*t);
                }
            }
            CalculationMode::Penalty {
                rate,
                reference_tenor,
                ..
            } => {
                if let RateSpec::Floating { tenor: Some(t), .. } = rate {
                    tenors.push(*t);
                }
                if let Some(t) = reference_tenor {
                    if !tenors.contains(t) {
                        tenors.push(*t);
                    }
                }
            }
            _ => {}
        }
        tenors
    }
}

/// Shared inputs for every calculator.
#[derive(Clone, Copy)]
pub struct CalcContext<'a> {
    pub rates: &'a dyn RateSource,
    pub statutory: &'a StatutoryParams,
}

/// Run the calculator for `mode` over `window` on a constant principal.
pub fn accrue(
    mode: &CalculationMode,
    principal: Money,
    window: DateWindow,
    ctx: CalcContext<'_>,
) -> ClaimResult<Accrual> {
    match mode {
        CalculationMode::FixedSimple {
            annual_rate,
            day_count_basis,
        } => fixed::compute(principal, window, *annual_rate, *day_count_basis),
        CalculationMode::Floating {
            tenor,
            multiplier,
            day_count_basis,
        } => floating::compute(
            principal,
            window,
            require_tenor(*tenor, ModeKind::Floating)?,
            *multiplier,
            *day_count_basis,
            ctx.rates,
        ),
        CalculationMode::DelayedPerformance { daily_rate } => delayed::compute(
            principal,
            window,
            daily_rate.unwrap_or(ctx.statutory.delayed_performance_daily_rate),
        ),
        CalculationMode::Compound {
            rate,
            day_count_basis,
            cycle,
        } => {
            let cycle = cycle.as_ref().ok_or(ClaimCalcError::MissingCycleParameter)?;
            compound::compute(principal, window, rate, *day_count_basis, cycle, ctx.rates)
        }
        CalculationMode::Penalty {
            rate,
            day_count_basis,
            reference_tenor,
        } => penalty::compute(principal, window, rate, *day_count_basis, *reference_tenor, ctx),
    }
}

/// Periods for a contractual rate over `window`: one period for a fixed
/// rate, one per benchmark segment for a floating rate.
pub(crate) fn rate_spec_periods(
    principal: Money,
    window: DateWindow,
    spec: &RateSpec,
    basis: DayCountBasis,
    mode: ModeKind,
    rates: &dyn RateSource,
) -> ClaimResult<Vec<Period>> {
    match spec {
        RateSpec::Fixed { annual_rate } => Ok(vec![Period::annual(window, principal, *annual_rate, basis)?]),
        RateSpec::Floating { tenor, multiplier } => {
            let tenor = require_tenor(*tenor, mode)?;
            floating::periods(principal, window, tenor, *multiplier, basis, rates)
        }
    }
}

pub(crate) fn require_tenor(tenor: Option<Tenor>, mode: ModeKind) -> ClaimResult<Tenor> {
    tenor.ok_or_else(|| ClaimCalcError::TermNotSpecified {
        mode: mode.to_string(),
    })
}

fn validate_rate_spec(spec: &RateSpec, mode: ModeKind) -> ClaimResult<()> {
    match spec {
        RateSpec::Fixed { annual_rate } => non_negative_rate("annual_rate", *annual_rate),
        RateSpec::Floating { tenor, multiplier } => {
            require_tenor(*tenor, mode)?;
            non_negative_rate("multiplier", *multiplier)
        }
    }
}

fn non_negative_rate(field: &str, value: Decimal) -> ClaimResult<()> {
    if value < Decimal::ZERO {
        return Err(ClaimCalcError::NegativeAmount {
            field: field.into(),
            amount: value,
        });
    }
    Ok(())
}
