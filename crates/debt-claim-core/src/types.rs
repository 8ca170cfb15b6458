use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::rate_table::Tenor;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.0435 = 4.35%). Never as percentages.
pub type Rate = Decimal;

/// Statutory constants applied by the calculators.
///
/// The defaults are the values in force for claims reviewed by this engine;
/// they are carried as data so a rule change is a configuration update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatutoryParams {
    /// Ceiling multiple of the reference rate for penalty interest.
    #[serde(default = "default_cap_multiplier")]
    pub cap_multiplier: Decimal,
    /// Daily rate for interest on delayed performance (0.000175 = 0.0175%/day).
    #[serde(default = "default_delayed_performance_daily_rate")]
    pub delayed_performance_daily_rate: Rate,
    /// Decimal places of the smallest currency unit, used when rendering.
    #[serde(default = "default_currency_scale")]
    pub currency_scale: u32,
}

impl Default for StatutoryParams {
    fn default() -> Self {
        Self {
            cap_multiplier: default_cap_multiplier(),
            delayed_performance_daily_rate: default_delayed_performance_daily_rate(),
            currency_scale: default_currency_scale(),
        }
    }
}

fn default_cap_multiplier() -> Decimal {
    dec!(4)
}

fn default_delayed_performance_daily_rate() -> Rate {
    dec!(0.000175)
}

fn default_currency_scale() -> u32 {
    2
}

/// Round a money amount to the smallest currency unit, half away from zero.
pub fn round_money(amount: Money, scale: u32) -> Money {
    amount.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
}

/// Non-fatal conditions recorded on a calculation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalculationWarning {
    /// Contractual penalty exceeded the statutory ceiling.
    CapApplied {
        contractual_amount: Money,
        cap_amount: Money,
    },
    /// A payment exceeded everything owed at its date.
    OverpaymentDetected { date: NaiveDate, excess: Money },
    /// Principal was fully repaid; nothing accrues after this date.
    PrincipalExhausted { date: NaiveDate },
    /// The window runs past the last publication in the rate table.
    RateCoverageExtrapolated {
        tenor: Tenor,
        as_of: NaiveDate,
        end_date: NaiveDate,
    },
}

impl std::fmt::Display for CalculationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CalculationWarning::CapApplied {
                contractual_amount,
                cap_amount,
            } => write!(
                f,
                "Penalty capped at statutory ceiling: contractual {contractual_amount}, cap {cap_amount}"
            ),
            CalculationWarning::OverpaymentDetected { date, excess } => {
                write!(f, "Overpayment of {excess} detected on {date}")
            }
            CalculationWarning::PrincipalExhausted { date } => {
                write!(f, "Principal fully repaid on {date}; no further accrual")
            }
            CalculationWarning::RateCoverageExtrapolated {
                tenor,
                as_of,
                end_date,
            } => write!(
                f,
                "{tenor} rate table current to {as_of}; last published rate carried to {end_date}"
            ),
        }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
    pub rate_table_version: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    rate_table_version: &str,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
            rate_table_version: rate_table_version.to_string(),
        },
    }
}
