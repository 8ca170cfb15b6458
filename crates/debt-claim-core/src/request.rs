use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::calculators::CalculationMode;
use crate::day_count::DateWindow;
use crate::error::ClaimCalcError;
use crate::payments::PaymentEvent;
use crate::types::Money;
use crate::ClaimResult;

/// Largest principal, cost or payment accepted. Interest on amounts up to
/// this bound stays well inside the decimal range.
pub const MAX_AMOUNT: Money = dec!(1_000_000_000_000_000);

/// Where and how to write the audit trail for a calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditTarget {
    pub path: PathBuf,
    pub sheet_name: String,
    /// Add the sheet to an existing workbook instead of creating one.
    #[serde(default)]
    pub append: bool,
}

/// A single interest calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRequest {
    pub mode: CalculationMode,
    /// Principal, or the base amount for delayed-performance interest.
    pub principal: Money,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub payments: Vec<PaymentEvent>,
    /// Costs owed at the start of the window; first in the offset order.
    #[serde(default)]
    pub outstanding_costs: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit: Option<AuditTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debtor_label: Option<String>,
}

impl CalculationRequest {
    /// Validate every field and return the calculation window.
    pub fn validate(&self) -> ClaimResult<DateWindow> {
        let window = DateWindow::new(self.start_date, self.end_date)?;

        if self.principal < Decimal::ZERO {
            return Err(ClaimCalcError::NegativePrincipal(self.principal));
        }
        within_bound("principal", self.principal)?;
        if self.outstanding_costs < Decimal::ZERO {
            return Err(ClaimCalcError::NegativeAmount {
                field: "outstanding_costs".into(),
                amount: self.outstanding_costs,
            });
        }
        within_bound("outstanding_costs", self.outstanding_costs)?;
        for (i, event) in self.payments.iter().enumerate() {
            if event.amount < Decimal::ZERO {
                return Err(ClaimCalcError::NegativeAmount {
                    field: format!("payments[{i}].amount"),
                    amount: event.amount,
                });
            }
            within_bound(&format!("payments[{i}].amount"), event.amount)?;
            if !window.contains(event.date) {
                return Err(ClaimCalcError::InvalidInput {
                    field: format!("payments[{i}].date"),
                    reason: format!("{} falls outside {}", event.date, window),
                });
            }
        }
        self.mode.validate()?;
        Ok(window)
    }
}

fn within_bound(field: &str, amount: Money) -> ClaimResult<()> {
    if amount > MAX_AMOUNT {
        return Err(ClaimCalcError::InvalidInput {
            field: field.into(),
            reason: format!("{amount} exceeds the largest accepted amount {MAX_AMOUNT}"),
        });
    }
    Ok(())
}
