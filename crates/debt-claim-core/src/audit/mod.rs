//! Audit trail rendering.
//!
//! A result becomes an [`AuditSheet`]: metadata header rows followed by one
//! row per period with a running total. Sheets are collected into a CSV
//! workbook through [`AuditWorkbookBuilder`].

pub mod workbook;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aggregate::CalculationResult;
use crate::calculators::RateBasis;
use crate::error::ClaimCalcError;
use crate::request::CalculationRequest;
use crate::types::{round_money, Money, Rate};
use crate::ClaimResult;

pub use workbook::{write_creditor_workbook, AuditWorkbook, AuditWorkbookBuilder};

const MAX_SHEET_NAME: usize = 31;
const FORBIDDEN_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Descriptive header for one sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditMetadata {
    pub debtor_label: Option<String>,
    pub parameters: serde_json::Value,
    pub generated_at: DateTime<Utc>,
}

impl AuditMetadata {
    pub fn for_request(request: &CalculationRequest, generated_at: DateTime<Utc>) -> Self {
        AuditMetadata {
            debtor_label: request.debtor_label.clone(),
            parameters: serde_json::to_value(&request.mode).unwrap_or_default(),
            generated_at,
        }
    }
}

/// One period row as written to the workbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: i64,
    pub rate: Rate,
    /// Whether `rate` is annual or daily.
    pub rate_basis: RateBasis,
    pub base_principal: Money,
    pub period_interest: Money,
    pub running_total: Money,
}

/// A named sheet: header key/value pairs, period rows and the total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditSheet {
    pub name: String,
    pub metadata: Vec<(String, String)>,
    pub rows: Vec<AuditRow>,
    pub total_interest: Money,
}

impl AuditSheet {
    /// Render `result`, rounding money columns to `scale` decimal places.
    pub fn from_result(
        name: &str,
        result: &CalculationResult,
        meta: &AuditMetadata,
        scale: u32,
    ) -> ClaimResult<Self> {
        validate_sheet_name(name)?;

        let mut metadata = vec![
            (
                "debtor".to_string(),
                meta.debtor_label.clone().unwrap_or_default(),
            ),
            ("mode".to_string(), result.mode.to_string()),
            ("parameters".to_string(), meta.parameters.to_string()),
            ("start_date".to_string(), result.start_date.to_string()),
            ("end_date".to_string(), result.end_date.to_string()),
            ("principal".to_string(), result.initial_principal.to_string()),
            ("principal_used".to_string(), result.principal_used.to_string()),
            ("rate_table_version".to_string(), result.rate_table_version.clone()),
            ("generated_at".to_string(), meta.generated_at.to_rfc3339()),
        ];
        if let (Some(cap), Some(contractual)) = (result.cap_amount, result.contractual_interest) {
            metadata.push(("capped".to_string(), result.capped.to_string()));
            metadata.push(("cap_amount".to_string(), round_money(cap, scale).to_string()));
            metadata.push((
                "contractual_interest".to_string(),
                round_money(contractual, scale).to_string(),
            ));
        }
        for (i, warning) in result.warnings.iter().enumerate() {
            metadata.push((format!("warning_{}", i + 1), warning.to_string()));
        }

        let mut running = Decimal::ZERO;
        let rows = result
            .periods
            .iter()
            .map(|p| {
                running += p.period_interest;
                AuditRow {
                    start_date: p.start_date,
                    end_date: p.end_date,
                    days: p.days,
                    rate: p.applicable_rate,
                    rate_basis: p.rate_basis,
                    base_principal: round_money(p.base_principal, scale),
                    period_interest: round_money(p.period_interest, scale),
                    running_total: round_money(running, scale),
                }
            })
            .collect();

        Ok(AuditSheet {
            name: name.to_string(),
            metadata,
            rows,
            total_interest: round_money(result.total_interest, scale),
        })
    }

    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Sheet names follow spreadsheet rules: 1–31 characters, none of `[]:*?/\`.
pub fn validate_sheet_name(name: &str) -> ClaimResult<()> {
    let reason = if name.trim().is_empty() {
        Some("sheet name must not be empty".to_string())
    } else if name.chars().count() > MAX_SHEET_NAME {
        Some(format!("sheet name longer than {MAX_SHEET_NAME} characters"))
    } else if let Some(c) = name.chars().find(|c| FORBIDDEN_SHEET_CHARS.contains(c)) {
        Some(format!("sheet name contains '{c}'"))
    } else {
        None
    };
    match reason {
        Some(reason) => Err(ClaimCalcError::InvalidInput {
            field: "sheet_name".into(),
            reason,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_name_rules() {
        assert!(validate_sheet_name("Loan A").is_ok());
        assert!(validate_sheet_name("").is_err());
        assert!(validate_sheet_name("a/b").is_err());
        assert!(validate_sheet_name(&"x".repeat(32)).is_err());
    }
}
