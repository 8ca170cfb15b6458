//! Entry points: validate a request, run the offset walk, aggregate, and
//! optionally render the audit trail.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::aggregate::{CalculationResult, Closing, ResultAggregator};
use crate::audit::{write_creditor_workbook, AuditMetadata, AuditSheet, AuditWorkbookBuilder};
use crate::calculators::CalcContext;
use crate::payments::{run_offsets, Outstanding};
use crate::rate_table::{RateSource, RateTable};
use crate::request::CalculationRequest;
use crate::types::{with_metadata, CalculationWarning, ComputationOutput, Money, StatutoryParams};
use crate::ClaimResult;

/// One named calculation within a creditor batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationItem {
    pub sheet_name: String,
    pub request: CalculationRequest,
}

/// Every calculation item for one creditor, written to one workbook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditorBatch {
    pub creditor: String,
    pub audit_path: PathBuf,
    pub items: Vec<CalculationItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSummary {
    pub sheet_name: String,
    pub total_interest: Money,
    pub principal_used: Money,
    pub capped: bool,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditorReport {
    pub creditor: String,
    pub audit_path: PathBuf,
    pub sheet_count: usize,
    pub total_interest: Money,
    pub items: Vec<ItemSummary>,
}

/// Calculation engine bound to a rate source and statutory parameters.
#[derive(Clone)]
pub struct ClaimEngine {
    rates: Arc<dyn RateSource>,
    statutory: StatutoryParams,
}

impl ClaimEngine {
    pub fn new(rates: Arc<dyn RateSource>, statutory: StatutoryParams) -> Self {
        ClaimEngine { rates, statutory }
    }

    /// Engine over the built-in rate table and default statutory values.
    pub fn with_builtin_rates() -> Self {
        ClaimEngine::new(Arc::new(RateTable::builtin()), StatutoryParams::default())
    }

    pub fn rates(&self) -> &dyn RateSource {
        self.rates.as_ref()
    }

    pub fn statutory(&self) -> &StatutoryParams {
        &self.statutory
    }

    /// Compute interest for `request`. Performs no I/O.
    pub fn calculate(&self, request: &CalculationRequest) -> ClaimResult<CalculationResult> {
        let window = request.validate()?;
        let ctx = CalcContext {
            rates: self.rates.as_ref(),
            statutory: &self.statutory,
        };

        let mut agg = ResultAggregator::new(request.mode.kind());
        for tenor in request.mode.tenors() {
            let as_of = self.rates.as_of();
            if window.end() > as_of {
                warn!(%tenor, %as_of, end = %window.end(), "window extends past rate table coverage");
                agg.warn(CalculationWarning::RateCoverageExtrapolated {
                    tenor,
                    as_of,
                    end_date: window.end(),
                });
            }
        }

        let opening = Outstanding {
            costs: request.outstanding_costs,
            interest: Money::ZERO,
            principal: request.principal,
        };
        let closing = run_offsets(&request.mode, window, opening, &request.payments, ctx, &mut agg)?;

        let result = agg.finish(Closing {
            start_date: window.start(),
            end_date: window.end(),
            initial_principal: request.principal,
            principal_used: closing.principal,
            outstanding_interest: closing.interest,
            outstanding_costs: closing.costs,
            rate_table_version: self.rates.version().to_string(),
        });
        info!(
            mode = %result.mode,
            %window,
            total_interest = %result.total_interest,
            periods = result.periods.len(),
            capped = result.capped,
            "calculation complete"
        );
        Ok(result)
    }

    /// Calculate, write the audit sheet if the request names a target, and
    /// wrap the result in the standard output envelope.
    pub fn run(&self, request: &CalculationRequest) -> ClaimResult<ComputationOutput<CalculationResult>> {
        let start = Instant::now();
        let result = self.calculate(request)?;

        if let Some(target) = &request.audit {
            let meta = AuditMetadata::for_request(request, Utc::now());
            let sheet = AuditSheet::from_result(&target.sheet_name, &result, &meta, self.statutory.currency_scale)?;
            let mut builder = if target.append {
                AuditWorkbookBuilder::open_append(&target.path)?
            } else {
                AuditWorkbookBuilder::create(&target.path)?
            };
            builder.add_sheet(sheet)?;
            builder.finish()?;
        }

        let warnings = result.warnings.iter().map(|w| w.to_string()).collect();
        let elapsed = start.elapsed().as_micros() as u64;
        Ok(with_metadata(
            request.mode.methodology(),
            &serde_json::json!({
                "mode": request.mode,
                "principal": request.principal.to_string(),
                "start_date": request.start_date,
                "end_date": request.end_date,
                "payments": request.payments.len(),
                "statutory": self.statutory,
            }),
            warnings,
            elapsed,
            self.rates.version(),
            result,
        ))
    }

    /// Run every item for a creditor, then write one workbook with one sheet
    /// per item. Nothing is written unless every item calculates.
    pub fn run_creditor(&self, batch: &CreditorBatch) -> ClaimResult<ComputationOutput<CreditorReport>> {
        let start = Instant::now();
        let generated_at = Utc::now();

        let mut sheets = Vec::with_capacity(batch.items.len());
        let mut items = Vec::with_capacity(batch.items.len());
        let mut total_interest = Money::ZERO;
        for item in &batch.items {
            let result = self.calculate(&item.request)?;
            let mut meta = AuditMetadata::for_request(&item.request, generated_at);
            if meta.debtor_label.is_none() {
                meta.debtor_label = Some(batch.creditor.clone());
            }
            sheets.push(AuditSheet::from_result(
                &item.sheet_name,
                &result,
                &meta,
                self.statutory.currency_scale,
            )?);
            total_interest += result.total_interest;
            items.push(ItemSummary {
                sheet_name: item.sheet_name.clone(),
                total_interest: result.total_interest,
                principal_used: result.principal_used,
                capped: result.capped,
                warnings: result.warnings.iter().map(|w| w.to_string()).collect(),
            });
        }

        let workbook = write_creditor_workbook(&batch.audit_path, sheets)?;
        let warnings: Vec<String> = items
            .iter()
            .flat_map(|i| i.warnings.iter().map(move |w| format!("{}: {w}", i.sheet_name)))
            .collect();
        let report = CreditorReport {
            creditor: batch.creditor.clone(),
            audit_path: batch.audit_path.clone(),
            sheet_count: workbook.sheets.len(),
            total_interest,
            items,
        };

        let elapsed = start.elapsed().as_micros() as u64;
        Ok(with_metadata(
            "Creditor-level consolidation of calculation items",
            &serde_json::json!({
                "creditor": batch.creditor,
                "items": batch.items.len(),
                "audit_path": batch.audit_path,
            }),
            warnings,
            elapsed,
            self.rates.version(),
            report,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::CalculationMode;
    use crate::day_count::DayCountBasis;
    use crate::rate_table::Tenor;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn floating(end: NaiveDate) -> CalculationRequest {
        CalculationRequest {
            mode: CalculationMode::Floating {
                tenor: Some(Tenor::Short),
                multiplier: dec!(1),
                day_count_basis: DayCountBasis::ACT_365,
            },
            principal: dec!(50000),
            start_date: d(2024, 1, 1),
            end_date: end,
            payments: vec![],
            outstanding_costs: dec!(0),
            audit: None,
            debtor_label: None,
        }
    }

    #[test]
    fn test_extrapolation_warning() {
        let engine = ClaimEngine::with_builtin_rates();
        let result = engine.calculate(&floating(d(2025, 12, 31))).unwrap();
        assert!(result
            .warnings
            .iter()
            .any(|w| matches!(w, CalculationWarning::RateCoverageExtrapolated { .. })));

        let result = engine.calculate(&floating(d(2024, 12, 31))).unwrap();
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_run_envelope() {
        let engine = ClaimEngine::with_builtin_rates();
        let out = engine.run(&floating(d(2024, 6, 30))).unwrap();
        assert_eq!(out.metadata.rate_table_version, "lpr-2025-05");
        assert_eq!(out.methodology, "Floating-rate interest segmented at benchmark changes");
        assert!(out.result.total_interest > dec!(0));
    }
}
