use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::rate_table::Tenor;

#[derive(Debug, Error)]
pub enum ClaimCalcError {
    #[error("Invalid date range: end {end} precedes start {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Rate data missing: no {tenor} rate published on or before {date}")]
    RateDataMissing { tenor: Tenor, date: NaiveDate },

    #[error("Term not specified: {mode} requires an explicit rate tenor")]
    TermNotSpecified { mode: String },

    #[error("Missing cycle parameter: compound interest requires an explicit compounding cycle")]
    MissingCycleParameter,

    #[error("Negative principal: {0}")]
    NegativePrincipal(Decimal),

    #[error("Negative amount: {field} = {amount}")]
    NegativeAmount { field: String, amount: Decimal },

    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Audit file conflict at '{path}': {reason}")]
    AuditFileConflict { path: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for ClaimCalcError {
    fn from(e: serde_json::Error) -> Self {
        ClaimCalcError::SerializationError(e.to_string())
    }
}
