pub mod aggregate;
pub mod audit;
pub mod calculators;
pub mod cap;
pub mod day_count;
pub mod engine;
pub mod error;
pub mod payments;
pub mod rate_table;
pub mod request;
pub mod segmentation;
pub mod types;

pub use aggregate::CalculationResult;
pub use calculators::{CalculationMode, CompoundingCycle, ModeKind, Period, RateSpec};
pub use day_count::{DateWindow, DayCountBasis};
pub use engine::{CalculationItem, ClaimEngine, CreditorBatch, CreditorReport};
pub use error::ClaimCalcError;
pub use payments::{PaymentAllocation, PaymentEvent};
pub use rate_table::{RateSource, RateTable, RateTableEntry, Tenor};
pub use request::{AuditTarget, CalculationRequest};
pub use types::*;

/// Standard result type for all debt-claim operations
pub type ClaimResult<T> = Result<T, ClaimCalcError>;
