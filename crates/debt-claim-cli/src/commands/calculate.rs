use clap::Args;
use serde_json::Value;
use tracing::debug;

use debt_claim_core::{AuditTarget, CalculationRequest};

use crate::input;
use crate::settings::Settings;

/// Arguments for a single interest calculation
#[derive(Args)]
pub struct CalculateArgs {
    /// Path to JSON request file (reads stdin when omitted)
    #[arg(long)]
    pub input: Option<String>,

    /// Write an audit sheet to this workbook
    #[arg(long)]
    pub audit_path: Option<String>,

    /// Sheet name for the audit output
    #[arg(long, requires = "audit_path")]
    pub sheet: Option<String>,

    /// Add the sheet to an existing workbook instead of creating one
    #[arg(long, requires = "audit_path")]
    pub append: bool,

    /// Debtor label for the audit header
    #[arg(long)]
    pub debtor: Option<String>,

    /// CSV of additional rate publications (tenor,effective_date,rate)
    #[arg(long)]
    pub rates: Option<String>,
}

pub fn run_calculate(args: CalculateArgs, settings: &Settings) -> Result<Value, Box<dyn std::error::Error>> {
    let mut request: CalculationRequest = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("provide a request with --input or on stdin".into());
    };

    if let Some(debtor) = args.debtor {
        request.debtor_label = Some(debtor);
    }
    if let Some(ref path) = args.audit_path {
        request.audit = Some(AuditTarget {
            path: settings.audit_path(path),
            sheet_name: args.sheet.unwrap_or_else(|| "Interest".into()),
            append: args.append,
        });
    } else if let Some(target) = request.audit.as_mut() {
        target.path = settings.audit_path(&target.path);
    }

    let engine = settings.engine(args.rates.as_deref())?;
    debug!(mode = %request.mode.kind(), "running calculation");
    let output = engine.run(&request)?;
    Ok(serde_json::to_value(output)?)
}
