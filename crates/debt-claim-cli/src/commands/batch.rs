use clap::Args;
use serde_json::Value;
use std::path::PathBuf;

use debt_claim_core::CreditorBatch;

use crate::input;
use crate::settings::Settings;

/// Arguments for a creditor batch
#[derive(Args)]
pub struct BatchArgs {
    /// Path to JSON creditor batch (reads stdin when omitted)
    #[arg(long)]
    pub input: Option<String>,

    /// Workbook to write; overrides the batch's audit_path
    #[arg(long)]
    pub audit_path: Option<String>,

    /// CSV of additional rate publications (tenor,effective_date,rate)
    #[arg(long)]
    pub rates: Option<String>,
}

pub fn run_batch(args: BatchArgs, settings: &Settings) -> Result<Value, Box<dyn std::error::Error>> {
    let mut batch: CreditorBatch = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("provide a creditor batch with --input or on stdin".into());
    };

    if let Some(path) = args.audit_path {
        batch.audit_path = PathBuf::from(path);
    }
    batch.audit_path = settings.audit_path(&batch.audit_path);

    let engine = settings.engine(args.rates.as_deref())?;
    let output = engine.run_creditor(&batch)?;
    Ok(serde_json::to_value(output)?)
}
