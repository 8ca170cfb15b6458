use chrono::NaiveDate;
use clap::Args;
use serde_json::{json, Value};

use debt_claim_core::segmentation::segment_dates;
use debt_claim_core::Tenor;

use crate::settings::Settings;

/// Arguments for a rate lookup
#[derive(Args)]
pub struct RateArgs {
    /// Rate tenor: short (1y) or long (5y)
    #[arg(long)]
    pub tenor: Tenor,

    /// Date the rate should be in force (YYYY-MM-DD)
    #[arg(long)]
    pub date: NaiveDate,

    /// CSV of additional rate publications (tenor,effective_date,rate)
    #[arg(long)]
    pub rates: Option<String>,
}

/// Arguments for window segmentation
#[derive(Args)]
pub struct SegmentArgs {
    /// Rate tenor: short (1y) or long (5y)
    #[arg(long)]
    pub tenor: Tenor,

    /// First day of the window (YYYY-MM-DD)
    #[arg(long)]
    pub start: NaiveDate,

    /// Last day of the window, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub end: NaiveDate,

    /// CSV of additional rate publications (tenor,effective_date,rate)
    #[arg(long)]
    pub rates: Option<String>,
}

pub fn run_rate(args: RateArgs, settings: &Settings) -> Result<Value, Box<dyn std::error::Error>> {
    let engine = settings.engine(args.rates.as_deref())?;
    let rates = engine.rates();
    let rate = rates.lookup(args.tenor, args.date)?;
    Ok(json!({
        "result": {
            "tenor": args.tenor,
            "date": args.date,
            "rate": rate.to_string(),
            "version": rates.version(),
            "as_of": rates.as_of(),
        },
        "warnings": coverage_warning(args.tenor, args.date, rates.as_of()),
    }))
}

pub fn run_segment(args: SegmentArgs, settings: &Settings) -> Result<Value, Box<dyn std::error::Error>> {
    let engine = settings.engine(args.rates.as_deref())?;
    let rates = engine.rates();
    let segments = segment_dates(args.start, args.end, args.tenor, rates)?;
    Ok(json!({
        "result": {
            "tenor": args.tenor,
            "start_date": args.start,
            "end_date": args.end,
            "version": rates.version(),
            "periods": segments,
        },
        "warnings": coverage_warning(args.tenor, args.end, rates.as_of()),
    }))
}

fn coverage_warning(tenor: Tenor, date: NaiveDate, as_of: NaiveDate) -> Vec<String> {
    if date > as_of {
        vec![format!(
            "{tenor} rate table current to {as_of}; last published rate carried to {date}"
        )]
    } else {
        Vec::new()
    }
}
