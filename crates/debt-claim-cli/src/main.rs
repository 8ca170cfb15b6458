mod commands;
mod input;
mod output;
mod settings;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::audit::AuditShowArgs;
use commands::batch::BatchArgs;
use commands::calculate::CalculateArgs;
use commands::rates::{RateArgs, SegmentArgs};
use settings::Settings;

/// Interest and penalty calculations for debt claims
#[derive(Parser)]
#[command(
    name = "dcc",
    version,
    about = "Interest and penalty calculations for debt claims",
    long_about = "Computes interest on debt claims with decimal precision: fixed and \
                  floating simple interest against loan prime rates, interest on delayed \
                  performance, compound interest per settlement cycle and penalty interest \
                  under the statutory ceiling. Writes a per-period audit workbook."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate interest for one request
    Calculate(CalculateArgs),
    /// Calculate every item for a creditor into one audit workbook
    Batch(BatchArgs),
    /// Look up the benchmark rate in force on a date
    Rate(RateArgs),
    /// Split a window at benchmark rate changes
    Segment(SegmentArgs),
    /// Summarise an audit workbook or print one sheet
    AuditShow(AuditShowArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_env("DCC_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);
    if log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let settings = match Settings::load() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}: invalid configuration: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Calculate(args) => commands::calculate::run_calculate(args, &settings),
        Commands::Batch(args) => commands::batch::run_batch(args, &settings),
        Commands::Rate(args) => commands::rates::run_rate(args, &settings),
        Commands::Segment(args) => commands::rates::run_segment(args, &settings),
        Commands::AuditShow(args) => commands::audit::run_audit_show(args, &settings),
        Commands::Version => {
            println!("dcc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
