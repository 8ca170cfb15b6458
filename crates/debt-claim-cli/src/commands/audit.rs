use clap::Args;
use serde_json::{json, Value};

use debt_claim_core::audit::AuditWorkbook;

use crate::settings::Settings;

/// Arguments for inspecting an audit workbook
#[derive(Args)]
pub struct AuditShowArgs {
    /// Path to the audit workbook
    #[arg(long)]
    pub path: String,

    /// Show only this sheet
    #[arg(long)]
    pub sheet: Option<String>,
}

pub fn run_audit_show(args: AuditShowArgs, settings: &Settings) -> Result<Value, Box<dyn std::error::Error>> {
    let path = settings.audit_path(&args.path);
    let workbook = AuditWorkbook::read(&path)?;

    match args.sheet {
        Some(name) => {
            let sheet = workbook
                .sheet(&name)
                .ok_or_else(|| format!("no sheet named '{}' in {}", name, path.display()))?;
            let metadata: serde_json::Map<String, Value> = sheet
                .metadata
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            Ok(json!({
                "result": {
                    "sheet": sheet.name,
                    "total_interest": sheet.total_interest.to_string(),
                    "metadata": metadata,
                    "rows": sheet.rows,
                }
            }))
        }
        None => {
            let items: Vec<Value> = workbook
                .sheets
                .iter()
                .map(|s| {
                    json!({
                        "sheet": s.name,
                        "mode": s.meta("mode").unwrap_or_default(),
                        "debtor": s.meta("debtor").unwrap_or_default(),
                        "periods": s.rows.len(),
                        "total_interest": s.total_interest.to_string(),
                    })
                })
                .collect();
            Ok(json!({
                "result": {
                    "path": path.display().to_string(),
                    "sheet_count": workbook.sheets.len(),
                    "items": items,
                }
            }))
        }
    }
}
