//! CSV workbook holding one sheet per calculation item.
//!
//! The file is in long form: every record carries its sheet name and kind
//! (`meta`, `period`, `total`), so any number of sheets share one header.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::audit::{validate_sheet_name, AuditRow, AuditSheet};
use crate::calculators::RateBasis;
use crate::error::ClaimCalcError;
use crate::ClaimResult;

const HEADER: [&str; 12] = [
    "sheet",
    "record",
    "key",
    "value",
    "start_date",
    "end_date",
    "days",
    "rate",
    "rate_basis",
    "base_principal",
    "period_interest",
    "running_total",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RecordKind {
    Meta,
    Period,
    Total,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkbookRecord {
    sheet: String,
    record: RecordKind,
    key: Option<String>,
    value: Option<String>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    days: Option<i64>,
    #[serde(with = "rust_decimal::serde::str_option")]
    rate: Option<Decimal>,
    rate_basis: Option<RateBasis>,
    #[serde(with = "rust_decimal::serde::str_option")]
    base_principal: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::str_option")]
    period_interest: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::str_option")]
    running_total: Option<Decimal>,
}

impl WorkbookRecord {
    fn blank(sheet: &str, record: RecordKind) -> Self {
        WorkbookRecord {
            sheet: sheet.to_string(),
            record,
            key: None,
            value: None,
            start_date: None,
            end_date: None,
            days: None,
            rate: None,
            rate_basis: None,
            base_principal: None,
            period_interest: None,
            running_total: None,
        }
    }
}

/// Sheets in workbook order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditWorkbook {
    pub sheets: Vec<AuditSheet>,
}

impl AuditWorkbook {
    /// Parse a workbook file back into sheets.
    pub fn read(path: &Path) -> ClaimResult<Self> {
        let mut rdr = csv::Reader::from_path(path)?;
        let headers = rdr.headers()?.clone();
        if headers.iter().ne(HEADER.iter().copied()) {
            return Err(ClaimCalcError::AuditFileConflict {
                path: path.display().to_string(),
                reason: "file is not an audit workbook (header mismatch)".into(),
            });
        }

        let mut sheets: Vec<AuditSheet> = Vec::new();
        for row in rdr.deserialize() {
            let rec: WorkbookRecord = row?;
            let idx = match sheets.iter().position(|s| s.name == rec.sheet) {
                Some(i) => i,
                None => {
                    sheets.push(AuditSheet {
                        name: rec.sheet.clone(),
                        metadata: Vec::new(),
                        rows: Vec::new(),
                        total_interest: Decimal::ZERO,
                    });
                    sheets.len() - 1
                }
            };
            let sheet = &mut sheets[idx];
            match rec.record {
                RecordKind::Meta => sheet.metadata.push((
                    rec.key.unwrap_or_default(),
                    rec.value.unwrap_or_default(),
                )),
                RecordKind::Period => sheet.rows.push(period_row(path, rec)?),
                RecordKind::Total => sheet.total_interest = rec.running_total.unwrap_or_default(),
            }
        }
        Ok(AuditWorkbook { sheets })
    }

    pub fn sheet(&self, name: &str) -> Option<&AuditSheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Write every sheet as CSV records.
    pub fn write_to<W: Write>(&self, writer: W) -> ClaimResult<()> {
        let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
        wtr.write_record(HEADER)?;
        for sheet in &self.sheets {
            for (key, value) in &sheet.metadata {
                let mut rec = WorkbookRecord::blank(&sheet.name, RecordKind::Meta);
                rec.key = Some(key.clone());
                rec.value = Some(value.clone());
                wtr.serialize(rec)?;
            }
            for row in &sheet.rows {
                let mut rec = WorkbookRecord::blank(&sheet.name, RecordKind::Period);
                rec.start_date = Some(row.start_date);
                rec.end_date = Some(row.end_date);
                rec.days = Some(row.days);
                rec.rate = Some(row.rate);
                rec.rate_basis = Some(row.rate_basis);
                rec.base_principal = Some(row.base_principal);
                rec.period_interest = Some(row.period_interest);
                rec.running_total = Some(row.running_total);
                wtr.serialize(rec)?;
            }
            let mut total = WorkbookRecord::blank(&sheet.name, RecordKind::Total);
            total.key = Some("total_interest".into());
            total.running_total = Some(sheet.total_interest);
            wtr.serialize(total)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

fn period_row(path: &Path, rec: WorkbookRecord) -> ClaimResult<AuditRow> {
    let missing = |column: &str| ClaimCalcError::AuditFileConflict {
        path: path.display().to_string(),
        reason: format!("period row in sheet '{}' is missing {column}", rec.sheet),
    };
    Ok(AuditRow {
        start_date: rec.start_date.ok_or_else(|| missing("start_date"))?,
        end_date: rec.end_date.ok_or_else(|| missing("end_date"))?,
        days: rec.days.ok_or_else(|| missing("days"))?,
        rate: rec.rate.ok_or_else(|| missing("rate"))?,
        rate_basis: rec.rate_basis.ok_or_else(|| missing("rate_basis"))?,
        base_principal: rec.base_principal.ok_or_else(|| missing("base_principal"))?,
        period_interest: rec.period_interest.ok_or_else(|| missing("period_interest"))?,
        running_total: rec.running_total.ok_or_else(|| missing("running_total"))?,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpenMode {
    Create,
    Append,
}

/// Owns one workbook build: open, add sheets, write.
///
/// `finish` writes the workbook and reports errors. A builder dropped with
/// unwritten sheets writes them on drop and logs any failure.
#[derive(Debug)]
pub struct AuditWorkbookBuilder {
    path: PathBuf,
    mode: OpenMode,
    workbook: AuditWorkbook,
    dirty: bool,
}

impl AuditWorkbookBuilder {
    /// Start a new workbook. Fails if `path` already exists.
    pub fn create(path: impl Into<PathBuf>) -> ClaimResult<Self> {
        let path = path.into();
        if path.exists() {
            return Err(conflict(&path, "file already exists; set append to add a sheet"));
        }
        Ok(AuditWorkbookBuilder {
            path,
            mode: OpenMode::Create,
            workbook: AuditWorkbook::default(),
            dirty: true,
        })
    }

    /// Reopen an existing workbook to add sheets. Fails if `path` is missing
    /// or is not an audit workbook.
    pub fn open_append(path: impl Into<PathBuf>) -> ClaimResult<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(conflict(&path, "append requested but the file does not exist"));
        }
        let workbook = AuditWorkbook::read(&path)?;
        Ok(AuditWorkbookBuilder {
            path,
            mode: OpenMode::Append,
            workbook,
            dirty: false,
        })
    }

    /// Add a sheet. On an appending builder a sheet of the same name is
    /// replaced; otherwise a name collision is an error.
    pub fn add_sheet(&mut self, sheet: AuditSheet) -> ClaimResult<()> {
        validate_sheet_name(&sheet.name)?;
        match self.workbook.sheets.iter().position(|s| s.name == sheet.name) {
            Some(_) if self.mode == OpenMode::Create => {
                return Err(conflict(
                    &self.path,
                    &format!("sheet '{}' already exists", sheet.name),
                ));
            }
            Some(i) => {
                warn!(path = %self.path.display(), sheet = %sheet.name, "replacing existing sheet");
                self.workbook.sheets[i] = sheet;
            }
            None => self.workbook.sheets.push(sheet),
        }
        self.dirty = true;
        Ok(())
    }

    pub fn sheet_count(&self) -> usize {
        self.workbook.sheets.len()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the workbook and return its final contents. A failed write is
    /// reported here and not retried on drop.
    pub fn finish(mut self) -> ClaimResult<AuditWorkbook> {
        let written = self.flush();
        self.dirty = false;
        written?;
        Ok(std::mem::take(&mut self.workbook))
    }

    fn flush(&mut self) -> ClaimResult<()> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = temp_path(&self.path);
        let written = fs::File::create(&tmp)
            .map_err(ClaimCalcError::from)
            .and_then(|file| self.workbook.write_to(file))
            .and_then(|()| fs::rename(&tmp, &self.path).map_err(ClaimCalcError::from));
        if let Err(e) = written {
            if tmp.exists() {
                let _ = fs::remove_file(&tmp);
            }
            return Err(e);
        }
        self.dirty = false;
        info!(
            path = %self.path.display(),
            sheets = self.workbook.sheets.len(),
            "audit workbook written"
        );
        Ok(())
    }
}

impl Drop for AuditWorkbookBuilder {
    fn drop(&mut self) {
        if self.dirty && !self.workbook.sheets.is_empty() {
            if let Err(e) = self.flush() {
                warn!(path = %self.path.display(), error = %e, "failed to flush audit workbook on drop");
            }
        }
    }
}

/// Write all of a creditor's sheets in one build sequence.
///
/// The resulting workbook holds exactly one sheet per item.
pub fn write_creditor_workbook(path: impl Into<PathBuf>, sheets: Vec<AuditSheet>) -> ClaimResult<AuditWorkbook> {
    let expected = sheets.len();
    for (i, sheet) in sheets.iter().enumerate() {
        validate_sheet_name(&sheet.name)?;
        if sheets[..i].iter().any(|s| s.name == sheet.name) {
            return Err(ClaimCalcError::InvalidInput {
                field: "items".into(),
                reason: format!("sheet name '{}' used by more than one item", sheet.name),
            });
        }
    }
    let mut builder = AuditWorkbookBuilder::create(path)?;
    for sheet in sheets {
        builder.add_sheet(sheet)?;
    }
    let workbook = builder.finish()?;
    if workbook.sheets.len() != expected {
        return Err(ClaimCalcError::InvalidInput {
            field: "items".into(),
            reason: format!(
                "workbook has {} sheets for {expected} calculation items",
                workbook.sheets.len()
            ),
        });
    }
    Ok(workbook)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn conflict(path: &Path, reason: &str) -> ClaimCalcError {
    ClaimCalcError::AuditFileConflict {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}
