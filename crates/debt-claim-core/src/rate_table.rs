//! Historical floating benchmark rates.
//!
//! Rates are published per tenor on effective dates; a rate stays in force
//! until the next publication that changes it. Lookups never guess: a date
//! before the first publication of a tenor is an error.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;

use crate::error::ClaimCalcError;
use crate::types::Rate;
use crate::ClaimResult;

/// Reference-rate maturity bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tenor {
    /// One-year benchmark.
    Short,
    /// Five-year-and-above benchmark.
    Long,
}

impl std::fmt::Display for Tenor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tenor::Short => write!(f, "short"),
            Tenor::Long => write!(f, "long"),
        }
    }
}

impl std::str::FromStr for Tenor {
    type Err = ClaimCalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" | "1y" => Ok(Tenor::Short),
            "long" | "5y" => Ok(Tenor::Long),
            other => Err(ClaimCalcError::InvalidInput {
                field: "tenor".into(),
                reason: format!("unknown tenor '{other}' (expected short or long)"),
            }),
        }
    }
}

/// One rate publication for a tenor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTableEntry {
    pub tenor: Tenor,
    pub effective_date: NaiveDate,
    #[serde(with = "rust_decimal::serde::str")]
    pub rate: Rate,
}

/// Read-only source of benchmark rates.
pub trait RateSource: Send + Sync {
    /// Rate in force for `tenor` on `date`.
    fn lookup(&self, tenor: Tenor, date: NaiveDate) -> ClaimResult<Rate>;

    /// Dates in `(after, through]` on which the rate for `tenor` changes,
    /// ascending.
    fn change_dates(&self, tenor: Tenor, after: NaiveDate, through: NaiveDate) -> Vec<NaiveDate>;

    fn version(&self) -> &str;

    /// Last date the published data reflects.
    fn as_of(&self) -> NaiveDate;
}

/// In-memory rate table keyed by tenor, then effective date.
#[derive(Debug, Clone)]
pub struct RateTable {
    version: String,
    as_of: NaiveDate,
    series: BTreeMap<Tenor, BTreeMap<NaiveDate, Rate>>,
}

impl RateTable {
    /// Build a table from publication entries.
    pub fn from_entries(
        version: impl Into<String>,
        as_of: NaiveDate,
        entries: impl IntoIterator<Item = RateTableEntry>,
    ) -> ClaimResult<Self> {
        let mut table = RateTable {
            version: version.into(),
            as_of,
            series: BTreeMap::new(),
        };
        table.insert_all(entries)?;
        Ok(table)
    }

    /// A new table with additional publications appended. The receiver is
    /// left untouched.
    pub fn with_publications(
        &self,
        version: impl Into<String>,
        as_of: NaiveDate,
        entries: impl IntoIterator<Item = RateTableEntry>,
    ) -> ClaimResult<Self> {
        let mut table = self.clone();
        table.version = version.into();
        table.as_of = as_of.max(self.as_of);
        table.insert_all(entries)?;
        Ok(table)
    }

    /// Load publications from CSV with `tenor,effective_date,rate` columns.
    pub fn from_csv_reader<R: Read>(
        version: impl Into<String>,
        as_of: NaiveDate,
        reader: R,
    ) -> ClaimResult<Self> {
        let entries = read_csv_entries(reader)?;
        Self::from_entries(version, as_of, entries)
    }

    /// Merge publications read from CSV over this table.
    pub fn merge_csv_reader<R: Read>(
        &self,
        version: impl Into<String>,
        as_of: NaiveDate,
        reader: R,
    ) -> ClaimResult<Self> {
        let entries = read_csv_entries(reader)?;
        self.with_publications(version, as_of, entries)
    }

    /// Built-in loan prime rate history (one-year and five-year+), listing
    /// only the publication dates on which a tenor's rate changed.
    pub fn builtin() -> Self {
        let mut series = BTreeMap::new();
        series.insert(Tenor::Short, to_series(SHORT_SEED));
        series.insert(Tenor::Long, to_series(LONG_SEED));
        RateTable {
            version: BUILTIN_VERSION.to_string(),
            as_of: NaiveDate::from_ymd_opt(BUILTIN_AS_OF.0, BUILTIN_AS_OF.1, BUILTIN_AS_OF.2)
                .unwrap_or(NaiveDate::MIN),
            series,
        }
    }

    fn insert_all(&mut self, entries: impl IntoIterator<Item = RateTableEntry>) -> ClaimResult<()> {
        for entry in entries {
            if entry.rate < Decimal::ZERO {
                return Err(ClaimCalcError::InvalidInput {
                    field: "rate".into(),
                    reason: format!(
                        "{} rate effective {} is negative",
                        entry.tenor, entry.effective_date
                    ),
                });
            }
            let series = self.series.entry(entry.tenor).or_default();
            if series.insert(entry.effective_date, entry.rate).is_some() {
                return Err(ClaimCalcError::InvalidInput {
                    field: "effective_date".into(),
                    reason: format!(
                        "duplicate {} publication for {}",
                        entry.tenor, entry.effective_date
                    ),
                });
            }
        }
        Ok(())
    }
}

impl RateSource for RateTable {
    fn lookup(&self, tenor: Tenor, date: NaiveDate) -> ClaimResult<Rate> {
        self.series
            .get(&tenor)
            .and_then(|s| s.range(..=date).next_back())
            .map(|(_, rate)| *rate)
            .ok_or(ClaimCalcError::RateDataMissing { tenor, date })
    }

    fn change_dates(&self, tenor: Tenor, after: NaiveDate, through: NaiveDate) -> Vec<NaiveDate> {
        if through <= after {
            return Vec::new();
        }
        let Some(s) = self.series.get(&tenor) else {
            return Vec::new();
        };
        // A publication repeating the rate in force is not a change.
        let mut current = s.range(..=after).next_back().map(|(_, r)| *r);
        let mut dates = Vec::new();
        for (date, rate) in s.range(after..=through) {
            if *date > after && current != Some(*rate) {
                dates.push(*date);
            }
            current = Some(*rate);
        }
        dates
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn as_of(&self) -> NaiveDate {
        self.as_of
    }
}

fn read_csv_entries<R: Read>(reader: R) -> ClaimResult<Vec<RateTableEntry>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut entries = Vec::new();
    for record in rdr.deserialize() {
        let entry: RateTableEntry = record?;
        entries.push(entry);
    }
    Ok(entries)
}

fn to_series(seed: &[(i32, u32, u32, Decimal)]) -> BTreeMap<NaiveDate, Rate> {
    seed.iter()
        .filter_map(|(y, m, d, r)| NaiveDate::from_ymd_opt(*y, *m, *d).map(|date| (date, *r)))
        .collect()
}

const BUILTIN_VERSION: &str = "lpr-2025-05";

const BUILTIN_AS_OF: (i32, u32, u32) = (2025, 5, 20);

// One-year loan prime rate
const SHORT_SEED: &[(i32, u32, u32, Decimal)] = &[
    (2019, 8, 20, dec!(0.0425)),
    (2019, 9, 20, dec!(0.0420)),
    (2019, 11, 20, dec!(0.0415)),
    (2020, 2, 20, dec!(0.0405)),
    (2020, 4, 20, dec!(0.0385)),
    (2021, 12, 20, dec!(0.0380)),
    (2022, 1, 20, dec!(0.0370)),
    (2022, 8, 22, dec!(0.0365)),
    (2023, 6, 20, dec!(0.0355)),
    (2023, 8, 21, dec!(0.0345)),
    (2024, 7, 22, dec!(0.0335)),
    (2024, 10, 21, dec!(0.0310)),
    (2025, 5, 20, dec!(0.0300)),
];

// Five-year-and-above loan prime rate
const LONG_SEED: &[(i32, u32, u32, Decimal)] = &[
    (2019, 8, 20, dec!(0.0485)),
    (2019, 11, 20, dec!(0.0480)),
    (2020, 2, 20, dec!(0.0475)),
    (2020, 4, 20, dec!(0.0465)),
    (2022, 1, 20, dec!(0.0460)),
    (2022, 5, 20, dec!(0.0445)),
    (2022, 8, 22, dec!(0.0430)),
    (2023, 6, 20, dec!(0.0420)),
    (2024, 2, 20, dec!(0.0395)),
    (2024, 7, 22, dec!(0.0385)),
    (2024, 10, 21, dec!(0.0360)),
    (2025, 5, 20, dec!(0.0350)),
];
