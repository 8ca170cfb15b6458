//! Layered CLI settings: `config/default.toml`, then `config/{DCC_ENV}.toml`,
//! then `DCC__*` environment variables.

use chrono::NaiveDate;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use debt_claim_core::{ClaimEngine, RateSource, RateTable, StatutoryParams};

use crate::input;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub statutory: StatutoryParams,
    #[serde(default)]
    pub rates: RatesConfig,
    #[serde(default)]
    pub audit: AuditConfig,
}

/// Rate publications merged over the built-in table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RatesConfig {
    /// CSV with `tenor,effective_date,rate` columns.
    pub table_path: Option<String>,
    /// Coverage date of the merged table; defaults to the built-in one.
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditConfig {
    /// Directory relative audit paths are resolved against.
    pub directory: Option<PathBuf>,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("DCC_ENV").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("DCC").separator("__"))
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        debug!(environment = %env, ?settings, "settings loaded");
        Ok(settings)
    }

    /// Build the engine, merging publications from `override_path` or the
    /// configured table path when one is set.
    pub fn engine(&self, override_path: Option<&str>) -> Result<ClaimEngine, Box<dyn std::error::Error>> {
        let builtin = RateTable::builtin();
        let rates = match override_path.or(self.rates.table_path.as_deref()) {
            Some(path) => {
                let file = input::file::open(path)?;
                let as_of = self.rates.as_of.unwrap_or_else(|| builtin.as_of());
                let version = format!("{}+{}", builtin.version(), file_stem(path));
                let merged = builtin.merge_csv_reader(version, as_of, file)?;
                info!(path, version = merged.version(), "merged rate publications");
                merged
            }
            None => builtin,
        };
        Ok(ClaimEngine::new(Arc::new(rates), self.statutory.clone()))
    }

    /// Resolve an audit path against the configured audit directory.
    pub fn audit_path(&self, path: impl AsRef<Path>) -> PathBuf {
        let p = path.as_ref();
        match &self.audit.directory {
            Some(dir) if p.is_relative() => dir.join(p),
            _ => p.to_path_buf(),
        }
    }
}

fn file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "custom".into())
}
