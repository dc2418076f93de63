use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::core::{
    errors::LedgerError,
    utils::{ensure_dir, write_atomic, PathResolver},
};
use crate::domain::YearMonth;
use crate::storage::{json_backend::DEFAULT_RETENTION, migration::DEFAULT_LEGACY_SALARY_MONTH};

const DEFAULT_ADVICE_TIMEOUT_MS: u64 = 15_000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Overrides `<base>/data.json` as the document location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
    /// Month that receives a legacy single-salary value during migration.
    pub legacy_salary_month: String,
    pub backup_retention: usize,
    pub advice_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: None,
            legacy_salary_month: DEFAULT_LEGACY_SALARY_MONTH.into(),
            backup_retention: DEFAULT_RETENTION,
            advice_timeout_ms: DEFAULT_ADVICE_TIMEOUT_MS,
        }
    }
}

impl Config {
    pub fn legacy_month(&self) -> Result<YearMonth, LedgerError> {
        self.legacy_salary_month
            .parse()
            .map_err(|err| LedgerError::Config(format!("legacy_salary_month: {err}")))
    }

    pub fn advice_timeout(&self) -> Duration {
        Duration::from_millis(self.advice_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        self.legacy_month()?;
        if self.backup_retention == 0 {
            return Err(LedgerError::Config(
                "backup_retention must be at least 1".into(),
            ));
        }
        if self.advice_timeout_ms == 0 {
            return Err(LedgerError::Config(
                "advice_timeout_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, LedgerError> {
        Self::with_base_dir(PathResolver::base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, LedgerError> {
        ensure_dir(&base)?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
            base,
        })
    }

    /// Reads the config file, falling back to defaults when it does not exist.
    pub fn load(&self) -> Result<Config, LedgerError> {
        let config = if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            serde_json::from_str(&data).map_err(|err| {
                LedgerError::Config(format!("{}: {err}", self.path.display()))
            })?
        } else {
            Config::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<(), LedgerError> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    /// Document location for `config`.
    pub fn data_path(&self, config: &Config) -> PathBuf {
        config
            .data_file
            .clone()
            .unwrap_or_else(|| PathResolver::data_file_in(&self.base))
    }
}
