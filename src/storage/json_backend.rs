use chrono::Utc;
use serde_json::Value;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    config::Config,
    core::{
        errors::LedgerError,
        utils::{ensure_dir, write_atomic, PathResolver},
    },
    domain::{AppData, YearMonth},
};

use super::{migration, LoadReport, Result, StorageBackend};

const BACKUP_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S_%6f";
pub const DEFAULT_RETENTION: usize = 5;

/// Stores the document as one pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    path: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
    legacy_salary_month: YearMonth,
}

impl JsonStorage {
    /// Storage at `path` with backups in a sibling `backups/` directory.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let parent = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            backups_dir: PathResolver::backup_dir_in(&parent),
            path,
            retention: DEFAULT_RETENTION,
            legacy_salary_month: migration::default_legacy_month(),
        }
    }

    /// Storage wired from configuration, rooted at `base` unless the config overrides the file.
    pub fn from_config(config: &Config, base: &Path) -> Result<Self> {
        let path = config
            .data_file
            .clone()
            .unwrap_or_else(|| PathResolver::data_file_in(base));
        Ok(Self::new(path)
            .with_retention(config.backup_retention)
            .with_legacy_salary_month(config.legacy_month()?))
    }

    /// Number of previous documents kept; zero disables backups.
    pub fn with_retention(mut self, retention: usize) -> Self {
        self.retention = retention;
        self
    }

    pub fn with_legacy_salary_month(mut self, month: YearMonth) -> Self {
        self.legacy_salary_month = month;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    /// Backup file names, newest first.
    pub fn list_backups(&self) -> Result<Vec<String>> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let prefix = format!("{}_", self.stem());
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            let file_name = match path.file_name().and_then(|name| name.to_str()) {
                Some(name) if name.starts_with(&prefix) => name.to_string(),
                _ => continue,
            };
            entries.push(file_name);
        }
        // Timestamps are zero-padded, so lexical order is chronological.
        entries.sort_by(|a, b| b.cmp(a));
        Ok(entries)
    }

    pub fn backup_path(&self, backup_name: &str) -> PathBuf {
        self.backups_dir.join(backup_name)
    }

    fn stem(&self) -> String {
        self.path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("data")
            .to_string()
    }

    fn backup_existing_file(&self) -> Result<()> {
        if self.retention == 0 || !self.path.exists() {
            return Ok(());
        }
        ensure_dir(&self.backups_dir)?;
        let backup = self.next_backup_path();
        fs::copy(&self.path, &backup)?;
        self.prune_backups()
    }

    /// Fresh backup path; a counter separates commits sharing a timestamp.
    fn next_backup_path(&self) -> PathBuf {
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let base = format!("{}_{}", self.stem(), timestamp);
        let mut candidate = self.backup_path(&format!("{base}.{BACKUP_EXTENSION}"));
        let mut counter = 1u32;
        while candidate.exists() {
            candidate = self.backup_path(&format!("{base}_{counter}.{BACKUP_EXTENSION}"));
            counter += 1;
        }
        candidate
    }

    fn prune_backups(&self) -> Result<()> {
        let backups = self.list_backups()?;
        for entry in backups.iter().skip(self.retention) {
            let _ = fs::remove_file(self.backup_path(entry));
        }
        Ok(())
    }

    fn read_document(&self) -> Result<LoadReport> {
        let raw = fs::read_to_string(&self.path).map_err(|err| {
            LedgerError::Persistence(format!("cannot read `{}`: {err}", self.path.display()))
        })?;
        let mut document: Value = serde_json::from_str(&raw).map_err(|err| {
            LedgerError::Persistence(format!("corrupt document `{}`: {err}", self.path.display()))
        })?;
        let migrations = migration::migrate_document(&mut document, self.legacy_salary_month)?;
        let data: AppData = serde_json::from_value(document).map_err(|err| {
            LedgerError::Persistence(format!("invalid document `{}`: {err}", self.path.display()))
        })?;
        for note in &migrations {
            tracing::info!(path = %self.path.display(), "migration: {note}");
        }
        let mut report = LoadReport::new(data);
        report.migrations = migrations;
        for warning in &report.warnings {
            tracing::warn!(path = %self.path.display(), "{warning}");
        }
        Ok(report)
    }
}

impl StorageBackend for JsonStorage {
    fn load_snapshot(&self) -> Result<LoadReport> {
        if self.path.exists() {
            return self.read_document();
        }
        tracing::info!(path = %self.path.display(), "no document found, initializing empty ledger");
        let data = AppData::default();
        save_document_to_path(&data, &self.path)?;
        let mut report = LoadReport::new(data);
        report.bootstrapped = true;
        Ok(report)
    }

    fn commit_snapshot(&self, data: &AppData) -> Result<()> {
        self.backup_existing_file()?;
        save_document_to_path(data, &self.path)?;
        tracing::debug!(
            path = %self.path.display(),
            payments = data.payments.len(),
            "document committed"
        );
        Ok(())
    }
}

/// Writes `data` to `path` by staging to a temporary file and renaming it.
pub fn save_document_to_path(data: &AppData, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    write_atomic(path, &json)
}

/// Reads a current-format document without migration or bootstrapping.
pub fn load_document_from_path(path: &Path) -> Result<AppData> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, Payment};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn storage_with_temp_dir() -> (JsonStorage, TempDir) {
        let temp = TempDir::new().expect("temp dir");
        let storage = JsonStorage::new(temp.path().join("data.json")).with_retention(3);
        (storage, temp)
    }

    #[test]
    fn first_load_bootstraps_default_document() {
        let (storage, _guard) = storage_with_temp_dir();
        let report = storage.load_snapshot().expect("bootstrap");
        assert!(report.bootstrapped);
        assert_eq!(report.data, AppData::default());
        let written = fs::read_to_string(storage.path()).unwrap();
        let value: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"monthlySalaries": {}, "payments": [], "categories": []})
        );
    }

    #[test]
    fn commit_and_load_roundtrip() {
        let (storage, _guard) = storage_with_temp_dir();
        let mut data = AppData::default();
        data.categories.push(Category::new("Food"));
        data.payments.push(Payment::recurring(
            "Loan",
            99.5,
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            3,
        ));
        storage.commit_snapshot(&data).expect("commit");
        let report = storage.load_snapshot().expect("load");
        assert!(!report.bootstrapped);
        assert_eq!(report.data, data);
        assert!(report.migrations.is_empty());
    }

    #[test]
    fn commits_keep_bounded_backups() {
        let (storage, _guard) = storage_with_temp_dir();
        storage.load_snapshot().unwrap();
        let mut data = AppData::default();
        for idx in 0..5 {
            data.categories.push(Category::new(format!("c{idx}")));
            storage.commit_snapshot(&data).unwrap();
        }
        let backups = storage.list_backups().unwrap();
        assert_eq!(backups.len(), 3, "backups: {backups:?}");
        assert!(backups.iter().all(|name| name.starts_with("data_")));

        // Newest backup holds the document as it was before the last commit.
        let newest = load_document_from_path(&storage.backup_path(&backups[0])).unwrap();
        assert_eq!(newest.categories.len(), 4);
    }

    #[test]
    fn backups_in_the_same_instant_do_not_overwrite() {
        let (storage, _guard) = storage_with_temp_dir();
        storage.load_snapshot().unwrap();
        let first = storage.next_backup_path();
        fs::create_dir_all(storage.backups_dir()).unwrap();
        fs::write(&first, "{}").unwrap();
        let second = storage.next_backup_path();
        assert_ne!(first, second);
        assert!(!second.exists());
    }

    #[test]
    fn zero_retention_disables_backups() {
        let (storage, _guard) = storage_with_temp_dir();
        let storage = storage.with_retention(0);
        storage.load_snapshot().unwrap();
        storage.commit_snapshot(&AppData::default()).unwrap();
        assert!(storage.list_backups().unwrap().is_empty());
    }
}
