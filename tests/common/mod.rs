#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex};

use chrono::NaiveDate;
use flux_tracker::{
    core::LedgerStore,
    storage::{JsonStorage, MemoryStorage},
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Fresh directory that outlives the calling test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Store backed by a JSON document in an isolated directory.
pub fn json_store() -> (LedgerStore, JsonStorage) {
    let storage = JsonStorage::new(temp_base().join("data.json")).with_retention(3);
    (LedgerStore::new(Box::new(storage.clone())), storage)
}

pub fn memory_store() -> LedgerStore {
    LedgerStore::new(Box::new(MemoryStorage::new()))
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}
