pub mod json_backend;
pub mod memory;
pub mod migration;

use crate::{core::errors::LedgerError, domain::AppData};

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Outcome of loading the document.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub data: AppData,
    pub warnings: Vec<String>,
    pub migrations: Vec<String>,
    /// True when no document existed and the empty default was written.
    pub bootstrapped: bool,
}

impl LoadReport {
    pub fn new(data: AppData) -> Self {
        let warnings = data.warnings();
        Self {
            data,
            warnings,
            migrations: Vec::new(),
            bootstrapped: false,
        }
    }
}

/// Whole-document repository contract.
///
/// `load_snapshot` returns the full current document, bootstrapping an empty
/// one when none exists. `commit_snapshot` replaces the full document; on
/// error nothing may be reported as persisted.
pub trait StorageBackend: Send + Sync {
    fn load_snapshot(&self) -> Result<LoadReport>;
    fn commit_snapshot(&self, data: &AppData) -> Result<()>;
}

pub use json_backend::JsonStorage;
pub use memory::MemoryStorage;
