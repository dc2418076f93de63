use std::sync::Mutex;

use crate::{core::errors::LedgerError, domain::AppData};

use super::{LoadReport, Result, StorageBackend};

/// Keeps the document in process memory; isolated per instance.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    document: Mutex<Option<AppData>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that already holds `data`.
    pub fn with_data(data: AppData) -> Self {
        Self {
            document: Mutex::new(Some(data)),
        }
    }

    /// Current stored document, if one was ever written.
    pub fn stored(&self) -> Result<Option<AppData>> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<AppData>>> {
        self.document
            .lock()
            .map_err(|_| LedgerError::Persistence("memory storage lock poisoned".into()))
    }
}

impl StorageBackend for MemoryStorage {
    fn load_snapshot(&self) -> Result<LoadReport> {
        let mut guard = self.lock()?;
        match guard.as_ref() {
            Some(data) => Ok(LoadReport::new(data.clone())),
            None => {
                let data = AppData::default();
                *guard = Some(data.clone());
                let mut report = LoadReport::new(data);
                report.bootstrapped = true;
                Ok(report)
            }
        }
    }

    fn commit_snapshot(&self, data: &AppData) -> Result<()> {
        *self.lock()? = Some(data.clone());
        Ok(())
    }
}
