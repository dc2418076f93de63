use std::sync::Mutex;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::advice::AdvisoryInput;
use crate::core::errors::{LedgerError, Result};
use crate::core::services::{CategoryService, PaymentService, SalaryService, SummaryService};
use crate::domain::{AppData, Category, PaymentDraft, PaymentPatch, YearMonth};
use crate::ledger::{DisplayPayment, MonthOverview, MonthSummary};
use crate::storage::{LoadReport, StorageBackend};

/// Facade that runs every operation as a full load/mutate/commit cycle.
///
/// Mutations on one store are serialized. Separate stores (or processes)
/// sharing a document are last-write-wins.
pub struct LedgerStore {
    storage: Box<dyn StorageBackend>,
    write_lock: Mutex<()>,
}

impl LedgerStore {
    pub fn new(storage: Box<dyn StorageBackend>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    /// Loads the document with migration notes and warnings.
    pub fn load(&self) -> Result<LoadReport> {
        self.storage.load_snapshot()
    }

    pub fn snapshot(&self) -> Result<AppData> {
        Ok(self.load()?.data)
    }

    /// Loads, applies `mutation`, and commits only if the mutation succeeded.
    fn mutate<T, F>(&self, operation: &str, mutation: F) -> Result<T>
    where
        F: FnOnce(&mut AppData) -> Result<T>,
    {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| LedgerError::Persistence("ledger store lock poisoned".into()))?;
        let mut data = self.snapshot()?;
        let value = mutation(&mut data)?;
        self.storage.commit_snapshot(&data).map_err(|err| {
            tracing::error!(operation, error = %err, "commit failed");
            err
        })?;
        tracing::debug!(operation, "committed");
        Ok(value)
    }

    // Salaries

    pub fn set_salary(&self, month: YearMonth, amount: f64) -> Result<()> {
        self.mutate("set_salary", |data| SalaryService::set(data, month, amount))
    }

    pub fn salary_for_month(&self, month: YearMonth) -> Result<f64> {
        Ok(SalaryService::get(&self.snapshot()?, month))
    }

    // Payments

    pub fn add_payment(&self, draft: PaymentDraft) -> Result<Uuid> {
        self.mutate("add_payment", |data| PaymentService::add(data, draft))
    }

    pub fn update_payment(&self, id: Uuid, patch: &PaymentPatch) -> Result<()> {
        self.mutate("update_payment", |data| {
            PaymentService::update(data, id, patch)
        })
    }

    /// Removes a payment; returns whether it existed.
    pub fn delete_payment(&self, id: Uuid) -> Result<bool> {
        self.mutate("delete_payment", |data| Ok(PaymentService::remove(data, id)))
    }

    pub fn toggle_paid(
        &self,
        id: Uuid,
        paid: bool,
        instance_date: Option<NaiveDate>,
    ) -> Result<()> {
        self.mutate("toggle_paid", |data| {
            PaymentService::toggle_paid(data, id, paid, instance_date)
        })
    }

    // Categories

    pub fn categories(&self) -> Result<Vec<Category>> {
        Ok(self.snapshot()?.categories)
    }

    pub fn add_category(&self, name: &str) -> Result<Uuid> {
        self.mutate("add_category", |data| CategoryService::add(data, name))
    }

    pub fn update_category(&self, id: Uuid, new_name: &str) -> Result<()> {
        self.mutate("update_category", |data| {
            CategoryService::rename(data, id, new_name)
        })
    }

    /// Removes a category; returns how many payments lost their reference.
    pub fn delete_category(&self, id: Uuid) -> Result<usize> {
        self.mutate("delete_category", |data| {
            Ok(CategoryService::remove(data, id))
        })
    }

    // Queries

    pub fn display_payments_for_month(&self, month: YearMonth) -> Result<Vec<DisplayPayment>> {
        Ok(SummaryService::display_for_month(&self.snapshot()?, month))
    }

    pub fn month_summary(&self, month: YearMonth) -> Result<MonthSummary> {
        Ok(SummaryService::month_summary(&self.snapshot()?, month))
    }

    pub fn timeline(
        &self,
        center: YearMonth,
        before: u32,
        after: u32,
    ) -> Result<Vec<MonthOverview>> {
        Ok(SummaryService::timeline(&self.snapshot()?, center, before, after))
    }

    pub fn advisory_input(&self, month: YearMonth) -> Result<AdvisoryInput> {
        Ok(SummaryService::advisory_input(&self.snapshot()?, month))
    }
}
