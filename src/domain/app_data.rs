use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    category::Category,
    common::{find_by_id, find_by_id_mut},
    month::YearMonth,
    payment::Payment,
};

/// The persisted document: the single unit of read and write.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AppData {
    pub monthly_salaries: BTreeMap<YearMonth, f64>,
    pub payments: Vec<Payment>,
    pub categories: Vec<Category>,
}

impl AppData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Salary recorded for `month`; absent months count as zero.
    pub fn salary_for(&self, month: YearMonth) -> f64 {
        self.monthly_salaries.get(&month).copied().unwrap_or(0.0)
    }

    pub fn payment(&self, id: Uuid) -> Option<&Payment> {
        find_by_id(&self.payments, id)
    }

    pub fn payment_mut(&mut self, id: Uuid) -> Option<&mut Payment> {
        find_by_id_mut(&mut self.payments, id)
    }

    pub fn category(&self, id: Uuid) -> Option<&Category> {
        find_by_id(&self.categories, id)
    }

    pub fn category_mut(&mut self, id: Uuid) -> Option<&mut Category> {
        find_by_id_mut(&mut self.categories, id)
    }

    /// Detects dangling references and malformed records within a snapshot.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        for payment in &self.payments {
            if let Some(category) = payment.category_id {
                if self.category(category).is_none() {
                    warnings.push(format!(
                        "payment {} references missing category {}",
                        payment.id, category
                    ));
                }
            }
            if payment.is_recurring && payment.recurrence.is_none() {
                warnings.push(format!(
                    "payment {} is recurring but has no recurrence rule",
                    payment.id
                ));
            }
            if let Some(rule) = payment.recurrence.as_ref() {
                if payment.is_recurring && rule.installments == 0 {
                    warnings.push(format!("payment {} has zero installments", payment.id));
                }
            }
        }
        warnings
    }
}
