use crate::core::errors::LedgerError;
use crate::domain::{AppData, YearMonth};

use super::ServiceResult;

pub struct SalaryService;

impl SalaryService {
    /// Records the salary for `month`, replacing any previous value.
    pub fn set(data: &mut AppData, month: YearMonth, amount: f64) -> ServiceResult<()> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(LedgerError::Validation(format!(
                "salary must be zero or positive, got {amount}"
            )));
        }
        data.monthly_salaries.insert(month, amount);
        Ok(())
    }

    pub fn get(data: &AppData, month: YearMonth) -> f64 {
        data.salary_for(month)
    }
}
