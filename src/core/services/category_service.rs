use uuid::Uuid;

use crate::core::errors::LedgerError;
use crate::domain::{category::Category, AppData};
use crate::ledger::CategoryResolver;

use super::ServiceResult;

pub struct CategoryService;

impl CategoryService {
    pub fn add(data: &mut AppData, name: &str) -> ServiceResult<Uuid> {
        let name = Self::validate_name(data, None, name)?;
        let category = Category::new(name);
        let id = category.id;
        data.categories.push(category);
        Ok(id)
    }

    pub fn rename(data: &mut AppData, id: Uuid, new_name: &str) -> ServiceResult<()> {
        if data.category(id).is_none() {
            return Err(LedgerError::CategoryNotFound(id));
        }
        let name = Self::validate_name(data, Some(id), new_name)?;
        let category = data
            .category_mut(id)
            .ok_or(LedgerError::CategoryNotFound(id))?;
        category.name = name;
        Ok(())
    }

    /// Removes the category and clears it from referencing payments.
    ///
    /// Returns how many payments were detached. Unknown ids are a no-op.
    pub fn remove(data: &mut AppData, id: Uuid) -> usize {
        data.categories.retain(|category| category.id != id);
        let mut detached = 0;
        for payment in data
            .payments
            .iter_mut()
            .filter(|payment| payment.category_id == Some(id))
        {
            payment.category_id = None;
            detached += 1;
        }
        detached
    }

    fn validate_name(
        data: &AppData,
        exclude: Option<Uuid>,
        candidate: &str,
    ) -> ServiceResult<String> {
        let trimmed = candidate.trim();
        if trimmed.is_empty() {
            return Err(LedgerError::Validation("category name is required".into()));
        }
        CategoryResolver::new(&data.categories).ensure_unique(trimmed, exclude)?;
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Payment;
    use chrono::NaiveDate;

    #[test]
    fn add_rejects_case_insensitive_duplicates() {
        let mut data = AppData::new();
        CategoryService::add(&mut data, "Food").unwrap();
        let err = CategoryService::add(&mut data, "food").expect_err("duplicate must fail");
        assert!(matches!(err, LedgerError::Conflict(_)), "unexpected error: {err:?}");
        assert_eq!(data.categories.len(), 1);
    }

    #[test]
    fn rename_to_own_name_in_other_case_succeeds() {
        let mut data = AppData::new();
        let id = CategoryService::add(&mut data, "Food").unwrap();
        CategoryService::rename(&mut data, id, "food").unwrap();
        assert_eq!(data.category(id).unwrap().name, "food");
    }

    #[test]
    fn rename_unknown_category_fails() {
        let mut data = AppData::new();
        let err = CategoryService::rename(&mut data, Uuid::new_v4(), "Food").unwrap_err();
        assert!(matches!(err, LedgerError::CategoryNotFound(_)));
    }

    #[test]
    fn remove_detaches_only_referencing_payments() {
        let mut data = AppData::new();
        let food = CategoryService::add(&mut data, "Food").unwrap();
        let rent = CategoryService::add(&mut data, "Rent").unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        for (name, category) in [("a", food), ("b", rent), ("c", food)] {
            let mut payment = Payment::one_time(name, 10.0, day);
            payment.category_id = Some(category);
            data.payments.push(payment);
        }

        assert_eq!(CategoryService::remove(&mut data, food), 2);
        assert!(data.category(food).is_none());
        assert_eq!(data.payments[1].category_id, Some(rent));
        assert_eq!(CategoryService::remove(&mut data, food), 0);
    }
}
