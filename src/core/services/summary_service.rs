use crate::advice::AdvisoryInput;
use crate::domain::{AppData, YearMonth};
use crate::ledger::{month_view, DisplayPayment, MonthOverview, MonthSummary};

pub struct SummaryService;

impl SummaryService {
    pub fn display_for_month(data: &AppData, month: YearMonth) -> Vec<DisplayPayment> {
        month_view::payments_for_month(&data.payments, month, &data.categories)
    }

    pub fn month_summary(data: &AppData, month: YearMonth) -> MonthSummary {
        let payments = Self::display_for_month(data, month);
        MonthSummary::from_payments(month, data.salary_for(month), &payments)
    }

    pub fn timeline(
        data: &AppData,
        center: YearMonth,
        before: u32,
        after: u32,
    ) -> Vec<MonthOverview> {
        month_view::timeline(data, center, before, after)
    }

    pub fn advisory_input(data: &AppData, month: YearMonth) -> AdvisoryInput {
        AdvisoryInput::from_summary(&Self::month_summary(data, month))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::{CategoryService, PaymentService, SalaryService};
    use crate::domain::PaymentDraft;
    use chrono::NaiveDate;

    fn prepared() -> (AppData, YearMonth) {
        let mut data = AppData::new();
        let month: YearMonth = "2024-02".parse().unwrap();
        SalaryService::set(&mut data, month, 3000.0).unwrap();
        let food = CategoryService::add(&mut data, "Food").unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 2, 3).unwrap();
        let paid = PaymentService::add(
            &mut data,
            PaymentDraft::one_time("Market", 200.0, day).with_category(food),
        )
        .unwrap();
        PaymentService::toggle_paid(&mut data, paid, true, None).unwrap();
        PaymentService::add(&mut data, PaymentDraft::recurring("Loan", 300.0, day, 4)).unwrap();
        (data, month)
    }

    #[test]
    fn month_summary_uses_salary_and_payments() {
        let (data, month) = prepared();
        let summary = SummaryService::month_summary(&data, month);
        assert_eq!(summary.income, 3000.0);
        assert_eq!(summary.total_paid, 200.0);
        assert_eq!(summary.total_unpaid, 300.0);
        assert_eq!(summary.remaining_income, 2500.0);
    }

    #[test]
    fn advisory_input_mirrors_summary() {
        let (data, month) = prepared();
        let input = SummaryService::advisory_input(&data, month);
        assert_eq!(input.monthly_income, 3000.0);
        assert_eq!(input.total_expenses, 500.0);
        assert_eq!(input.spending_by_category.get("Food"), Some(&200.0));
        assert_eq!(input.spending_by_category.len(), 1);
    }
}
