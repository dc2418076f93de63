//! Month materialization: dated instances, paid state and totals.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{
    app_data::AppData, category::Category, category::UNCATEGORIZED, month::YearMonth,
    payment::Payment,
};
use crate::ledger::{categories::CategoryResolver, recurrence};

/// A payment as it appears in one month.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisplayPayment {
    #[serde(flatten)]
    pub payment: Payment,
    pub instance_date: NaiveDate,
    pub is_instance: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installment_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_installments: Option<u32>,
    pub is_paid_in_month: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
}

impl DisplayPayment {
    pub fn amount(&self) -> f64 {
        self.payment.amount
    }

    pub fn category_label(&self) -> &str {
        self.category_name.as_deref().unwrap_or(UNCATEGORIZED)
    }

    /// `n/N` for installments, `None` for one-time payments.
    pub fn installment_label(&self) -> Option<String> {
        match (self.installment_number, self.total_installments) {
            (Some(number), Some(total)) => Some(format!("{number}/{total}")),
            _ => None,
        }
    }
}

/// Instances due in `month`, annotated with paid state and category name.
///
/// Sorted by instance date; the sort is stable so instances on the same day
/// keep the order of `payments`.
pub fn payments_for_month(
    payments: &[Payment],
    month: YearMonth,
    categories: &[Category],
) -> Vec<DisplayPayment> {
    let resolver = CategoryResolver::new(categories);
    let mut display = Vec::new();

    for payment in payments {
        let category_name = resolver.name_of(payment.category_id).map(str::to_string);
        for instance in recurrence::expand(payment, month) {
            let is_instance = instance.installment.is_some();
            let is_paid_in_month = if is_instance {
                payment.is_installment_paid(instance.date)
            } else {
                payment.paid.unwrap_or(false)
            };
            display.push(DisplayPayment {
                payment: payment.clone(),
                instance_date: instance.date,
                is_instance,
                installment_number: instance.installment,
                total_installments: if is_instance {
                    payment.total_installments()
                } else {
                    None
                },
                is_paid_in_month,
                category_name: category_name.clone(),
            });
        }
    }

    display.sort_by_key(|item| item.instance_date);
    display
}

/// Totals for one month.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthSummary {
    pub month: YearMonth,
    pub income: f64,
    pub total_paid: f64,
    pub total_unpaid: f64,
    pub total_expenses: f64,
    pub remaining_income: f64,
    /// Paid amounts grouped by category name (or "Uncategorized").
    pub spending_by_category: BTreeMap<String, f64>,
}

impl MonthSummary {
    pub fn from_payments(month: YearMonth, income: f64, payments: &[DisplayPayment]) -> Self {
        let mut total_paid = 0.0;
        let mut total_unpaid = 0.0;
        let mut spending_by_category: BTreeMap<String, f64> = BTreeMap::new();

        for item in payments {
            if item.is_paid_in_month {
                total_paid += item.amount();
                *spending_by_category
                    .entry(item.category_label().to_string())
                    .or_insert(0.0) += item.amount();
            } else {
                total_unpaid += item.amount();
            }
        }

        let total_expenses = total_paid + total_unpaid;
        Self {
            month,
            income,
            total_paid,
            total_unpaid,
            total_expenses,
            remaining_income: income - total_expenses,
            spending_by_category,
        }
    }

    pub fn is_over_budget(&self) -> bool {
        self.remaining_income < 0.0
    }

    /// Category spending ordered from largest to smallest.
    pub fn ranked_spending(&self) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .spending_by_category
            .iter()
            .map(|(name, amount)| (name.as_str(), *amount))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

/// One month of the multi-month timeline.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthOverview {
    pub month: YearMonth,
    pub income: f64,
    pub total_expenses: f64,
    pub payments: Vec<DisplayPayment>,
}

pub const DEFAULT_TIMELINE_SPAN: u32 = 6;

/// Aggregates each month from `center - before` to `center + after` on its own.
pub fn timeline(data: &AppData, center: YearMonth, before: u32, after: u32) -> Vec<MonthOverview> {
    (-i64::from(before)..=i64::from(after))
        .map(|offset| {
            let month = center.offset(offset);
            let payments = payments_for_month(&data.payments, month, &data.categories);
            let total_expenses = payments.iter().map(DisplayPayment::amount).sum();
            MonthOverview {
                month,
                income: data.salary_for(month),
                total_expenses,
                payments,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ym(y: i32, m: u32) -> YearMonth {
        YearMonth::new(y, m).unwrap()
    }

    #[test]
    fn annotates_paid_state_and_category() {
        let food = Category::new("Food");
        let mut groceries = Payment::one_time("Groceries", 120.0, date(2024, 2, 20));
        groceries.category_id = Some(food.id);
        groceries.paid = Some(true);
        let mut loan = Payment::recurring("Loan", 250.0, date(2024, 1, 31), 3);
        loan.paid_installments = Some(BTreeMap::from([(date(2024, 2, 29), true)]));
        let mut orphan = Payment::one_time("Gift", 40.0, date(2024, 2, 1));
        orphan.category_id = Some(Uuid::new_v4());

        let list = payments_for_month(&[groceries, loan, orphan], ym(2024, 2), &[food]);
        let names: Vec<&str> = list.iter().map(|p| p.payment.name.as_str()).collect();
        assert_eq!(names, vec!["Gift", "Groceries", "Loan"]);

        assert_eq!(list[0].category_name, None);
        assert_eq!(list[0].category_label(), UNCATEGORIZED);
        assert!(!list[0].is_paid_in_month);

        assert_eq!(list[1].category_name.as_deref(), Some("Food"));
        assert!(list[1].is_paid_in_month);
        assert!(!list[1].is_instance);

        assert!(list[2].is_instance);
        assert!(list[2].is_paid_in_month);
        assert_eq!(list[2].instance_date, date(2024, 2, 29));
        assert_eq!(list[2].installment_label().as_deref(), Some("2/3"));
    }

    #[test]
    fn same_day_instances_keep_input_order() {
        let first = Payment::one_time("First", 1.0, date(2024, 5, 10));
        let second = Payment::recurring("Second", 2.0, date(2024, 4, 10), 2);
        let third = Payment::one_time("Third", 3.0, date(2024, 5, 10));
        let list = payments_for_month(&[first, second, third], ym(2024, 5), &[]);
        let names: Vec<&str> = list.iter().map(|p| p.payment.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn summary_totals_are_consistent() {
        let rent = Category::new("Rent");
        let mut a = Payment::one_time("Rent", 1000.0, date(2024, 3, 1));
        a.category_id = Some(rent.id);
        a.paid = Some(true);
        let mut b = Payment::one_time("Snacks", 15.5, date(2024, 3, 4));
        b.paid = Some(true);
        let c = Payment::one_time("Internet", 45.0, date(2024, 3, 9));
        let list = payments_for_month(&[a, b, c], ym(2024, 3), &[rent]);
        let summary = MonthSummary::from_payments(ym(2024, 3), 2000.0, &list);

        assert_eq!(summary.total_paid, 1015.5);
        assert_eq!(summary.total_unpaid, 45.0);
        assert_eq!(summary.total_paid + summary.total_unpaid, summary.total_expenses);
        assert_eq!(summary.remaining_income, 2000.0 - 1060.5);
        assert_eq!(summary.spending_by_category.get("Rent"), Some(&1000.0));
        assert_eq!(summary.spending_by_category.get(UNCATEGORIZED), Some(&15.5));
        assert_eq!(summary.ranked_spending()[0].0, "Rent");
        assert!(!summary.is_over_budget());
    }

    #[test]
    fn empty_month_summary() {
        let summary = MonthSummary::from_payments(ym(2024, 3), 0.0, &[]);
        assert_eq!(summary.total_expenses, 0.0);
        assert!(summary.spending_by_category.is_empty());
    }

    #[test]
    fn timeline_aggregates_each_month_independently() {
        let mut data = AppData::new();
        data.payments
            .push(Payment::recurring("Loan", 100.0, date(2024, 1, 31), 3));
        data.monthly_salaries.insert(ym(2024, 2), 1500.0);
        let months = timeline(&data, ym(2024, 2), 2, 2);
        assert_eq!(months.len(), 5);
        assert_eq!(months[0].month, ym(2023, 12));
        assert_eq!(months[4].month, ym(2024, 4));
        let expenses: Vec<f64> = months.iter().map(|m| m.total_expenses).collect();
        assert_eq!(expenses, vec![0.0, 100.0, 100.0, 100.0, 0.0]);
        assert_eq!(months[2].income, 1500.0);
    }

    #[test]
    fn display_payment_serializes_flat() {
        let payment = Payment::recurring("Loan", 100.0, date(2024, 1, 31), 3);
        let list = payments_for_month(&[payment], ym(2024, 2), &[]);
        let json = serde_json::to_value(&list[0]).unwrap();
        assert_eq!(json["name"], "Loan");
        assert_eq!(json["instanceDate"], "2024-02-29");
        assert_eq!(json["installmentNumber"], 2);
        assert_eq!(json["totalInstallments"], 3);
        assert_eq!(json["isPaidInMonth"], false);
    }
}
