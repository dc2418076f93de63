//! Expands stored payments into dated instances for a month.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::domain::{month::YearMonth, payment::Payment};

/// One dated occurrence of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledInstance {
    pub date: NaiveDate,
    /// 1-based installment number; `None` for one-time payments.
    pub installment: Option<u32>,
}

/// Due date of installment `index` (0-based) for a schedule starting at `start`.
///
/// The day is capped to the last day of the installment's month, so a
/// schedule starting on the 31st lands on Feb 28/29, Apr 30 and so on, and
/// never spills into the following month.
pub fn installment_date(start: NaiveDate, index: u32) -> NaiveDate {
    let month = YearMonth::of(start).offset(i64::from(index));
    month.clamped_day(start.day())
}

/// 0-based installment index of `payment` due on `date`, if any.
///
/// Recurring payments only; a one-time payment has no installments.
pub fn installment_index(payment: &Payment, date: NaiveDate) -> Option<u32> {
    let rule = payment.active_recurrence()?;
    let offset = YearMonth::of(payment.date).months_until(YearMonth::of(date));
    if offset < 0 || offset >= i64::from(rule.installments) {
        return None;
    }
    let index = offset as u32;
    (installment_date(payment.date, index) == date).then_some(index)
}

/// Instances of `payment` falling inside `month`, in installment order.
pub fn expand(payment: &Payment, month: YearMonth) -> Vec<ScheduledInstance> {
    let Some(rule) = payment.active_recurrence() else {
        return if month.contains(payment.date) {
            vec![ScheduledInstance {
                date: payment.date,
                installment: None,
            }]
        } else {
            Vec::new()
        };
    };

    // Clamping keeps every installment inside its own month, so only the
    // installment whose month offset matches can land in `month`.
    let offset = YearMonth::of(payment.date).months_until(month);
    if offset < 0 || offset >= i64::from(rule.installments) {
        return Vec::new();
    }
    let index = offset as u32;
    let date = installment_date(payment.date, index);
    debug_assert!(month.contains(date));
    vec![ScheduledInstance {
        date,
        installment: Some(index + 1),
    }]
}

/// Every installment due date of a recurring payment, in order.
pub fn schedule(payment: &Payment) -> Vec<NaiveDate> {
    match payment.active_recurrence() {
        Some(rule) => (0..rule.installments)
            .map(|index| installment_date(payment.date, index))
            .collect(),
        None => Vec::new(),
    }
}

/// Month of the final installment, or the due month of a one-time payment.
pub fn last_month(payment: &Payment) -> YearMonth {
    let start = YearMonth::of(payment.date);
    match payment.total_installments() {
        Some(total) if total > 0 => start.offset(i64::from(total) - 1),
        _ => start,
    }
}
