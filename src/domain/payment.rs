//! Payment records, their recurrence rule and the add/edit payloads.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::errors::{LedgerError, Result};
use crate::domain::common::{Displayable, Identifiable, NamedEntity};

/// Supported recurrence frequencies. Only monthly schedules exist.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceFrequency {
    #[default]
    Monthly,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recurrence {
    #[serde(default)]
    pub frequency: RecurrenceFrequency,
    pub installments: u32,
}

impl Recurrence {
    pub fn monthly(installments: u32) -> Self {
        Self {
            frequency: RecurrenceFrequency::Monthly,
            installments,
        }
    }
}

/// A stored obligation: either one-time or a fixed number of monthly installments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub amount: f64,
    /// Due date for one-time payments, due date of installment #1 otherwise.
    pub date: NaiveDate,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid: Option<bool>,
    /// Keyed by the computed due date of each installment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_installments: Option<BTreeMap<NaiveDate, bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
}

impl Payment {
    pub fn one_time(name: impl Into<String>, amount: f64, date: NaiveDate) -> Self {
        PaymentDraft::one_time(name, amount, date).into_payment()
    }

    pub fn recurring(
        name: impl Into<String>,
        amount: f64,
        start: NaiveDate,
        installments: u32,
    ) -> Self {
        PaymentDraft::recurring(name, amount, start, installments).into_payment()
    }

    /// The recurrence rule, only when the payment is flagged recurring.
    pub fn active_recurrence(&self) -> Option<&Recurrence> {
        if self.is_recurring {
            self.recurrence.as_ref()
        } else {
            None
        }
    }

    pub fn total_installments(&self) -> Option<u32> {
        self.active_recurrence().map(|rule| rule.installments)
    }

    pub fn is_installment_paid(&self, due: NaiveDate) -> bool {
        self.paid_installments
            .as_ref()
            .and_then(|map| map.get(&due).copied())
            .unwrap_or(false)
    }

    pub fn validate(&self) -> Result<()> {
        validate_fields(
            &self.name,
            self.amount,
            self.is_recurring,
            self.recurrence.as_ref(),
        )
    }
}

impl Identifiable for Payment {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Payment {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Payment {
    fn display_label(&self) -> String {
        match self.total_installments() {
            Some(total) => format!("{} ({:.2} x{})", self.name, self.amount, total),
            None => format!("{} ({:.2})", self.name, self.amount),
        }
    }
}

/// Input for creating a payment; the store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDraft {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
}

impl PaymentDraft {
    pub fn one_time(name: impl Into<String>, amount: f64, date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            description: None,
            amount,
            date,
            is_recurring: false,
            recurrence: None,
            category_id: None,
        }
    }

    pub fn recurring(
        name: impl Into<String>,
        amount: f64,
        start: NaiveDate,
        installments: u32,
    ) -> Self {
        Self {
            is_recurring: true,
            recurrence: Some(Recurrence::monthly(installments)),
            ..Self::one_time(name, amount, start)
        }
    }

    pub fn with_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_fields(
            &self.name,
            self.amount,
            self.is_recurring,
            self.recurrence.as_ref(),
        )
    }

    /// Materializes the draft with a fresh id and no paid state.
    pub fn into_payment(self) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            name: self.name,
            description: self.description,
            amount: self.amount,
            date: self.date,
            is_recurring: self.is_recurring,
            recurrence: self.recurrence,
            paid: None,
            paid_installments: None,
            category_id: self.category_id,
        }
    }
}

/// Partial update for a payment.
///
/// `None` leaves a field unchanged. For clearable fields `Some(None)` removes
/// the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub amount: Option<f64>,
    pub date: Option<NaiveDate>,
    pub is_recurring: Option<bool>,
    pub recurrence: Option<Option<Recurrence>>,
    pub category_id: Option<Option<Uuid>>,
}

impl PaymentPatch {
    pub fn is_empty(&self) -> bool {
        *self == PaymentPatch::default()
    }

    /// Applies the patch to `payment`. Paid state is never touched.
    pub fn apply_to(&self, payment: &mut Payment) {
        if let Some(name) = &self.name {
            payment.name = name.clone();
        }
        if let Some(description) = &self.description {
            payment.description = description.clone();
        }
        if let Some(amount) = self.amount {
            payment.amount = amount;
        }
        if let Some(date) = self.date {
            payment.date = date;
        }
        if let Some(is_recurring) = self.is_recurring {
            payment.is_recurring = is_recurring;
        }
        if let Some(recurrence) = &self.recurrence {
            payment.recurrence = recurrence.clone();
        }
        if let Some(category_id) = self.category_id {
            payment.category_id = category_id;
        }
    }
}

fn validate_fields(
    name: &str,
    amount: f64,
    is_recurring: bool,
    recurrence: Option<&Recurrence>,
) -> Result<()> {
    if name.trim().is_empty() {
        return Err(LedgerError::Validation("payment name is required".into()));
    }
    if !amount.is_finite() || amount <= 0.0 {
        return Err(LedgerError::Validation(format!(
            "payment amount must be positive, got {amount}"
        )));
    }
    if is_recurring {
        match recurrence {
            None => {
                return Err(LedgerError::Validation(
                    "recurring payments need a recurrence rule".into(),
                ))
            }
            Some(rule) if rule.installments == 0 => {
                return Err(LedgerError::Validation(
                    "recurring payments need at least one installment".into(),
                ))
            }
            Some(_) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn validation_rejects_bad_drafts() {
        let zero = PaymentDraft::one_time("Rent", 0.0, date(2024, 1, 1));
        assert!(matches!(zero.validate(), Err(LedgerError::Validation(_))));

        let negative = PaymentDraft::one_time("Rent", -5.0, date(2024, 1, 1));
        assert!(negative.validate().is_err());

        let nan = PaymentDraft::one_time("Rent", f64::NAN, date(2024, 1, 1));
        assert!(nan.validate().is_err());

        let mut missing_rule = PaymentDraft::recurring("Loan", 10.0, date(2024, 1, 1), 3);
        missing_rule.recurrence = None;
        assert!(missing_rule.validate().is_err());

        let no_installments = PaymentDraft::recurring("Loan", 10.0, date(2024, 1, 1), 0);
        assert!(no_installments.validate().is_err());

        let blank = PaymentDraft::one_time("  ", 10.0, date(2024, 1, 1));
        assert!(blank.validate().is_err());
    }

    #[test]
    fn patch_distinguishes_absent_from_clear() {
        let category = Uuid::new_v4();
        let mut payment = Payment::one_time("Gym", 30.0, date(2024, 5, 3));
        payment.category_id = Some(category);
        payment.description = Some("monthly pass".into());
        payment.paid = Some(true);

        PaymentPatch {
            amount: Some(35.0),
            ..Default::default()
        }
        .apply_to(&mut payment);
        assert_eq!(payment.amount, 35.0);
        assert_eq!(payment.category_id, Some(category));
        assert_eq!(payment.description.as_deref(), Some("monthly pass"));

        PaymentPatch {
            category_id: Some(None),
            description: Some(None),
            ..Default::default()
        }
        .apply_to(&mut payment);
        assert_eq!(payment.category_id, None);
        assert_eq!(payment.description, None);
        assert_eq!(payment.paid, Some(true));
    }

    #[test]
    fn serializes_with_camel_case_and_skips_absent_fields() {
        let mut payment = Payment::recurring("Phone", 20.0, date(2024, 1, 15), 12);
        payment.paid_installments = Some(BTreeMap::new());
        let json = serde_json::to_value(&payment).unwrap();
        assert_eq!(json["isRecurring"], true);
        assert_eq!(json["recurrence"]["frequency"], "monthly");
        assert_eq!(json["date"], "2024-01-15");
        assert!(json["paidInstallments"].as_object().unwrap().is_empty());
        assert!(json.get("paid").is_none());
        assert!(json.get("categoryId").is_none());
        assert!(json.get("description").is_none());
    }

    #[test]
    fn active_recurrence_requires_flag() {
        let mut payment = Payment::recurring("Loan", 50.0, date(2024, 1, 1), 3);
        assert_eq!(payment.total_installments(), Some(3));
        payment.is_recurring = false;
        assert!(payment.active_recurrence().is_none());
    }
}
