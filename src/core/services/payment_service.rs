//! Business logic helpers for managing payments.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::core::errors::LedgerError;
use crate::core::services::ServiceResult;
use crate::domain::{AppData, PaymentDraft, PaymentPatch};
use crate::ledger::recurrence;

/// Provides validated CRUD helpers for payments.
pub struct PaymentService;

impl PaymentService {
    /// Adds a new payment and returns its identifier.
    pub fn add(data: &mut AppData, draft: PaymentDraft) -> ServiceResult<Uuid> {
        draft.validate()?;
        Self::ensure_category(data, draft.category_id)?;
        let payment = draft.into_payment();
        let id = payment.id;
        data.payments.push(payment);
        Ok(id)
    }

    /// Merges `patch` into the payment identified by `id`.
    ///
    /// The merged record is validated before it replaces the stored one.
    pub fn update(data: &mut AppData, id: Uuid, patch: &PaymentPatch) -> ServiceResult<()> {
        let current = data.payment(id).ok_or(LedgerError::PaymentNotFound(id))?;
        let mut merged = current.clone();
        patch.apply_to(&mut merged);
        merged.validate()?;
        Self::ensure_category(data, merged.category_id)?;

        let slot = data.payment_mut(id).ok_or(LedgerError::PaymentNotFound(id))?;
        *slot = merged;
        Ok(())
    }

    /// Removes the payment with every installment. Returns whether it existed.
    pub fn remove(data: &mut AppData, id: Uuid) -> bool {
        let before = data.payments.len();
        data.payments.retain(|payment| payment.id != id);
        data.payments.len() != before
    }

    /// Marks a one-time payment, or one installment of a recurring payment, as paid or unpaid.
    pub fn toggle_paid(
        data: &mut AppData,
        id: Uuid,
        paid: bool,
        instance_date: Option<NaiveDate>,
    ) -> ServiceResult<()> {
        let payment = data.payment_mut(id).ok_or(LedgerError::PaymentNotFound(id))?;
        if payment.active_recurrence().is_none() {
            payment.paid = Some(paid);
            return Ok(());
        }

        let due = instance_date.ok_or_else(|| {
            LedgerError::Validation("instance date required for recurring payment".into())
        })?;
        if recurrence::installment_index(payment, due).is_none() {
            return Err(LedgerError::Validation(format!(
                "{} is not an installment date of `{}`",
                due, payment.name
            )));
        }
        payment
            .paid_installments
            .get_or_insert_with(Default::default)
            .insert(due, paid);
        Ok(())
    }

    fn ensure_category(data: &AppData, category_id: Option<Uuid>) -> ServiceResult<()> {
        match category_id {
            Some(id) if data.category(id).is_none() => Err(LedgerError::CategoryNotFound(id)),
            _ => Ok(()),
        }
    }
}
