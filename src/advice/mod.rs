//! Boundary to the budget advice generator.
//!
//! Advice is advisory only: failures, panics and slow advisors all collapse
//! into [`AdviceOutcome::Unavailable`] and never reach ledger operations.

use std::{
    collections::BTreeMap,
    sync::{mpsc, Arc},
    thread,
    time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::category::UNCATEGORIZED;
use crate::ledger::MonthSummary;

/// Figures handed to the advisor for one month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryInput {
    pub monthly_income: f64,
    pub total_expenses: f64,
    pub spending_by_category: BTreeMap<String, f64>,
}

impl AdvisoryInput {
    pub fn from_summary(summary: &MonthSummary) -> Self {
        Self {
            monthly_income: summary.income,
            total_expenses: summary.total_expenses,
            spending_by_category: summary.spending_by_category.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AdvisoryOutput {
    pub summary: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("advisor failed: {0}")]
    Failed(String),
    #[error("advisor timed out after {0:?}")]
    TimedOut(Duration),
    #[error("advisor stopped without answering")]
    Disconnected,
}

pub trait BudgetAdvisor: Send + Sync {
    fn suggest(&self, input: &AdvisoryInput) -> Result<AdvisoryOutput, AdvisorError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdviceOutcome {
    Ready(AdvisoryOutput),
    Unavailable(String),
}

impl AdviceOutcome {
    pub fn is_available(&self) -> bool {
        matches!(self, AdviceOutcome::Ready(_))
    }
}

/// Runs `advisor` on a worker thread and waits at most `timeout` for it.
pub fn request_advice(
    advisor: Arc<dyn BudgetAdvisor>,
    input: AdvisoryInput,
    timeout: Duration,
) -> AdviceOutcome {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(advisor.suggest(&input));
    });

    let error = match rx.recv_timeout(timeout) {
        Ok(Ok(output)) => return AdviceOutcome::Ready(output),
        Ok(Err(err)) => err,
        Err(mpsc::RecvTimeoutError::Timeout) => AdvisorError::TimedOut(timeout),
        Err(mpsc::RecvTimeoutError::Disconnected) => AdvisorError::Disconnected,
    };
    tracing::warn!(error = %error, "budget advice unavailable");
    AdviceOutcome::Unavailable(error.to_string())
}

const HIGH_SPENDING_RATIO: f64 = 0.8;
const DOMINANT_CATEGORY_SHARE: f64 = 0.4;

/// Local rule-based advisor.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicAdvisor;

impl BudgetAdvisor for HeuristicAdvisor {
    fn suggest(&self, input: &AdvisoryInput) -> Result<AdvisoryOutput, AdvisorError> {
        let income = input.monthly_income;
        let expenses = input.total_expenses;
        let paid_total: f64 = input.spending_by_category.values().sum();
        let mut suggestions = Vec::new();

        let summary = if income > 0.0 {
            format!(
                "Income {:.2}, expenses {:.2} ({:.0}% of income).",
                income,
                expenses,
                expenses / income * 100.0
            )
        } else {
            format!("No income recorded; expenses total {:.2}.", expenses)
        };

        if income <= 0.0 && expenses > 0.0 {
            suggestions.push(
                "Record this month's salary so expenses can be compared against income.".into(),
            );
        } else if expenses > income {
            suggestions.push(format!(
                "Expenses exceed income by {:.2}; postpone or cancel unpaid items where possible.",
                expenses - income
            ));
        } else if income > 0.0 && expenses / income > HIGH_SPENDING_RATIO {
            suggestions.push(format!(
                "Expenses use more than {:.0}% of income; set aside part of the remainder as savings first.",
                HIGH_SPENDING_RATIO * 100.0
            ));
        }

        if paid_total > 0.0 {
            let top = input
                .spending_by_category
                .iter()
                .filter(|(name, _)| name.as_str() != UNCATEGORIZED)
                .max_by(|a, b| a.1.total_cmp(b.1));
            if let Some((name, amount)) = top {
                let share = amount / paid_total;
                if share > DOMINANT_CATEGORY_SHARE {
                    suggestions.push(format!(
                        "`{}` accounts for {:.0}% of paid spending; review it for savings.",
                        name,
                        share * 100.0
                    ));
                }
            }
            if let Some(amount) = input.spending_by_category.get(UNCATEGORIZED) {
                suggestions.push(format!(
                    "Assign categories to {:.2} of uncategorized spending to see where it goes.",
                    amount
                ));
            }
        }

        Ok(AdvisoryOutput {
            summary,
            suggestions,
        })
    }
}
