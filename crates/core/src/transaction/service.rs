//! The transaction write pipeline.
//!
//! Every create/update/delete flows through here in a fixed order: currency
//! normalization first, then goal recompute for any goal linked before or
//! after the edit, then a budget recheck for the owning user. The recurring
//! sweep produces ordinary instances that take the same path.

use fintra_shared::types::{GoalId, RecurringGroupId, TransactionId};
use fintra_shared::{AppError, AppResult};
use rust_decimal::Decimal;

use crate::budget::BudgetAlertEngine;
use crate::currency::CurrencyConverter;
use crate::goal::GoalProgressEngine;
use chrono::NaiveDate;
use fintra_shared::types::UserId;
use std::sync::Arc;

use super::store::TransactionStore;
use super::types::{NewTransaction, Transaction, TransactionKind, TransactionPatch};

/// Input for creating a transaction or recurring template.
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    /// Owning user.
    pub user_id: UserId,
    /// Income or expense.
    pub kind: TransactionKind,
    /// Positive amount in the entered currency.
    pub amount: Decimal,
    /// Free-form category tag.
    pub category: String,
    /// Occurrence date; `None` creates a recurring template.
    pub occurred_on: Option<NaiveDate>,
    /// Currency the amount is entered in.
    pub currency: String,
    /// Linked savings goal, if any.
    pub goal_id: Option<GoalId>,
    /// Day of month a template materializes on (templates only).
    pub recurring_day: Option<u32>,
    /// Optional free-form note.
    pub note: Option<String>,
}

/// Orchestrates transaction writes and downstream aggregate consistency.
#[derive(Clone)]
pub struct TransactionService {
    transactions: Arc<dyn TransactionStore>,
    converter: CurrencyConverter,
    goal_progress: GoalProgressEngine,
    budget_alerts: BudgetAlertEngine,
}

impl TransactionService {
    /// Creates the service with its collaborators.
    #[must_use]
    pub fn new(
        transactions: Arc<dyn TransactionStore>,
        converter: CurrencyConverter,
        goal_progress: GoalProgressEngine,
        budget_alerts: BudgetAlertEngine,
    ) -> Self {
        Self {
            transactions,
            converter,
            goal_progress,
            budget_alerts,
        }
    }

    /// Creates a transaction (or recurring template) and reconciles the
    /// aggregates it touches.
    ///
    /// # Errors
    ///
    /// `Validation` for a non-positive amount or malformed recurring fields;
    /// `ServiceUnavailable` when the rate provider is down with a cold cache
    /// (the write is rejected rather than defaulting to rate 1).
    pub async fn create(&self, input: CreateTransactionInput) -> AppResult<Transaction> {
        if input.amount <= Decimal::ZERO {
            return Err(AppError::Validation(
                "transaction amount must be positive".to_string(),
            ));
        }
        if let Some(day) = input.recurring_day {
            if !(1..=31).contains(&day) {
                return Err(AppError::Validation(
                    "recurring day must be between 1 and 31".to_string(),
                ));
            }
            if input.occurred_on.is_some() {
                return Err(AppError::Validation(
                    "recurring day is only valid on a template".to_string(),
                ));
            }
        } else if input.occurred_on.is_none() {
            return Err(AppError::Validation(
                "a recurring template needs a recurring day".to_string(),
            ));
        }

        let exchange_rate = self.converter.rate_to_base(&input.currency).await?;
        let recurring_group = input
            .occurred_on
            .is_none()
            .then(RecurringGroupId::new);

        let tx = self
            .transactions
            .insert(NewTransaction {
                user_id: input.user_id,
                kind: input.kind,
                amount: input.amount,
                category: input.category,
                occurred_on: input.occurred_on,
                currency: input.currency,
                exchange_rate,
                goal_id: input.goal_id,
                recurring_group,
                recurring_day: input.recurring_day,
                note: input.note,
            })
            .await?;

        self.propagate(&tx, None).await?;
        Ok(tx)
    }

    /// Applies a partial edit and reconciles aggregates for both the goal
    /// linked before and the goal linked after the edit.
    ///
    /// # Errors
    ///
    /// `NotFound` if the transaction does not exist.
    pub async fn update(
        &self,
        id: TransactionId,
        mut patch: TransactionPatch,
    ) -> AppResult<Transaction> {
        if let Some(amount) = patch.amount {
            if amount <= Decimal::ZERO {
                return Err(AppError::Validation(
                    "transaction amount must be positive".to_string(),
                ));
            }
        }

        let before = self
            .transactions
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("transaction {id}")))?;

        // Currency edits refresh the frozen rate; everything downstream
        // re-derives from amount x rate, so no other field needs fixing up.
        if let Some(currency) = &patch.currency {
            if !currency.eq_ignore_ascii_case(&before.currency) {
                patch.exchange_rate = Some(self.converter.rate_to_base(currency).await?);
            }
        }

        let after = self
            .transactions
            .update(id, patch)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("transaction {id}")))?;

        self.propagate(&after, before.goal_id).await?;
        Ok(after)
    }

    /// Deletes a transaction and reconciles the aggregates it fed.
    ///
    /// # Errors
    ///
    /// `NotFound` if the transaction does not exist.
    pub async fn delete(&self, id: TransactionId) -> AppResult<()> {
        let before = self
            .transactions
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("transaction {id}")))?;

        self.transactions.delete(id).await?;
        self.propagate(&before, None).await?;
        Ok(())
    }

    /// Recomputes the aggregates a written transaction touches.
    ///
    /// Templates are never aggregated, so a template write propagates
    /// nothing.
    async fn propagate(&self, tx: &Transaction, previous_goal: Option<GoalId>) -> AppResult<()> {
        if tx.is_template() {
            return Ok(());
        }
        for goal in affected_goals(tx.goal_id, previous_goal) {
            self.goal_progress.recompute_by_id(goal).await?;
        }
        self.budget_alerts.reconcile(tx.user_id).await?;
        Ok(())
    }
}

/// Goals touched by an edit: the current link plus the pre-edit link, deduped.
fn affected_goals(current: Option<GoalId>, previous: Option<GoalId>) -> Vec<GoalId> {
    let mut goals = Vec::with_capacity(2);
    if let Some(goal) = current {
        goals.push(goal);
    }
    if let Some(goal) = previous {
        if Some(goal) != current {
            goals.push(goal);
        }
    }
    goals
}
