//! Budget set/delete operations.

use fintra_shared::types::{MonthKey, UserId};
use fintra_shared::{AppError, AppResult};
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::currency::{CurrencyConverter, convert_amount};

use super::alert::BudgetAlertEngine;
use super::store::BudgetStore;
use super::types::{Budget, NewBudget, NewCategoryBudget};

/// Input for setting a user's budget for a month.
#[derive(Debug, Clone)]
pub struct SetBudgetInput {
    /// Owning user.
    pub user_id: UserId,
    /// The month the budget covers.
    pub month: MonthKey,
    /// Total limit in the entered currency.
    pub amount: Decimal,
    /// Currency the limits are entered in.
    pub currency: String,
    /// Per-category limits.
    pub categories: Vec<SetCategoryInput>,
}

/// One per-category limit inside a budget-set.
#[derive(Debug, Clone)]
pub struct SetCategoryInput {
    /// Category tag.
    pub category: String,
    /// Limit in the budget's currency.
    pub amount: Decimal,
}

/// Upserts budgets with currency normalization, then re-reconciles alerts.
#[derive(Clone)]
pub struct BudgetService {
    budgets: Arc<dyn BudgetStore>,
    converter: CurrencyConverter,
    alerts: BudgetAlertEngine,
}

impl BudgetService {
    /// Creates the service with its collaborators.
    #[must_use]
    pub fn new(
        budgets: Arc<dyn BudgetStore>,
        converter: CurrencyConverter,
        alerts: BudgetAlertEngine,
    ) -> Self {
        Self {
            budgets,
            converter,
            alerts,
        }
    }

    /// Creates or replaces the budget for (user, month).
    ///
    /// The new limits may already be crossed by existing spend, so the alert
    /// engine runs immediately after the upsert.
    ///
    /// # Errors
    ///
    /// `Validation` for non-positive limits; currency conversion failures
    /// propagate and reject the write.
    pub async fn set_budget(&self, input: SetBudgetInput) -> AppResult<Budget> {
        if input.amount <= Decimal::ZERO {
            return Err(AppError::Validation(
                "budget amount must be positive".to_string(),
            ));
        }
        if input
            .categories
            .iter()
            .any(|c| c.amount <= Decimal::ZERO)
        {
            return Err(AppError::Validation(
                "category budget amounts must be positive".to_string(),
            ));
        }

        let rate = self.converter.rate_to_base(&input.currency).await?;
        let categories = input
            .categories
            .into_iter()
            .map(|c| NewCategoryBudget {
                base_amount: convert_amount(c.amount, rate),
                category: c.category,
                amount: c.amount,
            })
            .collect();

        let budget = self
            .budgets
            .upsert(NewBudget {
                user_id: input.user_id,
                month: input.month,
                base_amount: convert_amount(input.amount, rate),
                amount: input.amount,
                currency: input.currency,
                categories,
            })
            .await?;

        self.alerts.reconcile(input.user_id).await?;
        Ok(budget)
    }

    /// Deletes the budget for (user, month).
    ///
    /// # Errors
    ///
    /// `NotFound` if no budget covers that month.
    pub async fn delete_budget(&self, user: UserId, month: MonthKey) -> AppResult<()> {
        if !self.budgets.delete_for_month(user, month).await? {
            return Err(AppError::NotFound(format!("budget for {month}")));
        }
        Ok(())
    }
}
