//! Persistence trait for budgets.

use async_trait::async_trait;
use fintra_shared::AppResult;
use fintra_shared::types::{BudgetId, MonthKey, UserId};

use super::types::{AlertLevel, Budget, NewBudget};

/// Data access for monthly budgets.
#[async_trait]
pub trait BudgetStore: Send + Sync {
    /// Creates or replaces the budget for (user, month).
    ///
    /// Existing alert levels are preserved: only the alert engine may change
    /// them, and a budget edit re-reconciles right after the upsert.
    async fn upsert(&self, budget: NewBudget) -> AppResult<Budget>;

    /// The budget covering the given month, if one was set.
    async fn find_for_month(&self, user: UserId, month: MonthKey) -> AppResult<Option<Budget>>;

    /// Users who have a budget for the given month (daily sweep input).
    async fn users_with_budget(&self, month: MonthKey) -> AppResult<Vec<UserId>>;

    /// Persists the overall alert level.
    async fn set_overall_level(&self, budget: BudgetId, level: AlertLevel) -> AppResult<()>;

    /// Persists one category's alert level.
    async fn set_category_level(
        &self,
        budget: BudgetId,
        category: &str,
        level: AlertLevel,
    ) -> AppResult<()>;

    /// Deletes the budget for (user, month). Returns whether one existed.
    async fn delete_for_month(&self, user: UserId, month: MonthKey) -> AppResult<bool>;
}
