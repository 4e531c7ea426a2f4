//! Budget threshold alerting.
//!
//! `reconcile` re-derives the month's spend from the transaction records on
//! every call instead of trusting any in-memory value, which makes it
//! idempotent and safe to run concurrently with user writes and the daily
//! sweep.

use fintra_shared::AppResult;
use fintra_shared::types::{MonthKey, UserId};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::notification::{NotificationKind, NotificationSink};
use crate::transaction::{Transaction, TransactionStore};

use super::store::BudgetStore;
use super::types::AlertLevel;

/// Keeps stored alert levels consistent with observed spend percentages and
/// notifies exactly once per upward threshold crossing.
#[derive(Clone)]
pub struct BudgetAlertEngine {
    budgets: Arc<dyn BudgetStore>,
    transactions: Arc<dyn TransactionStore>,
    notifier: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
}

impl BudgetAlertEngine {
    /// Creates the engine with its collaborators.
    #[must_use]
    pub fn new(
        budgets: Arc<dyn BudgetStore>,
        transactions: Arc<dyn TransactionStore>,
        notifier: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            budgets,
            transactions,
            notifier,
            clock,
        }
    }

    /// Rechecks one user's budget for the current month.
    ///
    /// No budget set for the month is a no-op, not an error: reconcile may be
    /// invoked speculatively after any write.
    pub async fn reconcile(&self, user: UserId) -> AppResult<()> {
        let month = MonthKey::from_date(self.clock.today());
        let Some(budget) = self.budgets.find_for_month(user, month).await? else {
            return Ok(());
        };

        let expenses = self.transactions.expenses_in_month(user, month).await?;
        let total_spent: Decimal = expenses.iter().map(Transaction::base_amount).sum();

        let computed = level_for(total_spent, budget.base_amount);
        if computed != budget.alert_level {
            self.budgets.set_overall_level(budget.id, computed).await?;
            if computed > budget.alert_level {
                let message = alert_message(None, month, computed);
                self.deliver(user, &message).await;
            }
        }

        // Every category in the budget's list, including ones with zero
        // spend: a 0% observation may silently re-arm a previously elevated
        // level.
        for category in &budget.categories {
            let spent: Decimal = expenses
                .iter()
                .filter(|tx| tx.category == category.category)
                .map(Transaction::base_amount)
                .sum();

            let computed = level_for(spent, category.base_amount);
            if computed != category.alert_level {
                self.budgets
                    .set_category_level(budget.id, &category.category, computed)
                    .await?;
                if computed > category.alert_level {
                    let message = alert_message(Some(&category.category), month, computed);
                    self.deliver(user, &message).await;
                }
            }
        }

        Ok(())
    }

    /// Daily defense-in-depth sweep over every user with a budget this month.
    ///
    /// A failing user is logged and skipped; the sweep continues. Returns the
    /// number of users reconciled without error.
    pub async fn sweep(&self) -> AppResult<usize> {
        let month = MonthKey::from_date(self.clock.today());
        let users = self.budgets.users_with_budget(month).await?;
        let mut reconciled = 0;
        for user in users {
            match self.reconcile(user).await {
                Ok(()) => reconciled += 1,
                Err(e) => warn!(%user, error = %e, "budget sweep item failed"),
            }
        }
        debug!(%month, reconciled, "budget sweep finished");
        Ok(reconciled)
    }

    /// Best-effort delivery: the persisted level is the source of truth, so a
    /// failed notification is logged and dropped, never rolled back into the
    /// state change.
    async fn deliver(&self, user: UserId, message: &str) {
        if let Err(e) = self
            .notifier
            .notify(user, NotificationKind::BudgetAlert, message, Some("/budgets"))
            .await
        {
            warn!(%user, error = %e, "budget alert delivery failed");
        }
    }
}

/// Maps observed spend against a limit to a threshold band.
///
/// A non-positive limit observes 0%, never a division error.
fn level_for(spent: Decimal, limit: Decimal) -> AlertLevel {
    if limit <= Decimal::ZERO {
        return AlertLevel::None;
    }
    let percent = (spent / limit * Decimal::ONE_HUNDRED).round();
    AlertLevel::from_percent(percent)
}

/// One message per (scope, month, level), so the sink's duplicate-tuple
/// suppression distinguishes months and bands but collapses concurrent
/// re-sends of the same crossing.
fn alert_message(category: Option<&str>, month: MonthKey, level: AlertLevel) -> String {
    let scope = category.map_or_else(
        || format!("budget for {month}"),
        |name| format!("'{name}' budget for {month}"),
    );
    match level {
        AlertLevel::Pct100 => format!("You have used 100% of your {scope}."),
        level => format!(
            "You have used over {}% of your {scope}.",
            level.threshold()
        ),
    }
}
