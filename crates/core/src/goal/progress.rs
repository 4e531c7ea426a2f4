//! Goal progress recomputation.
//!
//! The accumulated amount is always re-derived from the full set of linked
//! transactions. Edits and deletes arrive through multiple paths (user,
//! admin, recurring sweep) in any order; an incremental counter would drift,
//! a full aggregate cannot. The one exception is the recurring sweep's
//! append-only case, which applies a single atomic increment instead of an
//! O(linked-transactions) scan.

use fintra_shared::AppResult;
use fintra_shared::types::GoalId;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::warn;

use crate::clock::Clock;
use crate::notification::{NotificationKind, NotificationSink};
use crate::transaction::{Transaction, TransactionStore};

use super::store::GoalStore;
use super::types::{Goal, GoalStatus, derive_status};

/// Keeps goal accumulated amounts and lifecycle status consistent with the
/// transactions linked to them.
#[derive(Clone)]
pub struct GoalProgressEngine {
    goals: Arc<dyn GoalStore>,
    transactions: Arc<dyn TransactionStore>,
    notifier: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
}

impl GoalProgressEngine {
    /// Creates the engine with its collaborators.
    #[must_use]
    pub fn new(
        goals: Arc<dyn GoalStore>,
        transactions: Arc<dyn TransactionStore>,
        notifier: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            goals,
            transactions,
            notifier,
            clock,
        }
    }

    /// Full recompute by ID. A missing goal is a no-op: recompute may be
    /// invoked speculatively after any linked-transaction write.
    pub async fn recompute_by_id(&self, id: GoalId) -> AppResult<()> {
        match self.goals.find(id).await? {
            Some(goal) => self.recompute(&goal).await,
            None => Ok(()),
        }
    }

    /// Full recompute for an already-loaded goal.
    ///
    /// Sums the base amounts of every dated expense linked to the goal
    /// (income and templates never count), clamps at zero, persists, and
    /// re-derives status.
    pub async fn recompute(&self, goal: &Goal) -> AppResult<()> {
        let linked = self.transactions.linked_to_goal(goal.id).await?;
        let total: Decimal = linked
            .iter()
            .filter(|tx| tx.counts_toward_goal())
            .map(Transaction::base_amount)
            .sum();
        let total = total.max(Decimal::ZERO);

        let status = derive_status(
            total,
            goal.target_base_amount,
            goal.target_date,
            self.clock.today(),
        );
        self.goals.save_progress(goal.id, total, status).await?;

        if status != goal.status {
            self.announce(goal, status).await;
        }
        Ok(())
    }

    /// Append-only fast path for the recurring sweep: one new fact, one
    /// atomic increment. Any non-append mutation must go through the full
    /// recompute instead.
    pub async fn record_contribution(&self, id: GoalId, delta: Decimal) -> AppResult<()> {
        let Some(updated) = self.goals.add_to_progress(id, delta).await? else {
            return Ok(());
        };

        let status = derive_status(
            updated.current_base_amount,
            updated.target_base_amount,
            updated.target_date,
            self.clock.today(),
        );
        if status != updated.status {
            self.goals
                .save_progress(updated.id, updated.current_base_amount, status)
                .await?;
            self.announce(&updated, status).await;
        }
        Ok(())
    }

    /// Daily scan marking overdue unmet goals as failed.
    ///
    /// Runs the full recompute per goal so a goal that actually reached its
    /// target completes rather than fails. Per-item failures are logged and
    /// skipped. Returns the number of goals processed without error.
    pub async fn sweep_expired(&self) -> AppResult<usize> {
        let overdue = self.goals.expired_in_progress(self.clock.today()).await?;
        let mut processed = 0;
        for goal in overdue {
            match self.recompute(&goal).await {
                Ok(()) => processed += 1,
                Err(e) => warn!(goal = %goal.id, error = %e, "goal expiry sweep item failed"),
            }
        }
        Ok(processed)
    }

    /// Best-effort status-transition notification; never rolls back state.
    async fn announce(&self, goal: &Goal, status: GoalStatus) {
        let (kind, message) = match status {
            GoalStatus::Completed => (
                NotificationKind::GoalCompleted,
                format!("Congratulations! You reached your goal '{}'.", goal.name),
            ),
            GoalStatus::Failed => (
                NotificationKind::GoalFailed,
                format!(
                    "Your goal '{}' passed its target date without being reached.",
                    goal.name
                ),
            ),
            GoalStatus::InProgress => return, // silent re-open
        };
        let link = format!("/goals/{}", goal.id);
        if let Err(e) = self
            .notifier
            .notify(goal.user_id, kind, &message, Some(&link))
            .await
        {
            warn!(goal = %goal.id, error = %e, "goal notification delivery failed");
        }
    }
}
