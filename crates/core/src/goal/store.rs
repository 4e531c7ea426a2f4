//! Persistence trait for goals.

use async_trait::async_trait;
use chrono::NaiveDate;
use fintra_shared::AppResult;
use fintra_shared::types::GoalId;
use rust_decimal::Decimal;

use super::types::{Goal, GoalStatus, NewGoal};

/// Data access for savings goals.
#[async_trait]
pub trait GoalStore: Send + Sync {
    /// Inserts a goal and returns the stored record.
    async fn insert(&self, goal: NewGoal) -> AppResult<Goal>;

    /// Finds a goal by ID.
    async fn find(&self, id: GoalId) -> AppResult<Option<Goal>>;

    /// Persists a recomputed accumulated amount and status.
    async fn save_progress(
        &self,
        id: GoalId,
        current_base_amount: Decimal,
        status: GoalStatus,
    ) -> AppResult<()>;

    /// Atomically adds `delta` to the accumulated amount, returning the
    /// updated goal or `None` if it no longer exists.
    ///
    /// Single-row atomic update: safe against concurrent sweeps without any
    /// explicit locking.
    async fn add_to_progress(&self, id: GoalId, delta: Decimal) -> AppResult<Option<Goal>>;

    /// In-progress goals whose target date lies strictly before `today`.
    async fn expired_in_progress(&self, today: NaiveDate) -> AppResult<Vec<Goal>>;

    /// Deletes a goal, clearing the goal link on every referencing
    /// transaction in the same storage transaction. Returns whether the goal
    /// existed.
    async fn delete(&self, id: GoalId) -> AppResult<bool>;
}
