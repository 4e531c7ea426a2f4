//! Persistence trait for transactions.

use async_trait::async_trait;
use fintra_shared::AppResult;
use fintra_shared::types::{GoalId, MonthKey, RecurringGroupId, TransactionId, UserId};

use super::types::{NewTransaction, Transaction, TransactionPatch};

/// Data access for transactions.
///
/// Implemented over Postgres in `fintra-db`; the in-memory fake in
/// this crate's tests implements the same contract.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Inserts a transaction and returns the stored record.
    async fn insert(&self, tx: NewTransaction) -> AppResult<Transaction>;

    /// Finds a transaction by ID.
    async fn find(&self, id: TransactionId) -> AppResult<Option<Transaction>>;

    /// Applies a partial update, returning the updated record or `None` if
    /// the transaction no longer exists.
    async fn update(
        &self,
        id: TransactionId,
        patch: TransactionPatch,
    ) -> AppResult<Option<Transaction>>;

    /// Deletes a transaction. Returns whether a record was removed.
    async fn delete(&self, id: TransactionId) -> AppResult<bool>;

    /// All dated expense instances for a user within a month.
    async fn expenses_in_month(
        &self,
        user: UserId,
        month: MonthKey,
    ) -> AppResult<Vec<Transaction>>;

    /// All transactions (dated or not) linked to a goal.
    async fn linked_to_goal(&self, goal: GoalId) -> AppResult<Vec<Transaction>>;

    /// All recurring templates across all users.
    async fn templates(&self) -> AppResult<Vec<Transaction>>;

    /// Whether a dated instance of the series exists within the month.
    async fn instance_exists(
        &self,
        group: RecurringGroupId,
        month: MonthKey,
    ) -> AppResult<bool>;

    /// Soft-stops a series: deletes the template and converts instances to
    /// stand-alone transactions by clearing their recurring fields.
    /// Returns the number of detached instances.
    async fn detach_series(&self, group: RecurringGroupId) -> AppResult<u64>;

    /// Deletes an entire series including history (template and instances),
    /// returning the removed records so callers can cascade aggregate
    /// recomputes.
    async fn purge_series(&self, group: RecurringGroupId) -> AppResult<Vec<Transaction>>;
}
