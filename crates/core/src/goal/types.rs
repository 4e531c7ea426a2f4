//! Goal data types.

use chrono::NaiveDate;
use fintra_shared::types::{GoalId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a savings goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    /// Still being saved toward.
    InProgress,
    /// Target amount reached.
    Completed,
    /// Target date passed unmet.
    Failed,
}

/// A savings target with a deadline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// Goal ID.
    pub id: GoalId,
    /// Owning user.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// Target as entered by the user.
    pub target_amount: Decimal,
    /// Currency the target was entered in.
    pub currency: String,
    /// Exchange rate frozen at creation time.
    pub creation_rate: Decimal,
    /// Target converted to the base currency at creation.
    pub target_base_amount: Decimal,
    /// Accumulated base-currency amount (full-recompute authority).
    pub current_base_amount: Decimal,
    /// Deadline for reaching the target.
    pub target_date: NaiveDate,
    /// Derived lifecycle status.
    pub status: GoalStatus,
}

/// Fields for inserting a goal.
#[derive(Debug, Clone)]
pub struct NewGoal {
    /// Owning user.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// Target as entered by the user.
    pub target_amount: Decimal,
    /// Currency the target is entered in.
    pub currency: String,
    /// Exchange rate frozen at creation time.
    pub creation_rate: Decimal,
    /// Target converted to the base currency.
    pub target_base_amount: Decimal,
    /// Deadline for reaching the target.
    pub target_date: NaiveDate,
}

/// Status as a pure function of (accumulated vs target, deadline vs today).
///
/// Reaching the target wins over an expired deadline.
#[must_use]
pub fn derive_status(
    current: Decimal,
    target: Decimal,
    target_date: NaiveDate,
    today: NaiveDate,
) -> GoalStatus {
    if current >= target {
        GoalStatus::Completed
    } else if target_date < today {
        GoalStatus::Failed
    } else {
        GoalStatus::InProgress
    }
}
