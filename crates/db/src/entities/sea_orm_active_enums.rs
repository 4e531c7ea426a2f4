//! Postgres enum mappings and their conversions to the domain enums.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Direction of a transaction (`transaction_kind` in Postgres).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_kind")]
pub enum TransactionKind {
    /// Money coming in.
    #[sea_orm(string_value = "income")]
    Income,
    /// Money going out.
    #[sea_orm(string_value = "expense")]
    Expense,
}

impl From<fintra_core::transaction::TransactionKind> for TransactionKind {
    fn from(kind: fintra_core::transaction::TransactionKind) -> Self {
        match kind {
            fintra_core::transaction::TransactionKind::Income => Self::Income,
            fintra_core::transaction::TransactionKind::Expense => Self::Expense,
        }
    }
}

impl From<TransactionKind> for fintra_core::transaction::TransactionKind {
    fn from(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::Income => Self::Income,
            TransactionKind::Expense => Self::Expense,
        }
    }
}

/// Lifecycle state of a savings goal (`goal_status` in Postgres).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "goal_status")]
pub enum GoalStatus {
    /// Still being saved toward.
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    /// Target amount reached.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Target date passed unmet.
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl From<fintra_core::goal::GoalStatus> for GoalStatus {
    fn from(status: fintra_core::goal::GoalStatus) -> Self {
        match status {
            fintra_core::goal::GoalStatus::InProgress => Self::InProgress,
            fintra_core::goal::GoalStatus::Completed => Self::Completed,
            fintra_core::goal::GoalStatus::Failed => Self::Failed,
        }
    }
}

impl From<GoalStatus> for fintra_core::goal::GoalStatus {
    fn from(status: GoalStatus) -> Self {
        match status {
            GoalStatus::InProgress => Self::InProgress,
            GoalStatus::Completed => Self::Completed,
            GoalStatus::Failed => Self::Failed,
        }
    }
}

/// Kind of a user-facing notification (`notification_kind` in Postgres).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "notification_kind")]
pub enum NotificationKind {
    /// A budget usage threshold was crossed upward.
    #[sea_orm(string_value = "budget_alert")]
    BudgetAlert,
    /// A savings goal reached its target amount.
    #[sea_orm(string_value = "goal_completed")]
    GoalCompleted,
    /// A savings goal passed its target date unmet.
    #[sea_orm(string_value = "goal_failed")]
    GoalFailed,
}

impl From<fintra_core::notification::NotificationKind> for NotificationKind {
    fn from(kind: fintra_core::notification::NotificationKind) -> Self {
        match kind {
            fintra_core::notification::NotificationKind::BudgetAlert => Self::BudgetAlert,
            fintra_core::notification::NotificationKind::GoalCompleted => Self::GoalCompleted,
            fintra_core::notification::NotificationKind::GoalFailed => Self::GoalFailed,
        }
    }
}
