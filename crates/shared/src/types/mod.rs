//! Common types used across the application.

pub mod id;
pub mod month;

pub use id::{BudgetId, GoalId, NotificationId, RecurringGroupId, TransactionId, UserId};
pub use month::MonthKey;
