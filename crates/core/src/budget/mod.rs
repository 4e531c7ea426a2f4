//! Monthly budgets and threshold alerting.

pub mod alert;
pub mod service;
pub mod store;
pub mod types;

#[cfg(test)]
mod props;

pub use alert::BudgetAlertEngine;
pub use service::{BudgetService, SetBudgetInput, SetCategoryInput};
pub use store::BudgetStore;
pub use types::{AlertLevel, Budget, CategoryBudget, NewBudget, NewCategoryBudget};
