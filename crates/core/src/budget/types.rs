//! Budget data types.

use fintra_shared::types::{BudgetId, MonthKey, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The highest budget-usage band already notified for a scope.
///
/// Levels are ordered, so "computed > stored" is an upward crossing. A level
/// tracks the *last observed* percentage, not a historical maximum: it drops
/// when spend drops, which re-arms the threshold for a future re-crossing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    /// Below every threshold.
    None,
    /// At least 80% of the budget is spent.
    Pct80,
    /// At least 90% of the budget is spent.
    Pct90,
    /// The budget is fully used or exceeded.
    Pct100,
}

impl AlertLevel {
    /// Maps an observed usage percentage to its band.
    ///
    /// Checks descend strictly, first match wins, so a single observation
    /// can never report two thresholds.
    #[must_use]
    pub fn from_percent(percent: Decimal) -> Self {
        if percent >= Decimal::ONE_HUNDRED {
            Self::Pct100
        } else if percent >= Decimal::from(90) {
            Self::Pct90
        } else if percent >= Decimal::from(80) {
            Self::Pct80
        } else {
            Self::None
        }
    }

    /// The band's threshold percentage (0, 80, 90, or 100).
    #[must_use]
    pub const fn threshold(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Pct80 => 80,
            Self::Pct90 => 90,
            Self::Pct100 => 100,
        }
    }

    /// Rebuilds a level from its stored threshold value.
    ///
    /// Unknown values collapse to `None`, matching a never-notified scope.
    #[must_use]
    pub const fn from_threshold(value: i16) -> Self {
        match value {
            80 => Self::Pct80,
            90 => Self::Pct90,
            100 => Self::Pct100,
            _ => Self::None,
        }
    }
}

/// A user's budget for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// Budget ID.
    pub id: BudgetId,
    /// Owning user.
    pub user_id: UserId,
    /// The month this budget covers.
    pub month: MonthKey,
    /// Total as entered by the user.
    pub amount: Decimal,
    /// Currency the budget was entered in.
    pub currency: String,
    /// Total converted to the base currency.
    pub base_amount: Decimal,
    /// Highest overall threshold already notified.
    pub alert_level: AlertLevel,
    /// Per-category sub-budgets.
    pub categories: Vec<CategoryBudget>,
}

/// A per-category sub-budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBudget {
    /// Category tag this limit applies to.
    pub category: String,
    /// Limit as entered by the user.
    pub amount: Decimal,
    /// Limit converted to the base currency.
    pub base_amount: Decimal,
    /// Highest threshold already notified for this category.
    pub alert_level: AlertLevel,
}

/// Fields for upserting a budget.
#[derive(Debug, Clone)]
pub struct NewBudget {
    /// Owning user.
    pub user_id: UserId,
    /// The month this budget covers.
    pub month: MonthKey,
    /// Total as entered by the user.
    pub amount: Decimal,
    /// Currency the budget is entered in.
    pub currency: String,
    /// Total converted to the base currency.
    pub base_amount: Decimal,
    /// Per-category sub-budgets.
    pub categories: Vec<NewCategoryBudget>,
}

/// Fields for one category inside a budget upsert.
#[derive(Debug, Clone)]
pub struct NewCategoryBudget {
    /// Category tag.
    pub category: String,
    /// Limit as entered by the user.
    pub amount: Decimal,
    /// Limit converted to the base currency.
    pub base_amount: Decimal,
}
