//! Transaction data types.

use chrono::NaiveDate;
use fintra_shared::types::{GoalId, RecurringGroupId, TransactionId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::currency::convert_amount;

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Money coming in.
    Income,
    /// Money going out.
    Expense,
}

/// A single income/expense event, or a recurring template.
///
/// A record with `occurred_on == None` is a *template*: the pattern a
/// recurring series is generated from. Templates never participate in spend
/// or goal aggregation; only dated instances do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction ID.
    pub id: TransactionId,
    /// Owning user.
    pub user_id: UserId,
    /// Income or expense.
    pub kind: TransactionKind,
    /// Positive amount in the entered currency.
    pub amount: Decimal,
    /// Free-form category tag.
    pub category: String,
    /// Occurrence date; `None` marks a recurring template.
    pub occurred_on: Option<NaiveDate>,
    /// Currency the amount was entered in.
    pub currency: String,
    /// Rate to the base currency, frozen at write time.
    pub exchange_rate: Decimal,
    /// Linked savings goal, if any.
    pub goal_id: Option<GoalId>,
    /// Recurring series this record belongs to.
    pub recurring_group: Option<RecurringGroupId>,
    /// Day of month (1-31) a template materializes on.
    pub recurring_day: Option<u32>,
    /// Optional free-form note.
    pub note: Option<String>,
}

impl Transaction {
    /// Value in the base currency, used for all aggregation.
    #[must_use]
    pub fn base_amount(&self) -> Decimal {
        convert_amount(self.amount, self.exchange_rate)
    }

    /// Whether this record is a recurring template rather than a dated event.
    #[must_use]
    pub const fn is_template(&self) -> bool {
        self.occurred_on.is_none()
    }

    /// Whether this record contributes to savings-goal progress.
    ///
    /// Only dated expense instances count; income and templates do not.
    #[must_use]
    pub const fn counts_toward_goal(&self) -> bool {
        matches!(self.kind, TransactionKind::Expense) && !self.is_template()
    }
}

/// Fields for inserting a transaction.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    /// Owning user.
    pub user_id: UserId,
    /// Income or expense.
    pub kind: TransactionKind,
    /// Positive amount in the entered currency.
    pub amount: Decimal,
    /// Free-form category tag.
    pub category: String,
    /// Occurrence date; `None` creates a recurring template.
    pub occurred_on: Option<NaiveDate>,
    /// Currency the amount was entered in.
    pub currency: String,
    /// Rate to the base currency.
    pub exchange_rate: Decimal,
    /// Linked savings goal, if any.
    pub goal_id: Option<GoalId>,
    /// Recurring series this record belongs to.
    pub recurring_group: Option<RecurringGroupId>,
    /// Day of month a template materializes on.
    pub recurring_day: Option<u32>,
    /// Optional free-form note.
    pub note: Option<String>,
}

/// Partial update for an existing transaction.
///
/// `None` leaves a field untouched; the double-`Option` fields distinguish
/// "leave alone" from "clear".
#[derive(Debug, Clone, Default)]
pub struct TransactionPatch {
    /// New direction.
    pub kind: Option<TransactionKind>,
    /// New amount.
    pub amount: Option<Decimal>,
    /// New category.
    pub category: Option<String>,
    /// New occurrence date.
    pub occurred_on: Option<NaiveDate>,
    /// New currency code.
    pub currency: Option<String>,
    /// New exchange rate; set by the service when the currency changes.
    pub exchange_rate: Option<Decimal>,
    /// New goal link (`Some(None)` clears it).
    pub goal_id: Option<Option<GoalId>>,
    /// New note (`Some(None)` clears it).
    pub note: Option<Option<String>>,
}
