//! Goal create/delete operations.

use chrono::NaiveDate;
use fintra_shared::types::{GoalId, UserId};
use fintra_shared::{AppError, AppResult};
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::clock::Clock;
use crate::currency::{CurrencyConverter, convert_amount};

use super::store::GoalStore;
use super::types::{Goal, NewGoal};

/// Input for creating a savings goal.
#[derive(Debug, Clone)]
pub struct CreateGoalInput {
    /// Owning user.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// Target amount in the entered currency.
    pub target_amount: Decimal,
    /// Currency the target is entered in.
    pub currency: String,
    /// Deadline for reaching the target.
    pub target_date: NaiveDate,
}

/// Creates and deletes goals; freezes the creation exchange rate.
#[derive(Clone)]
pub struct GoalService {
    goals: Arc<dyn GoalStore>,
    converter: CurrencyConverter,
    clock: Arc<dyn Clock>,
}

impl GoalService {
    /// Creates the service with its collaborators.
    #[must_use]
    pub fn new(
        goals: Arc<dyn GoalStore>,
        converter: CurrencyConverter,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            goals,
            converter,
            clock,
        }
    }

    /// Creates a goal. The exchange rate is looked up once here and frozen;
    /// later rate movements never change the base-currency target.
    ///
    /// # Errors
    ///
    /// `Validation` for a non-positive target or a deadline already in the
    /// past; conversion failures propagate and reject the write.
    pub async fn create(&self, input: CreateGoalInput) -> AppResult<Goal> {
        if input.target_amount <= Decimal::ZERO {
            return Err(AppError::Validation(
                "goal target must be positive".to_string(),
            ));
        }
        if input.target_date < self.clock.today() {
            return Err(AppError::Validation(
                "goal target date must not be in the past".to_string(),
            ));
        }

        let creation_rate = self.converter.rate_to_base(&input.currency).await?;
        self.goals
            .insert(NewGoal {
                user_id: input.user_id,
                name: input.name,
                target_base_amount: convert_amount(input.target_amount, creation_rate),
                target_amount: input.target_amount,
                currency: input.currency,
                creation_rate,
                target_date: input.target_date,
            })
            .await
    }

    /// Deletes a goal. Links from transactions are cleared, the transactions
    /// themselves are kept; the store does both atomically.
    ///
    /// # Errors
    ///
    /// `NotFound` if the goal does not exist.
    pub async fn delete(&self, id: GoalId) -> AppResult<()> {
        if !self.goals.delete(id).await? {
            return Err(AppError::NotFound(format!("goal {id}")));
        }
        Ok(())
    }
}
