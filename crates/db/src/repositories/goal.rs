//! Goal repository.

use async_trait::async_trait;
use chrono::NaiveDate;
use fintra_core::goal::{Goal, GoalStatus, GoalStore, NewGoal};
use fintra_shared::AppResult;
use fintra_shared::types::{GoalId, UserId};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

use super::db_err;
use crate::entities::goals;
use crate::entities::sea_orm_active_enums::GoalStatus as DbGoalStatus;

/// `GoalStore` implementation over Postgres.
#[derive(Debug, Clone)]
pub struct GoalRepository {
    db: DatabaseConnection,
}

impl GoalRepository {
    /// Creates a new goal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_domain(model: goals::Model) -> Goal {
    Goal {
        id: GoalId::from_uuid(model.id),
        user_id: UserId::from_uuid(model.user_id),
        name: model.name,
        target_amount: model.target_amount,
        currency: model.currency,
        creation_rate: model.creation_rate,
        target_base_amount: model.target_base_amount,
        current_base_amount: model.current_base_amount,
        target_date: model.target_date,
        status: model.status.into(),
    }
}

#[async_trait]
impl GoalStore for GoalRepository {
    async fn insert(&self, goal: NewGoal) -> AppResult<Goal> {
        let now = chrono::Utc::now().into();
        let model = goals::ActiveModel {
            id: Set(GoalId::new().into_inner()),
            user_id: Set(goal.user_id.into_inner()),
            name: Set(goal.name),
            target_amount: Set(goal.target_amount),
            currency: Set(goal.currency),
            creation_rate: Set(goal.creation_rate),
            target_base_amount: Set(goal.target_base_amount),
            current_base_amount: Set(Decimal::ZERO),
            target_date: Set(goal.target_date),
            status: Set(DbGoalStatus::InProgress),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let stored = model.insert(&self.db).await.map_err(db_err)?;
        Ok(to_domain(stored))
    }

    async fn find(&self, id: GoalId) -> AppResult<Option<Goal>> {
        let found = goals::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(found.map(to_domain))
    }

    async fn save_progress(
        &self,
        id: GoalId,
        current_base_amount: Decimal,
        status: GoalStatus,
    ) -> AppResult<()> {
        goals::Entity::update_many()
            .col_expr(
                goals::Column::CurrentBaseAmount,
                Expr::value(current_base_amount),
            )
            .col_expr(goals::Column::Status, Expr::value(DbGoalStatus::from(status)))
            .col_expr(goals::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(goals::Column::Id.eq(id.into_inner()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn add_to_progress(&self, id: GoalId, delta: Decimal) -> AppResult<Option<Goal>> {
        // Single-statement increment: safe against concurrent sweeps without
        // a row lock round-trip.
        let result = goals::Entity::update_many()
            .col_expr(
                goals::Column::CurrentBaseAmount,
                Expr::col(goals::Column::CurrentBaseAmount).add(delta),
            )
            .col_expr(goals::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(goals::Column::Id.eq(id.into_inner()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find(id).await
    }

    async fn expired_in_progress(&self, today: NaiveDate) -> AppResult<Vec<Goal>> {
        let rows = goals::Entity::find()
            .filter(goals::Column::Status.eq(DbGoalStatus::InProgress))
            .filter(goals::Column::TargetDate.lt(today))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(to_domain).collect())
    }

    async fn delete(&self, id: GoalId) -> AppResult<bool> {
        // Transaction links are cleared by ON DELETE SET NULL on the
        // foreign key, in the same implicit transaction as the delete.
        let result = goals::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }
}
