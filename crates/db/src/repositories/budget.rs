//! Budget repository.

use std::collections::HashMap;

use async_trait::async_trait;
use fintra_core::budget::{AlertLevel, Budget, BudgetStore, CategoryBudget, NewBudget};
use fintra_shared::types::{BudgetId, MonthKey, UserId};
use fintra_shared::{AppError, AppResult};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use super::db_err;
use crate::entities::{budget_categories, budgets};

/// `BudgetStore` implementation over Postgres.
#[derive(Debug, Clone)]
pub struct BudgetRepository {
    db: DatabaseConnection,
}

impl BudgetRepository {
    /// Creates a new budget repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn load_categories<C: ConnectionTrait>(
        conn: &C,
        budget: Uuid,
    ) -> AppResult<Vec<budget_categories::Model>> {
        budget_categories::Entity::find()
            .filter(budget_categories::Column::BudgetId.eq(budget))
            .all(conn)
            .await
            .map_err(db_err)
    }
}

fn to_domain(
    model: budgets::Model,
    categories: Vec<budget_categories::Model>,
) -> AppResult<Budget> {
    let month = u8::try_from(model.month)
        .ok()
        .and_then(|m| MonthKey::new(model.year, m))
        .ok_or_else(|| {
            AppError::Database(format!(
                "budget {} has invalid month {}-{}",
                model.id, model.year, model.month
            ))
        })?;
    Ok(Budget {
        id: BudgetId::from_uuid(model.id),
        user_id: UserId::from_uuid(model.user_id),
        month,
        amount: model.amount,
        currency: model.currency,
        base_amount: model.base_amount,
        alert_level: AlertLevel::from_threshold(model.alert_level),
        categories: categories
            .into_iter()
            .map(|c| CategoryBudget {
                category: c.category,
                amount: c.amount,
                base_amount: c.base_amount,
                alert_level: AlertLevel::from_threshold(c.alert_level),
            })
            .collect(),
    })
}

#[async_trait]
impl BudgetStore for BudgetRepository {
    async fn upsert(&self, budget: NewBudget) -> AppResult<Budget> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let now: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();

        let existing = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(budget.user_id.into_inner()))
            .filter(budgets::Column::Year.eq(budget.month.year()))
            .filter(budgets::Column::Month.eq(i16::from(budget.month.month())))
            .one(&txn)
            .await
            .map_err(db_err)?;

        // Only the alert engine mutates levels; an edit keeps the previous
        // overall level and the per-category levels matched by name.
        let (budget_id, previous_levels) = match existing {
            Some(row) => {
                let previous: HashMap<String, i16> = Self::load_categories(&txn, row.id)
                    .await?
                    .into_iter()
                    .map(|c| (c.category, c.alert_level))
                    .collect();

                budget_categories::Entity::delete_many()
                    .filter(budget_categories::Column::BudgetId.eq(row.id))
                    .exec(&txn)
                    .await
                    .map_err(db_err)?;

                let id = row.id;
                let mut active: budgets::ActiveModel = row.into();
                active.amount = Set(budget.amount);
                active.currency = Set(budget.currency.clone());
                active.base_amount = Set(budget.base_amount);
                active.updated_at = Set(now);
                active.update(&txn).await.map_err(db_err)?;

                (id, previous)
            }
            None => {
                let id = BudgetId::new().into_inner();
                budgets::ActiveModel {
                    id: Set(id),
                    user_id: Set(budget.user_id.into_inner()),
                    year: Set(budget.month.year()),
                    month: Set(i16::from(budget.month.month())),
                    amount: Set(budget.amount),
                    currency: Set(budget.currency.clone()),
                    base_amount: Set(budget.base_amount),
                    alert_level: Set(0),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&txn)
                .await
                .map_err(db_err)?;
                (id, HashMap::new())
            }
        };

        let mut stored_categories = Vec::with_capacity(budget.categories.len());
        for category in budget.categories {
            let level = previous_levels
                .get(&category.category)
                .copied()
                .unwrap_or(0);
            let row = budget_categories::ActiveModel {
                id: Set(Uuid::now_v7()),
                budget_id: Set(budget_id),
                category: Set(category.category),
                amount: Set(category.amount),
                base_amount: Set(category.base_amount),
                alert_level: Set(level),
            }
            .insert(&txn)
            .await
            .map_err(db_err)?;
            stored_categories.push(row);
        }

        let stored = budgets::Entity::find_by_id(budget_id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| AppError::Database("budget vanished during upsert".to_string()))?;
        txn.commit().await.map_err(db_err)?;

        to_domain(stored, stored_categories)
    }

    async fn find_for_month(&self, user: UserId, month: MonthKey) -> AppResult<Option<Budget>> {
        let Some(row) = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user.into_inner()))
            .filter(budgets::Column::Year.eq(month.year()))
            .filter(budgets::Column::Month.eq(i16::from(month.month())))
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };
        let categories = Self::load_categories(&self.db, row.id).await?;
        to_domain(row, categories).map(Some)
    }

    async fn users_with_budget(&self, month: MonthKey) -> AppResult<Vec<UserId>> {
        let users: Vec<Uuid> = budgets::Entity::find()
            .select_only()
            .column(budgets::Column::UserId)
            .distinct()
            .filter(budgets::Column::Year.eq(month.year()))
            .filter(budgets::Column::Month.eq(i16::from(month.month())))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(users.into_iter().map(UserId::from_uuid).collect())
    }

    async fn set_overall_level(&self, budget: BudgetId, level: AlertLevel) -> AppResult<()> {
        budgets::Entity::update_many()
            .col_expr(
                budgets::Column::AlertLevel,
                Expr::value(i16::from(level.threshold())),
            )
            .col_expr(budgets::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(budgets::Column::Id.eq(budget.into_inner()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn set_category_level(
        &self,
        budget: BudgetId,
        category: &str,
        level: AlertLevel,
    ) -> AppResult<()> {
        budget_categories::Entity::update_many()
            .col_expr(
                budget_categories::Column::AlertLevel,
                Expr::value(i16::from(level.threshold())),
            )
            .filter(budget_categories::Column::BudgetId.eq(budget.into_inner()))
            .filter(budget_categories::Column::Category.eq(category))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn delete_for_month(&self, user: UserId, month: MonthKey) -> AppResult<bool> {
        // Categories go with the budget via ON DELETE CASCADE.
        let result = budgets::Entity::delete_many()
            .filter(budgets::Column::UserId.eq(user.into_inner()))
            .filter(budgets::Column::Year.eq(month.year()))
            .filter(budgets::Column::Month.eq(i16::from(month.month())))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }
}
