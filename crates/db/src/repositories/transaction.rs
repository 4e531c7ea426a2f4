//! Transaction repository.

use async_trait::async_trait;
use fintra_core::transaction::{
    NewTransaction, Transaction, TransactionPatch, TransactionStore,
};
use fintra_shared::AppResult;
use fintra_shared::types::{
    GoalId, MonthKey, RecurringGroupId, TransactionId, UserId,
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set, TransactionTrait,
};
use uuid::Uuid;

use super::db_err;
use crate::entities::sea_orm_active_enums::TransactionKind as DbTransactionKind;
use crate::entities::transactions;

/// `TransactionStore` implementation over Postgres.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_domain(model: transactions::Model) -> Transaction {
    Transaction {
        id: TransactionId::from_uuid(model.id),
        user_id: UserId::from_uuid(model.user_id),
        kind: model.kind.into(),
        amount: model.amount,
        category: model.category,
        occurred_on: model.occurred_on,
        currency: model.currency,
        exchange_rate: model.exchange_rate,
        goal_id: model.goal_id.map(GoalId::from_uuid),
        recurring_group: model.recurring_group.map(RecurringGroupId::from_uuid),
        recurring_day: model.recurring_day.and_then(|d| u32::try_from(d).ok()),
        note: model.note,
    }
}

#[async_trait]
impl TransactionStore for TransactionRepository {
    async fn insert(&self, tx: NewTransaction) -> AppResult<Transaction> {
        let now = chrono::Utc::now().into();
        let model = transactions::ActiveModel {
            id: Set(TransactionId::new().into_inner()),
            user_id: Set(tx.user_id.into_inner()),
            kind: Set(tx.kind.into()),
            amount: Set(tx.amount),
            category: Set(tx.category),
            occurred_on: Set(tx.occurred_on),
            currency: Set(tx.currency),
            exchange_rate: Set(tx.exchange_rate),
            goal_id: Set(tx.goal_id.map(GoalId::into_inner)),
            recurring_group: Set(tx.recurring_group.map(RecurringGroupId::into_inner)),
            recurring_day: Set(tx.recurring_day.and_then(|d| i16::try_from(d).ok())),
            note: Set(tx.note),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let stored = model.insert(&self.db).await.map_err(db_err)?;
        Ok(to_domain(stored))
    }

    async fn find(&self, id: TransactionId) -> AppResult<Option<Transaction>> {
        let found = transactions::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(found.map(to_domain))
    }

    async fn update(
        &self,
        id: TransactionId,
        patch: TransactionPatch,
    ) -> AppResult<Option<Transaction>> {
        let Some(existing) = transactions::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        let mut active: transactions::ActiveModel = existing.into();
        if let Some(kind) = patch.kind {
            active.kind = Set(kind.into());
        }
        if let Some(amount) = patch.amount {
            active.amount = Set(amount);
        }
        if let Some(category) = patch.category {
            active.category = Set(category);
        }
        if let Some(occurred_on) = patch.occurred_on {
            active.occurred_on = Set(Some(occurred_on));
        }
        if let Some(currency) = patch.currency {
            active.currency = Set(currency);
        }
        if let Some(rate) = patch.exchange_rate {
            active.exchange_rate = Set(rate);
        }
        if let Some(goal_id) = patch.goal_id {
            active.goal_id = Set(goal_id.map(GoalId::into_inner));
        }
        if let Some(note) = patch.note {
            active.note = Set(note);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active.update(&self.db).await.map_err(db_err)?;
        Ok(Some(to_domain(updated)))
    }

    async fn delete(&self, id: TransactionId) -> AppResult<bool> {
        let result = transactions::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn expenses_in_month(
        &self,
        user: UserId,
        month: MonthKey,
    ) -> AppResult<Vec<Transaction>> {
        let rows = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user.into_inner()))
            .filter(transactions::Column::Kind.eq(DbTransactionKind::Expense))
            .filter(transactions::Column::OccurredOn.between(month.first_day(), month.last_day()))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(to_domain).collect())
    }

    async fn linked_to_goal(&self, goal: GoalId) -> AppResult<Vec<Transaction>> {
        let rows = transactions::Entity::find()
            .filter(transactions::Column::GoalId.eq(goal.into_inner()))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(to_domain).collect())
    }

    async fn templates(&self) -> AppResult<Vec<Transaction>> {
        let rows = transactions::Entity::find()
            .filter(transactions::Column::OccurredOn.is_null())
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(to_domain).collect())
    }

    async fn instance_exists(
        &self,
        group: RecurringGroupId,
        month: MonthKey,
    ) -> AppResult<bool> {
        let count = transactions::Entity::find()
            .filter(transactions::Column::RecurringGroup.eq(group.into_inner()))
            .filter(transactions::Column::OccurredOn.between(month.first_day(), month.last_day()))
            .count(&self.db)
            .await
            .map_err(db_err)?;
        Ok(count > 0)
    }

    async fn detach_series(&self, group: RecurringGroupId) -> AppResult<u64> {
        let txn = self.db.begin().await.map_err(db_err)?;

        transactions::Entity::delete_many()
            .filter(transactions::Column::RecurringGroup.eq(group.into_inner()))
            .filter(transactions::Column::OccurredOn.is_null())
            .exec(&txn)
            .await
            .map_err(db_err)?;

        let detached = transactions::Entity::update_many()
            .col_expr(transactions::Column::RecurringGroup, Expr::value(None::<Uuid>))
            .col_expr(transactions::Column::RecurringDay, Expr::value(None::<i16>))
            .filter(transactions::Column::RecurringGroup.eq(group.into_inner()))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(detached.rows_affected)
    }

    async fn purge_series(&self, group: RecurringGroupId) -> AppResult<Vec<Transaction>> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let removed = transactions::Entity::find()
            .filter(transactions::Column::RecurringGroup.eq(group.into_inner()))
            .all(&txn)
            .await
            .map_err(db_err)?;

        transactions::Entity::delete_many()
            .filter(transactions::Column::RecurringGroup.eq(group.into_inner()))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(removed.into_iter().map(to_domain).collect())
    }
}
