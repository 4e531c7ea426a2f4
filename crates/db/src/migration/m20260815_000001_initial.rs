//! Initial database migration.
//!
//! Creates the enums, tables, and indexes for transactions, budgets, goals,
//! and notifications.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(GOALS_SQL).await?;
        db.execute_unprepared(TRANSACTIONS_SQL).await?;
        db.execute_unprepared(BUDGETS_SQL).await?;
        db.execute_unprepared(BUDGET_CATEGORIES_SQL).await?;
        db.execute_unprepared(NOTIFICATIONS_SQL).await?;
        db.execute_unprepared(INDEXES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE transaction_kind AS ENUM ('income', 'expense');
CREATE TYPE goal_status AS ENUM ('in_progress', 'completed', 'failed');
CREATE TYPE notification_kind AS ENUM ('budget_alert', 'goal_completed', 'goal_failed');
";

const GOALS_SQL: &str = r"
CREATE TABLE goals (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL,
    name TEXT NOT NULL,
    target_amount NUMERIC(20, 4) NOT NULL CHECK (target_amount > 0),
    currency VARCHAR(8) NOT NULL,
    creation_rate NUMERIC(20, 8) NOT NULL CHECK (creation_rate > 0),
    target_base_amount NUMERIC(20, 4) NOT NULL CHECK (target_base_amount > 0),
    current_base_amount NUMERIC(20, 4) NOT NULL DEFAULT 0,
    target_date DATE NOT NULL,
    status goal_status NOT NULL DEFAULT 'in_progress',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL,
    kind transaction_kind NOT NULL,
    amount NUMERIC(20, 4) NOT NULL CHECK (amount > 0),
    category TEXT NOT NULL,
    -- NULL marks a recurring template
    occurred_on DATE,
    currency VARCHAR(8) NOT NULL,
    exchange_rate NUMERIC(20, 8) NOT NULL CHECK (exchange_rate > 0),
    goal_id UUID REFERENCES goals(id) ON DELETE SET NULL,
    recurring_group UUID,
    recurring_day SMALLINT CHECK (recurring_day BETWEEN 1 AND 31),
    note TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    -- a template must carry its trigger day
    CONSTRAINT template_has_day CHECK (occurred_on IS NOT NULL OR recurring_day IS NOT NULL)
);
";

const BUDGETS_SQL: &str = r"
CREATE TABLE budgets (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL,
    year INTEGER NOT NULL,
    month SMALLINT NOT NULL CHECK (month BETWEEN 1 AND 12),
    amount NUMERIC(20, 4) NOT NULL CHECK (amount > 0),
    currency VARCHAR(8) NOT NULL,
    base_amount NUMERIC(20, 4) NOT NULL CHECK (base_amount > 0),
    alert_level SMALLINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT budgets_user_month_unique UNIQUE (user_id, year, month)
);
";

const BUDGET_CATEGORIES_SQL: &str = r"
CREATE TABLE budget_categories (
    id UUID PRIMARY KEY,
    budget_id UUID NOT NULL REFERENCES budgets(id) ON DELETE CASCADE,
    category TEXT NOT NULL,
    amount NUMERIC(20, 4) NOT NULL CHECK (amount > 0),
    base_amount NUMERIC(20, 4) NOT NULL CHECK (base_amount > 0),
    alert_level SMALLINT NOT NULL DEFAULT 0,
    CONSTRAINT budget_categories_unique UNIQUE (budget_id, category)
);
";

const NOTIFICATIONS_SQL: &str = r"
CREATE TABLE notifications (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL,
    kind notification_kind NOT NULL,
    message TEXT NOT NULL,
    link TEXT,
    is_read BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const INDEXES_SQL: &str = r"
CREATE INDEX idx_transactions_user_date ON transactions (user_id, occurred_on);
CREATE INDEX idx_transactions_goal ON transactions (goal_id) WHERE goal_id IS NOT NULL;
CREATE INDEX idx_transactions_recurring ON transactions (recurring_group)
    WHERE recurring_group IS NOT NULL;
CREATE INDEX idx_transactions_templates ON transactions (user_id) WHERE occurred_on IS NULL;
CREATE INDEX idx_goals_expiry ON goals (status, target_date);
CREATE INDEX idx_notifications_user ON notifications (user_id, created_at);
-- backs the duplicate suppression in the notification sink; UNIQUE so two
-- concurrent identical triggers cannot both insert
CREATE UNIQUE INDEX idx_notifications_dedup ON notifications (user_id, kind, message);
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS notifications CASCADE;
DROP TABLE IF EXISTS budget_categories CASCADE;
DROP TABLE IF EXISTS budgets CASCADE;
DROP TABLE IF EXISTS transactions CASCADE;
DROP TABLE IF EXISTS goals CASCADE;

DROP TYPE IF EXISTS notification_kind CASCADE;
DROP TYPE IF EXISTS goal_status CASCADE;
DROP TYPE IF EXISTS transaction_kind CASCADE;
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_dedup_index_is_unique() {
        // The sink treats a unique-violation on insert as suppression, so
        // this index must stay UNIQUE.
        assert!(INDEXES_SQL
            .contains("CREATE UNIQUE INDEX idx_notifications_dedup ON notifications (user_id, kind, message)"));
    }

    #[test]
    fn test_drop_order_reverses_creation() {
        let tables = ["notifications", "budget_categories", "budgets", "transactions", "goals"];
        let mut last = 0;
        for table in tables {
            let pos = DROP_SQL
                .find(&format!("DROP TABLE IF EXISTS {table} "))
                .unwrap();
            assert!(pos >= last, "{table} dropped out of order");
            last = pos;
        }
    }
}
