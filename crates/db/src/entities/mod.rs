//! `SeaORM` entity definitions.

pub mod budget_categories;
pub mod budgets;
pub mod goals;
pub mod notifications;
pub mod sea_orm_active_enums;
pub mod transactions;
