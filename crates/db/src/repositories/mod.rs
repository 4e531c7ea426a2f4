//! Repository implementations of the `fintra-core` persistence traits.
//!
//! Each repository owns a connection handle and hides every `SeaORM` detail
//! from the engines, which only ever see the trait objects.

pub mod budget;
pub mod goal;
pub mod notification;
pub mod transaction;

pub use budget::BudgetRepository;
pub use goal::GoalRepository;
pub use notification::{NotificationEvent, NotificationRepository};
pub use transaction::TransactionRepository;

use fintra_shared::AppError;
use sea_orm::DbErr;

/// Maps a driver error into the application error space.
pub(crate) fn db_err(err: DbErr) -> AppError {
    AppError::Database(err.to_string())
}
