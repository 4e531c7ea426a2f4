//! Core business logic for Fintra.
//!
//! This crate contains the consistency engines that keep derived aggregates
//! (budget alert levels, goal progress) in sync with the transaction history,
//! plus the recurring-transaction sweep and currency conversion. Persistence
//! and notification delivery are reached only through traits; implementations
//! live in `fintra-db`.
//!
//! # Modules
//!
//! - `transaction` - Transaction domain model and the write pipeline
//! - `budget` - Monthly budgets and threshold alerting
//! - `goal` - Savings goals and progress recomputation
//! - `recurring` - Recurring-transaction materialization
//! - `currency` - Multi-currency conversion with a cached rate table
//! - `notification` - Notification kinds and the sink trait
//! - `clock` - Injectable time source for date-sensitive logic

pub mod budget;
pub mod clock;
pub mod currency;
pub mod goal;
pub mod notification;
pub mod recurring;
pub mod transaction;

#[cfg(test)]
pub(crate) mod testing;
