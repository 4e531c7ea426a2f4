//! Recurring-transaction materialization and series cancellation.

pub mod sweep;

pub use sweep::{RecurringSweep, SweepReport};
