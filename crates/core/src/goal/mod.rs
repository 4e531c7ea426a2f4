//! Savings goals and progress recomputation.

pub mod progress;
pub mod service;
pub mod store;
pub mod types;

pub use progress::GoalProgressEngine;
pub use service::{CreateGoalInput, GoalService};
pub use store::GoalStore;
pub use types::{Goal, GoalStatus, NewGoal, derive_status};
