//! Transaction domain model and the write pipeline.

pub mod service;
pub mod store;
pub mod types;

pub use service::{CreateTransactionInput, TransactionService};
pub use store::TransactionStore;
pub use types::{NewTransaction, Transaction, TransactionKind, TransactionPatch};
