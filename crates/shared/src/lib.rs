//! Shared types, errors, and configuration for Fintra.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Calendar-month keys for monthly aggregation windows
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
