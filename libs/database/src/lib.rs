//! Database library providing the PostgreSQL connector and shared utilities
//! for the inventory workspace.
//!
//! The inventory catalog lives in an existing PostgreSQL database; this crate
//! owns connection pooling, health checking, and the generic retry helper
//! used for flaky external calls (database connections, embedding providers).
//!
//! # Example
//!
//! ```ignore
//! use database::postgres::{self, PostgresConfig};
//!
//! let config = PostgresConfig::from_env()?;
//! let db = postgres::connect_from_config(config).await?;
//! ```

pub mod common;
pub mod postgres;

// Re-exports for convenience
pub use common::{retry, retry_with_backoff, DatabaseError, DatabaseResult, RetryConfig};
