//! PostgreSQL database connector and utilities
//!
//! Provides connection management and health checks for the inventory
//! database. The product tables are owned by the inventory system; this
//! workspace only reads them, so no migration tooling lives here.

mod config;
mod connector;
mod health;

pub use config::PostgresConfig;
pub use connector::{
    connect, connect_from_config, connect_from_config_with_retry, connect_with_options,
};
pub use health::{check_health, check_health_detailed, HealthStatus};

// Re-export SeaORM types for convenience
pub use sea_orm::{ConnectOptions, DatabaseConnection, DbErr};
