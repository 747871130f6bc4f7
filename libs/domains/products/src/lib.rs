//! Products Domain Library
//!
//! Read-only access to the inventory product catalog. The catalog is owned
//! by the inventory system; this crate exposes the product fields the
//! semantic search core needs (identity, active flag, and the text fields
//! that feed embedding generation) and never writes product data.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │  ProductRepository   │  ← trait (read-only port)
//! └──────────┬───────────┘
//!            │
//! ┌──────────▼───────────┐   ┌──────────────────────────┐
//! │ PgProductRepository  │   │ InMemoryProductRepository │
//! │ (existing `productos`│   │ (development/testing)     │
//! │  table via SeaORM)   │   └──────────────────────────┘
//! └──────────────────────┘
//! ```

pub mod entity;
pub mod error;
pub mod models;
pub mod postgres;
pub mod repository;

// Re-export commonly used types
pub use error::{ProductError, ProductResult};
pub use models::Product;
pub use postgres::PgProductRepository;
pub use repository::{InMemoryProductRepository, ProductRepository};
