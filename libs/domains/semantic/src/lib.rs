//! Semantic Search Domain Library
//!
//! Embedding generation and vector-similarity retrieval for the product
//! catalog: keeps one embedding per product in sync with the product's
//! descriptive text, and ranks products by cosine similarity to a free-text
//! query.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────┐      ┌───────────────────────┐
//! │ EmbeddingSynchronizer │      │ SemanticSearchService │
//! │  (batch, write path)  │      │  (on-demand, read)    │
//! └─────┬──────────┬──────┘      └─────┬──────────┬──────┘
//!       │          │                   │          │
//! ┌─────▼──────┐ ┌─▼───────────────────▼──┐ ┌─────▼──────────────┐
//! │ Product    │ │    EmbeddingStore      │ │ EmbeddingProvider  │
//! │ Repository │ │      (trait)           │ │     (trait)        │
//! │ (read-only)│ └─┬──────────────────────┘ └─┬──────────────────┘
//! └────────────┘   │                          │
//!        ┌─────────▼────────────┐   ┌─────────▼───────┐
//!        │ QdrantEmbeddingStore │   │ OllamaProvider  │
//!        │ InMemoryEmbeddingStore│  │ OpenAIProvider  │
//!        └──────────────────────┘   └─────────────────┘
//! ```
//!
//! The synchronizer and the search service never depend on each other; both
//! depend on the same provider so query-time and index-time embeddings come
//! from the same model. The model identity is recorded with every stored
//! embedding and checked at search time.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domain_products::PgProductRepository;
//! use domain_semantic::{
//!     EmbeddingSynchronizer, OllamaProvider, QdrantConfig, QdrantEmbeddingStore,
//!     SemanticSearchService, SyncConfig,
//! };
//!
//! # async fn example(db: sea_orm::DatabaseConnection) -> Result<(), Box<dyn std::error::Error>> {
//! let products = Arc::new(PgProductRepository::new(db));
//! let provider = Arc::new(OllamaProvider::from_env()?);
//! let store = Arc::new(QdrantEmbeddingStore::new(QdrantConfig::from_env()?).await?);
//! store.ensure_collection().await?;
//!
//! let config = SyncConfig::default();
//! let model = config.model.clone();
//!
//! let synchronizer =
//!     EmbeddingSynchronizer::new(store.clone(), products.clone(), provider.clone(), config);
//! let report = synchronizer.sync_all().await?;
//! println!("updated={} skipped={} failed={}", report.updated, report.skipped, report.failed.len());
//!
//! let search = SemanticSearchService::new(store, products, provider, model);
//! for hit in search.search("computadora portátil", 5).await? {
//!     println!("{} {:.4}", hit.product.code, hit.score);
//! }
//! # Ok(())
//! # }
//! ```

pub mod embedding;
pub mod error;
pub mod models;
pub mod qdrant;
pub mod repository;
pub mod search;
pub mod sync;

// Re-export commonly used types
pub use embedding::{provider_from_env, EmbeddingProvider, OllamaProvider, OpenAIProvider};
pub use error::{SemanticError, SemanticResult};
pub use models::{
    EmbeddingMeta, EmbeddingModel, EmbeddingProviderType, EmbeddingResult, ProductEmbedding,
    ScoredEmbedding, SearchHit, SyncFailure, SyncOutcome, SyncReport,
};
pub use qdrant::{HnswParams, QdrantConfig, QdrantEmbeddingStore};
pub use repository::{EmbeddingStore, InMemoryEmbeddingStore};
pub use search::SemanticSearchService;
pub use sync::{canonical_source_text, EmbeddingSynchronizer, SyncConfig};
