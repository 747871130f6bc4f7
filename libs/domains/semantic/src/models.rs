use chrono::{DateTime, Utc};
use domain_products::Product;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Embedding provider types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EmbeddingProviderType {
    /// Local Ollama instance (the default deployment)
    #[default]
    Ollama,
    OpenAI,
}

/// Embedding model selection
///
/// The model identity is recorded against every stored embedding; a stored
/// embedding generated by a different model than the configured one is
/// treated as stale by the synchronizer and dropped (with a loud warning) by
/// the search service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EmbeddingModel {
    /// Ollama all-minilm (384 dimensions)
    #[default]
    AllMinilm,
    /// Ollama nomic-embed-text (768 dimensions)
    NomicEmbedText,
    /// Ollama mxbai-embed-large (1024 dimensions)
    MxbaiEmbedLarge,
    /// Any other model with an explicit dimension
    Custom { name: String, dimension: u32 },
}

impl EmbeddingModel {
    pub fn dimension(&self) -> u32 {
        match self {
            EmbeddingModel::AllMinilm => 384,
            EmbeddingModel::NomicEmbedText => 768,
            EmbeddingModel::MxbaiEmbedLarge => 1024,
            EmbeddingModel::Custom { dimension, .. } => *dimension,
        }
    }

    pub fn model_name(&self) -> &str {
        match self {
            EmbeddingModel::AllMinilm => "all-minilm",
            EmbeddingModel::NomicEmbedText => "nomic-embed-text",
            EmbeddingModel::MxbaiEmbedLarge => "mxbai-embed-large",
            EmbeddingModel::Custom { name, .. } => name,
        }
    }

    /// Resolve a known model by name; `None` for unrecognized names
    /// (callers can still construct [`EmbeddingModel::Custom`]).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "all-minilm" => Some(EmbeddingModel::AllMinilm),
            "nomic-embed-text" => Some(EmbeddingModel::NomicEmbedText),
            "mxbai-embed-large" => Some(EmbeddingModel::MxbaiEmbedLarge),
            _ => None,
        }
    }
}

/// Result of a single embedding call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingResult {
    pub values: Vec<f32>,
    pub dimension: u32,
}

/// One stored embedding, keyed by product id (upsert semantics)
///
/// `source_text` is the exact text the vector was generated from; it is the
/// unit of staleness comparison and is retained for auditability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductEmbedding {
    pub product_id: Uuid,
    pub vector: Vec<f32>,
    pub source_text: String,
    /// Model identity recorded at generation time
    pub model: String,
    pub generated_at: DateTime<Utc>,
}

/// Vector-less projection of a stored embedding
///
/// Enough for staleness comparison and retirement decisions without moving
/// vectors over the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingMeta {
    pub product_id: Uuid,
    pub source_text: String,
    pub model: String,
    pub generated_at: DateTime<Utc>,
}

/// A raw similarity hit from the store, before the product join
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredEmbedding {
    pub product_id: Uuid,
    /// Cosine similarity in [-1, 1], higher = more similar
    pub score: f32,
    /// Model identity recorded against the stored embedding
    pub model: String,
}

/// A search result joined back to its product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub product: Product,
    pub score: f32,
}

/// Per-product failure recorded during a sync run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncFailure {
    pub product_id: Uuid,
    /// Failure classification, e.g. `provider_error`
    pub code: String,
    pub error: String,
}

/// Outcome of a full synchronization run
///
/// A single product's provider failure never aborts the batch; it is
/// recorded here so a retry pass can target exactly the failed products.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncReport {
    /// Embeddings generated or regenerated
    pub updated: u32,
    /// Products whose stored embedding was already current
    pub skipped: u32,
    /// Embeddings retired because their product is gone or inactive
    pub removed: u32,
    pub failed: Vec<SyncFailure>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_ids(&self) -> Vec<Uuid> {
        self.failed.iter().map(|f| f.product_id).collect()
    }
}

/// Outcome of a targeted single-product sync
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncOutcome {
    Updated,
    Skipped,
    Removed,
}
