use async_trait::async_trait;

use crate::error::SemanticResult;
use crate::models::{EmbeddingModel, EmbeddingProviderType, EmbeddingResult};

/// Trait for embedding generation providers
///
/// The provider is an external model-serving process: determinism is not
/// guaranteed, latency varies, and calls may fail. Callers own timeouts and
/// retries; implementations only translate the wire protocol.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Get the provider type
    fn provider_type(&self) -> EmbeddingProviderType;

    /// Generate an embedding for a single text
    async fn embed(&self, model: EmbeddingModel, text: &str) -> SemanticResult<EmbeddingResult>;

    /// Generate embeddings for multiple texts in batch
    async fn embed_batch(
        &self,
        model: EmbeddingModel,
        texts: &[String],
    ) -> SemanticResult<Vec<EmbeddingResult>>;
}
