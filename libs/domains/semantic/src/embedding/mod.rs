mod ollama;
mod openai;
mod provider;

use std::sync::Arc;

pub use ollama::{OllamaConfig, OllamaProvider};
pub use openai::{OpenAIConfig, OpenAIProvider};
pub use provider::EmbeddingProvider;

#[cfg(test)]
pub(crate) use provider::MockEmbeddingProvider;

use crate::error::{SemanticError, SemanticResult};

/// Build the configured embedding provider from environment variables
///
/// `EMBEDDING_PROVIDER` selects the implementation (`ollama`, the default,
/// or `openai`); the provider-specific variables are documented on each
/// config type.
pub fn provider_from_env() -> SemanticResult<Arc<dyn EmbeddingProvider>> {
    let name = std::env::var("EMBEDDING_PROVIDER").unwrap_or_else(|_| "ollama".to_string());

    match name.as_str() {
        "ollama" => Ok(Arc::new(OllamaProvider::from_env()?)),
        "openai" => Ok(Arc::new(OpenAIProvider::from_env()?)),
        other => Err(SemanticError::Config(format!(
            "Unknown embedding provider: {}",
            other
        ))),
    }
}
