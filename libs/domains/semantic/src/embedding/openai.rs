use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::EmbeddingProvider;
use crate::error::{SemanticError, SemanticResult};
use crate::models::{EmbeddingModel, EmbeddingProviderType, EmbeddingResult};

/// OpenAI embedding provider configuration
///
/// Alternative to the default Ollama deployment for installations without a
/// local model server. The configured [`EmbeddingModel`] must still match
/// what the store was indexed with.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
}

impl OpenAIConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Load from environment: `OPENAI_API_KEY` (required), `OPENAI_BASE_URL`
    pub fn from_env() -> SemanticResult<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| SemanticError::Config("OPENAI_API_KEY not set".to_string()))?;

        let base_url = std::env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

        Ok(Self { api_key, base_url })
    }
}

/// OpenAI embeddings provider
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    pub fn new(config: OpenAIConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn from_env() -> SemanticResult<Self> {
        Ok(Self::new(OpenAIConfig::from_env()?))
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    fn provider_type(&self) -> EmbeddingProviderType {
        EmbeddingProviderType::OpenAI
    }

    async fn embed(&self, model: EmbeddingModel, text: &str) -> SemanticResult<EmbeddingResult> {
        let results = self.embed_batch(model, &[text.to_string()]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| SemanticError::Provider("No embedding returned".to_string()))
    }

    async fn embed_batch(
        &self,
        model: EmbeddingModel,
        texts: &[String],
    ) -> SemanticResult<Vec<EmbeddingResult>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        // text-embedding-3-* models can be truncated to a requested dimension
        let dimensions = match &model {
            EmbeddingModel::Custom { dimension, .. } => Some(*dimension),
            _ => None,
        };

        let request = EmbeddingRequest {
            model: model.model_name().to_string(),
            input: texts.to_vec(),
            dimensions,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.config.base_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SemanticError::Provider(format!(
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let embedding_response: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| SemanticError::Provider(format!("Malformed OpenAI response: {}", e)))?;

        // Sort by index to maintain input order
        let mut data = embedding_response.data;
        data.sort_by_key(|d| d.index);

        Ok(data
            .into_iter()
            .map(|d| EmbeddingResult {
                dimension: d.embedding.len() as u32,
                values: d.embedding,
            })
            .collect())
    }
}
