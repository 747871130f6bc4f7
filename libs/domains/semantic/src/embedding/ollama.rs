use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::EmbeddingProvider;
use crate::error::{SemanticError, SemanticResult};
use crate::models::{EmbeddingModel, EmbeddingProviderType, EmbeddingResult};

/// Ollama embedding provider configuration
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub host: String,
}

impl OllamaConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }

    /// Load from environment: `OLLAMA_HOST` (default `http://localhost:11434`)
    pub fn from_env() -> SemanticResult<Self> {
        let host =
            std::env::var("OLLAMA_HOST").unwrap_or_else(|_| "http://localhost:11434".to_string());

        Ok(Self { host })
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:11434".to_string(),
        }
    }
}

/// Ollama embeddings provider (`POST {host}/api/embed`)
pub struct OllamaProvider {
    client: Client,
    config: OllamaConfig,
}

impl OllamaProvider {
    pub fn new(config: OllamaConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn from_env() -> SemanticResult<Self> {
        Ok(Self::new(OllamaConfig::from_env()?))
    }
}

#[derive(Debug, Serialize)]
struct EmbedRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn provider_type(&self) -> EmbeddingProviderType {
        EmbeddingProviderType::Ollama
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

        let request = EmbedRequest {
            model: model.model_name().to_string(),
            input: texts.to_vec(),
        };

        let response = self
            .client
            .post(format!("{}/api/embed", self.config.host))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SemanticError::Provider(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let embed_response: EmbedResponse = response
            .json()
            .await
            .map_err(|e| SemanticError::Provider(format!("Malformed Ollama response: {}", e)))?;

        if embed_response.embeddings.len() != texts.len() {
            return Err(SemanticError::Provider(format!(
                "Ollama returned {} embeddings for {} inputs",
                embed_response.embeddings.len(),
                texts.len()
            )));
        }

        Ok(embed_response
            .embeddings
            .into_iter()
            .map(|values| EmbeddingResult {
                dimension: values.len() as u32,
                values,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_host() {
        let config = OllamaConfig::default();
        assert_eq!(config.host, "http://localhost:11434");
    }

    #[test]
    fn test_request_serialization() {
        let request = EmbedRequest {
            model: "all-minilm".to_string(),
            input: vec!["computadora portátil".to_string()],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "all-minilm");
        assert_eq!(json["input"][0], "computadora portátil");
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{"model":"all-minilm","embeddings":[[0.1,0.2],[0.3,0.4]]}"#;
        let response: EmbedResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.embeddings.len(), 2);
        assert_eq!(response.embeddings[0], vec![0.1, 0.2]);
    }
}
