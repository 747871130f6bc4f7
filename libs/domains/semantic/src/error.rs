use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SemanticError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("No product exists for embedding target {0}")]
    Constraint(Uuid),

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: u32, actual: u32 },

    #[error("Embedding provider error: {0}")]
    Provider(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type SemanticResult<T> = Result<T, SemanticError>;

impl From<qdrant_client::QdrantError> for SemanticError {
    fn from(err: qdrant_client::QdrantError) -> Self {
        SemanticError::Storage(err.to_string())
    }
}

impl From<reqwest::Error> for SemanticError {
    fn from(err: reqwest::Error) -> Self {
        SemanticError::Provider(err.to_string())
    }
}

impl From<serde_json::Error> for SemanticError {
    fn from(err: serde_json::Error) -> Self {
        SemanticError::Storage(format!("JSON error: {}", err))
    }
}

impl From<domain_products::ProductError> for SemanticError {
    fn from(err: domain_products::ProductError) -> Self {
        SemanticError::Storage(err.to_string())
    }
}

impl SemanticError {
    /// Whether this error is a per-product provider failure that sync
    /// isolates, as opposed to a store/config failure that aborts the run.
    pub fn is_provider_failure(&self) -> bool {
        matches!(self, SemanticError::Provider(_))
    }
}
