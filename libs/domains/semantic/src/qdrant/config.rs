use crate::error::SemanticResult;
use crate::models::EmbeddingModel;

/// HNSW index parameters
///
/// The recall/latency knob of the approximate index: larger `m` /
/// `ef_construct` improve recall near partition boundaries at the cost of
/// slower indexing and more memory.
#[derive(Debug, Clone)]
pub struct HnswParams {
    pub m: u64,
    pub ef_construct: u64,
}

impl Default for HnswParams {
    fn default() -> Self {
        Self {
            m: 16,
            ef_construct: 100,
        }
    }
}

/// Qdrant connection and collection configuration
#[derive(Debug, Clone)]
pub struct QdrantConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    /// Collection holding one point per product
    pub collection: String,
    /// Expected vector dimension (must match the embedding model)
    pub dimension: u32,
    pub hnsw: HnswParams,
}

impl QdrantConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn with_model(mut self, model: &EmbeddingModel) -> Self {
        self.dimension = model.dimension();
        self
    }

    pub fn with_hnsw(mut self, hnsw: HnswParams) -> Self {
        self.hnsw = hnsw;
        self
    }

    /// Load from environment variables
    ///
    /// - `QDRANT_URL` (default `http://localhost:6334`)
    /// - `QDRANT_API_KEY` (optional)
    /// - `QDRANT_TIMEOUT_SECS` (default 30)
    /// - `QDRANT_COLLECTION` (default `producto_embeddings`)
    pub fn from_env() -> SemanticResult<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("QDRANT_URL") {
            config.url = url;
        }

        config.api_key = std::env::var("QDRANT_API_KEY").ok();

        if let Some(timeout) = std::env::var("QDRANT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            config.timeout_secs = timeout;
        }

        if let Ok(collection) = std::env::var("QDRANT_COLLECTION") {
            config.collection = collection;
        }

        Ok(config)
    }
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".to_string(),
            api_key: None,
            timeout_secs: 30,
            collection: "producto_embeddings".to_string(),
            dimension: EmbeddingModel::AllMinilm.dimension(),
            hnsw: HnswParams::default(),
        }
    }
}
