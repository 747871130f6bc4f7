use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use qdrant_client::qdrant::{
    self, CreateCollectionBuilder, DeletePointsBuilder, Distance, PointId, PointStruct,
    ScrollPointsBuilder, SearchPointsBuilder, UpsertPointsBuilder, Value as QdrantValue,
    VectorParamsBuilder,
};
use qdrant_client::Qdrant;
use tracing::{info, warn};
use uuid::Uuid;

use super::QdrantConfig;
use crate::error::{SemanticError, SemanticResult};
use crate::models::{EmbeddingMeta, ProductEmbedding, ScoredEmbedding};
use crate::repository::EmbeddingStore;

const SCROLL_PAGE: u32 = 256;

/// Qdrant-backed implementation of EmbeddingStore
///
/// One point per product, point id == product id, cosine distance, HNSW
/// index. The payload carries `source_text`, `model`, and `generated_at`;
/// a single-point upsert is atomic, so vector and payload are always
/// replaced together.
pub struct QdrantEmbeddingStore {
    client: Qdrant,
    config: QdrantConfig,
}

impl QdrantEmbeddingStore {
    pub async fn new(config: QdrantConfig) -> SemanticResult<Self> {
        let mut builder = Qdrant::from_url(&config.url);

        if let Some(api_key) = &config.api_key {
            builder = builder.api_key(api_key.clone());
        }

        builder = builder.timeout(Duration::from_secs(config.timeout_secs));

        let client = builder
            .build()
            .map_err(|e| SemanticError::Storage(format!("Failed to build client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn from_client(client: Qdrant, config: QdrantConfig) -> Self {
        Self { client, config }
    }

    /// Create the embeddings collection if it does not exist yet
    pub async fn ensure_collection(&self) -> SemanticResult<()> {
        if self.client.collection_exists(&self.config.collection).await? {
            return Ok(());
        }

        let hnsw_config = qdrant::HnswConfigDiff {
            m: Some(self.config.hnsw.m),
            ef_construct: Some(self.config.hnsw.ef_construct),
            ..Default::default()
        };

        let builder = CreateCollectionBuilder::new(&self.config.collection)
            .vectors_config(VectorParamsBuilder::new(
                self.config.dimension as u64,
                Distance::Cosine,
            ))
            .hnsw_config(hnsw_config);

        self.client.create_collection(builder).await?;

        info!(
            collection = %self.config.collection,
            dimension = self.config.dimension,
            "Created embeddings collection"
        );

        Ok(())
    }

    fn check_dimension(&self, len: usize) -> SemanticResult<()> {
        if len as u32 != self.config.dimension {
            return Err(SemanticError::DimensionMismatch {
                expected: self.config.dimension,
                actual: len as u32,
            });
        }
        Ok(())
    }

    fn uuid_to_point_id(id: Uuid) -> PointId {
        PointId::from(id.to_string())
    }

    fn point_id_to_uuid(point_id: &PointId) -> SemanticResult<Uuid> {
        match &point_id.point_id_options {
            Some(qdrant::point_id::PointIdOptions::Uuid(uuid_str)) => Uuid::parse_str(uuid_str)
                .map_err(|e| SemanticError::Storage(format!("Invalid point UUID: {}", e))),
            Some(qdrant::point_id::PointIdOptions::Num(num)) => Ok(Uuid::from_u128(*num as u128)),
            None => Err(SemanticError::Storage("Missing point ID".to_string())),
        }
    }

    fn embedding_payload(embedding: &ProductEmbedding) -> HashMap<String, QdrantValue> {
        let mut payload = HashMap::new();
        payload.insert(
            "source_text".to_string(),
            QdrantValue::from(embedding.source_text.clone()),
        );
        payload.insert(
            "model".to_string(),
            QdrantValue::from(embedding.model.clone()),
        );
        payload.insert(
            "generated_at".to_string(),
            QdrantValue::from(embedding.generated_at.to_rfc3339()),
        );
        payload
    }

    fn payload_str(payload: &HashMap<String, QdrantValue>, key: &str) -> Option<String> {
        match payload.get(key).and_then(|v| v.kind.as_ref()) {
            Some(qdrant::value::Kind::StringValue(s)) => Some(s.clone()),
            _ => None,
        }
    }

    fn meta_from_payload(
        product_id: Uuid,
        payload: &HashMap<String, QdrantValue>,
    ) -> Option<EmbeddingMeta> {
        let source_text = Self::payload_str(payload, "source_text")?;
        let model = Self::payload_str(payload, "model")?;
        let generated_at = Self::payload_str(payload, "generated_at")
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|dt| dt.with_timezone(&Utc))?;

        Some(EmbeddingMeta {
            product_id,
            source_text,
            model,
            generated_at,
        })
    }
}

#[async_trait]
impl EmbeddingStore for QdrantEmbeddingStore {
    fn dimension(&self) -> u32 {
        self.config.dimension
    }

    async fn upsert_embedding(&self, embedding: ProductEmbedding) -> SemanticResult<()> {
        self.check_dimension(embedding.vector.len())?;

        let payload = Self::embedding_payload(&embedding);
        let point = PointStruct::new(
            Self::uuid_to_point_id(embedding.product_id),
            embedding.vector,
            payload,
        );

        // wait(true): the point must be visible before the sync run reports it
        let builder = UpsertPointsBuilder::new(&self.config.collection, vec![point]).wait(true);
        self.client.upsert_points(builder).await?;

        Ok(())
    }

    async fn delete_embedding(&self, product_id: Uuid) -> SemanticResult<bool> {
        let builder = DeletePointsBuilder::new(&self.config.collection)
            .points(vec![Self::uuid_to_point_id(product_id)])
            .wait(true);

        self.client.delete_points(builder).await?;

        // Qdrant does not report whether the point existed
        Ok(true)
    }

    async fn list_entries(&self) -> SemanticResult<Vec<EmbeddingMeta>> {
        let mut entries = Vec::new();
        let mut offset: Option<PointId> = None;

        loop {
            let mut builder = ScrollPointsBuilder::new(&self.config.collection)
                .limit(SCROLL_PAGE)
                .with_payload(true)
                .with_vectors(false);

            if let Some(o) = offset.take() {
                builder = builder.offset(o);
            }

            let response = self.client.scroll(builder).await?;

            for point in response.result {
                let Some(id) = point.id.as_ref() else {
                    continue;
                };
                let product_id = Self::point_id_to_uuid(id)?;

                match Self::meta_from_payload(product_id, &point.payload) {
                    Some(meta) => entries.push(meta),
                    // Malformed entries are treated as absent; the next sync
                    // run regenerates them
                    None => warn!(%product_id, "Stored embedding has malformed payload"),
                }
            }

            match response.next_page_offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        Ok(entries)
    }

    async fn search(&self, query: &[f32], limit: u32) -> SemanticResult<Vec<ScoredEmbedding>> {
        self.check_dimension(query.len())?;

        let builder =
            SearchPointsBuilder::new(&self.config.collection, query.to_vec(), limit as u64)
                .with_payload(true);

        let results = self.client.search_points(builder).await?;

        results
            .result
            .into_iter()
            .map(|point| {
                let id = point
                    .id
                    .as_ref()
                    .map(Self::point_id_to_uuid)
                    .transpose()?
                    .ok_or_else(|| SemanticError::Storage("Missing point ID".to_string()))?;

                Ok(ScoredEmbedding {
                    product_id: id,
                    score: point.score,
                    model: Self::payload_str(&point.payload, "model").unwrap_or_default(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_point_id_round_trip() {
        let id = Uuid::now_v7();
        let point_id = QdrantEmbeddingStore::uuid_to_point_id(id);
        assert_eq!(QdrantEmbeddingStore::point_id_to_uuid(&point_id).unwrap(), id);
    }

    #[test]
    fn test_meta_from_payload() {
        let embedding = ProductEmbedding {
            product_id: Uuid::now_v7(),
            vector: vec![0.0; 384],
            source_text: "Laptop Producto: Laptop".to_string(),
            model: "all-minilm".to_string(),
            generated_at: Utc::now(),
        };

        let payload = QdrantEmbeddingStore::embedding_payload(&embedding);
        let meta =
            QdrantEmbeddingStore::meta_from_payload(embedding.product_id, &payload).unwrap();

        assert_eq!(meta.source_text, embedding.source_text);
        assert_eq!(meta.model, "all-minilm");
        // RFC 3339 round-trip is lossy below nanoseconds only
        assert_eq!(
            meta.generated_at.timestamp_millis(),
            embedding.generated_at.timestamp_millis()
        );
    }

    #[test]
    fn test_meta_from_payload_rejects_missing_fields() {
        let payload = HashMap::from([(
            "model".to_string(),
            QdrantValue::from("all-minilm".to_string()),
        )]);
        assert!(QdrantEmbeddingStore::meta_from_payload(Uuid::now_v7(), &payload).is_none());
    }
}
