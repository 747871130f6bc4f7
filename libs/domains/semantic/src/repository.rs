use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{SemanticError, SemanticResult};
use crate::models::{EmbeddingMeta, ProductEmbedding, ScoredEmbedding};

/// Storage trait for product embeddings
///
/// One embedding per product id, upsert semantics. Implementations must make
/// each upsert atomic per point so a reader never observes a vector paired
/// with a mismatched source text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingStore: Send + Sync {
    /// Expected vector dimension; writes and queries with any other length
    /// fail with [`SemanticError::DimensionMismatch`]
    fn dimension(&self) -> u32;

    /// Insert or replace the single embedding for `embedding.product_id`
    async fn upsert_embedding(&self, embedding: ProductEmbedding) -> SemanticResult<()>;

    /// Delete an embedding; idempotent, `false` when nothing was stored
    /// (implementations may return `true` unconditionally when the backend
    /// does not report whether the point existed)
    async fn delete_embedding(&self, product_id: Uuid) -> SemanticResult<bool>;

    /// All stored embedding metadata, without vectors
    async fn list_entries(&self) -> SemanticResult<Vec<EmbeddingMeta>>;

    /// Top-`limit` hits by cosine similarity, descending score
    ///
    /// Backed by an approximate index in production implementations, so a
    /// true neighbor near a partition boundary may occasionally be missed;
    /// callers re-assert the deterministic (score desc, id asc) ordering.
    /// The store only ever holds embeddings of active products (sync retires
    /// the rest); the catalog join at search time is authoritative for
    /// visibility in between.
    async fn search(&self, query: &[f32], limit: u32) -> SemanticResult<Vec<ScoredEmbedding>>;
}

/// In-memory implementation of EmbeddingStore (for development/testing)
///
/// Exact cosine scan rather than an approximate index; the contract surface
/// is otherwise identical to the Qdrant implementation.
#[derive(Debug, Clone)]
pub struct InMemoryEmbeddingStore {
    dimension: u32,
    entries: Arc<RwLock<HashMap<Uuid, ProductEmbedding>>>,
}

impl InMemoryEmbeddingStore {
    pub fn new(dimension: u32) -> Self {
        Self {
            dimension,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Fetch a stored embedding, vectors included (test inspection)
    pub async fn get(&self, product_id: Uuid) -> Option<ProductEmbedding> {
        self.entries.read().await.get(&product_id).cloned()
    }

    fn check_dimension(&self, len: usize) -> SemanticResult<()> {
        if len as u32 != self.dimension {
            return Err(SemanticError::DimensionMismatch {
                expected: self.dimension,
                actual: len as u32,
            });
        }
        Ok(())
    }
}

/// Cosine similarity of two equal-length vectors, i.e. `1 - cosine_distance`
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[async_trait]
impl EmbeddingStore for InMemoryEmbeddingStore {
    fn dimension(&self) -> u32 {
        self.dimension
    }

    async fn upsert_embedding(&self, embedding: ProductEmbedding) -> SemanticResult<()> {
        self.check_dimension(embedding.vector.len())?;

        self.entries
            .write()
            .await
            .insert(embedding.product_id, embedding);
        Ok(())
    }

    async fn delete_embedding(&self, product_id: Uuid) -> SemanticResult<bool> {
        Ok(self.entries.write().await.remove(&product_id).is_some())
    }

    async fn list_entries(&self) -> SemanticResult<Vec<EmbeddingMeta>> {
        let entries = self.entries.read().await;
        Ok(entries
            .values()
            .map(|e| EmbeddingMeta {
                product_id: e.product_id,
                source_text: e.source_text.clone(),
                model: e.model.clone(),
                generated_at: e.generated_at,
            })
            .collect())
    }

    async fn search(&self, query: &[f32], limit: u32) -> SemanticResult<Vec<ScoredEmbedding>> {
        self.check_dimension(query.len())?;

        let entries = self.entries.read().await;

        let mut hits: Vec<ScoredEmbedding> = entries
            .values()
            .map(|e| ScoredEmbedding {
                product_id: e.product_id,
                score: cosine_similarity(query, &e.vector),
                model: e.model.clone(),
            })
            .collect();

        // Descending score, ties broken by ascending product id
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.product_id.cmp(&b.product_id))
        });
        hits.truncate(limit as usize);

        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn embedding(vector: Vec<f32>) -> ProductEmbedding {
        ProductEmbedding {
            product_id: Uuid::now_v7(),
            vector,
            source_text: "texto".to_string(),
            model: "all-minilm".to_string(),
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn test_upsert_replaces_not_appends() {
        let store = InMemoryEmbeddingStore::new(2);
        let mut e = embedding(vec![1.0, 0.0]);
        store.upsert_embedding(e.clone()).await.unwrap();

        e.vector = vec![0.0, 1.0];
        e.source_text = "texto nuevo".to_string();
        store.upsert_embedding(e.clone()).await.unwrap();

        assert_eq!(store.len().await, 1);
        let stored = store.get(e.product_id).await.unwrap();
        assert_eq!(stored.source_text, "texto nuevo");
        assert_eq!(stored.vector, vec![0.0, 1.0]);
    }

    #[tokio::test]
    async fn test_dimension_enforced() {
        let store = InMemoryEmbeddingStore::new(3);

        let result = store.upsert_embedding(embedding(vec![1.0, 0.0])).await;
        assert!(matches!(
            result,
            Err(SemanticError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));

        let result = store.search(&[1.0, 0.0], 5).await;
        assert!(matches!(
            result,
            Err(SemanticError::DimensionMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_idempotent() {
        let store = InMemoryEmbeddingStore::new(2);
        let e = embedding(vec![1.0, 0.0]);
        let id = e.product_id;
        store.upsert_embedding(e).await.unwrap();

        assert!(store.delete_embedding(id).await.unwrap());
        assert!(!store.delete_embedding(id).await.unwrap());
    }

    #[tokio::test]
    async fn test_search_orders_by_score_then_id() {
        let store = InMemoryEmbeddingStore::new(2);

        // Two entries with identical vectors (tied score) and one worse
        let mut tied_a = embedding(vec![1.0, 0.0]);
        let mut tied_b = embedding(vec![1.0, 0.0]);
        tied_a.product_id = Uuid::from_u128(2);
        tied_b.product_id = Uuid::from_u128(1);
        let worse = ProductEmbedding {
            product_id: Uuid::from_u128(3),
            ..embedding(vec![0.0, 1.0])
        };

        store.upsert_embedding(tied_a).await.unwrap();
        store.upsert_embedding(tied_b).await.unwrap();
        store.upsert_embedding(worse).await.unwrap();

        let hits = store.search(&[1.0, 0.0], 10).await.unwrap();
        let ids: Vec<Uuid> = hits.iter().map(|h| h.product_id).collect();
        assert_eq!(
            ids,
            vec![
                Uuid::from_u128(1),
                Uuid::from_u128(2),
                Uuid::from_u128(3)
            ]
        );
    }

    #[tokio::test]
    async fn test_search_respects_limit() {
        let store = InMemoryEmbeddingStore::new(2);
        for _ in 0..5 {
            store.upsert_embedding(embedding(vec![1.0, 0.0])).await.unwrap();
        }

        let hits = store.search(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
    }
}
