use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use domain_products::{Product, ProductRepository};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::embedding::EmbeddingProvider;
use crate::error::{SemanticError, SemanticResult};
use crate::models::{EmbeddingModel, ScoredEmbedding, SearchHit};
use crate::repository::EmbeddingStore;

/// Natural-language product search over the embedding store
///
/// Read-only: any number of searches may run concurrently with each other
/// and with a sync run. Results reflect whatever embedding state is current,
/// which may lag the catalog between syncs.
pub struct SemanticSearchService<S: EmbeddingStore> {
    store: Arc<S>,
    products: Arc<dyn ProductRepository>,
    provider: Arc<dyn EmbeddingProvider>,
    model: EmbeddingModel,
}

impl<S: EmbeddingStore> SemanticSearchService<S> {
    pub fn new(
        store: Arc<S>,
        products: Arc<dyn ProductRepository>,
        provider: Arc<dyn EmbeddingProvider>,
        model: EmbeddingModel,
    ) -> Self {
        Self {
            store,
            products,
            provider,
            model,
        }
    }

    /// Search products by meaning, best matches first
    ///
    /// Scores are cosine similarity in [-1, 1]. Ordering is deterministic:
    /// descending score, ties broken by ascending product id. Hits whose
    /// product is missing or inactive in the catalog are dropped, so fewer
    /// than `k` results may come back.
    pub async fn search(&self, query_text: &str, k: u32) -> SemanticResult<Vec<SearchHit>> {
        let query_text = query_text.trim();
        if query_text.is_empty() {
            return Err(SemanticError::InvalidQuery(
                "Query text must not be empty".to_string(),
            ));
        }
        if k == 0 {
            return Err(SemanticError::InvalidQuery(
                "Result limit must be at least 1".to_string(),
            ));
        }

        let query = self.provider.embed(self.model.clone(), query_text).await?;

        // Over-fetch so that dropped hits (inactive products, model
        // mismatches) still leave up to k results
        let fetch_limit = k.saturating_mul(2);
        let mut hits = self.store.search(&query.values, fetch_limit).await?;

        hits.retain(|hit| self.model_matches(hit));

        // The store's ordering may come from an approximate index;
        // re-assert the contract here
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.product_id.cmp(&b.product_id))
        });

        let ids: Vec<Uuid> = hits.iter().map(|h| h.product_id).collect();
        let products: HashMap<Uuid, Product> = self
            .products
            .get_by_ids(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        // The catalog is authoritative for visibility: stored embeddings can
        // lag product deactivation or deletion between sync runs
        let mut results: Vec<SearchHit> = Vec::with_capacity(hits.len().min(k as usize));
        for hit in hits {
            match products.get(&hit.product_id) {
                Some(product) if product.active => {
                    results.push(SearchHit {
                        product: product.clone(),
                        score: hit.score,
                    });
                }
                Some(_) | None => {
                    debug!(product_id = %hit.product_id, "Dropping hit for missing or inactive product");
                }
            }
            if results.len() == k as usize {
                break;
            }
        }

        debug!(
            query = query_text,
            k,
            results = results.len(),
            "Semantic search complete"
        );

        Ok(results)
    }

    fn model_matches(&self, hit: &ScoredEmbedding) -> bool {
        if hit.model == self.model.model_name() {
            return true;
        }
        // A cross-model score is meaningless; drop the hit and make the
        // configuration drift visible
        warn!(
            product_id = %hit.product_id,
            indexed_model = %hit.model,
            configured_model = %self.model.model_name(),
            "Stored embedding was generated by a different model; dropping hit"
        );
        false
    }
}
