use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use database::{retry_with_backoff, RetryConfig};
use domain_products::{Product, ProductRepository};
use futures::stream::{self, StreamExt};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::embedding::EmbeddingProvider;
use crate::error::{SemanticError, SemanticResult};
use crate::models::{EmbeddingModel, ProductEmbedding, SyncFailure, SyncOutcome, SyncReport};
use crate::repository::EmbeddingStore;

/// Build the canonical text a product is embedded from
///
/// Field order and set are fixed: changing them invalidates the staleness
/// check for every stored embedding. Name and category are repeated to give
/// them more semantic weight in the vector; blank fields are skipped.
pub fn canonical_source_text(product: &Product) -> String {
    let mut parts: Vec<String> = Vec::new();

    parts.push(product.name.clone());
    parts.push(format!("Producto: {}", product.name));

    if let Some(category) = non_blank(product.category.as_deref()) {
        parts.push(format!("Categoría: {}", category));
        parts.push(format!("Tipo: {}", category));
    }

    if let Some(description) = non_blank(product.description.as_deref()) {
        parts.push(description.to_string());
    }

    parts.push(format!("Código: {}", product.code));

    if let Some(supplier) = non_blank(product.supplier.as_deref()) {
        parts.push(format!("Proveedor: {}", supplier));
    }

    parts.join(" ")
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Synchronization configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub model: EmbeddingModel,
    /// Maximum in-flight provider calls during a run
    pub concurrency: usize,
    /// Per-call provider timeout; a timed-out call counts as a provider
    /// failure for that product
    pub provider_timeout: Duration,
    /// Retry policy for provider calls
    pub retry: RetryConfig,
}

impl SyncConfig {
    pub fn with_model(mut self, model: EmbeddingModel) -> Self {
        self.model = model;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            model: EmbeddingModel::default(),
            concurrency: 4,
            provider_timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
        }
    }
}

/// Batch pipeline keeping product embeddings in sync with product text
///
/// Reads the active catalog, compares each product's canonical source text
/// (and model identity) against what is stored, regenerates what changed,
/// and retires embeddings whose product is gone or inactive. A single
/// product's provider failure is recorded in the report and never aborts
/// the batch; store failures do.
pub struct EmbeddingSynchronizer<S: EmbeddingStore> {
    store: Arc<S>,
    products: Arc<dyn ProductRepository>,
    provider: Arc<dyn EmbeddingProvider>,
    config: SyncConfig,
    /// Serializes overlapping runs; concurrent upserts for the same product
    /// could otherwise race and break the source-text/vector invariant
    run_lock: Mutex<()>,
}

impl<S: EmbeddingStore> EmbeddingSynchronizer<S> {
    pub fn new(
        store: Arc<S>,
        products: Arc<dyn ProductRepository>,
        provider: Arc<dyn EmbeddingProvider>,
        config: SyncConfig,
    ) -> Self {
        Self {
            store,
            products,
            provider,
            config,
            run_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Synchronize embeddings for the whole active catalog
    ///
    /// Idempotent: a second run with no intervening product changes performs
    /// no writes. Each product's write is a single atomic upsert, so the
    /// future can be dropped between products without partial corruption.
    pub async fn sync_all(&self) -> SemanticResult<SyncReport> {
        let _guard = self.run_lock.lock().await;

        let products = self.products.list_active().await?;
        let entries = self.store.list_entries().await?;

        let active_ids: HashSet<Uuid> = products.iter().map(|p| p.id).collect();
        let mut existing: HashMap<Uuid, (String, String)> = entries
            .into_iter()
            .map(|e| (e.product_id, (e.source_text, e.model)))
            .collect();

        let mut report = SyncReport::default();

        // Retire embeddings whose product was deleted or deactivated
        let retired: Vec<Uuid> = existing
            .keys()
            .filter(|id| !active_ids.contains(*id))
            .copied()
            .collect();
        for id in retired {
            self.store.delete_embedding(id).await?;
            existing.remove(&id);
            report.removed += 1;
            info!(product_id = %id, "Retired embedding for deleted or inactive product");
        }

        let model_name = self.config.model.model_name().to_string();

        // Partition into up-to-date and stale/missing
        let mut jobs: Vec<(Product, String)> = Vec::new();
        for product in products {
            let text = canonical_source_text(&product);
            match existing.get(&product.id) {
                Some((source_text, model)) if *source_text == text && *model == model_name => {
                    report.skipped += 1;
                }
                _ => jobs.push((product, text)),
            }
        }

        // Provider calls dominate latency; bound their concurrency
        let mut outcomes = stream::iter(jobs)
            .map(|(product, text)| async move {
                let result = self.embed_and_upsert(&product, &text).await;
                (product.id, result)
            })
            .buffer_unordered(self.config.concurrency.max(1));

        while let Some((product_id, result)) = outcomes.next().await {
            match result {
                Ok(()) => report.updated += 1,
                Err(e) if e.is_provider_failure() => {
                    // Stale data beats silent omission: keep the previous
                    // embedding (or none) and surface the failure
                    warn!(product_id = %product_id, error = %e, "Embedding generation failed");
                    report.failed.push(SyncFailure {
                        product_id,
                        code: "provider_error".to_string(),
                        error: e.to_string(),
                    });
                }
                // Store failures indicate a systemic outage
                Err(e) => return Err(e),
            }
        }

        info!(
            updated = report.updated,
            skipped = report.skipped,
            removed = report.removed,
            failed = report.failed.len(),
            "Embedding sync complete"
        );

        Ok(report)
    }

    /// Targeted resync for a single product
    ///
    /// Intended for retry passes over [`SyncReport::failed_ids`]. Fails with
    /// [`SemanticError::Constraint`] for ids that reference no product;
    /// retires the embedding of an inactive product.
    pub async fn sync_product(&self, product_id: Uuid) -> SemanticResult<SyncOutcome> {
        let _guard = self.run_lock.lock().await;

        let product = self
            .products
            .get_by_id(product_id)
            .await?
            .ok_or(SemanticError::Constraint(product_id))?;

        if !product.active {
            self.store.delete_embedding(product_id).await?;
            return Ok(SyncOutcome::Removed);
        }

        let text = canonical_source_text(&product);
        let model_name = self.config.model.model_name();

        let current = self
            .store
            .list_entries()
            .await?
            .into_iter()
            .find(|e| e.product_id == product_id);

        if let Some(entry) = current {
            if entry.source_text == text && entry.model == model_name {
                return Ok(SyncOutcome::Skipped);
            }
        }

        self.embed_and_upsert(&product, &text).await?;
        Ok(SyncOutcome::Updated)
    }

    async fn embed_and_upsert(&self, product: &Product, text: &str) -> SemanticResult<()> {
        let values = self.embed_with_retry(text).await?;

        // A wrong-length vector is a malformed provider response, not a
        // store problem
        let expected = self.config.model.dimension();
        if values.len() as u32 != expected {
            return Err(SemanticError::Provider(format!(
                "Provider returned {}-dimensional vector, expected {}",
                values.len(),
                expected
            )));
        }

        self.store
            .upsert_embedding(ProductEmbedding {
                product_id: product.id,
                vector: values,
                source_text: text.to_string(),
                model: self.config.model.model_name().to_string(),
                generated_at: Utc::now(),
            })
            .await
    }

    async fn embed_with_retry(&self, text: &str) -> SemanticResult<Vec<f32>> {
        let result = retry_with_backoff(
            || {
                let provider = self.provider.clone();
                let model = self.config.model.clone();
                let text = text.to_string();
                let timeout = self.config.provider_timeout;
                async move {
                    match tokio::time::timeout(timeout, provider.embed(model, &text)).await {
                        Ok(result) => result,
                        Err(_) => Err(SemanticError::Provider(format!(
                            "Embedding call timed out after {}s",
                            timeout.as_secs()
                        ))),
                    }
                }
            },
            self.config.retry.clone(),
        )
        .await?;

        Ok(result.values)
    }
}
