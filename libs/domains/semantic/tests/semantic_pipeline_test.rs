//! End-to-end pipeline tests: catalog -> sync -> search, with an in-memory
//! store and a deterministic keyword-based embedding provider.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use database::RetryConfig;
use tokio::sync::Mutex;

use domain_products::{InMemoryProductRepository, Product, ProductRepository};
use uuid::Uuid;
use domain_semantic::{
    EmbeddingModel, EmbeddingProvider, EmbeddingProviderType, EmbeddingResult,
    EmbeddingSynchronizer, InMemoryEmbeddingStore, SemanticError, SemanticResult,
    SemanticSearchService, SyncConfig,
};

const DIM: u32 = 4;

/// Deterministic stand-in for a real embedding model: each known keyword
/// contributes to one axis, so semantically related texts land close
/// together under cosine similarity.
struct KeywordProvider {
    /// Texts that should fail this many more times before succeeding
    failures: Mutex<HashMap<String, u32>>,
    /// Total embed calls served
    calls: AtomicU32,
    /// Artificial latency per call, to widen race windows
    delay: Mutex<Duration>,
}

impl KeywordProvider {
    fn new() -> Self {
        Self {
            failures: Mutex::new(HashMap::new()),
            calls: AtomicU32::new(0),
            delay: Mutex::new(Duration::ZERO),
        }
    }

    async fn fail_next(&self, fragment: &str, times: u32) {
        self.failures
            .lock()
            .await
            .insert(fragment.to_string(), times);
    }

    async fn set_delay(&self, delay: Duration) {
        *self.delay.lock().await = delay;
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    fn vectorize(text: &str) -> Vec<f32> {
        const KEYWORDS: &[(&str, usize)] = &[
            ("laptop", 0),
            ("ultrabook", 0),
            ("portátil", 0),
            ("potente", 0),
            ("xps", 0),
            ("mouse", 1),
            ("inalámbrico", 1),
            ("logitech", 1),
            ("teclado", 2),
        ];

        let text = text.to_lowercase();
        let mut vector = vec![0.0f32; DIM as usize];
        // Small constant component keeps texts with no known keyword from
        // collapsing to the zero vector
        vector[DIM as usize - 1] = 0.1;

        for (keyword, axis) in KEYWORDS {
            vector[*axis] += text.matches(keyword).count() as f32;
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for KeywordProvider {
    fn provider_type(&self) -> EmbeddingProviderType {
        EmbeddingProviderType::Ollama
    }

    async fn embed(&self, _model: EmbeddingModel, text: &str) -> SemanticResult<EmbeddingResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let delay = *self.delay.lock().await;
        if delay > Duration::ZERO {
            tokio::time::sleep(delay).await;
        }

        let mut failures = self.failures.lock().await;
        for (fragment, remaining) in failures.iter_mut() {
            if text.contains(fragment.as_str()) && *remaining > 0 {
                *remaining -= 1;
                return Err(SemanticError::Provider("model unavailable".to_string()));
            }
        }
        drop(failures);

        Ok(EmbeddingResult {
            values: Self::vectorize(text),
            dimension: DIM,
        })
    }

    async fn embed_batch(
        &self,
        model: EmbeddingModel,
        texts: &[String],
    ) -> SemanticResult<Vec<EmbeddingResult>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(model.clone(), text).await?);
        }
        Ok(results)
    }
}

struct Pipeline {
    products: Arc<InMemoryProductRepository>,
    store: Arc<InMemoryEmbeddingStore>,
    provider: Arc<KeywordProvider>,
    sync: EmbeddingSynchronizer<InMemoryEmbeddingStore>,
    search: SemanticSearchService<InMemoryEmbeddingStore>,
}

fn pipeline(products: Arc<InMemoryProductRepository>) -> Pipeline {
    let model = EmbeddingModel::Custom {
        name: "keyword-test".to_string(),
        dimension: DIM,
    };
    let store = Arc::new(InMemoryEmbeddingStore::new(DIM));
    let provider = Arc::new(KeywordProvider::new());

    let config = SyncConfig::default()
        .with_model(model.clone())
        .with_retry(RetryConfig::new().with_initial_delay(1).without_jitter());

    let sync = EmbeddingSynchronizer::new(
        store.clone(),
        products.clone(),
        provider.clone(),
        config,
    );
    let search = SemanticSearchService::new(
        store.clone(),
        products.clone(),
        provider.clone(),
        model,
    );

    Pipeline {
        products,
        store,
        provider,
        sync,
        search,
    }
}

/// Active product ids in catalog order (PROD-001 first: ids are v7 uuids,
/// so insertion order is ascending)
async fn active_ids(products: &InMemoryProductRepository) -> Vec<Uuid> {
    products
        .list_active()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect()
}

async fn seeded_catalog() -> Arc<InMemoryProductRepository> {
    let products = Arc::new(InMemoryProductRepository::new());
    products
        .insert(
            Product::new("PROD-001", "Laptop Dell XPS 13")
                .with_description("Ultrabook con procesador Intel i7 y 16GB RAM")
                .with_category("Computadoras")
                .with_supplier("Dell"),
        )
        .await;
    products
        .insert(
            Product::new("PROD-002", "Mouse Inalámbrico Logitech")
                .with_description("Mouse ergonómico con receptor USB")
                .with_category("Periféricos")
                .with_supplier("Logitech"),
        )
        .await;
    products
}

#[tokio::test]
async fn test_sync_then_search_ranks_by_meaning() {
    let p = pipeline(seeded_catalog().await);

    let report = p.sync.sync_all().await.unwrap();
    assert_eq!(report.updated, 2);
    assert!(report.is_clean());

    // No literal word overlap with "Laptop Dell XPS 13"; the match is
    // semantic, via the shared keyword axis
    let hits = p.search.search("ultrabook portátil potente", 5).await.unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].product.code, "PROD-001");
    assert!(hits[0].score > hits[1].score);

    let hits = p.search.search("mouse inalámbrico", 5).await.unwrap();
    assert_eq!(hits[0].product.code, "PROD-002");
}

#[tokio::test]
async fn test_rerun_without_changes_writes_nothing() {
    let p = pipeline(seeded_catalog().await);

    p.sync.sync_all().await.unwrap();
    let report = p.sync.sync_all().await.unwrap();

    assert_eq!(report.updated, 0);
    assert_eq!(report.skipped, 2);
    assert_eq!(report.removed, 0);
    assert_eq!(p.store.len().await, 2);
}

#[tokio::test]
async fn test_description_change_is_picked_up_by_search() {
    let products = seeded_catalog().await;
    let listed = active_ids(&products).await;
    let p = pipeline(products);

    p.sync.sync_all().await.unwrap();

    // PROD-002 becomes keyboard-themed; only it should re-embed
    p.products
        .set_description(listed[1], "Teclado mecánico retroiluminado")
        .await;
    let report = p.sync.sync_all().await.unwrap();
    assert_eq!(report.updated, 1);
    assert_eq!(report.skipped, 1);

    let hits = p.search.search("teclado", 5).await.unwrap();
    assert_eq!(hits[0].product.id, listed[1]);
}

#[tokio::test]
async fn test_deactivated_product_disappears_from_search() {
    let products = seeded_catalog().await;
    let listed = active_ids(&products).await;
    let p = pipeline(products);

    p.sync.sync_all().await.unwrap();
    p.products.set_active(listed[0], false).await;

    // Before the next sync the stale embedding still exists, but the
    // catalog join already hides the product
    let hits = p.search.search("laptop ultrabook", 5).await.unwrap();
    assert!(hits.iter().all(|h| h.product.id != listed[0]));

    let report = p.sync.sync_all().await.unwrap();
    assert_eq!(report.removed, 1);
    assert!(p.store.get(listed[0]).await.is_none());
}

#[tokio::test]
async fn test_deleted_product_embedding_is_retired() {
    let products = seeded_catalog().await;
    let listed = active_ids(&products).await;
    let p = pipeline(products);

    p.sync.sync_all().await.unwrap();
    p.products.remove(listed[1]).await;

    let report = p.sync.sync_all().await.unwrap();
    assert_eq!(report.removed, 1);
    assert_eq!(p.store.len().await, 1);
}

#[tokio::test]
async fn test_transient_provider_failure_recovers_within_run() {
    let p = pipeline(seeded_catalog().await);

    // First two calls for the laptop text fail, third succeeds; the retry
    // policy absorbs this inside one run
    p.provider.fail_next("PROD-001", 2).await;

    let report = p.sync.sync_all().await.unwrap();
    assert_eq!(report.updated, 2);
    assert!(report.is_clean());
}

#[tokio::test]
async fn test_exhausted_retries_fail_only_that_product() {
    let p = pipeline(seeded_catalog().await);

    p.provider.fail_next("PROD-001", 100).await;

    let report = p.sync.sync_all().await.unwrap();
    assert_eq!(report.updated, 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(p.store.len().await, 1);

    // A later targeted retry succeeds once the provider recovers
    p.provider.fail_next("PROD-001", 0).await;
    for id in report.failed_ids() {
        p.sync.sync_product(id).await.unwrap();
    }
    assert_eq!(p.store.len().await, 2);
}

#[tokio::test]
async fn test_overlapping_sync_runs_are_serialized() {
    let p = pipeline(seeded_catalog().await);
    // Slow the provider down so unserialized runs would actually overlap
    p.provider.set_delay(Duration::from_millis(25)).await;

    let (first, second) = tokio::join!(p.sync.sync_all(), p.sync.sync_all());
    let (first, second) = (first.unwrap(), second.unwrap());

    // Whichever run takes the lock first does all the embedding; the other
    // must observe the finished store and skip everything. If the runs
    // interleaved, both would read an empty store and embed both products,
    // doubling the provider call count.
    assert_eq!(first.updated + second.updated, 2);
    assert_eq!(first.skipped + second.skipped, 2);
    assert_eq!(p.provider.calls(), 2);
    assert_eq!(p.store.len().await, 2);
}

#[tokio::test]
async fn test_searches_run_concurrently() {
    let p = pipeline(seeded_catalog().await);
    p.sync.sync_all().await.unwrap();

    let (a, b, c) = tokio::join!(
        p.search.search("laptop", 5),
        p.search.search("mouse", 5),
        p.search.search("ultrabook potente", 1),
    );

    assert_eq!(a.unwrap()[0].product.code, "PROD-001");
    assert_eq!(b.unwrap()[0].product.code, "PROD-002");
    assert_eq!(c.unwrap().len(), 1);
}
