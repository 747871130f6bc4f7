use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::ProductResult;
use crate::models::Product;

/// Read-only repository trait for the product catalog
///
/// The embedding core reads products through this port and never writes
/// them; product CRUD belongs to the inventory system.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// List all active products, ordered by ascending id
    async fn list_active(&self) -> ProductResult<Vec<Product>>;

    /// Get a product by id (active or not)
    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>>;

    /// Get products by ids, in no particular order; unknown ids are skipped
    async fn get_by_ids(&self, ids: &[Uuid]) -> ProductResult<Vec<Product>>;
}

/// In-memory implementation of ProductRepository (for development/testing)
///
/// Exposes mutation helpers outside the trait so tests can simulate the
/// inventory system changing products between sync runs.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<HashMap<Uuid, Product>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self {
            products: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert or replace a product (simulates inventory-side writes)
    pub async fn insert(&self, product: Product) {
        self.products.write().await.insert(product.id, product);
    }

    /// Flip a product's active flag; no-op for unknown ids
    pub async fn set_active(&self, id: Uuid, active: bool) {
        if let Some(product) = self.products.write().await.get_mut(&id) {
            product.active = active;
        }
    }

    /// Overwrite a product's description; no-op for unknown ids
    pub async fn set_description(&self, id: Uuid, description: impl Into<String>) {
        if let Some(product) = self.products.write().await.get_mut(&id) {
            product.description = Some(description.into());
        }
    }

    /// Hard-delete a product (simulates inventory-side deletion)
    pub async fn remove(&self, id: Uuid) -> bool {
        self.products.write().await.remove(&id).is_some()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list_active(&self) -> ProductResult<Vec<Product>> {
        let products = self.products.read().await;

        let mut result: Vec<Product> = products.values().filter(|p| p.active).cloned().collect();
        result.sort_by_key(|p| p.id);

        Ok(result)
    }

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.get(&id).cloned())
    }

    async fn get_by_ids(&self, ids: &[Uuid]) -> ProductResult<Vec<Product>> {
        let products = self.products.read().await;
        Ok(ids.iter().filter_map(|id| products.get(id).cloned()).collect())
    }
}
