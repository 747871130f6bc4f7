use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Product entity - one row of the inventory catalog
///
/// The catalog schema is owned by the inventory system (Spanish column
/// names, see [`crate::entity`]); this is the domain-side view of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier (also the vector store point id)
    pub id: Uuid,
    /// Unique product code (SKU), e.g. `PROD-001`
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: f64,
    /// Units in stock
    pub stock: i32,
    /// Warehouse location
    pub location: Option<String>,
    pub supplier: Option<String>,
    /// Inactive products are excluded from embedding sync and search
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Convenience constructor used by tests and seeding code
    #[allow(clippy::too_many_arguments)]
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            code: code.into(),
            name: name.into(),
            description: None,
            category: None,
            price: 0.0,
            stock: 0,
            location: None,
            supplier: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_supplier(mut self, supplier: impl Into<String>) -> Self {
        self.supplier = Some(supplier.into());
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let product = Product::new("PROD-001", "Laptop Dell XPS 13");
        assert_eq!(product.code, "PROD-001");
        assert!(product.active);
        assert!(product.description.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let product = Product::new("PROD-002", "Mouse Inalámbrico Logitech")
            .with_category("Periféricos")
            .with_supplier("Logitech")
            .with_price(29.99);
        assert_eq!(product.category.as_deref(), Some("Periféricos"));
        assert_eq!(product.price, 29.99);
    }
}
