use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    entity,
    error::ProductResult,
    models::Product,
    repository::ProductRepository,
};

/// PostgreSQL-backed implementation over the inventory `productos` table
pub struct PgProductRepository {
    db: DatabaseConnection,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn list_active(&self) -> ProductResult<Vec<Product>> {
        let models = entity::Entity::find()
            .filter(entity::Column::Active.eq(true))
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;

        Ok(model.map(|m| m.into()))
    }

    async fn get_by_ids(&self, ids: &[Uuid]) -> ProductResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let models = entity::Entity::find()
            .filter(entity::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }
}
