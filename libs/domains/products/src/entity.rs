use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sea-ORM entity for the inventory `productos` table
///
/// The table (and its Spanish column names) is owned by the inventory
/// system; we map it onto English field names here and only ever read it.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "productos")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(column_name = "codigo", unique)]
    pub code: String,
    #[sea_orm(column_name = "nombre")]
    pub name: String,
    #[sea_orm(column_name = "descripcion", column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_name = "categoria", nullable)]
    pub category: Option<String>,
    #[sea_orm(column_name = "precio")]
    pub price: f64,
    #[sea_orm(column_name = "cantidad")]
    pub stock: i32,
    #[sea_orm(column_name = "ubicacion", nullable)]
    pub location: Option<String>,
    #[sea_orm(column_name = "proveedor", nullable)]
    pub supplier: Option<String>,
    #[sea_orm(column_name = "activo")]
    pub active: bool,
    #[sea_orm(column_name = "fecha_creacion")]
    pub created_at: DateTimeWithTimeZone,
    #[sea_orm(column_name = "fecha_actualizacion")]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

// Conversion from Sea-ORM Model to domain Product
impl From<Model> for crate::models::Product {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            name: model.name,
            description: model.description,
            category: model.category,
            price: model.price,
            stock: model.stock,
            location: model.location,
            supplier: model.supplier,
            active: model.active,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}
