use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(Uuid),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

impl From<sea_orm::DbErr> for ProductError {
    fn from(err: sea_orm::DbErr) -> Self {
        ProductError::Storage(err.to_string())
    }
}
