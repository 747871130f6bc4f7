mod client;
mod config;

pub use client::QdrantEmbeddingStore;
pub use config::{HnswParams, QdrantConfig};
