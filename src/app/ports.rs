use async_trait::async_trait;

use crate::boundary::Boundary;
use crate::error::Result;
use crate::types::Coordinates;

/// Address to coordinate lookup. Failures are local to a row: implementations
/// log them and return `None`.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> Option<Coordinates>;
}

/// Administrative boundary lookup by free-text place description.
/// Errors here abort the pipeline.
#[async_trait]
pub trait BoundaryProvider: Send + Sync {
    async fn fetch(&self, query: &str) -> Result<Boundary>;
}

/// Dense text embedding
pub trait Embedder {
    fn embed(&mut self, text: &str) -> Result<Vec<f32>>;
}
