//! The generation call contract.

use crate::{GenerationError, SectionRequest};
use async_trait::async_trait;
use std::sync::Arc;

/// Produces the text of one section, or fails.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, request: &SectionRequest) -> Result<String, GenerationError>;
}

#[async_trait]
impl<G: Generator + ?Sized> Generator for Arc<G> {
    async fn generate(&self, request: &SectionRequest) -> Result<String, GenerationError> {
        (**self).generate(request).await
    }
}
