//! Embedding provider trait definition

use async_trait::async_trait;
use std::fmt::Debug;

use super::types::{EmbeddingRequest, EmbeddingResponse};
use crate::domain::DomainError;

/// Trait for embedding providers (OpenAI-compatible today, pluggable)
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Turn one chunk of text into one vector
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;

    /// Get the default model for this provider
    fn default_model(&self) -> &'static str;
}
