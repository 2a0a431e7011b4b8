//! Chunk embedding seam consumed by the orchestrator

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

/// How the caller picks an embedding provider and key
#[derive(Debug, Clone, Default)]
pub struct ProviderSelection {
    /// Registry id; `None` uses the configured default. An unknown id is a
    /// validation error, never silently remapped.
    pub provider_id: Option<u32>,
    /// Key supplied explicitly by the caller; takes precedence over the
    /// user-scoped and system keys.
    pub api_key: Option<String>,
}

impl ProviderSelection {
    pub fn provider(id: u32) -> Self {
        Self {
            provider_id: Some(id),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }
}

/// One embedded chunk: the vector plus tokens spent producing it
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedChunk {
    pub vector: Vec<f32>,
    pub tokens_used: u32,
}

/// Embeds a single chunk of text on behalf of a user.
///
/// Implementations resolve the provider and API key, call the provider, and
/// record token usage for every successful call before returning - billing
/// accuracy depends on per-call recording because a document may fail partway
/// through.
#[async_trait]
pub trait ChunkEmbedder: Send + Sync + Debug {
    async fn embed_chunk(
        &self,
        user_id: &str,
        text: &str,
        selection: &ProviderSelection,
    ) -> Result<EmbeddedChunk, DomainError>;
}
