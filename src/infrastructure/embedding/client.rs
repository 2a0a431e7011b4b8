//! Embedding client: provider resolution, key precedence, usage recording

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::openai::OpenAiEmbeddingProvider;
use super::registry::{ProviderRegistry, ProviderSpec};
use crate::domain::credentials::{ResolvedKey, UserKeyStore};
use crate::domain::embedding::{
    ChunkEmbedder, EmbeddedChunk, EmbeddingProvider, EmbeddingRequest, ProviderSelection,
};
use crate::domain::usage::{KeyKind, TokenUsage, UsageRecorder};
use crate::domain::DomainError;
use crate::infrastructure::http::HttpClientTrait;

/// Embedding client wrapping an OpenAI-compatible provider.
///
/// Resolves the provider from the registry, the API key by precedence
/// (explicit, then user-scoped, then system), and records token usage after
/// every successful call.
pub struct EmbeddingClient<C: HttpClientTrait + Clone> {
    http: C,
    registry: ProviderRegistry,
    user_keys: Arc<dyn UserKeyStore>,
    usage: Arc<dyn UsageRecorder>,
}

impl<C: HttpClientTrait + Clone> std::fmt::Debug for EmbeddingClient<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingClient")
            .field("registry", &self.registry)
            .finish()
    }
}

impl<C: HttpClientTrait + Clone> EmbeddingClient<C> {
    pub fn new(
        http: C,
        registry: ProviderRegistry,
        user_keys: Arc<dyn UserKeyStore>,
        usage: Arc<dyn UsageRecorder>,
    ) -> Self {
        Self {
            http,
            registry,
            user_keys,
            usage,
        }
    }

    async fn resolve_key(
        &self,
        user_id: &str,
        spec: &ProviderSpec,
        selection: &ProviderSelection,
    ) -> Result<ResolvedKey, DomainError> {
        if let Some(key) = &selection.api_key {
            return Ok(ResolvedKey::new(key, KeyKind::Explicit));
        }

        if let Some(key) = self.user_keys.user_key(user_id, &spec.name).await? {
            return Ok(ResolvedKey::new(key, KeyKind::User));
        }

        spec.system_key()
            .map(|key| ResolvedKey::new(key, KeyKind::System))
            .ok_or_else(|| {
                DomainError::configuration(format!(
                    "no API key available for provider '{}'",
                    spec.name
                ))
            })
    }
}

#[async_trait]
impl<C: HttpClientTrait + Clone> ChunkEmbedder for EmbeddingClient<C> {
    async fn embed_chunk(
        &self,
        user_id: &str,
        text: &str,
        selection: &ProviderSelection,
    ) -> Result<EmbeddedChunk, DomainError> {
        let spec = self.registry.resolve(selection.provider_id)?;

        if spec.kind != "openai" {
            return Err(DomainError::configuration(format!(
                "unsupported embedding provider kind '{}'",
                spec.kind
            )));
        }

        let key = self.resolve_key(user_id, spec, selection).await?;

        let provider = OpenAiEmbeddingProvider::with_base_url(
            self.http.clone(),
            key.key.as_str(),
            spec.base_url.as_str(),
        );

        let mut request = EmbeddingRequest::new(&spec.model, text);
        if let Some(dims) = spec.dimensions {
            request = request.with_dimensions(dims);
        }

        let response = provider.embed(request).await?;
        let tokens = response.tokens_or_estimate(text);

        // Recorded per call, never per document: a later chunk may fail and
        // billing must still see these tokens.
        self.usage
            .record_token_usage(TokenUsage::embedding(
                user_id,
                tokens,
                &spec.name,
                &spec.model,
                key.kind,
            ))
            .await?;

        debug!(
            provider = %spec.name,
            model = %spec.model,
            tokens,
            key_kind = %key.kind,
            "embedded chunk"
        );

        Ok(EmbeddedChunk {
            vector: response.into_vector(),
            tokens_used: tokens,
        })
    }
}
