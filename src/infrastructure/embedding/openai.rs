//! OpenAI-compatible embedding provider implementation

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::embedding::{
    EmbeddingProvider, EmbeddingRequest, EmbeddingResponse, EmbeddingUsage,
};
use crate::domain::DomainError;
use crate::infrastructure::http::HttpClientTrait;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// OpenAI-compatible embedding provider
#[derive(Debug)]
pub struct OpenAiEmbeddingProvider<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
}

impl<C: HttpClientTrait> OpenAiEmbeddingProvider<C> {
    /// Create a new provider against the OpenAI API
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_OPENAI_BASE_URL)
    }

    /// Create a new provider with a custom base URL (compatible endpoints)
    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let auth_header = format!("Bearer {}", api_key.into());
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            auth_header,
            base_url,
        }
    }

    fn embeddings_url(&self) -> String {
        format!("{}/v1/embeddings", self.base_url)
    }

    fn build_request(&self, request: &EmbeddingRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": request.model(),
            "input": request.input(),
        });

        if let Some(dims) = request.dimensions() {
            body["dimensions"] = serde_json::json!(dims);
        }

        body
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<EmbeddingResponse, DomainError> {
        let response: WireEmbeddingResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::embedding_provider(
                "openai",
                format!("Failed to parse embedding response: {}", e),
            )
        })?;

        let vector = response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| {
                DomainError::embedding_provider("openai", "response contained no embedding")
            })?;

        // Some compatible providers omit usage; callers estimate instead.
        let usage = response
            .usage
            .map(|u| EmbeddingUsage::new(u.total_tokens));

        Ok(EmbeddingResponse::new(response.model, vector, usage))
    }
}

#[async_trait]
impl<C: HttpClientTrait> EmbeddingProvider for OpenAiEmbeddingProvider<C> {
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError> {
        let url = self.embeddings_url();
        let body = self.build_request(&request);
        let headers = vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ];

        let response = self
            .client
            .post_json(&url, headers, &body)
            .await
            .map_err(|e| DomainError::embedding_provider("openai", e.to_string()))?;

        self.parse_response(response)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn default_model(&self) -> &'static str {
        "text-embedding-3-small"
    }
}

// OpenAI wire types

#[derive(Debug, Deserialize)]
struct WireEmbeddingResponse {
    model: String,
    data: Vec<WireEmbeddingData>,
    usage: Option<WireEmbeddingUsage>,
}

#[derive(Debug, Deserialize)]
struct WireEmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct WireEmbeddingUsage {
    total_tokens: u32,
}
