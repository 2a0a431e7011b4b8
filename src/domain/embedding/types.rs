//! Embedding request/response types

use serde::{Deserialize, Serialize};

/// Request to embed one chunk of text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    model: String,
    input: String,
    /// Output dimensions, for models that support shortening
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

impl EmbeddingRequest {
    /// Create a new embedding request
    pub fn new(model: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            input: input.into(),
            dimensions: None,
        }
    }

    /// Set the output dimensions
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }
}

/// Token usage reported by a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingUsage {
    total_tokens: u32,
}

impl EmbeddingUsage {
    pub fn new(total_tokens: u32) -> Self {
        Self { total_tokens }
    }

    pub fn total_tokens(&self) -> u32 {
        self.total_tokens
    }
}

/// Rough token estimate for providers that omit a usage field.
pub fn estimate_tokens(text: &str) -> u32 {
    (text.len() / 4) as u32
}

/// Response from an embedding request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    model: String,
    vector: Vec<f32>,
    /// Absent when the provider reports no usage; callers fall back to an
    /// estimate instead of failing the call
    usage: Option<EmbeddingUsage>,
}

impl EmbeddingResponse {
    pub fn new(model: impl Into<String>, vector: Vec<f32>, usage: Option<EmbeddingUsage>) -> Self {
        Self {
            model: model.into(),
            vector,
            usage,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn vector(&self) -> &[f32] {
        &self.vector
    }

    pub fn dimensions(&self) -> usize {
        self.vector.len()
    }

    pub fn usage(&self) -> Option<EmbeddingUsage> {
        self.usage
    }

    /// Reported token count, or an estimate over `input` when absent.
    pub fn tokens_or_estimate(&self, input: &str) -> u32 {
        self.usage
            .map(|u| u.total_tokens())
            .unwrap_or_else(|| estimate_tokens(input))
    }

    pub fn into_vector(self) -> Vec<f32> {
        self.vector
    }
}
