//! Usage recorder boundary (billing collaborator)

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Which kind of API key satisfied a provider call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyKind {
    /// Key referenced explicitly by the caller
    Explicit,
    /// Key stored for the owning user
    User,
    /// Key from environment/system configuration
    System,
}

impl std::fmt::Display for KeyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Explicit => write!(f, "explicit"),
            Self::User => write!(f, "user"),
            Self::System => write!(f, "system"),
        }
    }
}

/// What produced the usage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageSource {
    /// Document ingestion embedding call
    Embedding,
}

impl std::fmt::Display for UsageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Embedding => write!(f, "embedding"),
        }
    }
}

/// Token usage for a single provider call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub user_id: String,
    pub tokens: u32,
    pub provider: String,
    pub model: String,
    pub key_kind: KeyKind,
    pub source: UsageSource,
}

impl TokenUsage {
    pub fn embedding(
        user_id: impl Into<String>,
        tokens: u32,
        provider: impl Into<String>,
        model: impl Into<String>,
        key_kind: KeyKind,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            tokens,
            provider: provider.into(),
            model: model.into(),
            key_kind,
            source: UsageSource::Embedding,
        }
    }
}

/// Accumulates per-user/provider/model token counts into a daily metric row.
///
/// The pipeline calls this after every embedding call, never per-document:
/// a document can fail partway through and billing must still see the tokens
/// already spent.
#[async_trait]
pub trait UsageRecorder: Send + Sync + Debug {
    async fn record_token_usage(&self, usage: TokenUsage) -> Result<(), DomainError>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_kind_display() {
        assert_eq!(KeyKind::Explicit.to_string(), "explicit");
        assert_eq!(KeyKind::User.to_string(), "user");
        assert_eq!(KeyKind::System.to_string(), "system");
    }

    #[tokio::test]
    async fn test_mock_recorder_accumulates() {
        let recorder = mock::MockUsageRecorder::new();

        recorder
            .record_token_usage(TokenUsage::embedding(
                "user-1",
                10,
                "openai",
                "text-embedding-3-small",
                KeyKind::System,
            ))
            .await
            .unwrap();
        recorder
            .record_token_usage(TokenUsage::embedding(
                "user-1",
                5,
                "openai",
                "text-embedding-3-small",
                KeyKind::System,
            ))
            .await
            .unwrap();

        assert_eq!(recorder.calls(), 2);
        assert_eq!(recorder.total_tokens(), 15);
    }
}
