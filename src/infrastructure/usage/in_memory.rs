//! In-memory usage recorder with per-day accumulation

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::usage::{TokenUsage, UsageRecorder};
use crate::domain::DomainError;

/// One accumulated metric row: a (day, user, provider, model) bucket
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DailyUsageKey {
    pub date: NaiveDate,
    pub user_id: String,
    pub provider: String,
    pub model: String,
}

/// Accumulated counters for one key
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DailyUsage {
    pub tokens: u64,
    pub calls: u64,
}

/// Recorder accumulating token counts into daily metric rows via
/// read-increment-write, the same shape the billing store uses.
#[derive(Debug, Default)]
pub struct InMemoryUsageRecorder {
    rows: RwLock<HashMap<DailyUsageKey, DailyUsage>>,
}

impl InMemoryUsageRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulated usage for a (user, provider, model) bucket today.
    pub async fn today(&self, user_id: &str, provider: &str, model: &str) -> DailyUsage {
        let key = DailyUsageKey {
            date: Utc::now().date_naive(),
            user_id: user_id.to_string(),
            provider: provider.to_string(),
            model: model.to_string(),
        };

        self.rows.read().await.get(&key).copied().unwrap_or_default()
    }

    /// All accumulated rows (for reporting/CLI output).
    pub async fn rows(&self) -> Vec<(DailyUsageKey, DailyUsage)> {
        self.rows
            .read()
            .await
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect()
    }
}

#[async_trait]
impl UsageRecorder for InMemoryUsageRecorder {
    async fn record_token_usage(&self, usage: TokenUsage) -> Result<(), DomainError> {
        let key = DailyUsageKey {
            date: Utc::now().date_naive(),
            user_id: usage.user_id.clone(),
            provider: usage.provider.clone(),
            model: usage.model.clone(),
        };

        let mut rows = self.rows.write().await;
        let row = rows.entry(key).or_default();
        row.tokens += usage.tokens as u64;
        row.calls += 1;

        debug!(
            user_id = %usage.user_id,
            provider = %usage.provider,
            model = %usage.model,
            tokens = usage.tokens,
            key_kind = %usage.key_kind,
            source = %usage.source,
            "token usage recorded"
        );

        Ok(())
    }
}
