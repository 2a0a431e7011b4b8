//! Remote vector index adapter (HTTP API, namespaced)

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::vector::{
    IndexStats, Namespace, QueryMatch, UpsertSummary, VectorFilter, VectorRecord, VectorStore,
};
use crate::domain::DomainError;
use crate::infrastructure::http::HttpClientTrait;

/// Remote index limit on vectors per upsert request
const MAX_UPSERT_BATCH: usize = 100;

/// Adapter for the remote vector index HTTP API.
///
/// Before any upsert the index is probed with a lightweight stats call; an
/// unreachable index degrades the upsert to a logged no-op instead of failing
/// every document in environments without a configured vector backend. A
/// genuine upsert failure against a reachable index is terminal.
#[derive(Debug, Clone)]
pub struct RemoteVectorStore<C: HttpClientTrait> {
    client: C,
    base_url: String,
    api_key: Option<String>,
}

impl<C: HttpClientTrait> RemoteVectorStore<C> {
    pub fn new(client: C, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        let mut headers = vec![("Content-Type", "application/json")];

        if let Some(key) = &self.api_key {
            headers.push(("Api-Key", key.as_str()));
        }

        headers
    }

    async fn is_reachable(&self) -> bool {
        self.describe_stats().await.is_ok()
    }

    fn wire_vector(record: &VectorRecord) -> serde_json::Value {
        serde_json::json!({
            "id": record.id,
            "values": record.values,
            "metadata": record.metadata,
        })
    }
}

#[async_trait]
impl<C: HttpClientTrait> VectorStore for RemoteVectorStore<C> {
    async fn upsert(
        &self,
        namespace: &Namespace,
        vectors: Vec<VectorRecord>,
    ) -> Result<UpsertSummary, DomainError> {
        if vectors.is_empty() {
            return Ok(UpsertSummary::new(0));
        }

        if !self.is_reachable().await {
            // Distinct from a genuine upsert failure: the index is absent,
            // and the pipeline proceeds without vectors.
            warn!(
                namespace = %namespace,
                vectors = vectors.len(),
                "vector index unreachable; degrading upsert to a no-op"
            );

            return Ok(UpsertSummary::degraded(vectors.len()));
        }

        let mut upserted = 0usize;

        // One failed batch fails the whole call; the orchestrator marks the
        // document failed rather than retrying a partial set.
        for batch in vectors.chunks(MAX_UPSERT_BATCH) {
            let body = serde_json::json!({
                "vectors": batch.iter().map(Self::wire_vector).collect::<Vec<_>>(),
                "namespace": namespace.as_str(),
            });

            let response = self
                .client
                .post_json(&self.url("/vectors/upsert"), self.headers(), &body)
                .await
                .map_err(|e| DomainError::vector_store_upsert(e.to_string()))?;

            upserted += response
                .get("upsertedCount")
                .and_then(|v| v.as_u64())
                .map(|v| v as usize)
                .unwrap_or(batch.len());
        }

        debug!(namespace = %namespace, upserted, "vectors upserted");

        Ok(UpsertSummary::new(upserted))
    }

    async fn query(
        &self,
        namespace: &Namespace,
        vector: Vec<f32>,
        top_k: usize,
        filter: Option<VectorFilter>,
    ) -> Result<Vec<QueryMatch>, DomainError> {
        let mut body = serde_json::json!({
            "vector": vector,
            "topK": top_k,
            "namespace": namespace.as_str(),
            "includeMetadata": true,
        });

        if let Some(filter) = filter {
            body["filter"] = serde_json::to_value(&filter.0)
                .map_err(|e| DomainError::internal(e.to_string()))?;
        }

        let response = self
            .client
            .post_json(&self.url("/query"), self.headers(), &body)
            .await
            .map_err(|e| DomainError::vector_store_unavailable(e.to_string()))?;

        let matches = response
            .get("matches")
            .cloned()
            .unwrap_or_else(|| serde_json::json!([]));

        serde_json::from_value(matches)
            .map_err(|e| DomainError::internal(format!("malformed query response: {}", e)))
    }

    async fn delete_by_ids(
        &self,
        namespace: &Namespace,
        ids: Vec<String>,
    ) -> Result<(), DomainError> {
        let body = serde_json::json!({
            "ids": ids,
            "namespace": namespace.as_str(),
        });

        self.client
            .post_json(&self.url("/vectors/delete"), self.headers(), &body)
            .await
            .map_err(|e| DomainError::vector_store_unavailable(e.to_string()))?;

        Ok(())
    }

    async fn delete_by_filter(
        &self,
        namespace: &Namespace,
        filter: VectorFilter,
    ) -> Result<(), DomainError> {
        let body = serde_json::json!({
            "filter": filter.0,
            "namespace": namespace.as_str(),
        });

        self.client
            .post_json(&self.url("/vectors/delete"), self.headers(), &body)
            .await
            .map_err(|e| DomainError::vector_store_unavailable(e.to_string()))?;

        Ok(())
    }

    async fn delete_namespace(&self, namespace: &Namespace) -> Result<(), DomainError> {
        let body = serde_json::json!({
            "deleteAll": true,
            "namespace": namespace.as_str(),
        });

        self.client
            .post_json(&self.url("/vectors/delete"), self.headers(), &body)
            .await
            .map_err(|e| DomainError::vector_store_unavailable(e.to_string()))?;

        Ok(())
    }

    async fn describe_stats(&self) -> Result<IndexStats, DomainError> {
        let response = self
            .client
            .get_json(&self.url("/describe_index_stats"), self.headers())
            .await
            .map_err(|e| DomainError::vector_store_unavailable(e.to_string()))?;

        Ok(IndexStats {
            total_vector_count: response
                .get("totalVectorCount")
                .and_then(|v| v.as_u64())
                .unwrap_or(0),
            dimension: response
                .get("dimension")
                .and_then(|v| v.as_u64())
                .map(|v| v as usize),
        })
    }
}
