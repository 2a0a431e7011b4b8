//! Vector store trait (remote index boundary)

use std::fmt::Debug;

use async_trait::async_trait;

use super::entity::{IndexStats, Namespace, QueryMatch, UpsertSummary, VectorFilter, VectorRecord};
use crate::domain::DomainError;

/// Upserts, queries, and deletes vectors in a namespaced remote index.
///
/// Every operation is scoped by a [`Namespace`]; there is no unscoped access.
#[async_trait]
pub trait VectorStore: Send + Sync + Debug {
    /// Insert-or-overwrite vectors keyed by their deterministic ids.
    async fn upsert(
        &self,
        namespace: &Namespace,
        vectors: Vec<VectorRecord>,
    ) -> Result<UpsertSummary, DomainError>;

    /// Similarity query (shared namespace discipline with retrieval).
    async fn query(
        &self,
        namespace: &Namespace,
        vector: Vec<f32>,
        top_k: usize,
        filter: Option<VectorFilter>,
    ) -> Result<Vec<QueryMatch>, DomainError>;

    /// Delete vectors by id.
    async fn delete_by_ids(
        &self,
        namespace: &Namespace,
        ids: Vec<String>,
    ) -> Result<(), DomainError>;

    /// Delete vectors matching a metadata filter.
    async fn delete_by_filter(
        &self,
        namespace: &Namespace,
        filter: VectorFilter,
    ) -> Result<(), DomainError>;

    /// Delete every vector in the namespace (knowledge-base teardown).
    async fn delete_namespace(&self, namespace: &Namespace) -> Result<(), DomainError>;

    /// Lightweight stats call, also used as the availability probe.
    async fn describe_stats(&self) -> Result<IndexStats, DomainError>;
}
