//! Vector index value types

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Tenant-isolation key scoping every vector operation.
///
/// A namespace can only be derived from an owning user + knowledge base, so a
/// request outside the caller's tenant is unrepresentable - isolation is
/// structural, not a filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Namespace(String);

impl Namespace {
    /// Derive the namespace for a user's knowledge base.
    pub fn for_user_kb(user_id: &str, knowledge_base_id: &str) -> Self {
        Self(format!("user-{}-kb-{}", user_id, knowledge_base_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A vector plus its metadata, keyed by a deterministic id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl VectorRecord {
    pub fn new(id: impl Into<String>, values: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            values,
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn with_all_metadata(mut self, metadata: HashMap<String, serde_json::Value>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Result of an upsert call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertSummary {
    pub upserted_count: usize,
    /// True when the index was unreachable and the call degraded to a no-op
    #[serde(default)]
    pub degraded: bool,
}

impl UpsertSummary {
    pub fn new(upserted_count: usize) -> Self {
        Self {
            upserted_count,
            degraded: false,
        }
    }

    pub fn degraded(upserted_count: usize) -> Self {
        Self {
            upserted_count,
            degraded: true,
        }
    }
}

/// A match returned by a similarity query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryMatch {
    pub id: String,
    pub score: f32,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// Exact-match metadata filter (all entries must be equal)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VectorFilter(pub HashMap<String, serde_json::Value>);

impl VectorFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    /// Whether a metadata map satisfies every filter entry.
    pub fn matches(&self, metadata: &HashMap<String, serde_json::Value>) -> bool {
        self.0
            .iter()
            .all(|(key, value)| metadata.get(key) == Some(value))
    }
}

/// Lightweight index statistics (the availability probe)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexStats {
    #[serde(default)]
    pub total_vector_count: u64,
    #[serde(default)]
    pub dimension: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_derivation() {
        let ns = Namespace::for_user_kb("u1", "kb9");
        assert_eq!(ns.as_str(), "user-u1-kb-kb9");
    }

    #[test]
    fn test_namespaces_differ_per_tenant() {
        let a = Namespace::for_user_kb("u1", "kb1");
        let b = Namespace::for_user_kb("u2", "kb1");
        let c = Namespace::for_user_kb("u1", "kb2");

        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_filter_matches() {
        let filter = VectorFilter::new().eq("document_id", serde_json::json!("doc-1"));

        let mut metadata = HashMap::new();
        metadata.insert("document_id".to_string(), serde_json::json!("doc-1"));
        metadata.insert("chunk_index".to_string(), serde_json::json!(0));

        assert!(filter.matches(&metadata));

        metadata.insert("document_id".to_string(), serde_json::json!("doc-2"));
        assert!(!filter.matches(&metadata));
    }
}
