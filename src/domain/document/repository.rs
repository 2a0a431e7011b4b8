//! Document repository trait (relational metadata store boundary)

use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;

use super::entity::{Document, DocumentStatus, ProcessingInfoPatch};
use crate::domain::DomainError;

/// Partial update for a document row.
///
/// The repository merges, never overwrites wholesale: metadata keys are
/// upserted into the existing map and the processing patch is applied field
/// by field, so concurrent writers of unrelated keys do not clobber each
/// other.
#[derive(Debug, Clone, Default)]
pub struct DocumentUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub status: Option<DocumentStatus>,
    /// Keys merged into `Document::metadata`
    pub metadata: HashMap<String, serde_json::Value>,
    pub processing: ProcessingInfoPatch,
    /// Replaces the embedding id list when set
    pub embedding_ids: Option<Vec<String>>,
}

impl DocumentUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_status(mut self, status: DocumentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn with_processing(mut self, patch: ProcessingInfoPatch) -> Self {
        self.processing = patch;
        self
    }

    pub fn with_embedding_ids(mut self, ids: Vec<String>) -> Self {
        self.embedding_ids = Some(ids);
        self
    }
}

/// Repository for document rows. The relational store itself is an external
/// collaborator; the pipeline only needs get and partial-merge update.
#[async_trait]
pub trait DocumentRepository: Send + Sync + Debug {
    /// Fetch a document by id.
    async fn get(&self, id: &str) -> Result<Option<Document>, DomainError>;

    /// Insert or replace a document row.
    async fn put(&self, document: Document) -> Result<(), DomainError>;

    /// Apply a partial update; fails with `NotFound` for unknown ids.
    async fn update(&self, id: &str, update: DocumentUpdate) -> Result<Document, DomainError>;

    /// Remove a document row, returning whether it existed.
    async fn delete(&self, id: &str) -> Result<bool, DomainError>;
}
