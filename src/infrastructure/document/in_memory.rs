//! In-memory document repository.
//!
//! Backs the CLI and tests; production deployments plug the relational store
//! in behind the same trait.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::document::{Document, DocumentRepository, DocumentUpdate};
use crate::domain::DomainError;

#[derive(Debug, Default)]
pub struct InMemoryDocumentRepository {
    documents: RwLock<HashMap<String, Document>>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn get(&self, id: &str) -> Result<Option<Document>, DomainError> {
        Ok(self.documents.read().await.get(id).cloned())
    }

    async fn put(&self, document: Document) -> Result<(), DomainError> {
        self.documents
            .write()
            .await
            .insert(document.id.clone(), document);
        Ok(())
    }

    async fn update(&self, id: &str, update: DocumentUpdate) -> Result<Document, DomainError> {
        let mut documents = self.documents.write().await;

        let document = documents
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found(format!("document '{}'", id)))?;

        if let Some(title) = update.title {
            document.title = title;
        }

        if let Some(content) = update.content {
            document.content = Some(content);
        }

        if let Some(status) = update.status {
            document.status = status;
        }

        // Metadata and processing info merge key by key; unrelated entries
        // written by other steps survive.
        document.metadata.extend(update.metadata);
        document.processing_info.apply(update.processing);

        if let Some(ids) = update.embedding_ids {
            document.embedding_ids = ids;
        }

        document.updated_at = Utc::now();

        Ok(document.clone())
    }

    async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        Ok(self.documents.write().await.remove(id).is_some())
    }
}
