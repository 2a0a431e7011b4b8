//! Source extractor trait and the extraction/embedding hand-off contract

use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::chunker::{ChunkConfig, DocumentChunk};
use crate::domain::document::SourceType;
use crate::domain::DomainError;

/// Reference to the content a source extractor should pull from
#[derive(Debug, Clone)]
pub enum ExtractSource {
    /// Inline text supplied at upload time
    Text(String),
    /// Raw file bytes plus the uploaded filename
    Bytes {
        data: Vec<u8>,
        filename: Option<String>,
    },
    /// Remote URL (web page, YouTube video, SharePoint file)
    Url(String),
}

/// Input to a source extractor
#[derive(Debug, Clone)]
pub struct ExtractRequest {
    pub source: ExtractSource,
    /// Caller-supplied title, overriding anything the source declares
    pub title: Option<String>,
    /// Metadata inherited by every produced chunk
    pub metadata: HashMap<String, serde_json::Value>,
    pub chunking: ChunkConfig,
}

impl ExtractRequest {
    pub fn new(source: ExtractSource) -> Self {
        Self {
            source,
            title: None,
            metadata: HashMap::new(),
            chunking: ChunkConfig::default(),
        }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(ExtractSource::Text(text.into()))
    }

    pub fn from_url(url: impl Into<String>) -> Self {
        Self::new(ExtractSource::Url(url.into()))
    }

    pub fn from_bytes(data: Vec<u8>, filename: Option<String>) -> Self {
        Self::new(ExtractSource::Bytes { data, filename })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn with_chunking(mut self, chunking: ChunkConfig) -> Self {
        self.chunking = chunking;
        self
    }

    /// The URL, for extractors that only accept URL sources.
    pub fn url(&self) -> Result<&str, DomainError> {
        match &self.source {
            ExtractSource::Url(url) => Ok(url),
            other => Err(DomainError::validation(format!(
                "expected a URL source, got {:?}",
                std::mem::discriminant(other)
            ))),
        }
    }
}

/// Result of extraction: the extracted text already chunked, plus
/// document-level metadata. This is transient - the hand-off between
/// extraction and embedding, never persisted as its own entity.
#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    pub source_type: SourceType,
    /// Title discovered in the source (or caller override)
    pub title: Option<String>,
    /// Full extracted text before chunking, persisted onto the document row
    pub content: String,
    pub chunks: Vec<DocumentChunk>,
    /// Document-level metadata (page counts, video info, extraction method)
    pub metadata: HashMap<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl ProcessedDocument {
    pub fn new(
        source_type: SourceType,
        title: Option<String>,
        content: String,
        chunks: Vec<DocumentChunk>,
    ) -> Self {
        Self {
            source_type,
            title,
            content,
            chunks,
            metadata: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn with_all_metadata(mut self, metadata: HashMap<String, serde_json::Value>) -> Self {
        self.metadata.extend(metadata);
        self
    }

    pub fn total_chunks(&self) -> usize {
        self.chunks.len()
    }
}

/// One extractor per source type; each produces plain text plus extraction
/// metadata and runs the chunker on it.
#[async_trait]
pub trait SourceExtractor: Send + Sync + Debug {
    /// The source type this extractor handles
    fn source_type(&self) -> SourceType;

    /// Extract, normalize, and chunk the referenced content.
    async fn extract(&self, request: ExtractRequest) -> Result<ProcessedDocument, DomainError>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = ExtractRequest::from_url("https://example.com")
            .with_title("Example")
            .with_metadata("kind", serde_json::json!("page"));

        assert_eq!(request.url().unwrap(), "https://example.com");
        assert_eq!(request.title.as_deref(), Some("Example"));
        assert!(request.metadata.contains_key("kind"));
    }

    #[test]
    fn test_url_accessor_rejects_inline_text() {
        let request = ExtractRequest::from_text("hello");
        assert!(request.url().is_err());
    }

    #[tokio::test]
    async fn test_mock_extractor_chunks_inline_text() {
        let extractor = mock::MockSourceExtractor::new(SourceType::Text);
        let request = ExtractRequest::from_text("Hello mock world");

        let processed = extractor.extract(request).await.unwrap();

        assert_eq!(processed.source_type, SourceType::Text);
        assert_eq!(processed.total_chunks(), 1);
        assert_eq!(extractor.calls(), 1);
    }
}
