//! Plain-text passthrough extractor

use async_trait::async_trait;

use crate::domain::document::SourceType;
use crate::domain::ingestion::{
    chunk_text, ExtractRequest, ExtractSource, ProcessedDocument, SourceExtractor,
};
use crate::domain::DomainError;

/// Extractor for raw text supplied at upload time
#[derive(Debug, Clone, Default)]
pub struct TextExtractor;

impl TextExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SourceExtractor for TextExtractor {
    fn source_type(&self) -> SourceType {
        SourceType::Text
    }

    async fn extract(&self, request: ExtractRequest) -> Result<ProcessedDocument, DomainError> {
        let text = match &request.source {
            ExtractSource::Text(text) => text.clone(),
            ExtractSource::Bytes { data, .. } => String::from_utf8_lossy(data).into_owned(),
            ExtractSource::Url(_) => {
                return Err(DomainError::validation(
                    "text extractor does not fetch URLs",
                ));
            }
        };

        if text.trim().is_empty() {
            return Err(DomainError::empty_input("text document is blank"));
        }

        let source = request.title.clone().unwrap_or_else(|| "text".to_string());
        let chunks = chunk_text(&text, &source, &request.metadata, &request.chunking)?;

        Ok(
            ProcessedDocument::new(SourceType::Text, request.title, text, chunks)
                .with_metadata("extraction_method", serde_json::json!("text")),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_passthrough_chunks_text() {
        let extractor = TextExtractor::new();
        let request = ExtractRequest::from_text("Hello world, this is a document.")
            .with_title("Greeting");

        let processed = extractor.extract(request).await.unwrap();

        assert_eq!(processed.source_type, SourceType::Text);
        assert_eq!(processed.total_chunks(), 1);
        assert_eq!(processed.chunks[0].metadata.source, "Greeting");
        assert_eq!(processed.content, "Hello world, this is a document.");
    }

    #[tokio::test]
    async fn test_blank_input_fails() {
        let extractor = TextExtractor::new();
        let request = ExtractRequest::from_text("   \n  ");

        let result = extractor.extract(request).await;

        assert!(matches!(result, Err(DomainError::EmptyInput { .. })));
    }

    #[tokio::test]
    async fn test_url_source_rejected() {
        let extractor = TextExtractor::new();
        let request = ExtractRequest::from_url("https://example.com");

        assert!(extractor.extract(request).await.is_err());
    }
}
