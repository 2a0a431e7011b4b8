//! Dynamic extractor: renders the page in the shared headless browser.
//!
//! Used only as a fallback when static extraction finds nothing; browser
//! rendering is orders of magnitude more expensive than a plain fetch.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::document::SourceType;
use crate::domain::ingestion::{
    chunk_text, ExtractRequest, ProcessedDocument, SourceExtractor,
};
use crate::domain::DomainError;
use crate::infrastructure::browser::PageRenderer;

/// Extractor for client-rendered web pages
#[derive(Debug, Clone)]
pub struct DynamicExtractor {
    renderer: Arc<dyn PageRenderer>,
}

impl DynamicExtractor {
    pub fn new(renderer: Arc<dyn PageRenderer>) -> Self {
        Self { renderer }
    }
}

#[async_trait]
impl SourceExtractor for DynamicExtractor {
    fn source_type(&self) -> SourceType {
        SourceType::Url
    }

    async fn extract(&self, request: ExtractRequest) -> Result<ProcessedDocument, DomainError> {
        let url = request.url()?.to_string();

        let rendered = self.renderer.render(&url).await?;

        if rendered.text.trim().is_empty() {
            return Err(DomainError::empty_input(format!(
                "browser rendering produced no content for {}",
                url
            )));
        }

        let title = request.title.clone().or(rendered.title);
        let chunks = chunk_text(&rendered.text, &url, &request.metadata, &request.chunking)?;

        Ok(
            ProcessedDocument::new(SourceType::Url, title, rendered.text, chunks)
                .with_metadata("extraction_method", serde_json::json!("dynamic"))
                .with_metadata("url", serde_json::json!(url)),
        )
    }
}
