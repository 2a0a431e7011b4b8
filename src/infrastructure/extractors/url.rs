//! URL extractor: static scrape first, headless browser as fallback.
//!
//! Static fetching is orders of magnitude cheaper than browser rendering, so
//! it always runs first; the dynamic path is reserved for pages that raise
//! `EmptyInput` or `SpaDetected` and genuinely need JavaScript execution.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::dynamic::DynamicExtractor;
use super::static_html::StaticHtmlExtractor;
use crate::domain::document::SourceType;
use crate::domain::ingestion::{ExtractRequest, ProcessedDocument, SourceExtractor};
use crate::domain::DomainError;
use crate::infrastructure::browser::PageRenderer;
use crate::infrastructure::http::HttpClientTrait;

/// Extractor for web page URLs
#[derive(Debug)]
pub struct UrlExtractor<C: HttpClientTrait> {
    static_extractor: StaticHtmlExtractor<C>,
    dynamic_extractor: DynamicExtractor,
}

impl<C: HttpClientTrait> UrlExtractor<C> {
    pub fn new(client: C, renderer: Arc<dyn PageRenderer>) -> Self {
        Self {
            static_extractor: StaticHtmlExtractor::new(client),
            dynamic_extractor: DynamicExtractor::new(renderer),
        }
    }
}

#[async_trait]
impl<C: HttpClientTrait> SourceExtractor for UrlExtractor<C> {
    fn source_type(&self) -> SourceType {
        SourceType::Url
    }

    async fn extract(&self, request: ExtractRequest) -> Result<ProcessedDocument, DomainError> {
        let static_error = match self.static_extractor.extract(request.clone()).await {
            Ok(processed) => return Ok(processed),
            Err(error) if error.triggers_dynamic_fallback() => error,
            Err(error) => return Err(error),
        };

        info!(
            url = request.url().unwrap_or("<invalid>"),
            reason = %static_error,
            "static extraction found nothing, falling back to browser"
        );

        match self.dynamic_extractor.extract(request).await {
            Ok(processed) => Ok(processed),
            Err(dynamic_error) => Err(DomainError::extraction(
                "url",
                format!(
                    "static extraction failed ({}); dynamic fallback failed ({})",
                    static_error, dynamic_error
                ),
            )),
        }
    }
}
