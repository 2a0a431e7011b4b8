//! Source-type to extractor dispatch

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::document::SourceType;
use crate::domain::ingestion::SourceExtractor;
use crate::domain::DomainError;

/// Maps each source type to its extractor
#[derive(Debug, Default)]
pub struct ExtractorRegistry {
    extractors: HashMap<SourceType, Arc<dyn SourceExtractor>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, extractor: Arc<dyn SourceExtractor>) -> Self {
        self.extractors.insert(extractor.source_type(), extractor);
        self
    }

    pub fn get(&self, source_type: SourceType) -> Result<&Arc<dyn SourceExtractor>, DomainError> {
        self.extractors.get(&source_type).ok_or_else(|| {
            DomainError::unsupported_source(format!(
                "no extractor registered for source type '{}'",
                source_type
            ))
        })
    }
}
