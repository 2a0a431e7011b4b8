use thiserror::Error;

/// Core domain errors for the ingestion pipeline
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("No extractable content: {message}")]
    EmptyInput { message: String },

    #[error("Client-rendered page detected: {url}")]
    SpaDetected { url: String },

    #[error("Unsupported source: {message}")]
    UnsupportedSource { message: String },

    #[error("Extraction failed ({source_kind}): {message}")]
    Extraction {
        source_kind: String,
        message: String,
    },

    #[error("PDF parse error: {message}")]
    PdfParse { message: String },

    #[error("Transcript unavailable: {message}")]
    TranscriptUnavailable { message: String },

    #[error("Embedding provider error: {provider} - {message}")]
    EmbeddingProvider { provider: String, message: String },

    #[error("Vector store unreachable: {message}")]
    VectorStoreUnavailable { message: String },

    #[error("Vector store upsert failed: {message}")]
    VectorStoreUpsert { message: String },

    #[error("Storage quota exceeded: {message}")]
    QuotaExceeded { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn empty_input(message: impl Into<String>) -> Self {
        Self::EmptyInput {
            message: message.into(),
        }
    }

    pub fn spa_detected(url: impl Into<String>) -> Self {
        Self::SpaDetected { url: url.into() }
    }

    pub fn unsupported_source(message: impl Into<String>) -> Self {
        Self::UnsupportedSource {
            message: message.into(),
        }
    }

    pub fn extraction(source_kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Extraction {
            source_kind: source_kind.into(),
            message: message.into(),
        }
    }

    pub fn pdf_parse(message: impl Into<String>) -> Self {
        Self::PdfParse {
            message: message.into(),
        }
    }

    pub fn transcript_unavailable(message: impl Into<String>) -> Self {
        Self::TranscriptUnavailable {
            message: message.into(),
        }
    }

    pub fn embedding_provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::EmbeddingProvider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn vector_store_unavailable(message: impl Into<String>) -> Self {
        Self::VectorStoreUnavailable {
            message: message.into(),
        }
    }

    pub fn vector_store_upsert(message: impl Into<String>) -> Self {
        Self::VectorStoreUpsert {
            message: message.into(),
        }
    }

    pub fn quota_exceeded(message: impl Into<String>) -> Self {
        Self::QuotaExceeded {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether the static-extraction fallback rule applies to this error.
    ///
    /// Only an empty static page or an SPA marker triggers the dynamic
    /// (headless browser) retry; every other extraction error is terminal.
    pub fn triggers_dynamic_fallback(&self) -> bool {
        matches!(self, Self::EmptyInput { .. } | Self::SpaDetected { .. })
    }
}
