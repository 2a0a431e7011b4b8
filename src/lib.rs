//! Knowledge-base document ingestion pipeline
//!
//! Ingests heterogeneous content (text, PDF, web pages, YouTube transcripts,
//! SharePoint files) into tenant-isolated vector indexes:
//! - Source-specific extraction with a static-scrape -> headless-browser
//!   fallback for web pages
//! - Overlapping, boundary-aware chunking
//! - Per-chunk embedding with token-usage recording
//! - Batched, namespaced vector upserts with an availability-probe fallback
//! - A per-document processing state machine visible to callers

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use domain::credentials::NoUserKeys;
use domain::ingestion::ChunkConfig;
use domain::limits::UnlimitedQuota;
use infrastructure::browser::{BrowserPool, BrowserPoolConfig};
use infrastructure::document::InMemoryDocumentRepository;
use infrastructure::embedding::{EmbeddingClient, ProviderRegistry};
use infrastructure::extractors::{
    ExtractorRegistry, PdfExtractor, SharePointConfig, SharePointExtractor, TextExtractor,
    UrlExtractor, YoutubeExtractor,
};
use infrastructure::http::HttpClient;
use infrastructure::services::{IngestionService, PipelineConfig};
use infrastructure::usage::InMemoryUsageRecorder;
use infrastructure::vector_store::RemoteVectorStore;

/// The wired-up pipeline plus the handles the CLI needs
pub struct IngestionStack {
    pub service: Arc<IngestionService>,
    pub documents: Arc<InMemoryDocumentRepository>,
    pub usage: Arc<InMemoryUsageRecorder>,
    pub vectors: Arc<RemoteVectorStore<HttpClient>>,
    pub browser: Arc<BrowserPool>,
}

/// Build the ingestion pipeline from configuration.
pub fn create_ingestion_stack(config: &AppConfig) -> anyhow::Result<IngestionStack> {
    let http = HttpClient::new();

    let documents = Arc::new(InMemoryDocumentRepository::new());
    let usage = Arc::new(InMemoryUsageRecorder::new());

    let registry = ProviderRegistry::new(config.embedding.providers.clone())?;
    let registry = match config.embedding.default_provider {
        Some(id) => registry.with_default(id)?,
        None => registry,
    };

    let embedder = Arc::new(EmbeddingClient::new(
        http.clone(),
        registry,
        Arc::new(NoUserKeys),
        usage.clone(),
    ));

    let browser = Arc::new(BrowserPool::new(BrowserPoolConfig {
        navigation_timeout: Duration::from_millis(config.browser.navigation_timeout_ms),
        settle_delay: Duration::from_millis(config.browser.settle_delay_ms),
        evaluate_timeout: Duration::from_millis(config.browser.evaluate_timeout_ms),
    }));

    let mut extractors = ExtractorRegistry::new()
        .register(Arc::new(TextExtractor::new()))
        .register(Arc::new(PdfExtractor::new()))
        .register(Arc::new(UrlExtractor::new(http.clone(), browser.clone())))
        .register(Arc::new(YoutubeExtractor::new(
            http.clone(),
            config.youtube.endpoint.clone(),
        )));

    if let Some(sharepoint) = &config.sharepoint {
        extractors = extractors.register(Arc::new(SharePointExtractor::new(
            http.clone(),
            SharePointConfig::new(
                sharepoint.tenant_id.clone(),
                sharepoint.client_id.clone(),
                sharepoint.client_secret.clone(),
            ),
        )));
    }

    let mut vectors = RemoteVectorStore::new(http, config.vector_store.base_url.clone());
    if let Some(api_key) = &config.vector_store.api_key {
        vectors = vectors.with_api_key(api_key.clone());
    }
    let vectors = Arc::new(vectors);

    let service = Arc::new(IngestionService::new(
        documents.clone(),
        extractors,
        embedder,
        vectors.clone(),
        Arc::new(UnlimitedQuota),
        PipelineConfig {
            chunking: ChunkConfig::new(
                config.chunking.chunk_size,
                config.chunking.chunk_overlap,
            ),
            consistency_delay: Duration::from_millis(config.pipeline.consistency_delay_ms),
        },
    ));

    Ok(IngestionStack {
        service,
        documents,
        usage,
        vectors,
        browser,
    })
}
