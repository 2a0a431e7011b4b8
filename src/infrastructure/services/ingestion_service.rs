//! Ingestion orchestrator: the per-document state machine.
//!
//! Drives extract -> chunk -> embed -> upsert -> finalize for one document,
//! updating the row's status and processing info at every step. Within a
//! document the steps are strictly ordered and chunk embedding is sequential
//! (provider rate limits, monotonic progress); across documents independent
//! tasks run freely, each against its own tenant namespace.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use crate::domain::document::{
    Document, DocumentRepository, DocumentStatus, DocumentUpdate, ProcessingInfoPatch,
    ProcessingStep, SourceType,
};
use crate::domain::embedding::{ChunkEmbedder, ProviderSelection};
use crate::domain::ingestion::{
    chunk_text, ChunkConfig, DocumentChunk, ExtractRequest, ExtractSource, ProcessedDocument,
};
use crate::domain::limits::StorageQuota;
use crate::domain::vector::{Namespace, VectorFilter, VectorRecord, VectorStore};
use crate::domain::DomainError;
use crate::infrastructure::extractors::ExtractorRegistry;

/// Pipeline-level configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub chunking: ChunkConfig,
    /// Wait after a successful upsert before the document counts as
    /// queryable; the remote index has no read-after-write guarantee.
    pub consistency_delay: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunking: ChunkConfig::default(),
            consistency_delay: Duration::from_millis(1500),
        }
    }
}

/// Per-run options
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Re-enter processing for an already-processed document. Vector ids are
    /// deterministic, so the new upsert overwrites instead of duplicating.
    pub force_reprocess: bool,
    pub provider: ProviderSelection,
    /// Chunking override for this run
    pub chunking: Option<ChunkConfig>,
}

/// Outcome of a pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    Processed {
        chunk_count: usize,
        embedding_ids: Vec<String>,
    },
    /// The document vanished or was archived mid-flight; nothing further was
    /// written
    Cancelled,
}

/// The ingestion orchestrator
pub struct IngestionService {
    documents: Arc<dyn DocumentRepository>,
    extractors: ExtractorRegistry,
    embedder: Arc<dyn ChunkEmbedder>,
    vectors: Arc<dyn VectorStore>,
    quota: Arc<dyn StorageQuota>,
    config: PipelineConfig,
}

impl std::fmt::Debug for IngestionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestionService")
            .field("config", &self.config)
            .finish()
    }
}

impl IngestionService {
    pub fn new(
        documents: Arc<dyn DocumentRepository>,
        extractors: ExtractorRegistry,
        embedder: Arc<dyn ChunkEmbedder>,
        vectors: Arc<dyn VectorStore>,
        quota: Arc<dyn StorageQuota>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            documents,
            extractors,
            embedder,
            vectors,
            quota,
            config,
        }
    }

    /// Run the pipeline for one document.
    ///
    /// `payload` carries content that is not on the document row (file bytes
    /// for uploads); URL-backed and text documents derive their source from
    /// the row itself.
    pub async fn process_document(
        &self,
        document_id: &str,
        payload: Option<ExtractSource>,
        options: ProcessOptions,
    ) -> Result<ProcessOutcome, DomainError> {
        let document = self
            .documents
            .get(document_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("document '{}'", document_id)))?;

        if !document.status.can_start_processing() {
            return Err(DomainError::validation(format!(
                "document '{}' is archived and cannot be processed",
                document_id
            )));
        }

        // Pre-flight quota gate; the document stays pending when it fails.
        let size_hint = payload_size(&payload)
            .or_else(|| document.content.as_ref().map(|c| c.len()))
            .unwrap_or(0);
        self.quota
            .check_can_store(&document.user_id, size_hint)
            .await?;

        let chunking = options
            .chunking
            .clone()
            .unwrap_or_else(|| self.config.chunking.clone());

        match self
            .run_pipeline(&document, payload, &options, &chunking)
            .await
        {
            Ok(outcome) => {
                if let ProcessOutcome::Processed { chunk_count, .. } = &outcome {
                    info!(document_id, chunk_count, "document processed");
                }

                Ok(outcome)
            }
            Err(error) => {
                self.mark_failed(document_id, &error).await;
                Err(error)
            }
        }
    }

    /// Delete a document's vectors and its row (document deletion flow).
    pub async fn delete_document(&self, document_id: &str) -> Result<bool, DomainError> {
        let Some(document) = self.documents.get(document_id).await? else {
            return Ok(false);
        };

        let namespace = Namespace::for_user_kb(&document.user_id, &document.knowledge_base_id);

        self.vectors
            .delete_by_filter(
                &namespace,
                VectorFilter::new().eq("document_id", serde_json::json!(document.id)),
            )
            .await?;

        self.documents.delete(document_id).await
    }

    /// Drop every vector of a knowledge base (knowledge-base teardown).
    pub async fn purge_knowledge_base(
        &self,
        user_id: &str,
        knowledge_base_id: &str,
    ) -> Result<(), DomainError> {
        self.vectors
            .delete_namespace(&Namespace::for_user_kb(user_id, knowledge_base_id))
            .await
    }

    async fn run_pipeline(
        &self,
        document: &Document,
        payload: Option<ExtractSource>,
        options: &ProcessOptions,
        chunking: &ChunkConfig,
    ) -> Result<ProcessOutcome, DomainError> {
        let id = document.id.as_str();

        // Reprocessing a document whose content is already extracted only
        // re-derives embeddings; a stored transcript or scraped page is never
        // clobbered by a refetch.
        let reuse_stored_content = options.force_reprocess && document.has_content();

        let first_step = if reuse_stored_content {
            ProcessingStep::Chunking
        } else if needs_download(document.source_type) {
            ProcessingStep::Downloading
        } else {
            ProcessingStep::Extracting
        };

        self.documents
            .update(
                id,
                DocumentUpdate::new()
                    .with_status(DocumentStatus::Processing)
                    .with_processing(ProcessingInfoPatch::start(first_step)),
            )
            .await?;

        let (chunks, extraction_time) = if reuse_stored_content {
            let content = document.content.as_deref().unwrap_or_default();
            let source = document
                .source_url
                .clone()
                .unwrap_or_else(|| document.title.clone());

            let chunks = chunk_text(content, &source, &HashMap::new(), chunking)?;
            (chunks, Utc::now())
        } else {
            let processed = self.extract(document, payload, chunking).await?;
            let extraction_time = processed.created_at;

            // Persist extracted content and metadata immediately: a failure
            // in a later step still leaves the raw text behind for
            // inspection and retry.
            let mut update = DocumentUpdate::new()
                .with_content(processed.content.clone())
                .with_processing(ProcessingInfoPatch {
                    step: Some(ProcessingStep::Chunking),
                    ..Default::default()
                });

            for (key, value) in &processed.metadata {
                update = update.with_metadata(key.clone(), value.clone());
            }

            if document.title.trim().is_empty() {
                if let Some(title) = &processed.title {
                    update = update.with_title(title.clone());
                }
            }

            self.documents.update(id, update).await?;

            (processed.chunks, extraction_time)
        };

        if self.cancelled(id).await? {
            return Ok(ProcessOutcome::Cancelled);
        }

        if chunks.is_empty() {
            // Legal only when re-deriving embeddings for a document that
            // already succeeded once; first-time processing of non-empty
            // content always yields chunks per the chunker contract.
            if options.force_reprocess {
                return self.finalize(id, Vec::new()).await;
            }

            return Err(DomainError::empty_input(format!(
                "document '{}' produced no chunks",
                id
            )));
        }

        let records = self
            .embed_chunks(document, &chunks, &options.provider, extraction_time)
            .await?;

        if self.cancelled(id).await? {
            return Ok(ProcessOutcome::Cancelled);
        }

        let embedding_ids: Vec<String> = records.iter().map(|r| r.id.clone()).collect();

        self.upsert_vectors(document, records).await?;

        if self.cancelled(id).await? {
            return Ok(ProcessOutcome::Cancelled);
        }

        self.finalize(id, embedding_ids).await
    }

    async fn extract(
        &self,
        document: &Document,
        payload: Option<ExtractSource>,
        chunking: &ChunkConfig,
    ) -> Result<ProcessedDocument, DomainError> {
        let extractor = self.extractors.get(document.source_type)?;

        let source = match payload {
            Some(source) => source,
            None => derive_source(document)?,
        };

        let mut request = ExtractRequest::new(source).with_chunking(chunking.clone());

        if !document.title.trim().is_empty() {
            request = request.with_title(document.title.clone());
        }

        extractor.extract(request).await
    }

    /// Embed every chunk sequentially, building the vector records as we go
    /// and reporting progress after each one.
    async fn embed_chunks(
        &self,
        document: &Document,
        chunks: &[DocumentChunk],
        provider: &ProviderSelection,
        extraction_time: chrono::DateTime<chrono::Utc>,
    ) -> Result<Vec<VectorRecord>, DomainError> {
        let id = document.id.as_str();
        let total = chunks.len();
        let created_at = extraction_time.to_rfc3339();

        self.documents
            .update(
                id,
                DocumentUpdate::new().with_processing(ProcessingInfoPatch {
                    step: Some(ProcessingStep::Embedding),
                    ..Default::default()
                }),
            )
            .await?;

        let mut records = Vec::with_capacity(total);

        // Sequential on purpose: unmanaged parallel embedding trips provider
        // rate limits, and progress stays monotonic.
        for (index, chunk) in chunks.iter().enumerate() {
            let embedded = self
                .embedder
                .embed_chunk(&document.user_id, &chunk.content, provider)
                .await?;

            let vector_id = document.vector_id(index);

            let mut metadata = chunk.metadata.to_json_map();
            metadata.insert("user_id".to_string(), serde_json::json!(document.user_id));
            metadata.insert(
                "knowledge_base_id".to_string(),
                serde_json::json!(document.knowledge_base_id),
            );
            metadata.insert("document_id".to_string(), serde_json::json!(document.id));
            metadata.insert("chunk_id".to_string(), serde_json::json!(vector_id));
            metadata.insert("content".to_string(), serde_json::json!(chunk.content));
            metadata.insert(
                "source_type".to_string(),
                serde_json::json!(document.source_type.to_string()),
            );
            metadata.insert("created_at".to_string(), serde_json::json!(created_at));

            records.push(
                VectorRecord::new(vector_id, embedded.vector).with_all_metadata(metadata),
            );

            let progress = (((index + 1) * 100) / total) as u8;
            self.documents
                .update(
                    id,
                    DocumentUpdate::new().with_processing(ProcessingInfoPatch {
                        progress: Some(progress),
                        ..Default::default()
                    }),
                )
                .await?;
        }

        Ok(records)
    }

    async fn upsert_vectors(
        &self,
        document: &Document,
        records: Vec<VectorRecord>,
    ) -> Result<(), DomainError> {
        let id = document.id.as_str();

        self.documents
            .update(
                id,
                DocumentUpdate::new().with_processing(ProcessingInfoPatch {
                    step: Some(ProcessingStep::Upserting),
                    ..Default::default()
                }),
            )
            .await?;

        let summary = self
            .vectors
            .upsert(
                &Namespace::for_user_kb(&document.user_id, &document.knowledge_base_id),
                records,
            )
            .await?;

        if summary.degraded {
            warn!(
                document_id = id,
                "vectors not persisted: index unavailable, upsert degraded to no-op"
            );
        }

        // The index offers no read-after-write guarantee; wait before callers
        // may treat the document as queryable.
        if !self.config.consistency_delay.is_zero() {
            tokio::time::sleep(self.config.consistency_delay).await;
        }

        Ok(())
    }

    async fn finalize(
        &self,
        id: &str,
        embedding_ids: Vec<String>,
    ) -> Result<ProcessOutcome, DomainError> {
        let chunk_count = embedding_ids.len();
        let now = Utc::now();

        self.documents
            .update(
                id,
                DocumentUpdate::new()
                    .with_status(DocumentStatus::Processed)
                    .with_metadata("chunk_count", serde_json::json!(chunk_count))
                    .with_metadata("embedding_count", serde_json::json!(chunk_count))
                    .with_metadata("processed_at", serde_json::json!(now.to_rfc3339()))
                    .with_embedding_ids(embedding_ids.clone())
                    .with_processing(ProcessingInfoPatch {
                        step: Some(ProcessingStep::Finalizing),
                        progress: Some(100),
                        finished_at: Some(now),
                        ..Default::default()
                    }),
            )
            .await?;

        Ok(ProcessOutcome::Processed {
            chunk_count,
            embedding_ids,
        })
    }

    /// A document that disappeared or was archived mid-run aborts the
    /// pipeline without further writes.
    async fn cancelled(&self, id: &str) -> Result<bool, DomainError> {
        Ok(match self.documents.get(id).await? {
            None => true,
            Some(doc) => doc.status == DocumentStatus::Archived,
        })
    }

    /// Record a terminal failure. Readers must treat a failed document's
    /// embedding ids as empty even if some vectors were upserted first.
    async fn mark_failed(&self, id: &str, error: &DomainError) {
        warn!(document_id = id, error = %error, "document processing failed");

        let update = DocumentUpdate::new()
            .with_status(DocumentStatus::Failed)
            .with_processing(ProcessingInfoPatch {
                error: Some(error.to_string()),
                finished_at: Some(Utc::now()),
                ..Default::default()
            });

        if let Err(update_error) = self.documents.update(id, update).await {
            // The document may have been deleted mid-flight; nothing to record.
            warn!(document_id = id, error = %update_error, "failed to record failure");
        }
    }
}

fn needs_download(source_type: SourceType) -> bool {
    matches!(
        source_type,
        SourceType::Url | SourceType::Youtube | SourceType::Sharepoint
    )
}

fn payload_size(payload: &Option<ExtractSource>) -> Option<usize> {
    match payload {
        Some(ExtractSource::Bytes { data, .. }) => Some(data.len()),
        Some(ExtractSource::Text(text)) => Some(text.len()),
        _ => None,
    }
}

fn derive_source(document: &Document) -> Result<ExtractSource, DomainError> {
    match document.source_type {
        SourceType::Text => document
            .content
            .clone()
            .map(ExtractSource::Text)
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "text document '{}' has no content to process",
                    document.id
                ))
            }),
        SourceType::Pdf => Err(DomainError::validation(format!(
            "pdf document '{}' needs a file payload",
            document.id
        ))),
        SourceType::Url | SourceType::Youtube | SourceType::Sharepoint => document
            .source_url
            .clone()
            .map(ExtractSource::Url)
            .ok_or_else(|| {
                DomainError::validation(format!("document '{}' has no source URL", document.id))
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::DocumentStatus;
    use crate::domain::embedding::MockChunkEmbedder;
    use crate::domain::ingestion::MockSourceExtractor;
    use crate::domain::limits::{mock::DenyingQuota, UnlimitedQuota};
    use crate::domain::usage::MockUsageRecorder;
    use crate::domain::vector::MockVectorStore;
    use crate::infrastructure::document::InMemoryDocumentRepository;
    use crate::infrastructure::extractors::{PdfExtractor, TextExtractor, YoutubeExtractor};
    use crate::infrastructure::http::MockHttpClient;

    struct Harness {
        documents: Arc<InMemoryDocumentRepository>,
        usage: Arc<MockUsageRecorder>,
        embedder: Arc<MockChunkEmbedder>,
        vectors: Arc<MockVectorStore>,
        service: IngestionService,
    }

    fn harness_with(extractors: ExtractorRegistry, embedder: MockChunkEmbedder) -> Harness {
        let documents = Arc::new(InMemoryDocumentRepository::new());
        let usage = Arc::new(MockUsageRecorder::new());
        let embedder = Arc::new(embedder.with_recorder(usage.clone()));
        let vectors = Arc::new(MockVectorStore::new());

        let service = IngestionService::new(
            documents.clone(),
            extractors,
            embedder.clone(),
            vectors.clone(),
            Arc::new(UnlimitedQuota),
            PipelineConfig {
                chunking: ChunkConfig::default(),
                consistency_delay: Duration::ZERO,
            },
        );

        Harness {
            documents,
            usage,
            embedder,
            vectors,
            service,
        }
    }

    fn text_harness() -> Harness {
        harness_with(
            ExtractorRegistry::new().register(Arc::new(TextExtractor::new())),
            MockChunkEmbedder::new(8),
        )
    }

    fn text_document(id: &str, content: &str) -> Document {
        Document::new(id, "kb-1", "user-1", "Doc", SourceType::Text).with_content(content)
    }

    fn namespace() -> Namespace {
        Namespace::for_user_kb("user-1", "kb-1")
    }

    #[tokio::test]
    async fn test_happy_path_text_document() {
        let h = text_harness();
        let content = "Hello world. ".repeat(200);
        h.documents
            .put(text_document("doc-1", &content))
            .await
            .unwrap();

        let outcome = h
            .service
            .process_document("doc-1", None, ProcessOptions::default())
            .await
            .unwrap();

        let ProcessOutcome::Processed {
            chunk_count,
            embedding_ids,
        } = outcome
        else {
            panic!("expected processed outcome");
        };

        assert!(chunk_count >= 2);
        assert_eq!(embedding_ids[0], "doc-1-chunk-0");

        // N chunks: exactly N usage-recorder calls and N vectors stored.
        assert_eq!(h.usage.calls(), chunk_count);
        assert_eq!(h.vectors.count(&namespace()), chunk_count);

        let doc = h.documents.get("doc-1").await.unwrap().unwrap();
        assert_eq!(doc.status, DocumentStatus::Processed);
        assert_eq!(doc.embedding_ids.len(), chunk_count);
        assert_eq!(
            doc.metadata.get("chunk_count"),
            Some(&serde_json::json!(chunk_count))
        );
        assert_eq!(doc.processing_info.progress, 100);
        assert!(doc.processing_info.error.is_none());
        assert!(doc.processing_info.finished_at.is_some());
    }

    #[tokio::test]
    async fn test_vector_metadata_carries_tenant_and_content() {
        let h = text_harness();
        h.documents
            .put(text_document("doc-1", "A short document."))
            .await
            .unwrap();

        h.service
            .process_document("doc-1", None, ProcessOptions::default())
            .await
            .unwrap();

        let record = h.vectors.get(&namespace(), "doc-1-chunk-0").unwrap();
        assert_eq!(record.metadata.get("user_id"), Some(&serde_json::json!("user-1")));
        assert_eq!(
            record.metadata.get("knowledge_base_id"),
            Some(&serde_json::json!("kb-1"))
        );
        assert_eq!(
            record.metadata.get("document_id"),
            Some(&serde_json::json!("doc-1"))
        );
        assert_eq!(
            record.metadata.get("content"),
            Some(&serde_json::json!("A short document."))
        );
        assert_eq!(
            record.metadata.get("source_type"),
            Some(&serde_json::json!("text"))
        );
        assert_eq!(record.metadata.get("chunk_index"), Some(&serde_json::json!(0)));
    }

    #[tokio::test]
    async fn test_embedding_failure_partway_marks_failed() {
        let h = harness_with(
            ExtractorRegistry::new().register(Arc::new(TextExtractor::new())),
            MockChunkEmbedder::new(8).failing_on_call(2),
        );
        let content = "Hello world. ".repeat(300);
        h.documents
            .put(text_document("doc-1", &content))
            .await
            .unwrap();

        let result = h
            .service
            .process_document("doc-1", None, ProcessOptions::default())
            .await;

        assert!(matches!(
            result,
            Err(DomainError::EmbeddingProvider { .. })
        ));

        // Only the first chunk reached the recorder and nothing was upserted.
        assert_eq!(h.usage.calls(), 1);
        assert_eq!(h.vectors.count(&namespace()), 0);

        let doc = h.documents.get("doc-1").await.unwrap().unwrap();
        assert_eq!(doc.status, DocumentStatus::Failed);
        assert!(doc
            .processing_info
            .error
            .as_deref()
            .unwrap()
            .contains("configured failure"));
        assert!(doc.processing_info.finished_at.is_some());
        // Content extracted before the failure stays for inspection.
        assert!(doc.has_content());
    }

    #[tokio::test]
    async fn test_upsert_failure_marks_failed() {
        let h = text_harness();
        h.vectors.fail_upserts();
        h.documents
            .put(text_document("doc-1", "Some content to embed."))
            .await
            .unwrap();

        let result = h
            .service
            .process_document("doc-1", None, ProcessOptions::default())
            .await;

        assert!(matches!(
            result,
            Err(DomainError::VectorStoreUpsert { .. })
        ));

        let doc = h.documents.get("doc-1").await.unwrap().unwrap();
        assert_eq!(doc.status, DocumentStatus::Failed);
    }

    #[tokio::test]
    async fn test_pdf_parse_failure_creates_no_vectors() {
        let h = harness_with(
            ExtractorRegistry::new().register(Arc::new(PdfExtractor::new())),
            MockChunkEmbedder::new(8),
        );
        h.documents
            .put(Document::new("doc-1", "kb-1", "user-1", "Bad", SourceType::Pdf))
            .await
            .unwrap();

        let payload = ExtractSource::Bytes {
            data: b"definitely not a pdf".to_vec(),
            filename: Some("bad.pdf".to_string()),
        };

        let result = h
            .service
            .process_document("doc-1", Some(payload), ProcessOptions::default())
            .await;

        assert!(matches!(result, Err(DomainError::PdfParse { .. })));
        assert_eq!(h.vectors.count(&namespace()), 0);
        assert_eq!(h.usage.calls(), 0);

        let doc = h.documents.get("doc-1").await.unwrap().unwrap();
        assert_eq!(doc.status, DocumentStatus::Failed);
    }

    #[tokio::test]
    async fn test_youtube_empty_transcript_end_to_end() {
        let service_url = "http://transcripts.local/api";
        let client = MockHttpClient::new()
            .with_json(service_url, serde_json::json!({"transcript": ""}));

        let h = harness_with(
            ExtractorRegistry::new()
                .register(Arc::new(YoutubeExtractor::new(client, service_url))),
            MockChunkEmbedder::new(8),
        );

        h.documents
            .put(
                Document::new("doc-1", "kb-1", "user-1", "Video", SourceType::Youtube)
                    .with_source_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            )
            .await
            .unwrap();

        let result = h
            .service
            .process_document("doc-1", None, ProcessOptions::default())
            .await;

        assert!(matches!(
            result,
            Err(DomainError::TranscriptUnavailable { .. })
        ));

        let doc = h.documents.get("doc-1").await.unwrap().unwrap();
        assert_eq!(doc.status, DocumentStatus::Failed);
    }

    #[tokio::test]
    async fn test_reprocess_overwrites_instead_of_duplicating() {
        let h = text_harness();
        let content = "Hello world. ".repeat(200);
        h.documents
            .put(text_document("doc-1", &content))
            .await
            .unwrap();

        let first = h
            .service
            .process_document("doc-1", None, ProcessOptions::default())
            .await
            .unwrap();

        let second = h
            .service
            .process_document(
                "doc-1",
                None,
                ProcessOptions {
                    force_reprocess: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        // Identical ids both times and no duplicate vectors in the store.
        assert_eq!(first, second);

        let ProcessOutcome::Processed { chunk_count, .. } = first else {
            panic!("expected processed outcome");
        };
        assert_eq!(h.vectors.count(&namespace()), chunk_count);
    }

    #[tokio::test]
    async fn test_reprocess_does_not_refetch_stored_content() {
        // Extractor that would fail if consulted: reprocessing must reuse the
        // stored transcript rather than hitting the network again.
        let h = harness_with(
            ExtractorRegistry::new().register(Arc::new(
                MockSourceExtractor::new(SourceType::Youtube)
                    .with_error(DomainError::transcript_unavailable("should not be called")),
            )),
            MockChunkEmbedder::new(8),
        );

        h.documents
            .put(
                Document::new("doc-1", "kb-1", "user-1", "Video", SourceType::Youtube)
                    .with_source_url("https://youtu.be/dQw4w9WgXcQ")
                    .with_content("A previously extracted transcript worth keeping."),
            )
            .await
            .unwrap();

        let outcome = h
            .service
            .process_document(
                "doc-1",
                None,
                ProcessOptions {
                    force_reprocess: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(matches!(outcome, ProcessOutcome::Processed { .. }));

        let doc = h.documents.get("doc-1").await.unwrap().unwrap();
        assert_eq!(
            doc.content.as_deref(),
            Some("A previously extracted transcript worth keeping.")
        );
        assert_eq!(doc.status, DocumentStatus::Processed);
    }

    #[tokio::test]
    async fn test_quota_denial_leaves_document_pending() {
        let documents = Arc::new(InMemoryDocumentRepository::new());
        let usage = Arc::new(MockUsageRecorder::new());
        let service = IngestionService::new(
            documents.clone(),
            ExtractorRegistry::new().register(Arc::new(TextExtractor::new())),
            Arc::new(MockChunkEmbedder::new(8).with_recorder(usage.clone())),
            Arc::new(MockVectorStore::new()),
            Arc::new(DenyingQuota),
            PipelineConfig::default(),
        );

        documents
            .put(text_document("doc-1", "Some content."))
            .await
            .unwrap();

        let result = service
            .process_document("doc-1", None, ProcessOptions::default())
            .await;

        assert!(matches!(result, Err(DomainError::QuotaExceeded { .. })));

        let doc = documents.get("doc-1").await.unwrap().unwrap();
        assert_eq!(doc.status, DocumentStatus::Pending);
        assert_eq!(usage.calls(), 0);
    }

    #[tokio::test]
    async fn test_archived_document_is_rejected() {
        let h = text_harness();
        let mut doc = text_document("doc-1", "content");
        doc.status = DocumentStatus::Archived;
        h.documents.put(doc).await.unwrap();

        let result = h
            .service
            .process_document("doc-1", None, ProcessOptions::default())
            .await;

        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_unknown_document_is_not_found() {
        let h = text_harness();

        let result = h
            .service
            .process_document("missing", None, ProcessOptions::default())
            .await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_and_reaches_100() {
        let h = text_harness();
        let content = "Hello world. ".repeat(400);
        h.documents
            .put(text_document("doc-1", &content))
            .await
            .unwrap();

        h.service
            .process_document("doc-1", None, ProcessOptions::default())
            .await
            .unwrap();

        let doc = h.documents.get("doc-1").await.unwrap().unwrap();
        assert_eq!(doc.processing_info.progress, 100);
        assert_eq!(doc.processing_info.step, Some(ProcessingStep::Finalizing));
        assert!(h.embedder.calls() >= 2);
    }

    #[tokio::test]
    async fn test_delete_document_removes_vectors_and_row() {
        let h = text_harness();
        h.documents
            .put(text_document("doc-1", "Content to delete later."))
            .await
            .unwrap();

        h.service
            .process_document("doc-1", None, ProcessOptions::default())
            .await
            .unwrap();
        assert!(h.vectors.count(&namespace()) > 0);

        assert!(h.service.delete_document("doc-1").await.unwrap());

        assert_eq!(h.vectors.count(&namespace()), 0);
        assert!(h.documents.get("doc-1").await.unwrap().is_none());
    }
}
