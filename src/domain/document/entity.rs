//! Document entity and processing state machine types

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a document's content comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// Raw text supplied at upload time
    Text,
    /// Uploaded PDF file
    Pdf,
    /// Web page URL (static scrape with dynamic fallback)
    Url,
    /// YouTube video transcript
    Youtube,
    /// File stored in SharePoint
    Sharepoint,
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Pdf => write!(f, "pdf"),
            Self::Url => write!(f, "url"),
            Self::Youtube => write!(f, "youtube"),
            Self::Sharepoint => write!(f, "sharepoint"),
        }
    }
}

/// Lifecycle status of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Created, not yet picked up by the pipeline
    Pending,
    /// Pipeline is running; see [`ProcessingInfo::step`]
    Processing,
    /// All vectors durably stored and queryable
    Processed,
    /// Pipeline stopped; `processing_info.error` holds the reason
    Failed,
    /// Terminal, reachable only from `Processed` via explicit user action
    Archived,
}

impl DocumentStatus {
    /// Whether the document may enter (or re-enter) the pipeline.
    pub fn can_start_processing(&self) -> bool {
        !matches!(self, Self::Archived)
    }
}

/// Sub-step of the `Processing` status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStep {
    Downloading,
    Extracting,
    Chunking,
    Embedding,
    Upserting,
    Finalizing,
}

impl std::fmt::Display for ProcessingStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Downloading => write!(f, "downloading"),
            Self::Extracting => write!(f, "extracting"),
            Self::Chunking => write!(f, "chunking"),
            Self::Embedding => write!(f, "embedding"),
            Self::Upserting => write!(f, "upserting"),
            Self::Finalizing => write!(f, "finalizing"),
        }
    }
}

/// Progress and failure information for the current (or last) pipeline run.
///
/// Status and "content present" are deliberately independent: a failed run may
/// leave extracted content behind for inspection without any vectors existing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingInfo {
    /// Current pipeline sub-step, if a run is active
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<ProcessingStep>,
    /// Percentage of chunks embedded so far (0-100)
    #[serde(default)]
    pub progress: u8,
    /// Human-readable failure reason; non-empty whenever status is `Failed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

/// Partial update for [`ProcessingInfo`]; `None` fields keep their value.
#[derive(Debug, Clone, Default)]
pub struct ProcessingInfoPatch {
    pub step: Option<ProcessingStep>,
    pub progress: Option<u8>,
    pub error: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Begin a new run: clears the error and finish timestamp of a previous
    /// (possibly failed) run before the other fields apply
    pub fresh: bool,
}

impl ProcessingInfoPatch {
    /// Patch that starts a new pipeline run at the given step.
    pub fn start(step: ProcessingStep) -> Self {
        Self {
            step: Some(step),
            progress: Some(0),
            started_at: Some(Utc::now()),
            fresh: true,
            ..Default::default()
        }
    }
}

impl ProcessingInfo {
    /// Merge a patch into this info, keeping fields the patch does not set.
    pub fn apply(&mut self, patch: ProcessingInfoPatch) {
        if patch.fresh {
            self.error = None;
            self.finished_at = None;
        }

        if let Some(step) = patch.step {
            self.step = Some(step);
        }

        if let Some(progress) = patch.progress {
            self.progress = progress;
        }

        if let Some(error) = patch.error {
            self.error = Some(error);
        }

        if let Some(started_at) = patch.started_at {
            self.started_at = Some(started_at);
        }

        if let Some(finished_at) = patch.finished_at {
            self.finished_at = Some(finished_at);
        }
    }
}

/// A knowledge unit belonging to exactly one knowledge base and owning user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub knowledge_base_id: String,
    pub user_id: String,
    pub title: String,
    pub source_type: SourceType,
    /// Set for url/youtube/sharepoint sources
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// Set for uploaded file sources
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    /// Extracted text, persisted as soon as extraction succeeds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub status: DocumentStatus,
    /// Free-form map including source-specific sub-objects and custom fields
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub processing_info: ProcessingInfo,
    /// Ordered vector ids; only trustworthy when status is `Processed`
    #[serde(default)]
    pub embedding_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Create a new pending document.
    pub fn new(
        id: impl Into<String>,
        knowledge_base_id: impl Into<String>,
        user_id: impl Into<String>,
        title: impl Into<String>,
        source_type: SourceType,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: id.into(),
            knowledge_base_id: knowledge_base_id.into(),
            user_id: user_id.into(),
            title: title.into(),
            source_type,
            source_url: None,
            file_path: None,
            content: None,
            status: DocumentStatus::Pending,
            metadata: HashMap::new(),
            processing_info: ProcessingInfo::default(),
            embedding_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the source URL
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    /// Set the uploaded file path
    pub fn with_file_path(mut self, path: impl Into<String>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Set the raw content (text sources)
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Whether extracted content is already persisted on the row.
    pub fn has_content(&self) -> bool {
        self.content.as_deref().is_some_and(|c| !c.trim().is_empty())
    }

    /// The deterministic vector id for one of this document's chunks.
    pub fn vector_id(&self, chunk_index: usize) -> String {
        format!("{}-chunk-{}", self.id, chunk_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_is_pending() {
        let doc = Document::new("doc-1", "kb-1", "user-1", "Title", SourceType::Text);

        assert_eq!(doc.status, DocumentStatus::Pending);
        assert!(doc.embedding_ids.is_empty());
        assert!(doc.content.is_none());
        assert!(doc.processing_info.step.is_none());
    }

    #[test]
    fn test_vector_id_is_deterministic() {
        let doc = Document::new("doc-1", "kb-1", "user-1", "Title", SourceType::Text);

        assert_eq!(doc.vector_id(0), "doc-1-chunk-0");
        assert_eq!(doc.vector_id(12), "doc-1-chunk-12");
    }

    #[test]
    fn test_has_content() {
        let doc = Document::new("doc-1", "kb-1", "user-1", "Title", SourceType::Text);
        assert!(!doc.has_content());

        let doc = doc.with_content("   ");
        assert!(!doc.has_content());

        let doc = doc.with_content("hello");
        assert!(doc.has_content());
    }

    #[test]
    fn test_processing_info_apply_merges() {
        let mut info = ProcessingInfo {
            step: Some(ProcessingStep::Extracting),
            progress: 10,
            error: None,
            started_at: Some(Utc::now()),
            finished_at: None,
        };

        info.apply(ProcessingInfoPatch {
            step: Some(ProcessingStep::Embedding),
            progress: Some(40),
            ..Default::default()
        });

        assert_eq!(info.step, Some(ProcessingStep::Embedding));
        assert_eq!(info.progress, 40);
        assert!(info.started_at.is_some());
        assert!(info.error.is_none());
    }

    #[test]
    fn test_fresh_patch_clears_previous_failure() {
        let mut info = ProcessingInfo {
            step: Some(ProcessingStep::Embedding),
            progress: 60,
            error: Some("provider exploded".to_string()),
            started_at: Some(Utc::now()),
            finished_at: Some(Utc::now()),
        };

        info.apply(ProcessingInfoPatch::start(ProcessingStep::Extracting));

        assert_eq!(info.step, Some(ProcessingStep::Extracting));
        assert_eq!(info.progress, 0);
        assert!(info.error.is_none());
        assert!(info.finished_at.is_none());
        assert!(info.started_at.is_some());
    }

    #[test]
    fn test_archived_cannot_reenter_pipeline() {
        assert!(DocumentStatus::Pending.can_start_processing());
        assert!(DocumentStatus::Failed.can_start_processing());
        assert!(DocumentStatus::Processed.can_start_processing());
        assert!(!DocumentStatus::Archived.can_start_processing());
    }

    #[test]
    fn test_source_type_display() {
        assert_eq!(SourceType::Text.to_string(), "text");
        assert_eq!(SourceType::Sharepoint.to_string(), "sharepoint");
    }
}
