//! YouTube transcript extractor (delegates to an external transcription service)

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::domain::document::SourceType;
use crate::domain::ingestion::{
    chunk_text, ExtractRequest, ProcessedDocument, SourceExtractor,
};
use crate::domain::DomainError;
use crate::infrastructure::http::HttpClientTrait;

static VIDEO_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:v=|youtu\.be/|/shorts/|/embed/)([A-Za-z0-9_-]{11})")
        .expect("static video id pattern")
});

/// Response shape of the transcript service
#[derive(Debug, Deserialize)]
struct TranscriptResponse {
    #[serde(default)]
    transcript: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    length_seconds: Option<u64>,
    #[serde(default)]
    views: Option<u64>,
    #[serde(default)]
    publish_date: Option<String>,
    #[serde(default)]
    video_id: Option<String>,
    #[serde(default)]
    thumbnail_url: Option<String>,
}

/// Extractor for YouTube video transcripts
#[derive(Debug, Clone)]
pub struct YoutubeExtractor<C: HttpClientTrait> {
    client: C,
    endpoint: String,
}

impl<C: HttpClientTrait> YoutubeExtractor<C> {
    pub fn new(client: C, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Video id parsed from a watch/short/embed URL.
    pub fn video_id(url: &str) -> Option<String> {
        VIDEO_ID
            .captures(url)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }
}

#[async_trait]
impl<C: HttpClientTrait> SourceExtractor for YoutubeExtractor<C> {
    fn source_type(&self) -> SourceType {
        SourceType::Youtube
    }

    async fn extract(&self, request: ExtractRequest) -> Result<ProcessedDocument, DomainError> {
        let url = request.url()?.to_string();

        let response = self
            .client
            .post_json(
                &self.endpoint,
                vec![("Content-Type", "application/json")],
                &serde_json::json!({ "url": url }),
            )
            .await
            .map_err(|e| DomainError::transcript_unavailable(e.to_string()))?;

        let transcript: TranscriptResponse = serde_json::from_value(response).map_err(|e| {
            DomainError::transcript_unavailable(format!("malformed service response: {}", e))
        })?;

        // No transcript is terminal for the document; there is nothing to
        // retry against.
        if transcript.transcript.trim().is_empty() {
            return Err(DomainError::transcript_unavailable(format!(
                "no transcript available for {}",
                url
            )));
        }

        let title = request.title.clone().or(transcript.title);
        let chunks = chunk_text(
            &transcript.transcript,
            &url,
            &request.metadata,
            &request.chunking,
        )?;

        let mut processed = ProcessedDocument::new(
            SourceType::Youtube,
            title,
            transcript.transcript,
            chunks,
        )
        .with_metadata("extraction_method", serde_json::json!("youtube"))
        .with_metadata("url", serde_json::json!(url));

        let video_id = transcript.video_id.or_else(|| Self::video_id(&url));

        if let Some(id) = video_id {
            processed = processed.with_metadata("video_id", serde_json::json!(id));
        }

        if let Some(author) = transcript.author {
            processed = processed.with_metadata("author", serde_json::json!(author));
        }

        if let Some(length) = transcript.length_seconds {
            processed = processed.with_metadata("length_seconds", serde_json::json!(length));
        }

        if let Some(views) = transcript.views {
            processed = processed.with_metadata("views", serde_json::json!(views));
        }

        if let Some(publish_date) = transcript.publish_date {
            processed = processed.with_metadata("publish_date", serde_json::json!(publish_date));
        }

        if let Some(thumbnail) = transcript.thumbnail_url {
            processed = processed.with_metadata("thumbnail_url", serde_json::json!(thumbnail));
        }

        Ok(processed)
    }
}
