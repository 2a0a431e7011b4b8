//! Overlapping, boundary-aware text chunker.
//!
//! Splits normalized text into a sliding window of chunks, nudging each
//! window end back to the nearest paragraph, sentence, or word boundary so
//! chunks rarely split mid-token. Chunking is deterministic: identical input
//! always yields byte-identical chunk boundaries, which is what makes
//! reprocessing overwrite vectors instead of duplicating them.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Backward search window for a paragraph break, in bytes
const PARAGRAPH_SEARCH_WINDOW: usize = 100;
/// Backward search window for a sentence break
const SENTENCE_SEARCH_WINDOW: usize = 50;
/// Backward search window for a word break
const WORD_SEARCH_WINDOW: usize = 20;

static EXCESS_NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("static newline pattern"));

/// Configuration for chunking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Target chunk size in bytes
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in bytes
    pub chunk_overlap: usize,
}

impl ChunkConfig {
    /// Create a new chunking configuration
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.chunk_size == 0 {
            return Err(DomainError::validation("chunk_size must be greater than 0"));
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(DomainError::validation(
                "chunk_overlap must be less than chunk_size",
            ));
        }

        Ok(())
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Metadata carried by every chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Source label, e.g. `"pdf:report.pdf"` or a URL
    pub source: String,
    /// Index of this chunk (0-based, over kept chunks)
    pub chunk_index: usize,
    /// Total number of kept chunks for the document
    pub total_chunks: usize,
    /// Metadata inherited from the document/extractor
    #[serde(flatten)]
    pub custom: HashMap<String, serde_json::Value>,
}

impl ChunkMetadata {
    /// Convert to a JSON value map (vector-store metadata shape)
    pub fn to_json_map(&self) -> HashMap<String, serde_json::Value> {
        let mut map = self.custom.clone();
        map.insert(
            "source".to_string(),
            serde_json::Value::String(self.source.clone()),
        );
        map.insert(
            "chunk_index".to_string(),
            serde_json::Value::Number(self.chunk_index.into()),
        );
        map.insert(
            "total_chunks".to_string(),
            serde_json::Value::Number(self.total_chunks.into()),
        );
        map
    }
}

/// A bounded substring of a document's extracted text, the unit of embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub content: String,
    pub metadata: ChunkMetadata,
}

impl DocumentChunk {
    /// Content length in bytes
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Whether the chunk content is empty
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Split text into overlapping, boundary-aware chunks.
///
/// Fails with `EmptyInput` when the trimmed text is empty. Every returned
/// chunk has non-blank content and a `total_chunks` field equal to the final
/// chunk count.
pub fn chunk_text(
    text: &str,
    source: &str,
    base_metadata: &HashMap<String, serde_json::Value>,
    config: &ChunkConfig,
) -> Result<Vec<DocumentChunk>, DomainError> {
    config.validate()?;

    if text.trim().is_empty() {
        return Err(DomainError::empty_input("text is empty after trimming"));
    }

    let text = normalize(text);
    let len = text.len();

    let mut chunks: Vec<DocumentChunk> = Vec::new();
    let mut start = 0usize;

    while start < len {
        let raw_end = floor_char_boundary(&text, (start + config.chunk_size).min(len));

        let end = if raw_end < len {
            adjust_to_boundary(&text, start, raw_end)
        } else {
            len
        };

        let piece = &text[start..end];

        if !piece.trim().is_empty() {
            chunks.push(DocumentChunk {
                content: piece.to_string(),
                metadata: ChunkMetadata {
                    source: source.to_string(),
                    chunk_index: chunks.len(),
                    // unknown until the loop completes; fixed by the post-pass
                    total_chunks: 0,
                    custom: base_metadata.clone(),
                },
            });
        }

        if end >= len {
            break;
        }

        // Window rule: next start is previous end minus the overlap. Boundary
        // adjustment can shrink a chunk below the overlap; force forward
        // progress in that degenerate case.
        let next = floor_char_boundary(&text, end.saturating_sub(config.chunk_overlap));
        start = if next <= start { end } else { next };
    }

    let total = chunks.len();
    for chunk in &mut chunks {
        chunk.metadata.total_chunks = total;
    }

    Ok(chunks)
}

/// Normalize line endings and collapse runs of 3+ newlines to 2.
fn normalize(text: &str) -> String {
    let unix = text.replace("\r\n", "\n").replace('\r', "\n");
    EXCESS_NEWLINES.replace_all(&unix, "\n\n").into_owned()
}

/// Nudge a window end back to the nearest natural boundary.
///
/// Searches backward from `raw_end` for a paragraph break, then a sentence
/// break, then a word break, each within its own window. The returned end is
/// inclusive of the delimiter. Falls back to `raw_end` when no boundary is
/// found; pathological input (no spaces or periods) may still split
/// mid-token.
fn adjust_to_boundary(text: &str, start: usize, raw_end: usize) -> usize {
    const BOUNDARIES: [(&str, usize); 3] = [
        ("\n\n", PARAGRAPH_SEARCH_WINDOW),
        (". ", SENTENCE_SEARCH_WINDOW),
        (" ", WORD_SEARCH_WINDOW),
    ];

    for (delimiter, window) in BOUNDARIES {
        let floor = floor_char_boundary(text, raw_end.saturating_sub(window).max(start));

        if let Some(pos) = text[floor..raw_end].rfind(delimiter) {
            let boundary = floor + pos + delimiter.len();

            if boundary > start {
                return boundary;
            }
        }
    }

    raw_end
}

/// Largest char-boundary index not exceeding `index`.
fn floor_char_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }

    let mut index = index;
    while !text.is_char_boundary(index) {
        index -= 1;
    }

    index
}
