//! Chunking and source extraction contracts

pub mod chunker;
pub mod extractor;

pub use chunker::{chunk_text, ChunkConfig, ChunkMetadata, DocumentChunk};
pub use extractor::{ExtractRequest, ExtractSource, ProcessedDocument, SourceExtractor};

#[cfg(test)]
pub use extractor::mock::MockSourceExtractor;
