//! Embedding provider contract and wire types

mod client;
mod provider;
mod types;

pub use client::{ChunkEmbedder, EmbeddedChunk, ProviderSelection};
pub use provider::EmbeddingProvider;
pub use types::{estimate_tokens, EmbeddingRequest, EmbeddingResponse, EmbeddingUsage};

#[cfg(test)]
pub use client::mock::MockChunkEmbedder;
#[cfg(test)]
pub use provider::mock::MockEmbeddingProvider;
