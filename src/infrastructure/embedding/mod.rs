//! Embedding provider adapters and the usage-recording client

mod client;
mod openai;
mod registry;

pub use client::EmbeddingClient;
pub use openai::OpenAiEmbeddingProvider;
pub use registry::{ProviderRegistry, ProviderSpec};
