//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, BrowserSettings, ChunkingSettings, EmbeddingSettings, LogFormat, LoggingConfig,
    PipelineSettings, SharePointSettings, VectorStoreSettings, YoutubeSettings,
};
