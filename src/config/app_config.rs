use serde::Deserialize;

use crate::infrastructure::embedding::ProviderSpec;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub chunking: ChunkingSettings,
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub embedding: EmbeddingSettings,
    #[serde(default)]
    pub vector_store: VectorStoreSettings,
    #[serde(default)]
    pub browser: BrowserSettings,
    #[serde(default)]
    pub youtube: YoutubeSettings,
    #[serde(default)]
    pub sharepoint: Option<SharePointSettings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChunkingSettings {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSettings {
    /// Post-upsert wait before a document counts as queryable
    pub consistency_delay_ms: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            consistency_delay_ms: 1500,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingSettings {
    pub providers: Vec<ProviderSpec>,
    #[serde(default)]
    pub default_provider: Option<u32>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            providers: vec![ProviderSpec::openai(1, "text-embedding-3-small")],
            default_provider: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VectorStoreSettings {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrowserSettings {
    pub navigation_timeout_ms: u64,
    pub settle_delay_ms: u64,
    pub evaluate_timeout_ms: u64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            navigation_timeout_ms: 30_000,
            settle_delay_ms: 1_500,
            evaluate_timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct YoutubeSettings {
    /// Transcript service endpoint
    pub endpoint: String,
}

impl Default for YoutubeSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8200/api/transcript".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SharePointSettings {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
