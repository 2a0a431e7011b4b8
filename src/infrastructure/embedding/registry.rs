//! Embedding provider registry

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Configuration for one embedding provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSpec {
    pub id: u32,
    /// Provider kind; only `"openai"` (OpenAI-compatible) is implemented
    #[serde(default = "default_kind")]
    pub kind: String,
    /// Name reported to the usage recorder
    pub name: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub model: String,
    /// Output dimensions for models that support shortening
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<usize>,
    /// System API key; prefer `api_key_env` outside tests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Environment variable holding the system API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

fn default_kind() -> String {
    "openai".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com".to_string()
}

impl ProviderSpec {
    /// OpenAI spec with the given registry id and model
    pub fn openai(id: u32, model: impl Into<String>) -> Self {
        Self {
            id,
            kind: default_kind(),
            name: "openai".to_string(),
            base_url: default_base_url(),
            model: model.into(),
            dimensions: None,
            api_key: None,
            api_key_env: Some("OPENAI_API_KEY".to_string()),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// The system key: inline config first, then the configured env var.
    pub fn system_key(&self) -> Option<String> {
        if let Some(key) = &self.api_key {
            return Some(key.clone());
        }

        self.api_key_env
            .as_deref()
            .and_then(|name| std::env::var(name).ok())
            .filter(|v| !v.is_empty())
    }
}

/// Registry of configured embedding providers
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    providers: Vec<ProviderSpec>,
    default_id: u32,
}

impl ProviderRegistry {
    /// Build a registry; the first provider is the default unless overridden.
    pub fn new(providers: Vec<ProviderSpec>) -> Result<Self, DomainError> {
        let default_id = providers
            .first()
            .map(|p| p.id)
            .ok_or_else(|| DomainError::configuration("no embedding providers configured"))?;

        Ok(Self {
            providers,
            default_id,
        })
    }

    pub fn with_default(mut self, default_id: u32) -> Result<Self, DomainError> {
        if !self.providers.iter().any(|p| p.id == default_id) {
            return Err(DomainError::configuration(format!(
                "default embedding provider id {} is not registered",
                default_id
            )));
        }

        self.default_id = default_id;
        Ok(self)
    }

    /// Resolve a provider selection.
    ///
    /// `None` selects the default; an unknown id is rejected outright rather
    /// than silently remapped to a default provider.
    pub fn resolve(&self, provider_id: Option<u32>) -> Result<&ProviderSpec, DomainError> {
        let id = provider_id.unwrap_or(self.default_id);

        self.providers
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| {
                DomainError::validation(format!("unknown embedding provider id {}", id))
            })
    }
}
