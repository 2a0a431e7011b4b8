//! API key storage boundary for embedding providers

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::usage::KeyKind;
use crate::domain::DomainError;

/// An API key together with where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedKey {
    pub key: String,
    pub kind: KeyKind,
}

impl ResolvedKey {
    pub fn new(key: impl Into<String>, kind: KeyKind) -> Self {
        Self {
            key: key.into(),
            kind,
        }
    }
}

/// Store of user-scoped provider keys.
///
/// Sits between explicit caller-supplied keys and the system key in the
/// resolution precedence: explicit key, then the user's stored key, then the
/// environment/system key.
#[async_trait]
pub trait UserKeyStore: Send + Sync + Debug {
    /// The user's stored key for a provider, if any.
    async fn user_key(
        &self,
        user_id: &str,
        provider: &str,
    ) -> Result<Option<String>, DomainError>;
}

/// Key store with no user-scoped keys (system key only deployments).
#[derive(Debug, Clone, Default)]
pub struct NoUserKeys;

#[async_trait]
impl UserKeyStore for NoUserKeys {
    async fn user_key(
        &self,
        _user_id: &str,
        _provider: &str,
    ) -> Result<Option<String>, DomainError> {
        Ok(None)
    }
}
