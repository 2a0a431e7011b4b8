//! Subscription/limits boundary (pre-flight gate only)

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

/// Storage-quota gate consulted once before ingestion starts.
///
/// The pipeline knows nothing about plan tiers beyond this single call.
#[async_trait]
pub trait StorageQuota: Send + Sync + Debug {
    /// Fails with `QuotaExceeded` when the user may not ingest more content.
    async fn check_can_store(&self, user_id: &str, size_hint: usize) -> Result<(), DomainError>;
}

/// Quota gate that always allows ingestion (no billing backend configured).
#[derive(Debug, Clone, Default)]
pub struct UnlimitedQuota;

#[async_trait]
impl StorageQuota for UnlimitedQuota {
    async fn check_can_store(&self, _user_id: &str, _size_hint: usize) -> Result<(), DomainError> {
        Ok(())
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;

    /// Quota gate rejecting everything, for failure-path tests
    #[derive(Debug, Default)]
    pub struct DenyingQuota;

    #[async_trait]
    impl StorageQuota for DenyingQuota {
        async fn check_can_store(
            &self,
            user_id: &str,
            _size_hint: usize,
        ) -> Result<(), DomainError> {
            Err(DomainError::quota_exceeded(format!(
                "storage limit reached for user '{}'",
                user_id
            )))
        }
    }
}
