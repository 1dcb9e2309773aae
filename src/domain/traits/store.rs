use async_trait::async_trait;
use crate::application::errors::StorageError;
use crate::domain::entities::Credentials;

/// Store trait - abstraction for credential persistence
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load persisted credentials, or fresh unregistered ones if none exist
    async fn load_or_init(&self) -> Result<Credentials, StorageError>;

    /// Persist the latest credentials, replacing the previous state
    async fn save(&self, credentials: &Credentials) -> Result<(), StorageError>;
}
