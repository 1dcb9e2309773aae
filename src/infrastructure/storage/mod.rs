//! File-based credential storage

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::application::errors::StorageError;
use crate::domain::entities::Credentials;
use crate::domain::traits::CredentialStore;

const CREDS_FILE: &str = "creds.json";

/// Stores credentials as JSON under an auth directory
pub struct FileCredentialStore {
    base_path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.base_path.join(CREDS_FILE)
    }

    pub async fn init(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.base_path).await?;
        Ok(())
    }

    async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load_or_init(&self) -> Result<Credentials, StorageError> {
        let path = self.path();
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let credentials: Credentials = serde_json::from_slice(&bytes)?;
                tracing::debug!("Loaded credentials from {}", path.display());
                Ok(credentials)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No credentials at {}, starting unregistered", path.display());
                self.init().await?;
                Ok(Credentials::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, credentials: &Credentials) -> Result<(), StorageError> {
        self.init().await?;
        let bytes = serde_json::to_vec_pretty(credentials)?;
        Self::write_atomic(&self.path(), &bytes).await
    }
}
