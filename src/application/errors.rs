//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Pairing error: {0}")]
    Pairing(String),

    #[error("Prompt error: {0}")]
    Prompt(String),
}

/// Errors reported by the messaging client
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    #[error("Client closed")]
    Closed,
}

/// Group moderation errors
#[derive(Error, Debug)]
pub enum ModerationError {
    #[error("Bot identity is not known yet")]
    UnknownSelf,

    #[error("Failed to fetch group metadata: {0}")]
    Metadata(ClientError),

    #[error("Failed to remove participants: {0}")]
    Removal(ClientError),
}

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
