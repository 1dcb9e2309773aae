//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Storage: Credential persistence
//! - Adapters: Messaging service integrations
//! - Logging: Tracing subscriber setup

pub mod config;
pub mod storage;
pub mod adapters;
pub mod logging;
