//! Domain traits - Abstractions for infrastructure implementations

pub mod client;
pub mod prompt;
pub mod store;

pub use client::{ClientFactory, Connection, MessagingClient};
pub use prompt::OperatorPrompt;
pub use store::CredentialStore;
