//! Domain layer - Core business logic with no external dependencies
//!
//! This layer contains:
//! - Entities: Core business objects (Jid, MessageEvent, Command, ClientEvent)
//! - Traits: Abstractions for infrastructure (MessagingClient, CredentialStore)

pub mod entities;
pub mod traits;
