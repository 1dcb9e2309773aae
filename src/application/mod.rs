//! Application layer - Use cases and business logic
//!
//! This layer contains:
//! - Services: Connection supervision, group moderation
//! - Messaging: Message parsing and command dispatch
//! - Errors: Domain-specific errors

pub mod errors;
pub mod services;
pub mod messaging;

#[cfg(test)]
pub mod testing;
