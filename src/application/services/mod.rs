//! Application services - Business logic orchestration

pub mod backoff;
pub mod moderation_service;
pub mod supervisor;

pub use backoff::Backoff;
pub use moderation_service::ModerationService;
pub use supervisor::{ConnectionSupervisor, SupervisorExit, SupervisorOptions};
