//! Message handling - Parsing and command dispatch

pub mod parser;
pub mod replies;
pub mod router;

pub use router::{Dispatch, MessageRouter};
