//! Messaging service adapters

pub mod console;

pub use console::{ConsoleFactory, ConsoleInput, ConsolePrompt};
