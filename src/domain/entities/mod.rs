//! Domain entities - Core business objects with no external dependencies

pub mod jid;
pub mod message;
pub mod command;
pub mod connection;
pub mod credentials;
pub mod group;

pub use jid::Jid;
pub use message::{IncomingMessage, MessageEvent, MessageKey};
pub use command::{Command, COMMANDS};
pub use connection::{BrowserTag, ClientEvent, ConnectionState, DisconnectReason, ProtocolVersion};
pub use credentials::Credentials;
pub use group::{GroupMetadata, Participant, SelfIdentity};
