use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::errors::ClientError;
use crate::domain::entities::{
    BrowserTag, ClientEvent, Credentials, GroupMetadata, Jid, ProtocolVersion, SelfIdentity,
};

/// A running connection to the messaging service
#[async_trait]
pub trait MessagingClient: Send + Sync {
    /// Whether the bound credentials are linked to an account
    fn is_registered(&self) -> bool;

    /// The bot's own addresses, once known
    fn self_identity(&self) -> Option<SelfIdentity>;

    /// Request a pairing code for a digits-only phone number
    async fn request_pairing_code(&self, phone_number: &str) -> Result<String, ClientError>;

    /// Send a text message to a chat
    async fn send_text(&self, chat: &Jid, text: &str) -> Result<(), ClientError>;

    /// Fetch the current participant list of a group
    async fn group_metadata(&self, group: &Jid) -> Result<GroupMetadata, ClientError>;

    /// Remove participants from a group in one request
    async fn remove_participants(&self, group: &Jid, participants: &[Jid]) -> Result<(), ClientError>;

    /// Release sockets and background tasks. Must be idempotent.
    async fn close(&self);
}

/// A freshly created client together with its event stream
pub struct Connection {
    pub client: Arc<dyn MessagingClient>,
    pub events: mpsc::Receiver<ClientEvent>,
}

/// Creates clients bound to a credential state
#[async_trait]
pub trait ClientFactory: Send + Sync {
    /// Latest protocol version supported by the service
    async fn fetch_protocol_version(&self) -> Result<ProtocolVersion, ClientError>;

    /// Construct and start a client. The event stream is live on return.
    async fn connect(
        &self,
        credentials: Credentials,
        version: ProtocolVersion,
        browser: &BrowserTag,
    ) -> Result<Connection, ClientError>;
}
