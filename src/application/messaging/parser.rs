//! Message parser - Turns raw message events into dispatchable messages

use crate::domain::entities::{IncomingMessage, MessageEvent};

/// Parses inbound events into `IncomingMessage` values
#[derive(Debug, Default, Clone, Copy)]
pub struct MessageParser;

impl MessageParser {
    pub fn new() -> Self {
        Self
    }

    /// Extract chat context and text from an event.
    ///
    /// Returns `None` for events without a message payload (receipts and other
    /// protocol-level deliveries). A payload without any text field yields an
    /// empty text.
    pub fn parse(&self, event: &MessageEvent) -> Option<IncomingMessage> {
        let content = event.message.as_ref()?;
        let chat = event.key.remote_jid.clone();

        Some(IncomingMessage {
            is_group: chat.is_group(),
            participant: event.key.participant.clone(),
            text: content.plain_text().to_string(),
            chat,
        })
    }
}
