use super::Jid;

/// Addressing of a delivered message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageKey {
    pub id: String,
    pub remote_jid: Jid,
    /// Author inside a group chat; absent for direct chats
    pub participant: Option<Jid>,
    pub from_me: bool,
}

impl MessageKey {
    pub fn new(remote_jid: impl Into<Jid>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            remote_jid: remote_jid.into(),
            participant: None,
            from_me: false,
        }
    }

    pub fn with_participant(mut self, participant: impl Into<Jid>) -> Self {
        self.participant = Some(participant.into());
        self
    }

    pub fn from_me(mut self) -> Self {
        self.from_me = true;
        self
    }
}

/// Message payload as delivered by the service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageContent {
    /// Plain text body
    pub conversation: Option<String>,
    /// Text of an extended (quoted, link-preview, formatted) message
    pub extended_text: Option<String>,
}

impl MessageContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            conversation: Some(text.into()),
            extended_text: None,
        }
    }

    /// Plain text of the payload, empty when no text field is present
    pub fn plain_text(&self) -> &str {
        self.conversation
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.extended_text.as_deref())
            .unwrap_or("")
    }
}

/// Raw inbound message event
#[derive(Debug, Clone)]
pub struct MessageEvent {
    pub key: MessageKey,
    /// `None` for protocol-level deliveries such as receipts
    pub message: Option<MessageContent>,
}

impl MessageEvent {
    pub fn new(key: MessageKey, message: Option<MessageContent>) -> Self {
        Self { key, message }
    }

    pub fn text(key: MessageKey, text: impl Into<String>) -> Self {
        Self::new(key, Some(MessageContent::text(text)))
    }
}

/// A text message extracted from an event, ready for dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub chat: Jid,
    pub participant: Option<Jid>,
    pub text: String,
    pub is_group: bool,
}

impl IncomingMessage {
    /// Author of the message: the group participant, or the chat itself
    pub fn sender(&self) -> &Jid {
        self.participant.as_ref().unwrap_or(&self.chat)
    }
}
