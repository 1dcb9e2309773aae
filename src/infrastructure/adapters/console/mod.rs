//! Console adapter for development/testing
//!
//! Simulates the messaging service on the terminal. Each stdin line is either a
//! control command or an inbound message:
//!
//! ```text
//! ping                                        direct message from yourself
//! 120363@g.us kickall                         group message from yourself
//! 120363@g.us 222@s.whatsapp.net: hello       group message from another participant
//! !drop                                       simulate a dropped connection
//! !logout                                     simulate the device being unlinked
//! !close 515                                  close with a service status code
//! ```
//!
//! Removals are only accepted in groups the bot is a member of.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::application::errors::{BotError, ClientError};
use crate::domain::entities::{
    BrowserTag, ClientEvent, Credentials, DisconnectReason, GroupMetadata, Jid, MessageEvent, MessageKey,
    Participant, ProtocolVersion, SelfIdentity,
};
use crate::domain::traits::{ClientFactory, Connection, MessagingClient, OperatorPrompt};

const EVENT_BUFFER: usize = 64;

static MESSAGE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<chat>\S+@\S+)(?:\s+(?P<sender>\S+@\S+):)?\s+(?P<text>.*)$").unwrap()
});

/// Lines read from the terminal, shared by the prompt and the simulated service
pub struct ConsoleInput {
    lines: tokio::sync::Mutex<mpsc::UnboundedReceiver<String>>,
}

impl ConsoleInput {
    /// Read stdin on a dedicated thread so the runtime never blocks on it
    pub fn stdin() -> Arc<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Self::from_receiver(rx)
    }

    pub fn from_receiver(rx: mpsc::UnboundedReceiver<String>) -> Arc<Self> {
        Arc::new(Self {
            lines: tokio::sync::Mutex::new(rx),
        })
    }

    /// Next line, or `None` once the terminal is closed
    pub async fn next_line(&self) -> Option<String> {
        self.lines.lock().await.recv().await
    }
}

/// Pairing prompt on the terminal
pub struct ConsolePrompt {
    input: Arc<ConsoleInput>,
}

impl ConsolePrompt {
    pub fn new(input: Arc<ConsoleInput>) -> Self {
        Self { input }
    }
}

#[async_trait]
impl OperatorPrompt for ConsolePrompt {
    async fn ask_phone_number(&self) -> Result<String, BotError> {
        print!("Enter your WhatsApp number (with country code, e.g. 2348012345678): ");
        std::io::stdout()
            .flush()
            .map_err(|e| BotError::Prompt(e.to_string()))?;

        self.input
            .next_line()
            .await
            .ok_or_else(|| BotError::Prompt("stdin closed before a phone number was entered".to_string()))
    }

    fn show_pairing_code(&self, code: &str) {
        println!("\n==============================");
        println!("  Your Pair Code: {}", code);
        println!("==============================");
        println!("Enter this code in WhatsApp > Linked Devices > Link a Device\n");
    }
}

/// A parsed terminal line
#[derive(Debug, Clone)]
pub enum ConsoleLine {
    Blank,
    Disconnect(DisconnectReason),
    Message(MessageEvent),
}

/// Interpret one terminal line as seen by the account `me`
pub fn parse_line(line: &str, me: &Jid) -> ConsoleLine {
    let line = line.trim();
    match line {
        "" => return ConsoleLine::Blank,
        "!drop" => return ConsoleLine::Disconnect(DisconnectReason::ConnectionLost),
        "!logout" => return ConsoleLine::Disconnect(DisconnectReason::LoggedOut),
        _ => {}
    }

    if let Some(code) = line.strip_prefix("!close ").and_then(|c| c.trim().parse::<u16>().ok()) {
        return ConsoleLine::Disconnect(DisconnectReason::from_status_code(code));
    }

    let Some(caps) = MESSAGE_LINE.captures(line) else {
        let key = MessageKey::new(me.clone()).from_me();
        return ConsoleLine::Message(MessageEvent::text(key, line));
    };

    let chat = Jid::new(&caps["chat"]);
    let text = caps.name("text").map(|m| m.as_str()).unwrap_or("");
    let key = match caps.name("sender") {
        Some(sender) if chat.is_group() => MessageKey::new(chat).with_participant(sender.as_str()),
        Some(_) => MessageKey::new(chat),
        None if chat.is_group() => MessageKey::new(chat).with_participant(me.clone()).from_me(),
        None => MessageKey::new(chat).from_me(),
    };

    ConsoleLine::Message(MessageEvent::text(key, text))
}

/// Groups known to the simulated service, shared across epochs
type Groups = Arc<Mutex<HashMap<Jid, Vec<Jid>>>>;

/// Creates console clients
pub struct ConsoleFactory {
    input: Arc<ConsoleInput>,
    version: ProtocolVersion,
    groups: Groups,
}

impl ConsoleFactory {
    pub fn new(input: Arc<ConsoleInput>, version: ProtocolVersion) -> Self {
        Self {
            input,
            version,
            groups: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn with_group(self, group: impl Into<Jid>, participants: impl IntoIterator<Item = Jid>) -> Self {
        if let Ok(mut groups) = self.groups.lock() {
            groups.insert(group.into(), participants.into_iter().collect());
        }
        self
    }
}

#[async_trait]
impl ClientFactory for ConsoleFactory {
    async fn fetch_protocol_version(&self) -> Result<ProtocolVersion, ClientError> {
        Ok(self.version)
    }

    async fn connect(
        &self,
        credentials: Credentials,
        version: ProtocolVersion,
        browser: &BrowserTag,
    ) -> Result<Connection, ClientError> {
        tracing::debug!("Console client {} on protocol {}", browser, version);

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let client = Arc::new(ConsoleClient {
            credentials: Mutex::new(credentials),
            events: tx,
            input: self.input.clone(),
            groups: self.groups.clone(),
            pump: Mutex::new(None),
            closed: AtomicBool::new(false),
        });

        client.emit(ClientEvent::Connecting).await;
        if client.is_registered() {
            client.emit(ClientEvent::Open).await;
            client.start_pump();
        }

        Ok(Connection { client, events: rx })
    }
}

/// Simulated client: prints outbound traffic, turns terminal lines into events
pub struct ConsoleClient {
    credentials: Mutex<Credentials>,
    events: mpsc::Sender<ClientEvent>,
    input: Arc<ConsoleInput>,
    groups: Groups,
    pump: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
}

impl ConsoleClient {
    async fn emit(&self, event: ClientEvent) {
        if self.events.send(event).await.is_err() {
            tracing::debug!("Console event dropped: epoch already finished");
        }
    }

    fn me(&self) -> Option<Jid> {
        self.credentials.lock().ok().and_then(|c| c.me.clone())
    }

    fn ensure_open(&self) -> Result<(), ClientError> {
        if self.closed.load(Ordering::SeqCst) {
            Err(ClientError::Closed)
        } else {
            Ok(())
        }
    }

    fn start_pump(&self) {
        let Some(me) = self.me() else { return };
        let input = self.input.clone();
        let events = self.events.clone();

        let handle = tokio::spawn(async move {
            println!("Console ready. Type a message, `!drop` or `!logout`.");
            while let Some(line) = input.next_line().await {
                let event = match parse_line(&line, &me) {
                    ConsoleLine::Blank => continue,
                    ConsoleLine::Message(message) => ClientEvent::MessageReceived(message),
                    ConsoleLine::Disconnect(reason) => {
                        let _ = events.send(ClientEvent::Closed(reason)).await;
                        return;
                    }
                };
                if events.send(event).await.is_err() {
                    return;
                }
            }
            tracing::info!("Console input closed; no more inbound messages");
        });

        if let Ok(mut pump) = self.pump.lock() {
            *pump = Some(handle);
        }
    }
}

#[async_trait]
impl MessagingClient for ConsoleClient {
    fn is_registered(&self) -> bool {
        self.credentials.lock().map(|c| c.registered).unwrap_or(false)
    }

    fn self_identity(&self) -> Option<SelfIdentity> {
        let creds = self.credentials.lock().ok()?;
        let identity = SelfIdentity::new(creds.me.clone()?);
        Some(match creds.lid.clone() {
            Some(lid) => identity.with_lid(lid),
            None => identity,
        })
    }

    async fn request_pairing_code(&self, phone_number: &str) -> Result<String, ClientError> {
        self.ensure_open()?;

        let raw = uuid::Uuid::new_v4().simple().to_string().to_uppercase();
        let code = format!("{}-{}", &raw[..4], &raw[4..8]);

        // The simulated service links immediately and then asks for a restart.
        let linked = Credentials::registered_as(Jid::from_phone(phone_number));
        if let Ok(mut creds) = self.credentials.lock() {
            *creds = linked.clone();
        }
        self.emit(ClientEvent::CredentialsUpdated(linked)).await;
        self.emit(ClientEvent::Closed(DisconnectReason::RestartRequired)).await;

        Ok(code)
    }

    async fn send_text(&self, chat: &Jid, text: &str) -> Result<(), ClientError> {
        self.ensure_open()?;
        println!("[BOT → {}] {}", chat, text);
        Ok(())
    }

    async fn group_metadata(&self, group: &Jid) -> Result<GroupMetadata, ClientError> {
        self.ensure_open()?;
        let groups = self
            .groups
            .lock()
            .map_err(|_| ClientError::Request("group state poisoned".to_string()))?;
        let participants = groups
            .get(group)
            .ok_or_else(|| ClientError::NotFound(format!("group {}", group)))?;

        Ok(GroupMetadata {
            id: group.clone(),
            subject: None,
            participants: participants.iter().cloned().map(Participant::new).collect(),
        })
    }

    async fn remove_participants(&self, group: &Jid, participants: &[Jid]) -> Result<(), ClientError> {
        self.ensure_open()?;
        let me = self.self_identity();
        let mut groups = self
            .groups
            .lock()
            .map_err(|_| ClientError::Request("group state poisoned".to_string()))?;
        let members = groups
            .get_mut(group)
            .ok_or_else(|| ClientError::NotFound(format!("group {}", group)))?;

        if !members.iter().any(|m| me.as_ref().is_some_and(|me| me.is_self(m))) {
            return Err(ClientError::NotAuthorized(format!("bot is not a member of {}", group)));
        }

        members.retain(|m| !participants.iter().any(|p| p.same_identity(m)));
        println!("[GROUP {}] removed {} participants, {} left", group, participants.len(), members.len());
        Ok(())
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        let pump = self.pump.lock().ok().and_then(|mut p| p.take());
        if let Some(pump) = pump {
            pump.abort();
        }
    }
}
