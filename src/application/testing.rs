//! In-memory collaborators for tests

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use tokio::sync::mpsc;

use crate::application::errors::{BotError, ClientError, StorageError};
use crate::domain::entities::{
    BrowserTag, ClientEvent, Credentials, GroupMetadata, Jid, Participant, ProtocolVersion, SelfIdentity,
};
use crate::domain::traits::{ClientFactory, Connection, CredentialStore, MessagingClient, OperatorPrompt};

static INIT: Once = Once::new();

/// Route tracing output through the test harness, once per process
pub fn ensure_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
            .with_test_writer()
            .try_init();
    });
}

/// Client that records every outbound call
#[derive(Clone, Default)]
pub struct FakeClient {
    registered: bool,
    me: Option<SelfIdentity>,
    groups: HashMap<Jid, Vec<Jid>>,
    fail_sends: bool,
    fail_removals: bool,
    sent: Arc<Mutex<Vec<(Jid, String)>>>,
    removals: Arc<Mutex<Vec<(Jid, Vec<Jid>)>>>,
    pairing_requests: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
}

impl FakeClient {
    pub fn registered(me: &str) -> Self {
        Self {
            registered: true,
            me: Some(SelfIdentity::new(me)),
            ..Self::default()
        }
    }

    pub fn unregistered() -> Self {
        Self::default()
    }

    pub fn with_lid(mut self, lid: &str) -> Self {
        self.me = self.me.map(|me| me.with_lid(lid));
        self
    }

    pub fn with_group(mut self, group: &str, participants: &[&str]) -> Self {
        self.groups
            .insert(Jid::new(group), participants.iter().map(|p| Jid::new(*p)).collect());
        self
    }

    pub fn failing_sends(mut self) -> Self {
        self.fail_sends = true;
        self
    }

    pub fn failing_removals(mut self) -> Self {
        self.fail_removals = true;
        self
    }

    pub fn sent(&self) -> Vec<(Jid, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn removals(&self) -> Vec<(Jid, Vec<Jid>)> {
        self.removals.lock().unwrap().clone()
    }

    pub fn pairing_requests(&self) -> Vec<String> {
        self.pairing_requests.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessagingClient for FakeClient {
    fn is_registered(&self) -> bool {
        self.registered
    }

    fn self_identity(&self) -> Option<SelfIdentity> {
        self.me.clone()
    }

    async fn request_pairing_code(&self, phone_number: &str) -> Result<String, ClientError> {
        let count = {
            let mut requests = self.pairing_requests.lock().unwrap();
            requests.push(phone_number.to_string());
            requests.len()
        };
        Ok(format!("PAIR-{:04}", count))
    }

    async fn send_text(&self, chat: &Jid, text: &str) -> Result<(), ClientError> {
        if self.fail_sends {
            return Err(ClientError::Request("send rejected".to_string()));
        }
        self.sent.lock().unwrap().push((chat.clone(), text.to_string()));
        Ok(())
    }

    async fn group_metadata(&self, group: &Jid) -> Result<GroupMetadata, ClientError> {
        let participants = self
            .groups
            .get(group)
            .ok_or_else(|| ClientError::NotFound(group.to_string()))?;

        Ok(GroupMetadata {
            id: group.clone(),
            subject: None,
            participants: participants.iter().cloned().map(Participant::new).collect(),
        })
    }

    async fn remove_participants(&self, group: &Jid, participants: &[Jid]) -> Result<(), ClientError> {
        if self.fail_removals {
            return Err(ClientError::NotAuthorized("bot is not an admin".to_string()));
        }
        self.removals.lock().unwrap().push((group.clone(), participants.to_vec()));
        Ok(())
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Events and registration state for one scripted epoch
pub struct EpochScript {
    pub registered: bool,
    pub events: Vec<ClientEvent>,
    /// Keep the stream open after the scripted events instead of ending it
    pub held_open: bool,
}

impl EpochScript {
    pub fn registered(events: Vec<ClientEvent>) -> Self {
        Self { registered: true, events, held_open: false }
    }

    pub fn unregistered(events: Vec<ClientEvent>) -> Self {
        Self { registered: false, events, held_open: false }
    }

    pub fn held_open(mut self) -> Self {
        self.held_open = true;
        self
    }
}

/// Factory that replays one script per `connect` call
pub struct FakeFactory {
    scripts: Mutex<VecDeque<EpochScript>>,
    fail_version: bool,
    clients: Mutex<Vec<FakeClient>>,
    credentials_seen: Mutex<Vec<Credentials>>,
    held: Mutex<Vec<mpsc::Sender<ClientEvent>>>,
}

impl FakeFactory {
    pub fn new(scripts: Vec<EpochScript>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            fail_version: false,
            clients: Mutex::new(Vec::new()),
            credentials_seen: Mutex::new(Vec::new()),
            held: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_version(mut self) -> Self {
        self.fail_version = true;
        self
    }

    pub fn connects(&self) -> usize {
        self.clients.lock().unwrap().len()
    }

    pub fn clients(&self) -> Vec<FakeClient> {
        self.clients.lock().unwrap().clone()
    }

    pub fn credentials_seen(&self) -> Vec<Credentials> {
        self.credentials_seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClientFactory for FakeFactory {
    async fn fetch_protocol_version(&self) -> Result<ProtocolVersion, ClientError> {
        if self.fail_version {
            return Err(ClientError::Request("version endpoint unreachable".to_string()));
        }
        Ok(ProtocolVersion([2, 3000, 1]))
    }

    async fn connect(
        &self,
        credentials: Credentials,
        _version: ProtocolVersion,
        _browser: &BrowserTag,
    ) -> Result<Connection, ClientError> {
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ClientError::Request("no scripted epoch left".to_string()))?;

        let client = if script.registered {
            FakeClient::registered("111@s.whatsapp.net")
        } else {
            FakeClient::unregistered()
        };

        let (tx, rx) = mpsc::channel(script.events.len() + 1);
        for event in script.events {
            let _ = tx.try_send(event);
        }
        if script.held_open {
            self.held.lock().unwrap().push(tx);
        }

        self.credentials_seen.lock().unwrap().push(credentials);
        self.clients.lock().unwrap().push(client.clone());

        Ok(Connection {
            client: Arc::new(client),
            events: rx,
        })
    }
}

/// Credential store that keeps every saved state
#[derive(Default)]
pub struct MemoryStore {
    saved: Mutex<Vec<Credentials>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved(&self) -> Vec<Credentials> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn load_or_init(&self) -> Result<Credentials, StorageError> {
        Ok(self.saved.lock().unwrap().last().cloned().unwrap_or_default())
    }

    async fn save(&self, credentials: &Credentials) -> Result<(), StorageError> {
        self.saved.lock().unwrap().push(credentials.clone());
        Ok(())
    }
}

/// Prompt with a fixed operator answer
pub struct ScriptedPrompt {
    answer: String,
    asked: AtomicUsize,
    shown: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            asked: AtomicUsize::new(0),
            shown: Mutex::new(Vec::new()),
        }
    }

    pub fn asked(&self) -> usize {
        self.asked.load(Ordering::SeqCst)
    }

    pub fn shown(&self) -> Vec<String> {
        self.shown.lock().unwrap().clone()
    }
}

#[async_trait]
impl OperatorPrompt for ScriptedPrompt {
    async fn ask_phone_number(&self) -> Result<String, BotError> {
        self.asked.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer.clone())
    }

    fn show_pairing_code(&self, code: &str) {
        self.shown.lock().unwrap().push(code.to_string());
    }
}
