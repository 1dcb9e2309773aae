//! Connection supervisor - Keeps one logical session alive
//!
//! Each call to [`ConnectionSupervisor::start`] begins a new epoch: credentials
//! are loaded, a client is created, and the pairing flow runs if the
//! credentials are not linked yet. [`ConnectionSupervisor::drive`] consumes
//! the epoch's event stream until the connection closes. [`ConnectionSupervisor::run`]
//! loops over epochs until the session is logged out or shutdown is requested.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;

use super::Backoff;
use crate::application::errors::BotError;
use crate::application::messaging::{Dispatch, MessageRouter};
use crate::domain::entities::{BrowserTag, ClientEvent, ConnectionState, Credentials, DisconnectReason};
use crate::domain::traits::{ClientFactory, Connection, CredentialStore, MessagingClient, OperatorPrompt};

/// Tunables for the reconnect loop
#[derive(Debug, Clone)]
pub struct SupervisorOptions {
    pub browser: BrowserTag,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    /// How long in-flight message handlers may run after their epoch closed
    pub drain_timeout: Duration,
}

impl Default for SupervisorOptions {
    fn default() -> Self {
        Self {
            browser: BrowserTag::default(),
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(60),
            drain_timeout: Duration::from_secs(5),
        }
    }
}

/// Why the run loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorExit {
    /// The device was unlinked; reconnecting cannot succeed
    LoggedOut,
    /// Shutdown was requested; the current client has been released
    Shutdown,
}

/// How one epoch ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpochOutcome {
    Closed(DisconnectReason),
    /// The client dropped its event stream without a close event
    StreamEnded,
    Shutdown,
}

impl EpochOutcome {
    pub fn should_reconnect(&self) -> bool {
        match self {
            EpochOutcome::Closed(reason) => !reason.is_logout(),
            EpochOutcome::StreamEnded => true,
            EpochOutcome::Shutdown => false,
        }
    }
}

/// One running client and its event stream
pub struct Epoch {
    pub number: u64,
    pub client: Arc<dyn MessagingClient>,
    /// The pairing flow ran during this epoch's start
    pub paired: bool,
    events: mpsc::Receiver<ClientEvent>,
}

/// Summary returned by [`ConnectionSupervisor::drive`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochReport {
    pub outcome: EpochOutcome,
    pub reached_open: bool,
    pub paired: bool,
}

impl EpochReport {
    /// Whether the next epoch should wait for the backoff delay.
    ///
    /// Only the restart the service requests right after pairing skips it;
    /// repeated restart requests are throttled like any other close.
    pub fn needs_backoff(&self) -> bool {
        !(self.paired && self.outcome == EpochOutcome::Closed(DisconnectReason::RestartRequired))
    }
}

/// Owns the lifecycle of one logical session
pub struct ConnectionSupervisor {
    factory: Arc<dyn ClientFactory>,
    store: Arc<dyn CredentialStore>,
    prompt: Arc<dyn OperatorPrompt>,
    router: Arc<MessageRouter>,
    options: SupervisorOptions,
    state: ConnectionState,
    epoch: u64,
    phone_number: Option<String>,
    shutdown: watch::Receiver<bool>,
}

impl ConnectionSupervisor {
    pub fn new(
        factory: Arc<dyn ClientFactory>,
        store: Arc<dyn CredentialStore>,
        prompt: Arc<dyn OperatorPrompt>,
        router: MessageRouter,
        options: SupervisorOptions,
    ) -> Self {
        Self {
            factory,
            store,
            prompt,
            router: Arc::new(router),
            options,
            state: ConnectionState::Closed,
            epoch: 0,
            phone_number: None,
            shutdown: watch::channel(false).1,
        }
    }

    /// Stop at the next opportunity once `true` is sent on this channel
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Number of epochs started so far
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Run epochs until the session is logged out or shutdown is requested.
    ///
    /// A failure to start the first epoch is returned to the caller. Later
    /// start failures are logged and retried with the same backoff as
    /// disconnects.
    pub async fn run(&mut self) -> Result<SupervisorExit, BotError> {
        let mut backoff = Backoff::new(self.options.initial_backoff, self.options.max_backoff);
        let mut shutdown = self.shutdown.clone();
        let mut bootstrapped = false;

        loop {
            let started = tokio::select! {
                started = self.start() => Some(started),
                _ = shutdown_requested(&mut shutdown) => None,
            };
            let Some(started) = started else {
                return Ok(self.stopped());
            };

            let epoch = match started {
                Ok(epoch) => epoch,
                Err(e) if !bootstrapped => return Err(e),
                Err(e) => {
                    tracing::warn!("Failed to start epoch {}: {}", self.epoch, e);
                    if !self.pause(backoff.next_delay()).await {
                        return Ok(self.stopped());
                    }
                    continue;
                }
            };
            bootstrapped = true;

            let report = self.drive(epoch).await;
            if report.reached_open {
                backoff.reset();
            }

            if !report.outcome.should_reconnect() {
                return Ok(match report.outcome {
                    EpochOutcome::Closed(reason) => {
                        tracing::error!("Session logged out ({}); not reconnecting", reason);
                        SupervisorExit::LoggedOut
                    }
                    _ => self.stopped(),
                });
            }

            if report.needs_backoff() && !self.pause(backoff.next_delay()).await {
                return Ok(self.stopped());
            }
        }
    }

    /// Begin a new epoch: load credentials, create the client, pair if needed
    pub async fn start(&mut self) -> Result<Epoch, BotError> {
        self.epoch += 1;
        self.state = ConnectionState::Connecting;

        let credentials = self.store.load_or_init().await?;
        let version = self.factory.fetch_protocol_version().await?;
        tracing::info!(
            "Epoch {}: connecting (protocol {}, browser {})",
            self.epoch,
            version,
            self.options.browser
        );

        let Connection { client, events } = self
            .factory
            .connect(credentials, version, &self.options.browser)
            .await?;

        let paired = !client.is_registered();
        if paired {
            if let Err(e) = self.pair(client.as_ref()).await {
                client.close().await;
                return Err(e);
            }
        }

        Ok(Epoch {
            number: self.epoch,
            client,
            paired,
            events,
        })
    }

    /// Consume an epoch's events until its connection closes, then release it
    pub async fn drive(&mut self, epoch: Epoch) -> EpochReport {
        let Epoch { number, client, paired, mut events } = epoch;
        let mut handlers: JoinSet<Dispatch> = JoinSet::new();
        let mut reached_open = false;
        let mut shutdown = self.shutdown.clone();

        let outcome = loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else {
                        tracing::warn!("Epoch {}: event stream ended without a close", number);
                        self.state = ConnectionState::Closed;
                        break EpochOutcome::StreamEnded;
                    };

                    match event {
                        ClientEvent::Connecting => self.state = ConnectionState::Connecting,
                        ClientEvent::Open => {
                            self.state = ConnectionState::Open;
                            reached_open = true;
                            tracing::info!("✅ Bot connected successfully!");
                        }
                        ClientEvent::Closed(reason) => {
                            self.state = ConnectionState::Closed;
                            tracing::warn!(
                                "Connection closed: {}. Reconnecting: {}",
                                reason,
                                !reason.is_logout()
                            );
                            break EpochOutcome::Closed(reason);
                        }
                        ClientEvent::CredentialsUpdated(credentials) => self.persist(&credentials).await,
                        ClientEvent::MessageReceived(message) => {
                            let router = self.router.clone();
                            let client = client.clone();
                            handlers.spawn(async move { router.handle(client.as_ref(), &message).await });
                        }
                    }
                }
                Some(joined) = handlers.join_next(), if !handlers.is_empty() => {
                    Self::log_handler(joined);
                }
                _ = shutdown_requested(&mut shutdown) => {
                    tracing::info!("Epoch {}: shutdown requested", number);
                    self.state = ConnectionState::Closed;
                    break EpochOutcome::Shutdown;
                }
            }
        };

        // Credential updates queued behind the close still have to land on disk.
        while let Ok(event) = events.try_recv() {
            if let ClientEvent::CredentialsUpdated(credentials) = event {
                self.persist(&credentials).await;
            }
        }
        drop(events);

        self.release(number, handlers, client.as_ref()).await;

        EpochReport { outcome, reached_open, paired }
    }

    async fn pair(&mut self, client: &dyn MessagingClient) -> Result<(), BotError> {
        let number = match &self.phone_number {
            Some(number) => number.clone(),
            None => {
                let raw = self.prompt.ask_phone_number().await?;
                let number = normalize_phone_number(&raw);
                if number.is_empty() {
                    return Err(BotError::Pairing(format!("no digits in phone number {:?}", raw)));
                }
                self.phone_number = Some(number.clone());
                number
            }
        };

        let code = client.request_pairing_code(&number).await?;
        tracing::info!("Pairing code issued for {}", number);
        self.prompt.show_pairing_code(&code);
        Ok(())
    }

    async fn persist(&self, credentials: &Credentials) {
        if let Err(e) = self.store.save(credentials).await {
            tracing::error!("Failed to persist credentials: {}", e);
        }
    }

    async fn release(&self, number: u64, mut handlers: JoinSet<Dispatch>, client: &dyn MessagingClient) {
        if !handlers.is_empty() {
            let drained = tokio::time::timeout(self.options.drain_timeout, async {
                while let Some(joined) = handlers.join_next().await {
                    Self::log_handler(joined);
                }
            })
            .await;

            if drained.is_err() {
                tracing::warn!("Epoch {}: aborting {} unfinished message handlers", number, handlers.len());
                handlers.shutdown().await;
            }
        }

        client.close().await;
        tracing::debug!("Epoch {}: released ({})", number, self.state());
    }

    fn log_handler(joined: Result<Dispatch, tokio::task::JoinError>) {
        match joined {
            Ok(dispatch) => tracing::debug!("Message handled: {:?}", dispatch),
            Err(e) if e.is_panic() => tracing::error!("Message handler panicked: {}", e),
            Err(_) => {}
        }
    }

    /// Wait before the next epoch. Returns `false` if shutdown interrupted the wait.
    async fn pause(&self, delay: Duration) -> bool {
        let mut shutdown = self.shutdown.clone();
        if *shutdown.borrow() {
            return false;
        }
        if delay.is_zero() {
            return true;
        }

        tracing::info!("Reconnecting in {:?}", delay);
        tokio::select! {
            _ = tokio::time::sleep(delay) => true,
            _ = shutdown_requested(&mut shutdown) => false,
        }
    }

    fn stopped(&mut self) -> SupervisorExit {
        self.state = ConnectionState::Closed;
        tracing::info!("Supervisor stopped after {} epochs", self.epoch());
        SupervisorExit::Shutdown
    }
}

/// Resolves once `true` is sent; never if every sender is gone
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Keep only ASCII digits of an operator-entered phone number
pub fn normalize_phone_number(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}
