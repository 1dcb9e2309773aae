//! Message router - Dispatches inbound messages to command handlers

use chrono::Local;

use super::parser::MessageParser;
use super::replies;
use crate::application::services::ModerationService;
use crate::domain::entities::{Command, IncomingMessage, MessageEvent};
use crate::domain::traits::MessagingClient;

/// What the router did with one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// No message payload
    Ignored,
    /// Text matched no command
    Unmatched,
    Replied(Command),
    /// Command refused because its precondition failed
    Rejected(Command),
    Kicked { removed: usize },
    /// Handler failed; already logged
    Failed(Command),
}

/// Routes messages to the fixed command table
#[derive(Debug, Clone)]
pub struct MessageRouter {
    parser: MessageParser,
    moderation: ModerationService,
    notify_on_failure: bool,
}

impl MessageRouter {
    pub fn new() -> Self {
        Self {
            parser: MessageParser::new(),
            moderation: ModerationService::new(),
            notify_on_failure: false,
        }
    }

    /// Reply in the chat when `kickall` fails
    pub fn with_failure_notice(mut self, enabled: bool) -> Self {
        self.notify_on_failure = enabled;
        self
    }

    /// Handle one event. Never fails: every error is logged and absorbed here.
    pub async fn handle(&self, client: &dyn MessagingClient, event: &MessageEvent) -> Dispatch {
        let Some(msg) = self.parser.parse(event) else {
            return Dispatch::Ignored;
        };

        tracing::info!("📩 Message from {} in {}: {}", msg.sender(), msg.chat, msg.text);

        let Some(command) = Command::parse(&msg.text) else {
            return Dispatch::Unmatched;
        };

        if command.spec().group_only && !msg.is_group {
            return match self.reply(client, &msg, command, replies::GROUP_ONLY).await {
                Dispatch::Replied(cmd) => Dispatch::Rejected(cmd),
                other => other,
            };
        }

        match command {
            Command::Greeting => self.reply(client, &msg, command, replies::GREETING).await,
            Command::Help => self.reply(client, &msg, command, &replies::help_menu()).await,
            Command::Ping => self.reply(client, &msg, command, replies::PONG).await,
            Command::Time => {
                let text = replies::current_time(Local::now());
                self.reply(client, &msg, command, &text).await
            }
            Command::KickAll => self.kick_all(client, &msg).await,
        }
    }

    async fn reply(&self, client: &dyn MessagingClient, msg: &IncomingMessage, command: Command, text: &str) -> Dispatch {
        match client.send_text(&msg.chat, text).await {
            Ok(()) => Dispatch::Replied(command),
            Err(e) => {
                tracing::warn!("[{}] Failed to answer {}: {}", msg.chat, command.name(), e);
                Dispatch::Failed(command)
            }
        }
    }

    async fn kick_all(&self, client: &dyn MessagingClient, msg: &IncomingMessage) -> Dispatch {
        match self.moderation.kick_all(client, &msg.chat).await {
            Ok(report) => Dispatch::Kicked { removed: report.removed.len() },
            Err(e) => {
                tracing::error!("kickall error in {}: {}", msg.chat, e);
                if self.notify_on_failure {
                    if let Err(e) = client.send_text(&msg.chat, replies::KICK_FAILED).await {
                        tracing::warn!("[{}] Failed to report kickall failure: {}", msg.chat, e);
                    }
                }
                Dispatch::Failed(Command::KickAll)
            }
        }
    }
}

impl Default for MessageRouter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::FakeClient;
    use crate::domain::entities::message::MessageContent;
    use crate::domain::entities::{Jid, MessageKey, COMMANDS};

    const GROUP: &str = "120363025246125486@g.us";
    const DIRECT: &str = "2348012345678@s.whatsapp.net";

    fn direct(text: &str) -> MessageEvent {
        MessageEvent::text(MessageKey::new(DIRECT), text)
    }

    fn in_group(text: &str) -> MessageEvent {
        MessageEvent::text(MessageKey::new(GROUP).with_participant("222@s.whatsapp.net"), text)
    }

    #[tokio::test]
    async fn test_ping_scenario() {
        let client = FakeClient::registered("111@s.whatsapp.net");
        let router = MessageRouter::new();

        let outcome = router.handle(&client, &direct("  PING  ")).await;

        assert_eq!(outcome, Dispatch::Replied(Command::Ping));
        assert_eq!(client.sent(), vec![(Jid::new(DIRECT), "🏓 Pong! Bot is alive!".to_string())]);
    }

    #[tokio::test]
    async fn test_each_simple_command_replies_once() {
        for text in ["hi", "HELLO", " help", "Ping", "time "] {
            let client = FakeClient::registered("111@s.whatsapp.net");
            let outcome = MessageRouter::new().handle(&client, &direct(text)).await;

            assert!(matches!(outcome, Dispatch::Replied(_)), "{:?}", text);
            assert_eq!(client.sent().len(), 1, "{:?}", text);
            assert!(client.removals().is_empty());
        }
    }

    #[tokio::test]
    async fn test_time_reply() {
        let client = FakeClient::registered("111@s.whatsapp.net");
        MessageRouter::new().handle(&client, &direct("time")).await;

        assert!(client.sent()[0].1.starts_with("🕐 Current time: "));
    }

    #[tokio::test]
    async fn test_unmatched_text_is_silent() {
        let client = FakeClient::registered("111@s.whatsapp.net");
        let router = MessageRouter::new();

        for text in ["", "hi there", "pingg", "kick all", "🏓 Pong! Bot is alive!"] {
            assert_eq!(router.handle(&client, &direct(text)).await, Dispatch::Unmatched);
        }
        assert!(client.sent().is_empty());
    }

    #[tokio::test]
    async fn test_event_without_payload_is_ignored() {
        let client = FakeClient::registered("111@s.whatsapp.net");
        let event = MessageEvent::new(MessageKey::new(DIRECT), None);

        assert_eq!(MessageRouter::new().handle(&client, &event).await, Dispatch::Ignored);
        assert!(client.sent().is_empty());
    }

    #[tokio::test]
    async fn test_extended_text_is_dispatched() {
        let client = FakeClient::registered("111@s.whatsapp.net");
        let content = MessageContent {
            extended_text: Some("ping".to_string()),
            ..MessageContent::default()
        };
        let event = MessageEvent::new(MessageKey::new(DIRECT), Some(content));

        assert_eq!(MessageRouter::new().handle(&client, &event).await, Dispatch::Replied(Command::Ping));
    }

    #[tokio::test]
    async fn test_kickall_outside_group_is_rejected() {
        let client = FakeClient::registered("111@s.whatsapp.net");

        let outcome = MessageRouter::new().handle(&client, &direct("kickall")).await;

        assert_eq!(outcome, Dispatch::Rejected(Command::KickAll));
        assert_eq!(client.sent(), vec![(Jid::new(DIRECT), replies::GROUP_ONLY.to_string())]);
        assert!(client.removals().is_empty());
    }

    #[tokio::test]
    async fn test_group_only_commands_follow_the_table() {
        for spec in COMMANDS {
            let client = FakeClient::registered("111@s.whatsapp.net").with_group(GROUP, &["111@s.whatsapp.net"]);
            let outcome = MessageRouter::new().handle(&client, &direct(spec.name)).await;

            if spec.group_only {
                assert_eq!(outcome, Dispatch::Rejected(spec.command), "{}", spec.name);
                assert_eq!(client.sent(), vec![(Jid::new(DIRECT), replies::GROUP_ONLY.to_string())]);
            } else {
                assert_eq!(outcome, Dispatch::Replied(spec.command), "{}", spec.name);
            }
            assert!(client.removals().is_empty());
        }
    }

    #[tokio::test]
    async fn test_kickall_removes_everyone_but_self() {
        let client = FakeClient::registered("111@s.whatsapp.net")
            .with_group(GROUP, &["111@s.whatsapp.net", "222@s.whatsapp.net", "333@s.whatsapp.net"]);

        let outcome = MessageRouter::new().handle(&client, &in_group("kickall")).await;

        assert_eq!(outcome, Dispatch::Kicked { removed: 2 });
        let removals = client.removals();
        assert_eq!(removals.len(), 1);
        assert_eq!(removals[0].1, vec![Jid::new("222@s.whatsapp.net"), Jid::new("333@s.whatsapp.net")]);
        assert!(client.sent().is_empty());
    }

    #[tokio::test]
    async fn test_kickall_ignores_participant_order() {
        let client = FakeClient::registered("111@s.whatsapp.net")
            .with_group(GROUP, &["333@s.whatsapp.net", "111@s.whatsapp.net", "222@s.whatsapp.net"]);

        MessageRouter::new().handle(&client, &in_group("KICKALL")).await;

        let mut targets = client.removals()[0].1.clone();
        targets.sort();
        assert_eq!(targets, vec![Jid::new("222@s.whatsapp.net"), Jid::new("333@s.whatsapp.net")]);
    }

    #[tokio::test]
    async fn test_kickall_failure_is_silent_by_default() {
        let client = FakeClient::registered("111@s.whatsapp.net")
            .with_group(GROUP, &["111@s.whatsapp.net", "222@s.whatsapp.net"])
            .failing_removals();

        let outcome = MessageRouter::new().handle(&client, &in_group("kickall")).await;

        assert_eq!(outcome, Dispatch::Failed(Command::KickAll));
        assert!(client.sent().is_empty());
    }

    #[tokio::test]
    async fn test_kickall_failure_notice_when_enabled() {
        let client = FakeClient::registered("111@s.whatsapp.net");

        let outcome = MessageRouter::new()
            .with_failure_notice(true)
            .handle(&client, &in_group("kickall"))
            .await;

        assert_eq!(outcome, Dispatch::Failed(Command::KickAll));
        assert_eq!(client.sent(), vec![(Jid::new(GROUP), replies::KICK_FAILED.to_string())]);
    }

    #[tokio::test]
    async fn test_send_failure_is_absorbed() {
        let client = FakeClient::registered("111@s.whatsapp.net").failing_sends();

        let outcome = MessageRouter::new().handle(&client, &direct("ping")).await;

        assert_eq!(outcome, Dispatch::Failed(Command::Ping));
    }
}
