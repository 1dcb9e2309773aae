//! Fixed reply texts

use chrono::{DateTime, Local};
use crate::domain::entities::COMMANDS;

pub const GREETING: &str = "👋 Hello! I am a WhatsApp bot. Type *help* to see commands.";
pub const PONG: &str = "🏓 Pong! Bot is alive!";
pub const GROUP_ONLY: &str = "❌ This command can only be used in group chats.";
pub const KICK_FAILED: &str = "⚠️ Could not remove participants from this group.";

/// Command menu built from the command table
pub fn help_menu() -> String {
    let mut help = "*Available Commands:*\n".to_string();
    for cmd in COMMANDS {
        help.push_str(&format!("\n• *{}* - {}", cmd.label(), cmd.description));
    }
    help
}

pub fn current_time(now: DateTime<Local>) -> String {
    format!("🕐 Current time: {}", now.format("%-m/%-d/%Y, %-I:%M:%S %p"))
}
