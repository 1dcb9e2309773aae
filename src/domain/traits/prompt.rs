use async_trait::async_trait;
use crate::application::errors::BotError;

/// Operator-facing input and output used during pairing
#[async_trait]
pub trait OperatorPrompt: Send + Sync {
    /// Ask the operator for the account's phone number (blocking until answered)
    async fn ask_phone_number(&self) -> Result<String, BotError>;

    /// Show the pairing code to the operator
    fn show_pairing_code(&self, code: &str);
}
