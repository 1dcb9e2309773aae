use serde::{Deserialize, Serialize};
use std::fmt;

/// Server suffix used by group chats
pub const GROUP_SERVER: &str = "g.us";
/// Server suffix used by individual accounts
pub const USER_SERVER: &str = "s.whatsapp.net";
/// Legacy server suffix, canonicalized to [`USER_SERVER`]
pub const LEGACY_USER_SERVER: &str = "c.us";

/// Address of a chat, participant, or the bot itself (`user[:device]@server`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Jid(String);

impl Jid {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Build a user address from a phone number
    pub fn from_phone(number: &str) -> Self {
        Self(format!("{}@{}", number, USER_SERVER))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn server(&self) -> Option<&str> {
        self.0.split_once('@').map(|(_, server)| server)
    }

    pub fn is_group(&self) -> bool {
        self.server() == Some(GROUP_SERVER)
    }

    /// Canonical form used for identity comparison.
    ///
    /// Drops the device suffix (`user:12@server` -> `user@server`) and maps the
    /// legacy `c.us` server to `s.whatsapp.net`. Addresses without a server are
    /// returned unchanged.
    pub fn normalized(&self) -> Jid {
        let Some((user, server)) = self.0.split_once('@') else {
            return self.clone();
        };

        let user = user.split(':').next().unwrap_or(user);
        let server = if server == LEGACY_USER_SERVER { USER_SERVER } else { server };

        Jid(format!("{}@{}", user, server))
    }

    /// Compare two addresses by canonical identity
    pub fn same_identity(&self, other: &Jid) -> bool {
        self.normalized() == other.normalized()
    }
}

impl fmt::Display for Jid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Jid {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}
