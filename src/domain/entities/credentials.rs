use super::Jid;
use serde::{Deserialize, Serialize};

/// Session credentials for one bot identity.
///
/// The key material is opaque to the bot; only the client implementation
/// interprets it. `registered` and `me` are surfaced because the supervisor
/// and router need them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub registered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub me: Option<Jid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lid: Option<Jid>,
    #[serde(flatten)]
    pub material: serde_json::Map<String, serde_json::Value>,
}

impl Credentials {
    pub fn registered_as(me: Jid) -> Self {
        Self {
            registered: true,
            me: Some(me),
            ..Self::default()
        }
    }
}
