use super::Jid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: Jid,
    pub is_admin: bool,
}

impl Participant {
    pub fn new(id: impl Into<Jid>) -> Self {
        Self {
            id: id.into(),
            is_admin: false,
        }
    }
}

/// Snapshot of a group, fetched on demand and never cached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMetadata {
    pub id: Jid,
    pub subject: Option<String>,
    pub participants: Vec<Participant>,
}

/// Addresses the bot's own account is known by
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfIdentity {
    pub id: Jid,
    /// Linked-identity address, used by groups that hide phone numbers
    pub lid: Option<Jid>,
}

impl SelfIdentity {
    pub fn new(id: impl Into<Jid>) -> Self {
        Self {
            id: id.into(),
            lid: None,
        }
    }

    pub fn with_lid(mut self, lid: impl Into<Jid>) -> Self {
        self.lid = Some(lid.into());
        self
    }

    /// Whether `jid` refers to the bot, under canonical identity comparison
    pub fn is_self(&self, jid: &Jid) -> bool {
        let jid = jid.normalized();
        jid == self.id.normalized() || self.lid.as_ref().is_some_and(|lid| lid.normalized() == jid)
    }
}
