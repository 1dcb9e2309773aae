use crate::application::errors::ModerationError;
use crate::domain::entities::Jid;
use crate::domain::traits::MessagingClient;

/// Result of a `kickall` run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KickReport {
    pub group: Jid,
    pub removed: Vec<Jid>,
}

/// Service for group moderation actions
#[derive(Debug, Default, Clone, Copy)]
pub struct ModerationService;

impl ModerationService {
    pub fn new() -> Self {
        Self
    }

    /// Remove every participant of `group` except the bot itself.
    ///
    /// The participant list is fetched fresh on every call. Participants are
    /// compared and submitted in canonical form, in one removal request, even
    /// when the bot is the only member left.
    pub async fn kick_all(
        &self,
        client: &dyn MessagingClient,
        group: &Jid,
    ) -> Result<KickReport, ModerationError> {
        let me = client.self_identity().ok_or(ModerationError::UnknownSelf)?;

        let metadata = client
            .group_metadata(group)
            .await
            .map_err(ModerationError::Metadata)?;

        let to_remove: Vec<Jid> = metadata
            .participants
            .iter()
            .map(|p| p.id.normalized())
            .filter(|jid| !me.is_self(jid))
            .collect();

        tracing::info!("kickall in {}: removing {} participants", group, to_remove.len());
        client
            .remove_participants(group, &to_remove)
            .await
            .map_err(ModerationError::Removal)?;

        Ok(KickReport { group: group.clone(), removed: to_remove })
    }
}
