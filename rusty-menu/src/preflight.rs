use tracing::warn;
use twilight_model::guild::Permissions;

use crate::client::{Destination, MenuClient};

/// Capabilities a guild menu needs for normal operation.
pub const REQUIRED_PERMISSIONS: Permissions = Permissions::SEND_MESSAGES
    .union(Permissions::EMBED_LINKS)
    .union(Permissions::ADD_REACTIONS)
    .union(Permissions::MANAGE_MESSAGES);

/// Result of the advisory permission check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreflightOutcome {
    /// Direct messages are not checked.
    Skipped,
    /// Every required permission is present.
    Satisfied,
    /// Some required permissions are absent.
    Missing(Permissions),
    /// Permissions could not be resolved.
    Unknown,
}

/// Required permissions absent from `granted`. Administrator grants everything.
pub fn missing_permissions(granted: Permissions) -> Permissions {
    if granted.contains(Permissions::ADMINISTRATOR) {
        return Permissions::empty();
    }

    REQUIRED_PERMISSIONS.difference(granted)
}

/// Convert a permission bitset into a sorted display list.
pub fn permission_names(perms: Permissions) -> Vec<String> {
    let mut names: Vec<String> = perms
        .iter_names()
        .map(|(name, _flag)| name.to_owned())
        .collect();
    names.sort_unstable();
    names
}

/// Check the bot's permissions in a guild destination and log what is missing.
///
/// Never fails; the outcome is informational.
pub async fn check_permissions(
    client: &dyn MenuClient,
    destination: &Destination,
) -> PreflightOutcome {
    let Destination::Channel(channel_id) = *destination else {
        return PreflightOutcome::Skipped;
    };

    let granted = match client.channel_permissions(channel_id).await {
        Ok(Some(granted)) => granted,
        Ok(None) => {
            warn!(%channel_id, "could not resolve bot permissions for menu channel");
            return PreflightOutcome::Unknown;
        }
        Err(source) => {
            warn!(%channel_id, ?source, "failed to check bot permissions for menu channel");
            return PreflightOutcome::Unknown;
        }
    };

    let missing = missing_permissions(granted);
    if missing.is_empty() {
        return PreflightOutcome::Satisfied;
    }

    warn!(
        %channel_id,
        missing = %permission_names(missing).join(", "),
        "bot is missing permissions needed for menus; expect problems in this channel"
    );
    PreflightOutcome::Missing(missing)
}
