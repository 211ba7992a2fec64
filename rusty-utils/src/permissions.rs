use twilight_http::Client;
use twilight_model::{
    channel::{ChannelType, permission_overwrite::PermissionOverwrite},
    guild::Permissions,
    id::{
        Id,
        marker::{ChannelMarker, GuildMarker, RoleMarker, UserMarker},
    },
};
use twilight_util::permission_calculator::PermissionCalculator;

/// Effective permissions of `user_id` in one guild channel.
///
/// `roles` yields `(role id, role permissions)` for every role in the guild;
/// the `@everyone` role is picked out by the guild id. Owners and
/// administrators get everything, otherwise overwrites are layered on top of
/// the role union.
pub fn channel_permissions(
    guild_id: Id<GuildMarker>,
    owner_id: Id<UserMarker>,
    user_id: Id<UserMarker>,
    member_roles: &[Id<RoleMarker>],
    roles: impl IntoIterator<Item = (Id<RoleMarker>, Permissions)>,
    channel_kind: ChannelType,
    overwrites: &[PermissionOverwrite],
) -> Permissions {
    let mut everyone = Permissions::empty();
    let mut held = Vec::new();

    for (role_id, permissions) in roles {
        if role_id == guild_id.cast() {
            everyone = permissions;
        } else if member_roles.contains(&role_id) {
            held.push((role_id, permissions));
        }
    }

    PermissionCalculator::new(guild_id, user_id, everyone, &held)
        .owner_id(owner_id)
        .in_channel(channel_kind, overwrites)
}

/// Resolve a user's effective permissions in a guild channel.
///
/// Returns `Ok(None)` for channels outside a guild.
pub async fn resolve_channel_permissions(
    http: &Client,
    channel_id: Id<ChannelMarker>,
    user_id: Id<UserMarker>,
) -> anyhow::Result<Option<Permissions>> {
    let channel = http.channel(channel_id).await?.model().await?;

    let Some(guild_id) = channel.guild_id else {
        return Ok(None);
    };

    let guild = http.guild(guild_id).await?.model().await?;
    let member = http.guild_member(guild_id, user_id).await?.model().await?;
    let roles = http.roles(guild_id).await?.model().await?;
    let overwrites = channel.permission_overwrites.unwrap_or_default();

    Ok(Some(channel_permissions(
        guild_id,
        guild.owner_id,
        user_id,
        &member.roles,
        roles.iter().map(|role| (role.id, role.permissions)),
        channel.kind,
        &overwrites,
    )))
}
