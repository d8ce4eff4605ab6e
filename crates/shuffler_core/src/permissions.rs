//! Permission rules for members and for the bot itself.

use crate::RoleSnapshot;
use shuffler_error::{GuardError, GuardErrorKind, GuardResult};
use tracing::{debug, instrument};

/// Permission name shown to members who are refused.
pub const REQUIRED_PERMISSION: &str = "Manage Roles or Administrator";

/// What the invoking member is allowed to do in the guild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemberAuthority {
    /// Member snowflake
    pub user_id: u64,
    /// Member owns the guild
    pub is_owner: bool,
    /// Member holds `ADMINISTRATOR`
    pub administrator: bool,
    /// Member holds `MANAGE_ROLES`
    pub manage_roles: bool,
}

/// The bot's own standing in the guild's role hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BotStanding {
    /// Bot holds `ADMINISTRATOR`
    pub administrator: bool,
    /// Bot holds `MANAGE_ROLES`
    pub manage_roles: bool,
    /// Position of the bot's highest role
    pub top_position: u16,
}

/// Whether a member may configure shuffleable roles.
///
/// Guild owners always may; otherwise `ADMINISTRATOR` or `MANAGE_ROLES` is
/// required.
pub fn has_manage_roles_permission(member: &MemberAuthority) -> bool {
    member.is_owner || member.administrator || member.manage_roles
}

/// Whether a member may trigger a shuffle.
///
/// Currently the same rule as [`has_manage_roles_permission`].
pub fn has_shuffle_permission(member: &MemberAuthority) -> bool {
    has_manage_roles_permission(member)
}

/// Refuse members who cannot configure roles.
#[instrument(skip(member), fields(user_id = member.user_id))]
pub fn ensure_can_configure(member: &MemberAuthority) -> GuardResult<()> {
    if has_manage_roles_permission(member) {
        return Ok(());
    }
    debug!("Member lacks role configuration permission");
    Err(GuardError::new(GuardErrorKind::MissingPermission {
        required: REQUIRED_PERMISSION.to_string(),
    }))
}

/// Refuse members who cannot shuffle.
#[instrument(skip(member), fields(user_id = member.user_id))]
pub fn ensure_can_shuffle(member: &MemberAuthority) -> GuardResult<()> {
    if has_shuffle_permission(member) {
        return Ok(());
    }
    debug!("Member lacks shuffle permission");
    Err(GuardError::new(GuardErrorKind::MissingPermission {
        required: REQUIRED_PERMISSION.to_string(),
    }))
}

/// Whether the bot can add and remove `role`.
///
/// Requires `MANAGE_ROLES` (or `ADMINISTRATOR`), excludes `@everyone` and
/// integration-managed roles, and the bot's top role must sit strictly above
/// the target.
pub fn can_bot_manage_role(bot: &BotStanding, guild_id: u64, role: &RoleSnapshot) -> bool {
    if !(bot.manage_roles || bot.administrator) {
        return false;
    }
    if role.is_everyone(guild_id) || role.managed {
        return false;
    }
    bot.top_position > role.position
}

/// Refuse roles the bot cannot manage.
#[instrument(skip(bot, role), fields(role_id = role.id, role_name = %role.name))]
pub fn ensure_bot_can_manage_role(
    bot: &BotStanding,
    guild_id: u64,
    role: &RoleSnapshot,
) -> GuardResult<()> {
    if can_bot_manage_role(bot, guild_id, role) {
        return Ok(());
    }
    debug!(
        bot_top_position = bot.top_position,
        role_position = role.position,
        "Role is outside the bot's reach"
    );
    Err(GuardError::new(GuardErrorKind::UnmanageableRole {
        role_name: role.name.clone(),
    }))
}

/// Keep only the roles the bot can manage.
pub fn manageable_roles<'a>(
    bot: &BotStanding,
    guild_id: u64,
    roles: impl IntoIterator<Item = &'a RoleSnapshot>,
) -> Vec<&'a RoleSnapshot> {
    roles
        .into_iter()
        .filter(|role| can_bot_manage_role(bot, guild_id, role))
        .collect()
}
