//! Conversions between serenity models and shuffler domain types.

use serenity::all::{Colour, CreateEmbed, CreateEmbedFooter, Permissions, Role, RoleId};
use shuffler_core::{BotStanding, MemberAuthority, Notice, RoleSnapshot, Tone};
use std::collections::HashMap;

/// Embed colour for a notice tone.
pub fn tone_colour(tone: Tone) -> Colour {
    match tone {
        Tone::Success => Colour::new(0x2ECC71),
        Tone::Warning => Colour::new(0xFEE75C),
        Tone::Info => Colour::new(0x3498DB),
        Tone::Danger => Colour::new(0xE74C3C),
        Tone::Caution => Colour::new(0xE67E22),
    }
}

/// Render a notice as an embed.
pub fn notice_embed(notice: &Notice) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(&notice.title)
        .description(&notice.description)
        .colour(tone_colour(notice.tone));

    for field in &notice.fields {
        embed = embed.field(&field.name, &field.value, false);
    }

    if let Some(footer) = &notice.footer {
        embed = embed.footer(CreateEmbedFooter::new(footer));
    }

    embed
}

/// Snapshot a serenity role with the given members.
pub fn role_snapshot(role: &Role, members: &[u64]) -> RoleSnapshot {
    RoleSnapshot::new(role.id.get(), role.name.clone(), role.position)
        .managed(role.managed)
        .with_members(members.iter().copied())
}

/// Guild-level permissions granted by `@everyone` plus the member's roles.
pub fn merge_permissions(
    everyone: Permissions,
    member_roles: impl IntoIterator<Item = Permissions>,
) -> Permissions {
    member_roles
        .into_iter()
        .fold(everyone, |acc, permissions| acc | permissions)
}

/// Guild-level permissions for a member holding `member_roles`.
pub fn guild_permissions(
    guild_id: u64,
    roles: &HashMap<RoleId, Role>,
    member_roles: &[RoleId],
) -> Permissions {
    let everyone = roles
        .get(&RoleId::new(guild_id))
        .map(|role| role.permissions)
        .unwrap_or_else(Permissions::empty);
    merge_permissions(
        everyone,
        member_roles
            .iter()
            .filter_map(|id| roles.get(id))
            .map(|role| role.permissions),
    )
}

/// Position of the highest role among `member_roles`; 0 when none.
pub fn top_position(roles: &HashMap<RoleId, Role>, member_roles: &[RoleId]) -> u16 {
    member_roles
        .iter()
        .filter_map(|id| roles.get(id))
        .map(|role| role.position)
        .max()
        .unwrap_or_default()
}

/// What a member may do, from their permissions and ownership.
pub fn member_authority(user_id: u64, is_owner: bool, permissions: Permissions) -> MemberAuthority {
    MemberAuthority {
        user_id,
        is_owner,
        administrator: permissions.administrator(),
        manage_roles: permissions.manage_roles(),
    }
}

/// The bot's standing, from its permissions and highest role.
pub fn bot_standing(permissions: Permissions, top_position: u16) -> BotStanding {
    BotStanding {
        administrator: permissions.administrator(),
        manage_roles: permissions.manage_roles(),
        top_position,
    }
}
