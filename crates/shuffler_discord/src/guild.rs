//! Live guild state fetched over HTTP before each decision.

use crate::DiscordResult;
use crate::conversions::{bot_standing, guild_permissions, member_authority, role_snapshot, top_position};
use futures::StreamExt;
use serenity::all::{Context, GuildId, Role, RoleId, UserId};
use shuffler_core::{BotStanding, MemberAuthority, RoleSnapshot};
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument};

/// Roles and ownership of one guild.
#[derive(Debug, Clone)]
pub struct GuildState {
    guild_id: GuildId,
    name: String,
    owner_id: UserId,
    roles: HashMap<RoleId, Role>,
}

impl GuildState {
    /// Fetch the guild's roles and owner.
    #[instrument(skip(ctx))]
    pub async fn fetch(ctx: &Context, guild_id: GuildId) -> DiscordResult<Self> {
        let guild = guild_id.to_partial_guild(ctx).await?;
        Ok(Self {
            guild_id,
            name: guild.name,
            owner_id: guild.owner_id,
            roles: guild.roles,
        })
    }

    /// Guild name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Authority of a member holding `member_roles`.
    pub fn authority(&self, user_id: UserId, member_roles: &[RoleId]) -> MemberAuthority {
        member_authority(
            user_id.get(),
            user_id == self.owner_id,
            guild_permissions(self.guild_id.get(), &self.roles, member_roles),
        )
    }

    /// The bot's standing in this guild.
    pub async fn bot_standing(&self, ctx: &Context) -> DiscordResult<BotStanding> {
        let bot_id = ctx.cache.current_user().id;
        let member = self.guild_id.member(ctx, bot_id).await?;
        Ok(bot_standing(
            guild_permissions(self.guild_id.get(), &self.roles, &member.roles),
            top_position(&self.roles, &member.roles),
        ))
    }

    /// A single role, without members.
    pub fn role(&self, role_id: RoleId) -> Option<RoleSnapshot> {
        self.roles.get(&role_id).map(|role| role_snapshot(role, &[]))
    }

    /// Snapshots of `wanted` roles that still exist, with their current members.
    ///
    /// Pages through the full member list; only roles in `wanted` are tracked.
    #[instrument(skip(self, ctx, wanted), fields(guild_id = %self.guild_id, wanted = wanted.len()))]
    pub async fn roles_with_members(
        &self,
        ctx: &Context,
        wanted: &HashSet<u64>,
    ) -> DiscordResult<HashMap<u64, RoleSnapshot>> {
        let mut holders: HashMap<u64, Vec<u64>> = HashMap::new();
        let mut scanned = 0usize;

        let mut members = Box::pin(self.guild_id.members_iter(ctx.http.clone()));
        while let Some(member) = members.next().await {
            let member = member?;
            scanned += 1;
            for role_id in &member.roles {
                if wanted.contains(&role_id.get()) {
                    holders
                        .entry(role_id.get())
                        .or_default()
                        .push(member.user.id.get());
                }
            }
        }
        debug!(scanned, "Fetched guild members");

        Ok(self
            .roles
            .values()
            .filter(|role| wanted.contains(&role.id.get()))
            .map(|role| {
                let members = holders.get(&role.id.get()).map(Vec::as_slice).unwrap_or_default();
                (role.id.get(), role_snapshot(role, members))
            })
            .collect())
    }
}
