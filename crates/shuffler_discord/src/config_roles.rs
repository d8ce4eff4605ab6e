//! `/config-roles`: manage which roles take part in shuffles.

use crate::DiscordResult;
use crate::guild::GuildState;
use crate::reply::{edit_reply, member_roles, not_in_guild, notice_for, option, reply};
use serenity::all::{CommandInteraction, Context};
use shuffler_core::{
    BotStanding, ConfigAction, Notice, ShuffleService, ensure_can_configure,
};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use tracing::{instrument, warn};

/// Handle the configuration command.
#[instrument(skip_all, fields(user_id = %command.user.id, guild_id = ?command.guild_id))]
pub async fn run(
    ctx: &Context,
    command: &CommandInteraction,
    service: &ShuffleService,
) -> DiscordResult<()> {
    let user_id = command.user.id.get();
    let Some(guild_id) = command.guild_id else {
        return reply(ctx, command, &not_in_guild(user_id)).await;
    };

    let action = option(command, "action")
        .and_then(|value| value.as_str())
        .and_then(|value| ConfigAction::from_str(value).ok());
    let Some(action) = action else {
        warn!("Configuration command without a valid action");
        return reply(ctx, command, &Notice::generic_error()).await;
    };

    let guild = GuildState::fetch(ctx, guild_id).await?;
    let authority = guild.authority(command.user.id, member_roles(command));
    let role = option(command, "role")
        .and_then(|value| value.as_role_id())
        .and_then(|role_id| guild.role(role_id));

    let gid = guild_id.get();
    match action {
        ConfigAction::Add => {
            let bot = guild.bot_standing(ctx).await?;
            let notice = match service.register_guild(gid, guild.name()).await {
                Ok(()) => service
                    .configure(gid, &authority, action, role.as_ref(), &bot, &HashMap::new())
                    .await,
                Err(e) => Err(e),
            };
            let notice = notice.unwrap_or_else(|e| notice_for(&e, user_id));
            reply(ctx, command, &notice).await
        }
        ConfigAction::Remove => {
            let notice = service
                .configure(
                    gid,
                    &authority,
                    action,
                    role.as_ref(),
                    &BotStanding::default(),
                    &HashMap::new(),
                )
                .await
                .unwrap_or_else(|e| notice_for(&e, user_id));
            reply(ctx, command, &notice).await
        }
        ConfigAction::List => {
            // Refuse before paging through the member list.
            if let Err(e) = ensure_can_configure(&authority) {
                return reply(ctx, command, &Notice::from_guard(&e, user_id)).await;
            }
            command.defer_ephemeral(&ctx.http).await?;

            let configured = match service.store().list_roles(gid).await {
                Ok(configured) => configured,
                Err(e) => return edit_reply(ctx, command, &notice_for(&e, user_id)).await,
            };
            let wanted: HashSet<u64> = configured.iter().map(|r| r.role_id).collect();
            let live = guild.roles_with_members(ctx, &wanted).await?;

            let notice = service
                .configure(gid, &authority, action, None, &BotStanding::default(), &live)
                .await
                .unwrap_or_else(|e| notice_for(&e, user_id));
            edit_reply(ctx, command, &notice).await
        }
    }
}
