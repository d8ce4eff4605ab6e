//! `/shuffle-history`: recent shuffles in this guild.

use crate::DiscordResult;
use crate::guild::GuildState;
use crate::reply::{member_roles, not_in_guild, notice_for, option, reply};
use serenity::all::{CommandInteraction, Context};
use shuffler_core::ShuffleService;
use tracing::instrument;

/// Handle the history command.
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

    let limit = option(command, "limit")
        .and_then(|value| value.as_i64())
        .and_then(|value| u32::try_from(value).ok());

    let guild = GuildState::fetch(ctx, guild_id).await?;
    let authority = guild.authority(command.user.id, member_roles(command));

    let notice = service
        .history(guild_id.get(), &authority, limit)
        .await
        .unwrap_or_else(|e| notice_for(&e, user_id));
    reply(ctx, command, &notice).await
}
