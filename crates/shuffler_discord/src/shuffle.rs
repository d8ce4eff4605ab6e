//! `/shuffle`: confirm, then redistribute members across configured roles.
//!
//! Cheap checks (permission, cooldown, configuration) answer immediately.
//! The member scan happens after deferring, and the initiator gets a pair of
//! buttons that stay live for the configured timeout. The cooldown and the
//! member list are checked again once the shuffle is confirmed.

use crate::DiscordResult;
use crate::conversions::notice_embed;
use crate::editor::HttpRoleEditor;
use crate::guild::GuildState;
use crate::reply::{
    display_name, member_roles, not_in_guild, notice_for, refuse_deferred, reply,
};
use chrono::Utc;
use serenity::all::{
    ButtonStyle, CommandInteraction, ComponentInteraction, Context, CreateActionRow, CreateButton,
    CreateInteractionResponse, CreateInteractionResponseMessage, EditInteractionResponse, GuildId,
    Message, UserId,
};
use shuffler_core::{
    Notice, RoleSnapshot, ShufflePlan, ShuffleService, apply_plan, describe_duration,
    refresh_selection, select_roles,
};
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

const CONFIRM_ID: &str = "shuffle_confirm";
const CANCEL_ID: &str = "shuffle_cancel";

enum Decision {
    Confirm(ComponentInteraction),
    Cancel(ComponentInteraction),
    TimedOut,
}

fn confirm_buttons() -> CreateActionRow {
    CreateActionRow::Buttons(vec![
        CreateButton::new(CONFIRM_ID)
            .label("✅ Yes, Shuffle Roles")
            .style(ButtonStyle::Success),
        CreateButton::new(CANCEL_ID)
            .label("❌ Cancel")
            .style(ButtonStyle::Danger),
    ])
}

/// Handle the shuffle command.
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
    let gid = guild_id.get();

    let guild = GuildState::fetch(ctx, guild_id).await?;
    let authority = guild.authority(command.user.id, member_roles(command));

    let configured = match service.shuffle_preflight(gid, &authority, Utc::now()).await {
        Ok(configured) => configured,
        Err(e) => return reply(ctx, command, &notice_for(&e, user_id)).await,
    };

    command.defer(&ctx.http).await?;

    let bot = guild.bot_standing(ctx).await?;
    let wanted: HashSet<u64> = configured.iter().map(|r| r.role_id).collect();
    let live = guild.roles_with_members(ctx, &wanted).await?;
    let roles = match select_roles(gid, &configured, &live, &bot) {
        Ok(roles) => roles,
        Err(e) => return refuse_deferred(ctx, command, &Notice::from_guard(&e, user_id)).await,
    };

    let total_users = roles
        .iter()
        .flat_map(|role| role.members.iter())
        .collect::<HashSet<_>>()
        .len();
    let timeout = *service.settings().confirm_timeout();
    let prompt = Notice::confirm_shuffle(&roles, total_users, &describe_duration(timeout));

    let message = command
        .edit_response(
            &ctx.http,
            EditInteractionResponse::new()
                .embed(notice_embed(&prompt))
                .components(vec![confirm_buttons()]),
        )
        .await?;
    debug!(roles = roles.len(), total_users, "Awaiting shuffle confirmation");

    match await_decision(ctx, &message, command.user.id, timeout).await? {
        Decision::Confirm(press) => {
            perform(ctx, &press, service, guild_id, &roles, &display_name(command)).await
        }
        Decision::Cancel(press) => {
            info!("Shuffle cancelled");
            press
                .create_response(
                    &ctx.http,
                    CreateInteractionResponse::UpdateMessage(
                        CreateInteractionResponseMessage::new()
                            .embed(notice_embed(&Notice::cancelled()))
                            .components(vec![]),
                    ),
                )
                .await?;
            Ok(())
        }
        Decision::TimedOut => {
            info!("Shuffle confirmation timed out");
            command
                .edit_response(
                    &ctx.http,
                    EditInteractionResponse::new()
                        .embed(notice_embed(&Notice::timed_out(&describe_duration(timeout))))
                        .components(vec![]),
                )
                .await?;
            Ok(())
        }
    }
}

/// Wait for the initiator to press a button. Presses by anyone else are
/// refused privately and the wait continues.
async fn await_decision(
    ctx: &Context,
    message: &Message,
    initiator: UserId,
    timeout: Duration,
) -> DiscordResult<Decision> {
    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(Decision::TimedOut);
        }

        let Some(press) = message
            .await_component_interaction(&ctx.shard)
            .timeout(remaining)
            .await
        else {
            return Ok(Decision::TimedOut);
        };

        let confirming = press.data.custom_id == CONFIRM_ID;
        if press.user.id != initiator {
            debug!(presser = %press.user.id, "Ignoring button press from another member");
            if let Err(e) = press
                .create_response(
                    &ctx.http,
                    CreateInteractionResponse::Message(
                        CreateInteractionResponseMessage::new()
                            .embed(notice_embed(&Notice::not_initiator(confirming)))
                            .ephemeral(true),
                    ),
                )
                .await
            {
                warn!(error = %e, "Failed to refuse button press");
            }
            continue;
        }

        return Ok(if confirming {
            Decision::Confirm(press)
        } else {
            Decision::Cancel(press)
        });
    }
}

async fn perform(
    ctx: &Context,
    press: &ComponentInteraction,
    service: &ShuffleService,
    guild_id: GuildId,
    selected: &[RoleSnapshot],
    performed_by: &str,
) -> DiscordResult<()> {
    press
        .create_response(
            &ctx.http,
            CreateInteractionResponse::UpdateMessage(
                CreateInteractionResponseMessage::new()
                    .embed(notice_embed(&Notice::shuffling()))
                    .components(vec![]),
            ),
        )
        .await?;

    let notice = match shuffle(ctx, service, guild_id, selected, press.user.id, performed_by)
        .await
    {
        Ok(notice) => notice,
        Err(e) => {
            error!(error = %e, "Shuffle failed");
            Notice::shuffle_failed()
        }
    };

    press
        .edit_response(
            &ctx.http,
            EditInteractionResponse::new()
                .embed(notice_embed(&notice))
                .components(vec![]),
        )
        .await?;
    Ok(())
}

#[instrument(skip_all, fields(guild_id = %guild_id, roles = selected.len()))]
async fn shuffle(
    ctx: &Context,
    service: &ShuffleService,
    guild_id: GuildId,
    selected: &[RoleSnapshot],
    triggered_by: UserId,
    performed_by: &str,
) -> DiscordResult<Notice> {
    let gid = guild_id.get();
    let user_id = triggered_by.get();

    // Another shuffle may have finished while the prompt was open.
    if let Err(e) = service.ensure_cooldown_clear(gid, Utc::now()).await {
        if e.as_guard().is_some() {
            return Ok(Notice::from_error(&e, user_id));
        }
        return Err(e.into());
    }

    // Roles may have been deleted or moved while the prompt was open.
    let guild = GuildState::fetch(ctx, guild_id).await?;
    let bot = guild.bot_standing(ctx).await?;
    let wanted: HashSet<u64> = selected.iter().map(|role| role.id).collect();
    let live = guild.roles_with_members(ctx, &wanted).await?;
    let roles = match refresh_selection(gid, selected, &live, &bot) {
        Ok(roles) => roles,
        Err(e) => return Ok(Notice::from_guard(&e, user_id)),
    };

    let plan = ShufflePlan::build(&roles, &mut rand::rng());
    let editor = HttpRoleEditor::new(ctx.http.clone(), guild_id);
    let outcome = apply_plan(&editor, &plan).await;

    service.register_guild(gid, guild.name()).await?;
    service
        .record_shuffle(gid, user_id, &plan, Utc::now())
        .await?;

    Ok(Notice::shuffle_complete(
        &plan,
        &outcome,
        service.settings().cooldown(),
        performed_by,
    ))
}
