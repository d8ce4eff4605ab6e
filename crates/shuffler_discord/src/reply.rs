//! Helpers for answering slash commands.

use crate::DiscordResult;
use crate::conversions::notice_embed;
use serenity::all::{
    CommandDataOptionValue, CommandInteraction, Context, CreateInteractionResponse,
    CreateInteractionResponseFollowup, CreateInteractionResponseMessage, EditInteractionResponse,
    RoleId,
};
use shuffler_core::{Notice, ShufflerError};
use shuffler_error::{GuardError, GuardErrorKind};
use tracing::error;

/// Response payload only the invoking member sees.
pub fn ephemeral_message(notice: &Notice) -> CreateInteractionResponseMessage {
    CreateInteractionResponseMessage::new()
        .embed(notice_embed(notice))
        .ephemeral(true)
}

/// Follow-up payload only the invoking member sees.
pub fn ephemeral_followup(notice: &Notice) -> CreateInteractionResponseFollowup {
    CreateInteractionResponseFollowup::new()
        .embed(notice_embed(notice))
        .ephemeral(true)
}

/// Answer with an ephemeral embed.
pub async fn reply(ctx: &Context, command: &CommandInteraction, notice: &Notice) -> DiscordResult<()> {
    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(ephemeral_message(notice)),
        )
        .await?;
    Ok(())
}

/// Answer privately after a public defer.
///
/// The public "thinking" placeholder is deleted and the notice is sent as an
/// ephemeral follow-up.
pub async fn refuse_deferred(
    ctx: &Context,
    command: &CommandInteraction,
    notice: &Notice,
) -> DiscordResult<()> {
    command.delete_response(&ctx.http).await?;
    command
        .create_followup(&ctx.http, ephemeral_followup(notice))
        .await?;
    Ok(())
}

/// Replace a deferred response.
pub async fn edit_reply(
    ctx: &Context,
    command: &CommandInteraction,
    notice: &Notice,
) -> DiscordResult<()> {
    command
        .edit_response(
            &ctx.http,
            EditInteractionResponse::new().embed(notice_embed(notice)),
        )
        .await?;
    Ok(())
}

/// The notice for a failed service call. Unexpected failures are logged.
pub fn notice_for(err: &ShufflerError, user_id: u64) -> Notice {
    if err.as_guard().is_none() {
        error!(user_id, error = %err, "Command failed");
    }
    Notice::from_error(err, user_id)
}

/// Refusal for commands used outside a guild.
pub fn not_in_guild(user_id: u64) -> Notice {
    Notice::from_guard(&GuardError::new(GuardErrorKind::NotInGuild), user_id)
}

/// Roles held by the invoking member.
pub fn member_roles(command: &CommandInteraction) -> &[RoleId] {
    command
        .member
        .as_ref()
        .map(|member| member.roles.as_slice())
        .unwrap_or_default()
}

/// Display name of the invoking member.
pub fn display_name(command: &CommandInteraction) -> String {
    command
        .member
        .as_ref()
        .map(|member| member.display_name().to_string())
        .unwrap_or_else(|| command.user.display_name().to_string())
}

/// Value of a named top-level option.
pub fn option<'a>(command: &'a CommandInteraction, name: &str) -> Option<&'a CommandDataOptionValue> {
    command
        .data
        .options
        .iter()
        .find(|opt| opt.name == name)
        .map(|opt| &opt.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPHEMERAL: u64 = 1 << 6;

    fn not_enough_roles() -> Notice {
        Notice::from_guard(&GuardError::new(GuardErrorKind::NotEnoughRoles { found: 1 }), 7)
    }

    #[test]
    fn test_ephemeral_message_sets_flag() {
        let json = serde_json::to_value(ephemeral_message(&not_enough_roles())).unwrap();
        assert_eq!(json["flags"], EPHEMERAL);
        assert_eq!(json["embeds"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn test_refusal_followup_is_ephemeral() {
        let json = serde_json::to_value(ephemeral_followup(&not_enough_roles())).unwrap();
        assert_eq!(json["flags"], EPHEMERAL);
        assert_eq!(json["embeds"].as_array().map(Vec::len), Some(1));
    }
}
