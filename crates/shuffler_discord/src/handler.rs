//! Serenity event handler for the shuffler bot.
//!
//! Registers slash commands on connect, keeps the server table in step with
//! guild membership, and routes command interactions.

use crate::commands::{ShufflerCommand, create_commands};
use crate::reply::{refuse_deferred, reply};
use crate::{DiscordError, DiscordErrorKind, DiscordResult, config_roles, history, shuffle};
use serenity::all::{
    ActivityData, Command, CommandInteraction, GuildId, Interaction, Ready, RoleId,
};
use serenity::async_trait;
use serenity::client::{Context, EventHandler};
use serenity::model::gateway::GatewayIntents;
use serenity::model::guild::{Guild, Role, UnavailableGuild};
use shuffler_core::{Notice, ShuffleService};
use std::str::FromStr;
use tracing::{debug, error, info, warn};

const ACTIVITY: &str = "/shuffle | /config-roles";

/// Event handler for the shuffler bot.
pub struct ShufflerHandler {
    service: ShuffleService,
}

impl ShufflerHandler {
    /// Create a handler driving `service`.
    pub fn new(service: ShuffleService) -> Self {
        Self { service }
    }

    /// Gateway intents the bot needs.
    ///
    /// Member listing requires the privileged members intent.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MEMBERS
    }

    async fn dispatch(&self, ctx: &Context, command: &CommandInteraction) -> DiscordResult<()> {
        let name = command.data.name.as_str();
        let Ok(kind) = ShufflerCommand::from_str(name) else {
            return Err(DiscordError::new(DiscordErrorKind::InteractionFailed(format!(
                "Unknown command: {}",
                name
            ))));
        };

        debug!(command = %kind, user_id = %command.user.id, "Running command");
        match kind {
            ShufflerCommand::Shuffle => shuffle::run(ctx, command, &self.service).await,
            ShufflerCommand::ConfigRoles => config_roles::run(ctx, command, &self.service).await,
            ShufflerCommand::ShuffleHistory => history::run(ctx, command, &self.service).await,
        }
    }
}

/// Best effort: tell the user something broke, privately. A deferred
/// response is replaced by an ephemeral follow-up.
async fn report_failure(ctx: &Context, command: &CommandInteraction) {
    let notice = Notice::generic_error();
    if reply(ctx, command, &notice).await.is_ok() {
        return;
    }
    if let Err(e) = refuse_deferred(ctx, command, &notice).await {
        debug!(error = %e, "Could not report command failure");
    }
}

#[async_trait]
impl EventHandler for ShufflerHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(
            bot_user = %ready.user.name,
            bot_id = %ready.user.id,
            guilds = ready.guilds.len(),
            "Bot connected to Discord"
        );

        match Command::set_global_commands(&ctx.http, create_commands()).await {
            Ok(commands) => info!(count = commands.len(), "Registered slash commands"),
            Err(e) => error!(error = %e, "Failed to register slash commands"),
        }

        ctx.set_activity(Some(ActivityData::playing(ACTIVITY)));
    }

    async fn guild_create(&self, _ctx: Context, guild: Guild, _is_new: Option<bool>) {
        info!(guild_id = %guild.id, guild_name = %guild.name, "Guild available");

        if let Err(e) = self.service.register_guild(guild.id.get(), &guild.name).await {
            error!(guild_id = %guild.id, error = %e, "Failed to store guild");
        }
    }

    async fn guild_delete(&self, _ctx: Context, incomplete: UnavailableGuild, _full: Option<Guild>) {
        if incomplete.unavailable {
            debug!(guild_id = %incomplete.id, "Guild outage, keeping data");
            return;
        }

        info!(guild_id = %incomplete.id, "Left guild");
        if let Err(e) = self.service.forget_guild(incomplete.id.get()).await {
            error!(guild_id = %incomplete.id, error = %e, "Failed to remove guild data");
        }
    }

    async fn guild_role_delete(
        &self,
        _ctx: Context,
        guild_id: GuildId,
        removed_role_id: RoleId,
        _removed_role: Option<Role>,
    ) {
        debug!(%guild_id, role_id = %removed_role_id, "Role deleted");
        if let Err(e) = self
            .service
            .role_deleted(guild_id.get(), removed_role_id.get())
            .await
        {
            error!(%guild_id, role_id = %removed_role_id, error = %e, "Failed to disable deleted role");
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(command) = interaction else {
            return;
        };

        if let Err(e) = self.dispatch(&ctx, &command).await {
            warn!(command = %command.data.name, error = %e, "Command failed");
            report_failure(&ctx, &command).await;
        }
    }
}
