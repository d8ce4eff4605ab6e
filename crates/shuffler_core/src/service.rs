//! Command flows shared by every front end.
//!
//! The service runs the guard sequence for each command against a
//! [`ShuffleStore`] and hands back a [`Notice`]. Talking to the chat
//! platform (fetching roles, editing members) stays with the caller.

use crate::{
    BotStanding, ListedRole, MemberAuthority, Notice, RoleAddOutcome, RoleSnapshot,
    ShufflePlan, ShuffleRecord, ShuffleSettings, ShuffleStore, ShuffleableRole,
    ensure_bot_can_manage_role, ensure_can_configure, ensure_can_shuffle, select_roles,
};
use chrono::{DateTime, Utc};
use shuffler_error::{GuardError, GuardErrorKind, ShufflerResult};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// Sub-command of the role configuration command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ConfigAction {
    /// Mark a role shuffleable
    Add,
    /// Stop shuffling a role
    Remove,
    /// Show configured roles
    List,
}

/// Guard sequences for configuration, shuffling and history.
#[derive(Clone)]
pub struct ShuffleService {
    store: Arc<dyn ShuffleStore>,
    settings: ShuffleSettings,
}

impl std::fmt::Debug for ShuffleService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShuffleService")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl ShuffleService {
    /// Create a service over a store.
    pub fn new(store: Arc<dyn ShuffleStore>, settings: ShuffleSettings) -> Self {
        Self { store, settings }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn ShuffleStore> {
        &self.store
    }

    /// Runtime settings.
    pub fn settings(&self) -> &ShuffleSettings {
        &self.settings
    }

    /// Remember a guild the bot can see.
    pub async fn register_guild(&self, guild_id: u64, guild_name: &str) -> ShufflerResult<()> {
        self.store.upsert_server(guild_id, guild_name).await
    }

    /// Drop everything stored for a guild the bot left.
    #[instrument(skip(self))]
    pub async fn forget_guild(&self, guild_id: u64) -> ShufflerResult<()> {
        self.store.remove_server(guild_id).await?;
        info!("Forgot guild");
        Ok(())
    }

    /// A role was deleted on the platform; stop shuffling it.
    pub async fn role_deleted(&self, guild_id: u64, role_id: u64) -> ShufflerResult<()> {
        self.store.disable_role(guild_id, role_id).await
    }

    /// Dispatch a configuration sub-command.
    pub async fn configure(
        &self,
        guild_id: u64,
        member: &MemberAuthority,
        action: ConfigAction,
        role: Option<&RoleSnapshot>,
        bot: &BotStanding,
        guild_roles: &HashMap<u64, RoleSnapshot>,
    ) -> ShufflerResult<Notice> {
        match action {
            ConfigAction::Add => self.add_role(guild_id, member, role, bot).await,
            ConfigAction::Remove => self.remove_role(guild_id, member, role).await,
            ConfigAction::List => self.list_roles(guild_id, member, guild_roles).await,
        }
    }

    /// Mark a role shuffleable after checking both the member and the bot.
    #[instrument(skip(self, member, role, bot), fields(user_id = member.user_id))]
    pub async fn add_role(
        &self,
        guild_id: u64,
        member: &MemberAuthority,
        role: Option<&RoleSnapshot>,
        bot: &BotStanding,
    ) -> ShufflerResult<Notice> {
        ensure_can_configure(member)?;
        let role = require_role(role, ConfigAction::Add)?;
        ensure_bot_can_manage_role(bot, guild_id, role)?;

        let outcome = self
            .store
            .add_role(guild_id, role.id, &role.name, member.user_id)
            .await?;
        info!(role_id = role.id, %outcome, "Configured shuffleable role");

        Ok(match outcome {
            RoleAddOutcome::Added => Notice::role_added(&role.name),
            RoleAddOutcome::AlreadyConfigured => Notice::role_already_added(&role.name),
        })
    }

    /// Stop shuffling a role.
    #[instrument(skip(self, member, role), fields(user_id = member.user_id))]
    pub async fn remove_role(
        &self,
        guild_id: u64,
        member: &MemberAuthority,
        role: Option<&RoleSnapshot>,
    ) -> ShufflerResult<Notice> {
        ensure_can_configure(member)?;
        let role = require_role(role, ConfigAction::Remove)?;

        if self.store.remove_role(guild_id, role.id).await? {
            info!(role_id = role.id, "Removed shuffleable role");
            Ok(Notice::role_removed(&role.name))
        } else {
            Ok(Notice::role_not_found(&role.name))
        }
    }

    /// Show configured roles with live member counts.
    ///
    /// Roles that vanished from the guild are listed under their stored name
    /// and struck through.
    #[instrument(skip(self, member, guild_roles), fields(user_id = member.user_id))]
    pub async fn list_roles(
        &self,
        guild_id: u64,
        member: &MemberAuthority,
        guild_roles: &HashMap<u64, RoleSnapshot>,
    ) -> ShufflerResult<Notice> {
        ensure_can_configure(member)?;

        let listed: Vec<ListedRole> = self
            .store
            .list_roles(guild_id)
            .await?
            .into_iter()
            .map(|configured| match guild_roles.get(&configured.role_id) {
                Some(live) => ListedRole::Present {
                    name: live.name.clone(),
                    member_count: live.member_count(),
                },
                None => ListedRole::Deleted {
                    name: configured.role_name,
                },
            })
            .collect();

        Ok(Notice::role_list(&listed))
    }

    /// Checks that need no live role data: member permission, cooldown, and
    /// a non-empty configuration. Returns the configured roles.
    #[instrument(skip(self, member), fields(user_id = member.user_id))]
    pub async fn shuffle_preflight(
        &self,
        guild_id: u64,
        member: &MemberAuthority,
        now: DateTime<Utc>,
    ) -> ShufflerResult<Vec<ShuffleableRole>> {
        ensure_can_shuffle(member)?;
        self.ensure_cooldown_clear(guild_id, now).await?;

        let configured = self.store.list_roles(guild_id).await?;
        if configured.is_empty() {
            return Err(GuardError::new(GuardErrorKind::NoConfiguredRoles).into());
        }
        Ok(configured)
    }

    /// Refuse while the guild's cooldown is running.
    pub async fn ensure_cooldown_clear(
        &self,
        guild_id: u64,
        now: DateTime<Utc>,
    ) -> ShufflerResult<()> {
        let last = self.store.last_shuffle(guild_id).await?;
        self.settings.cooldown().check(last, now)?;
        Ok(())
    }

    /// Run every check that precedes a shuffle and return the roles taking part.
    ///
    /// Order: member permission, cooldown, configuration, eligibility.
    pub async fn prepare_shuffle(
        &self,
        guild_id: u64,
        member: &MemberAuthority,
        guild_roles: &HashMap<u64, RoleSnapshot>,
        bot: &BotStanding,
        now: DateTime<Utc>,
    ) -> ShufflerResult<Vec<RoleSnapshot>> {
        let configured = self.shuffle_preflight(guild_id, member, now).await?;
        Ok(select_roles(guild_id, &configured, guild_roles, bot)?)
    }

    /// Start the cooldown and append the audit row for a finished shuffle.
    #[instrument(skip(self, plan), fields(members = plan.member_count()))]
    pub async fn record_shuffle(
        &self,
        guild_id: u64,
        triggered_by: u64,
        plan: &ShufflePlan,
        now: DateTime<Utc>,
    ) -> ShufflerResult<()> {
        self.store.set_cooldown(guild_id, triggered_by, now).await?;

        let record = ShuffleRecord {
            guild_id,
            triggered_by,
            users_affected: u32::try_from(plan.member_count()).unwrap_or(u32::MAX),
            roles_shuffled: plan.role_names(),
            created_at: now,
        };
        self.store.log_shuffle(&record).await?;
        info!("Recorded shuffle");
        Ok(())
    }

    /// Recent shuffles for the guild.
    #[instrument(skip(self, member), fields(user_id = member.user_id))]
    pub async fn history(
        &self,
        guild_id: u64,
        member: &MemberAuthority,
        limit: Option<u32>,
    ) -> ShufflerResult<Notice> {
        ensure_can_configure(member)?;
        let records = self
            .store
            .recent_shuffles(guild_id, self.settings.history_page(limit))
            .await?;
        Ok(Notice::history(&records))
    }
}

fn require_role(role: Option<&RoleSnapshot>, action: ConfigAction) -> Result<&RoleSnapshot, GuardError> {
    role.ok_or_else(|| {
        GuardError::new(GuardErrorKind::MissingRoleArgument {
            action: action.to_string(),
        })
    })
}
