//! Persistence seam for guild configuration, cooldowns and history.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shuffler_error::ShufflerResult;

/// A role configured as eligible for shuffling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShuffleableRole {
    /// Guild snowflake
    pub guild_id: u64,
    /// Role snowflake
    pub role_id: u64,
    /// Role name at the time it was configured
    pub role_name: String,
    /// Member who configured it
    pub added_by: u64,
    /// When it was configured
    pub created_at: DateTime<Utc>,
}

/// One completed shuffle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShuffleRecord {
    /// Guild snowflake
    pub guild_id: u64,
    /// Member who confirmed the shuffle
    pub triggered_by: u64,
    /// Number of distinct members redistributed
    pub users_affected: u32,
    /// Names of the roles taking part
    pub roles_shuffled: Vec<String>,
    /// When the shuffle finished
    pub created_at: DateTime<Utc>,
}

/// Result of configuring a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum RoleAddOutcome {
    /// Newly added, or re-enabled after a removal
    Added,
    /// Already enabled for this guild
    AlreadyConfigured,
}

/// Storage for everything the bot remembers between commands.
///
/// Implementations must keep rows scoped per guild and cascade guild removal
/// to every dependent row.
#[async_trait]
pub trait ShuffleStore: Send + Sync {
    /// Insert the guild or refresh its name.
    async fn upsert_server(&self, guild_id: u64, guild_name: &str) -> ShufflerResult<()>;

    /// Forget the guild and everything attached to it.
    async fn remove_server(&self, guild_id: u64) -> ShufflerResult<()>;

    /// Mark a role shuffleable. Re-enables a previously removed role.
    async fn add_role(
        &self,
        guild_id: u64,
        role_id: u64,
        role_name: &str,
        added_by: u64,
    ) -> ShufflerResult<RoleAddOutcome>;

    /// Stop shuffling a role. Returns `false` when it was not enabled.
    async fn remove_role(&self, guild_id: u64, role_id: u64) -> ShufflerResult<bool>;

    /// Disable a role that no longer exists on the platform.
    async fn disable_role(&self, guild_id: u64, role_id: u64) -> ShufflerResult<()>;

    /// Enabled roles for the guild, ordered by name.
    async fn list_roles(&self, guild_id: u64) -> ShufflerResult<Vec<ShuffleableRole>>;

    /// Record that a shuffle just happened.
    async fn set_cooldown(
        &self,
        guild_id: u64,
        triggered_by: u64,
        at: DateTime<Utc>,
    ) -> ShufflerResult<()>;

    /// When the guild last shuffled.
    async fn last_shuffle(&self, guild_id: u64) -> ShufflerResult<Option<DateTime<Utc>>>;

    /// Append an audit row.
    async fn log_shuffle(&self, record: &ShuffleRecord) -> ShufflerResult<()>;

    /// Most recent audit rows, newest first.
    async fn recent_shuffles(&self, guild_id: u64, limit: u32)
    -> ShufflerResult<Vec<ShuffleRecord>>;
}
