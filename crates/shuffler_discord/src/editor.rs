//! Role edits over the Discord REST API.

use async_trait::async_trait;
use serenity::all::{GuildId, Http, RoleId, UserId};
use shuffler_core::{RoleEditor, ShufflerResult};
use shuffler_error::PlatformError;
use std::sync::Arc;

const ADD_REASON: &str = "Role shuffle - assigning new role";
const REMOVE_REASON: &str = "Role shuffle - removing old role";

/// Edits member roles in one guild, leaving an audit log reason.
#[derive(Clone)]
pub struct HttpRoleEditor {
    http: Arc<Http>,
    guild_id: GuildId,
}

impl HttpRoleEditor {
    /// Create an editor for `guild_id`.
    pub fn new(http: Arc<Http>, guild_id: GuildId) -> Self {
        Self { http, guild_id }
    }
}

#[async_trait]
impl RoleEditor for HttpRoleEditor {
    async fn add_role(&self, user_id: u64, role_id: u64) -> ShufflerResult<()> {
        self.http
            .add_member_role(
                self.guild_id,
                UserId::new(user_id),
                RoleId::new(role_id),
                Some(ADD_REASON),
            )
            .await
            .map_err(|e| PlatformError::new(e.to_string()))?;
        Ok(())
    }

    async fn remove_role(&self, user_id: u64, role_id: u64) -> ShufflerResult<()> {
        self.http
            .remove_member_role(
                self.guild_id,
                UserId::new(user_id),
                RoleId::new(role_id),
                Some(REMOVE_REASON),
            )
            .await
            .map_err(|e| PlatformError::new(e.to_string()))?;
        Ok(())
    }
}
