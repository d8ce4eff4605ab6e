//! In-memory implementation of ShuffleStore for testing.
//!
//! State lives in HashMaps behind an RwLock and is lost when the store is
//! dropped. Guild removal cascades the same way the database schema does.

use crate::{RoleAddOutcome, ShuffleRecord, ShuffleStore, ShuffleableRole};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shuffler_error::ShufflerResult;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory store for guild configuration.
///
/// # Example
/// ```
/// use shuffler_core::{InMemoryShuffleStore, ShuffleStore};
///
/// #[tokio::main]
/// async fn main() {
///     let store = InMemoryShuffleStore::new();
///     store.upsert_server(1, "Test Guild").await.unwrap();
///     assert!(store.list_roles(1).await.unwrap().is_empty());
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryShuffleStore {
    state: Arc<RwLock<State>>,
}

#[derive(Debug, Default)]
struct State {
    servers: HashMap<u64, String>,
    roles: HashMap<(u64, u64), StoredRole>,
    cooldowns: HashMap<u64, DateTime<Utc>>,
    history: Vec<ShuffleRecord>,
}

#[derive(Debug, Clone)]
struct StoredRole {
    role: ShuffleableRole,
    enabled: bool,
}

impl InMemoryShuffleStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Name stored for a guild (for testing).
    pub async fn server_name(&self, guild_id: u64) -> Option<String> {
        self.state.read().await.servers.get(&guild_id).cloned()
    }

    /// Number of audit rows across all guilds (for testing).
    pub async fn history_len(&self) -> usize {
        self.state.read().await.history.len()
    }
}

#[async_trait]
impl ShuffleStore for InMemoryShuffleStore {
    async fn upsert_server(&self, guild_id: u64, guild_name: &str) -> ShufflerResult<()> {
        self.state
            .write()
            .await
            .servers
            .insert(guild_id, guild_name.to_string());
        Ok(())
    }

    async fn remove_server(&self, guild_id: u64) -> ShufflerResult<()> {
        let mut state = self.state.write().await;
        state.servers.remove(&guild_id);
        state.roles.retain(|(guild, _), _| *guild != guild_id);
        state.cooldowns.remove(&guild_id);
        state.history.retain(|record| record.guild_id != guild_id);
        Ok(())
    }

    async fn add_role(
        &self,
        guild_id: u64,
        role_id: u64,
        role_name: &str,
        added_by: u64,
    ) -> ShufflerResult<RoleAddOutcome> {
        let mut state = self.state.write().await;
        match state.roles.get_mut(&(guild_id, role_id)) {
            Some(stored) if stored.enabled => Ok(RoleAddOutcome::AlreadyConfigured),
            Some(stored) => {
                stored.enabled = true;
                stored.role.role_name = role_name.to_string();
                stored.role.added_by = added_by;
                Ok(RoleAddOutcome::Added)
            }
            None => {
                state.roles.insert(
                    (guild_id, role_id),
                    StoredRole {
                        role: ShuffleableRole {
                            guild_id,
                            role_id,
                            role_name: role_name.to_string(),
                            added_by,
                            created_at: Utc::now(),
                        },
                        enabled: true,
                    },
                );
                Ok(RoleAddOutcome::Added)
            }
        }
    }

    async fn remove_role(&self, guild_id: u64, role_id: u64) -> ShufflerResult<bool> {
        let mut state = self.state.write().await;
        match state.roles.get_mut(&(guild_id, role_id)) {
            Some(stored) if stored.enabled => {
                stored.enabled = false;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn disable_role(&self, guild_id: u64, role_id: u64) -> ShufflerResult<()> {
        self.remove_role(guild_id, role_id).await.map(|_| ())
    }

    async fn list_roles(&self, guild_id: u64) -> ShufflerResult<Vec<ShuffleableRole>> {
        let state = self.state.read().await;
        let mut roles: Vec<ShuffleableRole> = state
            .roles
            .values()
            .filter(|stored| stored.enabled && stored.role.guild_id == guild_id)
            .map(|stored| stored.role.clone())
            .collect();
        roles.sort_by(|a, b| a.role_name.cmp(&b.role_name));
        Ok(roles)
    }

    async fn set_cooldown(
        &self,
        guild_id: u64,
        _triggered_by: u64,
        at: DateTime<Utc>,
    ) -> ShufflerResult<()> {
        self.state.write().await.cooldowns.insert(guild_id, at);
        Ok(())
    }

    async fn last_shuffle(&self, guild_id: u64) -> ShufflerResult<Option<DateTime<Utc>>> {
        Ok(self.state.read().await.cooldowns.get(&guild_id).copied())
    }

    async fn log_shuffle(&self, record: &ShuffleRecord) -> ShufflerResult<()> {
        self.state.write().await.history.push(record.clone());
        Ok(())
    }

    async fn recent_shuffles(
        &self,
        guild_id: u64,
        limit: u32,
    ) -> ShufflerResult<Vec<ShuffleRecord>> {
        let state = self.state.read().await;
        let mut records: Vec<ShuffleRecord> = state
            .history
            .iter()
            .filter(|record| record.guild_id == guild_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.truncate(limit as usize);
        Ok(records)
    }
}
