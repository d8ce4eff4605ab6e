//! Point-in-time view of a guild role.

use serde::{Deserialize, Serialize};

/// A guild role together with its current members.
///
/// Built from live platform data right before a decision is made; never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSnapshot {
    /// Role snowflake
    pub id: u64,
    /// Display name
    pub name: String,
    /// Position in the guild hierarchy (higher is more powerful)
    pub position: u16,
    /// Whether an integration (bot, booster, subscription) owns the role
    pub managed: bool,
    /// User snowflakes of the members currently holding the role
    pub members: Vec<u64>,
}

impl RoleSnapshot {
    /// Create a snapshot with no members.
    pub fn new(id: u64, name: impl Into<String>, position: u16) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            managed: false,
            members: Vec::new(),
        }
    }

    /// Replace the member list.
    pub fn with_members(mut self, members: impl IntoIterator<Item = u64>) -> Self {
        self.members = members.into_iter().collect();
        self
    }

    /// Mark the role as integration-managed.
    pub fn managed(mut self, managed: bool) -> Self {
        self.managed = managed;
        self
    }

    /// The `@everyone` role shares its id with the guild.
    pub fn is_everyone(&self, guild_id: u64) -> bool {
        self.id == guild_id
    }

    /// Number of members holding the role.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}
