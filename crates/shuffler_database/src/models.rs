//! Row types for the shuffler tables.

use crate::schema::{servers, shuffle_cooldowns, shuffle_history, shuffleable_roles};
use chrono::{DateTime, NaiveDateTime, Utc};
use derive_builder::Builder;
use diesel::prelude::*;
use shuffler_core::{ShuffleRecord, ShuffleableRole};

/// Store a Discord snowflake in a BIGINT column.
///
/// Bit-preserving: ids above `i64::MAX` become negative and round-trip
/// through [`from_db_id`].
pub fn to_db_id(id: u64) -> i64 {
    id as i64
}

/// Read a Discord snowflake back from a BIGINT column.
pub fn from_db_id(id: i64) -> u64 {
    id as u64
}

/// Database row for the `servers` table.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = servers)]
#[diesel(primary_key(guild_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ServerRow {
    pub guild_id: i64,
    pub guild_name: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable struct for the `servers` table.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = servers)]
pub struct NewServer {
    pub guild_id: i64,
    pub guild_name: String,
}

/// Database row for the `shuffleable_roles` table.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = shuffleable_roles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ShuffleableRoleRow {
    pub id: i32,
    pub guild_id: i64,
    pub role_id: i64,
    pub role_name: String,
    pub added_by: i64,
    pub enabled: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable struct for the `shuffleable_roles` table.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = shuffleable_roles)]
pub struct NewShuffleableRole {
    pub guild_id: i64,
    pub role_id: i64,
    pub role_name: String,
    pub added_by: i64,
}

/// Row for the `shuffle_cooldowns` table; inserted and read back as-is.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = shuffle_cooldowns)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CooldownRow {
    pub guild_id: i64,
    pub last_shuffle: NaiveDateTime,
    pub triggered_by: i64,
}

/// Database row for the `shuffle_history` table.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = shuffle_history)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ShuffleHistoryRow {
    pub id: i32,
    pub guild_id: i64,
    pub triggered_by: i64,
    pub users_affected: i32,
    pub roles_shuffled: Vec<String>,
    pub created_at: NaiveDateTime,
}

/// Insertable struct for the `shuffle_history` table.
#[derive(Debug, Clone, Insertable, Builder)]
#[diesel(table_name = shuffle_history)]
#[builder(setter(into))]
pub struct NewShuffleHistory {
    guild_id: i64,
    triggered_by: i64,
    users_affected: i32,
    roles_shuffled: Vec<String>,
    created_at: NaiveDateTime,
}

impl From<ShuffleableRoleRow> for ShuffleableRole {
    fn from(row: ShuffleableRoleRow) -> Self {
        Self {
            guild_id: from_db_id(row.guild_id),
            role_id: from_db_id(row.role_id),
            role_name: row.role_name,
            added_by: from_db_id(row.added_by),
            created_at: row.created_at.and_utc(),
        }
    }
}

impl From<ShuffleHistoryRow> for ShuffleRecord {
    fn from(row: ShuffleHistoryRow) -> Self {
        Self {
            guild_id: from_db_id(row.guild_id),
            triggered_by: from_db_id(row.triggered_by),
            users_affected: u32::try_from(row.users_affected).unwrap_or_default(),
            roles_shuffled: row.roles_shuffled,
            created_at: row.created_at.and_utc(),
        }
    }
}

impl TryFrom<&ShuffleRecord> for NewShuffleHistory {
    type Error = NewShuffleHistoryBuilderError;

    fn try_from(record: &ShuffleRecord) -> Result<Self, Self::Error> {
        NewShuffleHistoryBuilder::default()
            .guild_id(to_db_id(record.guild_id))
            .triggered_by(to_db_id(record.triggered_by))
            .users_affected(i32::try_from(record.users_affected).unwrap_or(i32::MAX))
            .roles_shuffled(record.roles_shuffled.clone())
            .created_at(to_naive(record.created_at))
            .build()
    }
}

/// UTC instant as stored in a `TIMESTAMP` column.
pub fn to_naive(at: DateTime<Utc>) -> NaiveDateTime {
    at.naive_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_snowflake_cast_round_trips_high_bit() {
        let id = u64::MAX - 5;
        assert!(to_db_id(id) < 0);
        assert_eq!(from_db_id(to_db_id(id)), id);
    }

    #[test]
    fn test_history_row_builds_from_record() {
        let record = ShuffleRecord {
            guild_id: 1,
            triggered_by: 2,
            users_affected: 3,
            roles_shuffled: vec!["Red".to_string()],
            created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        };
        let row = NewShuffleHistory::try_from(&record).unwrap();
        assert_eq!(row.users_affected, 3);
        assert_eq!(row.created_at.and_utc(), record.created_at);
    }
}
