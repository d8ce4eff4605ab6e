//! PostgreSQL implementation of [`ShuffleStore`].

use crate::models::{
    CooldownRow, NewServer, NewShuffleHistory, NewShuffleableRole, ShuffleHistoryRow,
    ShuffleableRoleRow, to_db_id, to_naive,
};
use crate::schema::{servers, shuffle_cooldowns, shuffle_history, shuffleable_roles};
use crate::{DatabaseResult, DbPool};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use shuffler_core::{RoleAddOutcome, ShuffleRecord, ShuffleStore, ShuffleableRole};
use shuffler_error::{DatabaseError, DatabaseErrorKind, ShufflerResult};
use tracing::{debug, info, instrument};

/// Diesel-backed store. Every query runs on the blocking thread pool with a
/// pooled connection.
///
/// # Example
///
/// ```no_run
/// use shuffler_database::{PoolSettings, PostgresShuffleStore, build_pool};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = build_pool("postgres://localhost/role_shuffler", &PoolSettings::default())?;
/// let store = PostgresShuffleStore::new(pool);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PostgresShuffleStore {
    pool: DbPool,
}

impl std::fmt::Debug for PostgresShuffleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresShuffleStore")
            .field("connections", &self.pool.state().connections)
            .finish()
    }
}

impl PostgresShuffleStore {
    /// Wrap an existing pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn run<T, F>(&self, op: F) -> ShufflerResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> DatabaseResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        let result = tokio::task::spawn_blocking(move || -> DatabaseResult<T> {
            let mut pooled = pool.get()?;
            let conn: &mut PgConnection = &mut pooled;
            op(conn)
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Task(e.to_string())))?;
        Ok(result?)
    }
}

#[async_trait]
impl ShuffleStore for PostgresShuffleStore {
    #[instrument(skip(self))]
    async fn upsert_server(&self, guild_id: u64, guild_name: &str) -> ShufflerResult<()> {
        let row = NewServer {
            guild_id: to_db_id(guild_id),
            guild_name: guild_name.to_string(),
        };
        self.run(move |conn| {
            diesel::insert_into(servers::table)
                .values(&row)
                .on_conflict(servers::guild_id)
                .do_update()
                .set((
                    servers::guild_name.eq(&row.guild_name),
                    servers::updated_at.eq(diesel::dsl::now),
                ))
                .execute(conn)?;
            Ok(())
        })
        .await?;
        debug!("Server upserted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_server(&self, guild_id: u64) -> ShufflerResult<()> {
        let deleted = self
            .run(move |conn| {
                Ok(diesel::delete(servers::table.find(to_db_id(guild_id))).execute(conn)?)
            })
            .await?;
        info!(deleted, "Server removed");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn add_role(
        &self,
        guild_id: u64,
        role_id: u64,
        role_name: &str,
        added_by: u64,
    ) -> ShufflerResult<RoleAddOutcome> {
        let row = NewShuffleableRole {
            guild_id: to_db_id(guild_id),
            role_id: to_db_id(role_id),
            role_name: role_name.to_string(),
            added_by: to_db_id(added_by),
        };
        self.run(move |conn| {
            conn.transaction::<_, DatabaseError, _>(|conn| {
                let existing: Option<bool> = shuffleable_roles::table
                    .filter(shuffleable_roles::guild_id.eq(row.guild_id))
                    .filter(shuffleable_roles::role_id.eq(row.role_id))
                    .select(shuffleable_roles::enabled)
                    .first(conn)
                    .optional()?;

                match existing {
                    Some(true) => Ok(RoleAddOutcome::AlreadyConfigured),
                    Some(false) => {
                        diesel::update(
                            shuffleable_roles::table
                                .filter(shuffleable_roles::guild_id.eq(row.guild_id))
                                .filter(shuffleable_roles::role_id.eq(row.role_id)),
                        )
                        .set((
                            shuffleable_roles::enabled.eq(true),
                            shuffleable_roles::role_name.eq(&row.role_name),
                            shuffleable_roles::added_by.eq(row.added_by),
                            shuffleable_roles::updated_at.eq(diesel::dsl::now),
                        ))
                        .execute(conn)?;
                        Ok(RoleAddOutcome::Added)
                    }
                    None => {
                        diesel::insert_into(shuffleable_roles::table)
                            .values(&row)
                            .execute(conn)?;
                        Ok(RoleAddOutcome::Added)
                    }
                }
            })
        })
        .await
    }

    #[instrument(skip(self))]
    async fn remove_role(&self, guild_id: u64, role_id: u64) -> ShufflerResult<bool> {
        self.run(move |conn| disable(conn, guild_id, role_id)).await
    }

    #[instrument(skip(self))]
    async fn disable_role(&self, guild_id: u64, role_id: u64) -> ShufflerResult<()> {
        if self.run(move |conn| disable(conn, guild_id, role_id)).await? {
            info!("Disabled deleted role");
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_roles(&self, guild_id: u64) -> ShufflerResult<Vec<ShuffleableRole>> {
        let rows = self
            .run(move |conn| {
                Ok(shuffleable_roles::table
                    .filter(shuffleable_roles::guild_id.eq(to_db_id(guild_id)))
                    .filter(shuffleable_roles::enabled.eq(true))
                    .order(shuffleable_roles::role_name.asc())
                    .select(ShuffleableRoleRow::as_select())
                    .load(conn)?)
            })
            .await?;
        Ok(rows.into_iter().map(ShuffleableRole::from).collect())
    }

    #[instrument(skip(self))]
    async fn set_cooldown(
        &self,
        guild_id: u64,
        triggered_by: u64,
        at: DateTime<Utc>,
    ) -> ShufflerResult<()> {
        let row = CooldownRow {
            guild_id: to_db_id(guild_id),
            last_shuffle: to_naive(at),
            triggered_by: to_db_id(triggered_by),
        };
        self.run(move |conn| {
            diesel::insert_into(shuffle_cooldowns::table)
                .values(&row)
                .on_conflict(shuffle_cooldowns::guild_id)
                .do_update()
                .set((
                    shuffle_cooldowns::last_shuffle.eq(row.last_shuffle),
                    shuffle_cooldowns::triggered_by.eq(row.triggered_by),
                ))
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn last_shuffle(&self, guild_id: u64) -> ShufflerResult<Option<DateTime<Utc>>> {
        let last = self
            .run(move |conn| {
                Ok(shuffle_cooldowns::table
                    .find(to_db_id(guild_id))
                    .select(shuffle_cooldowns::last_shuffle)
                    .first::<NaiveDateTime>(conn)
                    .optional()?)
            })
            .await?;
        Ok(last.map(|at| at.and_utc()))
    }

    #[instrument(skip(self, record), fields(guild_id = record.guild_id))]
    async fn log_shuffle(&self, record: &ShuffleRecord) -> ShufflerResult<()> {
        let row = NewShuffleHistory::try_from(record)
            .map_err(|e| DatabaseError::new(DatabaseErrorKind::Query(e.to_string())))?;
        self.run(move |conn| {
            diesel::insert_into(shuffle_history::table)
                .values(&row)
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn recent_shuffles(
        &self,
        guild_id: u64,
        limit: u32,
    ) -> ShufflerResult<Vec<ShuffleRecord>> {
        let rows = self
            .run(move |conn| {
                Ok(shuffle_history::table
                    .filter(shuffle_history::guild_id.eq(to_db_id(guild_id)))
                    .order((shuffle_history::created_at.desc(), shuffle_history::id.desc()))
                    .limit(i64::from(limit))
                    .select(ShuffleHistoryRow::as_select())
                    .load(conn)?)
            })
            .await?;
        Ok(rows.into_iter().map(ShuffleRecord::from).collect())
    }
}

/// Soft-disable an enabled role; reports whether a row changed.
fn disable(conn: &mut PgConnection, guild_id: u64, role_id: u64) -> DatabaseResult<bool> {
    let updated = diesel::update(
        shuffleable_roles::table
            .filter(shuffleable_roles::guild_id.eq(to_db_id(guild_id)))
            .filter(shuffleable_roles::role_id.eq(to_db_id(role_id)))
            .filter(shuffleable_roles::enabled.eq(true)),
    )
    .set((
        shuffleable_roles::enabled.eq(false),
        shuffleable_roles::updated_at.eq(diesel::dsl::now),
    ))
    .execute(conn)?;
    Ok(updated > 0)
}
