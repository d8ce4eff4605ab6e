//! Connection pool and migrations.

use crate::DatabaseResult;
use derive_builder::Builder;
use derive_getters::Getters;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use shuffler_error::{DatabaseError, DatabaseErrorKind};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Pooled PostgreSQL connections.
pub type DbPool = Pool<ConnectionManager<PgConnection>>;

/// Sizing for the connection pool.
///
/// # Example
///
/// ```
/// use shuffler_database::PoolSettingsBuilder;
///
/// let settings = PoolSettingsBuilder::default().max_size(4u32).build().unwrap();
/// assert_eq!(*settings.max_size(), 4);
/// assert_eq!(*settings.min_idle(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Getters, Builder)]
#[builder(default, setter(into))]
pub struct PoolSettings {
    /// Maximum open connections
    max_size: u32,
    /// Connections kept open while idle
    min_idle: u32,
    /// How long a checkout waits before failing
    connection_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_size: 20,
            min_idle: 5,
            connection_timeout: Duration::from_secs(30),
        }
    }
}

/// Build a pool and check out one connection to prove the URL works.
#[instrument(skip(database_url), fields(max_size = settings.max_size, min_idle = settings.min_idle))]
pub fn build_pool(database_url: &str, settings: &PoolSettings) -> DatabaseResult<DbPool> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = Pool::builder()
        .max_size(settings.max_size)
        .min_idle(Some(settings.min_idle.min(settings.max_size)))
        .connection_timeout(settings.connection_timeout)
        .build(manager)
        .map_err(|e| {
            DatabaseError::new(DatabaseErrorKind::Connection(format!(
                "Failed to create connection pool: {}",
                e
            )))
        })?;

    check_connection(&pool)?;
    info!("Database pool ready");
    Ok(pool)
}

/// Run `SELECT 1` on a pooled connection.
pub fn check_connection(pool: &DbPool) -> DatabaseResult<()> {
    let mut pooled = pool.get()?;
    let conn: &mut PgConnection = &mut pooled;
    diesel::sql_query("SELECT 1").execute(conn)?;
    debug!("Database connection verified");
    Ok(())
}

/// Apply every pending embedded migration. Returns the versions applied.
#[instrument(skip(pool))]
pub fn run_migrations(pool: &DbPool) -> DatabaseResult<Vec<String>> {
    let mut pooled = pool.get()?;
    let conn: &mut PgConnection = &mut pooled;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Migration(e.to_string())))?
        .iter()
        .map(|version| version.to_string())
        .collect::<Vec<_>>();

    info!(count = applied.len(), "Migrations applied");
    Ok(applied)
}
