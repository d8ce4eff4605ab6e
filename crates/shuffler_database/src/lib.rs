//! PostgreSQL storage for the role shuffler.
//!
//! Diesel schema and rows for the four shuffler tables, embedded migrations,
//! an r2d2 connection pool, and [`PostgresShuffleStore`], the production
//! implementation of [`shuffler_core::ShuffleStore`].
//!
//! # Example
//!
//! ```rust,ignore
//! use shuffler_database::{PoolSettings, PostgresShuffleStore, build_pool, run_migrations};
//!
//! let pool = build_pool(&database_url, &PoolSettings::default())?;
//! run_migrations(&pool)?;
//! let store = PostgresShuffleStore::new(pool);
//! ```

mod connection;
mod models;
mod repository;

pub mod schema;

pub use connection::{
    DbPool, MIGRATIONS, PoolSettings, PoolSettingsBuilder, build_pool, check_connection,
    run_migrations,
};
pub use models::{
    CooldownRow, NewServer, NewShuffleHistory, NewShuffleHistoryBuilder, NewShuffleableRole,
    ServerRow, ShuffleHistoryRow, ShuffleableRoleRow, from_db_id, to_db_id,
};
pub use repository::PostgresShuffleStore;

use shuffler_error::DatabaseError;

/// Result type for database operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;
