//! Role shuffler bot.
//!
//! Loads configuration, connects to PostgreSQL, applies migrations and runs
//! the Discord bot until Ctrl+C.

use clap::Parser;
use shuffler::{LogFormat, ShufflerConfig, init_tracing};
use shuffler_core::ShuffleService;
use shuffler_database::{PostgresShuffleStore, build_pool, run_migrations};
use shuffler_discord::ShufflerBot;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "shuffler")]
#[command(about = "Discord bot that randomly redistributes members across roles")]
#[command(version)]
struct Args {
    /// Configuration file (JSON or TOML); defaults to ./config.json or ./config.toml
    #[arg(short, long, env = "SHUFFLER_CONFIG")]
    config: Option<PathBuf>,

    /// Validate configuration and database connectivity, then exit
    #[arg(long)]
    dry_run: bool,

    /// Do not apply pending migrations on startup
    #[arg(long)]
    skip_migrations: bool,

    /// Log output format
    #[arg(long, value_enum, env = "LOG_FORMAT", default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// Debug logging for the shuffler crates
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    init_tracing(args.verbose, args.log_format);

    info!(config_file = ?args.config, "Loading configuration");
    let config = ShufflerConfig::load(args.config.as_deref())?;
    config.validate()?;

    let settings = config.shuffle_settings()?;
    info!(
        cooldown = %settings.cooldown().describe(),
        confirm_timeout_secs = settings.confirm_timeout().as_secs(),
        "Configuration loaded"
    );

    let database_url = config.database.connection_url()?;
    let pool_settings = config.pool_settings()?;
    let pool = tokio::task::spawn_blocking(move || build_pool(&database_url, &pool_settings)).await??;

    if args.dry_run {
        info!("DRY RUN - configuration and database connection are valid");
        return Ok(());
    }

    if args.skip_migrations {
        warn!("Skipping migrations");
    } else {
        let migration_pool = pool.clone();
        let applied = tokio::task::spawn_blocking(move || run_migrations(&migration_pool)).await??;
        for version in &applied {
            info!(%version, "Applied migration");
        }
    }

    let store = Arc::new(PostgresShuffleStore::new(pool));
    let service = ShuffleService::new(store, settings);

    let mut bot = ShufflerBot::new(config.token()?, service).await?;
    bot.start().await?;

    Ok(())
}
