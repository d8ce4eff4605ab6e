//! Layered configuration: defaults, then a JSON or TOML file, then the
//! environment.

use config::{Config, File};
use serde::Deserialize;
use shuffler_core::{CooldownPolicy, ShuffleSettings, ShuffleSettingsBuilder};
use shuffler_database::{PoolSettings, PoolSettingsBuilder};
use shuffler_error::{ConfigError, ShufflerResult};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};

/// Token value shipped in the example config file.
pub const PLACEHOLDER_TOKEN: &str = "YOUR_BOT_TOKEN_HERE";

/// Environment variables and the config keys they override.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("BOT_TOKEN", "bot_token"),
    ("DATABASE_URL", "database.url"),
    ("DB_HOST", "database.host"),
    ("DB_PORT", "database.port"),
    ("DB_NAME", "database.database"),
    ("DB_USER", "database.user"),
    ("DB_PASSWORD", "database.password"),
    ("DB_POOL_MAX_SIZE", "pool.max_size"),
    ("DB_POOL_MIN_IDLE", "pool.min_idle"),
    ("SHUFFLE_COOLDOWN_SECONDS", "shuffle.cooldown_seconds"),
    ("CONFIRM_TIMEOUT_SECONDS", "shuffle.confirm_timeout_seconds"),
];

/// PostgreSQL connection details.
///
/// `url` wins when present; otherwise the URL is assembled from the parts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Full connection URL
    pub url: Option<String>,
    /// Server host
    pub host: Option<String>,
    /// Server port
    pub port: u16,
    /// Database name
    pub database: Option<String>,
    /// Login role
    pub user: Option<String>,
    /// Login password
    pub password: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: None,
            port: 5432,
            database: None,
            user: None,
            password: None,
        }
    }
}

impl DatabaseConfig {
    /// Connection URL for diesel.
    pub fn connection_url(&self) -> ShufflerResult<String> {
        if let Some(url) = self.url.as_deref().filter(|url| !url.is_empty()) {
            return Ok(url.to_string());
        }

        let host = required(self.host.as_deref(), "database host (DB_HOST)")?;
        let database = required(self.database.as_deref(), "database name (DB_NAME)")?;
        let user = required(self.user.as_deref(), "database user (DB_USER)")?;

        let credentials = match self.password.as_deref().filter(|p| !p.is_empty()) {
            Some(password) => format!("{}:{}", user, password),
            None => user.to_string(),
        };
        Ok(format!(
            "postgres://{}@{}:{}/{}",
            credentials, host, self.port, database
        ))
    }
}

/// Connection pool sizing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum open connections
    pub max_size: u32,
    /// Connections kept open while idle
    pub min_idle: u32,
    /// Seconds a checkout waits before failing
    pub connection_timeout_seconds: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        let defaults = PoolSettings::default();
        Self {
            max_size: *defaults.max_size(),
            min_idle: *defaults.min_idle(),
            connection_timeout_seconds: defaults.connection_timeout().as_secs(),
        }
    }
}

/// Shuffle timing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ShuffleConfig {
    /// Minimum seconds between shuffles in one guild
    pub cooldown_seconds: u64,
    /// Seconds the confirmation buttons stay live
    pub confirm_timeout_seconds: u64,
    /// Default number of history rows
    pub history_limit: u32,
}

impl Default for ShuffleConfig {
    fn default() -> Self {
        Self {
            cooldown_seconds: CooldownPolicy::DEFAULT_SECONDS.unsigned_abs(),
            confirm_timeout_seconds: ShuffleSettings::DEFAULT_CONFIRM_TIMEOUT.as_secs(),
            history_limit: ShuffleSettings::DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Everything the binary reads at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ShufflerConfig {
    /// Discord bot token
    pub bot_token: Option<String>,
    /// PostgreSQL connection
    pub database: DatabaseConfig,
    /// Connection pool sizing
    pub pool: PoolConfig,
    /// Shuffle timing
    pub shuffle: ShuffleConfig,
}

impl ShufflerConfig {
    /// Load from `path` (or `config.json`/`config.toml` in the working
    /// directory when absent) and the process environment.
    pub fn load(path: Option<&Path>) -> ShufflerResult<Self> {
        Self::load_with(path, |name| std::env::var(name).ok())
    }

    /// Load with an explicit environment lookup.
    #[instrument(skip(env))]
    pub fn load_with(
        path: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> ShufflerResult<Self> {
        let mut builder = Config::builder();
        builder = match path {
            Some(path) => builder.add_source(File::from(path)),
            None => builder.add_source(File::with_name("config").required(false)),
        };

        for (variable, key) in ENV_OVERRIDES {
            if let Some(value) = env(variable) {
                debug!(variable, "Applying environment override");
                builder = builder
                    .set_override(*key, value)
                    .map_err(|e| ConfigError::new(format!("Invalid override {}: {}", variable, e)))?;
            }
        }

        let config = builder
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to read configuration: {}", e)))?
            .try_deserialize::<Self>()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;
        Ok(config)
    }

    /// Check every value the bot needs before connecting anywhere.
    pub fn validate(&self) -> ShufflerResult<()> {
        self.token()?;
        self.database.connection_url()?;
        self.shuffle_settings()?;
        Ok(())
    }

    /// The bot token, refusing blanks and the placeholder.
    pub fn token(&self) -> ShufflerResult<&str> {
        match self.bot_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() && token != PLACEHOLDER_TOKEN => Ok(token),
            _ => Err(ConfigError::new(
                "Bot token not configured: set BOT_TOKEN or bot_token in the config file",
            ))?,
        }
    }

    /// Runtime shuffle settings.
    pub fn shuffle_settings(&self) -> ShufflerResult<ShuffleSettings> {
        let confirm_timeout = Duration::from_secs(self.shuffle.confirm_timeout_seconds);
        if confirm_timeout.is_zero() {
            Err(ConfigError::new("Confirmation timeout must be at least one second"))?;
        }
        if confirm_timeout > ShuffleSettings::MAX_CONFIRM_TIMEOUT {
            Err(ConfigError::new(format!(
                "Confirmation timeout may not exceed {} seconds",
                ShuffleSettings::MAX_CONFIRM_TIMEOUT.as_secs()
            )))?;
        }
        let cooldown = CooldownPolicy::from_secs(self.shuffle.cooldown_seconds)?;

        ShuffleSettingsBuilder::default()
            .cooldown(cooldown)
            .confirm_timeout(confirm_timeout)
            .history_limit(self.shuffle.history_limit)
            .build()
            .map_err(|e| ConfigError::new(e.to_string()).into())
    }

    /// Connection pool settings.
    pub fn pool_settings(&self) -> ShufflerResult<PoolSettings> {
        PoolSettingsBuilder::default()
            .max_size(self.pool.max_size)
            .min_idle(self.pool.min_idle)
            .connection_timeout(Duration::from_secs(self.pool.connection_timeout_seconds))
            .build()
            .map_err(|e| ConfigError::new(e.to_string()).into())
    }
}

fn required<'a>(value: Option<&'a str>, what: &str) -> ShufflerResult<&'a str> {
    match value.filter(|v| !v.is_empty()) {
        Some(value) => Ok(value),
        None => Err(ConfigError::new(format!("Missing {}", what)))?,
    }
}
