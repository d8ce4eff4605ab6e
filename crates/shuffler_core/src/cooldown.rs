//! Per-guild cooldown between shuffles.

use chrono::{DateTime, TimeDelta, Utc};
use shuffler_error::{ConfigError, GuardError, GuardErrorKind, GuardResult};

/// Minimum interval enforced between two shuffles in the same guild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownPolicy {
    window: TimeDelta,
}

impl CooldownPolicy {
    /// Five minutes.
    pub const DEFAULT_SECONDS: i64 = 300;

    /// Create a policy with the given window.
    pub fn new(window: TimeDelta) -> Self {
        Self { window }
    }

    /// Create a policy from a window in seconds.
    ///
    /// Fails when the window does not fit a [`TimeDelta`].
    pub fn from_secs(seconds: u64) -> Result<Self, ConfigError> {
        i64::try_from(seconds)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .map(Self::new)
            .ok_or_else(|| {
                ConfigError::new(format!("Cooldown of {} seconds is out of range", seconds))
            })
    }

    /// The configured window.
    pub fn window(&self) -> TimeDelta {
        self.window
    }

    /// When the cooldown started at `last_shuffle` ends, if it is still running at `now`.
    ///
    /// A window reaching past the representable range never expires.
    pub fn expires_at(
        &self,
        last_shuffle: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        let expires = last_shuffle
            .checked_add_signed(self.window)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        (expires > now).then_some(expires)
    }

    /// Refuse a shuffle while the cooldown is running.
    pub fn check(&self, last_shuffle: Option<DateTime<Utc>>, now: DateTime<Utc>) -> GuardResult<()> {
        match last_shuffle.and_then(|last| self.expires_at(last, now)) {
            Some(expires_at) => Err(GuardError::new(GuardErrorKind::CooldownActive { expires_at })),
            None => Ok(()),
        }
    }

    /// Window rendered for humans, e.g. "5 minutes".
    pub fn describe(&self) -> String {
        describe_seconds(self.window.num_seconds())
    }
}

/// A duration rendered for humans, e.g. "5 minutes" or "90 seconds".
pub fn describe_duration(duration: std::time::Duration) -> String {
    describe_seconds(i64::try_from(duration.as_secs()).unwrap_or(i64::MAX))
}

fn describe_seconds(seconds: i64) -> String {
    match seconds {
        1 => "1 second".to_string(),
        60 => "1 minute".to_string(),
        s if s > 0 && s % 60 == 0 => format!("{} minutes", s / 60),
        s => format!("{} seconds", s),
    }
}

impl Default for CooldownPolicy {
    fn default() -> Self {
        Self::new(TimeDelta::seconds(Self::DEFAULT_SECONDS))
    }
}

/// Discord relative timestamp markup, rendered client-side as "in 3 minutes".
pub fn discord_relative_timestamp(at: DateTime<Utc>) -> String {
    format!("<t:{}:R>", at.timestamp())
}
