//! Tunable shuffle behaviour.

use crate::CooldownPolicy;
use derive_builder::Builder;
use derive_getters::Getters;
use std::time::Duration;

/// Runtime settings shared by every guild.
///
/// # Example
///
/// ```
/// use shuffler_core::{CooldownPolicy, ShuffleSettingsBuilder};
/// use std::time::Duration;
///
/// let settings = ShuffleSettingsBuilder::default()
///     .cooldown(CooldownPolicy::from_secs(60).unwrap())
///     .confirm_timeout(Duration::from_secs(30))
///     .build()
///     .unwrap();
/// assert_eq!(settings.confirm_timeout().as_secs(), 30);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Getters, Builder)]
#[builder(default)]
pub struct ShuffleSettings {
    /// Minimum interval between shuffles in one guild
    cooldown: CooldownPolicy,
    /// How long the confirmation buttons stay live
    confirm_timeout: Duration,
    /// Default number of rows shown by the history command
    history_limit: u32,
}

impl ShuffleSettings {
    /// Five minutes.
    pub const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(300);
    /// Interaction tokens stop accepting edits after fifteen minutes.
    pub const MAX_CONFIRM_TIMEOUT: Duration = Duration::from_secs(900);
    /// Default history page size.
    pub const DEFAULT_HISTORY_LIMIT: u32 = 10;
    /// Largest history page the bot will render.
    pub const MAX_HISTORY_LIMIT: u32 = 25;

    /// Clamp a requested history size into `1..=MAX_HISTORY_LIMIT`.
    pub fn history_page(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.history_limit)
            .clamp(1, Self::MAX_HISTORY_LIMIT)
    }
}

impl Default for ShuffleSettings {
    fn default() -> Self {
        Self {
            cooldown: CooldownPolicy::default(),
            confirm_timeout: Self::DEFAULT_CONFIRM_TIMEOUT,
            history_limit: Self::DEFAULT_HISTORY_LIMIT,
        }
    }
}
