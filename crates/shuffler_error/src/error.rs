//! Top-level error wrapper types.

use crate::{ConfigError, GuardError, PlatformError};
#[cfg(feature = "database")]
use crate::DatabaseError;

/// Every error condition the shuffler library crates can produce.
///
/// # Examples
///
/// ```
/// use shuffler_error::{ConfigError, ShufflerError};
///
/// let err: ShufflerError = ConfigError::new("Missing token").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum ShufflerErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Guard check refused the command
    #[from(GuardError)]
    Guard(GuardError),
    /// Chat platform API error
    #[from(PlatformError)]
    Platform(PlatformError),
    /// Database error
    #[cfg(feature = "database")]
    #[from(DatabaseError)]
    Database(DatabaseError),
}

/// Shuffler error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Shuffler Error: {}", _0)]
pub struct ShufflerError(Box<ShufflerErrorKind>);

impl ShufflerError {
    /// Create a new error from a kind.
    pub fn new(kind: ShufflerErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ShufflerErrorKind {
        &self.0
    }

    /// The guard failure behind this error, if any.
    pub fn as_guard(&self) -> Option<&GuardError> {
        match self.kind() {
            ShufflerErrorKind::Guard(e) => Some(e),
            _ => None,
        }
    }
}

// Generic From implementation for any type that converts to ShufflerErrorKind
impl<T> From<T> for ShufflerError
where
    T: Into<ShufflerErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for shuffler operations.
pub type ShufflerResult<T> = std::result::Result<T, ShufflerError>;
