//! Guard check failures surfaced to users as chat replies.

use chrono::{DateTime, Utc};

/// Reasons a command refuses to proceed.
///
/// None of these are retried; each maps to one user-facing reply.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum GuardErrorKind {
    /// Invoking member lacks the required permission.
    #[display("Missing permission: {}", required)]
    MissingPermission {
        /// Human-readable permission name
        required: String,
    },

    /// The bot cannot assign or remove the role.
    #[display("Bot cannot manage role '{}'", role_name)]
    UnmanageableRole {
        /// Name of the offending role
        role_name: String,
    },

    /// A role option was required but not supplied.
    #[display("Action '{}' requires a role", action)]
    MissingRoleArgument {
        /// The sub-action that needed the role
        action: String,
    },

    /// Guild has no shuffleable roles configured.
    #[display("No shuffleable roles configured")]
    NoConfiguredRoles,

    /// Roles are configured but none are usable right now.
    #[display("No configured role is populated and manageable")]
    NoEligibleRoles,

    /// Fewer than two usable roles remain.
    #[display("At least 2 roles with members are required, found {}", found)]
    NotEnoughRoles {
        /// Number of usable roles
        found: usize,
    },

    /// A shuffle happened too recently.
    #[display("Shuffle on cooldown until {}", expires_at)]
    CooldownActive {
        /// When the next shuffle becomes possible
        expires_at: DateTime<Utc>,
    },

    /// Command was used outside of a guild.
    #[display("Command must be used in a server")]
    NotInGuild,
}

/// Guard error with source location tracking.
///
/// # Examples
///
/// ```
/// use shuffler_error::{GuardError, GuardErrorKind};
///
/// let err = GuardError::new(GuardErrorKind::NoConfiguredRoles);
/// assert_eq!(err.kind(), &GuardErrorKind::NoConfiguredRoles);
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Guard Error: {} at line {} in {}", kind, line, file)]
pub struct GuardError {
    /// The kind of error that occurred
    pub kind: GuardErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl GuardError {
    /// Create a new GuardError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: GuardErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &GuardErrorKind {
        &self.kind
    }
}

/// Result type for guard checks.
pub type GuardResult<T> = Result<T, GuardError>;
