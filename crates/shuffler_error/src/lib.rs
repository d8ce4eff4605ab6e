//! Error types for the role shuffler.
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - Constructors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use shuffler_error::{ConfigError, ShufflerResult};
//!
//! fn load_token() -> ShufflerResult<String> {
//!     Err(ConfigError::new("Bot token not configured"))?
//! }
//!
//! assert!(load_token().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
#[cfg(feature = "database")]
mod database;
mod error;
mod guard;
mod platform;

pub use config::ConfigError;
#[cfg(feature = "database")]
pub use database::{DatabaseError, DatabaseErrorKind};
pub use error::{ShufflerError, ShufflerErrorKind, ShufflerResult};
pub use guard::{GuardError, GuardErrorKind, GuardResult};
pub use platform::PlatformError;
