//! Discord front end for the role shuffler.
//!
//! Wraps [`shuffler_core::ShuffleService`] in a Serenity bot:
//!
//! - `/shuffle` asks for confirmation, then redistributes members across
//!   the configured roles
//! - `/config-roles` adds, removes or lists shuffleable roles
//! - `/shuffle-history` shows recent shuffles
//!
//! Guild joins, departures and role deletions keep the store current.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod commands;
mod config_roles;
mod editor;
mod error;
mod guild;
mod handler;
mod history;
mod reply;
mod shuffle;

pub mod conversions;

pub use client::ShufflerBot;
pub use commands::{ShufflerCommand, create_commands};
pub use editor::HttpRoleEditor;
pub use error::{DiscordError, DiscordErrorKind, DiscordResult};
pub use guild::GuildState;
pub use handler::ShufflerHandler;
