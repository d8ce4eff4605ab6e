//! Domain rules for the role shuffler.
//!
//! This crate holds everything that does not talk to Discord or PostgreSQL
//! directly:
//!
//! - **permissions**: who may configure or trigger shuffles, which roles the bot can manage
//! - **cooldown**: per-guild minimum interval between shuffles
//! - **eligibility**: which configured roles take part in a shuffle
//! - **shuffle**: the random permutation and even bucket split, and applying it
//! - **store**: the persistence seam plus an in-memory implementation
//! - **notice**: renderer-agnostic descriptions of every reply the bot sends
//! - **service**: the guard sequence tying the above together

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cooldown;
mod eligibility;
mod in_memory;
mod notice;
mod permissions;
mod role;
mod service;
mod settings;
mod shuffle;
mod store;

pub use cooldown::{CooldownPolicy, describe_duration, discord_relative_timestamp};
pub use eligibility::{refresh_selection, select_roles};
pub use in_memory::InMemoryShuffleStore;
pub use notice::{ListedRole, Notice, NoticeField, Tone};
pub use permissions::{
    BotStanding, MemberAuthority, REQUIRED_PERMISSION, can_bot_manage_role,
    ensure_bot_can_manage_role, ensure_can_configure, ensure_can_shuffle,
    has_manage_roles_permission, has_shuffle_permission, manageable_roles,
};
pub use role::RoleSnapshot;
pub use service::{ConfigAction, ShuffleService};
pub use settings::{ShuffleSettings, ShuffleSettingsBuilder};
pub use shuffle::{
    FailedChange, MemberChange, RoleAssignment, RoleEditor, ShuffleOutcome, ShufflePlan,
    apply_plan,
};
pub use store::{RoleAddOutcome, ShuffleRecord, ShuffleStore, ShuffleableRole};

pub use shuffler_error::{ShufflerError, ShufflerResult};
