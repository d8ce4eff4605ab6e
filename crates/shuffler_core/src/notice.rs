//! Renderer-agnostic replies.
//!
//! Every message the bot sends is described here as a [`Notice`]; the
//! Discord crate turns it into an embed.

use crate::{
    CooldownPolicy, RoleSnapshot, ShuffleOutcome, ShufflePlan, ShuffleRecord,
    discord_relative_timestamp,
};
use serde::Serialize;
use shuffler_error::{GuardError, GuardErrorKind, ShufflerError};

/// Colour family of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tone {
    /// Green
    Success,
    /// Yellow
    Warning,
    /// Blue
    Info,
    /// Red
    Danger,
    /// Orange
    Caution,
}

/// A titled block inside a notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoticeField {
    /// Field heading
    pub name: String,
    /// Field body
    pub value: String,
}

/// One reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Heading
    pub title: String,
    /// Body text
    pub description: String,
    /// Extra blocks, rendered full width in order
    pub fields: Vec<NoticeField>,
    /// Small trailing text
    pub footer: Option<String>,
    /// Colour family
    pub tone: Tone,
}

/// A configured role as shown by the list command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListedRole {
    /// Role still exists in the guild
    Present {
        /// Current name
        name: String,
        /// Current member count
        member_count: usize,
    },
    /// Role was deleted after being configured
    Deleted {
        /// Name stored when it was configured
        name: String,
    },
}

impl ListedRole {
    fn line(&self) -> String {
        match self {
            Self::Present { name, member_count } => {
                format!("• **{}** ({} members)", name, member_count)
            }
            Self::Deleted { name } => format!("• ~~{}~~ (deleted)", name),
        }
    }
}

const ADD_ROLES_HINT: &str = "Use `/config-roles add @role` to add roles to the shuffle pool.";
const LIST_FIELD_LIMIT: usize = 1000;
const LIST_CHUNK: usize = 10;
const FAILURES_SHOWN: usize = 5;

impl Notice {
    /// Create a notice with no fields.
    pub fn new(title: impl Into<String>, description: impl Into<String>, tone: Tone) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            fields: Vec::new(),
            footer: None,
            tone,
        }
    }

    /// Append a field.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(NoticeField {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Set the footer.
    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Role newly configured.
    pub fn role_added(role_name: &str) -> Self {
        Self::new(
            "✅ Role Added",
            format!("**{}** has been added to the shuffleable roles list.", role_name),
            Tone::Success,
        )
        .field(
            "What this means:",
            "Users with this role can now be included in role shuffles.",
        )
    }

    /// Role was configured already.
    pub fn role_already_added(role_name: &str) -> Self {
        Self::new(
            "⚠️ Role Already Added",
            format!("**{}** is already in the shuffleable roles list.", role_name),
            Tone::Warning,
        )
    }

    /// Role no longer shuffleable.
    pub fn role_removed(role_name: &str) -> Self {
        Self::new(
            "✅ Role Removed",
            format!(
                "**{}** has been removed from the shuffleable roles list.",
                role_name
            ),
            Tone::Success,
        )
        .field(
            "What this means:",
            "Users with this role will no longer be included in role shuffles.",
        )
    }

    /// Role was not configured.
    pub fn role_not_found(role_name: &str) -> Self {
        Self::new(
            "⚠️ Role Not Found",
            format!("**{}** was not in the shuffleable roles list.", role_name),
            Tone::Warning,
        )
    }

    /// Configured roles for a guild.
    ///
    /// Long lists are split into fields of ten lines.
    pub fn role_list(roles: &[ListedRole]) -> Self {
        if roles.is_empty() {
            return Self::new(
                "📝 Shuffleable Roles",
                "No shuffleable roles have been configured for this server.",
                Tone::Info,
            )
            .field("How to add roles:", ADD_ROLES_HINT);
        }

        let lines: Vec<String> = roles.iter().map(ListedRole::line).collect();
        let mut notice = Self::new(
            "📝 Shuffleable Roles",
            format!(
                "There are **{}** roles configured for shuffling:",
                roles.len()
            ),
            Tone::Info,
        );

        let joined = lines.join("\n");
        if joined.len() > LIST_FIELD_LIMIT {
            for (index, chunk) in lines.chunks(LIST_CHUNK).enumerate() {
                let name = if index == 0 {
                    "Roles:".to_string()
                } else {
                    format!("Roles (continued {}):", index + 1)
                };
                notice = notice.field(name, chunk.join("\n"));
            }
        } else {
            notice = notice.field("Roles:", joined);
        }

        notice.field(
            "Usage:",
            "Use `/shuffle` to randomly redistribute these roles among users.",
        )
    }

    /// The reply for a guard failure.
    pub fn from_guard(error: &GuardError, user_id: u64) -> Self {
        match error.kind() {
            GuardErrorKind::MissingPermission { required } => Self::new(
                "❌ Permission Denied",
                format!(
                    "<@{}>, you need **{}** permission to use this command.\n\
                     Contact a server administrator if you believe this is an error.",
                    user_id, required
                ),
                Tone::Danger,
            ),
            GuardErrorKind::UnmanageableRole { role_name } => Self::new(
                "❌ Cannot Manage Role",
                format!(
                    "I cannot manage the role **{}**.\n\
                     This might be because:\n\
                     • The role is higher than my highest role\n\
                     • I don't have the **Manage Roles** permission\n\
                     • The role is a special role (like @everyone)\n\n\
                     Please check my permissions and role hierarchy.",
                    role_name
                ),
                Tone::Danger,
            ),
            GuardErrorKind::MissingRoleArgument { action } => Self::new(
                "❌ Missing Role",
                format!(
                    "You must specify a role to {}. Use `/config-roles {} @role`",
                    action, action
                ),
                Tone::Danger,
            ),
            GuardErrorKind::NoConfiguredRoles => Self::new(
                "❌ No Shuffleable Roles",
                "No roles have been configured for shuffling in this server.",
                Tone::Danger,
            )
            .field("How to add roles:", ADD_ROLES_HINT),
            GuardErrorKind::NoEligibleRoles => Self::new(
                "❌ No Valid Roles",
                "No shuffleable roles found with members that I can manage.",
                Tone::Danger,
            )
            .field(
                "Possible issues:",
                "• Roles are empty (no members)\n\
                 • Roles are above my highest role\n\
                 • I don't have Manage Roles permission",
            ),
            GuardErrorKind::NotEnoughRoles { .. } => Self::new(
                "❌ Need More Roles",
                "At least 2 roles with members are needed for shuffling.",
                Tone::Danger,
            ),
            GuardErrorKind::CooldownActive { expires_at } => Self::new(
                "⏰ Shuffle on Cooldown",
                "Please wait before shuffling again.",
                Tone::Caution,
            )
            .field("Cooldown expires:", discord_relative_timestamp(*expires_at)),
            GuardErrorKind::NotInGuild => Self::new(
                "❌ Server Only",
                "This command can only be used inside a server.",
                Tone::Danger,
            ),
        }
    }

    /// The reply for any error: guard failures get their own text, anything
    /// else is reported generically.
    pub fn from_error(error: &ShufflerError, user_id: u64) -> Self {
        match error.as_guard() {
            Some(guard) => Self::from_guard(guard, user_id),
            None => Self::generic_error(),
        }
    }

    /// Confirmation prompt shown before shuffling.
    pub fn confirm_shuffle(roles: &[RoleSnapshot], total_users: usize, timeout: &str) -> Self {
        let role_info = roles
            .iter()
            .map(|role| format!("• **{}** ({} members)", role.name, role.member_count()))
            .collect::<Vec<_>>()
            .join("\n");

        Self::new(
            "🎲 Confirm Role Shuffle",
            format!(
                "Are you sure you want to shuffle roles for **{}** users?",
                total_users
            ),
            Tone::Info,
        )
        .field("Roles to shuffle:", role_info)
        .field(
            "What will happen:",
            "• All users will have their current shuffle role removed\n\
             • Each user will be randomly assigned one of the above roles\n\
             • Users may get the same role they had before",
        )
        .footer(format!(
            "This action cannot be undone. You have {} to confirm.",
            timeout
        ))
    }

    /// Shown while role edits are in flight.
    pub fn shuffling() -> Self {
        Self::new("🎲 Shuffling roles...", "Please wait...", Tone::Info)
    }

    /// Someone other than the initiator pressed a button.
    pub fn not_initiator(confirming: bool) -> Self {
        let verb = if confirming { "confirm" } else { "cancel" };
        Self::new(
            "❌ Not Your Shuffle",
            format!("Only the person who initiated the shuffle can {} it.", verb),
            Tone::Danger,
        )
    }

    /// Initiator cancelled.
    pub fn cancelled() -> Self {
        Self::new(
            "❌ Shuffle Cancelled",
            "The role shuffle has been cancelled.",
            Tone::Danger,
        )
    }

    /// Nobody answered the prompt in time.
    pub fn timed_out(timeout: &str) -> Self {
        Self::new(
            "⏰ Shuffle Timed Out",
            format!("The shuffle confirmation timed out after {}.", timeout),
            Tone::Caution,
        )
    }

    /// Result of a completed shuffle.
    pub fn shuffle_complete(
        plan: &ShufflePlan,
        outcome: &ShuffleOutcome,
        cooldown: &CooldownPolicy,
        performed_by: &str,
    ) -> Self {
        let distribution = plan
            .assignments()
            .iter()
            .map(|a| format!("• **{}**: {} members", a.role_name, a.members.len()))
            .collect::<Vec<_>>()
            .join("\n");

        let mut notice = Self::new(
            "✅ Roles Shuffled Successfully!",
            format!(
                "Successfully shuffled **{}** role assignments!",
                outcome.successful_assignments()
            ),
            Tone::Success,
        )
        .field("New role distribution:", distribution);

        if !outcome.failed_additions.is_empty() {
            let mut failed = outcome
                .failed_additions
                .iter()
                .take(FAILURES_SHOWN)
                .map(|f| format!("• <@{}> → {}", f.user_id, f.role_name))
                .collect::<Vec<_>>()
                .join("\n");
            if outcome.failed_additions.len() > FAILURES_SHOWN {
                failed.push_str(&format!(
                    "\n• ... and {} more",
                    outcome.failed_additions.len() - FAILURES_SHOWN
                ));
            }
            notice = notice.field("⚠️ Some assignments failed:", failed);
        }

        notice
            .field(
                "Cooldown:",
                format!("Next shuffle available in {}", cooldown.describe()),
            )
            .footer(format!("Shuffle performed by {}", performed_by))
    }

    /// A shuffle aborted part way.
    pub fn shuffle_failed() -> Self {
        Self::new(
            "❌ Shuffle Failed",
            "An error occurred while shuffling roles. \
             Some role changes may have been partially completed.",
            Tone::Danger,
        )
    }

    /// Unexpected failure, usually the database.
    pub fn generic_error() -> Self {
        Self::new(
            "❌ Something Went Wrong",
            "An error occurred while processing your request. Please try again.",
            Tone::Danger,
        )
    }

    /// Recent shuffles for a guild.
    pub fn history(records: &[ShuffleRecord]) -> Self {
        if records.is_empty() {
            return Self::new(
                "📜 Shuffle History",
                "No shuffles have been performed in this server yet.",
                Tone::Info,
            );
        }

        let mut notice = Self::new(
            "📜 Shuffle History",
            format!("The last **{}** shuffles:", records.len()),
            Tone::Info,
        );
        for record in records {
            notice = notice.field(
                format!(
                    "{} by <@{}>",
                    discord_relative_timestamp(record.created_at),
                    record.triggered_by
                ),
                format!(
                    "{} users across {}",
                    record.users_affected,
                    record.roles_shuffled.join(", ")
                ),
            );
        }
        notice
    }
}
