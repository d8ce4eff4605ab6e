//! Slash command definitions.

use serenity::all::{CommandOptionType, CreateCommand, CreateCommandOption};
use shuffler_core::ShuffleSettings;
use strum::IntoEnumIterator;

/// Every slash command the bot registers.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
pub enum ShufflerCommand {
    /// `/shuffle`
    #[strum(serialize = "shuffle")]
    Shuffle,
    /// `/config-roles`
    #[strum(serialize = "config-roles")]
    ConfigRoles,
    /// `/shuffle-history`
    #[strum(serialize = "shuffle-history")]
    ShuffleHistory,
}

impl ShufflerCommand {
    /// Registration payload for this command.
    pub fn definition(self) -> CreateCommand {
        let command = CreateCommand::new(self.as_ref()).dm_permission(false);
        match self {
            Self::Shuffle => {
                command.description("Randomly shuffle users between configured roles")
            }
            Self::ConfigRoles => command
                .description("Manage shuffleable roles for this server")
                .add_option(
                    CreateCommandOption::new(
                        CommandOptionType::String,
                        "action",
                        "Choose what to do with shuffleable roles",
                    )
                    .required(true)
                    .add_string_choice("add", "add")
                    .add_string_choice("remove", "remove")
                    .add_string_choice("list", "list"),
                )
                .add_option(
                    CreateCommandOption::new(
                        CommandOptionType::Role,
                        "role",
                        "The role to add or remove (not needed for 'list')",
                    )
                    .required(false),
                ),
            Self::ShuffleHistory => command
                .description("Show recent role shuffles in this server")
                .add_option(
                    CreateCommandOption::new(
                        CommandOptionType::Integer,
                        "limit",
                        "How many shuffles to show",
                    )
                    .required(false)
                    .min_int_value(1)
                    .max_int_value(u64::from(ShuffleSettings::MAX_HISTORY_LIMIT)),
                ),
        }
    }
}

/// Create all slash commands for registration.
pub fn create_commands() -> Vec<CreateCommand> {
    ShufflerCommand::iter()
        .map(ShufflerCommand::definition)
        .collect()
}
