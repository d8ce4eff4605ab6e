//! Tests for slash command registration payloads.

use serde_json::Value;
use shuffler_discord::{ShufflerCommand, create_commands};
use std::str::FromStr;

fn payload(command: ShufflerCommand) -> Value {
    serde_json::to_value(command.definition()).expect("command serializes")
}

fn option<'a>(command: &'a Value, name: &str) -> &'a Value {
    command["options"]
        .as_array()
        .expect("options array")
        .iter()
        .find(|opt| opt["name"] == name)
        .unwrap_or_else(|| panic!("missing option {name}"))
}

#[test]
fn test_registers_every_command() {
    let names: Vec<String> = create_commands()
        .into_iter()
        .map(|command| {
            serde_json::to_value(command).expect("command serializes")["name"]
                .as_str()
                .expect("name")
                .to_string()
        })
        .collect();

    assert_eq!(names, vec!["shuffle", "config-roles", "shuffle-history"]);
}

#[test]
fn test_command_names_round_trip_through_strum() {
    assert_eq!(
        ShufflerCommand::from_str("config-roles").ok(),
        Some(ShufflerCommand::ConfigRoles)
    );
    assert_eq!(ShufflerCommand::Shuffle.to_string(), "shuffle");
    assert!(ShufflerCommand::from_str("reroll").is_err());
}

#[test]
fn test_shuffle_takes_no_options() {
    let shuffle = payload(ShufflerCommand::Shuffle);
    let empty = shuffle["options"]
        .as_array()
        .map(|options| options.is_empty())
        .unwrap_or(true);
    assert!(empty);
}

#[test]
fn test_config_roles_options() {
    let config = payload(ShufflerCommand::ConfigRoles);

    let action = option(&config, "action");
    assert_eq!(action["type"], 3);
    assert_eq!(action["required"], true);
    let choices: Vec<&str> = action["choices"]
        .as_array()
        .expect("choices")
        .iter()
        .map(|choice| choice["value"].as_str().expect("choice value"))
        .collect();
    assert_eq!(choices, vec!["add", "remove", "list"]);

    let role = option(&config, "role");
    assert_eq!(role["type"], 8);
}

#[test]
fn test_history_limit_option_is_integer() {
    let history = payload(ShufflerCommand::ShuffleHistory);
    let limit = option(&history, "limit");
    assert_eq!(limit["type"], 4);
    assert_eq!(limit["max_value"], 25);
}
