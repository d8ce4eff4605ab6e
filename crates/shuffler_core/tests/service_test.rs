//! Tests for the command guard sequences.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use shuffler_core::{
    BotStanding, ConfigAction, CooldownPolicy, InMemoryShuffleStore, MemberAuthority,
    RoleSnapshot, ShufflePlan, ShuffleService, ShuffleSettingsBuilder, ShuffleStore,
};
use shuffler_error::GuardErrorKind;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

const GUILD: u64 = 1000;

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

fn manager() -> MemberAuthority {
    MemberAuthority {
        user_id: 42,
        manage_roles: true,
        ..Default::default()
    }
}

fn bot() -> BotStanding {
    BotStanding {
        administrator: false,
        manage_roles: true,
        top_position: 10,
    }
}

fn guild_roles() -> HashMap<u64, RoleSnapshot> {
    [
        RoleSnapshot::new(1, "Red", 3).with_members([11, 12, 13]),
        RoleSnapshot::new(2, "Blue", 2).with_members([14, 15]),
        RoleSnapshot::new(3, "Empty", 1),
        RoleSnapshot::new(4, "Staff", 20).with_members([16]),
    ]
    .into_iter()
    .map(|role| (role.id, role))
    .collect()
}

fn service() -> (ShuffleService, Arc<InMemoryShuffleStore>) {
    let store = Arc::new(InMemoryShuffleStore::new());
    let settings = ShuffleSettingsBuilder::default()
        .cooldown(CooldownPolicy::from_secs(300).unwrap())
        .build()
        .expect("Valid settings");
    (ShuffleService::new(store.clone(), settings), store)
}

fn guard_kind(err: &shuffler_core::ShufflerError) -> GuardErrorKind {
    err.as_guard().expect("guard error").kind().clone()
}

#[test]
fn test_config_action_parses_lowercase() {
    assert_eq!(ConfigAction::from_str("add").unwrap(), ConfigAction::Add);
    assert_eq!(ConfigAction::from_str("list").unwrap(), ConfigAction::List);
    assert!(ConfigAction::from_str("shuffle").is_err());
    assert_eq!(ConfigAction::Remove.to_string(), "remove");
}

#[tokio::test]
async fn test_add_requires_permission() {
    let (service, _) = service();
    let roles = guild_roles();
    let member = MemberAuthority {
        user_id: 42,
        ..Default::default()
    };

    let err = service
        .add_role(GUILD, &member, roles.get(&1), &bot())
        .await
        .unwrap_err();
    assert!(matches!(guard_kind(&err), GuardErrorKind::MissingPermission { .. }));
}

#[tokio::test]
async fn test_add_requires_role_argument() {
    let (service, _) = service();
    let err = service
        .add_role(GUILD, &manager(), None, &bot())
        .await
        .unwrap_err();
    assert_eq!(
        guard_kind(&err),
        GuardErrorKind::MissingRoleArgument {
            action: "add".to_string()
        }
    );
}

#[tokio::test]
async fn test_add_refuses_role_above_bot() {
    let (service, store) = service();
    let roles = guild_roles();

    let err = service
        .add_role(GUILD, &manager(), roles.get(&4), &bot())
        .await
        .unwrap_err();
    assert_eq!(
        guard_kind(&err),
        GuardErrorKind::UnmanageableRole {
            role_name: "Staff".to_string()
        }
    );
    assert!(store.list_roles(GUILD).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_add_then_add_again() {
    let (service, _) = service();
    let roles = guild_roles();

    let first = service
        .add_role(GUILD, &manager(), roles.get(&1), &bot())
        .await
        .unwrap();
    let second = service
        .add_role(GUILD, &manager(), roles.get(&1), &bot())
        .await
        .unwrap();

    assert_eq!(first.title, "✅ Role Added");
    assert_eq!(second.title, "⚠️ Role Already Added");
}

#[tokio::test]
async fn test_remove_reports_missing_role() {
    let (service, _) = service();
    let roles = guild_roles();

    let notice = service
        .remove_role(GUILD, &manager(), roles.get(&1))
        .await
        .unwrap();
    assert_eq!(notice.title, "⚠️ Role Not Found");

    service
        .add_role(GUILD, &manager(), roles.get(&1), &bot())
        .await
        .unwrap();
    let notice = service
        .configure(GUILD, &manager(), ConfigAction::Remove, roles.get(&1), &bot(), &roles)
        .await
        .unwrap();
    assert_eq!(notice.title, "✅ Role Removed");
}

#[tokio::test]
async fn test_list_strikes_deleted_roles() {
    let (service, store) = service();
    store.add_role(GUILD, 1, "Red", 42).await.unwrap();
    store.add_role(GUILD, 77, "Gone", 42).await.unwrap();

    let notice = service
        .configure(GUILD, &manager(), ConfigAction::List, None, &bot(), &guild_roles())
        .await
        .unwrap();

    let roles_field = &notice.fields[0];
    assert_eq!(roles_field.name, "Roles:");
    assert!(roles_field.value.contains("~~Gone~~ (deleted)"));
    assert!(roles_field.value.contains("**Red** (3 members)"));
}

#[tokio::test]
async fn test_prepare_without_configuration() {
    let (service, _) = service();
    let err = service
        .prepare_shuffle(GUILD, &manager(), &guild_roles(), &bot(), at(0))
        .await
        .unwrap_err();
    assert_eq!(guard_kind(&err), GuardErrorKind::NoConfiguredRoles);
}

#[tokio::test]
async fn test_prepare_needs_two_populated_roles() {
    let (service, store) = service();
    store.add_role(GUILD, 1, "Red", 42).await.unwrap();
    store.add_role(GUILD, 3, "Empty", 42).await.unwrap();
    store.add_role(GUILD, 4, "Staff", 42).await.unwrap();

    let err = service
        .prepare_shuffle(GUILD, &manager(), &guild_roles(), &bot(), at(0))
        .await
        .unwrap_err();
    assert_eq!(guard_kind(&err), GuardErrorKind::NotEnoughRoles { found: 1 });
}

#[tokio::test]
async fn test_prepare_with_only_unusable_roles() {
    let (service, store) = service();
    store.add_role(GUILD, 3, "Empty", 42).await.unwrap();
    store.add_role(GUILD, 4, "Staff", 42).await.unwrap();

    let err = service
        .prepare_shuffle(GUILD, &manager(), &guild_roles(), &bot(), at(0))
        .await
        .unwrap_err();
    assert_eq!(guard_kind(&err), GuardErrorKind::NoEligibleRoles);
}

#[tokio::test]
async fn test_shuffle_then_cooldown() {
    let (service, store) = service();
    store.add_role(GUILD, 1, "Red", 42).await.unwrap();
    store.add_role(GUILD, 2, "Blue", 42).await.unwrap();
    let roles = guild_roles();

    let selected = service
        .prepare_shuffle(GUILD, &manager(), &roles, &bot(), at(0))
        .await
        .unwrap();
    let names: Vec<&str> = selected.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Blue", "Red"]);

    let plan = ShufflePlan::build(&selected, &mut StdRng::seed_from_u64(5));
    service
        .record_shuffle(GUILD, manager().user_id, &plan, at(0))
        .await
        .unwrap();

    let err = service
        .prepare_shuffle(GUILD, &manager(), &roles, &bot(), at(120))
        .await
        .unwrap_err();
    assert_eq!(
        guard_kind(&err),
        GuardErrorKind::CooldownActive {
            expires_at: at(0) + TimeDelta::seconds(300)
        }
    );

    assert!(
        service
            .prepare_shuffle(GUILD, &manager(), &roles, &bot(), at(300))
            .await
            .is_ok()
    );

    let history = store.recent_shuffles(GUILD, 10).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].users_affected, 5);
    assert_eq!(history[0].triggered_by, 42);
}

#[tokio::test]
async fn test_permission_checked_before_cooldown() {
    let (service, store) = service();
    store.set_cooldown(GUILD, 42, at(0)).await.unwrap();
    let member = MemberAuthority {
        user_id: 9,
        ..Default::default()
    };

    let err = service
        .prepare_shuffle(GUILD, &member, &guild_roles(), &bot(), at(1))
        .await
        .unwrap_err();
    assert!(matches!(guard_kind(&err), GuardErrorKind::MissingPermission { .. }));
}

#[tokio::test]
async fn test_history_notice() {
    let (service, _) = service();
    let empty = service.history(GUILD, &manager(), None).await.unwrap();
    assert!(empty.fields.is_empty());

    let roles = guild_roles();
    let selected = vec![roles[&1].clone(), roles[&2].clone()];
    let plan = ShufflePlan::build(&selected, &mut StdRng::seed_from_u64(1));
    service.record_shuffle(GUILD, 42, &plan, at(0)).await.unwrap();

    let notice = service.history(GUILD, &manager(), Some(50)).await.unwrap();
    assert_eq!(notice.fields.len(), 1);
    assert!(notice.fields[0].name.contains("<@42>"));
    assert_eq!(notice.fields[0].value, "5 users across Red, Blue");
}

#[tokio::test]
async fn test_preflight_returns_configuration() {
    let (service, store) = service();
    store.add_role(GUILD, 1, "Red", 42).await.unwrap();

    let configured = service
        .shuffle_preflight(GUILD, &manager(), at(0))
        .await
        .unwrap();
    assert_eq!(configured.len(), 1);
    assert_eq!(configured[0].role_id, 1);
}

#[tokio::test]
async fn test_guild_lifecycle() {
    let (service, store) = service();
    service.register_guild(GUILD, "Guild").await.unwrap();
    store.add_role(GUILD, 1, "Red", 42).await.unwrap();
    store.add_role(GUILD, 2, "Blue", 42).await.unwrap();

    service.role_deleted(GUILD, 1).await.unwrap();
    assert_eq!(store.list_roles(GUILD).await.unwrap().len(), 1);

    service.forget_guild(GUILD).await.unwrap();
    assert_eq!(store.server_name(GUILD).await, None);
    assert!(store.list_roles(GUILD).await.unwrap().is_empty());
}
