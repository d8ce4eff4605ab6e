//! Tests for the in-memory store.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use shuffler_core::{InMemoryShuffleStore, RoleAddOutcome, ShuffleRecord, ShuffleStore};

const GUILD: u64 = 10;
const OTHER_GUILD: u64 = 20;

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

fn record(guild_id: u64, secs: i64) -> ShuffleRecord {
    ShuffleRecord {
        guild_id,
        triggered_by: 5,
        users_affected: 3,
        roles_shuffled: vec!["Red".to_string(), "Blue".to_string()],
        created_at: at(secs),
    }
}

#[tokio::test]
async fn test_upsert_server_refreshes_name() {
    let store = InMemoryShuffleStore::new();
    store.upsert_server(GUILD, "Old").await.unwrap();
    store.upsert_server(GUILD, "New").await.unwrap();
    assert_eq!(store.server_name(GUILD).await.as_deref(), Some("New"));
}

#[tokio::test]
async fn test_add_role_is_idempotent() {
    let store = InMemoryShuffleStore::new();
    let first = store.add_role(GUILD, 1, "Red", 5).await.unwrap();
    let second = store.add_role(GUILD, 1, "Red", 5).await.unwrap();

    assert_eq!(first, RoleAddOutcome::Added);
    assert_eq!(second, RoleAddOutcome::AlreadyConfigured);
    assert_eq!(store.list_roles(GUILD).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_removed_role_can_be_added_again() {
    let store = InMemoryShuffleStore::new();
    store.add_role(GUILD, 1, "Red", 5).await.unwrap();

    assert!(store.remove_role(GUILD, 1).await.unwrap());
    assert!(!store.remove_role(GUILD, 1).await.unwrap());
    assert!(store.list_roles(GUILD).await.unwrap().is_empty());

    let outcome = store.add_role(GUILD, 1, "Crimson", 6).await.unwrap();
    assert_eq!(outcome, RoleAddOutcome::Added);
    let roles = store.list_roles(GUILD).await.unwrap();
    assert_eq!(roles[0].role_name, "Crimson");
    assert_eq!(roles[0].added_by, 6);
}

#[tokio::test]
async fn test_roles_are_scoped_and_sorted() {
    let store = InMemoryShuffleStore::new();
    store.add_role(GUILD, 2, "Red", 5).await.unwrap();
    store.add_role(GUILD, 1, "Blue", 5).await.unwrap();
    store.add_role(OTHER_GUILD, 3, "Green", 5).await.unwrap();

    let names: Vec<String> = store
        .list_roles(GUILD)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.role_name)
        .collect();
    assert_eq!(names, vec!["Blue", "Red"]);
}

#[tokio::test]
async fn test_disable_role_hides_it() {
    let store = InMemoryShuffleStore::new();
    store.add_role(GUILD, 1, "Red", 5).await.unwrap();
    store.disable_role(GUILD, 1).await.unwrap();
    store.disable_role(GUILD, 99).await.unwrap();
    assert!(store.list_roles(GUILD).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cooldown_is_overwritten() {
    let store = InMemoryShuffleStore::new();
    assert_eq!(store.last_shuffle(GUILD).await.unwrap(), None);

    store.set_cooldown(GUILD, 5, at(0)).await.unwrap();
    store.set_cooldown(GUILD, 6, at(600)).await.unwrap();
    assert_eq!(store.last_shuffle(GUILD).await.unwrap(), Some(at(600)));
    assert_eq!(store.last_shuffle(OTHER_GUILD).await.unwrap(), None);
}

#[tokio::test]
async fn test_recent_shuffles_newest_first_with_limit() {
    let store = InMemoryShuffleStore::new();
    for secs in [0, 300, 600] {
        store.log_shuffle(&record(GUILD, secs)).await.unwrap();
    }
    store.log_shuffle(&record(OTHER_GUILD, 900)).await.unwrap();

    let recent = store.recent_shuffles(GUILD, 2).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].created_at, at(600));
    assert_eq!(recent[1].created_at, at(600) - TimeDelta::seconds(300));
}

#[tokio::test]
async fn test_remove_server_cascades() {
    let store = InMemoryShuffleStore::new();
    store.upsert_server(GUILD, "Guild").await.unwrap();
    store.add_role(GUILD, 1, "Red", 5).await.unwrap();
    store.set_cooldown(GUILD, 5, at(0)).await.unwrap();
    store.log_shuffle(&record(GUILD, 0)).await.unwrap();
    store.log_shuffle(&record(OTHER_GUILD, 0)).await.unwrap();

    store.remove_server(GUILD).await.unwrap();

    assert_eq!(store.server_name(GUILD).await, None);
    assert!(store.list_roles(GUILD).await.unwrap().is_empty());
    assert_eq!(store.last_shuffle(GUILD).await.unwrap(), None);
    assert_eq!(store.history_len().await, 1);
}
