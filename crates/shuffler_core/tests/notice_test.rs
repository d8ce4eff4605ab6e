//! Tests for reply rendering.

use chrono::{TimeZone, Utc};
use shuffler_core::{
    CooldownPolicy, FailedChange, ListedRole, Notice, RoleSnapshot, ShuffleOutcome, ShufflePlan,
    ShufflerError, Tone,
};
use shuffler_error::{GuardError, GuardErrorKind, PlatformError};

#[test]
fn test_empty_role_list_explains_how_to_add() {
    let notice = Notice::role_list(&[]);
    assert_eq!(notice.fields.len(), 1);
    assert_eq!(notice.fields[0].name, "How to add roles:");
}

#[test]
fn test_long_role_list_is_chunked() {
    let roles: Vec<ListedRole> = (0..25)
        .map(|i| ListedRole::Present {
            name: format!("A rather long role name number {}", i),
            member_count: i,
        })
        .collect();
    let notice = Notice::role_list(&roles);

    let names: Vec<&str> = notice.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Roles:", "Roles (continued 2):", "Roles (continued 3):", "Usage:"]
    );
    assert_eq!(notice.fields[2].value.lines().count(), 5);
}

#[test]
fn test_short_role_list_is_one_field() {
    let roles = vec![
        ListedRole::Present {
            name: "Red".to_string(),
            member_count: 2,
        },
        ListedRole::Deleted {
            name: "Old".to_string(),
        },
    ];
    let notice = Notice::role_list(&roles);
    assert_eq!(notice.fields[0].value, "• **Red** (2 members)\n• ~~Old~~ (deleted)");
    assert_eq!(notice.description, "There are **2** roles configured for shuffling:");
}

#[test]
fn test_cooldown_notice_uses_relative_timestamp() {
    let expires_at = Utc.timestamp_opt(1_700_000_300, 0).unwrap();
    let err = GuardError::new(GuardErrorKind::CooldownActive { expires_at });
    let notice = Notice::from_guard(&err, 1);

    assert_eq!(notice.tone, Tone::Caution);
    assert_eq!(notice.fields[0].value, "<t:1700000300:R>");
}

#[test]
fn test_permission_notice_mentions_member() {
    let err: ShufflerError = GuardError::new(GuardErrorKind::MissingPermission {
        required: "Manage Roles or Administrator".to_string(),
    })
    .into();
    let notice = Notice::from_error(&err, 77);
    assert!(notice.description.starts_with("<@77>, you need **Manage Roles or Administrator**"));
}

#[test]
fn test_non_guard_error_is_generic() {
    let err: ShufflerError = PlatformError::new("gateway closed").into();
    assert_eq!(Notice::from_error(&err, 1), Notice::generic_error());
}

#[test]
fn test_success_notice_truncates_failures() {
    let roles = vec![
        RoleSnapshot::new(1, "Red", 2).with_members([1, 2, 3, 4]),
        RoleSnapshot::new(2, "Blue", 1).with_members([5, 6, 7]),
    ];
    let plan = ShufflePlan::build(&roles, &mut rand::rng());
    let failed_additions = (1..=7)
        .map(|user_id| FailedChange {
            user_id,
            role_id: 1,
            role_name: "Red".to_string(),
            reason: "Missing Access".to_string(),
        })
        .collect();
    let outcome = ShuffleOutcome {
        failed_additions,
        ..Default::default()
    };

    let notice =
        Notice::shuffle_complete(&plan, &outcome, &CooldownPolicy::default(), "Sam");

    let failed = notice
        .fields
        .iter()
        .find(|f| f.name == "⚠️ Some assignments failed:")
        .expect("failure field");
    assert_eq!(failed.value.lines().count(), 6);
    assert!(failed.value.ends_with("• ... and 2 more"));

    let cooldown = notice.fields.iter().find(|f| f.name == "Cooldown:").unwrap();
    assert_eq!(cooldown.value, "Next shuffle available in 5 minutes");
    assert_eq!(notice.footer.as_deref(), Some("Shuffle performed by Sam"));
    assert_eq!(notice.fields[0].value, "• **Red**: 4 members\n• **Blue**: 3 members");
}

#[test]
fn test_confirm_prompt_lists_roles() {
    let roles = vec![
        RoleSnapshot::new(1, "Red", 2).with_members([1, 2]),
        RoleSnapshot::new(2, "Blue", 1).with_members([3]),
    ];
    let notice = Notice::confirm_shuffle(&roles, 3, "5 minutes");
    assert_eq!(
        notice.description,
        "Are you sure you want to shuffle roles for **3** users?"
    );
    assert_eq!(notice.fields[0].value, "• **Red** (2 members)\n• **Blue** (1 members)");
    assert_eq!(
        notice.footer.as_deref(),
        Some("This action cannot be undone. You have 5 minutes to confirm.")
    );
}
