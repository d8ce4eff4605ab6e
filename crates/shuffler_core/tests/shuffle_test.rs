//! Tests for building and applying shuffle plans.

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use shuffler_core::{RoleEditor, RoleSnapshot, ShufflePlan, ShufflerResult, apply_plan};
use shuffler_error::PlatformError;
use std::collections::{BTreeSet, HashSet};
use std::sync::Mutex;

fn roles() -> Vec<RoleSnapshot> {
    vec![
        RoleSnapshot::new(100, "Red", 3).with_members(1..=5),
        RoleSnapshot::new(200, "Blue", 2).with_members(6..=8),
        RoleSnapshot::new(300, "Green", 1).with_members([9, 10]),
    ]
}

#[test]
fn test_plan_preserves_every_member() {
    let mut rng = StdRng::seed_from_u64(7);
    let plan = ShufflePlan::build(&roles(), &mut rng);

    let dealt: BTreeSet<u64> = plan
        .assignments()
        .iter()
        .flat_map(|a| a.members.iter().copied())
        .collect();
    assert_eq!(dealt, (1..=10).collect::<BTreeSet<u64>>());
    assert_eq!(plan.member_count(), 10);
}

#[test]
fn test_plan_uses_even_buckets_in_role_order() {
    let mut rng = StdRng::seed_from_u64(42);
    let plan = ShufflePlan::build(&roles(), &mut rng);

    let sizes: Vec<usize> = plan.assignments().iter().map(|a| a.members.len()).collect();
    assert_eq!(sizes, vec![4, 3, 3]);
    assert_eq!(plan.role_names(), vec!["Red", "Blue", "Green"]);
}

#[test]
fn test_plan_is_deterministic_for_a_seed() {
    let a = ShufflePlan::build(&roles(), &mut StdRng::seed_from_u64(99));
    let b = ShufflePlan::build(&roles(), &mut StdRng::seed_from_u64(99));
    assert_eq!(a, b);
}

#[test]
fn test_member_in_two_roles_is_counted_once() {
    let roles = vec![
        RoleSnapshot::new(100, "Red", 2).with_members([1, 2]),
        RoleSnapshot::new(200, "Blue", 1).with_members([2, 3]),
    ];
    let plan = ShufflePlan::build(&roles, &mut StdRng::seed_from_u64(1));

    assert_eq!(plan.member_count(), 3);
    let change = plan
        .changes()
        .iter()
        .find(|c| c.user_id == 2)
        .expect("member 2 has a change");
    let assigned = plan
        .assignments()
        .iter()
        .find(|a| a.members.contains(&2))
        .expect("member 2 is assigned")
        .role_id;

    // Member 2 already holds both roles: keep the assigned one, drop the other.
    assert_eq!(change.add, None);
    assert_eq!(change.remove.len(), 1);
    assert_ne!(change.remove[0], assigned);
}

#[test]
fn test_changes_only_touch_shuffled_roles() {
    let roles = roles();
    let shuffled: HashSet<u64> = roles.iter().map(|r| r.id).collect();
    let plan = ShufflePlan::build(&roles, &mut StdRng::seed_from_u64(3));

    for change in plan.changes() {
        assert!(change.remove.iter().all(|id| shuffled.contains(id)));
        if let Some(id) = change.add {
            assert!(shuffled.contains(&id));
            assert!(!change.remove.contains(&id));
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Add(u64, u64),
    Remove(u64, u64),
}

/// Records every edit and fails additions for one member.
#[derive(Default)]
struct RecordingEditor {
    calls: Mutex<Vec<Call>>,
    reject_user: Option<u64>,
}

impl RecordingEditor {
    fn rejecting(user_id: u64) -> Self {
        Self {
            reject_user: Some(user_id),
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RoleEditor for RecordingEditor {
    async fn add_role(&self, user_id: u64, role_id: u64) -> ShufflerResult<()> {
        self.calls.lock().unwrap().push(Call::Add(user_id, role_id));
        if self.reject_user == Some(user_id) {
            return Err(PlatformError::new("Missing Access").into());
        }
        Ok(())
    }

    async fn remove_role(&self, user_id: u64, role_id: u64) -> ShufflerResult<()> {
        self.calls.lock().unwrap().push(Call::Remove(user_id, role_id));
        Ok(())
    }
}

#[tokio::test]
async fn test_apply_removes_before_adding() {
    let plan = ShufflePlan::build(&roles(), &mut StdRng::seed_from_u64(11));
    let editor = RecordingEditor::default();

    let outcome = apply_plan(&editor, &plan).await;
    let calls = editor.calls();

    let last_remove = calls.iter().rposition(|c| matches!(c, Call::Remove(..)));
    let first_add = calls.iter().position(|c| matches!(c, Call::Add(..)));
    if let (Some(last_remove), Some(first_add)) = (last_remove, first_add) {
        assert!(last_remove < first_add);
    }

    assert_eq!(outcome.successful_assignments(), 10);
    assert_eq!(outcome.added + outcome.unchanged, 10);
    assert_eq!(outcome.removed, calls.iter().filter(|c| matches!(c, Call::Remove(..))).count());
    assert!(outcome.failed_additions.is_empty());
}

#[tokio::test]
async fn test_apply_collects_failures_and_continues() {
    // Single-member roles force member 1 to move.
    let roles = vec![
        RoleSnapshot::new(100, "Red", 2).with_members([1]),
        RoleSnapshot::new(200, "Blue", 1).with_members([2]),
    ];
    let plan = (0..64)
        .map(|seed| ShufflePlan::build(&roles, &mut StdRng::seed_from_u64(seed)))
        .find(|plan| plan.changes().iter().any(|c| c.user_id == 1 && c.add.is_some()))
        .expect("some seed moves member 1");

    let editor = RecordingEditor::rejecting(1);
    let outcome = apply_plan(&editor, &plan).await;

    assert_eq!(outcome.failed_additions.len(), 1);
    let failed = &outcome.failed_additions[0];
    assert_eq!(failed.user_id, 1);
    assert_eq!(failed.role_name, "Blue");
    assert!(failed.reason.contains("Missing Access"));
    assert_eq!(outcome.added, 1);
    assert_eq!(outcome.successful_assignments(), 1);
}
