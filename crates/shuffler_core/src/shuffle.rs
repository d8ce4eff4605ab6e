//! Random redistribution of members across roles.
//!
//! A shuffle pools every member of the chosen roles, applies a uniform random
//! permutation, and deals the pool back out in list order: each role gets
//! `N / R` members and the first `N % R` roles get one extra.

use crate::RoleSnapshot;
use async_trait::async_trait;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;
use shuffler_error::ShufflerResult;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument, warn};

/// Members dealt to one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleAssignment {
    /// Role snowflake
    pub role_id: u64,
    /// Role display name
    pub role_name: String,
    /// Members that end up holding the role
    pub members: Vec<u64>,
}

/// Role edits needed for one member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberChange {
    /// Member snowflake
    pub user_id: u64,
    /// Shuffled roles the member holds but should lose
    pub remove: Vec<u64>,
    /// New role, when the member does not already hold it
    pub add: Option<u64>,
}

/// The complete outcome of a shuffle before any API call is made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShufflePlan {
    assignments: Vec<RoleAssignment>,
    changes: Vec<MemberChange>,
}

impl ShufflePlan {
    /// Deal the members of `roles` back out at random.
    ///
    /// Members holding several of the roles are counted once. Roles keep the
    /// order given; earlier roles absorb the remainder.
    pub fn build<R: Rng + ?Sized>(roles: &[RoleSnapshot], rng: &mut R) -> Self {
        let mut seen = HashSet::new();
        let mut pool: Vec<u64> = Vec::new();
        let mut held: HashMap<u64, Vec<u64>> = HashMap::new();

        for role in roles {
            for &user_id in &role.members {
                if seen.insert(user_id) {
                    pool.push(user_id);
                }
                held.entry(user_id).or_default().push(role.id);
            }
        }

        pool.shuffle(rng);

        let assignments = Self::deal(roles, &pool);

        let mut changes = Vec::with_capacity(pool.len());
        for assignment in &assignments {
            for &user_id in &assignment.members {
                let current = held.get(&user_id).map(Vec::as_slice).unwrap_or_default();
                let remove = current
                    .iter()
                    .copied()
                    .filter(|role_id| *role_id != assignment.role_id)
                    .collect();
                let add = (!current.contains(&assignment.role_id)).then_some(assignment.role_id);
                changes.push(MemberChange {
                    user_id,
                    remove,
                    add,
                });
            }
        }

        debug!(
            members = pool.len(),
            roles = roles.len(),
            "Built shuffle plan"
        );

        Self {
            assignments,
            changes,
        }
    }

    /// Bucket sizes for `total` members over `buckets` roles.
    pub fn bucket_sizes(total: usize, buckets: usize) -> Vec<usize> {
        if buckets == 0 {
            return Vec::new();
        }
        let base = total / buckets;
        let extra = total % buckets;
        (0..buckets)
            .map(|index| base + usize::from(index < extra))
            .collect()
    }

    fn deal(roles: &[RoleSnapshot], pool: &[u64]) -> Vec<RoleAssignment> {
        let mut offset = 0;
        roles
            .iter()
            .zip(Self::bucket_sizes(pool.len(), roles.len()))
            .map(|(role, size)| {
                let members = pool[offset..offset + size].to_vec();
                offset += size;
                RoleAssignment {
                    role_id: role.id,
                    role_name: role.name.clone(),
                    members,
                }
            })
            .collect()
    }

    /// Per-role result of the deal.
    pub fn assignments(&self) -> &[RoleAssignment] {
        &self.assignments
    }

    /// Per-member edits needed to reach the deal.
    pub fn changes(&self) -> &[MemberChange] {
        &self.changes
    }

    /// Number of distinct members redistributed.
    pub fn member_count(&self) -> usize {
        self.assignments.iter().map(|a| a.members.len()).sum()
    }

    /// Role names in deal order.
    pub fn role_names(&self) -> Vec<String> {
        self.assignments
            .iter()
            .map(|a| a.role_name.clone())
            .collect()
    }

    fn role_name(&self, role_id: u64) -> String {
        self.assignments
            .iter()
            .find(|a| a.role_id == role_id)
            .map(|a| a.role_name.clone())
            .unwrap_or_else(|| role_id.to_string())
    }
}

/// Adds and removes roles on the chat platform.
#[async_trait]
pub trait RoleEditor: Send + Sync {
    /// Give `role_id` to `user_id`.
    async fn add_role(&self, user_id: u64, role_id: u64) -> ShufflerResult<()>;

    /// Take `role_id` away from `user_id`.
    async fn remove_role(&self, user_id: u64, role_id: u64) -> ShufflerResult<()>;
}

/// A single role edit the platform rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedChange {
    /// Member snowflake
    pub user_id: u64,
    /// Role snowflake
    pub role_id: u64,
    /// Role display name
    pub role_name: String,
    /// Platform error text
    pub reason: String,
}

/// What actually happened when a plan was applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShuffleOutcome {
    /// Roles successfully removed
    pub removed: usize,
    /// Roles successfully added
    pub added: usize,
    /// Members who already held their new role
    pub unchanged: usize,
    /// Removals the platform rejected
    pub failed_removals: Vec<FailedChange>,
    /// Additions the platform rejected
    pub failed_additions: Vec<FailedChange>,
}

impl ShuffleOutcome {
    /// Members whose final role is what the plan says.
    pub fn successful_assignments(&self) -> usize {
        self.added + self.unchanged
    }
}

/// Apply a plan: every removal first, then every addition.
///
/// Failures are logged and collected; nothing is retried.
#[instrument(skip(editor, plan), fields(members = plan.member_count()))]
pub async fn apply_plan<E: RoleEditor + ?Sized>(editor: &E, plan: &ShufflePlan) -> ShuffleOutcome {
    let mut outcome = ShuffleOutcome::default();

    for change in plan.changes() {
        for &role_id in &change.remove {
            match editor.remove_role(change.user_id, role_id).await {
                Ok(()) => outcome.removed += 1,
                Err(e) => {
                    warn!(user_id = change.user_id, role_id, error = %e, "Failed to remove role");
                    outcome.failed_removals.push(FailedChange {
                        user_id: change.user_id,
                        role_id,
                        role_name: plan.role_name(role_id),
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    for change in plan.changes() {
        let Some(role_id) = change.add else {
            outcome.unchanged += 1;
            continue;
        };
        match editor.add_role(change.user_id, role_id).await {
            Ok(()) => outcome.added += 1,
            Err(e) => {
                warn!(user_id = change.user_id, role_id, error = %e, "Failed to add role");
                outcome.failed_additions.push(FailedChange {
                    user_id: change.user_id,
                    role_id,
                    role_name: plan.role_name(role_id),
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        added = outcome.added,
        removed = outcome.removed,
        unchanged = outcome.unchanged,
        failed = outcome.failed_additions.len() + outcome.failed_removals.len(),
        "Shuffle applied"
    );

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_sizes_put_remainder_first() {
        assert_eq!(ShufflePlan::bucket_sizes(7, 3), vec![3, 2, 2]);
        assert_eq!(ShufflePlan::bucket_sizes(6, 3), vec![2, 2, 2]);
        assert_eq!(ShufflePlan::bucket_sizes(1, 3), vec![1, 0, 0]);
        assert!(ShufflePlan::bucket_sizes(5, 0).is_empty());
    }
}
