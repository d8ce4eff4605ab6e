//! Choosing which configured roles take part in a shuffle.

use crate::{BotStanding, RoleSnapshot, ShuffleableRole, can_bot_manage_role};
use shuffler_error::{GuardError, GuardErrorKind, GuardResult};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Resolve configured roles against live guild roles.
///
/// Drops roles that were deleted, that the bot cannot manage, or that have no
/// members. At least two must survive.
#[instrument(skip_all, fields(guild_id = guild_id, configured = configured.len()))]
pub fn select_roles(
    guild_id: u64,
    configured: &[ShuffleableRole],
    guild_roles: &HashMap<u64, RoleSnapshot>,
    bot: &BotStanding,
) -> GuardResult<Vec<RoleSnapshot>> {
    if configured.is_empty() {
        return Err(GuardError::new(GuardErrorKind::NoConfiguredRoles));
    }

    let selected: Vec<RoleSnapshot> = configured
        .iter()
        .filter_map(|entry| {
            let Some(role) = guild_roles.get(&entry.role_id) else {
                debug!(role_id = entry.role_id, "Configured role no longer exists");
                return None;
            };
            if !can_bot_manage_role(bot, guild_id, role) {
                debug!(role_id = role.id, "Configured role is not manageable");
                return None;
            }
            if role.members.is_empty() {
                debug!(role_id = role.id, "Configured role has no members");
                return None;
            }
            Some(role.clone())
        })
        .collect();

    match selected.len() {
        0 => Err(GuardError::new(GuardErrorKind::NoEligibleRoles)),
        1 => Err(GuardError::new(GuardErrorKind::NotEnoughRoles { found: 1 })),
        _ => Ok(selected),
    }
}

/// Re-resolve an earlier selection against fresh guild data.
///
/// Roles that were deleted or moved out of the bot's reach since `selected`
/// was built are dropped. Emptied roles stay and receive members. At least two
/// must survive.
#[instrument(skip_all, fields(guild_id = guild_id, selected = selected.len()))]
pub fn refresh_selection(
    guild_id: u64,
    selected: &[RoleSnapshot],
    guild_roles: &HashMap<u64, RoleSnapshot>,
    bot: &BotStanding,
) -> GuardResult<Vec<RoleSnapshot>> {
    let refreshed: Vec<RoleSnapshot> = selected
        .iter()
        .filter_map(|earlier| guild_roles.get(&earlier.id))
        .filter(|role| {
            let manageable = can_bot_manage_role(bot, guild_id, role);
            if !manageable {
                debug!(role_id = role.id, "Role left the bot's reach");
            }
            manageable
        })
        .cloned()
        .collect();

    if refreshed.len() < 2 {
        return Err(GuardError::new(GuardErrorKind::NotEnoughRoles {
            found: refreshed.len(),
        }));
    }
    Ok(refreshed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GUILD: u64 = 1000;

    fn bot() -> BotStanding {
        BotStanding {
            administrator: false,
            manage_roles: true,
            top_position: 10,
        }
    }

    fn live(roles: &[RoleSnapshot]) -> HashMap<u64, RoleSnapshot> {
        roles.iter().map(|r| (r.id, r.clone())).collect()
    }

    #[test]
    fn test_refresh_drops_roles_moved_above_bot() {
        let selected = vec![
            RoleSnapshot::new(1, "Red", 1).with_members([10]),
            RoleSnapshot::new(2, "Blue", 2).with_members([11]),
            RoleSnapshot::new(3, "Green", 3).with_members([12]),
        ];
        let fresh = live(&[
            RoleSnapshot::new(1, "Red", 1).with_members([10]),
            RoleSnapshot::new(2, "Blue", 2),
            RoleSnapshot::new(3, "Green", 15).with_members([12]),
        ]);

        let refreshed = refresh_selection(GUILD, &selected, &fresh, &bot()).unwrap();
        let ids: Vec<u64> = refreshed.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(refreshed[1].members.is_empty());
    }

    #[test]
    fn test_refresh_needs_two_roles() {
        let selected = vec![
            RoleSnapshot::new(1, "Red", 1).with_members([10]),
            RoleSnapshot::new(2, "Blue", 2).with_members([11]),
        ];
        let fresh = live(&[RoleSnapshot::new(1, "Red", 1).with_members([10])]);

        let err = refresh_selection(GUILD, &selected, &fresh, &bot()).unwrap_err();
        assert_eq!(err.kind(), &GuardErrorKind::NotEnoughRoles { found: 1 });
    }
}
