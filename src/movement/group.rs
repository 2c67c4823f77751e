//! Group structure derived from identifiers alone
//!
//! No device ever announces its leader: every device computes the same
//! partition from its own identifier.

use serde::{Deserialize, Serialize};

use crate::core::types::DeviceId;

/// Leader identifier of the group `id` belongs to
#[inline]
pub fn leader_of(id: DeviceId, group_capacity: u64) -> DeviceId {
    DeviceId(id.0 - id.0 % group_capacity)
}

/// Index of the group `id` belongs to
#[inline]
pub fn group_index(id: DeviceId, group_capacity: u64) -> u64 {
    id.0 / group_capacity
}

/// Behaviour a device runs this round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Leader,
    Follower { leader: DeviceId },
}

impl Role {
    pub fn of(id: DeviceId, group_capacity: u64) -> Self {
        let leader = leader_of(id, group_capacity);
        if leader == id {
            Role::Leader
        } else {
            Role::Follower { leader }
        }
    }

    pub fn is_leader(&self) -> bool {
        matches!(self, Role::Leader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_same_group_same_leader() {
        assert_eq!(leader_of(DeviceId(250), 100), leader_of(DeviceId(251), 100));
        assert_eq!(leader_of(DeviceId(250), 100), DeviceId(200));
        assert_eq!(leader_of(DeviceId(299), 100), DeviceId(200));
        assert_eq!(leader_of(DeviceId(300), 100), DeviceId(300));
    }

    #[test]
    fn test_role_dispatch() {
        assert_eq!(Role::of(DeviceId(200), 100), Role::Leader);
        assert_eq!(
            Role::of(DeviceId(251), 100),
            Role::Follower { leader: DeviceId(200) }
        );
        assert!(!Role::of(DeviceId(250), 100).is_leader());
        assert!(Role::of(DeviceId(0), 100).is_leader());
    }

    #[test]
    fn test_group_index() {
        assert_eq!(group_index(DeviceId(0), 100), 0);
        assert_eq!(group_index(DeviceId(199), 100), 1);
        assert_eq!(group_index(DeviceId(250), 100), 2);
    }

    proptest! {
        #[test]
        fn prop_leader_is_idempotent(id in 0u64..1_000_000, capacity in 1u64..1000) {
            let leader = leader_of(DeviceId(id), capacity);
            prop_assert_eq!(leader_of(leader, capacity), leader);
        }

        #[test]
        fn prop_leader_within_group(id in 0u64..1_000_000, capacity in 1u64..1000) {
            let leader = leader_of(DeviceId(id), capacity);
            prop_assert!(leader.0 <= id);
            prop_assert!(id - leader.0 < capacity);
            prop_assert_eq!(group_index(leader, capacity), group_index(DeviceId(id), capacity));
        }
    }
}
