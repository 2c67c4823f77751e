//! Round-start views of the network

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{DeviceId, Time, Vec2};
use crate::movement::Role;
use crate::spatial::Positioning;

/// Positions committed at the end of the previous round.
///
/// Every decision in a round reads this, never the live positions, so no
/// device observes another device's same-round move.
#[derive(Debug, Clone, Default)]
pub struct PositionSnapshot {
    positions: AHashMap<DeviceId, Vec2>,
}

impl PositionSnapshot {
    pub fn insert(&mut self, id: DeviceId, position: Vec2) {
        self.positions.insert(id, position);
    }
}

impl FromIterator<(DeviceId, Vec2)> for PositionSnapshot {
    fn from_iter<I: IntoIterator<Item = (DeviceId, Vec2)>>(iter: I) -> Self {
        Self {
            positions: iter.into_iter().collect(),
        }
    }
}

impl Positioning for PositionSnapshot {
    fn position_of(&self, id: DeviceId) -> Option<Vec2> {
        self.positions.get(&id).copied()
    }
}

/// One device as written to the simulation log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub id: DeviceId,
    pub role: Role,
    pub position: Vec2,
    pub target: Option<Vec2>,
    pub offset: Option<Vec2>,
    /// Distance to the waypoint at the last path-following step
    pub distance: Option<f64>,
    pub debug: String,
}

/// Summary of one executed round
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundReport {
    pub round: u64,
    pub time: Time,
    pub spawned: usize,
    pub active: usize,
    /// Devices whose position changed this round
    pub moved: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_lookup() {
        let snapshot: PositionSnapshot = vec![
            (DeviceId(100), Vec2::new(1.0, 2.0)),
            (DeviceId(101), Vec2::new(3.0, 4.0)),
        ]
        .into_iter()
        .collect();

        assert_eq!(snapshot.position_of(DeviceId(101)), Some(Vec2::new(3.0, 4.0)));
        assert_eq!(snapshot.position_of(DeviceId(200)), None);
    }
}
