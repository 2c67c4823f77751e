//! Group movement decision
//!
//! Every device runs [`group_walk`] once per round. Devices share no
//! memory: group membership comes from the identifier, the leader's
//! position from a network lookup, and everything else from the device's
//! own [`RoundState`].

pub mod decision;
pub mod follower;
pub mod group;
pub mod kinematics;
pub mod leader;
pub mod reach;
pub mod scope;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use decision::{group_walk, RoundOutcome};
pub use group::{group_index, leader_of, Role};
pub use reach::{reach_on_streets, Reach};
pub use scope::ProcessTrace;
pub use state::RoundState;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::types::{DeviceId, Time, Vec2};
use crate::spatial::{Positioning, SpatialOracle};

/// Static per-device parameters fixed at spawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceParams {
    /// Velocity cap (m/s)
    pub max_speed: f64,
    /// Half-side of the square personal offsets are drawn from (m)
    pub offset_radius: f64,
}

/// Everything one device sees during one round
pub struct RoundContext<'a> {
    pub uid: DeviceId,
    /// Current position; teleports and steps write here
    pub position: Vec2,
    pub time: Time,
    pub params: DeviceParams,
    pub config: &'a SimulationConfig,
    pub oracle: &'a dyn SpatialOracle,
    pub network: &'a dyn Positioning,
    pub rng: &'a mut dyn RngCore,
    pub state: &'a mut RoundState,
    pub trace: ProcessTrace,
}
