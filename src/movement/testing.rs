//! Test fixtures shared by the movement unit tests

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::core::config::SimulationConfig;
use crate::core::types::{DeviceId, Time, Vec2};
use crate::movement::scope::ProcessTrace;
use crate::movement::state::RoundState;
use crate::movement::{DeviceParams, RoundContext};
use crate::simulation::snapshot::PositionSnapshot;
use crate::spatial::SpatialOracle;

/// Oracle with no usable paths: every point is walkable, no path exists
pub struct DeadEnd;

impl SpatialOracle for DeadEnd {
    fn closest_space(&self, position: Vec2) -> Vec2 {
        position
    }

    fn closest_obstacle(&self, _position: Vec2) -> Vec2 {
        Vec2::NAN
    }

    fn path_to(&self, _from: Vec2, _to: Vec2) -> Vec2 {
        Vec2::NAN
    }
}

/// Owns everything a [`RoundContext`] borrows for one device
pub struct Harness {
    pub uid: DeviceId,
    pub position: Vec2,
    pub time: Time,
    pub params: DeviceParams,
    pub config: SimulationConfig,
    pub state: RoundState,
    pub network: PositionSnapshot,
    pub rng: ChaCha8Rng,
}

impl Harness {
    pub fn new(uid: DeviceId, position: Vec2) -> Self {
        Self {
            uid,
            position,
            time: 0.0,
            params: DeviceParams {
                max_speed: 5.0,
                offset_radius: 20.0,
            },
            config: SimulationConfig::default(),
            state: RoundState::new(),
            network: PositionSnapshot::default(),
            rng: ChaCha8Rng::seed_from_u64(42),
        }
    }

    pub fn context<'a>(&'a mut self, oracle: &'a dyn SpatialOracle) -> RoundContext<'a> {
        RoundContext {
            uid: self.uid,
            position: self.position,
            time: self.time,
            params: self.params,
            config: &self.config,
            oracle,
            network: &self.network,
            rng: &mut self.rng,
            state: &mut self.state,
            trace: ProcessTrace::default(),
        }
    }
}
