//! Lock-step round runtime
//!
//! Each round: spawn due devices -> snapshot positions -> every device
//! decides against the snapshot -> positions committed -> clock advances.
//!
//! Uses rayon for the decision phase above the configured device count.
//! Every device owns its random stream, so results do not depend on
//! thread scheduling.

use ahash::AHashMap;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::core::config::SimulationConfig;
use crate::core::error::{GroupWalkError, Result};
use crate::core::types::{DeviceId, Time, Vec2};
use crate::movement::kinematics::sample_rectangle;
use crate::movement::{
    group_index, group_walk, DeviceParams, ProcessTrace, Role, RoundContext, RoundOutcome,
    RoundState,
};
use crate::simulation::snapshot::{DeviceRecord, PositionSnapshot, RoundReport};
use crate::simulation::spawn::SpawnGroup;
use crate::spatial::{Positioning, SpatialOracle};

/// Mixes the scenario seed with a device identifier
const DEVICE_SEED_MIX: u64 = 0x9e37_79b9_7f4a_7c15;

/// A spawned device and everything the runtime keeps for it
#[derive(Debug, Clone)]
struct DeviceSlot {
    id: DeviceId,
    params: DeviceParams,
    position: Vec2,
    state: RoundState,
    rng: ChaCha8Rng,
    last_outcome: Option<RoundOutcome>,
}

impl DeviceSlot {
    fn new(id: DeviceId, params: DeviceParams, position: Vec2, seed: u64) -> Self {
        Self {
            id,
            params,
            position,
            state: RoundState::new(),
            rng: ChaCha8Rng::seed_from_u64(seed ^ id.0.wrapping_mul(DEVICE_SEED_MIX)),
            last_outcome: None,
        }
    }

    /// Runs this device's decision; returns whether it moved
    fn decide(
        &mut self,
        config: &SimulationConfig,
        oracle: &dyn SpatialOracle,
        network: &dyn Positioning,
        time: Time,
    ) -> bool {
        let before = self.position;
        let mut ctx = RoundContext {
            uid: self.id,
            position: self.position,
            time,
            params: self.params,
            config,
            oracle,
            network,
            rng: &mut self.rng,
            state: &mut self.state,
            trace: ProcessTrace::new(),
        };

        let key = group_index(self.id, config.group_capacity);
        let outcome = ctx.switcher(key, |ctx| group_walk(ctx));

        self.position = ctx.position;
        self.last_outcome = Some(outcome);
        self.position != before
    }

    fn record(&self, group_capacity: u64) -> DeviceRecord {
        DeviceRecord {
            id: self.id,
            role: Role::of(self.id, group_capacity),
            position: self.position,
            target: self.state.current_target,
            offset: self.state.personal_offset(),
            distance: self.state.last_distance,
            debug: self.state.debug.clone(),
        }
    }
}

/// A device waiting for its group's start time
#[derive(Debug, Clone)]
struct PendingSpawn {
    id: DeviceId,
    params: DeviceParams,
    position: Vec2,
    at: Time,
}

/// The simulated network of devices
pub struct Network<O: SpatialOracle> {
    config: SimulationConfig,
    oracle: O,
    devices: Vec<DeviceSlot>,
    index: AHashMap<DeviceId, usize>,
    pending: Vec<PendingSpawn>,
    time: Time,
    round: u64,
}

impl<O: SpatialOracle> Network<O> {
    /// Builds the network and schedules every group.
    ///
    /// Malformed groups and identifier clashes are rejected here, never
    /// during a round.
    pub fn new(config: SimulationConfig, oracle: O, groups: &[SpawnGroup]) -> Result<Self> {
        config.validate()?;

        let mut network = Self {
            config,
            oracle,
            devices: Vec::new(),
            index: AHashMap::new(),
            pending: Vec::new(),
            time: 0.0,
            round: 0,
        };

        let mut rng = ChaCha8Rng::seed_from_u64(network.config.seed);
        let world = network.config.world;
        let capacity = network.config.group_capacity;
        let mut scheduled: AHashMap<DeviceId, i64> = AHashMap::new();

        for group in groups {
            group.validate(capacity)?;
            for id in group.device_ids(capacity) {
                if scheduled.insert(id, group.group_id).is_some() {
                    return Err(GroupWalkError::DuplicateDevice(id));
                }
                network.pending.push(PendingSpawn {
                    id,
                    params: group.params(),
                    position: sample_rectangle(&mut rng, world.low(), world.high()),
                    at: group.start_time,
                });
            }
        }

        // Latest start first, so due spawns pop off the end
        network
            .pending
            .sort_by(|a, b| b.at.total_cmp(&a.at).then(b.id.cmp(&a.id)));

        info!(
            groups = groups.len(),
            devices = network.pending.len(),
            "network scheduled"
        );
        Ok(network)
    }

    /// Adds a single device right away, outside any group schedule
    pub fn spawn_device(&mut self, id: DeviceId, params: DeviceParams, position: Vec2) -> Result<()> {
        if self.index.contains_key(&id) || self.pending.iter().any(|p| p.id == id) {
            return Err(GroupWalkError::DuplicateDevice(id));
        }
        self.insert_device(DeviceSlot::new(id, params, position, self.config.seed));
        Ok(())
    }

    /// Removes a device and its round state
    pub fn despawn(&mut self, id: DeviceId) -> bool {
        let Some(idx) = self.index.remove(&id) else {
            return false;
        };
        self.devices.swap_remove(idx);
        if let Some(moved) = self.devices.get(idx) {
            self.index.insert(moved.id, idx);
        }
        info!(device = %id, "despawned");
        true
    }

    fn insert_device(&mut self, slot: DeviceSlot) {
        self.index.insert(slot.id, self.devices.len());
        self.devices.push(slot);
    }

    fn spawn_due(&mut self) -> usize {
        let mut spawned = 0;
        while self.pending.last().is_some_and(|p| p.at <= self.time) {
            if let Some(p) = self.pending.pop() {
                self.insert_device(DeviceSlot::new(p.id, p.params, p.position, self.config.seed));
                spawned += 1;
            }
        }
        if spawned > 0 {
            info!(time = self.time, spawned, "devices spawned");
        }
        spawned
    }

    /// Executes one round for every active device
    pub fn run_round(&mut self) -> RoundReport {
        let spawned = self.spawn_due();

        let snapshot: PositionSnapshot = self.devices.iter().map(|d| (d.id, d.position)).collect();

        let config = &self.config;
        let oracle = &self.oracle;
        let network = &snapshot;
        let time = self.time;
        let decide = |slot: &mut DeviceSlot| slot.decide(config, oracle, network, time);

        // PARALLEL: each device only touches its own slot
        let moved = if self.devices.len() >= config.parallel_threshold {
            self.devices.par_iter_mut().map(decide).filter(|&m| m).count()
        } else {
            self.devices.iter_mut().map(decide).filter(|&m| m).count()
        };

        let report = RoundReport {
            round: self.round,
            time: self.time,
            spawned,
            active: self.devices.len(),
            moved,
        };
        debug!(round = report.round, active = report.active, moved, "round complete");

        self.time += self.config.period;
        self.round += 1;
        report
    }

    /// Runs `rounds` rounds, returning their reports
    pub fn run(&mut self, rounds: u64) -> Vec<RoundReport> {
        (0..rounds).map(|_| self.run_round()).collect()
    }

    pub fn time(&self) -> Time {
        self.time
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn device_ids(&self) -> impl Iterator<Item = DeviceId> + '_ {
        self.devices.iter().map(|d| d.id)
    }

    pub fn position_of(&self, id: DeviceId) -> Option<Vec2> {
        self.slot(id).map(|d| d.position)
    }

    pub fn state_of(&self, id: DeviceId) -> Option<&RoundState> {
        self.slot(id).map(|d| &d.state)
    }

    pub fn outcome_of(&self, id: DeviceId) -> Option<RoundOutcome> {
        self.slot(id).and_then(|d| d.last_outcome)
    }

    fn slot(&self, id: DeviceId) -> Option<&DeviceSlot> {
        self.index.get(&id).and_then(|&idx| self.devices.get(idx))
    }

    /// Every active device, ordered by identifier
    pub fn snapshot(&self) -> Vec<DeviceRecord> {
        let mut records: Vec<DeviceRecord> = self
            .devices
            .iter()
            .map(|d| d.record(self.config.group_capacity))
            .collect();
        records.sort_by_key(|r| r.id);
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::WorldBounds;
    use crate::spatial::StreetMap;

    fn open_map() -> StreetMap {
        StreetMap::open(WorldBounds::default(), 10.0)
    }

    #[test]
    fn test_duplicate_group_rejected() {
        let groups = vec![
            SpawnGroup::new(1, 5, 10.0, 5.0, 0.0),
            SpawnGroup::new(1, 3, 10.0, 5.0, 0.0),
        ];
        let result = Network::new(SimulationConfig::default(), open_map(), &groups);
        assert!(matches!(result, Err(GroupWalkError::DuplicateDevice(DeviceId(100)))));
    }

    #[test]
    fn test_malformed_group_rejected() {
        let groups = vec![SpawnGroup::new(0, 0, 10.0, 5.0, 0.0)];
        let result = Network::new(SimulationConfig::default(), open_map(), &groups);
        assert!(matches!(result, Err(GroupWalkError::InvalidGroup { .. })));
    }

    #[test]
    fn test_spawn_respects_start_time() {
        let groups = vec![
            SpawnGroup::new(0, 2, 10.0, 5.0, 0.0),
            SpawnGroup::new(1, 3, 10.0, 5.0, 2.0),
        ];
        let mut network = Network::new(SimulationConfig::default(), open_map(), &groups).unwrap();
        assert_eq!(network.pending_count(), 5);

        let first = network.run_round();
        assert_eq!(first.spawned, 2);
        assert_eq!(network.device_count(), 2);

        network.run_round();
        assert_eq!(network.device_count(), 2);

        let third = network.run_round();
        assert_eq!(third.spawned, 3);
        assert_eq!(network.device_count(), 5);
        assert_eq!(network.time(), 3.0);
    }

    #[test]
    fn test_spawn_device_duplicate() {
        let mut network = Network::new(SimulationConfig::default(), open_map(), &[]).unwrap();
        let params = DeviceParams {
            max_speed: 1.0,
            offset_radius: 0.0,
        };
        network.spawn_device(DeviceId(5), params, Vec2::new(1.0, 1.0)).unwrap();
        assert!(network.spawn_device(DeviceId(5), params, Vec2::new(1.0, 1.0)).is_err());
    }

    #[test]
    fn test_despawn_keeps_index_consistent() {
        let groups = vec![SpawnGroup::new(0, 4, 10.0, 5.0, 0.0)];
        let mut network = Network::new(SimulationConfig::default(), open_map(), &groups).unwrap();
        network.run_round();

        assert!(network.despawn(DeviceId(1)));
        assert!(!network.despawn(DeviceId(1)));
        assert_eq!(network.device_count(), 3);
        for id in [0, 2, 3] {
            assert!(network.position_of(DeviceId(id)).is_some());
        }
        assert!(network.state_of(DeviceId(1)).is_none());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let groups = vec![
            SpawnGroup::new(0, 20, 40.0, 5.0, 0.0),
            SpawnGroup::new(1, 20, 40.0, 10.0, 0.0),
        ];
        let sequential = SimulationConfig::default();
        let parallel = SimulationConfig {
            parallel_threshold: 0,
            ..SimulationConfig::default()
        };

        let mut a = Network::new(sequential, open_map(), &groups).unwrap();
        let mut b = Network::new(parallel, open_map(), &groups).unwrap();
        a.run(20);
        b.run(20);

        assert_eq!(a.snapshot(), b.snapshot());
    }
}
