//! Simulation configuration with documented constants
//!
//! All tunables live here. A scenario file (TOML) is deserialized into
//! [`ScenarioConfig`]; missing sections fall back to the defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{GroupWalkError, Result};
use crate::core::types::WorldBounds;
use crate::simulation::spawn::SpawnGroup;

/// Maximum number of identifiers per group.
///
/// Device `id` belongs to the group led by `id - id % GROUP_CAPACITY`.
pub const GROUP_CAPACITY: u64 = 100;

/// Configuration for the movement decision and the round runtime
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === WORLD ===
    /// Rectangle every roaming target is sampled from
    pub world: WorldBounds,

    /// Identifier range size used to partition devices into groups
    pub group_capacity: u64,

    /// Duration of one round (seconds)
    ///
    /// A device moves at most `max_speed * period` per round.
    pub period: f64,

    /// Seed for spawn positions and per-device random streams
    pub seed: u64,

    // === PATH FOLLOWING ===
    /// Head straight for the target after stalling in place
    ///
    /// Off by default: a stalled device on a degenerate path holds position.
    pub stall_escape: bool,

    // === PARALLELIZATION ===
    /// Minimum device count before rounds run on rayon
    pub parallel_threshold: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            world: WorldBounds::default(),
            group_capacity: GROUP_CAPACITY,
            period: 1.0,
            seed: 12345,
            stall_escape: false,
            parallel_threshold: 1000,
        }
    }
}

impl SimulationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.group_capacity < 2 {
            return Err(GroupWalkError::InvalidConfig(format!(
                "group_capacity ({}) must be at least 2",
                self.group_capacity
            )));
        }

        if !(self.period > 0.0) {
            return Err(GroupWalkError::InvalidConfig(format!(
                "period ({}) must be positive",
                self.period
            )));
        }

        if !(self.world.hi_x > 0.0 && self.world.hi_y > 0.0) {
            return Err(GroupWalkError::InvalidConfig(format!(
                "world rectangle [0,0]-[{},{}] is empty",
                self.world.hi_x, self.world.hi_y
            )));
        }

        Ok(())
    }
}

/// Street map layout used when no map file is supplied
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Side of one occupancy cell (metres)
    pub cell_size: f64,

    /// Side of one generated building block, in cells (0 = open field)
    pub block_cells: usize,

    /// Width of the streets between blocks, in cells
    pub street_cells: usize,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            cell_size: 10.0,
            block_cells: 6,
            street_cells: 2,
        }
    }
}

impl MapConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.cell_size > 0.0) {
            return Err(GroupWalkError::InvalidConfig(format!(
                "cell_size ({}) must be positive",
                self.cell_size
            )));
        }
        if self.block_cells > 0 && self.street_cells == 0 {
            return Err(GroupWalkError::InvalidConfig(
                "street_cells must be positive when blocks are generated".into(),
            ));
        }
        Ok(())
    }
}

/// A full scenario: runtime settings, map layout and the groups to spawn
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub simulation: SimulationConfig,
    pub map: MapConfig,
    pub groups: Vec<SpawnGroup>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            map: MapConfig::default(),
            groups: vec![
                // a single device biking
                SpawnGroup::new(0, 1, 0.0, 20.0, 0.0),
                // a large group standing still
                SpawnGroup::new(1, 20, 50.0, 0.0, 0.0),
                // a medium sized, tightly packed group walking
                SpawnGroup::new(2, 10, 20.0, 5.0, 0.0),
                // a medium sized, loosely packed group walking
                SpawnGroup::new(3, 10, 80.0, 5.0, 0.0),
            ],
        }
    }
}

impl ScenarioConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let scenario: ScenarioConfig = toml::from_str(content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Checks settings and every group against the configured capacity
    pub fn validate(&self) -> Result<()> {
        self.simulation.validate()?;
        self.map.validate()?;
        for group in &self.groups {
            group.validate(self.simulation.group_capacity)?;
        }
        Ok(())
    }
}
