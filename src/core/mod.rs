pub mod config;
pub mod error;
pub mod types;

pub use config::{MapConfig, ScenarioConfig, SimulationConfig, GROUP_CAPACITY};
pub use error::{GroupWalkError, Result};
pub use types::{DeviceId, Time, Vec2, WorldBounds};
