pub mod network;
pub mod snapshot;
pub mod spawn;

pub use network::Network;
pub use snapshot::{DeviceRecord, PositionSnapshot, RoundReport};
pub use spawn::{kmh_to_ms, SpawnGroup};
