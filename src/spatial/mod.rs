pub mod grid;
pub mod oracle;
pub mod pathfinding;
pub mod streets;

pub use oracle::{Positioning, SpatialOracle};
pub use streets::StreetMap;
