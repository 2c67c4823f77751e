//! Query interfaces the movement logic depends on.
//!
//! The decision code never owns a map or a network: the runtime hands it
//! implementations of these traits for the duration of one round.

use crate::core::types::{DeviceId, Vec2};

/// Nearest-walkable, nearest-obstacle and path queries over a street map.
///
/// Failures are signalled with [`Vec2::NAN`], never with a panic.
pub trait SpatialOracle: Send + Sync {
    /// Nearest walkable point to `position`
    fn closest_space(&self, position: Vec2) -> Vec2;

    /// Nearest obstacle point to `position` (diagnostics only)
    fn closest_obstacle(&self, position: Vec2) -> Vec2;

    /// Next waypoint on a walkable path from `from` to `to`
    fn path_to(&self, from: Vec2, to: Vec2) -> Vec2;
}

/// Position lookup of other devices by identifier.
///
/// Values are the ones committed at the end of the previous round, so they
/// may be one round stale.
pub trait Positioning: Send + Sync {
    fn position_of(&self, id: DeviceId) -> Option<Vec2>;
}
