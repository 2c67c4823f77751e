//! Per-device state carried from one round to the next
//!
//! The runtime stores one [`RoundState`] per device and hands it back on
//! every round. Only the owning device's decision mutates it.

use serde::{Deserialize, Serialize};

use crate::core::types::{Time, Vec2};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundState {
    /// True until the device completes its first active round
    first_round: bool,

    /// Leader only: roaming destination currently pursued
    pub current_target: Option<Vec2>,

    /// Follower only: offset from the leader, sampled once
    personal_offset: Option<Vec2>,

    /// Position at the start of the previous path-following round
    pub previous_position: Option<Vec2>,

    /// Exponentially weighted sum of per-round displacements
    pub velocity_sum: Vec2,

    /// Last time the smoothed speed was below the stall threshold
    pub last_stalled_at: Option<Time>,

    /// Distance to the waypoint at the last path-following step
    pub last_distance: Option<f64>,

    /// Diagnostic line written by the path follower
    pub debug: String,
}

impl Default for RoundState {
    fn default() -> Self {
        Self {
            first_round: true,
            current_target: None,
            personal_offset: None,
            previous_position: None,
            velocity_sum: Vec2::ZERO,
            last_stalled_at: None,
            last_distance: None,
            debug: String::new(),
        }
    }
}

impl RoundState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_first_round(&self) -> bool {
        self.first_round
    }

    /// Returns whether this was the first round and clears the flag.
    /// The flag never goes back to true.
    pub fn finish_first_round(&mut self) -> bool {
        std::mem::replace(&mut self.first_round, false)
    }

    pub fn personal_offset(&self) -> Option<Vec2> {
        self.personal_offset
    }

    /// Sticky value: `sample` runs on the first call only; later calls
    /// return the stored offset unchanged.
    pub fn personal_offset_or_insert_with(&mut self, sample: impl FnOnce() -> Vec2) -> Vec2 {
        *self.personal_offset.get_or_insert_with(sample)
    }
}
