//! Per-round entry point: pick the role, run its policy

use serde::{Deserialize, Serialize};

use crate::core::types::Vec2;
use crate::movement::follower::follower_round;
use crate::movement::group::Role;
use crate::movement::leader::leader_round;
use crate::movement::reach::Reach;
use crate::movement::RoundContext;

/// What a device did this round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub role: Role,
    /// Waypoint stepped towards, if the device walked
    pub waypoint: Option<Vec2>,
    /// Distance to that waypoint before stepping
    pub distance: Option<f64>,
}

impl RoundOutcome {
    fn new(role: Role, reach: Option<Reach>) -> Self {
        Self {
            role,
            waypoint: reach.map(|r| r.waypoint),
            distance: reach.map(|r| r.distance),
        }
    }
}

/// Group movement for one device and one round.
///
/// Never fails: every problem degrades to not moving. The new position is
/// left in `ctx.position` for the runtime to commit.
pub fn group_walk(ctx: &mut RoundContext<'_>) -> RoundOutcome {
    let role = Role::of(ctx.uid, ctx.config.group_capacity);
    let reach = match role {
        Role::Leader => Some(leader_round(ctx)),
        // the distance is unused by followers
        Role::Follower { leader } => follower_round(ctx, leader),
    };
    RoundOutcome::new(role, reach)
}
