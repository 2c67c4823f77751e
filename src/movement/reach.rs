//! Reaching a target along streets
//!
//! Each round the follower asks the oracle for a walkable version of the
//! target and the next waypoint towards it, then takes one capped step.
//! Unreachable or out-of-world targets degrade to holding position.

use tracing::trace;

use crate::core::types::Vec2;
use crate::movement::kinematics::follow_target;
use crate::movement::RoundContext;

/// Weight of the previous velocity estimate in the smoothed velocity
pub const VELOCITY_SMOOTHING: f64 = 0.75;

/// Smoothed speed below which a device counts as stalled (m/s)
pub const STALL_SPEED: f64 = 0.1;

/// How recently a stall must have been seen to trigger an escape (s)
pub const STALL_WINDOW: f64 = 10.0;

/// No stall escape before this simulation time (s)
pub const STALL_WARMUP: f64 = 50.0;

/// A device closer than this to its path waypoint aims at the target
const WAYPOINT_EPSILON: f64 = 0.01;

/// Result of one path-following step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reach {
    /// Point the device stepped towards this round
    pub waypoint: Vec2,
    /// Distance to `waypoint` before the step
    pub distance: f64,
}

/// Smoothed velocity after observing this round's position
fn update_velocity(ctx: &mut RoundContext<'_>) -> Vec2 {
    let position = ctx.position;
    let previous = ctx.state.previous_position.unwrap_or(position);
    let sum = ctx.state.velocity_sum * VELOCITY_SMOOTHING + (position - previous);
    ctx.state.velocity_sum = sum;
    ctx.state.previous_position = Some(position);

    let velocity = sum * (1.0 - VELOCITY_SMOOTHING);
    if velocity.length() < STALL_SPEED {
        ctx.state.last_stalled_at = Some(ctx.time);
    }
    velocity
}

fn stalled(ctx: &RoundContext<'_>) -> bool {
    ctx.time > STALL_WARMUP
        && ctx
            .state
            .last_stalled_at
            .map(|at| ctx.time - at < STALL_WINDOW)
            .unwrap_or(false)
}

/// Advance the device towards `target` following streets.
pub fn reach_on_streets(
    ctx: &mut RoundContext<'_>,
    target: Vec2,
    max_speed: f64,
    period: f64,
) -> Reach {
    update_velocity(ctx);

    let position = ctx.position;
    let here = ctx.oracle.closest_space(position);
    let walkable_target = ctx.oracle.closest_space(target);
    let path = ctx.oracle.path_to(here, walkable_target);

    let mut waypoint = path;
    if path.is_nan() || !ctx.config.world.contains(target) {
        trace!(device = %ctx.uid, %target, "no usable path, holding position");
        waypoint = position;
    } else if position.distance(&path) < WAYPOINT_EPSILON {
        waypoint = walkable_target;
    }

    if ctx.config.stall_escape && walkable_target.is_finite() && stalled(ctx) {
        trace!(device = %ctx.uid, "stalled, heading straight for target");
        waypoint = walkable_target;
    }

    ctx.state.debug = format!(
        "closest {} obstacle {} target {} path {}",
        here,
        ctx.oracle.closest_obstacle(position),
        target,
        path
    );

    let distance = follow_target(&mut ctx.position, waypoint, max_speed, period);
    ctx.state.last_distance = Some(distance);

    Reach { waypoint, distance }
}
