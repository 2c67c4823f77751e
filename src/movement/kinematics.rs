//! Velocity-capped stepping and target sampling

use rand::Rng;

use crate::core::types::Vec2;

/// Move `position` towards `waypoint` by at most `max_speed * period`.
///
/// Returns the distance to the waypoint measured before the step.
/// A non-finite waypoint leaves the position untouched and reports 0.
pub fn follow_target(position: &mut Vec2, waypoint: Vec2, max_speed: f64, period: f64) -> f64 {
    if !waypoint.is_finite() {
        return 0.0;
    }

    let distance = position.distance(&waypoint);
    let step = (max_speed * period).max(0.0);
    if distance <= step {
        *position = waypoint;
    } else {
        *position = *position + (waypoint - *position) * (step / distance);
    }
    distance
}

/// Uniform point in the rectangle `low..=high`
pub fn sample_rectangle<R: Rng + ?Sized>(rng: &mut R, low: Vec2, high: Vec2) -> Vec2 {
    Vec2::new(rng.gen_range(low.x..=high.x), rng.gen_range(low.y..=high.y))
}
