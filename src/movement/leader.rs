//! Leaders roam: random targets across the world, one at a time

use tracing::debug;

use crate::movement::kinematics::sample_rectangle;
use crate::movement::reach::{reach_on_streets, Reach};
use crate::movement::RoundContext;

/// One leader round.
///
/// The held target is kept while the device is still more than one step
/// away from its waypoint. Otherwise a fresh target is stored for the next
/// round. A blocked leader also reports a short distance, so it re-targets
/// too.
pub fn leader_round(ctx: &mut RoundContext<'_>) -> Reach {
    if ctx.state.finish_first_round() {
        let snapped = ctx.oracle.closest_space(ctx.position);
        if snapped.is_finite() {
            debug!(device = %ctx.uid, from = %ctx.position, to = %snapped, "leader snapped to street");
            ctx.position = snapped;
        }
    }

    let world = ctx.config.world;
    let max_speed = ctx.params.max_speed;
    let period = ctx.config.period;

    let target = match ctx.state.current_target {
        Some(target) => target,
        None => sample_rectangle(&mut *ctx.rng, world.low(), world.high()),
    };

    let reach = reach_on_streets(ctx, target, max_speed, period);

    let next = if reach.distance > max_speed * period {
        target
    } else {
        let fresh = sample_rectangle(&mut *ctx.rng, world.low(), world.high());
        debug!(device = %ctx.uid, reached = %target, next = %fresh, "leader re-targeting");
        fresh
    };
    ctx.state.current_target = Some(next);

    reach
}
