//! Followers chase their leader up to a personal offset

use tracing::{debug, trace};

use crate::core::types::{DeviceId, Vec2};
use crate::movement::kinematics::sample_rectangle;
use crate::movement::reach::{reach_on_streets, Reach};
use crate::movement::RoundContext;

/// One follower round.
///
/// The leader position comes from the previous round's committed state.
/// On the first active round the follower is placed directly on the
/// nearest street to its target; afterwards it walks. Returns the reach
/// when the follower walked this round.
pub fn follower_round(ctx: &mut RoundContext<'_>, leader: DeviceId) -> Option<Reach> {
    let radius = ctx.params.offset_radius;
    let rng = &mut *ctx.rng;
    let offset = ctx.state.personal_offset_or_insert_with(|| {
        sample_rectangle(rng, Vec2::new(-radius, -radius), Vec2::new(radius, radius))
    });

    let Some(leader_position) = ctx.network.position_of(leader) else {
        trace!(device = %ctx.uid, %leader, "leader not present, holding position");
        return None;
    };
    // Keep the target inside the world
    let target = ctx.config.world.clamp(leader_position + offset);

    if ctx.state.finish_first_round() {
        let placed = ctx.oracle.closest_space(target);
        if placed.is_finite() {
            debug!(device = %ctx.uid, to = %placed, "follower placed next to leader");
            ctx.position = placed;
        }
        return None;
    }

    let max_speed = ctx.params.max_speed;
    let period = ctx.config.period;
    Some(reach_on_streets(ctx, target, max_speed, period))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::WorldBounds;
    use crate::movement::testing::Harness;
    use crate::spatial::{SpatialOracle, StreetMap};

    fn harness_with_leader(leader_at: Vec2) -> Harness {
        let mut harness = Harness::new(DeviceId(201), Vec2::new(1000.0, 700.0));
        harness.network.insert(DeviceId(200), leader_at);
        harness
    }

    #[test]
    fn test_first_round_teleports_to_target() {
        let mut map = StreetMap::open(WorldBounds::default(), 10.0);
        map.block_rect(Vec2::new(380.0, 380.0), Vec2::new(419.0, 419.0));
        let mut harness = harness_with_leader(Vec2::new(400.0, 400.0));
        let mut ctx = harness.context(&map);

        let reach = follower_round(&mut ctx, DeviceId(200));

        let offset = ctx.state.personal_offset().unwrap();
        let expected = map.closest_space(Vec2::new(400.0, 400.0) + offset);
        assert!(reach.is_none());
        assert_eq!(ctx.position, expected);
        assert!(!ctx.state.is_first_round());
    }

    #[test]
    fn test_offset_within_radius_and_sticky() {
        let map = StreetMap::open(WorldBounds::default(), 10.0);
        let mut harness = harness_with_leader(Vec2::new(400.0, 400.0));
        harness.params.offset_radius = 30.0;
        let mut ctx = harness.context(&map);

        follower_round(&mut ctx, DeviceId(200));
        let offset = ctx.state.personal_offset().unwrap();
        assert!(offset.x.abs() <= 30.0 && offset.y.abs() <= 30.0);

        for _ in 0..10 {
            follower_round(&mut ctx, DeviceId(200));
            assert_eq!(ctx.state.personal_offset(), Some(offset));
        }
    }

    #[test]
    fn test_walks_after_first_round() {
        let map = StreetMap::open(WorldBounds::default(), 10.0);
        let mut harness = harness_with_leader(Vec2::new(400.0, 400.0));
        harness.params.offset_radius = 0.0;
        harness.state.finish_first_round();
        let mut ctx = harness.context(&map);

        let reach = follower_round(&mut ctx, DeviceId(200)).unwrap();

        assert_eq!(reach.waypoint, Vec2::new(400.0, 400.0));
        assert!((ctx.position.distance(&Vec2::new(1000.0, 700.0)) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_radius_targets_leader() {
        let map = StreetMap::open(WorldBounds::default(), 10.0);
        let mut harness = harness_with_leader(Vec2::new(400.0, 400.0));
        harness.params.offset_radius = 0.0;
        let mut ctx = harness.context(&map);

        follower_round(&mut ctx, DeviceId(200));

        assert_eq!(ctx.state.personal_offset(), Some(Vec2::ZERO));
        assert_eq!(ctx.position, Vec2::new(400.0, 400.0));
    }

    #[test]
    fn test_target_clamped_at_world_edge() {
        let map = StreetMap::open(WorldBounds::default(), 10.0);
        let mut harness = Harness::new(DeviceId(201), Vec2::new(1000.0, 400.0));
        harness.network.insert(DeviceId(200), Vec2::new(1195.0, 400.0));
        harness.state.personal_offset_or_insert_with(|| Vec2::new(20.0, 0.0));
        harness.state.finish_first_round();
        let mut ctx = harness.context(&map);

        let reach = follower_round(&mut ctx, DeviceId(200)).unwrap();

        assert_eq!(reach.waypoint, Vec2::new(1200.0, 400.0));
        assert_eq!(ctx.position, Vec2::new(1005.0, 400.0));
    }

    #[test]
    fn test_first_round_placement_at_world_edge() {
        let map = StreetMap::open(WorldBounds::default(), 10.0);
        let mut harness = Harness::new(DeviceId(201), Vec2::new(10.0, 10.0));
        harness.network.insert(DeviceId(200), Vec2::new(600.0, 795.0));
        harness.state.personal_offset_or_insert_with(|| Vec2::new(0.0, 30.0));
        let mut ctx = harness.context(&map);

        assert!(follower_round(&mut ctx, DeviceId(200)).is_none());
        assert_eq!(ctx.position, Vec2::new(600.0, 800.0));
    }

    #[test]
    fn test_missing_leader_keeps_first_round_pending() {
        let map = StreetMap::open(WorldBounds::default(), 10.0);
        let mut harness = Harness::new(DeviceId(201), Vec2::new(10.0, 10.0));
        let mut ctx = harness.context(&map);

        assert!(follower_round(&mut ctx, DeviceId(200)).is_none());
        assert_eq!(ctx.position, Vec2::new(10.0, 10.0));
        assert!(ctx.state.is_first_round());
        assert!(ctx.state.personal_offset().is_some());
    }
}
