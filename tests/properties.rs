use glam::Vec3;
use proptest::prelude::*;

use knockback_arena::planar_distance;
use knockback_arena::settings::BotConfig;
use knockback_arena::sim::targeting::{TargetingParams, decide, find_nearest_candidate};
use knockback_arena::sim::{AttackGate, Body, BodyKind, MoveCommand, MovementAxis, Tag, World};

fn ball_strategy() -> impl Strategy<Value = (f32, f32, f32, f32)> {
    (-20.0f32..20.0, 0.0f32..5.0, -20.0f32..20.0, -15.0f32..15.0)
}

fn axis_strategy() -> impl Strategy<Value = MovementAxis> {
    prop_oneof![Just(MovementAxis::X), Just(MovementAxis::Z)]
}

proptest! {
    #[test]
    fn selected_target_is_always_eligible(
        agent_coord in -8.0f32..8.0,
        axis in axis_strategy(),
        balls in prop::collection::vec(ball_strategy(), 0..12),
    ) {
        let config = BotConfig { movement_axis: axis, ..Default::default() };
        let params = TargetingParams::from(&config);

        let mut world = World::new(0);
        let agent_pos = axis.with_component(Vec3::new(0.0, 0.5, 0.0), agent_coord);
        let agent = world.insert(Body::agent(BodyKind::Bot, agent_pos));
        for (x, y, z, _) in &balls {
            world.insert(Body::projectile(Vec3::new(*x, *y, *z), Tag::DefaultBall));
        }

        if let Some(id) = find_nearest_candidate(&world, agent, &params) {
            let body = world.get(id).unwrap();
            prop_assert!(params.bounds.contains(axis.component(body.pos)));
            prop_assert!(body.pos.y <= agent_pos.y + params.max_ball_height);
            let chosen = planar_distance(agent_pos, body.pos);
            prop_assert!(chosen <= params.search_radius);

            // Nothing else eligible is strictly closer
            for other in world.bodies().filter(|b| b.kind == BodyKind::Projectile) {
                let eligible = params.bounds.contains(axis.component(other.pos))
                    && other.pos.y <= agent_pos.y + params.max_ball_height
                    && planar_distance(agent_pos, other.pos) <= params.search_radius;
                if eligible {
                    prop_assert!(planar_distance(agent_pos, other.pos) >= chosen);
                }
            }
        }
    }

    #[test]
    fn boost_only_when_target_wins_the_race(
        distance in 0.5f32..14.0,
        target_speed in 0.0f32..20.0,
        approaching in any::<bool>(),
    ) {
        let config = BotConfig::default();
        let params = TargetingParams::from(&config);

        let mut world = World::new(0);
        let agent = world.insert(Body::agent(BodyKind::Bot, Vec3::ZERO));
        let vel = if approaching { -target_speed } else { target_speed };
        world.insert(
            Body::projectile(Vec3::new(distance.min(8.5), 0.0, 0.0), Tag::DefaultBall)
                .with_vel(Vec3::new(vel, 0.0, 0.0)),
        );

        let d = distance.min(8.5);
        let cmd = decide(&world, agent, &params);
        let MoveCommand::Pursue { speed, direction, .. } = cmd else {
            return Err(TestCaseError::fail(format!("expected pursuit, got {cmd:?}")));
        };
        prop_assert_eq!(direction, 1.0);

        let wins = approaching
            && target_speed > 0.1
            && d / target_speed < d / config.move_speed;
        let expected = if wins {
            config.move_speed * config.speed_multiplier
        } else {
            config.move_speed
        };
        prop_assert_eq!(speed, expected);
    }

    #[test]
    fn cooldown_timestamp_never_decreases(
        cooldown in 0.0f64..5.0,
        times in prop::collection::vec(0.0f64..100.0, 1..30),
    ) {
        let mut gate = AttackGate::new(cooldown);
        let mut last = gate.next_attack_time();
        for now in times {
            if gate.is_ready(now) {
                gate.trigger(now);
                prop_assert!(gate.next_attack_time() >= now + cooldown);
            }
            prop_assert!(gate.next_attack_time() >= last);
            last = gate.next_attack_time();
        }
    }
}
