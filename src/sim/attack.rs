//! Attack gate and radial knockback
//!
//! The gate's only state is the next time an attack may fire. It is
//! `Cooling` while the clock is below that timestamp and `Ready` otherwise.
//! The trigger radius and the area-of-effect radius are independent: a
//! projectile inside `attack_radius` sets the attack off, and every
//! projectile inside `knockback.radius` gets pushed.

use glam::Vec3;

use super::targeting::is_candidate;
use super::world::{BodyId, Tag, World};
use crate::planar_distance;
use crate::settings::{BotConfig, PlayerConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Ready,
    Cooling,
}

/// Cooldown gate
#[derive(Debug, Clone, PartialEq)]
pub struct AttackGate {
    next_attack_time: f64,
    cooldown: f64,
}

impl AttackGate {
    /// Starts ready
    pub fn new(cooldown: f64) -> Self {
        Self {
            next_attack_time: 0.0,
            cooldown,
        }
    }

    pub fn state(&self, now: f64) -> GateState {
        if now >= self.next_attack_time {
            GateState::Ready
        } else {
            GateState::Cooling
        }
    }

    pub fn is_ready(&self, now: f64) -> bool {
        self.state(now) == GateState::Ready
    }

    pub fn next_attack_time(&self) -> f64 {
        self.next_attack_time
    }

    pub fn cooldown(&self) -> f64 {
        self.cooldown
    }

    /// Start cooling from `now`. The timestamp never moves backwards.
    pub fn trigger(&mut self, now: f64) {
        self.next_attack_time = self.next_attack_time.max(now + self.cooldown);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Knockback {
    pub radius: f32,
    /// Impulse magnitude per body
    pub force: f32,
    pub tag: Tag,
}

impl From<&BotConfig> for Knockback {
    fn from(config: &BotConfig) -> Self {
        Self {
            radius: config.knockback_radius,
            force: config.knockback_force,
            tag: config.ball_tag,
        }
    }
}

impl From<&PlayerConfig> for Knockback {
    fn from(config: &PlayerConfig) -> Self {
        Self {
            radius: config.knockback_radius,
            force: config.knockback_force,
            tag: config.ball_tag,
        }
    }
}

/// Bot attack tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackParams {
    pub attack_radius: f32,
    pub knockback: Knockback,
    /// Diagnostic only: fire every tick, no cooldown, no range check
    pub always_attack: bool,
}

impl From<&BotConfig> for AttackParams {
    fn from(config: &BotConfig) -> Self {
        Self {
            attack_radius: config.attack_radius,
            knockback: Knockback::from(config),
            always_attack: config.always_attack,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttackOutcome {
    Fired { hits: Vec<BodyId>, forced: bool },
    CoolingDown,
    NoTarget,
}

impl AttackOutcome {
    pub fn fired(&self) -> bool {
        matches!(self, AttackOutcome::Fired { .. })
    }
}

/// First candidate (in id order) within planar `radius` of the agent
pub fn first_in_range(world: &World, agent: BodyId, radius: f32, tag: Tag) -> Option<BodyId> {
    let origin = world.get(agent)?.pos;
    world
        .overlap_sphere(origin, radius, None)
        .into_iter()
        .find(|&id| {
            world.get(id).is_some_and(|body| {
                is_candidate(agent, body, tag) && planar_distance(origin, body.pos) <= radius
            })
        })
}

/// Push every candidate within the knockback radius straight away from the
/// agent on the horizontal plane. Returns the bodies hit.
pub fn apply_knockback(world: &mut World, agent: BodyId, knockback: &Knockback) -> Vec<BodyId> {
    let Some(origin) = world.get(agent).map(|b| b.pos) else {
        return Vec::new();
    };

    let mut hits = Vec::new();
    for id in world.overlap_sphere(origin, knockback.radius, None) {
        let Some(body) = world.get(id) else { continue };
        if !is_candidate(agent, body, knockback.tag) {
            continue;
        }
        let direction = planar_direction(origin, body.pos);
        world.add_impulse(id, direction * knockback.force);
        hits.push(id);
    }
    hits
}

/// Bot attack for one tick
pub fn try_auto_attack(
    gate: &mut AttackGate,
    world: &mut World,
    agent: BodyId,
    params: &AttackParams,
    now: f64,
) -> AttackOutcome {
    if params.always_attack {
        log::debug!("Forced attack from {agent:?}");
        let hits = apply_knockback(world, agent, &params.knockback);
        return AttackOutcome::Fired { hits, forced: true };
    }

    if !gate.is_ready(now) {
        return AttackOutcome::CoolingDown;
    }

    if first_in_range(world, agent, params.attack_radius, params.knockback.tag).is_none() {
        return AttackOutcome::NoTarget;
    }

    gate.trigger(now);
    let hits = apply_knockback(world, agent, &params.knockback);
    log::debug!("{agent:?} knocked back {} projectiles", hits.len());
    AttackOutcome::Fired {
        hits,
        forced: false,
    }
}

/// Input-triggered attack: fires whenever the gate is ready, no range check
pub fn try_manual_attack(
    gate: &mut AttackGate,
    world: &mut World,
    agent: BodyId,
    knockback: &Knockback,
    now: f64,
) -> AttackOutcome {
    if !gate.is_ready(now) {
        return AttackOutcome::CoolingDown;
    }
    gate.trigger(now);
    AttackOutcome::Fired {
        hits: apply_knockback(world, agent, knockback),
        forced: false,
    }
}

/// Planar unit vector from `from` toward `to`, zero when they coincide
pub fn planar_direction(from: Vec3, to: Vec3) -> Vec3 {
    let mut d = to - from;
    d.y = 0.0;
    d.normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::world::{Body, BodyKind};

    fn params() -> AttackParams {
        AttackParams {
            attack_radius: 3.0,
            knockback: Knockback {
                radius: 5.0,
                force: 10.0,
                tag: Tag::DefaultBall,
            },
            always_attack: false,
        }
    }

    fn arena() -> (World, BodyId) {
        let mut world = World::new(1);
        let agent = world.insert(Body::agent(BodyKind::Bot, Vec3::ZERO));
        (world, agent)
    }

    fn ball(world: &mut World, pos: Vec3) -> BodyId {
        world.insert(Body::projectile(pos, Tag::DefaultBall))
    }

    #[test]
    fn test_gate_starts_ready() {
        let gate = AttackGate::new(1.5);
        assert_eq!(gate.state(0.0), GateState::Ready);
        assert_eq!(gate.next_attack_time(), 0.0);
    }

    #[test]
    fn test_trigger_radius_and_effect_radius_are_independent() {
        let (mut world, agent) = arena();
        let inner = ball(&mut world, Vec3::new(2.0, 0.0, 0.0));
        let outer = ball(&mut world, Vec3::new(0.0, 0.0, -4.0));
        let mut gate = AttackGate::new(1.5);

        let outcome = try_auto_attack(&mut gate, &mut world, agent, &params(), 0.0);

        assert_eq!(
            outcome,
            AttackOutcome::Fired {
                hits: vec![inner, outer],
                forced: false,
            }
        );
        assert_eq!(world.get(inner).unwrap().vel, Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(world.get(outer).unwrap().vel, Vec3::new(0.0, 0.0, -10.0));
    }

    #[test]
    fn test_nothing_in_trigger_radius_does_not_fire() {
        let (mut world, agent) = arena();
        let outer = ball(&mut world, Vec3::new(4.0, 0.0, 0.0));
        let mut gate = AttackGate::new(1.5);

        let outcome = try_auto_attack(&mut gate, &mut world, agent, &params(), 0.0);

        assert_eq!(outcome, AttackOutcome::NoTarget);
        assert_eq!(world.get(outer).unwrap().vel, Vec3::ZERO);
        assert!(gate.is_ready(0.0));
    }

    #[test]
    fn test_cooldown_allows_one_attack_per_window() {
        let (mut world, agent) = arena();
        let target = ball(&mut world, Vec3::new(1.0, 0.0, 0.0));
        let mut gate = AttackGate::new(1.5);

        assert!(try_auto_attack(&mut gate, &mut world, agent, &params(), 10.0).fired());
        assert_eq!(
            try_auto_attack(&mut gate, &mut world, agent, &params(), 11.0),
            AttackOutcome::CoolingDown
        );
        assert_eq!(world.get(target).unwrap().vel.x, 10.0);
        assert_eq!(gate.state(11.0), GateState::Cooling);

        // Put the ball back in range and wait out the cooldown
        world.get_mut(target).unwrap().vel = Vec3::ZERO;
        assert!(try_auto_attack(&mut gate, &mut world, agent, &params(), 11.5).fired());
        assert_eq!(world.get(target).unwrap().vel.x, 10.0);
        assert_eq!(gate.next_attack_time(), 13.0);
    }

    #[test]
    fn test_height_does_not_count_toward_trigger_range() {
        let (mut world, agent) = arena();
        // Planar distance 2, 1.5 up: the overlap sphere of radius 3 still reaches it
        let lifted = ball(&mut world, Vec3::new(2.0, 1.5, 0.0));
        let mut gate = AttackGate::new(1.0);

        let outcome = try_auto_attack(&mut gate, &mut world, agent, &params(), 0.0);
        assert_eq!(
            outcome,
            AttackOutcome::Fired {
                hits: vec![lifted],
                forced: false,
            }
        );
        // Knockback is flat
        assert_eq!(world.get(lifted).unwrap().vel.y, 0.0);
    }

    #[test]
    fn test_knockback_skips_agents_and_untagged() {
        let (mut world, agent) = arena();
        let other_bot = world.insert(Body::agent(BodyKind::Bot, Vec3::new(1.0, 0.0, 0.0)));
        let rock = world.insert(Body::projectile(Vec3::new(0.0, 0.0, 1.0), Tag::Untagged));

        let hits = apply_knockback(&mut world, agent, &params().knockback);
        assert!(hits.is_empty());
        assert_eq!(world.get(other_bot).unwrap().vel, Vec3::ZERO);
        assert_eq!(world.get(rock).unwrap().vel, Vec3::ZERO);
        assert_eq!(world.get(agent).unwrap().vel, Vec3::ZERO);
    }

    #[test]
    fn test_always_attack_ignores_cooldown_and_range() {
        let (mut world, agent) = arena();
        let outer = ball(&mut world, Vec3::new(4.5, 0.0, 0.0));
        let mut gate = AttackGate::new(100.0);
        let mut p = params();
        p.always_attack = true;

        for tick in 0..3 {
            let outcome = try_auto_attack(&mut gate, &mut world, agent, &p, tick as f64 * 0.02);
            assert_eq!(
                outcome,
                AttackOutcome::Fired {
                    hits: vec![outer],
                    forced: true,
                }
            );
        }
        assert_eq!(world.get(outer).unwrap().vel.x, 30.0);
        assert!(gate.is_ready(0.0));
    }

    #[test]
    fn test_manual_attack_needs_no_target_in_range() {
        let (mut world, agent) = arena();
        let mut gate = AttackGate::new(0.5);
        let kb = params().knockback;

        assert_eq!(
            try_manual_attack(&mut gate, &mut world, agent, &kb, 1.0),
            AttackOutcome::Fired {
                hits: Vec::new(),
                forced: false,
            }
        );
        assert_eq!(
            try_manual_attack(&mut gate, &mut world, agent, &kb, 1.2),
            AttackOutcome::CoolingDown
        );
        assert!(try_manual_attack(&mut gate, &mut world, agent, &kb, 1.5).fired());
    }

    #[test]
    fn test_trigger_is_monotonic() {
        let mut gate = AttackGate::new(2.0);
        gate.trigger(10.0);
        gate.trigger(5.0);
        assert_eq!(gate.next_attack_time(), 12.0);
    }

    #[test]
    fn test_planar_direction() {
        let d = planar_direction(Vec3::ZERO, Vec3::new(3.0, 9.0, 4.0));
        assert!((d - Vec3::new(0.6, 0.0, 0.8)).length() < 1e-6);
        assert_eq!(planar_direction(Vec3::ONE, Vec3::ONE), Vec3::ZERO);
    }
}
