//! Physical world shared by emitters and agents
//!
//! Bodies are stored in ascending id order so every query iterates in a
//! stable order. The world owns the launch RNG and the emitter registry.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::emitter::Emitter;
use crate::consts::*;
use crate::settings::{ArenaConfig, SpeedLimits};

/// Stable body handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// Emitter handle (index into the registry)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmitterId(pub u32);

/// Gameplay tag carried by a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tag {
    #[default]
    Untagged,
    DefaultBall,
}

/// Bit set of physics layers (bit n = layer n)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    pub fn single(layer: u8) -> Self {
        Self(1u32.checked_shl(u32::from(layer)).unwrap_or(0))
    }

    pub fn contains(&self, layer: u8) -> bool {
        self.0 & Self::single(layer).0 != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    Projectile,
    Bot,
    Player,
}

impl BodyKind {
    pub fn is_agent(self) -> bool {
        matches!(self, BodyKind::Bot | BodyKind::Player)
    }
}

/// A rigid sphere
#[derive(Debug, Clone)]
pub struct Body {
    pub id: BodyId,
    pub kind: BodyKind,
    pub tag: Tag,
    pub layer: u8,
    pub pos: Vec3,
    pub vel: Vec3,
    pub mass: f32,
    pub radius: f32,
}

impl Body {
    pub fn projectile(pos: Vec3, tag: Tag) -> Self {
        Self {
            id: BodyId(0),
            kind: BodyKind::Projectile,
            tag,
            layer: 0,
            pos,
            vel: Vec3::ZERO,
            mass: PROJECTILE_MASS,
            radius: PROJECTILE_RADIUS,
        }
    }

    pub fn agent(kind: BodyKind, pos: Vec3) -> Self {
        Self {
            id: BodyId(0),
            kind,
            tag: Tag::Untagged,
            layer: 0,
            pos,
            vel: Vec3::ZERO,
            mass: AGENT_MASS,
            radius: AGENT_RADIUS,
        }
    }

    pub fn with_vel(mut self, vel: Vec3) -> Self {
        self.vel = vel;
        self
    }
}

/// The simulated physical world
#[derive(Debug, Clone)]
pub struct World {
    bodies: Vec<Body>,
    emitters: Vec<Option<Emitter>>,
    pub(crate) rng: Pcg32,
    pub gravity: f32,
    pub floor_height: f32,
    pub despawn_distance: f32,
    pub projectile_speed: Option<SpeedLimits>,
    next_id: u32,
}

impl World {
    pub fn new(seed: u64) -> Self {
        Self {
            bodies: Vec::new(),
            emitters: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            gravity: DEFAULT_GRAVITY,
            floor_height: 0.0,
            despawn_distance: f32::INFINITY,
            projectile_speed: None,
            next_id: 1,
        }
    }

    /// World with physics settings and emitters from the arena config
    pub fn from_config(config: &ArenaConfig) -> Self {
        let mut world = Self::new(config.seed);
        world.gravity = config.gravity;
        world.floor_height = config.world.floor_height;
        world.despawn_distance = config.world.despawn_distance;
        world.projectile_speed = config.world.projectile_speed;
        for emitter in &config.emitters {
            world.add_emitter(Emitter::from_config(emitter));
        }
        world
    }

    /// Insert a body, assigning it a fresh id
    pub fn insert(&mut self, mut body: Body) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        body.id = id;
        self.bodies.push(body);
        id
    }

    pub fn remove(&mut self, id: BodyId) -> Option<Body> {
        let index = self.index_of(id)?;
        Some(self.bodies.remove(index))
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.index_of(id).map(|i| &self.bodies[i])
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.index_of(id).map(move |i| &mut self.bodies[i])
    }

    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter()
    }

    pub fn projectile_count(&self) -> usize {
        self.bodies
            .iter()
            .filter(|b| b.kind == BodyKind::Projectile)
            .count()
    }

    fn index_of(&self, id: BodyId) -> Option<usize> {
        self.bodies.binary_search_by_key(&id, |b| b.id).ok()
    }

    pub fn add_emitter(&mut self, emitter: Emitter) -> EmitterId {
        let id = EmitterId(self.emitters.len() as u32);
        self.emitters.push(Some(emitter));
        id
    }

    /// Take an emitter out of the world; batches referencing it are skipped
    pub fn remove_emitter(&mut self, id: EmitterId) -> Option<Emitter> {
        self.emitters.get_mut(id.0 as usize).and_then(Option::take)
    }

    pub fn emitter(&self, id: EmitterId) -> Option<&Emitter> {
        self.emitters.get(id.0 as usize).and_then(Option::as_ref)
    }

    pub fn emitter_id(&self, name: &str) -> Option<EmitterId> {
        self.emitters
            .iter()
            .position(|e| e.as_ref().is_some_and(|e| e.name == name))
            .map(|i| EmitterId(i as u32))
    }

    /// Ids of bodies whose sphere intersects the query sphere, in id order.
    /// A `None` mask searches every layer.
    pub fn overlap_sphere(
        &self,
        center: Vec3,
        radius: f32,
        mask: Option<LayerMask>,
    ) -> Vec<BodyId> {
        self.bodies
            .iter()
            .filter(|b| mask.is_none_or(|m| m.contains(b.layer)))
            .filter(|b| b.pos.distance(center) <= radius + b.radius)
            .map(|b| b.id)
            .collect()
    }

    /// Instant velocity change of `impulse / mass`
    pub fn add_impulse(&mut self, id: BodyId, impulse: Vec3) -> bool {
        match self.get_mut(id) {
            Some(body) => {
                body.vel += impulse / body.mass;
                true
            }
            None => false,
        }
    }

    /// Advance every body by `dt`: gravity, projectile speed limits, motion, floor
    pub fn integrate(&mut self, dt: f32) {
        let gravity = Vec3::NEG_Y * self.gravity;
        let speed_limits = self.projectile_speed;
        for body in &mut self.bodies {
            body.vel += gravity * dt;

            if body.kind == BodyKind::Projectile {
                if let Some(limits) = speed_limits {
                    body.vel = limit_speed(body.vel, limits);
                }
            }

            body.pos += body.vel * dt;

            // Resting contact with the floor plane
            let lowest = self.floor_height + body.radius;
            if body.pos.y < lowest {
                body.pos.y = lowest;
                if body.vel.y < 0.0 {
                    body.vel.y = 0.0;
                }
            }
        }
    }

    /// Remove projectiles that left the arena, returning their ids
    pub fn despawn_out_of_bounds(&mut self) -> Vec<BodyId> {
        let limit = self.despawn_distance;
        let mut removed = Vec::new();
        self.bodies.retain(|b| {
            let gone = b.kind == BodyKind::Projectile && crate::planar(b.pos).length() > limit;
            if gone {
                removed.push(b.id);
            }
            !gone
        });
        removed
    }
}

/// Rescale a moving body's velocity into `[min, max]` speed
pub fn limit_speed(vel: Vec3, limits: SpeedLimits) -> Vec3 {
    let speed = vel.length();
    if speed <= REST_SPEED {
        return vel;
    }
    if speed < limits.min {
        vel / speed * limits.min
    } else if speed > limits.max {
        vel / speed * limits.max
    } else {
        vel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        let mut world = World::new(7);
        world.gravity = 0.0;
        world
    }

    #[test]
    fn test_ids_are_ordered_and_stable() {
        let mut world = world();
        let a = world.insert(Body::projectile(Vec3::ZERO, Tag::DefaultBall));
        let b = world.insert(Body::projectile(Vec3::X, Tag::DefaultBall));
        let c = world.insert(Body::projectile(Vec3::Z, Tag::DefaultBall));
        assert!(a < b && b < c);

        world.remove(b);
        assert!(world.get(b).is_none());
        assert_eq!(world.get(c).map(|body| body.pos), Some(Vec3::Z));
    }

    #[test]
    fn test_overlap_sphere_counts_body_radius() {
        let mut world = world();
        let inside = world.insert(Body::projectile(Vec3::new(2.0, 0.0, 0.0), Tag::DefaultBall));
        // Center 3.2 away, radius 0.25 reaches in to 2.95
        let touching = world.insert(Body::projectile(Vec3::new(3.2, 0.0, 0.0), Tag::DefaultBall));
        world.insert(Body::projectile(Vec3::new(4.0, 0.0, 0.0), Tag::DefaultBall));

        let hits = world.overlap_sphere(Vec3::ZERO, 3.0, None);
        assert_eq!(hits, vec![inside, touching]);
    }

    #[test]
    fn test_overlap_sphere_layer_filter() {
        let mut world = world();
        let mut ball = Body::projectile(Vec3::X, Tag::DefaultBall);
        ball.layer = 3;
        let on_three = world.insert(ball);
        world.insert(Body::projectile(Vec3::Z, Tag::DefaultBall));

        let hits = world.overlap_sphere(Vec3::ZERO, 5.0, Some(LayerMask::single(3)));
        assert_eq!(hits, vec![on_three]);
        assert_eq!(world.overlap_sphere(Vec3::ZERO, 5.0, None).len(), 2);
    }

    #[test]
    fn test_impulse_divides_by_mass() {
        let mut world = world();
        let mut ball = Body::projectile(Vec3::ZERO, Tag::DefaultBall);
        ball.mass = 4.0;
        let id = world.insert(ball);

        assert!(world.add_impulse(id, Vec3::new(8.0, 0.0, 0.0)));
        assert_eq!(world.get(id).map(|b| b.vel), Some(Vec3::new(2.0, 0.0, 0.0)));
        assert!(!world.add_impulse(BodyId(999), Vec3::X));
    }

    #[test]
    fn test_speed_limits() {
        let limits = SpeedLimits { min: 5.0, max: 12.0 };
        assert!((limit_speed(Vec3::new(100.0, 0.0, 0.0), limits).length() - 12.0).abs() < 1e-4);
        assert!((limit_speed(Vec3::new(0.0, 0.0, 1.0), limits).length() - 5.0).abs() < 1e-4);
        assert_eq!(limit_speed(Vec3::new(7.0, 0.0, 0.0), limits), Vec3::new(7.0, 0.0, 0.0));
        // Resting bodies are left alone
        assert_eq!(limit_speed(Vec3::ZERO, limits), Vec3::ZERO);
    }

    #[test]
    fn test_gravity_and_floor() {
        let mut world = World::new(1);
        let id = world.insert(Body::projectile(Vec3::new(0.0, 0.3, 0.0), Tag::DefaultBall));
        for _ in 0..100 {
            world.integrate(SIM_DT);
        }
        let body = world.get(id).unwrap();
        assert!((body.pos.y - PROJECTILE_RADIUS).abs() < 1e-5);
        assert_eq!(body.vel.y, 0.0);
    }

    #[test]
    fn test_despawn_only_removes_far_projectiles() {
        let mut world = world();
        world.despawn_distance = 10.0;
        let far = world.insert(Body::projectile(Vec3::new(20.0, 0.0, 0.0), Tag::DefaultBall));
        let near = world.insert(Body::projectile(Vec3::new(2.0, 0.0, 0.0), Tag::DefaultBall));
        let agent = world.insert(Body::agent(BodyKind::Bot, Vec3::new(50.0, 0.0, 0.0)));

        assert_eq!(world.despawn_out_of_bounds(), vec![far]);
        assert!(world.get(near).is_some());
        assert!(world.get(agent).is_some());
    }

    #[test]
    fn test_layer_mask() {
        assert!(LayerMask::single(0).contains(0));
        assert!(!LayerMask::single(0).contains(1));
        assert!(LayerMask::ALL.contains(31));
        assert_eq!(LayerMask::single(40), LayerMask(0));
    }
}
