//! Targeting and interception
//!
//! Each tick a bot scans the world around it, keeps the nearest eligible
//! projectile, and slides toward it along its movement axis. If that
//! projectile is heading at the bot fast enough to arrive before the bot
//! could cover the gap, the bot moves at boosted speed.
//!
//! The race check assumes constant velocity projected onto the movement
//! axis. It is a one-step estimate, not a closing-velocity solve.

use glam::Vec3;

use super::locomotion::MovementAxis;
use super::world::{Body, BodyId, LayerMask, Tag, World};
use crate::consts::APPROACH_EPSILON;
use crate::settings::{BotConfig, Bounds};
use crate::{planar_distance, step_sign};

/// Movement decision for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveCommand {
    Pursue {
        target: BodyId,
        direction: f32,
        speed: f32,
    },
    ReturnToCenter {
        direction: f32,
        speed: f32,
    },
    Hold,
}

impl MoveCommand {
    pub fn direction(&self) -> f32 {
        match *self {
            MoveCommand::Pursue { direction, .. }
            | MoveCommand::ReturnToCenter { direction, .. } => direction,
            MoveCommand::Hold => 0.0,
        }
    }

    pub fn speed(&self) -> f32 {
        match *self {
            MoveCommand::Pursue { speed, .. } | MoveCommand::ReturnToCenter { speed, .. } => speed,
            MoveCommand::Hold => 0.0,
        }
    }

    pub fn target(&self) -> Option<BodyId> {
        match *self {
            MoveCommand::Pursue { target, .. } => Some(target),
            _ => None,
        }
    }
}

/// Targeting tuning, lifted from a [`BotConfig`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetingParams {
    pub axis: MovementAxis,
    pub bounds: Bounds,
    pub search_radius: f32,
    pub min_reach_distance: f32,
    pub max_ball_height: f32,
    pub move_speed: f32,
    pub speed_multiplier: f32,
    pub layer: Option<LayerMask>,
    pub tag: Tag,
}

impl From<&BotConfig> for TargetingParams {
    fn from(config: &BotConfig) -> Self {
        Self {
            axis: config.movement_axis,
            bounds: config.bounds(),
            search_radius: config.search_radius,
            min_reach_distance: config.min_reach_distance,
            max_ball_height: config.max_ball_height,
            move_speed: config.move_speed,
            speed_multiplier: config.speed_multiplier,
            layer: config.ball_layer,
            tag: config.ball_tag,
        }
    }
}

/// Tag match, excluding the agent itself and every other agent
pub fn is_candidate(agent: BodyId, body: &Body, tag: Tag) -> bool {
    body.id != agent && !body.kind.is_agent() && body.tag == tag
}

/// Nearest eligible projectile by planar distance. Ties keep the lowest id.
pub fn find_nearest_candidate(
    world: &World,
    agent: BodyId,
    params: &TargetingParams,
) -> Option<BodyId> {
    let origin = world.get(agent)?.pos;

    let mut nearest = None;
    let mut nearest_distance = f32::MAX;
    for id in world.overlap_sphere(origin, params.search_radius, params.layer) {
        let Some(body) = world.get(id) else { continue };
        if !is_candidate(agent, body, params.tag) {
            continue;
        }
        // Skip projectiles still falling from above
        if body.pos.y > origin.y + params.max_ball_height {
            continue;
        }
        let distance = planar_distance(origin, body.pos);
        if distance > params.search_radius {
            continue;
        }
        if !params.bounds.contains(params.axis.component(body.pos)) {
            continue;
        }
        if distance < nearest_distance {
            nearest_distance = distance;
            nearest = Some(id);
        }
    }
    nearest
}

/// Chase `target`, boosting when it would win the race to the agent
pub fn pursue(agent_pos: Vec3, target: &Body, params: &TargetingParams) -> MoveCommand {
    let target_coord = params.axis.component(target.pos);
    let agent_coord = params.axis.component(agent_pos);
    let distance = (target_coord - agent_coord).abs();
    if distance <= params.min_reach_distance {
        return MoveCommand::Hold;
    }

    let direction = step_sign(target_coord - agent_coord);
    let mut speed = params.move_speed;

    let target_vel = params.axis.component(target.vel);
    let approaching =
        (target_vel < 0.0 && direction > 0.0) || (target_vel > 0.0 && direction < 0.0);
    if approaching && target_vel.abs() > APPROACH_EPSILON {
        let time_for_target = distance / target_vel.abs();
        let time_for_agent = distance / params.move_speed;
        if time_for_target < time_for_agent {
            speed *= params.speed_multiplier;
        }
    }

    MoveCommand::Pursue {
        target: target.id,
        direction,
        speed,
    }
}

/// Head back to coordinate 0 on the movement axis
pub fn return_to_center(agent_pos: Vec3, params: &TargetingParams) -> MoveCommand {
    let coord = params.axis.component(agent_pos);
    if coord.abs() > params.min_reach_distance {
        MoveCommand::ReturnToCenter {
            direction: step_sign(-coord),
            speed: params.move_speed,
        }
    } else {
        MoveCommand::Hold
    }
}

/// Full per-tick decision for the agent body `agent`
pub fn decide(world: &World, agent: BodyId, params: &TargetingParams) -> MoveCommand {
    let Some(agent_body) = world.get(agent) else {
        return MoveCommand::Hold;
    };
    let target = find_nearest_candidate(world, agent, params).and_then(|id| world.get(id));
    match target {
        Some(target) => pursue(agent_body.pos, target, params),
        None => return_to_center(agent_body.pos, params),
    }
}
