//! Bot and player controllers
//!
//! Both are built from the same two capabilities, [`Locomotion`] and
//! [`AttackGate`]. They differ only in where movement comes from (targeting
//! vs. input) and how the lateral axis is bounded.

use super::attack::{
    AttackGate, AttackOutcome, AttackParams, Knockback, try_auto_attack, try_manual_attack,
};
use super::locomotion::Locomotion;
use super::state::SimEvent;
use super::targeting::{self, MoveCommand, TargetingParams};
use super::world::{Body, BodyId, BodyKind, World};
use crate::input::InputProvider;
use crate::settings::{BotConfig, PlayerConfig};

/// Autonomous interceptor
#[derive(Debug, Clone)]
pub struct BotController {
    pub name: String,
    pub body: BodyId,
    targeting: TargetingParams,
    attack: AttackParams,
    locomotion: Locomotion,
    gate: AttackGate,
    current_target: Option<BodyId>,
    last_command: MoveCommand,
}

impl BotController {
    /// Insert the bot's body into the world and build its controller
    pub fn spawn(world: &mut World, config: &BotConfig) -> Self {
        let body = world.insert(Body::agent(BodyKind::Bot, config.spawn));
        Self {
            name: config.name.clone(),
            body,
            targeting: TargetingParams::from(config),
            attack: AttackParams::from(config),
            locomotion: Locomotion::bot(config.movement_axis),
            gate: AttackGate::new(f64::from(config.attack_cooldown)),
            current_target: None,
            last_command: MoveCommand::Hold,
        }
    }

    pub fn current_target(&self) -> Option<BodyId> {
        self.current_target
    }

    pub fn last_command(&self) -> MoveCommand {
        self.last_command
    }

    pub fn gate(&self) -> &AttackGate {
        &self.gate
    }

    /// Decide, move, then attack
    pub fn fixed_update(&mut self, world: &mut World, now: f64, events: &mut Vec<SimEvent>) {
        let command = targeting::decide(world, self.body, &self.targeting);
        self.current_target = command.target();
        self.last_command = command;
        if let Some(body) = world.get_mut(self.body) {
            self.locomotion
                .apply(body, command.direction(), command.speed());
        }

        let outcome = try_auto_attack(&mut self.gate, world, self.body, &self.attack, now);
        if let AttackOutcome::Fired { hits, forced } = outcome {
            if !forced {
                self.current_target = None;
            }
            events.push(SimEvent::Attack {
                agent: self.body,
                hits,
                forced,
            });
        }
    }
}

/// Input-driven agent
#[derive(Debug, Clone)]
pub struct PlayerController {
    pub body: BodyId,
    move_speed: f32,
    sprint_multiplier: f32,
    locomotion: Locomotion,
    knockback: Knockback,
    gate: AttackGate,
}

impl PlayerController {
    pub fn spawn(world: &mut World, config: &PlayerConfig) -> Self {
        let body = world.insert(Body::agent(BodyKind::Player, config.spawn));
        Self {
            body,
            move_speed: config.move_speed,
            sprint_multiplier: config.sprint_multiplier,
            locomotion: Locomotion::player(
                config.movement_axis,
                config.move_bounds,
                config.lateral_bounds,
            ),
            knockback: Knockback::from(config),
            gate: AttackGate::new(f64::from(config.attack_cooldown)),
        }
    }

    pub fn gate(&self) -> &AttackGate {
        &self.gate
    }

    pub fn fixed_update(
        &mut self,
        world: &mut World,
        input: &impl InputProvider,
        now: f64,
        events: &mut Vec<SimEvent>,
    ) {
        let mut speed = self.move_speed;
        if input.sprint_active() {
            speed *= self.sprint_multiplier;
        }
        if let Some(body) = world.get_mut(self.body) {
            self.locomotion.apply(body, input.horizontal_axis(), speed);
        }

        if input.attack_pressed() {
            let outcome = try_manual_attack(&mut self.gate, world, self.body, &self.knockback, now);
            if let AttackOutcome::Fired { hits, forced } = outcome {
                events.push(SimEvent::Attack {
                    agent: self.body,
                    hits,
                    forced,
                });
            }
        }
    }

    /// Keep the player inside its bounds after the physics step
    pub fn post_integrate(&self, world: &mut World) {
        if let Some(body) = world.get_mut(self.body) {
            self.locomotion.post_integrate(body);
        }
    }
}
