//! Agent locomotion
//!
//! Turns a (direction, speed) command into a velocity along the agent's
//! movement axis. Vertical velocity is always preserved. Bots pin the other
//! planar axis to zero; the player keeps it and is clamped to its bounds
//! after the physics step instead.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::world::Body;
use crate::settings::Bounds;

/// World axis an agent slides along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MovementAxis {
    #[default]
    X,
    Z,
}

impl MovementAxis {
    pub fn component(self, v: Vec3) -> f32 {
        match self {
            MovementAxis::X => v.x,
            MovementAxis::Z => v.z,
        }
    }

    pub fn with_component(self, mut v: Vec3, value: f32) -> Vec3 {
        match self {
            MovementAxis::X => v.x = value,
            MovementAxis::Z => v.z = value,
        }
        v
    }

    /// The other horizontal axis
    pub fn orthogonal(self) -> Self {
        match self {
            MovementAxis::X => MovementAxis::Z,
            MovementAxis::Z => MovementAxis::X,
        }
    }
}

/// How the axis orthogonal to movement is handled
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LateralMode {
    /// Orthogonal velocity forced to zero every command
    Pinned,
    /// Orthogonal velocity untouched; position clamped after integration
    Clamped {
        move_bounds: Option<Bounds>,
        lateral_bounds: Option<Bounds>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Locomotion {
    pub axis: MovementAxis,
    pub lateral: LateralMode,
}

impl Locomotion {
    pub fn bot(axis: MovementAxis) -> Self {
        Self {
            axis,
            lateral: LateralMode::Pinned,
        }
    }

    pub fn player(
        axis: MovementAxis,
        move_bounds: Option<Bounds>,
        lateral_bounds: Option<Bounds>,
    ) -> Self {
        Self {
            axis,
            lateral: LateralMode::Clamped {
                move_bounds,
                lateral_bounds,
            },
        }
    }

    /// Set velocity along the movement axis to `direction * speed`
    pub fn apply(&self, body: &mut Body, direction: f32, speed: f32) {
        let mut vel = self.axis.with_component(body.vel, direction * speed);
        if self.lateral == LateralMode::Pinned {
            vel = self.axis.orthogonal().with_component(vel, 0.0);
        }
        body.vel = vel;
    }

    /// Clamp position to the configured bounds. Returns true if anything moved.
    pub fn post_integrate(&self, body: &mut Body) -> bool {
        let LateralMode::Clamped {
            move_bounds,
            lateral_bounds,
        } = self.lateral
        else {
            return false;
        };

        let mut clamped = false;
        for (axis, bounds) in [
            (self.axis, move_bounds),
            (self.axis.orthogonal(), lateral_bounds),
        ] {
            let Some(bounds) = bounds else { continue };
            let coord = axis.component(body.pos);
            let limited = bounds.clamp(coord);
            if limited != coord {
                body.pos = axis.with_component(body.pos, limited);
                // Stop pushing into the boundary
                if axis.component(body.vel) != 0.0 {
                    body.vel = axis.with_component(body.vel, 0.0);
                }
                clamped = true;
            }
        }
        clamped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::world::BodyKind;

    fn body(pos: Vec3, vel: Vec3) -> Body {
        Body::agent(BodyKind::Bot, pos).with_vel(vel)
    }

    #[test]
    fn test_bot_preserves_vertical_and_pins_lateral() {
        let mut b = body(Vec3::ZERO, Vec3::new(1.0, -3.0, 2.0));
        Locomotion::bot(MovementAxis::X).apply(&mut b, -1.0, 6.0);
        assert_eq!(b.vel, Vec3::new(-6.0, -3.0, 0.0));

        let mut b = body(Vec3::ZERO, Vec3::new(1.0, 4.0, 2.0));
        Locomotion::bot(MovementAxis::Z).apply(&mut b, 1.0, 9.0);
        assert_eq!(b.vel, Vec3::new(0.0, 4.0, 9.0));
    }

    #[test]
    fn test_hold_zeroes_axis_velocity() {
        let mut b = body(Vec3::ZERO, Vec3::new(5.0, 0.0, 0.0));
        Locomotion::bot(MovementAxis::X).apply(&mut b, 0.0, 6.0);
        assert_eq!(b.vel, Vec3::ZERO);
    }

    #[test]
    fn test_player_keeps_lateral_velocity() {
        let mut b = body(Vec3::ZERO, Vec3::new(0.0, 0.0, 2.0));
        Locomotion::player(MovementAxis::X, None, None).apply(&mut b, 1.0, 3.0);
        assert_eq!(b.vel, Vec3::new(3.0, 0.0, 2.0));
    }

    #[test]
    fn test_player_clamp_zeroes_velocity_on_clamped_axis() {
        let loco = Locomotion::player(
            MovementAxis::X,
            Some(Bounds::new(-5.0, 5.0)),
            Some(Bounds::new(-1.0, 1.0)),
        );
        let mut b = body(Vec3::new(5.4, 0.0, 0.5), Vec3::new(7.0, 0.0, 2.0));
        assert!(loco.post_integrate(&mut b));
        assert_eq!(b.pos, Vec3::new(5.0, 0.0, 0.5));
        // Lateral axis was within bounds, so its velocity survives
        assert_eq!(b.vel, Vec3::new(0.0, 0.0, 2.0));

        let mut b = body(Vec3::new(0.0, 0.0, -3.0), Vec3::new(1.0, 0.0, -2.0));
        assert!(loco.post_integrate(&mut b));
        assert_eq!(b.pos.z, -1.0);
        assert_eq!(b.vel, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_bot_has_no_post_clamp() {
        let mut b = body(Vec3::new(100.0, 0.0, 0.0), Vec3::X);
        assert!(!Locomotion::bot(MovementAxis::X).post_integrate(&mut b));
        assert_eq!(b.pos.x, 100.0);
    }
}
