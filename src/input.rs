//! Player input abstraction
//!
//! The simulation never polls devices. A platform layer samples whatever it
//! has (keyboard, gamepad, a replay file) into something implementing
//! [`InputProvider`] once per fixed tick.

/// Directional input plus sprint and attack flags
pub trait InputProvider {
    /// Horizontal axis in [-1, 1]
    fn horizontal_axis(&self) -> f32;
    fn sprint_active(&self) -> bool;
    /// Level-triggered: held attack keeps requesting, the cooldown gates it
    fn attack_pressed(&self) -> bool;
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    pub horizontal: f32,
    pub sprint: bool,
    pub attack: bool,
}

impl TickInput {
    pub fn moving(horizontal: f32) -> Self {
        Self {
            horizontal,
            ..Default::default()
        }
    }
}

impl InputProvider for TickInput {
    fn horizontal_axis(&self) -> f32 {
        self.horizontal.clamp(-1.0, 1.0)
    }

    fn sprint_active(&self) -> bool {
        self.sprint
    }

    fn attack_pressed(&self) -> bool {
        self.attack
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_axis_is_clamped() {
        assert_eq!(TickInput::moving(3.0).horizontal_axis(), 1.0);
        assert_eq!(TickInput::moving(-7.5).horizontal_axis(), -1.0);
        assert_eq!(TickInput::moving(0.25).horizontal_axis(), 0.25);
    }
}
