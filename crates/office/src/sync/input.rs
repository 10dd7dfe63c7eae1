use std::time::Duration;

use bitflags::bitflags;
use glam::Vec2;

use crate::presence::{LocalParticipant, MotionState};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MoveInput: u8 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const UP = 1 << 2;
        const DOWN = 1 << 3;
    }
}

impl MoveInput {
    /// Left wins over right and up over down. Axes are not normalised.
    pub fn velocity(self, speed: f32) -> Vec2 {
        let x = if self.contains(Self::LEFT) {
            -speed
        } else if self.contains(Self::RIGHT) {
            speed
        } else {
            0.0
        };
        let y = if self.contains(Self::UP) {
            -speed
        } else if self.contains(Self::DOWN) {
            speed
        } else {
            0.0
        };
        Vec2::new(x, y)
    }

    pub fn is_moving(self) -> bool {
        !self.is_empty()
    }

    /// Facing after this input, or `None` when horizontal facing is unchanged.
    pub fn facing(self) -> Option<bool> {
        if self.contains(Self::LEFT) {
            Some(true)
        } else if self.contains(Self::RIGHT) {
            Some(false)
        } else {
            None
        }
    }

    pub fn apply(self, local: &mut LocalParticipant, dt: Duration, speed: f32) {
        local.position += self.velocity(speed) * dt.as_secs_f32();
        if let Some(flip_x) = self.facing() {
            local.flip_x = flip_x;
        }
        local.motion = if self.is_moving() {
            MotionState::Walk
        } else {
            MotionState::Idle
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_has_priority_and_flips() {
        let mut local = LocalParticipant::new(1, "a");
        let start = local.position;

        (MoveInput::LEFT | MoveInput::RIGHT).apply(&mut local, Duration::from_secs(1), 125.0);

        assert_eq!(local.position, start + Vec2::new(-125.0, 0.0));
        assert!(local.flip_x);
        assert_eq!(local.motion, MotionState::Walk);
    }

    #[test]
    fn vertical_keeps_facing() {
        let mut local = LocalParticipant::new(1, "a");
        local.flip_x = true;

        (MoveInput::UP | MoveInput::DOWN).apply(&mut local, Duration::from_millis(100), 100.0);

        assert!(local.flip_x);
        assert!((local.position.y - (64.0 - 10.0)).abs() < 0.001);

        MoveInput::RIGHT.apply(&mut local, Duration::ZERO, 100.0);
        assert!(!local.flip_x);
    }

    #[test]
    fn diagonal_is_not_normalised() {
        let velocity = (MoveInput::RIGHT | MoveInput::DOWN).velocity(125.0);
        assert_eq!(velocity, Vec2::new(125.0, 125.0));
    }

    #[test]
    fn no_input_is_idle() {
        let mut local = LocalParticipant::new(1, "a");
        local.motion = MotionState::Walk;
        MoveInput::empty().apply(&mut local, Duration::from_millis(16), 125.0);
        assert_eq!(local.motion, MotionState::Idle);
        assert_eq!(local.position, crate::presence::SPAWN_POSITION);
    }
}
