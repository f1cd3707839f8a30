use std::f32::consts::{PI, TAU};

use glam::Vec2;

use crate::controller::ControlState;
use crate::model::Bitmap;

/// Angular speed while a turn key is held, in radians per second
pub const TURN_RATE: f32 = PI;
/// Forward/backward speed in world units per second
pub const MOVE_SPEED: f32 = 40.0;
/// Seconds each animation frame stays on screen (24 fps)
pub const ANIMATION_FRAME_TIME: f32 = 1.0 / 24.0;

/// Read-only view the camera needs to draw something
pub trait Entity {
    type Image;

    fn bitmap(&self) -> &Bitmap<Self::Image>;
    fn position(&self) -> Vec2;
    /// Heading in radians, 0 = +x
    fn direction(&self) -> f32;
}

pub struct Player<I> {
    pub position: Vec2,
    /// Always in [0, TAU)
    direction: f32,
    pub bitmap: Bitmap<I>,
    /// Counts down to the next animation frame
    pub animation_timer: f32,
}

impl<I> Player<I> {
    pub fn new(x: f32, y: f32, bitmap: Bitmap<I>) -> Self {
        Self {
            position: Vec2::new(x, y),
            direction: 0.0,
            bitmap,
            animation_timer: ANIMATION_FRAME_TIME,
        }
    }

    pub fn direction(&self) -> f32 {
        self.direction
    }

    /// Advance one simulation step
    pub fn update(&mut self, controls: &ControlState, dt: f32) {
        if controls.left {
            self.rotate(dt * -TURN_RATE);
        }
        if controls.right {
            self.rotate(dt * TURN_RATE);
        }
        if controls.up {
            self.move_forward(MOVE_SPEED * dt);
        }
        if controls.down {
            self.move_forward(-MOVE_SPEED * dt);
        }

        // At most one frame per step, skipped frames are not caught up
        if self.animation_timer <= 0.0 {
            self.animation_timer += ANIMATION_FRAME_TIME;
            self.bitmap.advance_frame();
        }

        self.animation_timer -= dt;
    }

    /// Move along the current heading; negative distances move backwards
    pub fn move_forward(&mut self, distance: f32) {
        self.position += Vec2::from_angle(self.direction) * distance;
    }

    pub fn rotate(&mut self, angle: f32) {
        self.direction = normalize_angle(self.direction + angle);
    }
}

impl<I> Entity for Player<I> {
    type Image = I;

    fn bitmap(&self) -> &Bitmap<I> {
        &self.bitmap
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn direction(&self) -> f32 {
        self.direction
    }
}

/// Wrap any angle into [0, TAU)
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn player() -> Player<()> {
        Player::new(32.0, 32.0, Bitmap::new((), 16, 16, 4))
    }

    fn held(f: impl FnOnce(&mut ControlState)) -> ControlState {
        let mut state = ControlState::default();
        f(&mut state);
        state
    }

    #[test]
    fn test_rotation_stays_in_range() {
        let angles = [
            -100.0, -TAU, -PI, -1e-7, 0.0, 1e-7, 0.5, PI, TAU, 7.5, 1000.0,
        ];
        let starts = [0.0, 1.0, PI, TAU - 1e-4];

        for start in starts {
            for angle in angles {
                let mut p = player();
                p.rotate(start);
                p.rotate(angle);
                let d = p.direction();
                assert!((0.0..TAU).contains(&d), "start {start} + {angle} gave {d}");
            }
        }
    }

    #[test]
    fn test_left_turns_negative_right_turns_positive() {
        let mut p = player();
        p.update(&held(|s| s.right = true), 0.5);
        assert!((p.direction() - PI / 2.0).abs() < EPS);

        p.update(&held(|s| s.left = true), 1.0);
        assert!((p.direction() - 3.0 * PI / 2.0).abs() < EPS);
    }

    #[test]
    fn test_up_moves_along_heading() {
        let mut p = player();
        p.update(&held(|s| s.up = true), 0.5);
        assert!((p.position.x - 52.0).abs() < EPS);
        assert!((p.position.y - 32.0).abs() < EPS);

        p.rotate(PI / 2.0);
        p.update(&held(|s| s.up = true), 0.25);
        assert!((p.position.x - 52.0).abs() < EPS);
        assert!((p.position.y - 42.0).abs() < EPS);
    }

    #[test]
    fn test_forward_then_backward_returns_home() {
        let mut p = player();
        p.rotate(1.234);
        let start = p.position;

        p.move_forward(17.5);
        p.move_forward(-17.5);

        assert!((p.position - start).length() < EPS);
    }

    #[test]
    fn test_down_is_backwards_not_world_axis() {
        let mut p = player();
        p.rotate(PI);
        p.update(&held(|s| s.down = true), 0.1);
        // Facing -x, so reversing moves toward +x
        assert!((p.position.x - 36.0).abs() < EPS);
        assert!((p.position.y - 32.0).abs() < EPS);
    }

    #[test]
    fn test_animation_cycles_every_frame_time() {
        let mut p = player();
        p.animation_timer = 0.0;

        let mut seen = Vec::new();
        for _ in 0..4 {
            p.update(&ControlState::default(), ANIMATION_FRAME_TIME);
            let frame = p.bitmap.current_frame();
            assert!(frame < p.bitmap.frame_count());
            seen.push(frame);
        }
        assert_eq!(seen, vec![1, 2, 3, 0]);
    }

    #[test]
    fn test_animation_does_not_catch_up() {
        let mut p = player();
        p.animation_timer = 0.0;

        // Half a second would be twelve frames, only one is shown
        p.update(&ControlState::default(), 0.5);
        assert_eq!(p.bitmap.current_frame(), 1);

        p.update(&ControlState::default(), 0.01);
        assert_eq!(p.bitmap.current_frame(), 2);
    }

    #[test]
    fn test_first_update_waits_for_timer() {
        let mut p = player();
        p.update(&ControlState::default(), 0.01);
        assert_eq!(p.bitmap.current_frame(), 0);
    }
}
