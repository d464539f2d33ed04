use std::f32::consts::{FRAC_PI_2, PI};

use nalgebra::{vector, Rotation3, Vector3};

use crate::input::{InputState, Key};

/// Scale applied to velocity every tick so motion decays without input.
const FRICTION_DEFAULT: f32 = 0.9;
/// Velocity magnitude cap; scaled up by the sprint factor.
const VELOCITY_MAX_DEFAULT: f32 = 10.0;
/// The effective near plane shifts by (1 - sprint) / WARP_FACTOR while
/// sprinting, widening the field of view slightly.
const WARP_FACTOR: f32 = 16.0;

/// Free-flying camera driven by a velocity integrator. No internal state
/// machine - every tick reads the held-key set and mutates position, velocity
/// and the effective near plane in place.
pub struct Camera {
    pub position: Vector3<f32>,
    /// Radians per axis; x is pitch, y is yaw.
    pub rotation: Vector3<f32>,
    pub velocity: Vector3<f32>,
    pub acceleration: Vector3<f32>,
    pub z_near_base: f32,
    pub z_near: f32,
    pub friction: f32,
    pub velocity_max: f32,
    pub reading_mouse: bool,
}

impl Camera {
    pub fn new(position: Vector3<f32>, rotation: Vector3<f32>, z_near: f32) -> Camera {
        return Camera {
            position,
            rotation,
            velocity: Vector3::zeros(),
            acceleration: vector![10.0, 10.0, 10.0],
            z_near_base: z_near,
            z_near,
            friction: FRICTION_DEFAULT,
            velocity_max: VELOCITY_MAX_DEFAULT,
            reading_mouse: true,
        };
    }

    /// Integrates one tick of movement from the currently held keys.
    pub fn tick(&mut self, input: &InputState) {
        let sprint_scale: f32 = if input.is_pressed(Key::Sprint) { 2.0 } else { 1.0 };
        self.z_near = self.z_near_base * (1.0 + (1.0 - sprint_scale) / WARP_FACTOR);

        // Strafe and forward steps are rotated by the yaw so movement follows
        // the view direction. Vertical movement stays world-aligned.
        let yaw = Rotation3::from_axis_angle(&Vector3::y_axis(), -self.rotation.y);
        let step_x = (yaw * vector![self.acceleration.x, 0.0, 0.0]) * sprint_scale;
        let step_y = vector![0.0, self.acceleration.y, 0.0] * sprint_scale;
        let step_z = (yaw * vector![0.0, 0.0, self.acceleration.z]) * sprint_scale;

        if input.is_pressed(Key::Left) {
            self.velocity -= step_x;
        }
        if input.is_pressed(Key::Right) {
            self.velocity += step_x;
        }
        if input.is_pressed(Key::Forward) {
            self.velocity += step_z;
        }
        if input.is_pressed(Key::Back) {
            self.velocity -= step_z;
        }
        if input.is_pressed(Key::Up) {
            self.velocity -= step_y;
        }
        if input.is_pressed(Key::Down) {
            self.velocity += step_y;
        }

        let total = self.velocity.norm();
        let cap = self.velocity_max * sprint_scale;
        if total > cap {
            self.velocity *= cap / total;
        }

        self.position += self.velocity;
        self.velocity *= self.friction;
    }

    /// Applies mouse movement as rotation, proportional to one full turn over
    /// the viewport size in each axis. Pitch is clamped to +-90 degrees so the
    /// view cannot invert. Does nothing while mouse reading is toggled off.
    pub fn apply_mouse(&mut self, dx: f32, dy: f32, viewport_w: f32, viewport_h: f32) {
        if !self.reading_mouse {
            return;
        }

        let full_turn = 2.0 * PI;
        self.rotation.x += full_turn * dy / viewport_h;
        self.rotation.y += full_turn * dx / viewport_w;
        self.rotation.x = self.rotation.x.clamp(-FRAC_PI_2, FRAC_PI_2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unclamped_camera() -> Camera {
        let mut camera = Camera::new(Vector3::zeros(), Vector3::zeros(), 500.0);
        camera.friction = 1.0;
        camera.velocity_max = f32::MAX;
        return camera;
    }

    #[test]
    fn held_key_moves_monotonically_along_view_axis() {
        let mut camera = unclamped_camera();
        let mut input = InputState::new();
        input.set_pressed(Key::Forward, true);

        let mut last_z = 0.0;
        for _ in 0..5 {
            camera.tick(&input);
            assert!(camera.position.z > last_z);
            last_z = camera.position.z;
        }
        // No sideways drift with a zero yaw.
        assert_relative_eq!(camera.position.x, 0.0);
        assert_relative_eq!(camera.position.y, 0.0);
    }

    #[test]
    fn velocity_decays_geometrically_after_release() {
        let mut camera = unclamped_camera();
        camera.friction = 0.5;
        let mut input = InputState::new();
        input.set_pressed(Key::Forward, true);
        camera.tick(&input);
        input.set_pressed(Key::Forward, false);

        let initial = camera.velocity.z;
        for i in 1..=4 {
            camera.tick(&input);
            assert_relative_eq!(
                camera.velocity.z,
                initial * 0.5_f32.powi(i),
                epsilon = 1e-4
            );
        }
    }

    #[test]
    fn velocity_magnitude_is_clamped() {
        let mut camera = Camera::new(Vector3::zeros(), Vector3::zeros(), 500.0);
        camera.velocity_max = 5.0;
        let mut input = InputState::new();
        input.set_pressed(Key::Forward, true);
        for _ in 0..20 {
            camera.tick(&input);
        }
        assert!(camera.velocity.norm() <= 5.0 + 1e-3);
    }

    #[test]
    fn sprint_widens_near_plane() {
        let mut camera = Camera::new(Vector3::zeros(), Vector3::zeros(), 500.0);
        let mut input = InputState::new();
        camera.tick(&input);
        assert_relative_eq!(camera.z_near, 500.0);
        input.set_pressed(Key::Sprint, true);
        camera.tick(&input);
        assert_relative_eq!(camera.z_near, 500.0 * (1.0 - 1.0 / 16.0));
    }

    #[test]
    fn pitch_clamps_at_quarter_turn() {
        let mut camera = Camera::new(Vector3::zeros(), Vector3::zeros(), 500.0);
        camera.apply_mouse(0.0, 10_000.0, 800.0, 600.0);
        assert_relative_eq!(camera.rotation.x, FRAC_PI_2);
        camera.apply_mouse(0.0, -100_000.0, 800.0, 600.0);
        assert_relative_eq!(camera.rotation.x, -FRAC_PI_2);
    }

    #[test]
    fn mouse_ignored_while_not_reading() {
        let mut camera = Camera::new(Vector3::zeros(), Vector3::zeros(), 500.0);
        camera.reading_mouse = false;
        camera.apply_mouse(100.0, 100.0, 800.0, 600.0);
        assert_eq!(camera.rotation.norm(), 0.0);
    }
}
