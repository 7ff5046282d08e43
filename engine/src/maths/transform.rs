//! 2D kinematic transform
//!
//! A position/velocity/acceleration/rotation bundle with a per-step
//! semi-implicit Euler integrator. Every moving entity in the
//! simulation (cannon carriage, projectile, particle) embeds and
//! exclusively owns one of these.

use glam::Vec2;

/// Kinematic state integrated once per simulation tick.
///
/// When `rotate_forwards` is set, `rotation` is always re-derived from
/// the velocity's angle instead of being integrated from
/// `angular_velocity` - projectiles use this so they keep facing along
/// their flight path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    /// World position (pixels)
    pub position: Vec2,
    /// Velocity (pixels/second)
    pub velocity: Vec2,
    /// Acceleration (pixels/second^2)
    pub acceleration: Vec2,
    /// Orientation in radians
    pub rotation: f32,
    /// Angular velocity (radians/second), ignored when `rotate_forwards`
    pub angular_velocity: f32,
    /// Derive rotation from the velocity direction each step
    pub rotate_forwards: bool,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            rotation: 0.0,
            angular_velocity: 0.0,
            rotate_forwards: false,
        }
    }
}

impl Transform2D {
    /// Integrate one step of `dt` seconds.
    ///
    /// Semi-implicit Euler: velocity is updated from acceleration
    /// first, then position from the new velocity. Rotation is handled
    /// before the linear terms, matching the rest of the integrator's
    /// fixed ordering.
    pub fn update(&mut self, dt: f32) {
        if self.rotate_forwards {
            self.rotation = self.velocity.to_angle();
        } else {
            self.rotation += self.angular_velocity * dt;
        }

        self.velocity += self.acceleration * dt;
        self.position += self.velocity * dt;
    }
}
