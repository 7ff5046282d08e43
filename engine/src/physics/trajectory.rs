//! Ballistic trajectory prediction
//!
//! Predicts where a projectile launched with the current parameters
//! will land, either in closed form (no drag: solve the vertical
//! motion quadratic for the landing time) or by forward simulation
//! (drag: step a kinematic transform until it reaches the ground
//! plane).
//!
//! The no-drag arc is summarized as a single quadratic Bezier curve;
//! the drag arc as a down-sampled polyline. Both report landing point,
//! landing velocity, air time, maximum height, and landing distance.
//!
//! All degenerate inputs (negative discriminant, parallel control
//! rays, launch point already below the ground plane) are substituted
//! with a safe already-grounded or straight-line fallback - prediction
//! never returns NaN and never panics.

use glam::Vec2;
use tracing::warn;

use crate::maths::geometry::{line_intersection, polar, quadratic_bezier};
use crate::maths::transform::Transform2D;
use crate::physics::ballistics::drag_factor;
use crate::physics::constants::{DRAG_ACCUMULATION, GRAVITY, TRAJECTORY_SAMPLE_DIST_SQ};

/// Forward-simulation tuning for drag-mode prediction.
pub mod sim {
    /// Fixed integration timestep (seconds).
    pub const TIME_STEP: f32 = 0.01;
    /// Step cap; reaching it lands the projectile where it is instead
    /// of looping forever on a pathological configuration.
    pub const MAX_STEPS: usize = 100_000;
}

/// A predicted trajectory. Derived state, recomputed in full whenever
/// any launch parameter, the orientation, or the drag flag changes -
/// never partially stale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    /// Where the projectile meets the ground plane
    pub landing_position: Vec2,
    /// Velocity at the landing point
    pub landing_velocity: Vec2,
    /// Control point of the quadratic Bezier summarizing the arc
    pub control_point: Vec2,
    /// Highest point of the arc (minimum y - +y is down)
    pub highest_point: Vec2,
    /// Seconds from launch to landing
    pub air_time: f32,
    /// Height of the arc above the launch point (px, >= 0)
    pub max_height: f32,
    /// Horizontal distance from launch to landing (signed, px)
    pub landing_distance: f32,
    /// Down-sampled position polyline (drag mode only)
    pub sampled_points: Vec<Vec2>,
}

impl Trajectory {
    /// Predict the trajectory of a projectile launched from
    /// `launch_point` at `launch_angle` radians with the given muzzle
    /// velocity.
    ///
    /// # Arguments
    ///
    /// * `ground_height` - y of the ground plane (px, +y down)
    /// * `projectile_radius` - the projectile rests when its center is
    ///   at `ground_height - radius`
    /// * `drag_enabled` - closed form when false, forward simulation
    ///   when true
    pub fn predict(
        launch_point: Vec2,
        launch_angle: f32,
        muzzle_velocity: f32,
        ground_height: f32,
        projectile_radius: f32,
        drag_enabled: bool,
    ) -> Self {
        if drag_enabled {
            Self::simulated(
                launch_point,
                launch_angle,
                muzzle_velocity,
                ground_height,
                projectile_radius,
            )
        } else {
            Self::closed_form(
                launch_point,
                launch_angle,
                muzzle_velocity,
                ground_height,
                projectile_radius,
            )
        }
    }

    /// Closed-form prediction: the landing time is the larger root of
    /// the vertical motion quadratic
    /// `0.5*g*t^2 + v0.y*t + (y0 - (ground - radius)) = 0`.
    fn closed_form(
        launch_point: Vec2,
        launch_angle: f32,
        muzzle_velocity: f32,
        ground_height: f32,
        projectile_radius: f32,
    ) -> Self {
        let floor = ground_height - projectile_radius;
        let v0 = polar(launch_angle, muzzle_velocity);

        // Coefficients of a*t^2 + b*t + c
        let a = 0.5 * GRAVITY;
        let b = v0.y;
        let c = launch_point.y - floor;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            warn!(discriminant, "no real landing time, treating as grounded");
            return Self::grounded(launch_point, floor);
        }

        let sqrt_d = discriminant.sqrt();
        let t1 = (-b - sqrt_d) / (2.0 * a);
        let t2 = (-b + sqrt_d) / (2.0 * a);
        let t = t1.max(t2);
        if t <= 0.0 {
            // Both crossings in the past: the launch point is already
            // at or below the plane and heading away from it.
            return Self::grounded(launch_point, floor);
        }

        let landing_velocity = Vec2::new(v0.x, v0.y + GRAVITY * t);
        let landing_position = Vec2::new(
            v0.x * t + launch_point.x,
            0.5 * GRAVITY * t * t + v0.y * t + launch_point.y,
        );

        // Control point of the Bezier: intersection of the launch ray
        // with the reversed landing ray. Parallel rays mean the arc
        // degenerates to a straight line.
        let control_point =
            line_intersection(launch_point, v0, landing_position, -landing_velocity)
                .unwrap_or_else(|| {
                    warn!("launch and landing rays are parallel, using straight-line control point");
                    (launch_point + landing_position) * 0.5
                });

        // Highest point: evaluate the Bezier where its vertical
        // tangent is extremal, clamped into the curve. This is the
        // control-point-geometry approximation, kept as-is rather than
        // the analytic parabola vertex.
        let denom = launch_point.y + landing_position.y - 2.0 * control_point.y;
        let highest_t = if denom.abs() <= f32::EPSILON {
            0.5
        } else {
            ((launch_point.y - control_point.y) / denom).clamp(0.0, 1.0)
        };
        let highest_point = quadratic_bezier(launch_point, control_point, landing_position, highest_t);
        let max_height = (launch_point.y - highest_point.y).max(0.0);

        Self {
            landing_position,
            landing_velocity,
            control_point,
            highest_point,
            air_time: t,
            max_height,
            landing_distance: landing_position.x - launch_point.x,
            sampled_points: Vec::new(),
        }
    }

    /// Drag-mode prediction: forward-simulate a transform at a fixed
    /// timestep, folding the drag deceleration into the acceleration
    /// vector each step, until the ground plane is reached.
    fn simulated(
        launch_point: Vec2,
        launch_angle: f32,
        muzzle_velocity: f32,
        ground_height: f32,
        projectile_radius: f32,
    ) -> Self {
        let floor = ground_height - projectile_radius;
        let drag = drag_factor(projectile_radius);

        let mut transform = Transform2D {
            position: launch_point,
            velocity: polar(launch_angle, muzzle_velocity),
            acceleration: Vec2::new(0.0, GRAVITY),
            rotate_forwards: true,
            ..Default::default()
        };

        let mut air_time = 0.0;
        let mut highest_point = launch_point;
        let mut sampled_points = vec![launch_point];
        let mut last_sample = launch_point;
        let mut steps = 0;

        while transform.position.y < floor {
            if steps >= sim::MAX_STEPS {
                warn!(steps, "drag prediction exceeded step cap, landing in place");
                break;
            }
            steps += 1;
            air_time += sim::TIME_STEP;

            let speed = transform.velocity.length();
            transform.acceleration -=
                transform.velocity * speed * drag * sim::TIME_STEP * DRAG_ACCUMULATION;
            transform.update(sim::TIME_STEP);

            if (transform.position - last_sample).length_squared() > TRAJECTORY_SAMPLE_DIST_SQ {
                sampled_points.push(transform.position);
                last_sample = transform.position;
            }
            if transform.position.y < highest_point.y {
                highest_point = transform.position;
            }
        }

        // Clamp the landing exactly onto the plane.
        let landing_position = Vec2::new(transform.position.x, floor);
        sampled_points.push(landing_position);

        Self {
            landing_position,
            landing_velocity: transform.velocity,
            control_point: (launch_point + landing_position) * 0.5,
            highest_point,
            air_time,
            max_height: (launch_point.y - highest_point.y).max(0.0),
            landing_distance: landing_position.x - launch_point.x,
            sampled_points,
        }
    }

    /// Degenerate fallback: the projectile is treated as already
    /// resting on the ground plane below the launch point.
    fn grounded(launch_point: Vec2, floor: f32) -> Self {
        let landing_position = Vec2::new(launch_point.x, floor);
        Self {
            landing_position,
            landing_velocity: Vec2::ZERO,
            control_point: (launch_point + landing_position) * 0.5,
            highest_point: launch_point,
            air_time: 0.0,
            max_height: 0.0,
            landing_distance: 0.0,
            sampled_points: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    const GROUND: f32 = 872.0;
    const RADIUS: f32 = 30.0;

    fn launch() -> Vec2 {
        Vec2::new(90.0, 720.0)
    }

    #[test]
    fn test_closed_form_lands_on_ground_plane() {
        let trajectory = Trajectory::predict(launch(), -PI / 5.0, 880.0, GROUND, RADIUS, false);
        assert!(trajectory.air_time > 0.0);
        assert!(
            (trajectory.landing_position.y - (GROUND - RADIUS)).abs() < 0.5,
            "landing y {} should be on the plane {}",
            trajectory.landing_position.y,
            GROUND - RADIUS
        );
    }

    #[test]
    fn test_closed_form_forward_launch_travels_forward() {
        let trajectory = Trajectory::predict(launch(), -PI / 5.0, 880.0, GROUND, RADIUS, false);
        assert!(trajectory.landing_distance > 0.0);
        assert!(trajectory.max_height > 0.0);
    }

    #[test]
    fn test_control_point_sits_above_endpoints() {
        // Upward arc: the control point must be above (smaller y than)
        // both the launch and landing points.
        let trajectory = Trajectory::predict(launch(), -PI / 5.0, 880.0, GROUND, RADIUS, false);
        assert!(trajectory.control_point.y < launch().y);
        assert!(trajectory.control_point.y < trajectory.landing_position.y);
    }

    #[test]
    fn test_landing_velocity_descends() {
        let trajectory = Trajectory::predict(launch(), -PI / 4.0, 600.0, GROUND, RADIUS, false);
        // +y is down: the projectile lands moving downward
        assert!(trajectory.landing_velocity.y > 0.0);
    }

    #[test]
    fn test_below_ground_launch_is_grounded() {
        // Launch point below the plane, aimed further down: no real
        // future landing, must fall back instead of going NaN.
        let below = Vec2::new(0.0, GROUND + 100.0);
        let trajectory = Trajectory::predict(below, PI / 3.0, 500.0, GROUND, RADIUS, false);
        assert_eq!(trajectory.air_time, 0.0);
        assert_eq!(trajectory.landing_distance, 0.0);
        assert!(trajectory.landing_position.y.is_finite());
    }

    #[test]
    fn test_drag_reduces_range() {
        let ideal = Trajectory::predict(launch(), -PI / 5.0, 880.0, GROUND, RADIUS, false);
        let dragged = Trajectory::predict(launch(), -PI / 5.0, 880.0, GROUND, RADIUS, true);
        assert!(
            dragged.landing_distance < ideal.landing_distance,
            "drag must shorten the shot: {} >= {}",
            dragged.landing_distance,
            ideal.landing_distance
        );
        assert!(dragged.landing_distance > 0.0);
    }

    #[test]
    fn test_drag_polyline_ends_on_ground_plane() {
        let trajectory = Trajectory::predict(launch(), -PI / 5.0, 880.0, GROUND, RADIUS, true);
        let last = trajectory.sampled_points.last().unwrap();
        assert_eq!(last.y, GROUND - RADIUS);
        assert_eq!(*last, trajectory.landing_position);
        assert!(trajectory.sampled_points.len() >= 2);
    }

    #[test]
    fn test_drag_air_time_positive() {
        let trajectory = Trajectory::predict(launch(), -PI / 5.0, 880.0, GROUND, RADIUS, true);
        assert!(trajectory.air_time > 0.0);
        assert!(trajectory.max_height > 0.0);
    }
}
