//! Trajectory Tests - Closed-Form Properties, Drag, and Prediction/Flight Agreement
//!
//! Property-style sweeps over the prediction math plus the end-to-end
//! scenario from the classic range setup (1728x972 viewport, ground at
//! 872, barrel at -36 degrees).

use std::f32::consts::PI;

use cannon_range_engine::maths::geometry::quadratic_bezier;
use cannon_range_engine::particles::NullSink;
use cannon_range_engine::physics::ballistics::LaunchParams;
use cannon_range_engine::physics::projectile::Projectile;
use cannon_range_engine::physics::trajectory::{Trajectory, sim};
use glam::Vec2;

const GROUND: f32 = 872.0;
const RADIUS: f32 = 30.0;
const LAUNCH: Vec2 = Vec2::new(250.0, 700.0);

// ============================================================================
// Closed-Form Sweeps
// ============================================================================

#[test]
fn test_all_upward_launches_land_on_ground_plane() {
    // Launch angles swept across (0, 90) degrees upward, several speeds
    for degrees in (5..90).step_by(5) {
        for speed in [300.0_f32, 700.0, 1200.0] {
            let angle = -(degrees as f32).to_radians();
            let trajectory = Trajectory::predict(LAUNCH, angle, speed, GROUND, RADIUS, false);

            assert!(
                trajectory.air_time > 0.0,
                "no air time at {degrees} deg, {speed} px/s"
            );
            assert!(
                (trajectory.landing_position.y - (GROUND - RADIUS)).abs() < 0.5,
                "missed the plane at {degrees} deg, {speed} px/s: {}",
                trajectory.landing_position.y
            );
            assert!(trajectory.max_height > 0.0);
        }
    }
}

#[test]
fn test_landing_distance_sign_matches_facing() {
    // Forward-facing launches travel forward...
    let forward = Trajectory::predict(LAUNCH, -PI / 5.0, 800.0, GROUND, RADIUS, false);
    assert!(forward.landing_distance > 0.0);

    // ...and mirrored launches travel backward by the same distance
    let backward = Trajectory::predict(LAUNCH, -PI + PI / 5.0, 800.0, GROUND, RADIUS, false);
    assert!(backward.landing_distance < 0.0);
    assert!((forward.landing_distance + backward.landing_distance).abs() < 0.5);
}

#[test]
fn test_prediction_is_deterministic() {
    let a = Trajectory::predict(LAUNCH, -PI / 5.0, 880.0, GROUND, RADIUS, false);
    let b = Trajectory::predict(LAUNCH, -PI / 5.0, 880.0, GROUND, RADIUS, false);
    assert_eq!(a, b);
}

#[test]
fn test_highest_point_lies_on_bezier() {
    let trajectory = Trajectory::predict(LAUNCH, -PI / 4.0, 900.0, GROUND, RADIUS, false);

    // The reported highest point must be a point of the rendered curve
    let mut closest = f32::MAX;
    for i in 0..=2000 {
        let t = i as f32 / 2000.0;
        let on_curve = quadratic_bezier(
            LAUNCH,
            trajectory.control_point,
            trajectory.landing_position,
            t,
        );
        closest = closest.min((on_curve - trajectory.highest_point).length());
    }
    assert!(closest < 2.0, "highest point {closest} px off the curve");

    // And no sampled curve point may sit above it
    for i in 0..=2000 {
        let t = i as f32 / 2000.0;
        let on_curve = quadratic_bezier(
            LAUNCH,
            trajectory.control_point,
            trajectory.landing_position,
            t,
        );
        assert!(on_curve.y >= trajectory.highest_point.y - 0.5);
    }
}

// ============================================================================
// Drag Mode
// ============================================================================

#[test]
fn test_drag_always_reduces_range() {
    for degrees in [20, 36, 55, 70] {
        let angle = -(degrees as f32).to_radians();
        let ideal = Trajectory::predict(LAUNCH, angle, 880.0, GROUND, RADIUS, false);
        let dragged = Trajectory::predict(LAUNCH, angle, 880.0, GROUND, RADIUS, true);
        assert!(
            dragged.landing_distance < ideal.landing_distance,
            "drag did not reduce range at {degrees} deg"
        );
    }
}

#[test]
fn test_drag_polyline_is_monotonic_forward() {
    let trajectory = Trajectory::predict(LAUNCH, -PI / 5.0, 880.0, GROUND, RADIUS, true);
    assert!(trajectory.sampled_points.len() >= 2);
    for pair in trajectory.sampled_points.windows(2) {
        assert!(
            pair[1].x >= pair[0].x,
            "forward launch polyline went backward"
        );
    }
}

#[test]
fn test_drag_prediction_matches_projectile_flight() {
    // A projectile stepped at the predictor's own timestep must land
    // where the predictor said it would.
    let angle = -PI / 5.0;
    let params = LaunchParams::default();
    let speed = params.muzzle_velocity();
    let predicted = Trajectory::predict(LAUNCH, angle, speed, GROUND, RADIUS, true);

    let mut projectile = Projectile::new(LAUNCH, Vec2::from_angle(angle) * speed, predicted.air_time);
    projectile.apply_drag = true;
    let mut sink = NullSink;
    for _ in 0..sim::MAX_STEPS {
        projectile.update(sim::TIME_STEP, GROUND, &mut sink);
        if projectile.has_landed() {
            break;
        }
    }
    assert!(projectile.has_landed());

    let (end_position, _) = projectile.end_state();
    assert!(
        (end_position.x - predicted.landing_position.x).abs() < 2.0,
        "flight landed at {}, prediction said {}",
        end_position.x,
        predicted.landing_position.x
    );
    assert!((projectile.air_time() - predicted.air_time).abs() < 0.05);
}

// ============================================================================
// End-to-End Scenario (classic range defaults)
// ============================================================================

#[test]
fn test_classic_range_shot() {
    // -36 degrees, default charge/barrel/mass, ground 872 in a 972
    // viewport, drag off: one positive landing time, a forward
    // landing, and an upward arc.
    let params = LaunchParams::default();
    let muzzle_velocity = params.muzzle_velocity();
    let launch = Vec2::new(90.0, 822.0);
    let trajectory = Trajectory::predict(
        launch,
        -PI / 5.0,
        muzzle_velocity,
        GROUND,
        params.projectile_radius,
        false,
    );

    assert!(trajectory.air_time > 0.0);
    assert!(trajectory.landing_distance > 0.0);
    assert!(trajectory.max_height > 0.0);

    // Upward arc: control point strictly above both endpoints
    assert!(trajectory.control_point.y < launch.y);
    assert!(trajectory.control_point.y < trajectory.landing_position.y);
}
