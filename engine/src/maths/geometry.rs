//! Geometry helpers for ballistic curves
//!
//! Polar vector construction, parametric ray-ray intersection, and
//! quadratic Bezier evaluation. These are the building blocks for
//! trajectory control points: a ballistic arc is rendered as a single
//! quadratic Bezier whose control point is the intersection of the
//! launch ray and the reversed landing ray.

use glam::Vec2;

/// Build a vector from an angle (radians) and a length.
///
/// Screen-space convention: +y points down, so an upward-pointing
/// vector has a negative angle.
#[inline]
pub fn polar(angle: f32, length: f32) -> Vec2 {
    Vec2::from_angle(angle) * length
}

/// Intersect two parametric lines `p0 + t*d0` and `p1 + s*d1`.
///
/// # Arguments
///
/// * `p0`, `d0` - Point and direction of the first line
/// * `p1`, `d1` - Point and direction of the second line
///
/// # Returns
///
/// * `Some(point)` - The intersection point
/// * `None` - The directions are parallel (or one is zero); callers
///   must substitute a degenerate fallback instead of propagating NaN
pub fn line_intersection(p0: Vec2, d0: Vec2, p1: Vec2, d1: Vec2) -> Option<Vec2> {
    let denom = d0.perp_dot(d1);
    if denom.abs() <= f32::EPSILON {
        return None;
    }
    let t = (p1 - p0).perp_dot(d1) / denom;
    Some(p0 + d0 * t)
}

/// Evaluate a quadratic Bezier curve at parameter `t` in [0, 1].
#[inline]
pub fn quadratic_bezier(start: Vec2, control: Vec2, end: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    start * (u * u) + control * (2.0 * u * t) + end * (t * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_polar_axes() {
        let right = polar(0.0, 2.0);
        assert!((right.x - 2.0).abs() < 1e-6);
        assert!(right.y.abs() < 1e-6);

        // +y is down, so +PI/2 points down the screen
        let down = polar(PI / 2.0, 3.0);
        assert!(down.x.abs() < 1e-6);
        assert!((down.y - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_line_intersection_perpendicular() {
        let hit = line_intersection(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(5.0, -5.0),
            Vec2::new(0.0, 1.0),
        )
        .expect("perpendicular lines must intersect");
        assert!((hit - Vec2::new(5.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_line_intersection_parallel_is_none() {
        let result = line_intersection(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(3.0, 0.0),
            Vec2::new(2.0, 2.0),
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_bezier_endpoints_and_midpoint() {
        let start = Vec2::new(0.0, 0.0);
        let control = Vec2::new(5.0, -10.0);
        let end = Vec2::new(10.0, 0.0);

        assert_eq!(quadratic_bezier(start, control, end, 0.0), start);
        assert_eq!(quadratic_bezier(start, control, end, 1.0), end);

        // Midpoint of a symmetric arc sits halfway to the control point
        let mid = quadratic_bezier(start, control, end, 0.5);
        assert!((mid.x - 5.0).abs() < 1e-5);
        assert!((mid.y - (-5.0)).abs() < 1e-5);
    }
}
