//! In-flight projectile simulation
//!
//! A projectile owns its kinematic state and walks a fixed lifecycle:
//!
//! ```text
//! Flying -> Landed -> Destroying -> Destroyed
//! ```
//!
//! Flying integrates gravity (and optionally drag) every tick. Landing
//! snaps the projectile onto the ground plane, finalizes its realized
//! trajectory, and bounces it with energy loss until the rebound falls
//! below a rest threshold. `destroy()` starts a linear fade instead of
//! deleting anything; the owner removes the projectile one tick after
//! the fade completes. Pairwise contacts resolve as 2D elastic
//! collisions along the line of centers.

use glam::Vec2;

use crate::maths::geometry::line_intersection;
use crate::maths::transform::Transform2D;
use crate::particles::{BurstRequest, ParticleShape, ParticleSink, Rgba, Span};
use crate::physics::ballistics::drag_factor;
use crate::physics::constants::{DRAG_ACCUMULATION, GRAVITY, TRAJECTORY_SAMPLE_DIST_SQ};

/// Lifecycle tuning.
pub mod lifecycle {
    /// Seconds of linear alpha fade between `destroy()` and removal.
    pub const DESTROY_DURATION: f32 = 1.0;
    /// Rebound speed (px/s) below which a landed projectile stops.
    /// Must exceed `elasticity * GRAVITY * dt / (1 + elasticity)` for
    /// every supported tick length, or micro-bounces never settle.
    pub const REST_SPEED_THRESHOLD: f32 = 50.0;
    /// Fraction of speed kept per bounce.
    pub const DEFAULT_ELASTICITY: f32 = 0.25;
}

static_assertions::const_assert!(lifecycle::DESTROY_DURATION > 0.0);

/// Lifecycle state, derived from the landed flag and destroy timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileState {
    /// Airborne, integrating every tick
    Flying,
    /// Touched the ground plane (may still be bouncing)
    Landed,
    /// Fading out after `destroy()`
    Destroying,
    /// Fade complete; must not be updated or drawn again
    Destroyed,
}

/// A live cannonball.
pub struct Projectile {
    /// Kinematic state; rotation follows the flight direction
    pub transform: Transform2D,
    /// Collision/ground radius (px)
    pub radius: f32,
    /// Mass (kg), used by elastic collision resolution
    pub mass: f32,
    /// Fraction of speed kept per bounce
    pub elasticity: f32,
    /// Integrate drag in addition to gravity
    pub apply_drag: bool,
    /// Fade the realized-trajectory overlay in (set by the owner)
    pub show_trajectory: bool,
    /// Monotonic identity stamped by the owning cannon; stays valid
    /// across compactions of the live collection
    pub shot: u64,

    landed: bool,
    collided: bool,
    at_rest: bool,
    start_position: Vec2,
    start_velocity: Vec2,
    end_position: Vec2,
    end_velocity: Vec2,
    control_point: Vec2,
    predicted_air_time: f32,
    air_time: f32,
    destroy_timer: Option<f32>,
    trajectory_alpha: f32,
    position_history: Vec<Vec2>,
}

impl Projectile {
    /// Spawn a projectile at the muzzle with its launch velocity.
    ///
    /// `predicted_air_time` is the predictor's estimate at the moment
    /// of firing, kept so the realized flight can be compared against
    /// it.
    pub fn new(start_position: Vec2, start_velocity: Vec2, predicted_air_time: f32) -> Self {
        Self {
            transform: Transform2D {
                position: start_position,
                velocity: start_velocity,
                acceleration: Vec2::new(0.0, GRAVITY),
                rotation: start_velocity.to_angle(),
                angular_velocity: 0.0,
                rotate_forwards: true,
            },
            radius: 30.0,
            mass: 3.92,
            elasticity: lifecycle::DEFAULT_ELASTICITY,
            apply_drag: false,
            show_trajectory: false,
            shot: 0,
            landed: false,
            collided: false,
            at_rest: false,
            start_position,
            start_velocity,
            end_position: start_position,
            end_velocity: start_velocity,
            control_point: start_position,
            predicted_air_time,
            air_time: 0.0,
            destroy_timer: None,
            trajectory_alpha: 0.0,
            position_history: vec![start_position],
        }
    }

    /// Advance one tick: fade timers, physics integration, and ground
    /// contact. Destroyed projectiles are never advanced.
    pub fn update(&mut self, dt: f32, ground_height: f32, sink: &mut dyn ParticleSink) {
        if self.is_destroyed() {
            return;
        }

        if let Some(timer) = &mut self.destroy_timer {
            *timer -= dt;
        }
        self.update_trajectory_alpha(dt);

        if self.at_rest {
            return;
        }

        if self.apply_drag {
            let speed = self.transform.velocity.length();
            self.transform.acceleration -=
                self.transform.velocity * speed * drag_factor(self.radius) * dt * DRAG_ACCUMULATION;
        }
        self.transform.update(dt);

        if !self.landed {
            self.air_time += dt;
        }
        if self.apply_drag && !self.collided {
            self.record_history(false);
        }

        let floor = ground_height - self.radius;
        if self.transform.position.y >= floor {
            self.touch_ground(floor, sink);
        }
    }

    /// Ground contact: snap onto the plane, finalize the realized
    /// trajectory on first touch, then bounce or come to rest.
    fn touch_ground(&mut self, floor: f32, sink: &mut dyn ParticleSink) {
        let impact_velocity = self.transform.velocity;
        self.transform.position.y = floor;

        if !self.landed {
            self.landed = true;
            self.end_position = self.transform.position;
            self.end_velocity = impact_velocity;
            // Mirror the predictor's control-point construction with
            // the realized start and end states.
            self.control_point = line_intersection(
                self.start_position,
                self.start_velocity,
                self.end_position,
                -self.end_velocity,
            )
            .unwrap_or((self.start_position + self.end_position) * 0.5);
            if self.apply_drag {
                self.record_history(true);
            }
        }

        let rebound = Vec2::new(impact_velocity.x, -impact_velocity.y) * self.elasticity;
        if rebound.length() > lifecycle::REST_SPEED_THRESHOLD {
            self.transform.velocity = rebound;
        } else {
            self.transform.velocity = Vec2::ZERO;
            self.transform.acceleration = Vec2::ZERO;
            self.at_rest = true;
            self.request_impact_burst(impact_velocity.length(), sink);
        }
    }

    /// Landing-impact burst, sized by the impact speed.
    fn request_impact_burst(&self, impact_speed: f32, sink: &mut dyn ParticleSink) {
        sink.request_burst(BurstRequest {
            shape: ParticleShape::Circle,
            origin: self.transform.position + Vec2::new(0.0, self.radius),
            // Upward semicircle (+y is down)
            direction: Span::new(-std::f32::consts::PI, 0.0),
            speed: Span::new(impact_speed * 0.1, impact_speed * 0.3),
            lifetime: Span::fixed(0.0),
            angular_velocity: Span::fixed(0.0),
            size: Span::new(10.0, 25.0),
            friction: Span::new(0.05, 0.2),
            color: Rgba::WHITE,
            spawn_rate: ((impact_speed / 50.0) as u32).clamp(4, 40),
            duration: 0.1,
        });
    }

    /// Down-sample the realized flight path for drag-mode rendering.
    fn record_history(&mut self, force: bool) {
        let far_enough = self.position_history.last().is_none_or(|last| {
            (self.transform.position - *last).length_squared() > TRAJECTORY_SAMPLE_DIST_SQ
        });
        if force || far_enough {
            self.position_history.push(self.transform.position);
        }
    }

    /// Resolve a potential contact between two projectiles as an
    /// elastic collision along the line of centers.
    ///
    /// Symmetric: either argument order produces the same final state.
    /// Overlap is split evenly, both accelerations reset to
    /// gravity-only (accumulated drag is no longer meaningful), and
    /// both are marked collided, which suppresses their realized
    /// trajectories until they land.
    pub fn resolve_collision(a: &mut Projectile, b: &mut Projectile) {
        if !a.is_collidable() || !b.is_collidable() {
            return;
        }

        let delta = b.transform.position - a.transform.position;
        let distance = delta.length();
        if distance > a.radius + b.radius {
            return;
        }
        let normal = if distance > f32::EPSILON {
            delta / distance
        } else {
            Vec2::X
        };

        // 1D elastic exchange along the normal, weighted by mass.
        let u1 = a.transform.velocity.dot(normal);
        let u2 = b.transform.velocity.dot(normal);
        let total = a.mass + b.mass;
        let v1 = (u1 * (a.mass - b.mass) + 2.0 * b.mass * u2) / total;
        let v2 = (u2 * (b.mass - a.mass) + 2.0 * a.mass * u1) / total;
        a.transform.velocity += (v1 - u1) * normal;
        b.transform.velocity += (v2 - u2) * normal;

        // Separate by exactly the overlap, split evenly.
        let overlap = a.radius + b.radius - distance;
        a.transform.position -= normal * (overlap * 0.5);
        b.transform.position += normal * (overlap * 0.5);

        a.transform.acceleration = Vec2::new(0.0, GRAVITY);
        b.transform.acceleration = Vec2::new(0.0, GRAVITY);
        a.collided = true;
        b.collided = true;
    }

    /// Whether this projectile takes part in pairwise collision
    /// checks: Flying or Landed-but-mobile, and not fading out.
    pub fn is_collidable(&self) -> bool {
        self.destroy_timer.is_none() && !self.at_rest
    }

    /// Begin the fade-out. Idempotent: a projectile already fading
    /// keeps its timer.
    pub fn destroy(&mut self) {
        if self.destroy_timer.is_none() {
            self.destroy_timer = Some(lifecycle::DESTROY_DURATION);
        }
    }

    /// Currently fading out.
    pub fn is_destroying(&self) -> bool {
        matches!(self.destroy_timer, Some(t) if t > 0.0)
    }

    /// Fade complete; the owner removes it on the next tick.
    pub fn is_destroyed(&self) -> bool {
        matches!(self.destroy_timer, Some(t) if t <= 0.0)
    }

    /// Lifecycle state.
    pub fn state(&self) -> ProjectileState {
        match self.destroy_timer {
            Some(t) if t <= 0.0 => ProjectileState::Destroyed,
            Some(_) => ProjectileState::Destroying,
            None if self.landed => ProjectileState::Landed,
            None => ProjectileState::Flying,
        }
    }

    /// Body opacity: 1 while alive, fading linearly to 0 while
    /// destroying.
    pub fn fade_alpha(&self) -> f32 {
        match self.destroy_timer {
            Some(t) => (t / lifecycle::DESTROY_DURATION).clamp(0.0, 1.0),
            None => 1.0,
        }
    }

    fn update_trajectory_alpha(&mut self, dt: f32) {
        if self.show_trajectory && self.trajectory_alpha < 1.0 {
            self.trajectory_alpha = (self.trajectory_alpha + dt).min(1.0);
        } else if !self.show_trajectory && self.trajectory_alpha > 0.0 {
            self.trajectory_alpha = (self.trajectory_alpha - dt).max(0.0);
        }
    }

    /// Overlay opacity for the realized trajectory.
    pub fn trajectory_alpha(&self) -> f32 {
        self.trajectory_alpha
    }

    /// Whether the realized trajectory is meaningful to draw. A
    /// mid-air collision invalidates the start/end arc model until the
    /// projectile lands on its new path.
    pub fn trajectory_visible(&self) -> bool {
        self.show_trajectory && !(self.collided && !self.landed)
    }

    pub fn has_landed(&self) -> bool {
        self.landed
    }

    pub fn has_collided(&self) -> bool {
        self.collided
    }

    pub fn is_at_rest(&self) -> bool {
        self.at_rest
    }

    /// Launch state of the realized arc.
    pub fn start_state(&self) -> (Vec2, Vec2) {
        (self.start_position, self.start_velocity)
    }

    /// Landing state of the realized arc (start state until landed).
    pub fn end_state(&self) -> (Vec2, Vec2) {
        (self.end_position, self.end_velocity)
    }

    /// Control point of the realized arc's Bezier.
    pub fn control_point(&self) -> Vec2 {
        self.control_point
    }

    /// Seconds actually spent flying so far.
    pub fn air_time(&self) -> f32 {
        self.air_time
    }

    /// The predictor's air-time estimate at the moment of firing.
    pub fn predicted_air_time(&self) -> f32 {
        self.predicted_air_time
    }

    /// Down-sampled realized flight path (drag mode).
    pub fn position_history(&self) -> &[Vec2] {
        &self.position_history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particles::NullSink;

    const GROUND: f32 = 872.0;
    const DT: f32 = 1.0 / 64.0;

    fn airborne(velocity: Vec2) -> Projectile {
        Projectile::new(Vec2::new(100.0, 500.0), velocity, 1.0)
    }

    fn tick_until_landed(projectile: &mut Projectile, max_ticks: usize) {
        let mut sink = NullSink;
        for _ in 0..max_ticks {
            projectile.update(DT, GROUND, &mut sink);
            if projectile.has_landed() {
                return;
            }
        }
        panic!("projectile never landed");
    }

    #[test]
    fn test_new_projectile_is_flying() {
        let projectile = airborne(Vec2::new(100.0, -100.0));
        assert_eq!(projectile.state(), ProjectileState::Flying);
        assert_eq!(projectile.fade_alpha(), 1.0);
        assert!(projectile.is_collidable());
    }

    #[test]
    fn test_gravity_pulls_down() {
        let mut projectile = airborne(Vec2::new(100.0, 0.0));
        let mut sink = NullSink;
        projectile.update(DT, GROUND, &mut sink);
        // +y is down: velocity gains downward speed
        assert!(projectile.transform.velocity.y > 0.0);
        assert!(projectile.air_time() > 0.0);
    }

    #[test]
    fn test_rotation_follows_velocity() {
        let mut projectile = airborne(Vec2::new(100.0, -200.0));
        let mut sink = NullSink;
        for _ in 0..32 {
            projectile.update(DT, GROUND, &mut sink);
        }
        // Rotation is derived from the velocity entering the tick, so
        // it trails the post-update velocity by one gravity increment
        let expected = projectile.transform.velocity.to_angle();
        assert!((projectile.transform.rotation - expected).abs() < 0.05);
    }

    #[test]
    fn test_lands_snapped_to_ground_plane() {
        let mut projectile = airborne(Vec2::new(200.0, 0.0));
        tick_until_landed(&mut projectile, 2000);
        assert_eq!(projectile.state(), ProjectileState::Landed);
        assert!(
            (projectile.transform.position.y - (GROUND - projectile.radius)).abs() < 1e-3,
            "not snapped: {}",
            projectile.transform.position.y
        );
    }

    #[test]
    fn test_bounce_reflects_and_damps() {
        let mut projectile = airborne(Vec2::new(200.0, 0.0));
        tick_until_landed(&mut projectile, 2000);
        // First impact is fast enough to rebound: velocity points up,
        // scaled by elasticity
        assert!(projectile.transform.velocity.y < 0.0);
        assert!(!projectile.is_at_rest());
    }

    #[test]
    fn test_comes_to_rest_and_requests_burst() {
        struct CountingSink(usize);
        impl ParticleSink for CountingSink {
            fn request_burst(&mut self, _request: BurstRequest) {
                self.0 += 1;
            }
        }

        let mut projectile = airborne(Vec2::new(50.0, 0.0));
        let mut sink = CountingSink(0);
        for _ in 0..4000 {
            projectile.update(DT, GROUND, &mut sink);
            if projectile.is_at_rest() {
                break;
            }
        }
        assert!(projectile.is_at_rest());
        assert_eq!(projectile.transform.velocity, Vec2::ZERO);
        assert_eq!(projectile.transform.acceleration, Vec2::ZERO);
        assert_eq!(sink.0, 1, "exactly one impact burst at rest");
    }

    #[test]
    fn test_realized_control_point_above_endpoints() {
        let mut projectile = airborne(Vec2::new(300.0, -400.0));
        tick_until_landed(&mut projectile, 8000);
        let control = projectile.control_point();
        assert!(control.y < projectile.start_state().0.y);
        assert!(control.y < projectile.end_state().0.y);
    }

    #[test]
    fn test_destroy_lifecycle_timing() {
        let mut projectile = airborne(Vec2::new(100.0, -100.0));
        let mut sink = NullSink;
        projectile.destroy();
        assert_eq!(projectile.state(), ProjectileState::Destroying);

        // Half the fade: alpha sits at 0.5
        for _ in 0..2 {
            projectile.update(0.25, GROUND, &mut sink);
        }
        assert!((projectile.fade_alpha() - 0.5).abs() < 1e-5);
        assert!(projectile.is_destroying());

        // The other half: destroyed, fully transparent
        for _ in 0..2 {
            projectile.update(0.25, GROUND, &mut sink);
        }
        assert_eq!(projectile.state(), ProjectileState::Destroyed);
        assert_eq!(projectile.fade_alpha(), 0.0);
    }

    #[test]
    fn test_destroyed_is_never_updated() {
        let mut projectile = airborne(Vec2::new(100.0, -100.0));
        let mut sink = NullSink;
        projectile.destroy();
        for _ in 0..4 {
            projectile.update(0.25, GROUND, &mut sink);
        }
        let frozen = projectile.transform.position;
        projectile.update(0.25, GROUND, &mut sink);
        assert_eq!(projectile.transform.position, frozen);
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut projectile = airborne(Vec2::new(100.0, -100.0));
        let mut sink = NullSink;
        projectile.destroy();
        projectile.update(0.25, GROUND, &mut sink);
        let alpha = projectile.fade_alpha();
        projectile.destroy();
        assert_eq!(projectile.fade_alpha(), alpha);
    }

    #[test]
    fn test_equal_mass_head_on_collision_swaps_velocities() {
        // The canonical exchange: overlapping equal spheres moving at
        // each other swap velocities and separate to exactly touching.
        let mut a = Projectile::new(Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0), 0.0);
        let mut b = Projectile::new(Vec2::new(50.0, 0.0), Vec2::new(-100.0, 0.0), 0.0);
        a.radius = 30.0;
        b.radius = 30.0;
        a.mass = 4.0;
        b.mass = 4.0;

        Projectile::resolve_collision(&mut a, &mut b);

        assert!((a.transform.velocity - Vec2::new(-100.0, 0.0)).length() < 1e-4);
        assert!((b.transform.velocity - Vec2::new(100.0, 0.0)).length() < 1e-4);

        let gap = (b.transform.position - a.transform.position).length();
        assert!((gap - 60.0).abs() < 1e-4, "separated to {gap}, wanted 60");
        assert!(a.has_collided() && b.has_collided());
    }

    #[test]
    fn test_collision_conserves_momentum_and_energy() {
        let mut a = Projectile::new(Vec2::new(0.0, 0.0), Vec2::new(120.0, 40.0), 0.0);
        let mut b = Projectile::new(Vec2::new(40.0, 30.0), Vec2::new(-80.0, -10.0), 0.0);
        a.mass = 3.0;
        b.mass = 7.0;

        let momentum_before = a.transform.velocity * a.mass + b.transform.velocity * b.mass;
        let energy_before = a.mass * a.transform.velocity.length_squared()
            + b.mass * b.transform.velocity.length_squared();

        Projectile::resolve_collision(&mut a, &mut b);

        let momentum_after = a.transform.velocity * a.mass + b.transform.velocity * b.mass;
        let energy_after = a.mass * a.transform.velocity.length_squared()
            + b.mass * b.transform.velocity.length_squared();

        assert!((momentum_after - momentum_before).length() < 1e-2);
        assert!((energy_after - energy_before).abs() / energy_before < 1e-4);
    }

    #[test]
    fn test_collision_is_symmetric() {
        let make = || {
            let mut a = Projectile::new(Vec2::new(0.0, 0.0), Vec2::new(90.0, 20.0), 0.0);
            let mut b = Projectile::new(Vec2::new(45.0, 10.0), Vec2::new(-60.0, 5.0), 0.0);
            a.mass = 2.5;
            b.mass = 6.0;
            (a, b)
        };

        let (mut a1, mut b1) = make();
        Projectile::resolve_collision(&mut a1, &mut b1);

        let (mut a2, mut b2) = make();
        Projectile::resolve_collision(&mut b2, &mut a2);

        assert!((a1.transform.velocity - a2.transform.velocity).length() < 1e-4);
        assert!((b1.transform.velocity - b2.transform.velocity).length() < 1e-4);
        assert!((a1.transform.position - a2.transform.position).length() < 1e-4);
        assert!((b1.transform.position - b2.transform.position).length() < 1e-4);
    }

    #[test]
    fn test_separated_projectiles_do_not_collide() {
        let mut a = Projectile::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), 0.0);
        let mut b = Projectile::new(Vec2::new(100.0, 0.0), Vec2::new(-10.0, 0.0), 0.0);
        let va = a.transform.velocity;
        Projectile::resolve_collision(&mut a, &mut b);
        assert_eq!(a.transform.velocity, va);
        assert!(!a.has_collided());
    }

    #[test]
    fn test_destroying_projectile_is_not_collidable() {
        let mut a = Projectile::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), 0.0);
        a.destroy();
        assert!(!a.is_collidable());
    }
}
