//! Cannon Module
//!
//! The launcher: owns the launch parameters, the cached trajectory
//! prediction, and the bounded collection of live projectiles. Every
//! parameter setter synchronously recomputes the prediction, so
//! telemetry reads are never stale.
//!
//! # Example
//! ```ignore
//! use cannon_range_engine::game::Cannon;
//! use cannon_range_engine::particles::NullSink;
//! use glam::Vec2;
//!
//! let mut cannon = Cannon::new(Vec2::new(90.0, 822.0), 872.0);
//! cannon.set_rotation(-std::f32::consts::PI / 5.0);
//! cannon.fire(&mut NullSink);
//! cannon.tick(1.0 / 60.0, 0.016, &mut NullSink);
//! ```

use std::f32::consts::PI;

use glam::Vec2;
use tracing::debug;

use crate::maths::geometry::polar;
use crate::maths::transform::Transform2D;
use crate::particles::{BurstRequest, ParticleShape, ParticleSink, Rgba, Span};
use crate::physics::ballistics::{LaunchParams, clamp_param, limits};
use crate::physics::constants::PIXEL_SCALE;
use crate::physics::projectile::Projectile;
use crate::physics::trajectory::Trajectory;

/// Capacity bound for live projectiles. Exceeding it soft-evicts the
/// oldest projectile (starts its fade) instead of dropping anything.
pub const MAX_PROJECTILES: usize = 500;

static_assertions::const_assert!(MAX_PROJECTILES > 0);

/// Auto-orientation sweep: a slow sine oscillation of the barrel
/// between roughly -22 and -82 degrees.
pub mod orientation {
    use std::f32::consts::PI;

    /// Oscillation rate (radians of sine phase per second of elapsed time)
    pub const SWEEP_RATE: f32 = 0.25;
    /// Swept arc (radians; negative = upward in screen space)
    pub const SWEEP_ARC: f32 = -PI / 3.0;
    /// Arc offset from horizontal (radians)
    pub const SWEEP_OFFSET: f32 = -PI / 8.0;
}

/// Recoil carriage tuning.
pub mod recoil {
    /// Velocity damping rate (per second)
    pub const DAMPING: f32 = 10.0;
    /// Spring rate pulling the carriage back to its anchor
    pub const SPRING: f32 = 10.0;
    /// Squared speed below which the carriage counts as settled
    pub const MIN_SPEED_SQ: f32 = 0.1;
    /// Squared anchor distance below which no spring force applies
    pub const MIN_ANCHOR_DIST_SQ: f32 = 0.01;
}

/// Barrel outline proportions (presentation geometry).
pub mod barrel {
    /// Extra radius of the barrel wall over the bore (px)
    pub const RIM: f32 = 20.0;
    /// Length of the muzzle lip past the barrel sides (px)
    pub const LIP: f32 = 14.0;
    /// On-screen pixels per metre of barrel
    pub const DRAW_SCALE: f32 = 50.0;
}

/// Derived geometry for drawing the cannon. Recomputed on demand from
/// the canonical transform and launch parameters - never stored, so it
/// cannot drift out of sync with the trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarrelGeometry {
    pub center_up: Vec2,
    pub center_down: Vec2,
    pub mid_up: Vec2,
    pub mid_down: Vec2,
    pub front_up: Vec2,
    pub front_down: Vec2,
    /// Cubic Bezier points of the wick at the breech
    pub wick: [Vec2; 4],
    /// Where projectiles leave the barrel
    pub muzzle: Vec2,
}

/// The cannon: launch parameters, prediction, and projectile
/// bookkeeping. One `tick` per frame; single writer, no locking.
pub struct Cannon {
    transform: Transform2D,
    params: LaunchParams,
    ground_height: f32,
    trajectory: Trajectory,
    projectiles: Vec<Projectile>,
    capacity: usize,
    shots_fired: u64,

    apply_drag: bool,
    apply_collisions: bool,
    trajectory_alpha: f32,
    measurements_alpha: f32,

    /// Sweep the barrel automatically instead of accepting manual aim
    pub auto_orientation: bool,
    /// Kick the carriage back on fire
    pub apply_recoil: bool,
    /// Fade the predicted-trajectory overlay in/out
    pub show_trajectory: bool,
    /// Fade the measurement overlay (air time, distance, height) in/out
    pub show_measurements: bool,
    /// Show each projectile's realized trajectory
    pub show_projectile_trajectories: bool,
}

impl Cannon {
    /// Create a cannon resting at `position` above the given ground
    /// plane, with default launch parameters and the default capacity.
    pub fn new(position: Vec2, ground_height: f32) -> Self {
        Self::with_capacity(position, ground_height, MAX_PROJECTILES)
    }

    /// Create a cannon with an explicit projectile capacity.
    pub fn with_capacity(position: Vec2, ground_height: f32, capacity: usize) -> Self {
        let params = LaunchParams {
            anchor: position,
            ..Default::default()
        };
        let mut cannon = Self {
            transform: Transform2D {
                position,
                ..Default::default()
            },
            params,
            ground_height,
            trajectory: Trajectory::default(),
            projectiles: Vec::new(),
            capacity: capacity.max(1),
            shots_fired: 0,
            apply_drag: false,
            apply_collisions: false,
            trajectory_alpha: 1.0,
            measurements_alpha: 1.0,
            auto_orientation: true,
            apply_recoil: false,
            show_trajectory: true,
            show_measurements: true,
            show_projectile_trajectories: true,
        };
        cannon.recompute();
        cannon
    }

    // ------------------------------------------------------------------
    // Parameter setters - each clamps, then recomputes the prediction
    // ------------------------------------------------------------------

    /// Move the cannon carriage.
    pub fn set_position(&mut self, position: Vec2) {
        self.transform.position = position;
        self.recompute();
    }

    /// Move the recoil anchor (the position the carriage springs back to).
    pub fn set_anchor(&mut self, anchor: Vec2) {
        self.params.anchor = anchor;
        self.recompute();
    }

    /// Aim the barrel (radians; negative is upward in screen space).
    pub fn set_rotation(&mut self, rotation: f32) {
        self.transform.rotation = rotation;
        self.recompute();
    }

    pub fn set_barrel_length(&mut self, length: f32) {
        self.params.barrel_length = clamp_param(
            "barrel_length",
            length,
            limits::MIN_BARREL_LENGTH,
            limits::MAX_BARREL_LENGTH,
        );
        self.recompute();
    }

    pub fn set_projectile_radius(&mut self, radius: f32) {
        self.params.projectile_radius = clamp_param(
            "projectile_radius",
            radius,
            limits::MIN_PROJECTILE_RADIUS,
            limits::MAX_PROJECTILE_RADIUS,
        );
        self.recompute();
    }

    pub fn set_projectile_mass(&mut self, mass: f32) {
        self.params.projectile_mass = clamp_param(
            "projectile_mass",
            mass,
            limits::MIN_PROJECTILE_MASS,
            limits::MAX_PROJECTILE_MASS,
        );
        self.recompute();
    }

    pub fn set_powder_charge(&mut self, charge: f32) {
        self.params.powder_charge = clamp_param(
            "powder_charge",
            charge,
            limits::MIN_POWDER_CHARGE,
            limits::MAX_POWDER_CHARGE,
        );
        self.recompute();
    }

    /// Update the externally-owned ground plane (the application layer
    /// calls this when the view changes).
    pub fn set_ground_height(&mut self, ground_height: f32) {
        self.ground_height = ground_height;
        self.recompute();
    }

    /// Toggle drag. Drag and inter-projectile collisions are mutually
    /// exclusive modes; enabling one disables the other.
    pub fn set_apply_drag(&mut self, enabled: bool) {
        self.apply_drag = enabled;
        if enabled {
            self.apply_collisions = false;
        }
        self.recompute();
    }

    /// Toggle inter-projectile collisions (disables drag).
    pub fn set_apply_collisions(&mut self, enabled: bool) {
        self.apply_collisions = enabled;
        if enabled && self.apply_drag {
            self.apply_drag = false;
            self.recompute();
        }
    }

    /// Recompute the cached prediction from the canonical state.
    fn recompute(&mut self) {
        self.trajectory = Trajectory::predict(
            self.muzzle_point(),
            self.transform.rotation,
            self.params.muzzle_velocity(),
            self.ground_height,
            self.params.projectile_radius,
            self.apply_drag,
        );
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Fire a projectile along the current prediction.
    ///
    /// Requests a muzzle-flash burst, applies recoil when enabled, and
    /// enforces the capacity bound by soft-evicting the oldest
    /// projectile that is not already fading out.
    pub fn fire(&mut self, sink: &mut dyn ParticleSink) {
        let muzzle_velocity = self.params.muzzle_velocity();
        let muzzle = self.muzzle_point();

        sink.request_burst(BurstRequest {
            shape: ParticleShape::Line,
            origin: muzzle,
            direction: Span::new(
                self.transform.rotation - PI / 2.0,
                self.transform.rotation + PI / 2.0,
            ),
            speed: Span::new(muzzle_velocity / 4.0, muzzle_velocity),
            lifetime: Span::fixed(0.0),
            angular_velocity: Span::fixed(0.0),
            size: Span::new(20.0, 50.0),
            friction: Span::new(0.05, 0.2),
            color: Rgba::ORANGE,
            spawn_rate: 20,
            duration: 0.2,
        });

        let mut projectile = Projectile::new(
            muzzle,
            polar(self.transform.rotation, muzzle_velocity),
            self.trajectory.air_time,
        );
        projectile.radius = self.params.projectile_radius;
        projectile.mass = self.params.projectile_mass;
        projectile.apply_drag = self.apply_drag;
        projectile.show_trajectory = self.show_projectile_trajectories;
        projectile.shot = self.shots_fired;
        self.projectiles.push(projectile);
        self.shots_fired += 1;
        debug!(
            muzzle_velocity,
            live = self.projectiles.len(),
            "fired projectile"
        );

        if self.apply_recoil {
            self.transform.velocity = -polar(self.transform.rotation, self.params.recoil_speed());
        }

        if self.projectiles.len() > self.capacity {
            // Oldest first: the collection is insertion-ordered
            if let Some(oldest) = self
                .projectiles
                .iter_mut()
                .find(|p| !p.is_destroying() && !p.is_destroyed())
            {
                oldest.destroy();
                debug!("capacity exceeded, soft-evicting oldest projectile");
            }
        }
    }

    /// Start the fade-out of every live projectile.
    pub fn clear_all(&mut self) {
        for projectile in &mut self.projectiles {
            if !projectile.is_destroying() && !projectile.is_destroyed() {
                projectile.destroy();
            }
        }
    }

    // ------------------------------------------------------------------
    // Per-frame orchestration
    // ------------------------------------------------------------------

    /// Advance one frame.
    ///
    /// `elapsed` is the monotonic time since the simulation started,
    /// passed in explicitly (it drives the auto-orientation sweep).
    pub fn tick(&mut self, dt: f32, elapsed: f32, sink: &mut dyn ParticleSink) {
        // Projectiles that finished fading last tick leave the
        // collection before anything else happens this tick.
        self.projectiles.retain(|p| !p.is_destroyed());

        if self.apply_recoil {
            self.update_recoil(dt);
        }

        if self.auto_orientation {
            let phase = (elapsed * orientation::SWEEP_RATE).sin() * 0.5 + 0.5;
            self.set_rotation(phase * orientation::SWEEP_ARC + orientation::SWEEP_OFFSET);
        }

        self.update_overlay_alphas(dt);

        if self.apply_collisions {
            self.collision_pass();
        }

        let ground_height = self.ground_height;
        for projectile in &mut self.projectiles {
            projectile.show_trajectory = self.show_projectile_trajectories;
            projectile.update(dt, ground_height, sink);
        }
    }

    /// Carriage dynamics while recoil is enabled: integrate the kick,
    /// keep the wheels on the ground, damp the velocity, and spring
    /// back toward the anchor while still moving.
    fn update_recoil(&mut self, dt: f32) {
        self.transform.update(dt);
        self.transform.position.y = self.transform.position.y.min(self.ground_height);

        let to_anchor = self.params.anchor - self.transform.position;
        self.transform.velocity -= self.transform.velocity * dt * recoil::DAMPING;

        let speed_sq = self.transform.velocity.length_squared();
        if speed_sq > recoil::MIN_SPEED_SQ && to_anchor.length_squared() > recoil::MIN_ANCHOR_DIST_SQ
        {
            self.transform.position += to_anchor * dt * recoil::SPRING / speed_sq;
            self.recompute();
        }
    }

    fn update_overlay_alphas(&mut self, dt: f32) {
        if self.show_trajectory && self.trajectory_alpha < 1.0 {
            self.trajectory_alpha = (self.trajectory_alpha + dt).min(1.0);
        } else if !self.show_trajectory && self.trajectory_alpha > 0.0 {
            self.trajectory_alpha = (self.trajectory_alpha - dt).max(0.0);
        }
        if self.show_measurements && self.measurements_alpha < 1.0 {
            self.measurements_alpha = (self.measurements_alpha + dt).min(1.0);
        } else if !self.show_measurements && self.measurements_alpha > 0.0 {
            self.measurements_alpha = (self.measurements_alpha - dt).max(0.0);
        }
    }

    /// One symmetric pass over all unordered projectile pairs.
    fn collision_pass(&mut self) {
        for i in 0..self.projectiles.len() {
            let (head, tail) = self.projectiles.split_at_mut(i + 1);
            let a = &mut head[i];
            for b in tail.iter_mut() {
                Projectile::resolve_collision(a, b);
            }
        }
    }

    // ------------------------------------------------------------------
    // Derived geometry
    // ------------------------------------------------------------------

    /// Where projectiles leave the barrel.
    pub fn muzzle_point(&self) -> Vec2 {
        self.barrel_geometry().muzzle
    }

    /// Compute the presentation geometry of the barrel and wick from
    /// the canonical transform and parameters.
    pub fn barrel_geometry(&self) -> BarrelGeometry {
        let rotation = self.transform.rotation;
        let position = self.transform.position;
        let bore = self.params.projectile_radius;
        let rim = bore + barrel::RIM;
        let length = self.params.barrel_length / PIXEL_SCALE * barrel::DRAW_SCALE;
        let splay = ((rim - bore) / length).atan();

        let center_up = position + polar(rotation - PI / 2.0, rim);
        let center_down = position + polar(rotation + PI / 2.0, rim);
        let mid_up = center_up + polar(rotation + splay, length);
        let mid_down = center_down + polar(rotation - splay, length);
        let front_up = mid_up + polar(rotation, barrel::LIP);
        let front_down = mid_down + polar(rotation, barrel::LIP);

        let wick_point = polar(rotation, rim);
        let wick_control = polar(rotation + PI / 4.0, rim * 0.5);
        let wick0 = position - wick_point;
        let wick1 = wick0 - wick_point;
        let wick2 = wick1 + wick_control;
        let wick3 = wick0 - wick_control;

        BarrelGeometry {
            center_up,
            center_down,
            mid_up,
            mid_down,
            front_up,
            front_down,
            wick: [wick0, wick1, wick2, wick3],
            muzzle: (front_up + front_down) * 0.5,
        }
    }

    // ------------------------------------------------------------------
    // Telemetry and accessors
    // ------------------------------------------------------------------

    /// Predicted seconds from launch to landing.
    pub fn air_time(&self) -> f32 {
        self.trajectory.air_time
    }

    /// Predicted signed horizontal landing distance (px).
    pub fn landing_distance(&self) -> f32 {
        self.trajectory.landing_distance
    }

    /// Predicted arc height above the muzzle (px).
    pub fn max_height(&self) -> f32 {
        self.trajectory.max_height
    }

    /// The full cached prediction.
    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// Current muzzle velocity (px/s).
    pub fn muzzle_velocity(&self) -> f32 {
        self.params.muzzle_velocity()
    }

    pub fn position(&self) -> Vec2 {
        self.transform.position
    }

    pub fn rotation(&self) -> f32 {
        self.transform.rotation
    }

    pub fn params(&self) -> &LaunchParams {
        &self.params
    }

    /// Replace every launch parameter at once (scenario loading),
    /// clamping each into its physical range.
    pub fn set_params(&mut self, params: LaunchParams) {
        self.params = LaunchParams {
            anchor: params.anchor,
            carriage_mass: params.carriage_mass.max(1.0),
            barrel_length: clamp_param(
                "barrel_length",
                params.barrel_length,
                limits::MIN_BARREL_LENGTH,
                limits::MAX_BARREL_LENGTH,
            ),
            powder_charge: clamp_param(
                "powder_charge",
                params.powder_charge,
                limits::MIN_POWDER_CHARGE,
                limits::MAX_POWDER_CHARGE,
            ),
            charge_velocity: params.charge_velocity.max(0.0),
            projectile_radius: clamp_param(
                "projectile_radius",
                params.projectile_radius,
                limits::MIN_PROJECTILE_RADIUS,
                limits::MAX_PROJECTILE_RADIUS,
            ),
            projectile_mass: clamp_param(
                "projectile_mass",
                params.projectile_mass,
                limits::MIN_PROJECTILE_MASS,
                limits::MAX_PROJECTILE_MASS,
            ),
        };
        self.recompute();
    }

    pub fn ground_height(&self) -> f32 {
        self.ground_height
    }

    pub fn apply_drag(&self) -> bool {
        self.apply_drag
    }

    pub fn apply_collisions(&self) -> bool {
        self.apply_collisions
    }

    /// Live projectiles, insertion-ordered.
    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    /// Projectiles not yet fading out.
    pub fn live_count(&self) -> usize {
        self.projectiles
            .iter()
            .filter(|p| !p.is_destroying() && !p.is_destroyed())
            .count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn shots_fired(&self) -> u64 {
        self.shots_fired
    }

    /// Opacity of the predicted-trajectory overlay.
    pub fn trajectory_alpha(&self) -> f32 {
        self.trajectory_alpha
    }

    /// Opacity of the measurement overlay.
    pub fn measurements_alpha(&self) -> f32 {
        self.measurements_alpha
    }
}
