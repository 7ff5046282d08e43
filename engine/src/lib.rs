//! Cannon Range Engine Library
//!
//! The simulation core of an interactive 2D cannon toy: ballistic
//! trajectory prediction, projectile flight with bouncing and elastic
//! collisions, and the bookkeeping for a bounded collection of live
//! projectiles. Rendering, windowing, and UI are external
//! collaborators - the engine only exposes telemetry, derived draw
//! geometry, and a fire-and-forget particle-burst interface.
//!
//! # Modules
//!
//! - [`maths`] - Vec2 re-exports, polar/Bezier geometry, kinematic transform
//! - [`physics`] - Interior ballistics, trajectory prediction, projectiles
//! - [`particles`] - Burst-request interface and the bundled CPU pool
//! - [`game`] - The cannon: parameters, prediction cache, projectile collection
//!
//! # Example
//!
//! ```ignore
//! use cannon_range_engine::game::Cannon;
//! use cannon_range_engine::particles::ParticleManager;
//! use glam::Vec2;
//!
//! let mut cannon = Cannon::new(Vec2::new(90.0, 822.0), 872.0);
//! let mut particles = ParticleManager::new();
//!
//! cannon.set_rotation(-std::f32::consts::PI / 5.0);
//! cannon.fire(&mut particles);
//!
//! let dt = 1.0 / 60.0;
//! let mut elapsed = 0.0;
//! loop {
//!     elapsed += dt;
//!     cannon.tick(dt, elapsed, &mut particles);
//!     particles.update(dt);
//! }
//! ```

pub mod maths;
pub mod particles;
pub mod physics;

// Game-specific modules (located in src/game/ directory)
#[path = "../../src/game/mod.rs"]
pub mod game;

// Re-export the most commonly used types at crate level for convenience
pub use game::{BarrelGeometry, Cannon, MAX_PROJECTILES};
pub use maths::{Transform2D, Vec2};
pub use particles::{
    BurstRequest, NullSink, ParticleManager, ParticleShape, ParticleSink, Rgba, Span,
};
pub use physics::{LaunchParamError, LaunchParams, Projectile, ProjectileState, Trajectory};
