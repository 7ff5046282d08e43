//! Game Module
//!
//! Game-level orchestration built on top of the engine: the cannon
//! that owns the launch parameters, the cached prediction, and the
//! live projectile collection.

pub mod cannon;

pub use cannon::{BarrelGeometry, Cannon, MAX_PROJECTILES};
