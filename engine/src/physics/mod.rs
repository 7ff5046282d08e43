//! Physics module
//!
//! Custom ballistics implementation for the cannon range. Built from
//! scratch without external physics library dependencies (no Rapier).
//!
//! # Unit System
//!
//! **1 unit = 1 pixel**, `PIXEL_SCALE` pixels to the metre, **+y down**.
//!
//! - Distances in px, velocities in px/s, accelerations in px/s^2
//! - Masses in kg, densities converted into pixel space at use sites
//!
//! # Submodules
//!
//! - [`constants`] - Unit system and physical constants
//! - [`ballistics`] - Launch parameters and interior-ballistics closed forms
//! - [`trajectory`] - Landing prediction (closed form and drag simulation)
//! - [`projectile`] - In-flight projectile lifecycle and elastic collision

pub mod ballistics;
pub mod constants;
pub mod projectile;
pub mod trajectory;

// Re-export commonly used types at the physics module level
pub use ballistics::{LaunchParamError, LaunchParams, drag_factor};
pub use projectile::{Projectile, ProjectileState};
pub use trajectory::Trajectory;
