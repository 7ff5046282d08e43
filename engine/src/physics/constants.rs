//! Physical constants and unit system
//!
//! # Unit System
//!
//! **1 unit = 1 pixel**, with `PIXEL_SCALE` pixels to the metre and
//! **+y pointing down the screen**. Consequences:
//!
//! - Gravity is a positive y acceleration
//! - "Highest point" of an arc is the minimum y observed
//! - Masses stay in kg; densities are converted into pixel space where
//!   the drag and interior-ballistics math needs them

/// Pixels per metre. The default 3.08 m barrel spans 1540 px.
pub const PIXEL_SCALE: f32 = 500.0;

/// Gravitational acceleration (px/s^2, +y is down).
pub const GRAVITY: f32 = 9.81 * PIXEL_SCALE;

/// Air density at sea level (kg/m^3).
pub const AIR_DENSITY: f32 = 1.225;

/// Drag coefficient of a sphere (dimensionless).
pub const SPHERE_DRAG_COEFF: f32 = 0.47;

/// Factor applied to each accumulated drag-deceleration step. The
/// integrator folds drag into the acceleration vector instead of
/// recomputing it from scratch, scaled by `dt * DRAG_ACCUMULATION`;
/// the predictor and live projectiles must share this so prediction
/// matches flight.
pub const DRAG_ACCUMULATION: f32 = 0.1;

/// Squared distance (px^2) between stored trajectory polyline samples.
/// Down-sampling for rendering, not physical fidelity.
pub const TRAJECTORY_SAMPLE_DIST_SQ: f32 = 500.0;

/// Interior-ballistics constants for the muzzle-velocity approximation.
///
/// Densities are kg/m^3 and get divided by [`PIXEL_SCALE`] at the use
/// site to move into pixel space.
pub mod interior_ballistics {
    /// Density of black powder (kg/m^3)
    pub const POWDER_DENSITY: f32 = 881.0;
    /// Density of water, the working fluid of the pressure model (kg/m^3)
    pub const WATER_DENSITY: f32 = 997.0;
    /// Density of the atmosphere (kg/m^3)
    pub const ATMOSPHERE_DENSITY: f32 = 1.225;
    /// Ratio of gunpowder gas pressure to atmospheric pressure
    pub const GAS_PRESSURE_RATIO: f32 = 1600.0;
    /// Empirical calibration factor applied to the closed-form velocity
    pub const CALIBRATION: f32 = 130.0;
}

static_assertions::const_assert!(PIXEL_SCALE > 0.0);
static_assertions::const_assert!(GRAVITY > 0.0);
