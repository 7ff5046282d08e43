//! Interior ballistics and launch parameters
//!
//! The physical inputs of a shot (barrel, charge, projectile) and the
//! closed-form approximations derived from them: muzzle velocity,
//! powder charge length, recoil speed, and the drag factor shared by
//! the predictor and in-flight projectiles.
//!
//! No external physics dependencies - implements our own ballistics math.
//!
//! Muzzle velocity follows the classic smooth-bore approximation
//! `v = sqrt(2*R*atm/eta) * sqrt(p/(m + p/3) * ln(L/c))`, scaled by an
//! empirical calibration factor so the result reads well in pixel
//! space.

use std::f32::consts::PI;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::physics::constants::{
    AIR_DENSITY, PIXEL_SCALE, SPHERE_DRAG_COEFF, interior_ballistics,
};

/// Valid physical ranges for launch parameters. Setters clamp into
/// these before any of the closed-form math runs, so the logarithm and
/// divisions below never see a degenerate domain.
pub mod limits {
    /// Minimum powder charge (kg)
    pub const MIN_POWDER_CHARGE: f32 = 2.0;
    /// Maximum powder charge (kg)
    pub const MAX_POWDER_CHARGE: f32 = 10.0;
    /// Minimum barrel length (px)
    pub const MIN_BARREL_LENGTH: f32 = 500.0;
    /// Maximum barrel length (px)
    pub const MAX_BARREL_LENGTH: f32 = 2500.0;
    /// Minimum projectile radius (px)
    pub const MIN_PROJECTILE_RADIUS: f32 = 5.0;
    /// Maximum projectile radius (px)
    pub const MAX_PROJECTILE_RADIUS: f32 = 50.0;
    /// Minimum projectile mass (kg)
    pub const MIN_PROJECTILE_MASS: f32 = 2.0;
    /// Maximum projectile mass (kg)
    pub const MAX_PROJECTILE_MASS: f32 = 50.0;
}

/// Clamp a parameter into its physical range, logging when the input
/// had to be corrected.
pub(crate) fn clamp_param(name: &'static str, value: f32, min: f32, max: f32) -> f32 {
    let clamped = value.clamp(min, max);
    if clamped != value {
        warn!(
            name,
            value, clamped, "launch parameter outside physical range, clamping"
        );
    }
    clamped
}

/// The physical inputs a shot is derived from.
///
/// Mutating any of these invalidates a previously predicted
/// trajectory; the cannon's setters recompute synchronously.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchParams {
    /// Rest position the carriage springs back to after recoil
    pub anchor: Vec2,
    /// Mass of the cannon carriage (kg)
    pub carriage_mass: f32,
    /// Barrel length (px)
    pub barrel_length: f32,
    /// Powder charge mass (kg)
    pub powder_charge: f32,
    /// Exit velocity of the burnt charge gases (px/s)
    pub charge_velocity: f32,
    /// Projectile radius (px); also the barrel's bore radius
    pub projectile_radius: f32,
    /// Projectile mass (kg)
    pub projectile_mass: f32,
}

impl Default for LaunchParams {
    fn default() -> Self {
        Self {
            anchor: Vec2::ZERO,
            carriage_mass: 2500.0,
            barrel_length: 3.08 * PIXEL_SCALE,
            powder_charge: 3.6,
            charge_velocity: 685.8 * PIXEL_SCALE,
            projectile_radius: 30.0,
            projectile_mass: 3.92,
        }
    }
}

impl LaunchParams {
    /// Length of the rammed powder charge inside the barrel (px).
    ///
    /// `c = 4p / (pi * d^2 * eta)` with the bore diameter `d` taken
    /// from the projectile radius and `eta` the powder density in
    /// pixel space.
    pub fn charge_length(&self) -> f32 {
        let diameter = self.projectile_radius * 2.0;
        let eta = interior_ballistics::POWDER_DENSITY / PIXEL_SCALE;
        self.powder_charge * 4.0 / (PI * diameter * diameter * eta)
    }

    /// Muzzle velocity (px/s) from the interior-ballistics
    /// approximation.
    ///
    /// Returns 0 if the barrel is not longer than the charge - the
    /// setters' clamping makes that unreachable for in-range
    /// parameters, but the logarithm domain is guarded here anyway so
    /// a degenerate configuration can never produce NaN.
    pub fn muzzle_velocity(&self) -> f32 {
        let eta = interior_ballistics::POWDER_DENSITY / PIXEL_SCALE;
        let atm = interior_ballistics::ATMOSPHERE_DENSITY / PIXEL_SCALE;
        let r = interior_ballistics::GAS_PRESSURE_RATIO;

        let charge_length = self.charge_length();
        if self.barrel_length <= charge_length {
            warn!(
                barrel_length = self.barrel_length,
                charge_length, "barrel shorter than powder charge, muzzle velocity is zero"
            );
            return 0.0;
        }

        let p = self.powder_charge;
        let m = self.projectile_mass;
        let v = (2.0 * r * atm / eta).sqrt()
            * (p / (m + p / 3.0) * (self.barrel_length / charge_length).ln()).sqrt();
        v * interior_ballistics::CALIBRATION
    }

    /// Carriage recoil speed (px/s) when a shot is fired, from
    /// momentum exchange between the projectile and the burnt charge.
    pub fn recoil_speed(&self) -> f32 {
        (self.projectile_mass * self.projectile_mass * self.muzzle_velocity()
            + self.powder_charge * self.charge_velocity)
            / self.carriage_mass
    }

    /// Check every parameter against its physical range. Used by the
    /// scenario loader; the cannon's setters clamp instead.
    pub fn validate(&self) -> Result<(), LaunchParamError> {
        let positives = [
            ("carriage_mass", self.carriage_mass),
            ("barrel_length", self.barrel_length),
            ("powder_charge", self.powder_charge),
            ("charge_velocity", self.charge_velocity),
            ("projectile_radius", self.projectile_radius),
            ("projectile_mass", self.projectile_mass),
        ];
        for (field, value) in positives {
            if value <= 0.0 {
                return Err(LaunchParamError::NonPositive { field, value });
            }
        }

        let charge_length = self.charge_length();
        if self.barrel_length <= charge_length {
            return Err(LaunchParamError::BarrelShorterThanCharge {
                barrel_length: self.barrel_length,
                charge_length,
            });
        }
        Ok(())
    }
}

/// Drag deceleration factor for a sphere of the given radius (px):
/// `0.5 * rho * Cd * A` with the cross-section area in square metres.
///
/// Multiply by `v * |v|` for the instantaneous drag deceleration
/// opposing the velocity.
pub fn drag_factor(radius: f32) -> f32 {
    let radius_m = radius / PIXEL_SCALE;
    0.5 * AIR_DENSITY * SPHERE_DRAG_COEFF * PI * radius_m * radius_m
}

/// Errors for launch parameters that cannot describe a physical shot.
#[derive(Debug)]
pub enum LaunchParamError {
    /// A mass/length/velocity field that must be strictly positive is not.
    NonPositive { field: &'static str, value: f32 },
    /// The powder charge does not fit inside the barrel.
    BarrelShorterThanCharge {
        barrel_length: f32,
        charge_length: f32,
    },
}

impl std::fmt::Display for LaunchParamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LaunchParamError::NonPositive { field, value } => {
                write!(f, "launch parameter {field} must be positive, got {value}")
            }
            LaunchParamError::BarrelShorterThanCharge {
                barrel_length,
                charge_length,
            } => write!(
                f,
                "barrel length {barrel_length} px does not exceed charge length {charge_length} px"
            ),
        }
    }
}

impl std::error::Error for LaunchParamError {}
