//! Range Sim - Headless Cannon Range
//!
//! Drives the full simulation core without a window: loads an optional
//! JSON scenario, runs a fixed-step loop that fires on a cadence, and
//! logs prediction and flight telemetry.
//!
//! Run with: `cargo run --bin range_sim [scenario.json]`
//!
//! Set `RUST_LOG=debug` to see per-shot and eviction events.

use std::f32::consts::PI;
use std::path::Path;

use cannon_range_engine::game::Cannon;
use cannon_range_engine::particles::ParticleManager;
use cannon_range_engine::physics::ballistics::{LaunchParamError, LaunchParams};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// A complete run description. Every field has a default matching the
/// classic range setup, so a scenario file only needs the fields it
/// changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct Scenario {
    /// Viewport width (px)
    screen_width: f32,
    /// Viewport height (px)
    screen_height: f32,
    /// Ground plane offset up from the bottom edge (px)
    ground_offset: f32,
    /// Cannon anchor offset up from the bottom edge (px)
    cannon_offset: f32,
    /// Cannon anchor x (px)
    cannon_x: f32,
    /// Barrel angle (radians, negative aims up the screen)
    rotation: f32,
    auto_orientation: bool,
    apply_drag: bool,
    apply_recoil: bool,
    apply_collisions: bool,
    /// Seconds between shots
    fire_interval: f32,
    /// Total simulated seconds
    duration: f32,
    params: LaunchParams,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            screen_width: 1728.0,
            screen_height: 972.0,
            ground_offset: 100.0,
            cannon_offset: 150.0,
            cannon_x: 90.0,
            rotation: -PI / 5.0,
            auto_orientation: true,
            apply_drag: false,
            apply_recoil: false,
            apply_collisions: false,
            fire_interval: 1.0,
            duration: 10.0,
            params: LaunchParams::default(),
        }
    }
}

/// Errors that can occur while loading a scenario file.
#[derive(Debug)]
enum ScenarioError {
    /// Standard I/O error.
    Io(std::io::Error),
    /// JSON deserialization error.
    Json(serde_json::Error),
    /// Launch parameters describe an impossible shot.
    Params(LaunchParamError),
}

impl std::fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScenarioError::Io(e) => write!(f, "IO error: {e}"),
            ScenarioError::Json(e) => write!(f, "JSON error: {e}"),
            ScenarioError::Params(e) => write!(f, "invalid launch parameters: {e}"),
        }
    }
}

impl std::error::Error for ScenarioError {}

impl From<std::io::Error> for ScenarioError {
    fn from(e: std::io::Error) -> Self {
        ScenarioError::Io(e)
    }
}

impl From<serde_json::Error> for ScenarioError {
    fn from(e: serde_json::Error) -> Self {
        ScenarioError::Json(e)
    }
}

fn load_scenario(path: &Path) -> Result<Scenario, ScenarioError> {
    let text = std::fs::read_to_string(path)?;
    let scenario: Scenario = serde_json::from_str(&text)?;
    scenario.params.validate().map_err(ScenarioError::Params)?;
    Ok(scenario)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let scenario = match std::env::args().nth(1) {
        Some(path) => match load_scenario(Path::new(&path)) {
            Ok(scenario) => {
                info!(path = %path, "loaded scenario");
                scenario
            }
            Err(e) => {
                error!(path = %path, error = %e, "failed to load scenario");
                std::process::exit(1);
            }
        },
        None => Scenario::default(),
    };

    let ground_height = scenario.screen_height - scenario.ground_offset;
    let anchor = Vec2::new(
        scenario.cannon_x,
        scenario.screen_height - scenario.cannon_offset,
    );
    info!(
        viewport_width = scenario.screen_width,
        viewport_height = scenario.screen_height,
        ground_height,
        "range configured"
    );

    let mut cannon = Cannon::new(anchor, ground_height);
    cannon.set_params(LaunchParams {
        anchor,
        ..scenario.params
    });
    cannon.auto_orientation = scenario.auto_orientation;
    cannon.apply_recoil = scenario.apply_recoil;
    cannon.set_apply_drag(scenario.apply_drag);
    if scenario.apply_collisions {
        cannon.set_apply_collisions(true);
    }
    cannon.set_rotation(scenario.rotation);

    let mut particles = ParticleManager::new();

    info!(
        muzzle_velocity = cannon.muzzle_velocity(),
        air_time = cannon.air_time(),
        landing_distance = cannon.landing_distance(),
        max_height = cannon.max_height(),
        "initial prediction"
    );

    let dt = 1.0 / 60.0;
    let mut elapsed = 0.0_f32;
    let mut next_shot = 0.0_f32;

    while elapsed < scenario.duration {
        if elapsed >= next_shot {
            cannon.fire(&mut particles);
            next_shot += scenario.fire_interval.max(dt);
            info!(
                elapsed,
                air_time = cannon.air_time(),
                landing_distance = cannon.landing_distance(),
                max_height = cannon.max_height(),
                live = cannon.live_count(),
                "fired"
            );
        }

        elapsed += dt;
        cannon.tick(dt, elapsed, &mut particles);
        particles.update(dt);
    }

    let landed = cannon
        .projectiles()
        .iter()
        .filter(|p| p.has_landed())
        .count();
    let resting = cannon
        .projectiles()
        .iter()
        .filter(|p| p.is_at_rest())
        .count();
    info!(
        shots = cannon.shots_fired(),
        live = cannon.live_count(),
        landed,
        resting,
        particles = particles.active_count(),
        "simulation complete"
    );

    for projectile in cannon.projectiles() {
        if projectile.has_landed() {
            info!(
                shot = projectile.shot,
                predicted = projectile.predicted_air_time(),
                realized = projectile.air_time(),
                "air time: prediction vs flight"
            );
        }
    }
}
