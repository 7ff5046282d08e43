//! CPU particle pool
//!
//! The bundled [`ParticleSink`] implementation: burst requests become
//! short-lived spawners, spawners emit randomized particles, and
//! particles integrate with velocity-proportional friction while
//! shrinking to expiry. Rendering is somebody else's job - the pool
//! only exposes its live particles for a drawing layer to consume.

use glam::Vec2;

use crate::maths::geometry::polar;
use crate::maths::transform::Transform2D;

use super::{BurstRequest, ParticleShape, ParticleSink, Rgba, Span};

/// Hard cap on live particles; spawns beyond it are skipped.
pub const MAX_PARTICLES: usize = 2048;

/// Size shrink rate (px/s). A particle expires when its size reaches 0.
const SIZE_DECAY: f32 = 100.0;

/// Simple pseudo-random number generator for particle variation.
/// Uses a basic xorshift algorithm for fast, deterministic randomness.
struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    fn new(seed: u32) -> Self {
        Self { state: seed.max(1) }
    }

    /// Generate a random f32 in [0.0, 1.0)
    fn next_f32(&mut self) -> f32 {
        // xorshift32
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        (x as f32) / (u32::MAX as f32)
    }

    /// Sample a span uniformly.
    fn sample(&mut self, span: Span) -> f32 {
        if span.max - span.min <= f32::EPSILON {
            return span.min;
        }
        span.min + self.next_f32() * (span.max - span.min)
    }
}

/// A live particle.
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub shape: ParticleShape,
    pub transform: Transform2D,
    /// Current size (px); shrinks every update
    pub size: f32,
    /// Velocity-proportional deceleration factor
    pub friction: f32,
    /// Remaining seconds before forced expiry; `None` = size-only expiry
    pub lifetime: Option<f32>,
    pub color: Rgba,
}

impl Particle {
    /// Whether this particle should be dropped from the pool.
    #[inline]
    pub fn is_expired(&self) -> bool {
        self.size <= 0.0 || self.lifetime.is_some_and(|t| t <= 0.0)
    }

    /// Integrate one step: friction folds into the acceleration,
    /// the transform advances, and the particle shrinks.
    pub fn update(&mut self, dt: f32) {
        self.transform.acceleration += -self.transform.velocity * self.friction * dt;
        self.transform.update(dt);
        self.size -= SIZE_DECAY * dt;
        if let Some(lifetime) = &mut self.lifetime {
            *lifetime -= dt;
        }
    }
}

/// An active burst emitting particles until its duration runs out.
struct Spawner {
    request: BurstRequest,
    remaining: f32,
}

/// Particle pool consuming [`BurstRequest`]s.
pub struct ParticleManager {
    spawners: Vec<Spawner>,
    particles: Vec<Particle>,
    rng: SimpleRng,
}

impl Default for ParticleManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ParticleManager {
    pub fn new() -> Self {
        Self {
            spawners: Vec::new(),
            particles: Vec::with_capacity(MAX_PARTICLES),
            rng: SimpleRng::new(0x5EED),
        }
    }

    /// Advance every spawner and particle by `dt` seconds, dropping
    /// the expired ones.
    pub fn update(&mut self, dt: f32) {
        let Self {
            spawners,
            particles,
            rng,
        } = self;

        for spawner in spawners.iter_mut() {
            for _ in 0..spawner.request.spawn_rate {
                if particles.len() >= MAX_PARTICLES {
                    break;
                }
                particles.push(spawn_particle(rng, &spawner.request));
            }
            spawner.remaining -= dt;
        }
        spawners.retain(|s| s.remaining > 0.0);

        for particle in particles.iter_mut() {
            particle.update(dt);
        }
        particles.retain(|p| !p.is_expired());
    }

    /// Live particles, for a drawing layer to consume.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Number of live particles.
    pub fn active_count(&self) -> usize {
        self.particles.len()
    }

    /// Number of bursts still emitting.
    pub fn active_spawners(&self) -> usize {
        self.spawners.len()
    }

    /// Drop all particles and spawners.
    pub fn clear(&mut self) {
        self.particles.clear();
        self.spawners.clear();
    }
}

impl ParticleSink for ParticleManager {
    fn request_burst(&mut self, request: BurstRequest) {
        self.spawners.push(Spawner {
            remaining: request.duration,
            request,
        });
    }
}

/// Roll one particle from a burst's sampling spans.
fn spawn_particle(rng: &mut SimpleRng, request: &BurstRequest) -> Particle {
    let angle = rng.sample(request.direction);
    let velocity = polar(angle, rng.sample(request.speed));
    let transform = Transform2D {
        position: request.origin,
        velocity,
        acceleration: Vec2::ZERO,
        rotation: rng.next_f32() * std::f32::consts::TAU,
        angular_velocity: rng.sample(request.angular_velocity),
        rotate_forwards: false,
    };

    let lifetime = rng.sample(request.lifetime);
    Particle {
        shape: request.shape,
        transform,
        size: rng.sample(request.size),
        friction: rng.sample(request.friction),
        lifetime: (lifetime > 0.0).then_some(lifetime),
        color: request.color,
    }
}
