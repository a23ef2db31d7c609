use crate::buffer::ParticleBuffer;
use crate::clock::FrameClock;
use crate::wave::{Animator, SineWave};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use wavefield_common::{SceneConfig, ValueRange};

/// Inputs for generating a particle field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldSettings {
    pub count: usize,
    pub position_range: ValueRange,
    pub color_range: ValueRange,
    pub seed: Option<u64>,
}

impl Default for FieldSettings {
    fn default() -> Self {
        Self::from(&SceneConfig::default())
    }
}

impl From<&SceneConfig> for FieldSettings {
    fn from(config: &SceneConfig) -> Self {
        Self {
            count: config.particle_count,
            position_range: config.position_range,
            color_range: config.color_range,
            seed: config.seed,
        }
    }
}

/// The animation context: owns the particle buffer, the animator that moves
/// it and the clock that times it.
///
/// Renderers borrow [`ParticleField::buffer`] immutably between frames.
#[derive(Debug, Clone)]
pub struct ParticleField<A: Animator = SineWave> {
    buffer: ParticleBuffer,
    animator: A,
    clock: FrameClock,
    frame: u64,
    elapsed_secs: f64,
}

impl ParticleField<SineWave> {
    /// Generate a field of randomly placed, randomly colored particles.
    pub fn generate(settings: &FieldSettings) -> Self {
        let mut rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let buffer = ParticleBuffer::initialize(
            settings.count,
            settings.position_range,
            settings.color_range,
            &mut rng,
        );
        tracing::info!(
            count = settings.count,
            seed = ?settings.seed,
            "generated particle field"
        );
        Self::with_animator(buffer, SineWave)
    }

    pub fn from_buffer(buffer: ParticleBuffer) -> Self {
        Self::with_animator(buffer, SineWave)
    }
}

impl<A: Animator> ParticleField<A> {
    pub fn with_animator(buffer: ParticleBuffer, animator: A) -> Self {
        Self {
            buffer,
            animator,
            clock: FrameClock::new(),
            frame: 0,
            elapsed_secs: 0.0,
        }
    }

    pub fn buffer(&self) -> &ParticleBuffer {
        &self.buffer
    }

    pub fn animator(&self) -> &A {
        &self.animator
    }

    /// Number of frames advanced so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Elapsed time used by the most recent frame.
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_secs
    }

    /// Advance one frame at an explicit elapsed time.
    pub fn advance(&mut self, elapsed_secs: f64) {
        self.animator.apply(&mut self.buffer, elapsed_secs);
        self.elapsed_secs = elapsed_secs;
        self.frame += 1;
    }

    /// Advance one frame using the internal clock sampled at `now`.
    pub fn advance_at(&mut self, now: Instant) -> f64 {
        let t = self.clock.tick_at(now);
        self.advance(t);
        t
    }

    /// Advance one frame using the internal clock.
    pub fn advance_now(&mut self) -> f64 {
        self.advance_at(Instant::now())
    }
}
