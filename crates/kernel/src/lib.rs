//! Wavefield kernel: the particle buffer and the per-frame animation that drives it.
//!
//! # Invariants
//! - Only the y component of a particle position changes after creation.
//! - An update is a pure function of elapsed time and each particle's x.
//! - Renderers read the buffer; only the field mutates it.

pub mod buffer;
pub mod clock;
pub mod field;
pub mod wave;

pub use buffer::{BufferError, ParticleBuffer};
pub use clock::FrameClock;
pub use field::{FieldSettings, ParticleField};
pub use wave::{Animator, SineWave};
