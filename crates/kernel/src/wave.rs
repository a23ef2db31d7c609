use crate::buffer::ParticleBuffer;
use wavefield_common::Axis;

/// Per-frame animation applied to a particle buffer.
///
/// Implementations must be pure in `elapsed_secs`: applying the same time
/// twice leaves the buffer in the same state.
pub trait Animator {
    fn apply(&self, buffer: &mut ParticleBuffer, elapsed_secs: f64);
}

/// Vertical sine wave travelling along x: `y = sin(t + x)`.
///
/// x and z are never written.
#[derive(Debug, Clone, Copy, Default)]
pub struct SineWave;

impl Animator for SineWave {
    fn apply(&self, buffer: &mut ParticleBuffer, elapsed_secs: f64) {
        if buffer.is_empty() {
            return;
        }
        for i in 0..buffer.count() {
            let x = buffer.position_component(i, Axis::X);
            let y = (elapsed_secs + x as f64).sin();
            buffer.set_position_component(i, Axis::Y, y as f32);
        }
        buffer.mark_positions_changed();
    }
}
