use glam::Vec3;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use wavefield_common::{Axis, ValueRange};

/// Errors from building a buffer out of explicit component data.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BufferError {
    #[error("component length {0} is not a multiple of 3")]
    NotTriples(usize),
    #[error("position length {positions} does not match color length {colors}")]
    LengthMismatch { positions: usize, colors: usize },
}

static NEXT_BUFFER_ID: AtomicU64 = AtomicU64::new(1);

fn next_buffer_id() -> u64 {
    NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed)
}

/// Flat position and color storage for a fixed set of particles.
///
/// Particle `i` occupies slots `3i..3i + 3` in both arrays. The layout is the
/// one the GPU consumes, so the slices can be uploaded without repacking.
///
/// Equality compares contents only, not [`ParticleBuffer::id`].
#[derive(Debug, Clone)]
pub struct ParticleBuffer {
    id: u64,
    count: usize,
    positions: Vec<f32>,
    colors: Vec<f32>,
    /// Bumped every time positions change. Consumers compare it against the
    /// generation they last synchronized.
    position_generation: u64,
}

impl ParticleBuffer {
    /// Allocate `count` particles with every component drawn independently
    /// and uniformly from its range.
    pub fn initialize<R: Rng + ?Sized>(
        count: usize,
        position_range: ValueRange,
        color_range: ValueRange,
        rng: &mut R,
    ) -> Self {
        let len = count * 3;
        let mut positions = Vec::with_capacity(len);
        let mut colors = Vec::with_capacity(len);
        for _ in 0..len {
            positions.push(position_range.sample(rng));
            colors.push(color_range.sample(rng));
        }
        Self {
            id: next_buffer_id(),
            count,
            positions,
            colors,
            position_generation: 0,
        }
    }

    /// Build a buffer from explicit packed component arrays.
    pub fn from_components(positions: Vec<f32>, colors: Vec<f32>) -> Result<Self, BufferError> {
        if positions.len() % 3 != 0 {
            return Err(BufferError::NotTriples(positions.len()));
        }
        if positions.len() != colors.len() {
            return Err(BufferError::LengthMismatch {
                positions: positions.len(),
                colors: colors.len(),
            });
        }
        Ok(Self {
            id: next_buffer_id(),
            count: positions.len() / 3,
            positions,
            colors,
            position_generation: 0,
        })
    }

    /// Process-unique identity assigned at construction. Clones keep it,
    /// since colors and count never change after construction.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Packed `[x, y, z, x, y, z, ...]` positions.
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Packed `[r, g, b, r, g, b, ...]` colors.
    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    pub fn position_component(&self, index: usize, axis: Axis) -> f32 {
        self.positions[self.slot(index, axis)]
    }

    pub fn set_position_component(&mut self, index: usize, axis: Axis, value: f32) {
        let slot = self.slot(index, axis);
        self.positions[slot] = value;
    }

    pub fn position(&self, index: usize) -> Vec3 {
        let base = self.slot(index, Axis::X);
        Vec3::from_slice(&self.positions[base..base + 3])
    }

    pub fn color(&self, index: usize) -> [f32; 3] {
        let base = self.slot(index, Axis::X);
        [self.colors[base], self.colors[base + 1], self.colors[base + 2]]
    }

    /// Signal that positions changed and must be re-synchronized before the next draw.
    pub fn mark_positions_changed(&mut self) {
        self.position_generation += 1;
    }

    pub fn position_generation(&self) -> u64 {
        self.position_generation
    }

    /// Min and max of the y components, or `None` for an empty buffer.
    pub fn y_extent(&self) -> Option<(f32, f32)> {
        self.positions
            .iter()
            .skip(Axis::Y.offset())
            .step_by(3)
            .fold(None, |acc, &y| match acc {
                None => Some((y, y)),
                Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
            })
    }

    fn slot(&self, index: usize, axis: Axis) -> usize {
        assert!(
            index < self.count,
            "particle index {index} out of range (count {})",
            self.count
        );
        index * 3 + axis.offset()
    }
}

impl PartialEq for ParticleBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.count == other.count
            && self.position_generation == other.position_generation
            && self.positions == other.positions
            && self.colors == other.colors
    }
}
