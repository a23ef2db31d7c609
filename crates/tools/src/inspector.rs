use serde::Serialize;
use wavefield_kernel::{Animator, ParticleBuffer, ParticleField};

/// Field inspector for developer tooling.
///
/// Provides read-only queries against the particle field for the debug
/// panel, the CLI and logging.
pub struct FieldInspector;

impl FieldInspector {
    /// Produce a summary of the field state.
    pub fn summary<A: Animator>(field: &ParticleField<A>) -> FieldSummary {
        let buffer = field.buffer();
        let (y_min, y_max) = buffer.y_extent().unwrap_or((0.0, 0.0));
        FieldSummary {
            frame: field.frame(),
            elapsed_secs: field.elapsed_secs(),
            particle_count: buffer.count(),
            position_generation: buffer.position_generation(),
            y_min,
            y_max,
        }
    }

    /// Position and color of one particle, or `None` when out of range.
    pub fn inspect_particle(buffer: &ParticleBuffer, index: usize) -> Option<ParticleInfo> {
        if index >= buffer.count() {
            return None;
        }
        Some(ParticleInfo {
            index,
            position: buffer.position(index).to_array(),
            color: buffer.color(index),
        })
    }
}

/// Summary of field state for the inspector.
#[derive(Debug, Clone, Serialize)]
pub struct FieldSummary {
    pub frame: u64,
    pub elapsed_secs: f64,
    pub particle_count: usize,
    pub position_generation: u64,
    pub y_min: f32,
    pub y_max: f32,
}

impl std::fmt::Display for FieldSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Field: frame={} t={:.3}s particles={} generation={} y=[{:.3}, {:.3}]",
            self.frame,
            self.elapsed_secs,
            self.particle_count,
            self.position_generation,
            self.y_min,
            self.y_max
        )
    }
}

/// Detailed info about a single particle.
#[derive(Debug, Clone, Serialize)]
pub struct ParticleInfo {
    pub index: usize,
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl std::fmt::Display for ParticleInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Particle [{}] pos=({:.3}, {:.3}, {:.3}) rgb=({:.2}, {:.2}, {:.2})",
            self.index,
            self.position[0],
            self.position[1],
            self.position[2],
            self.color[0],
            self.color[1],
            self.color[2],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> ParticleField {
        let buffer = ParticleBuffer::from_components(
            vec![0.0, 0.0, 1.0, 1.0, 0.0, 2.0],
            vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6],
        )
        .unwrap();
        ParticleField::from_buffer(buffer)
    }

    #[test]
    fn summary_fresh_field() {
        let summary = FieldInspector::summary(&field());
        assert_eq!(summary.frame, 0);
        assert_eq!(summary.particle_count, 2);
        assert_eq!(summary.position_generation, 0);
    }

    #[test]
    fn summary_after_frames() {
        let mut field = field();
        field.advance(0.0);
        field.advance(1.0);

        let summary = FieldInspector::summary(&field);
        assert_eq!(summary.frame, 2);
        assert_eq!(summary.elapsed_secs, 1.0);
        assert_eq!(summary.position_generation, 2);
        // y = sin(1 + x) for x in {0, 1}
        assert!((summary.y_min - 1.0_f32.sin()).abs() < 1e-6);
        assert!((summary.y_max - 2.0_f32.sin()).abs() < 1e-6);
    }

    #[test]
    fn summary_empty_field() {
        let buffer = ParticleBuffer::from_components(vec![], vec![]).unwrap();
        let summary = FieldInspector::summary(&ParticleField::from_buffer(buffer));
        assert_eq!(summary.particle_count, 0);
        assert_eq!((summary.y_min, summary.y_max), (0.0, 0.0));
    }

    #[test]
    fn inspect_particle_found() {
        let field = field();
        let info = FieldInspector::inspect_particle(field.buffer(), 1).unwrap();
        assert_eq!(info.position, [1.0, 0.0, 2.0]);
        assert_eq!(info.color, [0.4, 0.5, 0.6]);
    }

    #[test]
    fn inspect_particle_not_found() {
        let field = field();
        assert!(FieldInspector::inspect_particle(field.buffer(), 2).is_none());
    }

    #[test]
    fn summary_display() {
        let summary = FieldInspector::summary(&field());
        let s = format!("{summary}");
        assert!(s.contains("frame=0"));
        assert!(s.contains("particles=2"));
    }

    #[test]
    fn summary_serializes() {
        let json = serde_json::to_value(FieldInspector::summary(&field())).unwrap();
        assert_eq!(json["particle_count"], 2);
    }
}
