use glam::Vec3;
use std::fmt::Write;
use wavefield_kernel::ParticleBuffer;

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 3.0),
            target: Vec3::ZERO,
            fov_degrees: 75.0,
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the particle buffer and a view configuration, then
/// produces output. It never mutates the buffer.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given particles and view.
    fn render(&self, particles: &ParticleBuffer, view: &RenderView) -> Self::Output;
}

/// Text renderer for CLI output, logging and tests.
#[derive(Debug)]
pub struct DebugTextRenderer {
    /// How many particles to list after the header.
    pub max_listed: usize,
}

impl Default for DebugTextRenderer {
    fn default() -> Self {
        Self { max_listed: 8 }
    }
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_listed(max_listed: usize) -> Self {
        Self { max_listed }
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, particles: &ParticleBuffer, view: &RenderView) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Particle Field (count={}, generation={}) ===",
            particles.count(),
            particles.position_generation()
        );
        if let Some((lo, hi)) = particles.y_extent() {
            let _ = writeln!(out, "y range: [{lo:.3}, {hi:.3}]");
        }
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}",
            view.eye.x, view.eye.y, view.eye.z, view.target.x, view.target.y, view.target.z,
            view.fov_degrees
        );

        let listed = particles.count().min(self.max_listed);
        for i in 0..listed {
            let p = particles.position(i);
            let [r, g, b] = particles.color(i);
            let _ = writeln!(
                out,
                "  [{i:>5}] pos=({:.3}, {:.3}, {:.3}) rgb=({r:.2}, {g:.2}, {b:.2})",
                p.x, p.y, p.z
            );
        }
        if particles.count() > listed {
            let _ = writeln!(out, "  ... {} more", particles.count() - listed);
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_particles() -> ParticleBuffer {
        ParticleBuffer::from_components(
            vec![1.0, 2.0, 3.0, -1.0, -0.5, 0.0],
            vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        )
        .unwrap()
    }

    #[test]
    fn debug_renderer_empty_buffer() {
        let buffer = ParticleBuffer::from_components(vec![], vec![]).unwrap();
        let output = DebugTextRenderer::new().render(&buffer, &RenderView::default());

        assert!(output.contains("count=0"));
        assert!(!output.contains("y range"));
        assert!(!output.contains("pos="));
    }

    #[test]
    fn debug_renderer_with_particles() {
        let output = DebugTextRenderer::new().render(&two_particles(), &RenderView::default());

        assert!(output.contains("count=2"));
        assert!(output.contains("y range: [-0.500, 2.000]"));
        assert!(output.contains("pos=(1.000, 2.000, 3.000)"));
        assert!(output.contains("rgb=(0.00, 1.00, 0.00)"));
    }

    #[test]
    fn debug_renderer_truncates_listing() {
        let output =
            DebugTextRenderer::with_max_listed(1).render(&two_particles(), &RenderView::default());

        assert_eq!(output.matches("pos=").count(), 1);
        assert!(output.contains("... 1 more"));
    }

    #[test]
    fn render_view_default() {
        let view = RenderView::default();
        assert_eq!(view.fov_degrees, 75.0);
        assert_eq!(view.eye, Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(view.target, Vec3::ZERO);
    }
}
