//! Rendering Adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers borrow the particle buffer read-only.
//! - Render output derives from the buffer and the view alone.
//!
//! The text renderer here backs the CLI and tests; the GPU backend lives in
//! `wavefield-render-wgpu`.

mod renderer;

pub use renderer::{DebugTextRenderer, RenderView, Renderer};

pub fn crate_info() -> &'static str {
    "wavefield-render v0.1.0"
}
