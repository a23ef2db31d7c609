//! Developer Tooling: read-only field inspection and frame statistics.
//!
//! # Invariants
//! - Tools never mutate the particle field.

pub mod inspector;
pub mod stats;

pub use inspector::{FieldInspector, FieldSummary, ParticleInfo};
pub use stats::FrameStats;

pub fn crate_info() -> &'static str {
    "wavefield-tools v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("tools"));
    }
}
