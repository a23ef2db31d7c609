//! wgpu render backend for wavefield.
//!
//! Draws every particle as a camera-facing, alpha-masked sprite with additive
//! blending. The camera orbits a target point with optional damping.
//!
//! # Invariants
//! - The renderer never mutates the particle buffer.
//! - Positions are re-uploaded only when the buffer generation changes.
//! - Camera motion is independent of the animation clock.

mod camera;
mod gpu;
mod shaders;

pub use camera::OrbitCamera;
pub use gpu::{PointStyle, PointsRenderer};
