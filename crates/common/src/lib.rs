//! Shared types and scene configuration for the wavefield workspace.

pub mod config;
pub mod types;

pub use config::{CameraConfig, ConfigError, SceneConfig, WindowConfig};
pub use types::{Axis, ValueRange, Viewport};
