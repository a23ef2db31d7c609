use crate::types::ValueRange;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors from loading or validating a scene configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Perspective camera and orbit-control settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Starting distance from the orbit target along +Z.
    pub distance: f32,
    pub enable_damping: bool,
    pub damping_factor: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 100.0,
            distance: 3.0,
            enable_damping: true,
            damping_factor: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Startup configuration for the particle scene.
///
/// Every field has a default, so an empty YAML document is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub particle_count: usize,
    pub position_range: ValueRange,
    pub color_range: ValueRange,
    /// Fixed RNG seed. `None` seeds from OS entropy.
    pub seed: Option<u64>,
    pub point_size: f32,
    pub size_attenuation: bool,
    /// Image whose green channel masks each point sprite.
    pub alpha_mask: PathBuf,
    pub camera: CameraConfig,
    pub max_pixel_ratio: f64,
    pub window: WindowConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            particle_count: 20_000,
            position_range: ValueRange::new(-5.0, 5.0),
            color_range: ValueRange::new(0.0, 1.0),
            seed: None,
            point_size: 0.1,
            size_attenuation: true,
            alpha_mask: PathBuf::from("textures/particles/2.png"),
            camera: CameraConfig::default(),
            max_pixel_ratio: 2.0,
            window: WindowConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Read a YAML config file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&text)?;
        tracing::debug!("loaded scene config from {}", path.display());
        Ok(config)
    }

    /// Parse a YAML document and validate it.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if u32::try_from(self.particle_count).is_err() {
            return Err(ConfigError::invalid(
                "particle_count",
                format!("{} exceeds u32::MAX", self.particle_count),
            ));
        }
        if !self.position_range.is_valid() {
            return Err(ConfigError::invalid(
                "position_range",
                format!("{:?} is empty, not finite or too wide", self.position_range),
            ));
        }
        if !self.color_range.is_valid() {
            return Err(ConfigError::invalid(
                "color_range",
                format!("{:?} is empty, not finite or too wide", self.color_range),
            ));
        }
        if self.point_size.is_nan() || self.point_size <= 0.0 {
            return Err(ConfigError::invalid("point_size", "must be positive"));
        }
        if self.max_pixel_ratio.is_nan() || self.max_pixel_ratio <= 0.0 {
            return Err(ConfigError::invalid("max_pixel_ratio", "must be positive"));
        }
        let cam = &self.camera;
        if cam.near.is_nan() || cam.near <= 0.0 || cam.near >= cam.far {
            return Err(ConfigError::invalid(
                "camera",
                format!("near ({}) must be positive and below far ({})", cam.near, cam.far),
            ));
        }
        if cam.fov_degrees.is_nan() || cam.fov_degrees <= 0.0 || cam.fov_degrees >= 180.0 {
            return Err(ConfigError::invalid("camera.fov_degrees", "must be in (0, 180)"));
        }
        if !(0.0..=1.0).contains(&cam.damping_factor) {
            return Err(ConfigError::invalid("camera.damping_factor", "must be in [0, 1]"));
        }
        Ok(())
    }
}
