//! Particle sprite assets.
//!
//! The renderer consumes decoded RGBA8 pixels, never file paths. A mask that
//! cannot be loaded is not fatal: callers fall back to an opaque 1x1 mask and
//! the particles render as plain squares.

use std::path::Path;

/// Errors from loading an alpha mask.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image decode error: {0}")]
    Decode(#[from] image::ImageError),
    #[error("image has zero size")]
    Empty,
}

/// Decoded RGBA8 texture used to mask each point sprite.
///
/// Only the green channel is sampled as alpha, so grayscale masks and masks
/// with a meaningless alpha channel both work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphaMask {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl AlphaMask {
    /// A 1x1 white mask: every texel fully visible.
    pub fn opaque() -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: vec![255; 4],
        }
    }

    /// Decode an encoded image (PNG).
    pub fn from_bytes(data: &[u8]) -> Result<Self, AssetError> {
        let img = image::load_from_memory(data)?.to_rgba8();
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(AssetError::Empty);
        }
        Ok(Self {
            width,
            height,
            rgba: img.into_raw(),
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_bytes(&data)
    }

    /// Load a mask, or log a warning and return [`AlphaMask::opaque`].
    pub fn load_or_opaque(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(mask) => {
                tracing::info!(
                    "loaded alpha mask {} ({}x{})",
                    path.display(),
                    mask.width,
                    mask.height
                );
                mask
            }
            Err(e) => {
                tracing::warn!(
                    "failed to load alpha mask {}: {e}; rendering without mask",
                    path.display()
                );
                Self::opaque()
            }
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 texels, row-major.
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// Mask value at a texel, as sampled by the particle shader.
    pub fn alpha_at(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 4 + 1) as usize;
        self.rgba.get(idx).copied()
    }
}

pub fn crate_info() -> &'static str {
    "wavefield-assets v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn write_png(dir: &Path, name: &str) -> std::path::PathBuf {
        let mut img = RgbaImage::new(2, 2);
        img.put_pixel(0, 0, Rgba([0, 255, 0, 0]));
        img.put_pixel(1, 0, Rgba([255, 0, 255, 255]));
        img.put_pixel(0, 1, Rgba([10, 128, 10, 255]));
        img.put_pixel(1, 1, Rgba([0, 0, 0, 255]));
        let path = dir.join(name);
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn opaque_mask() {
        let mask = AlphaMask::opaque();
        assert_eq!((mask.width(), mask.height()), (1, 1));
        assert_eq!(mask.alpha_at(0, 0), Some(255));
        assert_eq!(mask.rgba().len(), 4);
    }

    #[test]
    fn load_png_reads_green_channel() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "mask.png");
        let mask = AlphaMask::load(&path).unwrap();
        assert_eq!((mask.width(), mask.height()), (2, 2));
        assert_eq!(mask.rgba().len(), 16);
        assert_eq!(mask.alpha_at(0, 0), Some(255));
        assert_eq!(mask.alpha_at(1, 0), Some(0));
        assert_eq!(mask.alpha_at(0, 1), Some(128));
        assert_eq!(mask.alpha_at(2, 0), None);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AlphaMask::load(dir.path().join("missing.png")).unwrap_err();
        assert!(matches!(err, AssetError::Io(_)));
    }

    #[test]
    fn garbage_is_decode_error() {
        let err = AlphaMask::from_bytes(b"definitely not a png").unwrap_err();
        assert!(matches!(err, AssetError::Decode(_)));
    }

    #[test]
    fn missing_file_falls_back_to_opaque() {
        let dir = tempfile::tempdir().unwrap();
        let mask = AlphaMask::load_or_opaque(dir.path().join("missing.png"));
        assert_eq!(mask, AlphaMask::opaque());
    }

    #[test]
    fn fallback_keeps_real_mask() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "mask.png");
        let mask = AlphaMask::load_or_opaque(&path);
        assert_eq!(mask.width(), 2);
    }
}
