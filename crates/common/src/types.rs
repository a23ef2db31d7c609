use rand::Rng;
use serde::{Deserialize, Serialize};

/// One of the three spatial components of a particle position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Offset of this component inside a packed `[x, y, z]` triple.
    pub fn offset(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Half-open interval `[min, max)` used for uniform random draws.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// True when the interval is finite, has a finite width and contains at
    /// least one value.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite()
            && self.max.is_finite()
            && self.min < self.max
            && (self.max - self.min).is_finite()
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value < self.max
    }

    /// Draw a uniform value from the interval.
    ///
    /// Panics if the interval is empty; callers validate ranges up front.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        rng.gen_range(self.min..self.max)
    }
}

/// Render target dimensions derived from the host window.
///
/// The host reports a physical size and a scale factor. The pixel ratio used
/// for rendering is the scale factor capped at `max_pixel_ratio`, and the
/// render size is the logical size multiplied by that ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub logical_width: f64,
    pub logical_height: f64,
    pub pixel_ratio: f64,
}

impl Viewport {
    pub fn from_physical(width: u32, height: u32, scale_factor: f64, max_pixel_ratio: f64) -> Self {
        let scale = if scale_factor > 0.0 { scale_factor } else { 1.0 };
        Self {
            logical_width: width as f64 / scale,
            logical_height: height as f64 / scale,
            pixel_ratio: scale.min(max_pixel_ratio),
        }
    }

    /// Width over height. A zero height is treated as 1.
    pub fn aspect(&self) -> f32 {
        (self.logical_width / self.logical_height.max(1.0)) as f32
    }

    /// Size of the render surface in pixels, never smaller than 1x1.
    pub fn render_size(&self) -> (u32, u32) {
        let w = (self.logical_width * self.pixel_ratio).round() as u32;
        let h = (self.logical_height * self.pixel_ratio).round() as u32;
        (w.max(1), h.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn axis_offsets() {
        assert_eq!(Axis::X.offset(), 0);
        assert_eq!(Axis::Y.offset(), 1);
        assert_eq!(Axis::Z.offset(), 2);
    }

    #[test]
    fn range_validity() {
        assert!(ValueRange::new(-5.0, 5.0).is_valid());
        assert!(!ValueRange::new(1.0, 1.0).is_valid());
        assert!(!ValueRange::new(2.0, 1.0).is_valid());
        assert!(!ValueRange::new(f32::NEG_INFINITY, 1.0).is_valid());
    }

    #[test]
    fn range_width_must_fit_in_f32() {
        assert!(!ValueRange::new(-3.0e38, 3.0e38).is_valid());
        assert!(!ValueRange::new(f32::MIN, f32::MAX).is_valid());
        let wide = ValueRange::new(-1.0e37, 1.0e37);
        assert!(wide.is_valid());
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            assert!(wide.contains(wide.sample(&mut rng)));
        }
    }

    #[test]
    fn samples_stay_in_half_open_range() {
        let range = ValueRange::new(-5.0, 5.0);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1000 {
            assert!(range.contains(range.sample(&mut rng)));
        }
    }

    #[test]
    fn viewport_caps_pixel_ratio() {
        let vp = Viewport::from_physical(3000, 1500, 3.0, 2.0);
        assert_eq!(vp.pixel_ratio, 2.0);
        assert_eq!(vp.logical_width, 1000.0);
        assert_eq!(vp.render_size(), (2000, 1000));
        assert!((vp.aspect() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn viewport_keeps_low_ratio() {
        let vp = Viewport::from_physical(1280, 720, 1.0, 2.0);
        assert_eq!(vp.pixel_ratio, 1.0);
        assert_eq!(vp.render_size(), (1280, 720));
    }

    #[test]
    fn viewport_minimized_window() {
        let vp = Viewport::from_physical(0, 0, 1.0, 2.0);
        assert_eq!(vp.render_size(), (1, 1));
        assert!(vp.aspect().is_finite());
    }
}
