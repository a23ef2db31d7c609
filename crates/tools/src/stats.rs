use std::time::Duration;

/// Smoothing weight for the newest frame time.
const SMOOTHING: f64 = 0.1;

/// Per-frame timing for the debug panel.
#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    frames: u64,
    last_frame_time: Duration,
    smoothed_secs: Option<f64>,
}

impl FrameStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the wall time spent between two frames.
    pub fn record(&mut self, frame_time: Duration) {
        let secs = frame_time.as_secs_f64();
        self.smoothed_secs = Some(match self.smoothed_secs {
            None => secs,
            Some(prev) => prev + (secs - prev) * SMOOTHING,
        });
        self.last_frame_time = frame_time;
        self.frames += 1;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_frame_time(&self) -> Duration {
        self.last_frame_time
    }

    /// Smoothed frames per second, or 0 before any non-zero frame time.
    pub fn fps(&self) -> f64 {
        match self.smoothed_secs {
            Some(secs) if secs > 0.0 => 1.0 / secs,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stats() {
        let stats = FrameStats::new();
        assert_eq!(stats.frames(), 0);
        assert_eq!(stats.fps(), 0.0);
    }

    #[test]
    fn steady_rate() {
        let mut stats = FrameStats::new();
        for _ in 0..10 {
            stats.record(Duration::from_millis(16));
        }
        assert_eq!(stats.frames(), 10);
        assert!((stats.fps() - 62.5).abs() < 1e-6);
        assert_eq!(stats.last_frame_time(), Duration::from_millis(16));
    }

    #[test]
    fn smooths_spikes() {
        let mut stats = FrameStats::new();
        stats.record(Duration::from_millis(10));
        stats.record(Duration::from_millis(110));
        // 10ms moved 10% toward 110ms
        assert!((stats.fps() - 50.0).abs() < 1e-6);
    }

    #[test]
    fn zero_frame_time() {
        let mut stats = FrameStats::new();
        stats.record(Duration::ZERO);
        assert_eq!(stats.fps(), 0.0);
    }
}
