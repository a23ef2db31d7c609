use std::time::{Duration, Instant};

/// Monotonic animation clock.
///
/// Elapsed time is zero on the first tick and measured from that tick on,
/// so the first frame always animates at `t = 0`.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    start: Option<Instant>,
    elapsed: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample the clock at the current instant.
    pub fn tick(&mut self) -> f64 {
        self.tick_at(Instant::now())
    }

    /// Sample the clock at `now`. An instant earlier than a previous sample
    /// never moves elapsed time backwards.
    pub fn tick_at(&mut self, now: Instant) -> f64 {
        let start = *self.start.get_or_insert(now);
        self.elapsed = self.elapsed.max(now.saturating_duration_since(start));
        self.elapsed.as_secs_f64()
    }

    /// Elapsed seconds as of the last tick.
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    pub fn is_started(&self) -> bool {
        self.start.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_is_zero() {
        let mut clock = FrameClock::new();
        assert!(!clock.is_started());
        assert_eq!(clock.tick_at(Instant::now()), 0.0);
        assert!(clock.is_started());
    }

    #[test]
    fn measures_from_first_tick() {
        let mut clock = FrameClock::new();
        let t0 = Instant::now();
        clock.tick_at(t0);
        let t = clock.tick_at(t0 + Duration::from_millis(1500));
        assert!((t - 1.5).abs() < 1e-9);
        assert!((clock.elapsed_secs() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn never_decreases() {
        let mut clock = FrameClock::new();
        let t0 = Instant::now();
        clock.tick_at(t0);
        clock.tick_at(t0 + Duration::from_secs(2));
        let t = clock.tick_at(t0 + Duration::from_secs(1));
        assert!((t - 2.0).abs() < 1e-9);
    }
}
