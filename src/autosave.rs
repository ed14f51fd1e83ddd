//! Periodic autosave timer
//!
//! Driven cooperatively by the host's update loop; it never runs on its own
//! thread. Each firing is independent: there is no backoff and no
//! skip-if-busy, the dirty flag makes repeated saves cheap.

/// Default autosave interval in seconds
pub const DEFAULT_AUTOSAVE_INTERVAL: f64 = 30.0;

#[derive(Debug, Clone)]
pub struct AutosaveTimer {
    interval: f64,
    elapsed: f64,
    enabled: bool,
}

impl Default for AutosaveTimer {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOSAVE_INTERVAL)
    }
}

impl AutosaveTimer {
    /// Disabled timer with the given interval (clamped to be positive)
    pub fn new(interval: f64) -> Self {
        Self {
            interval: interval.max(f64::EPSILON),
            elapsed: 0.0,
            enabled: false,
        }
    }

    pub fn start(&mut self) {
        self.enabled = true;
        self.elapsed = 0.0;
    }

    pub fn stop(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Advance by `dt` seconds. Returns true if at least one interval
    /// boundary was crossed; a long frame still fires only once.
    pub fn tick(&mut self, dt: f64) -> bool {
        if !self.enabled || !dt.is_finite() || dt <= 0.0 {
            return false;
        }
        self.elapsed += dt;
        if self.elapsed < self.interval {
            return false;
        }
        self.elapsed %= self.interval;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_timer_never_fires() {
        let mut timer = AutosaveTimer::default();
        assert!(!timer.tick(1000.0));
    }

    #[test]
    fn test_fires_every_interval() {
        let mut timer = AutosaveTimer::new(1.0);
        timer.start();

        let fired: Vec<bool> = (0..8).map(|_| timer.tick(0.25)).collect();
        assert_eq!(
            fired,
            vec![false, false, false, true, false, false, false, true]
        );
    }

    #[test]
    fn test_long_frame_fires_once_and_keeps_remainder() {
        let mut timer = AutosaveTimer::new(30.0);
        timer.start();
        assert!(timer.tick(95.0));
        // 5 seconds carried over
        assert!(!timer.tick(20.0));
        assert!(timer.tick(5.0));
    }

    #[test]
    fn test_non_finite_dt_is_ignored() {
        let mut timer = AutosaveTimer::new(1.0);
        timer.start();
        assert!(!timer.tick(f64::NAN));
        assert!(!timer.tick(f64::INFINITY));
        assert!(timer.tick(1.0));
    }

    #[test]
    fn test_stop_halts_firing() {
        let mut timer = AutosaveTimer::new(2.0);
        timer.start();
        timer.stop();
        assert!(!timer.tick(5.0));
        assert!(!timer.is_enabled());
    }
}
