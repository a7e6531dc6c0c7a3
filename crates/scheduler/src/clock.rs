use std::time::{Duration, Instant};

use crate::easing::Easing;

/// One clock reading taken during a transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockSample {
    /// Linear progress, `min(elapsed / duration, 1)`.
    pub raw: f32,
    /// `raw` passed through the clock's easing curve.
    pub eased: f32,
    pub finished: bool,
}

/// Wall-clock envelope for a single transition.
#[derive(Debug, Clone, Copy)]
pub struct TransitionClock {
    start: Instant,
    duration: Duration,
    easing: Easing,
}

impl TransitionClock {
    pub fn new(duration: Duration, easing: Easing, now: Instant) -> Self {
        Self {
            start: now,
            duration,
            easing,
        }
    }

    pub fn sample(&self, now: Instant) -> ClockSample {
        let elapsed = now.saturating_duration_since(self.start);
        let raw = if self.duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
        };
        ClockSample {
            raw,
            eased: self.easing.sample(raw),
            finished: raw >= 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_linear_progress_before_easing() {
        let start = Instant::now();
        let clock = TransitionClock::new(Duration::from_millis(100), Easing::Linear, start);
        let sample = clock.sample(start + Duration::from_millis(50));
        assert!((sample.raw - 0.5).abs() < 0.01);
        assert!((sample.eased - sample.raw).abs() < 1e-6);
        assert!(!sample.finished);
    }

    #[test]
    fn clamps_after_duration() {
        let start = Instant::now();
        let clock = TransitionClock::new(Duration::from_millis(100), Easing::CubicInOut, start);
        let sample = clock.sample(start + Duration::from_secs(3));
        assert_eq!(sample.raw, 1.0);
        assert_eq!(sample.eased, 1.0);
        assert!(sample.finished);
    }

    #[test]
    fn earlier_timestamps_read_as_zero() {
        let start = Instant::now() + Duration::from_secs(1);
        let clock = TransitionClock::new(Duration::from_millis(100), Easing::CubicInOut, start);
        let sample = clock.sample(start - Duration::from_millis(500));
        assert_eq!(sample.raw, 0.0);
        assert!(!sample.finished);
    }

    #[test]
    fn zero_duration_finishes_immediately() {
        let start = Instant::now();
        let clock = TransitionClock::new(Duration::ZERO, Easing::CubicInOut, start);
        assert!(clock.sample(start).finished);
    }
}
