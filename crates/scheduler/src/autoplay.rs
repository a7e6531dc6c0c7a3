use std::time::{Duration, Instant};

/// Fixed-interval timer that asks for `next()`.
///
/// Deadlines sit on a fixed grid anchored at [`Autoplay::arm`]; manual
/// navigation does not move them. Ticks missed during a stall coalesce into a
/// single firing.
#[derive(Debug, Clone)]
pub struct Autoplay {
    interval: Option<Duration>,
    next_due: Option<Instant>,
}

impl Autoplay {
    /// `None` or a zero interval disables autoplay.
    pub fn new(interval: Option<Duration>) -> Self {
        Self {
            interval: interval.filter(|value| !value.is_zero()),
            next_due: None,
        }
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    /// Schedules the first deadline one interval after `now`. An interval
    /// too long to represent as an `Instant` leaves the timer disarmed.
    pub fn arm(&mut self, now: Instant) {
        self.next_due = self.interval.and_then(|interval| now.checked_add(interval));
    }

    pub fn disarm(&mut self) {
        self.next_due = None;
    }

    /// Returns true when a deadline has passed since the previous poll.
    pub fn poll(&mut self, now: Instant) -> bool {
        let (Some(interval), Some(due)) = (self.interval, self.next_due) else {
            return false;
        };
        if now < due {
            return false;
        }
        // First grid point strictly after `now`.
        let interval_nanos = interval.as_nanos();
        let steps = now.duration_since(due).as_nanos() / interval_nanos + 1;
        self.next_due = u64::try_from(steps * interval_nanos)
            .ok()
            .and_then(|nanos| due.checked_add(Duration::from_nanos(nanos)));
        true
    }
}
