//! Navigation, autoplay and transition timing for the hero slideshow.
//!
//! Nothing in here touches the GPU. The renderer calls [`Slideshow::tick`]
//! once per display frame with the frame's timestamp and mirrors the
//! returned [`TransitionState`] into shader uniforms.
//!
//! ```text
//!   next() / previous() / goto(i) ──┐
//!                                   ├─▶ request_transition ─▶ TransitionClock
//!   Autoplay::poll ── next() ───────┘                              │
//!                                                                  ▼
//!                          tick(now) ─▶ progress ─▶ swap on completion
//! ```

mod autoplay;
mod clock;
mod easing;
mod transition;

use std::time::{Duration, Instant};

pub use autoplay::Autoplay;
pub use clock::{ClockSample, TransitionClock};
pub use easing::Easing;
pub use transition::{Direction, TransitionState};

/// Length of every transition.
pub const TRANSITION_DURATION: Duration = Duration::from_millis(1400);

/// Autoplay interval used when the caller does not pick one.
pub const DEFAULT_AUTOPLAY_INTERVAL: Duration = Duration::from_millis(5000);

#[derive(Debug, thiserror::Error)]
pub enum SlideshowError {
    #[error("a slideshow needs at least one slide")]
    Empty,
}

/// Whether the deck's textures are usable yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Loading,
    Ready,
    /// Asset loading failed; every transition request is rejected from now on.
    Failed,
}

/// Reported by the frame that finishes a transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Completion {
    pub from: usize,
    /// The new resting index.
    pub to: usize,
    pub direction: Direction,
    /// Eased progress observed on the completing frame; always `1.0`.
    pub progress: f32,
}

/// Result of one [`Slideshow::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUpdate {
    /// State to render this frame.
    pub state: TransitionState,
    pub completed: Option<Completion>,
    /// Set when an autoplay tick started a new transition on this frame.
    pub autoplay_started: bool,
}

/// Navigation and autoplay controller.
///
/// At most one transition is in flight. Requests that arrive while one is
/// running, before the deck is ready, or that target the resting slide are
/// dropped without side effects.
#[derive(Debug, Clone)]
pub struct Slideshow {
    slide_count: usize,
    resting: usize,
    readiness: Readiness,
    state: TransitionState,
    clock: Option<TransitionClock>,
    autoplay: Autoplay,
}

impl Slideshow {
    pub fn new(slide_count: usize, autoplay: Option<Duration>) -> Result<Self, SlideshowError> {
        if slide_count == 0 {
            return Err(SlideshowError::Empty);
        }
        Ok(Self {
            slide_count,
            resting: 0,
            readiness: Readiness::Loading,
            state: TransitionState::resting(0),
            clock: None,
            autoplay: Autoplay::new(autoplay),
        })
    }

    pub fn slide_count(&self) -> usize {
        self.slide_count
    }

    /// Index of the slide currently at rest (the one the overlay describes).
    pub fn current_index(&self) -> usize {
        self.resting
    }

    pub fn is_transitioning(&self) -> bool {
        self.state.active
    }

    pub fn state(&self) -> TransitionState {
        self.state
    }

    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    pub fn autoplay(&self) -> &Autoplay {
        &self.autoplay
    }

    /// All textures are resident; transitions may start and the autoplay
    /// grid is anchored at `now`.
    pub fn mark_ready(&mut self, now: Instant) {
        if self.readiness == Readiness::Loading {
            self.readiness = Readiness::Ready;
            self.autoplay.arm(now);
        }
    }

    pub fn mark_failed(&mut self) {
        self.readiness = Readiness::Failed;
        self.autoplay.disarm();
        self.clock = None;
        self.state = TransitionState::resting(self.resting);
    }

    pub fn next(&mut self, now: Instant) -> bool {
        let target = (self.resting + 1) % self.slide_count;
        self.request_transition(target, now)
    }

    pub fn previous(&mut self, now: Instant) -> bool {
        let target = (self.resting + self.slide_count - 1) % self.slide_count;
        self.request_transition(target, now)
    }

    pub fn goto(&mut self, index: usize, now: Instant) -> bool {
        self.request_transition(index, now)
    }

    fn request_transition(&mut self, target: usize, now: Instant) -> bool {
        if self.state.active
            || self.readiness != Readiness::Ready
            || target >= self.slide_count
            || target == self.resting
        {
            return false;
        }

        self.state = TransitionState {
            from: self.resting,
            to: target,
            progress: 0.0,
            direction: Direction::between(self.resting, target, self.slide_count),
            active: true,
        };
        self.clock = Some(TransitionClock::new(
            TRANSITION_DURATION,
            Easing::CubicInOut,
            now,
        ));
        true
    }

    /// Advances the running transition, then services autoplay.
    pub fn tick(&mut self, now: Instant) -> FrameUpdate {
        let completed = self.advance(now);
        let autoplay_started = self.autoplay.poll(now) && self.next(now);
        FrameUpdate {
            state: self.state,
            completed,
            autoplay_started,
        }
    }

    fn advance(&mut self, now: Instant) -> Option<Completion> {
        let sample = self.clock.as_ref()?.sample(now);
        self.state.progress = self.state.progress.max(sample.eased);
        if !sample.finished {
            return None;
        }

        let completion = Completion {
            from: self.state.from,
            to: self.state.to,
            direction: self.state.direction,
            progress: self.state.progress,
        };
        self.resting = completion.to;
        self.state = TransitionState::resting(self.resting);
        self.clock = None;
        Some(completion)
    }
}
