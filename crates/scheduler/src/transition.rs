/// Direction of travel through the deck; picks the sign of the blur vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    /// Classifies a move from `current` to `target` in a deck of `count` slides.
    ///
    /// Stepping off either end of the deck keeps the direction of the step:
    /// last → first is forward, first → last is backward. Everything else
    /// compares indices.
    pub fn between(current: usize, target: usize, count: usize) -> Self {
        let last = count.saturating_sub(1);
        if current == last && target == 0 {
            return Direction::Forward;
        }
        if target == current + 1 {
            return Direction::Forward;
        }
        if current == 0 && target == last {
            return Direction::Backward;
        }
        if target > current {
            Direction::Forward
        } else {
            Direction::Backward
        }
    }

    /// Blur direction in UV space.
    pub fn vector(self) -> [f32; 2] {
        match self {
            Direction::Forward => [1.0, 0.0],
            Direction::Backward => [-1.0, 0.0],
        }
    }
}

/// The single transition record. `active == false` is the resting state,
/// where `from == to` and progress is zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionState {
    pub from: usize,
    pub to: usize,
    pub progress: f32,
    pub direction: Direction,
    pub active: bool,
}

impl TransitionState {
    pub fn resting(index: usize) -> Self {
        Self {
            from: index,
            to: index,
            progress: 0.0,
            direction: Direction::Forward,
            active: false,
        }
    }
}
