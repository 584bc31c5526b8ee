//! One-day stepping and the swipe gesture that triggers it.

use crate::tasks::TaskDate;

/// Horizontal release distance past which a swipe changes the day.
pub const SWIPE_THRESHOLD: f32 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Next day.
    Forward,
    /// Previous day.
    Backward,
}

impl Direction {
    /// Direction for a swipe released at `translation_x`. Swiping left moves
    /// forward. Short swipes return `None`; magnitude never changes the step.
    pub fn from_swipe(translation_x: f32) -> Option<Self> {
        if translation_x.abs() <= SWIPE_THRESHOLD {
            None
        } else if translation_x < 0.0 {
            Some(Direction::Forward)
        } else {
            Some(Direction::Backward)
        }
    }
}

/// Moves exactly one calendar day.
pub fn step(date: TaskDate, direction: Direction) -> TaskDate {
    match direction {
        Direction::Forward => date.succ(),
        Direction::Backward => date.pred(),
    }
}
