use std::fmt;

/// Meditation countdown with one-second resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
    running: bool,
}

impl Countdown {
    pub fn new(minutes: u32, seconds: u32) -> Self {
        let mut countdown = Self::default();
        countdown.set(minutes, seconds);
        countdown
    }

    /// Replaces the remaining time and stops the countdown.
    pub fn set(&mut self, minutes: u32, seconds: u32) {
        self.remaining = minutes.saturating_mul(60).saturating_add(seconds);
        self.running = false;
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Starts only when there is time left.
    pub fn start(&mut self) -> bool {
        self.running = self.remaining > 0;
        self.running
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Advances one second. Returns `true` on the tick that reaches zero.
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }
        if self.remaining <= 1 {
            self.remaining = 0;
            self.running = false;
            return true;
        }
        self.remaining -= 1;
        false
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}
