use std::time::Duration;

const SECOND: Duration = Duration::from_secs(1);

/// One-second countdown owned by a session.
///
/// Nothing happens until [`Countdown::start`]; once stopped it ignores ticks
/// for good. `stop` may be called any number of times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    initial: u32,
    remaining: u32,
    running: bool,
    stopped: bool,
    pending: Duration,
}

impl Countdown {
    pub fn new(secs: u32) -> Self {
        Self {
            initial: secs,
            remaining: secs,
            running: false,
            stopped: false,
            pending: Duration::ZERO,
        }
    }

    pub fn start(&mut self) {
        if !self.stopped {
            self.running = true;
        }
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.stopped = true;
        self.pending = Duration::ZERO;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.initial - self.remaining
    }

    /// Fraction of the budget still left, in `0.0..=1.0`
    pub fn ratio(&self) -> f64 {
        if self.initial == 0 {
            0.0
        } else {
            self.remaining as f64 / self.initial as f64
        }
    }

    /// Count down one second. Returns true when this tick ran the clock out.
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining == 0
    }

    /// Bank `elapsed` wall-clock time and return how many whole seconds are due
    pub fn accumulate(&mut self, elapsed: Duration) -> u32 {
        if !self.running {
            return 0;
        }
        self.pending += elapsed;
        let mut due = 0;
        while self.pending >= SECOND {
            self.pending -= SECOND;
            due += 1;
        }
        due
    }
}
