use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How much a hint gives away
#[derive(
    Debug,
    Copy,
    Clone,
    Default,
    PartialEq,
    Eq,
    ValueEnum,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HintStyle {
    /// direction only
    Simple,
    /// direction plus a proximity tier
    #[default]
    Graded,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Higher,
    Lower,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Proximity {
    VeryClose,
    Closer,
    Warm,
    Cold,
}

impl Proximity {
    pub fn from_distance(distance: u64) -> Self {
        match distance {
            0..=3 => Proximity::VeryClose,
            4..=10 => Proximity::Closer,
            11..=25 => Proximity::Warm,
            _ => Proximity::Cold,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Proximity::VeryClose => "very close",
            Proximity::Closer => "closer",
            Proximity::Warm => "warm",
            Proximity::Cold => "cold",
        }
    }
}

/// Feedback for a guess that neither won nor used up the last attempt
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Hint {
    pub direction: Direction,
    pub proximity: Option<Proximity>,
}

impl Hint {
    pub fn evaluate(guess: i64, target: i64, style: HintStyle) -> Self {
        let direction = if guess < target {
            Direction::Higher
        } else {
            Direction::Lower
        };
        let proximity = match style {
            HintStyle::Simple => None,
            HintStyle::Graded => Some(Proximity::from_distance(guess.abs_diff(target))),
        };
        Self {
            direction,
            proximity,
        }
    }

    pub fn message(&self) -> String {
        let base = match self.direction {
            Direction::Higher => "Too low! Try a higher number",
            Direction::Lower => "Too high! Try a lower number",
        };
        match self.proximity {
            Some(p) => format!("{} ({})", base, p.label()),
            None => base.to_string(),
        }
    }
}

/// Feasible interval left after the guesses so far, and the guess that halves it
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StrategyHint {
    pub low: i64,
    pub high: i64,
}

impl StrategyHint {
    pub fn new(min: i64, max: i64) -> Self {
        Self {
            low: min,
            high: max,
        }
    }

    /// Narrow the interval with the direction learned from `guess`
    pub fn narrow(&mut self, guess: i64, direction: Direction) {
        match direction {
            Direction::Higher => self.low = self.low.max(guess.saturating_add(1)),
            Direction::Lower => self.high = self.high.min(guess.saturating_sub(1)),
        }
    }

    pub fn suggestion(&self) -> i64 {
        // widened so the full i64 range cannot overflow; the midpoint always fits
        let (low, high) = (i128::from(self.low), i128::from(self.high));
        (low + (high - low) / 2) as i64
    }

    pub fn message(&self) -> String {
        format!(
            "It's between {} and {}; try {}",
            self.low,
            self.high,
            self.suggestion()
        )
    }
}
