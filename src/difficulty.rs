use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named difficulty presets offered on the selection screen
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Level {
    Easy,
    Medium,
    Hard,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Easy, Level::Medium, Level::Hard];

    pub fn difficulty(self) -> Difficulty {
        match self {
            Level::Easy => Difficulty::preset("easy", 1, 100, 7, 60),
            Level::Medium => Difficulty::preset("medium", 1, 150, 5, 45),
            Level::Hard => Difficulty::preset("hard", 1, 200, 5, 30),
        }
    }

    pub fn next(self) -> Self {
        match self {
            Level::Easy => Level::Medium,
            Level::Medium => Level::Hard,
            Level::Hard => Level::Easy,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Level::Easy => Level::Hard,
            Level::Medium => Level::Easy,
            Level::Hard => Level::Medium,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DifficultyError {
    EmptyName,
    InvertedRange { min: i64, max: i64 },
    NoAttempts,
    NoTime,
}

impl fmt::Display for DifficultyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DifficultyError::EmptyName => write!(f, "difficulty name must not be empty"),
            DifficultyError::InvertedRange { min, max } => {
                write!(f, "range minimum {} is greater than maximum {}", min, max)
            }
            DifficultyError::NoAttempts => write!(f, "attempt budget must be at least 1"),
            DifficultyError::NoTime => write!(f, "time budget must be at least 1 second"),
        }
    }
}

impl std::error::Error for DifficultyError {}

/// Range, attempt budget and time budget for one kind of game.
///
/// The name doubles as the high score key, see [`Difficulty::high_score_key`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Difficulty {
    name: String,
    min: i64,
    max: i64,
    attempts: u32,
    time_secs: u32,
}

impl Difficulty {
    pub fn new(
        name: impl Into<String>,
        min: i64,
        max: i64,
        attempts: u32,
        time_secs: u32,
    ) -> Result<Self, DifficultyError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DifficultyError::EmptyName);
        }
        if min > max {
            return Err(DifficultyError::InvertedRange { min, max });
        }
        if attempts == 0 {
            return Err(DifficultyError::NoAttempts);
        }
        if time_secs == 0 {
            return Err(DifficultyError::NoTime);
        }
        Ok(Self {
            name,
            min,
            max,
            attempts,
            time_secs,
        })
    }

    fn preset(name: &str, min: i64, max: i64, attempts: u32, time_secs: u32) -> Self {
        Self {
            name: name.to_string(),
            min,
            max,
            attempts,
            time_secs,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn time_secs(&self) -> u32 {
        self.time_secs
    }

    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Key the persisted high score for this difficulty lives under
    pub fn high_score_key(&self) -> String {
        crate::high_scores::high_score_key(&self.name)
    }
}

impl From<Level> for Difficulty {
    fn from(level: Level) -> Self {
        level.difficulty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_match_published_budgets() {
        let easy = Level::Easy.difficulty();
        assert_eq!((easy.min(), easy.max()), (1, 100));
        assert_eq!((easy.attempts(), easy.time_secs()), (7, 60));

        let medium = Level::Medium.difficulty();
        assert_eq!((medium.min(), medium.max()), (1, 150));
        assert_eq!((medium.attempts(), medium.time_secs()), (5, 45));

        let hard = Level::Hard.difficulty();
        assert_eq!((hard.min(), hard.max()), (1, 200));
        assert_eq!((hard.attempts(), hard.time_secs()), (5, 30));
    }

    #[test]
    fn preset_names_follow_level_display() {
        for level in Level::ALL {
            assert_eq!(level.difficulty().name(), level.to_string());
        }
    }

    #[test]
    fn high_score_key_is_prefixed_name() {
        assert_eq!(Level::Medium.difficulty().high_score_key(), "highScore_medium");
    }

    #[test]
    fn contains_is_inclusive() {
        let d = Difficulty::new("tiny", 3, 5, 1, 1).unwrap();
        assert!(d.contains(3));
        assert!(d.contains(5));
        assert!(!d.contains(2));
        assert!(!d.contains(6));
    }

    #[test]
    fn rejects_invalid_descriptors() {
        assert_eq!(
            Difficulty::new("x", 10, 1, 3, 3),
            Err(DifficultyError::InvertedRange { min: 10, max: 1 })
        );
        assert_eq!(Difficulty::new("x", 1, 10, 0, 3), Err(DifficultyError::NoAttempts));
        assert_eq!(Difficulty::new("x", 1, 10, 3, 0), Err(DifficultyError::NoTime));
        assert_eq!(Difficulty::new("  ", 1, 10, 3, 3), Err(DifficultyError::EmptyName));
    }

    #[test]
    fn level_cycles_both_ways() {
        for level in Level::ALL {
            assert_eq!(level.next().prev(), level);
        }
        assert_eq!(Level::Hard.next(), Level::Easy);
    }
}
