// Library surface for the binary, headless integration tests and reuse.
pub mod app_dirs;
pub mod celebration;
pub mod config;
pub mod difficulty;
pub mod game;
pub mod high_scores;
pub mod hint;
pub mod runtime;
pub mod session;
pub mod timer;

pub use difficulty::{Difficulty, Level};
pub use game::{Feedback, Game, OutcomeListener};
pub use session::{GameResult, GameSession, GuessError, GuessOutcome, SessionSummary};
