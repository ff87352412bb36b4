use crate::difficulty::Difficulty;
use crate::hint::{Hint, HintStyle, StrategyHint};
use crate::timer::Countdown;
use rand::Rng;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Copy, Clone, PartialEq, Eq, strum_macros::Display)]
pub enum SessionState {
    NotStarted,
    InProgress,
    Won,
    LostExhausted,
    LostTimeout,
}

/// How a finished session ended
#[derive(Debug, Copy, Clone, PartialEq, Eq, strum_macros::Display)]
pub enum GameResult {
    #[strum(serialize = "won")]
    Won,
    #[strum(serialize = "exhausted")]
    LostExhausted,
    #[strum(serialize = "timeout")]
    LostTimeout,
}

impl GameResult {
    pub fn is_win(self) -> bool {
        self == GameResult::Won
    }
}

/// Structured outcome data handed to whoever presents the end of a game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub difficulty: String,
    pub result: GameResult,
    pub score: u32,
    pub target: i64,
    pub attempts_used: u32,
    pub time_taken: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuessOutcome {
    Continue(Hint),
    Finished(SessionSummary),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuessError {
    /// missing, non-numeric or out of range
    InvalidGuess { min: i64, max: i64 },
    SessionOver,
}

impl fmt::Display for GuessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuessError::InvalidGuess { min, max } => {
                write!(f, "Please enter a number between {} and {}", min, max)
            }
            GuessError::SessionOver => write!(f, "This game is over"),
        }
    }
}

impl std::error::Error for GuessError {}

/// One play-through: a hidden target, an attempt budget and a countdown
#[derive(Debug, Clone)]
pub struct GameSession {
    difficulty: Difficulty,
    target: i64,
    attempts_left: u32,
    countdown: Countdown,
    history: Vec<i64>,
    started: bool,
    result: Option<GameResult>,
    hint_style: HintStyle,
    strategy: StrategyHint,
}

impl GameSession {
    pub fn start(difficulty: Difficulty) -> Self {
        Self::start_with_rng(difficulty, &mut rand::thread_rng())
    }

    pub fn start_with_rng<R: Rng + ?Sized>(difficulty: Difficulty, rng: &mut R) -> Self {
        let target = rng.gen_range(difficulty.min()..=difficulty.max());
        Self::build(difficulty, target)
    }

    /// Session with a known target; `None` if the target lies outside the range
    pub fn with_target(difficulty: Difficulty, target: i64) -> Option<Self> {
        difficulty
            .contains(target)
            .then(|| Self::build(difficulty, target))
    }

    fn build(difficulty: Difficulty, target: i64) -> Self {
        log::debug!(
            "new {} session over {}..={}",
            difficulty.name(),
            difficulty.min(),
            difficulty.max()
        );
        Self {
            target,
            attempts_left: difficulty.attempts(),
            countdown: Countdown::new(difficulty.time_secs()),
            history: Vec::new(),
            started: false,
            result: None,
            hint_style: HintStyle::default(),
            strategy: StrategyHint::new(difficulty.min(), difficulty.max()),
            difficulty,
        }
    }

    pub fn with_hint_style(mut self, style: HintStyle) -> Self {
        self.hint_style = style;
        self
    }

    pub fn difficulty(&self) -> &Difficulty {
        &self.difficulty
    }

    pub fn target(&self) -> i64 {
        self.target
    }

    pub fn attempts_left(&self) -> u32 {
        self.attempts_left
    }

    pub fn time_left(&self) -> u32 {
        self.countdown.remaining()
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn history(&self) -> &[i64] {
        &self.history
    }

    pub fn strategy(&self) -> &StrategyHint {
        &self.strategy
    }

    pub fn has_started(&self) -> bool {
        self.started
    }

    pub fn has_ended(&self) -> bool {
        self.result.is_some()
    }

    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    pub fn state(&self) -> SessionState {
        match (self.result, self.started) {
            (Some(GameResult::Won), _) => SessionState::Won,
            (Some(GameResult::LostExhausted), _) => SessionState::LostExhausted,
            (Some(GameResult::LostTimeout), _) => SessionState::LostTimeout,
            (None, true) => SessionState::InProgress,
            (None, false) => SessionState::NotStarted,
        }
    }

    /// Score of a won session, `None` otherwise
    pub fn score(&self) -> Option<u32> {
        self.summary()
            .filter(|s| s.result.is_win())
            .map(|s| s.score)
    }

    pub fn summary(&self) -> Option<SessionSummary> {
        self.result.map(|result| self.summarize(result))
    }

    fn summarize(&self, result: GameResult) -> SessionSummary {
        let score = if result.is_win() {
            self.attempts_left
                .saturating_mul(100)
                .saturating_add(self.countdown.remaining())
        } else {
            0
        };
        SessionSummary {
            difficulty: self.difficulty.name().to_string(),
            result,
            score,
            target: self.target,
            attempts_used: self.difficulty.attempts() - self.attempts_left,
            time_taken: self.countdown.elapsed_secs(),
        }
    }

    /// Parse raw text from the input field and submit it
    pub fn submit_input(&mut self, raw: &str) -> Result<GuessOutcome, GuessError> {
        if self.has_ended() {
            return Err(GuessError::SessionOver);
        }
        let value = raw.trim().parse::<i64>().map_err(|_| self.invalid())?;
        self.submit_guess(value)
    }

    pub fn submit_guess(&mut self, value: i64) -> Result<GuessOutcome, GuessError> {
        if self.has_ended() {
            return Err(GuessError::SessionOver);
        }
        if !self.difficulty.contains(value) {
            return Err(self.invalid());
        }

        if !self.started {
            self.started = true;
            self.countdown.start();
        }

        self.history.push(value);
        self.attempts_left -= 1;

        if value == self.target {
            return Ok(GuessOutcome::Finished(self.finish(GameResult::Won)));
        }
        if self.attempts_left == 0 {
            return Ok(GuessOutcome::Finished(
                self.finish(GameResult::LostExhausted),
            ));
        }

        let hint = Hint::evaluate(value, self.target, self.hint_style);
        self.strategy.narrow(value, hint.direction);
        Ok(GuessOutcome::Continue(hint))
    }

    /// One second of the countdown. Returns the summary if this tick timed the game out.
    pub fn tick(&mut self) -> Option<SessionSummary> {
        if !self.started || self.has_ended() {
            return None;
        }
        if self.countdown.tick() {
            Some(self.finish(GameResult::LostTimeout))
        } else {
            None
        }
    }

    /// Feed wall-clock time from a faster event loop; ticks once per whole second
    pub fn advance(&mut self, elapsed: Duration) -> Option<SessionSummary> {
        if self.has_ended() {
            return None;
        }
        for _ in 0..self.countdown.accumulate(elapsed) {
            if let Some(summary) = self.tick() {
                return Some(summary);
            }
        }
        None
    }

    fn finish(&mut self, result: GameResult) -> SessionSummary {
        self.countdown.stop();
        self.result = Some(result);
        log::debug!(
            "{} session finished: {} after {} guesses",
            self.difficulty.name(),
            result,
            self.history.len()
        );
        self.summarize(result)
    }

    fn invalid(&self) -> GuessError {
        GuessError::InvalidGuess {
            min: self.difficulty.min(),
            max: self.difficulty.max(),
        }
    }
}
