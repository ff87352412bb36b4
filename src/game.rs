//! Ties a [`GameSession`] to the high score store and to whoever presents the
//! end of a game.
//!
//! The session itself knows nothing about persistence or presentation. `Game`
//! records every finished session, bumps the high score on a win, and calls
//! [`OutcomeListener::on_finished`] exactly once per session.

use crate::difficulty::Difficulty;
use crate::high_scores::{HighScoreStore, PlayCounts, SessionRecord};
use crate::hint::HintStyle;
use crate::session::{GameSession, GuessError, GuessOutcome, SessionSummary};
use chrono::Local;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

/// Receives structured outcome data when a session reaches a terminal state
pub trait OutcomeListener {
    fn on_finished(&mut self, summary: &SessionSummary, new_high_score: bool);
}

impl OutcomeListener for () {
    fn on_finished(&mut self, _summary: &SessionSummary, _new_high_score: bool) {}
}

/// What the player should read under the input field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Hint(String),
    Warning(String),
}

pub struct Game {
    session: GameSession,
    hint_style: HintStyle,
    store: Option<Box<dyn HighScoreStore>>,
    rng: Option<StdRng>,
    feedback: Option<Feedback>,
    summary: Option<SessionSummary>,
    new_high_score: bool,
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("session", &self.session)
            .field("hint_style", &self.hint_style)
            .field("has_store", &self.store.is_some())
            .field("feedback", &self.feedback)
            .field("summary", &self.summary)
            .finish()
    }
}

impl Game {
    pub fn new(difficulty: Difficulty, hint_style: HintStyle) -> Self {
        Self {
            session: GameSession::start(difficulty).with_hint_style(hint_style),
            hint_style,
            store: None,
            rng: None,
            feedback: None,
            summary: None,
            new_high_score: false,
        }
    }

    pub fn with_store(mut self, store: Box<dyn HighScoreStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Draw targets from a seeded generator, this one and every restart after it
    pub fn with_seed(mut self, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        self.session = GameSession::start_with_rng(self.session.difficulty().clone(), &mut rng)
            .with_hint_style(self.hint_style);
        self.rng = Some(rng);
        self
    }

    /// Replace the session with one whose target is known
    pub fn with_session(mut self, session: GameSession) -> Self {
        self.session = session.with_hint_style(self.hint_style);
        self
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn difficulty(&self) -> &Difficulty {
        self.session.difficulty()
    }

    pub fn hint_style(&self) -> HintStyle {
        self.hint_style
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    pub fn is_new_high_score(&self) -> bool {
        self.new_high_score
    }

    /// Best score for the active difficulty
    pub fn high_score(&self) -> u32 {
        self.best_for(self.session.difficulty().name())
    }

    pub fn best_for(&self, name: &str) -> u32 {
        match self.store.as_ref().map(|s| s.high_score(name)) {
            Some(Ok(score)) => score,
            Some(Err(e)) => {
                log::warn!("could not read high score for {}: {}", name, e);
                0
            }
            None => 0,
        }
    }

    pub fn play_counts(&self) -> PlayCounts {
        let name = self.session.difficulty().name();
        match self.store.as_ref().map(|s| s.play_counts(name)) {
            Some(Ok(counts)) => counts,
            Some(Err(e)) => {
                log::warn!("could not read history for {}: {}", name, e);
                PlayCounts::default()
            }
            None => PlayCounts::default(),
        }
    }

    /// Submit raw input. Invalid input only sets a warning.
    pub fn submit(
        &mut self,
        raw: &str,
        listener: &mut dyn OutcomeListener,
    ) -> Result<GuessOutcome, GuessError> {
        match self.session.submit_input(raw) {
            Ok(GuessOutcome::Continue(hint)) => {
                self.feedback = Some(Feedback::Hint(hint.message()));
                Ok(GuessOutcome::Continue(hint))
            }
            Ok(GuessOutcome::Finished(summary)) => {
                self.feedback = None;
                self.conclude(&summary, listener);
                Ok(GuessOutcome::Finished(summary))
            }
            Err(e) => {
                log::debug!("rejected guess {:?}: {}", raw, e);
                if let GuessError::InvalidGuess { .. } = e {
                    self.feedback = Some(Feedback::Warning(e.to_string()));
                }
                Err(e)
            }
        }
    }

    /// Feed elapsed wall-clock time to the countdown
    pub fn advance(
        &mut self,
        elapsed: Duration,
        listener: &mut dyn OutcomeListener,
    ) -> Option<SessionSummary> {
        let summary = self.session.advance(elapsed)?;
        self.feedback = None;
        self.conclude(&summary, listener);
        Some(summary)
    }

    /// Same as [`Game::advance`] by exactly one second
    pub fn tick(&mut self, listener: &mut dyn OutcomeListener) -> Option<SessionSummary> {
        let summary = self.session.tick()?;
        self.feedback = None;
        self.conclude(&summary, listener);
        Some(summary)
    }

    /// Throw the session away and start over with the same difficulty
    pub fn restart(&mut self) {
        let difficulty = self.session.difficulty().clone();
        self.switch_to(difficulty);
    }

    pub fn switch_to(&mut self, difficulty: Difficulty) {
        self.session = match self.rng.as_mut() {
            Some(rng) => GameSession::start_with_rng(difficulty, rng),
            None => GameSession::start(difficulty),
        }
        .with_hint_style(self.hint_style);
        self.feedback = None;
        self.summary = None;
        self.new_high_score = false;
    }

    fn conclude(&mut self, summary: &SessionSummary, listener: &mut dyn OutcomeListener) {
        log::info!(
            "{} game {} (target {}, score {}, {} guesses, {}s)",
            summary.difficulty,
            summary.result,
            summary.target,
            summary.score,
            summary.attempts_used,
            summary.time_taken
        );

        self.new_high_score = false;
        if let Some(store) = self.store.as_mut() {
            if let Err(e) = store.record_session(&SessionRecord::from_summary(summary, Local::now()))
            {
                log::warn!("could not record session: {}", e);
            }
            if summary.result.is_win() {
                match store.submit_score(&summary.difficulty, summary.score) {
                    Ok(replaced) => self.new_high_score = replaced,
                    Err(e) => log::warn!("could not update high score: {}", e),
                }
            }
        }
        if self.new_high_score {
            log::info!("new {} high score: {}", summary.difficulty, summary.score);
        }

        self.summary = Some(summary.clone());
        listener.on_finished(summary, self.new_high_score);
    }
}
