use ratatui::{buffer::Buffer, layout::Rect};

use crate::{App, AppState};

/// A UI Screen boundary: renders one application state
pub trait Screen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
}

/// Difficulty list with the best score for each
pub struct SelectScreen;

impl Screen for SelectScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        super::render_selection(app, area, buf);
    }
}

/// Countdown, input field and hints
pub struct PlayingScreen;

impl Screen for PlayingScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        super::render_playing(app, area, buf);
    }
}

/// Outcome summary with the celebration drawn on top
pub struct ResultsScreen;

impl Screen for ResultsScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        super::render_results(app, area, buf);
        if app.celebration.is_active {
            super::render_particles(&app.celebration, area, buf);
        }
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::SelectDifficulty => Box::new(SelectScreen),
        AppState::Playing => Box::new(PlayingScreen),
        AppState::Results => Box::new(ResultsScreen),
    }
}
