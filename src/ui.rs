pub mod screen;

use guessr::{
    celebration::{CelebrationAnimation, ParticleKind},
    Feedback, GameResult, Level,
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        screen::current_screen(&self.state).render(self, area, buf);
    }
}

fn title_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn level_color(level: Level) -> Color {
    match level {
        Level::Easy => Color::Green,
        Level::Medium => Color::Yellow,
        Level::Hard => Color::Red,
    }
}

fn render_selection(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(Level::ALL.len() as u16 + 2),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    Paragraph::new(vec![
        Line::from(Span::styled("guessr", bold().fg(Color::Cyan))),
        Line::from(Span::styled(
            "pick a difficulty",
            Style::default().add_modifier(Modifier::ITALIC),
        )),
    ])
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    let lines: Vec<Line> = Level::ALL
        .iter()
        .enumerate()
        .map(|(idx, &level)| {
            let d = level.difficulty();
            let selected = level == app.selected;
            let marker = if selected { "> " } else { "  " };
            let name_style = if selected {
                bold().fg(level_color(level)).add_modifier(Modifier::REVERSED)
            } else {
                Style::default().fg(level_color(level))
            };
            Line::from(vec![
                Span::raw(format!("{}{} ", marker, idx + 1)),
                Span::styled(format!("{:<8}", title_case(d.name())), name_style),
                Span::raw(format!(
                    " {:>3}-{:<4} {} attempts  {:>2}s  best {}",
                    d.min(),
                    d.max(),
                    d.attempts(),
                    d.time_secs(),
                    app.game.best_for(d.name())
                )),
            ])
        })
        .collect();

    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Difficulty"))
        .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        "(↑/↓) choose / (enter) or (1-3) play / (esc)ape",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[3], buf);
}

fn render_playing(app: &App, area: Rect, buf: &mut Buffer) {
    let session = app.game.session();
    let difficulty = session.difficulty();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // difficulty, range, best
            Constraint::Length(1), // attempts and time
            Constraint::Length(1), // time gauge
            Constraint::Length(1),
            Constraint::Length(3), // input
            Constraint::Length(1), // hint or warning
            Constraint::Length(1), // strategy
            Constraint::Length(1), // history
            Constraint::Min(0),
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" {} ", title_case(difficulty.name())),
            bold().add_modifier(Modifier::REVERSED),
        ),
        Span::raw(format!(
            "   range {}-{}   best {}",
            difficulty.min(),
            difficulty.max(),
            app.game.high_score()
        )),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    Paragraph::new(Span::styled(
        format!(
            "attempts left {}   time left {}s",
            session.attempts_left(),
            session.time_left()
        ),
        bold(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    let ratio = session.countdown().ratio().clamp(0.0, 1.0);
    let gauge_color = if ratio > 0.5 {
        Color::Green
    } else if ratio > 0.2 {
        Color::Yellow
    } else {
        Color::Red
    };
    Gauge::default()
        .gauge_style(Style::default().fg(gauge_color))
        .ratio(ratio)
        .label(if session.has_started() {
            format!("{}s", session.time_left())
        } else {
            "clock starts on your first guess".to_string()
        })
        .render(chunks[2], buf);

    Paragraph::new(Span::styled(format!("{}_", app.input), bold()))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("guess {}-{}", difficulty.min(), difficulty.max())),
        )
        .alignment(Alignment::Center)
        .render(chunks[4], buf);

    if let Some(feedback) = app.game.feedback() {
        let (text, style) = match feedback {
            Feedback::Hint(text) => (text.as_str(), bold().fg(Color::Cyan)),
            Feedback::Warning(text) => (text.as_str(), bold().fg(Color::Yellow)),
        };
        Paragraph::new(Span::styled(text, style))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[5], buf);
    }

    if app.config.strategy_hints && session.has_started() {
        Paragraph::new(Span::styled(
            format!("* {}", session.strategy().message()),
            Style::default()
                .fg(Color::LightYellow)
                .add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(chunks[6], buf);
    }

    if !session.history().is_empty() {
        let guesses = session
            .history()
            .iter()
            .map(|g| g.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        Paragraph::new(Span::styled(
            format!("guesses: {}", guesses),
            Style::default().add_modifier(Modifier::DIM),
        ))
        .alignment(Alignment::Center)
        .render(chunks[7], buf);
    }

    Paragraph::new(Span::styled(
        "(enter) guess / (tab) strategy / (←) restart / (→) difficulty / (esc)ape",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[9], buf);
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(summary) = app.game.summary() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(2), // title and message
            Constraint::Length(1),
            Constraint::Length(1), // target, attempts, time
            Constraint::Length(1), // score
            Constraint::Length(1), // new high score
            Constraint::Length(1), // history counts
            Constraint::Min(0),
            Constraint::Length(1), // legend
        ])
        .split(area);

    let (title, title_style, message) = match summary.result {
        GameResult::Won => ("YOU WON!", bold().fg(Color::Green), "Congratulations!"),
        GameResult::LostExhausted => (
            "GAME OVER",
            bold().fg(Color::Red),
            "Out of attempts. Better luck next time!",
        ),
        GameResult::LostTimeout => (
            "GAME OVER",
            bold().fg(Color::Red),
            "Out of time. Better luck next time!",
        ),
    };

    Paragraph::new(vec![
        Line::from(Span::styled(title, title_style)),
        Line::from(Span::styled(
            message,
            Style::default().add_modifier(Modifier::ITALIC),
        )),
    ])
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    let mut facts = format!(
        "the number was {}   attempts {}",
        summary.target, summary.attempts_used
    );
    if summary.result.is_win() {
        facts.push_str(&format!("   time {}s", summary.time_taken));
    }
    Paragraph::new(Span::styled(facts, bold()))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

    Paragraph::new(Span::styled(
        format!("score {}", summary.score),
        bold().fg(Color::Magenta),
    ))
    .alignment(Alignment::Center)
    .render(chunks[4], buf);

    if app.game.is_new_high_score() {
        Paragraph::new(Span::styled(
            "New high score!",
            bold().fg(Color::Yellow).add_modifier(Modifier::SLOW_BLINK),
        ))
        .alignment(Alignment::Center)
        .render(chunks[5], buf);
    }

    let counts = app.game.play_counts();
    Paragraph::new(Span::styled(
        format!(
            "best {}   played {}   won {}",
            app.game.high_score(),
            counts.played,
            counts.won
        ),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[6], buf);

    Paragraph::new(Span::styled(
        "(r)etry / (n)ew difficulty / (esc)ape",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[8], buf);
}

/// Draw celebration particles on top of whatever is already in the buffer
fn render_particles(celebration: &CelebrationAnimation, area: Rect, buf: &mut Buffer) {
    let colors = [
        Color::Red,
        Color::Cyan,
        Color::LightBlue,
        Color::Yellow,
        Color::Magenta,
        Color::Blue,
        Color::LightMagenta,
        Color::LightYellow,
    ];

    for particle in celebration.particles.iter().filter(|p| p.is_visible()) {
        if particle.x < 0.0 || particle.y < 0.0 {
            continue;
        }
        let (x, y) = (particle.x as u16, particle.y as u16);
        if x >= area.width || y >= area.height {
            continue;
        }

        let color = colors[particle.color_index % colors.len()];
        let fade = 1.0 - (particle.age / particle.max_age);
        let style = match particle.kind {
            ParticleKind::Confetti => Style::default().fg(color).add_modifier(Modifier::BOLD),
            ParticleKind::Spark if fade > 0.5 => {
                Style::default().fg(color).add_modifier(Modifier::BOLD)
            }
            ParticleKind::Spark => Style::default().fg(color),
            ParticleKind::Rain => Style::default().fg(color).add_modifier(Modifier::DIM),
        };

        if let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) {
            cell.set_symbol(&particle.symbol.to_string());
            cell.set_style(style);
        }
    }
}
