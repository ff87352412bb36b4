mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use guessr::{
    app_dirs::AppDirs,
    celebration::CelebrationAnimation,
    config::{Config, ConfigStore, FileConfigStore},
    high_scores::{HighScoreStore, MemoryHighScoreStore, SqliteHighScoreStore},
    hint::HintStyle,
    runtime::{CrosstermEventSource, EventSource, FixedTicker, GameEvent, Runner, Ticker},
    Game, GuessOutcome, Level,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    fs::OpenOptions,
    io::{self, stdin},
    path::PathBuf,
};

const MAX_INPUT_LEN: usize = 12;

/// guess the hidden number before the attempts or the clock run out
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal number guessing game: find the hidden number within a limited number of attempts and a countdown, guided by higher/lower hints. Best scores are kept per difficulty."
)]
pub struct Cli {
    /// skip the selection screen and play this difficulty
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Level>,

    /// hint granularity: direction only, or direction plus closeness
    #[clap(long, value_enum)]
    hints: Option<HintStyle>,

    /// show a suggested next guess after every hint
    #[clap(long)]
    strategy: bool,

    /// turn off the confetti and fireworks
    #[clap(long)]
    no_celebration: bool,

    /// seed for the hidden numbers, for repeatable games
    #[clap(long)]
    seed: Option<u64>,

    /// write the game history as csv to PATH and exit
    #[clap(long, value_name = "PATH")]
    export_history: Option<PathBuf>,

    /// forget all high scores and exit
    #[clap(long)]
    reset_scores: bool,
}

impl Cli {
    /// Layer command line overrides on top of the saved config
    fn apply(&self, mut cfg: Config) -> Config {
        if self.difficulty.is_some() {
            cfg.difficulty = self.difficulty;
        }
        if let Some(style) = self.hints {
            cfg.hint_style = style;
        }
        if self.strategy {
            cfg.strategy_hints = true;
        }
        if self.no_celebration {
            cfg.celebrate = false;
        }
        cfg
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    SelectDifficulty,
    Playing,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Continue,
    Quit,
}

#[derive(Debug)]
pub struct App {
    pub config: Config,
    pub state: AppState,
    pub selected: Level,
    pub game: Game,
    pub input: String,
    pub celebration: CelebrationAnimation,
}

impl App {
    pub fn new(config: Config, game: Game) -> Self {
        let (state, selected) = match config.difficulty {
            Some(level) => (AppState::Playing, level),
            None => (AppState::SelectDifficulty, Level::Easy),
        };
        let celebration = if config.celebrate {
            CelebrationAnimation::new()
        } else {
            CelebrationAnimation::disabled()
        };
        Self {
            config,
            state,
            selected,
            game,
            input: String::new(),
            celebration,
        }
    }

    fn start(&mut self, level: Level) {
        self.selected = level;
        self.game.switch_to(level.difficulty());
        self.input.clear();
        self.celebration.stop();
        self.state = AppState::Playing;
    }

    fn restart(&mut self) {
        self.game.restart();
        self.input.clear();
        self.celebration.stop();
        self.state = AppState::Playing;
    }

    /// Leaving mid-game discards the session unrecorded, like a restart
    fn back_to_selection(&mut self) {
        self.game.restart();
        self.input.clear();
        self.celebration.stop();
        self.state = AppState::SelectDifficulty;
    }

    fn submit(&mut self) {
        let raw = std::mem::take(&mut self.input);
        if let Ok(GuessOutcome::Finished(_)) = self.game.submit(&raw, &mut self.celebration) {
            self.state = AppState::Results;
        }
    }

    fn on_tick(&mut self, elapsed: std::time::Duration) {
        if self.state == AppState::Playing
            && self.game.advance(elapsed, &mut self.celebration).is_some()
        {
            self.input.clear();
            self.state = AppState::Results;
        }
        self.celebration.update();
    }

    fn on_key(&mut self, key: KeyEvent) -> Control {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return Control::Quit;
        }

        match self.state {
            AppState::SelectDifficulty => match key.code {
                KeyCode::Up | KeyCode::Left | KeyCode::Char('k') => {
                    self.selected = self.selected.prev()
                }
                KeyCode::Down | KeyCode::Right | KeyCode::Char('j') => {
                    self.selected = self.selected.next()
                }
                KeyCode::Char('1') => self.start(Level::Easy),
                KeyCode::Char('2') => self.start(Level::Medium),
                KeyCode::Char('3') => self.start(Level::Hard),
                KeyCode::Enter => self.start(self.selected),
                _ => {}
            },
            AppState::Playing => match key.code {
                KeyCode::Enter => self.submit(),
                KeyCode::Backspace => {
                    self.input.pop();
                }
                KeyCode::Tab => self.config.strategy_hints = !self.config.strategy_hints,
                KeyCode::Left => self.restart(),
                KeyCode::Right => self.back_to_selection(),
                KeyCode::Char(c) if !c.is_control() && self.input.len() < MAX_INPUT_LEN => {
                    self.input.push(c)
                }
                _ => {}
            },
            AppState::Results => match key.code {
                KeyCode::Char('r') | KeyCode::Left | KeyCode::Enter => self.restart(),
                KeyCode::Char('n') | KeyCode::Right => self.back_to_selection(),
                _ => {}
            },
        }
        Control::Continue
    }
}

fn init_logging() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if std::fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    // the terminal belongs to the UI, so logs only ever go to the file
    if let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) {
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
            .target(env_logger::Target::Pipe(Box::new(file)))
            .try_init();
    }
}

/// Settings for this run. Only `--hints` is remembered; `-d`, `--strategy` and
/// `--no-celebration` apply to this launch alone.
fn load_config(store: &dyn ConfigStore, cli: &Cli) -> Config {
    let mut saved = store.load();
    if let Some(style) = cli.hints {
        saved.hint_style = style;
    }
    if let Err(e) = store.save(&saved) {
        log::warn!("could not save config: {}", e);
    }
    cli.apply(saved)
}

fn open_store() -> Box<dyn HighScoreStore> {
    match SqliteHighScoreStore::new() {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::warn!("high scores will not be saved: {}", e);
            Box::new(MemoryHighScoreStore::new())
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging();

    if let Some(path) = &cli.export_history {
        let count = SqliteHighScoreStore::new()?.export_csv(path)?;
        println!("exported {} games to {}", count, path.display());
        return Ok(());
    }

    if cli.reset_scores {
        let cleared = SqliteHighScoreStore::new()?.clear_high_scores()?;
        println!("cleared {} high scores", cleared);
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let config_store = FileConfigStore::new();
    let config = load_config(&config_store, &cli);

    let level = config.difficulty.unwrap_or(Level::Easy);
    let mut game = Game::new(level.difficulty(), config.hint_style).with_store(open_store());
    if let Some(seed) = cli.seed {
        game = game.with_seed(seed);
    }
    let mut app = App::new(config, game);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    app.celebration.resize(size.width, size.height);

    let mut runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());
    let result = run_tui(&mut terminal, &mut app, &mut runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_tui<B: Backend, E: EventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &mut Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            GameEvent::Tick(elapsed) => {
                let was_running = app.game.session().countdown().is_running();
                app.on_tick(elapsed);
                if was_running || app.celebration.is_active {
                    terminal.draw(|f| ui(app, f))?;
                }
            }
            GameEvent::Resize(width, height) => {
                app.celebration.resize(width, height);
                terminal.draw(|f| ui(app, f))?;
            }
            GameEvent::Key(key) => {
                let was_started = app.game.session().has_started();
                if app.on_key(key) == Control::Quit {
                    break;
                }
                // the countdown owns no time from before the first guess
                if !was_started && app.game.session().has_started() {
                    runner.reset_tick();
                }
                terminal.draw(|f| ui(app, f))?;
            }
            GameEvent::Closed => {
                log::warn!("terminal input closed, exiting");
                break;
            }
        }
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}

#[cfg(test)]
mod tests {
    use super::*;
    use guessr::{GameResult, GameSession};
    use ratatui::backend::TestBackend;
    use std::sync::mpsc;
    use std::time::Duration;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            app.on_key(key(KeyCode::Char(c)));
        }
    }

    fn playing_app(target: i64) -> App {
        let config = Config {
            difficulty: Some(Level::Easy),
            celebrate: false,
            ..Config::default()
        };
        let difficulty = Level::Easy.difficulty();
        let game = Game::new(difficulty.clone(), config.hint_style)
            .with_store(Box::new(MemoryHighScoreStore::new()))
            .with_session(GameSession::with_target(difficulty, target).unwrap());
        App::new(config, game)
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["guessr"]);
        assert!(cli.difficulty.is_none());
        assert!(cli.hints.is_none());
        assert!(!cli.strategy);
        assert!(!cli.no_celebration);
        assert!(cli.seed.is_none());
        assert!(cli.export_history.is_none());
        assert!(!cli.reset_scores);
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::parse_from([
            "guessr",
            "-d",
            "hard",
            "--hints",
            "simple",
            "--strategy",
            "--no-celebration",
            "--seed",
            "42",
        ]);
        assert_eq!(cli.difficulty, Some(Level::Hard));
        assert_eq!(cli.hints, Some(HintStyle::Simple));
        assert!(cli.strategy);
        assert!(cli.no_celebration);
        assert_eq!(cli.seed, Some(42));
    }

    #[test]
    fn test_cli_rejects_unknown_difficulty() {
        assert!(Cli::try_parse_from(["guessr", "-d", "impossible"]).is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let saved = Config {
            difficulty: Some(Level::Easy),
            hint_style: HintStyle::Graded,
            strategy_hints: false,
            celebrate: true,
        };
        let cli = Cli::parse_from(["guessr", "-d", "medium", "--hints", "simple"]);
        let merged = cli.apply(saved.clone());
        assert_eq!(merged.difficulty, Some(Level::Medium));
        assert_eq!(merged.hint_style, HintStyle::Simple);
        assert!(merged.celebrate);

        // no flags leaves the saved config alone
        assert_eq!(Cli::parse_from(["guessr"]).apply(saved.clone()), saved);
    }

    #[test]
    fn test_app_starts_on_selection_without_difficulty() {
        let game = Game::new(Level::Easy.difficulty(), HintStyle::Graded);
        let app = App::new(Config::default(), game);
        assert_eq!(app.state, AppState::SelectDifficulty);
    }

    #[test]
    fn test_selection_navigation_and_start() {
        let game = Game::new(Level::Easy.difficulty(), HintStyle::Graded);
        let mut app = App::new(Config::default(), game);

        app.on_key(key(KeyCode::Down));
        assert_eq!(app.selected, Level::Medium);
        app.on_key(key(KeyCode::Up));
        app.on_key(key(KeyCode::Up));
        assert_eq!(app.selected, Level::Hard);

        app.on_key(key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Playing);
        assert_eq!(app.game.difficulty().name(), "hard");
    }

    #[test]
    fn test_number_keys_pick_difficulty() {
        let game = Game::new(Level::Easy.difficulty(), HintStyle::Graded);
        let mut app = App::new(Config::default(), game);
        app.on_key(key(KeyCode::Char('2')));
        assert_eq!(app.state, AppState::Playing);
        assert_eq!(app.game.difficulty().name(), "medium");
        assert_eq!(app.game.session().attempts_left(), 5);
    }

    #[test]
    fn test_input_and_backspace() {
        let mut app = playing_app(50);
        type_str(&mut app, "123");
        app.on_key(key(KeyCode::Backspace));
        assert_eq!(app.input, "12");
        type_str(&mut app, "99999999999999");
        assert_eq!(app.input.len(), MAX_INPUT_LEN);
    }

    #[test]
    fn test_invalid_guess_keeps_playing() {
        let mut app = playing_app(50);
        type_str(&mut app, "abc");
        app.on_key(key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Playing);
        assert!(app.input.is_empty());
        assert_eq!(app.game.session().attempts_left(), 7);
        assert!(matches!(
            app.game.feedback(),
            Some(guessr::Feedback::Warning(_))
        ));
    }

    #[test]
    fn test_win_moves_to_results() {
        let mut app = playing_app(50);
        type_str(&mut app, "30");
        app.on_key(key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Playing);
        type_str(&mut app, "50");
        app.on_key(key(KeyCode::Enter));

        assert_eq!(app.state, AppState::Results);
        let summary = app.game.summary().unwrap();
        assert_eq!(summary.result, GameResult::Won);
        assert_eq!(summary.score, 5 * 100 + 60);
    }

    #[test]
    fn test_timeout_moves_to_results() {
        let mut app = playing_app(50);
        type_str(&mut app, "10");
        app.on_key(key(KeyCode::Enter));
        type_str(&mut app, "4");

        app.on_tick(Duration::from_secs(60));
        assert_eq!(app.state, AppState::Results);
        assert!(app.input.is_empty());
        assert_eq!(
            app.game.summary().map(|s| s.result),
            Some(GameResult::LostTimeout)
        );
    }

    #[test]
    fn test_ticks_ignored_outside_play() {
        let game = Game::new(Level::Easy.difficulty(), HintStyle::Graded);
        let mut app = App::new(Config::default(), game);
        app.on_tick(Duration::from_secs(600));
        assert_eq!(app.state, AppState::SelectDifficulty);
        assert_eq!(app.game.session().time_left(), 60);
    }

    #[test]
    fn test_results_retry_and_new() {
        let mut app = playing_app(50);
        type_str(&mut app, "50");
        app.on_key(key(KeyCode::Enter));
        assert_eq!(app.state, AppState::Results);

        app.on_key(key(KeyCode::Char('r')));
        assert_eq!(app.state, AppState::Playing);
        assert!(app.game.summary().is_none());
        assert_eq!(app.game.difficulty().name(), "easy");

        app.on_key(key(KeyCode::Right));
        assert_eq!(app.state, AppState::SelectDifficulty);
    }

    #[test]
    fn test_tab_toggles_strategy() {
        let mut app = playing_app(50);
        assert!(!app.config.strategy_hints);
        app.on_key(key(KeyCode::Tab));
        assert!(app.config.strategy_hints);
    }

    #[test]
    fn test_escape_and_ctrl_c_quit() {
        let mut app = playing_app(50);
        assert_eq!(app.on_key(key(KeyCode::Esc)), Control::Quit);
        assert_eq!(
            app.on_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Control::Quit
        );
        assert_eq!(app.on_key(key(KeyCode::Char('c'))), Control::Continue);
    }

    #[test]
    fn test_run_tui_plays_until_escape() {
        let mut app = playing_app(50);
        let (tx, rx) = mpsc::channel();
        for c in "50".chars() {
            tx.send(GameEvent::Key(key(KeyCode::Char(c)))).unwrap();
        }
        tx.send(GameEvent::Key(key(KeyCode::Enter))).unwrap();
        tx.send(GameEvent::Key(key(KeyCode::Esc))).unwrap();

        let mut runner = Runner::new(
            guessr::runtime::TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(50)),
        );
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        run_tui(&mut terminal, &mut app, &mut runner).unwrap();
        assert_eq!(app.state, AppState::Results);
    }

    #[test]
    fn test_run_tui_exits_when_input_closes() {
        let mut app = playing_app(50);
        let (tx, rx) = mpsc::channel();
        tx.send(GameEvent::Key(key(KeyCode::Char('7')))).unwrap();
        drop(tx);

        let mut runner = Runner::new(
            guessr::runtime::TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(50)),
        );
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        run_tui(&mut terminal, &mut app, &mut runner).unwrap();
        assert_eq!(app.state, AppState::Playing);
        assert_eq!(app.input, "7");
    }

    #[test]
    fn test_one_off_flags_are_not_remembered() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));

        let first = load_config(
            &store,
            &Cli::parse_from([
                "guessr",
                "-d",
                "hard",
                "--no-celebration",
                "--strategy",
                "--hints",
                "simple",
            ]),
        );
        assert_eq!(first.difficulty, Some(Level::Hard));
        assert!(!first.celebrate);
        assert!(first.strategy_hints);

        let second = load_config(&store, &Cli::parse_from(["guessr"]));
        assert_eq!(second.difficulty, None);
        assert!(second.celebrate);
        assert!(!second.strategy_hints);
        assert_eq!(second.hint_style, HintStyle::Simple);

        let game = Game::new(Level::Easy.difficulty(), second.hint_style);
        let app = App::new(second, game);
        assert_eq!(app.state, AppState::SelectDifficulty);
        assert!(app.celebration.enabled);
    }

    #[test]
    fn test_leaving_mid_game_discards_session() {
        let mut app = playing_app(50);
        type_str(&mut app, "10");
        app.on_key(key(KeyCode::Enter));
        assert!(app.game.session().countdown().is_running());

        app.on_key(key(KeyCode::Right));
        assert_eq!(app.state, AppState::SelectDifficulty);
        assert!(!app.game.session().has_started());
        assert!(!app.game.session().countdown().is_running());
        assert_eq!(app.game.play_counts().played, 0);
    }
}
