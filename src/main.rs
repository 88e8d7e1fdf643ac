pub mod config;
pub mod engine;
pub mod history;
pub mod metrics;
pub mod runtime;
pub mod settings;
pub mod theme;
pub mod ui;
pub mod words;

use crate::config::{Config, ConfigStore, FileConfigStore, Mode};
use crate::engine::{Difficulty, Session, StopOnError};
use crate::history::{FileHistoryStore, HistoryStore, TestResult};
use crate::runtime::{AppEvent, EventLoop, TerminalEventSource};
use crate::settings::SettingsScreen;
use crate::theme::Theme;
use crate::words::{Language, QuoteLength};
use chrono::Local;
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    error::Error,
    io::{self, stdin},
    time::Duration,
};

const TICK_RATE_MS: u64 = 100;

/// minimal monkeytype-style typing test for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(version, about)]
pub struct Cli {
    /// test mode
    #[clap(short, long, value_enum)]
    mode: Option<Mode>,

    /// seconds to run in time mode
    #[clap(short = 't', long)]
    duration: Option<u64>,

    /// number of words in words mode
    #[clap(short = 'w', long)]
    words: Option<usize>,

    /// word list to pull from
    #[clap(short, long, value_enum)]
    language: Option<Language>,

    /// quote length bucket in quote mode
    #[clap(short, long, value_enum)]
    quote_length: Option<QuoteLength>,

    /// sprinkle punctuation over generated words
    #[clap(long)]
    punctuation: bool,

    /// sprinkle numerals over generated words
    #[clap(long)]
    numbers: bool,

    /// failure rules (normal, expert, master)
    #[clap(short, long, value_enum)]
    difficulty: Option<Difficulty>,

    /// cursor behavior on errors (off, word, letter)
    #[clap(short, long, value_enum)]
    stop_on_error: Option<StopOnError>,

    /// type against a custom prompt and exit to results
    #[clap(short, long)]
    prompt: Option<String>,
}

impl Cli {
    /// Layers command-line overrides on top of the persisted config.
    fn apply(&self, cfg: &mut Config) {
        if let Some(mode) = self.mode {
            cfg.mode = mode;
        }
        if let Some(duration) = self.duration {
            cfg.duration = duration;
        }
        if let Some(words) = self.words {
            cfg.word_count = words;
            if self.mode.is_none() {
                cfg.mode = Mode::Words;
            }
        }
        if let Some(language) = self.language {
            cfg.language = language;
        }
        if let Some(quote_length) = self.quote_length {
            cfg.quote_length = quote_length;
        }
        if self.punctuation {
            cfg.punctuation = true;
        }
        if self.numbers {
            cfg.numbers = true;
        }
        if let Some(difficulty) = self.difficulty {
            cfg.difficulty = difficulty;
        }
        if let Some(stop_on_error) = self.stop_on_error {
            cfg.stop_on_error = stop_on_error;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Typing,
    Results,
    Settings,
    History,
}

pub const MENU_ITEMS: [&str; 4] = ["start test", "settings", "history", "quit"];

/// Snapshot of the parameters a session was started with; survives config
/// edits and is what lands in the history file.
#[derive(Debug, Clone)]
pub struct TestParams {
    pub mode: Mode,
    pub duration: u64,
    pub word_count: usize,
    pub language: Language,
    pub punctuation: bool,
    pub numbers: bool,
    pub difficulty: Difficulty,
    pub stop_on_error: StopOnError,
    pub freedom_mode: bool,
    pub quote_length: Option<QuoteLength>,
    pub custom_prompt: Option<String>,
}

impl TestParams {
    fn from_config(cfg: &Config, custom_prompt: Option<String>) -> Self {
        Self {
            mode: cfg.mode,
            duration: cfg.duration,
            word_count: cfg.word_count,
            language: cfg.language,
            punctuation: cfg.punctuation,
            numbers: cfg.numbers,
            difficulty: cfg.difficulty,
            stop_on_error: cfg.stop_on_error,
            freedom_mode: cfg.freedom_mode,
            quote_length: (cfg.mode == Mode::Quote).then_some(cfg.quote_length),
            custom_prompt,
        }
    }
}

#[derive(Debug)]
pub struct ActiveTest {
    pub session: Session,
    pub params: TestParams,
    pub target: String,
    pub quote_source: Option<String>,
    pub remaining_secs: f64,
    sampled_whole_secs: u64,
}

#[derive(Debug)]
pub struct App {
    pub config: Config,
    pub config_store: FileConfigStore,
    pub history_store: FileHistoryStore,
    pub theme: Theme,
    pub screen: Screen,
    pub menu_cursor: usize,
    pub settings: SettingsScreen,
    pub test: Option<ActiveTest>,
    pub last_result: Option<TestResult>,
    pub history: Vec<TestResult>,
    pub history_scroll: usize,
}

impl App {
    pub fn new(cli: &Cli) -> Self {
        Self::with_stores(cli, FileConfigStore::new(), FileHistoryStore::new())
    }

    /// Builds the app over explicit stores; tests inject tempdir-backed
    /// ones so nothing reads or writes the real user directories.
    pub fn with_stores(
        cli: &Cli,
        config_store: FileConfigStore,
        history_store: FileHistoryStore,
    ) -> Self {
        let mut config = config_store.load();
        cli.apply(&mut config);
        let theme = theme::get(&config.theme);
        let history = history_store.load();

        let mut app = Self {
            config,
            config_store,
            history_store,
            theme,
            screen: Screen::Menu,
            menu_cursor: 0,
            settings: SettingsScreen::default(),
            test: None,
            last_result: None,
            history,
            history_scroll: 0,
        };

        if cli.prompt.is_some() {
            app.start_test(cli.prompt.clone());
        }
        app
    }

    pub fn start_test(&mut self, custom_prompt: Option<String>) {
        let params = TestParams::from_config(&self.config, custom_prompt);
        self.start_test_with(params);
    }

    pub fn start_test_with(&mut self, params: TestParams) {
        let mut quote_source = None;
        let target = if let Some(prompt) = params.custom_prompt.clone() {
            prompt
        } else {
            match params.mode {
                Mode::Time | Mode::Zen => words::generate_words_for_time(
                    params.language,
                    params.punctuation,
                    params.numbers,
                ),
                Mode::Words => words::generate_words(
                    params.word_count,
                    params.language,
                    params.punctuation,
                    params.numbers,
                ),
                Mode::Quote => {
                    let quote =
                        words::random_quote(params.quote_length.unwrap_or_default());
                    quote_source = Some(quote.source);
                    quote.text
                }
            }
        };

        // Policies come from the snapshot, not the live config, so a
        // tab-retry replays the original session's rules.
        let session = Session::new(
            &target,
            params.stop_on_error,
            params.freedom_mode,
            params.difficulty,
        );
        let remaining_secs = params.duration as f64;

        self.test = Some(ActiveTest {
            session,
            params,
            target,
            quote_source,
            remaining_secs,
            sampled_whole_secs: 0,
        });
        self.last_result = None;
        self.screen = Screen::Typing;
    }

    /// Advances timers while a session is live; returns true when the
    /// deadline finished the session.
    pub fn on_tick(&mut self) -> bool {
        let Some(test) = self.test.as_mut() else {
            return false;
        };
        if self.screen != Screen::Typing
            || !test.session.has_started()
            || test.session.is_terminal()
        {
            return false;
        }

        let elapsed = test.session.elapsed_seconds();

        // ~1 Hz raw-WPM sampling off the 100ms tick
        let whole = elapsed.floor() as u64;
        if whole > test.sampled_whole_secs {
            test.sampled_whole_secs = whole;
            test.session.sample_wpm();
        }

        if test.params.mode == Mode::Time {
            test.remaining_secs = test.params.duration as f64 - elapsed;
            if test.remaining_secs <= 0.0 {
                test.session.finish();
                self.conclude_test();
                return true;
            }
        }
        false
    }

    /// Records the terminal session into history and moves to results.
    pub fn conclude_test(&mut self) {
        let Some(test) = self.test.as_ref() else {
            return;
        };
        let session = &test.session;
        let elapsed = session.elapsed_seconds();
        let result = TestResult {
            date: Local::now(),
            mode: test.params.mode,
            duration: test.params.duration,
            word_count: test.params.word_count,
            language: test.params.language,
            punctuation: test.params.punctuation,
            numbers: test.params.numbers,
            difficulty: test.params.difficulty,
            net_wpm: metrics::net_wpm(session.correct_chars(), elapsed),
            raw_wpm: metrics::raw_wpm(session.total_keystrokes(), elapsed),
            accuracy: session.accuracy(),
            consistency: session.consistency(),
            correct: session.correct_chars(),
            incorrect: session.incorrect_chars(),
            extra: session.extra_chars(),
            missed: session.missed_chars(),
            quote_length: test.params.quote_length,
        };

        self.screen = Screen::Results;
        // history is deliberately left stale here: the results screen checks
        // "personal best" against the runs that came before this one
        let _ = self.history_store.append(result.clone());
        self.last_result = Some(result);
    }

    fn refresh_history(&mut self) {
        self.history = self.history_store.load();
        self.history_scroll = 0;
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&cli);
    let events = EventLoop::new(
        TerminalEventSource::new(),
        Duration::from_millis(TICK_RATE_MS),
    );
    let res = run(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run<B: ratatui::backend::Backend, E: runtime::EventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    events: &EventLoop<E>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| ui::draw(app, f))?;

        match events.next() {
            AppEvent::Tick => {
                app.on_tick();
            }
            AppEvent::Resize => {}
            AppEvent::Key(key) => {
                if key.kind == KeyEventKind::Release {
                    continue;
                }
                if is_quit(&key) {
                    return Ok(());
                }
                if !handle_key(app, key) {
                    return Ok(());
                }
            }
        }
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

/// Per-screen key dispatch; returns false to quit the app.
fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    match app.screen {
        Screen::Menu => match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                app.menu_cursor = app
                    .menu_cursor
                    .checked_sub(1)
                    .unwrap_or(MENU_ITEMS.len() - 1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.menu_cursor = (app.menu_cursor + 1) % MENU_ITEMS.len();
            }
            KeyCode::Enter => match app.menu_cursor {
                0 => app.start_test(None),
                1 => app.screen = Screen::Settings,
                2 => {
                    app.refresh_history();
                    app.screen = Screen::History;
                }
                _ => return false,
            },
            KeyCode::Char('q') | KeyCode::Esc => return false,
            _ => {}
        },

        Screen::Typing => match key.code {
            KeyCode::Esc => {
                app.test = None;
                app.screen = Screen::Menu;
            }
            KeyCode::Tab => {
                if let Some(params) = app.test.as_ref().map(|t| t.params.clone()) {
                    app.start_test_with(params);
                }
            }
            KeyCode::Backspace => {
                if let Some(test) = app.test.as_mut() {
                    if key.modifiers.contains(KeyModifiers::CONTROL)
                        || key.modifiers.contains(KeyModifiers::ALT)
                    {
                        test.session.handle_ctrl_backspace();
                    } else {
                        test.session.handle_backspace();
                    }
                }
            }
            KeyCode::Char('h') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(test) = app.test.as_mut() {
                    test.session.handle_backspace();
                }
            }
            KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(test) = app.test.as_mut() {
                    test.session.handle_ctrl_backspace();
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                let terminal_now = {
                    let Some(test) = app.test.as_mut() else {
                        return true;
                    };
                    test.session.handle_key(c);
                    test.session.is_terminal()
                };
                if terminal_now {
                    app.conclude_test();
                }
            }
            _ => {}
        },

        Screen::Results => match key.code {
            KeyCode::Tab => {
                if let Some(params) = app.test.as_ref().map(|t| t.params.clone()) {
                    app.start_test_with(params);
                }
            }
            KeyCode::Char('n') => app.start_test(None),
            KeyCode::Esc | KeyCode::Char('m') => {
                app.test = None;
                app.refresh_history();
                app.screen = Screen::Menu;
            }
            _ => {}
        },

        Screen::Settings => match key.code {
            KeyCode::Up | KeyCode::Char('k') => app.settings.move_up(),
            KeyCode::Down | KeyCode::Char('j') => app.settings.move_down(),
            KeyCode::Left | KeyCode::Char('h') => {
                app.settings.cycle(&mut app.config, false);
                app.theme = theme::get(&app.config.theme);
            }
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Enter => {
                app.settings.cycle(&mut app.config, true);
                app.theme = theme::get(&app.config.theme);
            }
            KeyCode::Esc => {
                let _ = app.config_store.save(&app.config);
                app.screen = Screen::Menu;
            }
            _ => {}
        },

        Screen::History => match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                app.history_scroll = app.history_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if app.history_scroll + 1 < app.history.len() {
                    app.history_scroll += 1;
                }
            }
            KeyCode::Esc | KeyCode::Char('q') => app.screen = Screen::Menu,
            _ => {}
        },
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use tempfile::tempdir;

    fn test_app() -> (App, tempfile::TempDir) {
        test_app_with(&Cli::parse_from(["tapr"]))
    }

    fn test_app_with(cli: &Cli) -> (App, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let app = App::with_stores(
            cli,
            FileConfigStore::with_path(dir.path().join("config.json")),
            FileHistoryStore::with_path(dir.path().join("history.json")),
        );
        (app, dir)
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        handle_key(
            app,
            KeyEvent {
                code,
                modifiers: KeyModifiers::NONE,
                kind: KeyEventKind::Press,
                state: KeyEventState::NONE,
            },
        )
    }

    #[test]
    fn cli_overrides_layer_onto_config() {
        let cli = Cli::parse_from(["tapr", "-m", "quote", "-t", "60", "--punctuation"]);
        let mut cfg = Config::default();
        cli.apply(&mut cfg);
        assert_eq!(cfg.mode, Mode::Quote);
        assert_eq!(cfg.duration, 60);
        assert!(cfg.punctuation);
    }

    #[test]
    fn words_flag_implies_words_mode() {
        let cli = Cli::parse_from(["tapr", "-w", "25"]);
        let mut cfg = Config::default();
        cli.apply(&mut cfg);
        assert_eq!(cfg.mode, Mode::Words);
        assert_eq!(cfg.word_count, 25);
    }

    #[test]
    fn custom_prompt_starts_in_typing_screen() {
        let cli = Cli::parse_from(["tapr", "-p", "hello there"]);
        let (app, _dir) = test_app_with(&cli);
        assert_eq!(app.screen, Screen::Typing);
        assert_eq!(app.test.as_ref().unwrap().target, "hello there");
    }

    #[test]
    fn injected_stores_start_from_defaults() {
        let (app, _dir) = test_app();
        assert_eq!(app.config, Config::default());
        assert!(app.history.is_empty());
    }

    #[test]
    fn retry_replays_the_original_session_policies() {
        let (mut app, _dir) = test_app();
        app.config.stop_on_error = StopOnError::Letter;
        app.start_test(Some("cat".into()));

        // Settings edits after the fact must not leak into a retry.
        app.config.stop_on_error = StopOnError::Off;
        let params = app.test.as_ref().unwrap().params.clone();
        app.start_test_with(params);

        press(&mut app, KeyCode::Char('x'));
        let session = &app.test.as_ref().unwrap().session;
        assert_eq!(session.cursor(), 0); // wrong key rejected, letter policy
        assert_eq!(session.total_keystrokes(), 1);
    }

    #[test]
    fn menu_enter_starts_a_test() {
        let (mut app, _dir) = test_app();
        assert_eq!(app.screen, Screen::Menu);
        assert!(press(&mut app, KeyCode::Enter));
        assert_eq!(app.screen, Screen::Typing);
        assert!(app.test.is_some());
    }

    #[test]
    fn finishing_a_custom_prompt_records_a_result() {
        let (mut app, _dir) = test_app();
        app.config.mode = Mode::Words;
        app.start_test(Some("hi".into()));

        press(&mut app, KeyCode::Char('h'));
        press(&mut app, KeyCode::Char('i'));

        assert_eq!(app.screen, Screen::Results);
        let result = app.last_result.as_ref().unwrap();
        assert_eq!(result.correct, 2);
        assert_eq!(result.incorrect, 0);
        assert_eq!(app.history_store.load().len(), 1);
    }

    #[test]
    fn master_failure_lands_on_results_with_reason() {
        let (mut app, _dir) = test_app();
        app.config.difficulty = Difficulty::Master;
        app.start_test(Some("cat".into()));

        press(&mut app, KeyCode::Char('x'));

        assert_eq!(app.screen, Screen::Results);
        assert!(app
            .test
            .as_ref()
            .unwrap()
            .session
            .fail_reason()
            .is_some());
    }

    #[test]
    fn time_mode_tick_finishes_on_deadline() {
        let (mut app, _dir) = test_app();
        app.config.mode = Mode::Time;
        app.config.duration = 0; // expires on the first tick after start
        app.start_test(Some("some words here".into()));
        app.test.as_mut().unwrap().params.mode = Mode::Time;
        app.test.as_mut().unwrap().params.duration = 0;

        press(&mut app, KeyCode::Char('s'));
        assert!(app.on_tick());
        assert_eq!(app.screen, Screen::Results);
        assert!(app.test.as_ref().unwrap().session.has_finished());
    }

    #[test]
    fn escape_from_typing_discards_the_session() {
        let (mut app, _dir) = test_app();
        app.start_test(Some("abc".into()));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::Menu);
        assert!(app.test.is_none());
        assert!(app.history_store.load().is_empty());
    }

    #[test]
    fn settings_escape_persists_config() {
        let (mut app, _dir) = test_app();
        app.screen = Screen::Settings;
        app.config.freedom_mode = true;
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::Menu);
        assert!(app.config_store.load().freedom_mode);
    }

    #[test]
    fn quit_paths_return_false() {
        let (mut app, _dir) = test_app();
        assert!(!press(&mut app, KeyCode::Char('q')));

        let (mut app, _dir) = test_app();
        app.menu_cursor = 3; // quit entry
        assert!(!press(&mut app, KeyCode::Enter));
    }
}
