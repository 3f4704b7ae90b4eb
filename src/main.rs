mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use pomo::{
    app_dirs::AppDirs,
    chime::{Chime, SilentChime, SoundChime},
    config::{Config, ConfigStore, FileConfigStore},
    controller::TimerController,
    input::{Command, DurationInput, BREAK_RANGE, WORK_RANGE},
    logging::init_logging,
    quotes::{load_quotes, pick_quote},
    runtime::{CrosstermEventSource, PomoEvent, PomoEventSource, Runner},
    scheduler::TickQueue,
    timer::{Mode, TimerState, DEFAULT_BREAK_MINUTES, DEFAULT_WORK_MINUTES},
    view::TerminalView,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    ops::RangeInclusive,
    path::PathBuf,
    time::{Duration, Instant},
};
use tracing::{error, info, warn};

/// Longest the loop sleeps without input or a due tick
const MAX_WAIT_MS: u64 = 250;

/// pomodoro timer with a progress ring and a completion chime
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A pomodoro timer for the terminal: a countdown with a circular progress ring, start/pause/reset controls, editable work and break durations, and a chime when a session ends."
)]
pub struct Cli {
    /// work session length in minutes (1-180)
    #[clap(short = 'w', long = "work", value_parser = clap::value_parser!(i64).range(WORK_RANGE))]
    work_minutes: Option<i64>,

    /// break length in minutes (1-60)
    #[clap(short = 'b', long = "break", value_parser = clap::value_parser!(i64).range(BREAK_RANGE))]
    break_minutes: Option<i64>,

    /// mode to start in
    #[clap(short = 'm', long, value_enum, default_value_t = Mode::Work)]
    mode: Mode,

    /// JSON file containing an array of quotes to pick from
    #[clap(short = 'q', long)]
    quotes: Option<PathBuf>,

    /// sound file to play when a session ends (falls back to the terminal bell)
    #[clap(long)]
    chime: Option<PathBuf>,

    /// don't make any sound when a session ends
    #[clap(long)]
    no_sound: bool,

    /// config file with default settings
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// where to write logs (default: ~/.local/state/pomo/pomo.log)
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// log level used when RUST_LOG is not set
    #[clap(long, default_value = "info")]
    log_level: String,
}

/// Effective startup settings: config file values overridden by the CLI
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub work_minutes: i64,
    pub break_minutes: i64,
    pub mode: Mode,
    pub quotes_path: Option<PathBuf>,
    pub chime_path: Option<PathBuf>,
    pub sound: bool,
}

/// `minutes` if it lies in `range`, otherwise `fallback`. Config file values
/// only reach this unchecked; clap already bounds the flags.
fn minutes_in_range(field: &str, minutes: i64, range: RangeInclusive<i64>, fallback: i64) -> i64 {
    if range.contains(&minutes) {
        minutes
    } else {
        warn!(
            field,
            minutes,
            fallback,
            "duration out of range ({}-{}), using default",
            range.start(),
            range.end()
        );
        fallback
    }
}

impl Cli {
    fn settings(&self, config: Config) -> Settings {
        let work_minutes = self.work_minutes.unwrap_or(config.work_minutes);
        let break_minutes = self.break_minutes.unwrap_or(config.break_minutes);
        Settings {
            work_minutes: minutes_in_range(
                "work",
                work_minutes,
                WORK_RANGE,
                DEFAULT_WORK_MINUTES,
            ),
            break_minutes: minutes_in_range(
                "break",
                break_minutes,
                BREAK_RANGE,
                DEFAULT_BREAK_MINUTES,
            ),
            mode: self.mode,
            quotes_path: self.quotes.clone().or(config.quotes_path),
            chime_path: self.chime.clone().or(config.chime_path),
            sound: config.sound && !self.no_sound,
        }
    }
}

pub type AppController = TimerController<TickQueue, TerminalView, Box<dyn Chime>>;

pub struct App {
    pub controller: AppController,
    pub input: DurationInput,
    pub quote: String,
}

impl App {
    pub fn new(settings: &Settings) -> Self {
        let mut state = TimerState::new(settings.work_minutes, settings.break_minutes);
        state.switch_mode(settings.mode);

        let chime: Box<dyn Chime> = if settings.sound {
            Box::new(SoundChime::new(settings.chime_path.clone()))
        } else {
            Box::new(SilentChime)
        };

        let quotes = load_quotes(settings.quotes_path.as_deref());

        Self {
            controller: TimerController::new(state, TickQueue::new(), TerminalView::new(), chime),
            input: DurationInput::new(settings.work_minutes, settings.break_minutes),
            quote: pick_quote(&quotes),
        }
    }

    /// Returns false on quit
    pub fn handle(&mut self, command: Command) -> bool {
        self.controller.handle(command)
    }

    /// Fire every tick whose deadline has passed and drop an expired toast
    pub fn on_wake(&mut self, now: Instant) {
        self.controller.fire_due(now);
        self.controller.view_mut().expire_toast(now);
    }

    /// Earliest moment the loop has to wake up without input
    pub fn next_deadline(&self) -> Option<Instant> {
        let tick = self.controller.scheduler().next_deadline();
        let toast = self.controller.view().toast_deadline();
        match (tick, toast) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(path) = cli.log_file.clone().or_else(AppDirs::log_path) {
        if let Err(e) = init_logging(&path, &cli.log_level) {
            eprintln!("pomo: logging disabled ({}): {e}", path.display());
        }
    }

    let store = match &cli.config {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };
    let settings = cli.settings(store.load());
    info!(?settings, "starting pomo");

    let mut app = App::new(&settings);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(MAX_WAIT_MS),
    );
    let result = start_tui(&mut terminal, &mut app, &runner);
    if let Err(e) = &result {
        error!(error = %e, "ui loop failed");
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("exiting");
    result
}

fn start_tui<B: Backend, E: PomoEventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step(app.next_deadline()) {
            PomoEvent::Key(key) => {
                if let Some(command) = app.input.on_key(key) {
                    if !app.handle(command) {
                        break;
                    }
                }
            }
            PomoEvent::Resize | PomoEvent::Wake => {}
        }

        app.on_wake(Instant::now());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use ratatui::backend::TestBackend;

    fn quiet_settings(work_minutes: i64, break_minutes: i64) -> Settings {
        Settings {
            work_minutes,
            break_minutes,
            mode: Mode::Work,
            quotes_path: None,
            chime_path: None,
            sound: false,
        }
    }

    fn render(app: &App) -> String {
        let backend = TestBackend::new(80, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| f.render_widget(app, f.area()))
            .unwrap();
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["pomo"]);

        assert_eq!(cli.work_minutes, None);
        assert_eq!(cli.break_minutes, None);
        assert_eq!(cli.mode, Mode::Work);
        assert_eq!(cli.quotes, None);
        assert!(!cli.no_sound);
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn test_cli_durations() {
        let cli = Cli::parse_from(["pomo", "-w", "50", "-b", "10"]);
        assert_eq!(cli.work_minutes, Some(50));
        assert_eq!(cli.break_minutes, Some(10));

        let cli = Cli::parse_from(["pomo", "--work", "45", "--break", "15"]);
        assert_eq!(cli.work_minutes, Some(45));
        assert_eq!(cli.break_minutes, Some(15));
    }

    #[test]
    fn test_cli_mode() {
        let cli = Cli::parse_from(["pomo", "--mode", "break"]);
        assert_eq!(cli.mode, Mode::Break);

        let err = Cli::try_parse_from(["pomo", "--mode", "lunch"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
        let message = err.to_string();
        assert!(message.contains("work"));
        assert!(message.contains("break"));
    }

    #[test]
    fn test_cli_rejects_out_of_range_durations() {
        let cases: [&[&str]; 5] = [
            &["pomo", "-w", "0"],
            &["pomo", "-w", "181"],
            &["pomo", "-w", "9223372036854775807"],
            &["pomo", "-b", "61"],
            &["pomo", "-b=-3"],
        ];
        for args in cases {
            let err = Cli::try_parse_from(args).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ValueValidation, "{args:?}");
        }

        let cli = Cli::parse_from(["pomo", "-w", "180", "-b", "60"]);
        assert_eq!(cli.work_minutes, Some(180));
        assert_eq!(cli.break_minutes, Some(60));
    }

    #[test]
    fn test_settings_replace_out_of_range_config() {
        let cli = Cli::parse_from(["pomo"]);
        for (work, brk) in [(0, -3), (i64::MAX, 61), (200, i64::MIN)] {
            let config = Config {
                work_minutes: work,
                break_minutes: brk,
                ..Config::default()
            };
            let settings = cli.settings(config);
            assert_eq!(settings.work_minutes, DEFAULT_WORK_MINUTES);
            assert_eq!(settings.break_minutes, DEFAULT_BREAK_MINUTES);
        }

        let config = Config {
            work_minutes: 0,
            break_minutes: 90,
            sound: false,
            ..Config::default()
        };
        let cli = Cli::parse_from(["pomo", "-w", "50"]);
        let settings = cli.settings(config);
        assert_eq!(settings.work_minutes, 50);
        assert_eq!(settings.break_minutes, DEFAULT_BREAK_MINUTES);

        let mut app = App::new(&settings);
        assert_eq!(app.controller.view().timer_text, "50:00");
        assert!(app.controller.view().controls.start_enabled);
        assert!(app.handle(Command::Start));
        assert!(app.controller.state().is_running());
        assert_eq!(app.input.work.minutes(), 50);
        assert_eq!(app.input.break_.minutes(), DEFAULT_BREAK_MINUTES);
    }

    #[test]
    fn test_settings_merge_cli_over_config() {
        let config = Config {
            work_minutes: 40,
            break_minutes: 8,
            quotes_path: Some(PathBuf::from("cfg-quotes.json")),
            chime_path: Some(PathBuf::from("cfg-chime.wav")),
            sound: true,
        };

        let cli = Cli::parse_from(["pomo", "-b", "12", "--chime", "bell.wav"]);
        let settings = cli.settings(config.clone());
        assert_eq!(settings.work_minutes, 40);
        assert_eq!(settings.break_minutes, 12);
        assert_eq!(settings.quotes_path, Some(PathBuf::from("cfg-quotes.json")));
        assert_eq!(settings.chime_path, Some(PathBuf::from("bell.wav")));
        assert!(settings.sound);

        let cli = Cli::parse_from(["pomo", "--no-sound"]);
        assert!(!cli.settings(config).sound);
    }

    #[test]
    fn test_app_starts_in_requested_mode() {
        let mut settings = quiet_settings(25, 5);
        settings.mode = Mode::Break;
        let app = App::new(&settings);

        assert_eq!(app.controller.state().mode(), Mode::Break);
        assert_eq!(app.controller.view().timer_text, "05:00");
        assert!(!app.controller.state().is_running());
    }

    #[test]
    fn test_app_start_tick_pause_reset() {
        let mut app = App::new(&quiet_settings(25, 5));
        assert_eq!(app.next_deadline(), None);

        assert!(app.handle(Command::Start));
        let deadline = app.next_deadline().unwrap();
        assert!(deadline > Instant::now());

        app.on_wake(deadline);
        assert_eq!(app.controller.view().timer_text, "24:59");

        assert!(app.handle(Command::Pause));
        assert_eq!(app.next_deadline(), None);
        app.on_wake(Instant::now() + Duration::from_secs(10));
        assert_eq!(app.controller.view().timer_text, "24:59");

        assert!(app.handle(Command::Reset));
        assert_eq!(app.controller.view().timer_text, "25:00");
        assert!(!app.handle(Command::Quit));
    }

    #[test]
    fn test_app_duration_commit() {
        let mut app = App::new(&quiet_settings(25, 5));
        app.handle(Command::CommitDurations {
            work_minutes: 50,
            break_minutes: 10,
        });
        assert_eq!(app.controller.view().timer_text, "50:00");
    }

    #[test]
    fn test_render_idle_screen() {
        let app = App::new(&quiet_settings(25, 5));
        let screen = render(&app);

        assert!(screen.contains("Pomodoro"));
        assert!(screen.contains("Quote of the day:"));
        assert!(screen.contains("25:00"));
        assert!(screen.contains("WORK"));
        assert!(screen.contains("Start"));
        assert!(screen.contains("Pause"));
        assert!(screen.contains("Reset"));
    }

    #[test]
    fn test_render_shows_toast_after_session_end() {
        let mut app = App::new(&quiet_settings(1, 5));
        app.handle(Command::Start);
        // fire the 60 ticks one deadline at a time
        for _ in 0..60 {
            let deadline = app.next_deadline().unwrap();
            app.on_wake(deadline);
        }
        assert_eq!(app.controller.view().timer_text, "00:00");

        let screen = render(&app);
        assert!(screen.contains("00:00"));
        assert!(screen.contains("Session ended."));
    }

    #[test]
    fn test_render_small_terminal_does_not_panic() {
        let app = App::new(&quiet_settings(25, 5));
        let backend = TestBackend::new(20, 6);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| f.render_widget(&app, f.area()))
            .unwrap();
    }
}
