use anyhow::Context;
use clap::Parser;
use codefolio::app::App;
use codefolio::config::{self, Config};
use codefolio::storage::{self, JsonFileStore, ProgressStore};
use codefolio::theme::ThemeKey;
use codefolio::time_source::RealTimeSource;
use codefolio::ui;
use crossterm::event::{self, Event, KeyEventKind};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// How long the status-bar confetti stays up after an unlock.
const CONFETTI_DURATION: Duration = Duration::from_secs(2);

/// Input poll timeout; also bounds how late a delayed terminal output or
/// toast expiry can resolve.
const TICK_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Parser, Debug)]
#[command(name = "codefolio", about = "A developer portfolio rendered as a terminal code editor")]
struct Args {
    /// Start with this theme (dark, light, hc), overriding the saved config
    #[arg(long)]
    theme: Option<String>,

    /// Directory for persisted state (default: XDG state dir)
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// Wipe saved achievement progress before starting
    #[arg(long)]
    reset_achievements: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing();

    let mut config = Config::load();
    if let Some(theme) = &args.theme {
        config.theme = ThemeKey::parse(theme);
    }

    let mut store = match &args.state_dir {
        Some(dir) => JsonFileStore::with_path(dir.join("achievements.json")),
        None => JsonFileStore::new(),
    };
    if args.reset_achievements {
        store
            .save(&Default::default())
            .context("resetting achievement progress")?;
    }

    let app = App::new(
        config,
        Some(config::config_path()),
        Box::new(store),
        RealTimeSource::shared(),
    );

    let terminal = ratatui::init();
    let result = run(terminal, app);
    ratatui::restore();
    result
}

fn run(mut terminal: ratatui::DefaultTerminal, mut app: App) -> anyhow::Result<()> {
    let mut confetti_until: Option<Instant> = None;

    loop {
        let confetti = confetti_until.map(|t| Instant::now() < t).unwrap_or(false);
        terminal
            .draw(|frame| ui::draw(frame, &app, confetti))
            .context("drawing frame")?;

        if event::poll(TICK_INTERVAL).context("polling input")? {
            match event::read().context("reading input")? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                _ => {}
            }
        }

        app.tick();
        if app.take_confetti() {
            confetti_until = Some(Instant::now() + CONFETTI_DURATION);
        }

        if app.should_quit() {
            return Ok(());
        }
    }
}

/// Log to a file under the XDG state dir; the terminal owns stdout.
/// Logging is best-effort: failure to open the file just disables it.
fn init_tracing() {
    let log_dir = storage::state_dir().join("logs");
    if std::fs::create_dir_all(&log_dir).is_err() {
        return;
    }
    let log_path = log_dir.join(format!("codefolio-{}.log", std::process::id()));
    let Ok(file) = std::fs::File::create(&log_path) else {
        return;
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_ansi(false)
        .with_writer(Arc::new(file));
    let _ = subscriber.try_init();
}
