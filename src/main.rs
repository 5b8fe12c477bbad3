use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::KeyEventKind,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Instant,
};
use tracing::info;
use typing_sprint::{
    app::App,
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    history::{clear_history, load_history, FileHistoryStore},
    logging,
    runtime::{AppEvent, AppEventSource, CrosstermEventSource, Runner},
};

/// one-sentence typing speed test with a short local history
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type a single sentence as fast and as accurately as you can. Words per minute and accuracy are shown when the sentence is complete, and the last five results are kept."
)]
pub struct Cli {
    /// custom sentence to type instead of a random one
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// file holding the result history
    #[clap(long)]
    history_file: Option<PathBuf>,

    /// wpm above which the "fast" message is shown
    #[clap(long)]
    threshold: Option<f64>,

    /// timer refresh interval in milliseconds
    #[clap(long)]
    tick_ms: Option<u64>,

    /// print the stored history and exit
    #[clap(long, conflicts_with = "clear_history")]
    print_history: bool,

    /// delete the stored history and exit
    #[clap(long)]
    clear_history: bool,

    /// write the effective settings to the config file
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Apply command line overrides on top of the stored config
    fn apply_to(&self, mut config: Config) -> Config {
        if let Some(threshold) = self.threshold {
            config.fast_wpm_threshold = threshold;
        }
        if let Some(tick_ms) = self.tick_ms {
            config.tick_interval_ms = tick_ms;
        }
        config
    }

    fn history_store(&self) -> FileHistoryStore {
        match &self.history_file {
            Some(path) => FileHistoryStore::with_path(path),
            None => FileHistoryStore::new(),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let _log_guard = logging::init(&AppDirs::log_path());

    let config_store = FileConfigStore::new();
    let config = cli.apply_to(config_store.load());
    if cli.save_config {
        config_store.save(&config)?;
        println!("settings saved to {}", config_store.path().display());
    }

    let store = cli.history_store();

    if cli.print_history {
        println!("{}", load_history(&store));
        return Ok(());
    }

    if cli.clear_history {
        clear_history(&store)?;
        println!("history cleared");
        return Ok(());
    }

    if cli.prompt.as_deref().is_some_and(|p| p.trim().is_empty()) {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::InvalidValue, "prompt must not be empty")
            .exit();
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    info!(history = %store.path().display(), "starting");

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut runner = Runner::new(CrosstermEventSource::new(), config.tick_interval());
    let mut app = App::new(config, Box::new(store), cli.prompt.clone());
    let res = start_tui(&mut terminal, &mut app, &mut runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    res
}

fn start_tui<B: Backend, E: AppEventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &mut Runner<E>,
) -> Result<(), Box<dyn Error>> {
    loop {
        // the timer only refreshes while a test is running
        runner.set_ticking(app.is_ticking());
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step() {
            AppEvent::Tick | AppEvent::Resize => {}
            AppEvent::Key(key) => {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key, Instant::now());
                }
            }
            AppEvent::Closed => break,
        }

        if app.should_quit {
            break;
        }
    }

    info!(results = app.history.len(), "exiting");
    Ok(())
}
