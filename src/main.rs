use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
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
    fs,
    io::{self, stdin},
    path::PathBuf,
    sync::Mutex,
};
use tracing::{info, warn, Level};
use typenotes::{
    app::{App, Stores},
    app_dirs::AppDirs,
    config::{ConfigStore, FileConfigStore, Settings},
    history::HistoryDb,
    notes::FileNoteStore,
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
};

/// write a note, then practice typing it back
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Write free-form notes, then practice retyping them with live words-per-minute and accuracy feedback."
)]
pub struct Cli {
    /// practice the contents of this file (it replaces the saved note)
    #[clap(short = 'n', long)]
    note: Option<PathBuf>,

    /// minimum milliseconds between live wpm refreshes
    #[clap(long)]
    stats_interval_ms: Option<u64>,

    /// don't record practice history for this run
    #[clap(long)]
    no_history: bool,

    /// log file (defaults to the state directory)
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// include debug events in the log
    #[clap(short = 'v', long)]
    verbose: bool,
}

impl Cli {
    /// Settings for this run; nothing here is written back to the config file.
    fn apply_overrides(&self, mut settings: Settings) -> Settings {
        if let Some(ms) = self.stats_interval_ms {
            settings.stats_interval_ms = ms;
        }
        if self.no_history {
            settings.history_enabled = false;
        }
        settings
    }
}

fn setup_tracing(cli: &Cli) -> io::Result<()> {
    // the terminal belongs to the UI, so logs go to a file or nowhere
    let Some(path) = cli.log_file.clone().or_else(AppDirs::log_path) else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| io::Error::new(e.kind(), format!("{}: {e}", path.display())))?;

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(if cli.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .finish();

    tracing::subscriber::set_global_default(subscriber).map_err(io::Error::other)
}

fn open_stores() -> Stores {
    let history = match HistoryDb::new() {
        Ok(db) => Some(db),
        Err(e) => {
            warn!(error = %e, "practice history unavailable");
            None
        }
    };

    Stores {
        notes: Box::new(FileNoteStore::new()),
        config: Box::new(FileConfigStore::new()),
        history,
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    // still before raw mode, so stderr is readable
    if let Err(e) = setup_tracing(&cli) {
        eprintln!("typenotes: logging disabled: {e}");
    }

    let config = FileConfigStore::new();
    let settings = cli.apply_overrides(config.load());
    info!(path = %config.path().display(), "settings loaded");
    let mut app = App::new(settings, open_stores());

    if let Some(path) = &cli.note {
        let text = fs::read_to_string(path)?;
        info!(path = %path.display(), "practicing note from file");
        app.replace_note(&text);
        app.start_practice();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());

    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    while !app.should_quit {
        let event = runner.step();
        // ticks only change what's visible while a status message is up
        let redraw = event != AppEvent::Tick || app.status.is_some();

        app.handle_event(event);

        if redraw {
            terminal.draw(|f| f.render_widget(&*app, f.area()))?;
        }
    }

    Ok(())
}
