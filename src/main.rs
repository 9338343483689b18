use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use tracing::{debug, info, warn};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod controller;
mod domain;
mod inputter;
mod landing;
mod model;
mod pipeline;
mod roster;
mod slideshow;
mod ui;

use controller::Controller;
use domain::{RosterConfig, RosterError, StartScreen};
use model::{AppStatus, Model};
use pipeline::PageSize;
use ui::TableUI;

#[derive(Parser, Debug)]
#[command(version, about = "A tui based student roster manager.")]
struct Args {
    /// Roster csv with the columns id,name,email,section,status. Uses the built in list if omitted.
    #[arg(short, long)]
    file: Option<String>,

    /// Rows per page (5, 10 or 20)
    #[arg(short, long, default_value = "5")]
    page_size: PageSize,

    /// Page shown after start
    #[arg(short, long, value_enum, default_value_t = StartScreen::Landing)]
    start: StartScreen,

    /// Milliseconds to wait for terminal events per frame
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,

    /// Where to write logs. Controlled by RUST_LOG, defaults to info.
    #[arg(long, default_value = "~/.roster.log")]
    log_file: String,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let result = run(args);
    ratatui::restore();
    match result {
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn expand_path(path: &str) -> Result<PathBuf, RosterError> {
    shellexpand::full(path)
        .map(|p| PathBuf::from(p.as_ref()))
        .map_err(|e| RosterError::LoadingFailed(e.to_string()))
}

fn init_logging(log_file: &str) -> Result<(), RosterError> {
    let file = File::create(expand_path(log_file)?)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // The terminal belongs to the ui, so everything goes into the log file.
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(ErrorLayer::default())
        .init();
    Ok(())
}

fn run(args: Args) -> Result<(), RosterError> {
    init_logging(&args.log_file)?;

    let mut cfg = RosterConfig::default()
        .with_event_poll_time(args.poll_ms)
        .with_page_size(args.page_size)
        .with_start_screen(args.start);
    if let Some(file) = args.file.as_deref() {
        cfg = cfg.with_roster_file(expand_path(file)?);
    }
    info!("Starting roster with {:?}", cfg);

    let records = match &cfg.roster_file {
        Some(path) => roster::load_csv(path)?,
        None => roster::seed_records(),
    };
    if records.is_empty() {
        warn!("Roster is empty");
    }

    let mut model = Model::init(&cfg, records)?;
    let mut ui = TableUI::new(&cfg);
    let controller = Controller::new(&cfg);

    let mut terminal = ratatui::init();

    while model.status != AppStatus::QUITTING {
        terminal.draw(|f| ui.draw(&model, f))?;

        let message = controller.handle_event(&model)?;
        model.update(message)?;

        // No router is attached to the terminal front end.
        if let Some(target) = model.take_navigation() {
            debug!("Dropping navigation to {}", target.route());
        }
    }

    info!("Bye");
    Ok(())
}
