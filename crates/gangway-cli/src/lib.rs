pub mod cli;
pub mod dispatch;

use std::fs::OpenOptions;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use gangway_app::App;

use crate::cli::Cli;

pub fn run() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let mut app = App::load()?;

    dispatch::run_with_deps(cli, &mut app)
}

/// Logging is opt-in and file-backed so it never writes over the TUI:
/// set GANGWAY_LOG to a tracing filter (e.g. `debug`) to capture the
/// degraded-path warnings into gangway.log next to the progress file.
fn init_logging() {
    let Ok(filter) = std::env::var("GANGWAY_LOG") else {
        return;
    };

    let Ok(path) = gangway_core::progress::resolve_progress_path() else {
        return;
    };
    let log_path = path.with_file_name("gangway.log");
    if let Some(parent) = log_path.parent()
        && std::fs::create_dir_all(parent).is_err()
    {
        return;
    }

    let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .try_init();
}
