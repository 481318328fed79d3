use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::palette::Palette;
use crate::utils::get_data_dir;

pub const LOG_FILTER_ENV: &str = "LESSON_SUMMARY_LOG";
const LOG_FILE_NAME: &str = "lesson-summary.log";
const DEFAULT_FILTER: &str = "info";

/// Sends `tracing` output to a file in the data directory; the terminal belongs to the UI.
/// Without a usable data directory the program runs unlogged after a warning on stderr.
pub fn init() -> Option<PathBuf> {
    init_in(get_data_dir())
}

fn init_in(data_dir: Result<PathBuf>) -> Option<PathBuf> {
    let result = data_dir.and_then(|dir| {
        let path = dir.join(LOG_FILE_NAME);
        init_at(&path).map(|()| path)
    });

    match result {
        Ok(path) => Some(path),
        Err(err) => {
            eprintln!("{} {err:#}", Palette::WARNING.paint("Logging disabled:"));
            None
        }
    }
}

pub fn init_at(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file at {}", path.display()))?;

    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // A subscriber may already be installed (tests); that is not an error.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();

    Ok(())
}
