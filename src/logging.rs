//! Logging setup.
//!
//! The terminal belongs to the TUI, so log lines go to a file. Setup is
//! best effort: if the file can't be opened the app runs without logs.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Open (append) the log file, creating its directory if needed.
pub fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber. Only the first call takes effect.
pub fn init_logging(path: Option<&Path>, filter: &str) {
    let Some(path) = path else {
        return;
    };
    let Ok(file) = open_log_file(path) else {
        return;
    };

    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_log_file_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("movie-finder.log");

        let file = open_log_file(&path);
        assert!(file.is_ok());
        assert!(path.exists());
    }

    #[test]
    fn test_init_logging_writes_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movie-finder.log");

        init_logging(Some(&path), "info");
        tracing::info!("logging initialized");

        // Another test may have installed the subscriber first.
        assert!(path.exists());
    }

    #[test]
    fn test_init_logging_without_path_is_noop() {
        init_logging(None, "debug");
    }
}
