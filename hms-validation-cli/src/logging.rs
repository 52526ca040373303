//! Tracing setup for the command-line front end.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

/// Filter used by `--debug`.
pub const DEBUG_FILTER: &str = "hms_validation=debug,hms_validate=debug";

/// A log writer that flushes and syncs every write.
///
/// Cloned handles share one file, so the subscriber can hand out a fresh
/// writer per event.
#[derive(Clone)]
pub struct FileWriterGuard {
    file: Arc<Mutex<File>>,
}

impl FileWriterGuard {
    pub fn new(file: Arc<Mutex<File>>) -> Self {
        Self { file }
    }

    fn lock(&self) -> io::Result<std::sync::MutexGuard<'_, File>> {
        self.file
            .lock()
            .map_err(|_| io::Error::other("log file lock was poisoned"))
    }
}

impl io::Write for FileWriterGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut file = self.lock()?;
        let written = file.write(buf)?;
        file.flush()?;
        file.sync_all()?;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut file = self.lock()?;
        file.flush()?;
        file.sync_all()
    }
}

/// The filter for this run: `--debug`, then `RUST_LOG`, then the configured level.
pub fn env_filter(debug: bool, level: &str) -> EnvFilter {
    if debug {
        EnvFilter::new(DEBUG_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    }
}

/// Install the global subscriber, writing to `log_file` when given and to
/// stderr otherwise.
pub fn init(debug: bool, level: &str, log_file: Option<&Path>) {
    let filter = env_filter(debug, level);

    let file = log_file.map(|path| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| (path.to_path_buf(), e))
    });

    match file {
        Some(Ok(file)) => {
            let guard = FileWriterGuard::new(Arc::new(Mutex::new(file)));
            registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(move || guard.clone())
                        .with_target(false)
                        .with_ansi(false),
                )
                .init();
        }
        other => {
            registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(io::stderr)
                        .with_target(false)
                        .with_ansi(false),
                )
                .init();
            if let Some(Err((path, e))) = other {
                tracing::warn!(
                    "Could not open log file {}: {}. Logging to stderr.",
                    path.display(),
                    e
                );
            }
        }
    }
}
