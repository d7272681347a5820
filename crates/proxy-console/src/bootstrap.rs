use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a `--log-level` name onto an `EnvFilter` directive.
///
/// Unknown names pass through lowercased so that full directives such as
/// `"console_runtime=debug"` keep working.
pub fn level_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" | "WARN" => "warn".to_string(),
        "ERROR" => "error".to_string(),
        _ => log_level.to_lowercase(),
    }
}

/// Open `path` for appending, creating it and any missing parent directories.
pub fn open_log_file(path: &Path) -> anyhow::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(file)
}

/// Initialise the global `tracing` subscriber.
///
/// With `log_file` set, records go to that file without ANSI colours so the
/// TUI keeps the terminal to itself. Otherwise they go to stderr.
pub fn setup_logging(log_level: &str, log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(level_directive(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, stderr_layer) = match log_file {
        Some(path) => {
            let file = open_log_file(path)?;
            let layer = fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (Some(layer), None)
        }
        None => {
            let layer = fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr);
            (None, Some(layer))
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
