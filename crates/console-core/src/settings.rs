use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ConsoleError, Result};

/// Backend used when neither `--api-url` nor the environment override is set.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Default poll interval in milliseconds.
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 5_000;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Live session and credential monitor for a proxy backend
#[derive(Parser, Debug, Clone)]
#[command(
    name = "proxy-console",
    about = "Live session and credential monitor for a proxy backend",
    version
)]
pub struct Settings {
    /// Backend base URL
    #[arg(long, env = "PROXY_CONSOLE_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Poll interval in milliseconds (100-600000)
    #[arg(
        long,
        default_value_t = DEFAULT_REFRESH_INTERVAL_MS,
        value_parser = clap::value_parser!(u64).range(100..=600_000)
    )]
    pub refresh_interval_ms: u64,

    /// Start with auto-refresh disabled
    #[arg(long)]
    pub no_auto_refresh: bool,

    /// Run mode
    #[arg(long, default_value = "monitor", value_parser = ["monitor", "export"])]
    pub mode: String,

    /// Directory export files are written to (defaults to the downloads folder)
    #[arg(long)]
    pub export_dir: Option<PathBuf>,

    /// Per-request timeout in seconds; requests wait indefinitely when unset
    #[arg(long)]
    pub request_timeout_secs: Option<u64>,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Log file path (recommended in monitor mode so logs do not overdraw the TUI)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

/// Connection parameters injected into the backend client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Base URL without a trailing slash.
    pub base_url: String,
    /// Optional per-request timeout. `None` waits for the backend indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            request_timeout: None,
        }
    }
}

impl BackendConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            request_timeout: None,
        }
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse the process arguments and apply derived defaults.
    pub fn load() -> Self {
        Self::load_from_args(std::env::args_os().collect())
    }

    /// Same as [`Settings::load`] but accepts an explicit argument list,
    /// enabling unit-testing without spawning subprocesses.
    pub fn load_from_args(args: Vec<OsString>) -> Self {
        let mut settings = Settings::parse_from(args);

        // --debug overrides log level.
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings.api_url = settings.api_url.trim_end_matches('/').to_string();

        settings
    }

    /// Reject values clap cannot check on its own.
    pub fn validate(&self) -> Result<()> {
        let url = self.api_url.as_str();
        let host = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"));
        match host {
            None => {
                return Err(ConsoleError::Config(format!(
                    "api url must use http or https, got {url:?}"
                )));
            }
            Some(rest) if rest.is_empty() => {
                return Err(ConsoleError::Config("api url has no host".to_string()));
            }
            Some(_) => {}
        }
        if self.request_timeout_secs == Some(0) {
            return Err(ConsoleError::Config(
                "request timeout must be at least one second".to_string(),
            ));
        }
        Ok(())
    }

    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig {
            base_url: self.api_url.clone(),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn auto_refresh(&self) -> bool {
        !self.no_auto_refresh
    }

    /// Resolve where export artifacts go: the explicit flag, then the user's
    /// downloads folder, then the working directory.
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
