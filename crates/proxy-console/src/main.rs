mod bootstrap;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use console_core::error::ConsoleError;
use console_core::settings::Settings;
use console_runtime::backend::{Backend, HttpBackend};
use console_runtime::dispatcher::ActionDispatcher;
use console_runtime::poller::{Poller, RoundOutcome, FETCH_ERROR_MESSAGE};
use console_runtime::state::StateHandle;
use console_ui::app::App;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;
    settings.validate()?;

    tracing::info!("proxy-console v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        api_url = %settings.api_url,
        mode = %settings.mode,
        refresh_interval_ms = settings.refresh_interval_ms,
        auto_refresh = settings.auto_refresh(),
        "configuration loaded"
    );

    let backend = Arc::new(HttpBackend::new(&settings.backend_config())?);
    let state = StateHandle::new();
    let poller = Poller::new(Arc::clone(&backend), state.clone());
    let dispatcher = ActionDispatcher::new(backend, state);

    match settings.mode.as_str() {
        "export" => {
            let path = run_export(&poller, &dispatcher, settings.export_dir()).await?;
            println!("{}", path.display());
        }
        _ => run_monitor(&settings, poller, dispatcher).await?,
    }

    Ok(())
}

/// Headless export: one round, then write the credentials it fetched.
async fn run_export<B: Backend>(
    poller: &Poller<B>,
    dispatcher: &ActionDispatcher<B>,
    export_dir: PathBuf,
) -> Result<PathBuf> {
    if let RoundOutcome::Failed(reason) = poller.refresh_now().await {
        anyhow::bail!("{FETCH_ERROR_MESSAGE}: {reason}");
    }
    let artifact = dispatcher.export_current()?;
    let path = artifact.write_to(&export_dir)?;
    tracing::info!(path = %path.display(), "credentials exported");
    Ok(path)
}

async fn run_monitor<B: Backend>(
    settings: &Settings,
    mut poller: Poller<B>,
    dispatcher: ActionDispatcher<B>,
) -> Result<()> {
    if settings.auto_refresh() {
        poller.start(settings.refresh_interval());
    } else {
        // Still load once so the first frame is not empty.
        poller.spawn_round();
    }

    let app = App::new(
        &settings.theme,
        settings.api_url.clone(),
        settings.export_dir(),
        settings.refresh_interval(),
    );

    // The loop exits on 'q' / Ctrl+C inside the TUI. Ctrl+C is also caught at
    // the OS level for signals that arrive outside raw mode.
    tokio::select! {
        result = app.run(poller, dispatcher) => {
            result.map_err(|e| ConsoleError::Terminal(e.to_string()))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received; shutting down");
        }
    }
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
