// Liga Ranking entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Open the local database
// 4. Build backend clients and start the session store
// 5. Create mpsc channels
// 6. Spawn app logic task
// 7. Run the TUI until the user quits
// 8. Cleanup on exit

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use liga_app::{AppState, LeagueService, SessionStore};
use liga_backend::{AuthApi, AuthClient, Endpoint, LeagueStore, RestClient, RestStore};
use liga_core::config;
use liga_core::db::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, not terminal)
    init_tracing()?;
    info!("Liga Ranking starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    if config.anon_key().is_empty() {
        anyhow::bail!(
            "no anon key configured: set credentials.anon_key in config/credentials.toml or LIGA_ANON_KEY"
        );
    }
    info!("Config loaded: backend={}", config.backend.url);

    // 3. Open the local database
    let db_path = config.db_path().context("failed to resolve database path")?;
    let db_path = db_path.to_string_lossy().into_owned();
    let db = Arc::new(Database::open(&db_path).context("failed to open database")?);
    info!("Database opened at {}", db_path);

    let country = match db.load_country() {
        Ok(Some(country)) => country,
        Ok(None) => config.ui.default_country,
        Err(e) => {
            warn!("Could not read saved country: {}", e);
            config.ui.default_country
        }
    };

    // 4. Build backend clients and start the session store
    let endpoint = Endpoint::new(&config.backend.url, config.anon_key());
    let auth: Arc<dyn AuthApi> = Arc::new(AuthClient::new(endpoint.clone(), Some(db.clone())));
    let store: Arc<dyn LeagueStore> =
        Arc::new(RestStore::new(RestClient::new(endpoint), auth.clone()));
    let session = SessionStore::start(auth.clone());

    let service = LeagueService::new(store, auth.clone());
    let app_state = AppState::new(service, auth, Some(db), country);

    // 5. Create mpsc channels
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    // 6. Spawn app logic task
    let session_rx = session.subscribe();
    let app_handle = tokio::spawn(async move {
        if let Err(e) = liga_app::run(cmd_rx, session_rx, ui_tx, app_state).await {
            error!("Application loop error: {:#}", e);
        }
    });

    // 7. Run the TUI (blocks until the user quits)
    info!("Application ready");
    if let Err(e) = liga_tui::run(ui_rx, cmd_tx).await {
        error!("TUI error: {:#}", e);
    }

    // 8. Cleanup: wait for the app task, then stop the session listener
    if tokio::time::timeout(std::time::Duration::from_secs(5), app_handle)
        .await
        .is_err()
    {
        warn!("Application loop did not stop within 5s");
    }
    session.shutdown();

    info!("Liga Ranking shut down cleanly");
    Ok(())
}

const DEFAULT_FILTER: &str =
    "liga=info,liga_core=info,liga_backend=info,liga_app=info,liga_tui=info,warn";

/// Initialize tracing to log to a file (not the terminal, which is used by the TUI).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("liga.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
