// Application state and orchestration logic.
//
// The central event loop that takes user commands from the TUI and session
// changes from the session store, runs the matching league operations, and
// pushes UI updates back to the render loop.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use liga_backend::AuthApi;
use liga_core::db::Database;
use liga_core::edit::TeamDraft;
use liga_core::model::{Country, LeagueDetail, LeagueId, SessionState};
use liga_core::protocol::{Route, UiUpdate, UserCommand};
use liga_core::ranking;

use crate::service::LeagueService;

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Everything the orchestrator knows. Only the event loop touches it.
pub struct AppState {
    pub service: LeagueService,
    pub auth: Arc<dyn AuthApi>,
    /// Where the selected country tab is remembered across runs.
    pub db: Option<Arc<Database>>,
    pub route: Route,
    pub country: Country,
    pub session: SessionState,
    /// The league shown on the detail route, once loaded.
    pub current: Option<LeagueDetail>,
}

impl AppState {
    pub fn new(
        service: LeagueService,
        auth: Arc<dyn AuthApi>,
        db: Option<Arc<Database>>,
        country: Country,
    ) -> Self {
        AppState {
            service,
            auth,
            db,
            route: Route::Home,
            country,
            session: SessionState::loading(),
            current: None,
        }
    }

    fn current_for(&self, id: &LeagueId) -> Option<&LeagueDetail> {
        self.current.as_ref().filter(|d| &d.league.id == id)
    }
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// Run the orchestrator until `Quit` arrives or the command channel closes.
///
/// Listens on two channels using `tokio::select!`:
/// - `cmd_rx`: commands from the TUI
/// - `session_rx`: snapshots from the session store
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    mut session_rx: watch::Receiver<SessionState>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    state.session = session_rx.borrow_and_update().clone();
    let _ = ui_tx.send(UiUpdate::Session(state.session.clone())).await;
    let _ = ui_tx.send(UiUpdate::Country(state.country)).await;
    let _ = ui_tx.send(UiUpdate::Navigate(state.route.clone())).await;
    load_route(&mut state, &ui_tx).await;

    // Once the session store goes away its branch is disabled so select!
    // never spins on a closed channel.
    let mut session_open = true;

    loop {
        tokio::select! {
            // --- Session changes ---
            changed = session_rx.changed(), if session_open => {
                match changed {
                    Ok(()) => {
                        state.session = session_rx.borrow_and_update().clone();
                        debug!("Session update (loading: {})", state.session.loading);
                        let _ = ui_tx.send(UiUpdate::Session(state.session.clone())).await;
                    }
                    Err(_) => {
                        info!("Session channel closed");
                        session_open = false;
                    }
                }
            }

            // --- User commands ---
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => {
                        handle_user_command(&mut state, cmd, &ui_tx).await;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}

async fn handle_user_command(
    state: &mut AppState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match cmd {
        UserCommand::Navigate(route) => {
            navigate(state, route, ui_tx).await;
        }
        UserCommand::SelectCountry(country) => {
            state.country = country;
            if let Some(db) = &state.db {
                if let Err(e) = db.save_country(country) {
                    warn!("Failed to remember country tab: {}", e);
                }
            }
            let _ = ui_tx.send(UiUpdate::Country(country)).await;
        }
        UserCommand::SignIn { email, password } => {
            match state.auth.sign_in_with_password(&email, &password).await {
                Ok(_) => navigate(state, Route::Home, ui_tx).await,
                Err(e) => {
                    info!("Sign-in failed: {}", e);
                    let _ = ui_tx.send(UiUpdate::LoginFailed(e.to_string())).await;
                }
            }
        }
        UserCommand::SignUp { email, password } => {
            match state.auth.sign_up(&email, &password).await {
                Ok(Some(_)) => navigate(state, Route::Home, ui_tx).await,
                Ok(None) => {
                    let _ = ui_tx.send(UiUpdate::SignUpPending).await;
                }
                Err(e) => {
                    info!("Sign-up failed: {}", e);
                    let _ = ui_tx.send(UiUpdate::LoginFailed(e.to_string())).await;
                }
            }
        }
        UserCommand::SignOut => match state.auth.sign_out().await {
            Ok(()) => navigate(state, Route::Login, ui_tx).await,
            Err(e) => {
                warn!("Sign-out failed: {}", e);
                let _ = ui_tx.send(UiUpdate::Error(e.to_string())).await;
            }
        },
        UserCommand::CreateLeague {
            name,
            country,
            team_names,
        } => {
            match state
                .service
                .create_league(&name, country, &team_names)
                .await
            {
                Ok(_) => {
                    let _ = ui_tx.send(UiUpdate::DialogSaved).await;
                    refresh_leagues(ui_tx, state).await;
                }
                Err(e) => {
                    let _ = ui_tx.send(UiUpdate::DialogFailed(e.to_string())).await;
                }
            }
        }
        UserCommand::SaveLeagueEdits {
            league_id,
            name,
            teams,
        } => {
            save_edits(state, league_id, name, teams, ui_tx).await;
        }
        UserCommand::Reorder {
            league_id,
            from,
            to,
        } => {
            reorder(state, league_id, from, to, ui_tx).await;
        }
        UserCommand::Refresh => {
            load_route(state, ui_tx).await;
        }
        UserCommand::Quit => {
            // Handled by the event loop.
        }
    }
}

async fn navigate(state: &mut AppState, route: Route, ui_tx: &mpsc::Sender<UiUpdate>) {
    debug!("Navigate to {:?}", route);
    if !matches!(&route, Route::League(id) if state.current_for(id).is_some()) {
        state.current = None;
    }
    state.route = route.clone();
    let _ = ui_tx.send(UiUpdate::Navigate(route)).await;
    load_route(state, ui_tx).await;
}

/// Fetch whatever the current route displays.
async fn load_route(state: &mut AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    match state.route.clone() {
        Route::Home => refresh_leagues(ui_tx, state).await,
        Route::Login => {}
        Route::League(id) => load_league(state, id, ui_tx).await,
    }
}

async fn refresh_leagues(ui_tx: &mpsc::Sender<UiUpdate>, state: &AppState) {
    match state.service.list_leagues().await {
        Ok(leagues) => {
            let _ = ui_tx.send(UiUpdate::Leagues(leagues)).await;
        }
        Err(e) => {
            warn!("Failed to list leagues: {}", e);
            let _ = ui_tx.send(UiUpdate::Error(e.to_string())).await;
        }
    }
}

async fn load_league(state: &mut AppState, id: LeagueId, ui_tx: &mpsc::Sender<UiUpdate>) {
    match state.service.load_league_and_teams(&id).await {
        Ok(detail) => {
            state.current = detail.clone();
            let _ = ui_tx
                .send(UiUpdate::LeagueLoaded {
                    id,
                    detail: detail.map(Box::new),
                })
                .await;
        }
        Err(e) => {
            warn!("Failed to load league {}: {}", id, e);
            let _ = ui_tx.send(UiUpdate::Error(e.to_string())).await;
        }
    }
}

async fn save_edits(
    state: &mut AppState,
    league_id: LeagueId,
    name: String,
    submitted: Vec<TeamDraft>,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    // The diff is taken against what the dialog was opened from.
    let existing = match state.current_for(&league_id) {
        Some(detail) => detail.teams.clone(),
        None => match state.service.load_league_and_teams(&league_id).await {
            Ok(Some(detail)) => detail.teams,
            Ok(None) => Vec::new(),
            Err(e) => {
                let _ = ui_tx.send(UiUpdate::DialogFailed(e.to_string())).await;
                return;
            }
        },
    };

    match state
        .service
        .save_league_edits(&league_id, &existing, &name, &submitted)
        .await
    {
        Ok(_) => {
            let _ = ui_tx.send(UiUpdate::DialogSaved).await;
            if state.route == Route::League(league_id.clone()) {
                load_league(state, league_id, ui_tx).await;
            }
        }
        Err(e) => {
            let _ = ui_tx.send(UiUpdate::DialogFailed(e.to_string())).await;
            // Earlier steps may have landed; the cached ranking is stale.
            if state.route == Route::League(league_id.clone()) {
                load_league(state, league_id, ui_tx).await;
            }
        }
    }
}

/// Apply a reorder locally, then persist it. On failure the previous order
/// is restored and the error is reported.
async fn reorder(
    state: &mut AppState,
    league_id: LeagueId,
    from: usize,
    to: usize,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    let Some(detail) = state
        .current
        .as_mut()
        .filter(|d| d.league.id == league_id)
    else {
        debug!("Reorder for {} ignored: league not loaded", league_id);
        return;
    };
    let Some(change) = ranking::reorder(&detail.teams, from, to) else {
        return;
    };

    detail.teams = change.next.clone();
    let _ = ui_tx
        .send(UiUpdate::Teams {
            league_id: league_id.clone(),
            teams: change.next.clone(),
        })
        .await;

    if let Err(e) = state.service.persist_order(&change).await {
        warn!("Reorder of {} not saved: {}", league_id, e);
        if let Some(detail) = state.current.as_mut().filter(|d| d.league.id == league_id) {
            detail.teams = change.previous.clone();
        }
        let _ = ui_tx
            .send(UiUpdate::ReorderFailed {
                league_id,
                teams: change.previous,
                message: e.to_string(),
            })
            .await;
    }
}
