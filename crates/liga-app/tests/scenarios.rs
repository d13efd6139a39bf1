// End-to-end scenarios for the league app.
//
// These drive the orchestrator through its channels, the way the TUI does,
// against the in-memory backend. They cover session handling, league
// creation and listing, editing, and reordering.

use std::sync::Arc;
use std::time::Duration;

use liga_app::{app, AppState, LeagueService, SessionStore};
use liga_backend::memory::{MemoryAuth, MemoryStore, StoreOp};
use liga_core::edit::TeamDraft;
use liga_core::model::{filter_by_country, Country, LeagueDetail, Team};
use liga_core::protocol::{Route, UiUpdate, UserCommand};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

// ===========================================================================
// Test helpers
// ===========================================================================

struct Running {
    store: Arc<MemoryStore>,
    auth: Arc<MemoryAuth>,
    session: Arc<SessionStore>,
    cmd_tx: mpsc::Sender<UserCommand>,
    ui_rx: mpsc::Receiver<UiUpdate>,
    handle: JoinHandle<anyhow::Result<()>>,
}

/// Start the orchestrator with an admin and an ordinary account registered.
fn start() -> Running {
    let store = Arc::new(MemoryStore::new());
    let auth = Arc::new(MemoryAuth::new());
    auth.add_account("admin@example.com", "admin-pw", Some("admin"));
    auth.add_account("fan@example.com", "fan-pw", None);

    let session = SessionStore::start(auth.clone());
    let service = LeagueService::new(store.clone(), auth.clone());
    let state = AppState::new(service, auth.clone(), None, Country::De);

    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);
    let handle = tokio::spawn(app::run(cmd_rx, session.subscribe(), ui_tx, state));

    Running {
        store,
        auth,
        session,
        cmd_tx,
        ui_rx,
        handle,
    }
}

impl Running {
    async fn send(&self, cmd: UserCommand) {
        self.cmd_tx.send(cmd).await.expect("orchestrator running");
    }

    /// Receive updates until `pick` accepts one.
    async fn expect<T>(&mut self, mut pick: impl FnMut(UiUpdate) -> Option<T>) -> T {
        let deadline = Duration::from_secs(5);
        tokio::time::timeout(deadline, async {
            loop {
                let update = self.ui_rx.recv().await.expect("ui channel open");
                if let Some(found) = pick(update) {
                    return found;
                }
            }
        })
        .await
        .expect("expected update did not arrive")
    }

    async fn sign_in(&mut self, email: &str, password: &str) -> bool {
        self.send(UserCommand::SignIn {
            email: email.into(),
            password: password.into(),
        })
        .await;
        self.expect(|u| match u {
            UiUpdate::Session(s) if s.user.is_some() => Some(s.is_admin),
            _ => None,
        })
        .await
    }

    async fn open_league(&mut self, id: &liga_core::model::LeagueId) -> LeagueDetail {
        self.send(UserCommand::Navigate(Route::League(id.clone())))
            .await;
        self.expect(|u| match u {
            UiUpdate::LeagueLoaded { detail, .. } => detail.map(|d| *d),
            _ => None,
        })
        .await
    }

    async fn create(&mut self, name: &str, country: Country, teams: &[&str]) {
        self.send(UserCommand::CreateLeague {
            name: name.into(),
            country,
            team_names: teams.iter().map(|s| s.to_string()).collect(),
        })
        .await;
        self.expect(|u| matches!(u, UiUpdate::DialogSaved).then_some(()))
            .await;
    }

    async fn quit(self) {
        self.send(UserCommand::Quit).await;
        self.handle.await.unwrap().unwrap();
        self.session.shutdown();
    }
}

fn names(teams: &[Team]) -> Vec<&str> {
    teams.iter().map(|t| t.name.as_str()).collect()
}

fn positions(teams: &[Team]) -> Vec<u32> {
    teams.iter().map(|t| t.position).collect()
}

// ===========================================================================
// Session
// ===========================================================================

#[tokio::test]
async fn admin_controls_follow_role_claim() {
    let mut app = start();
    assert!(app.sign_in("admin@example.com", "admin-pw").await);

    app.send(UserCommand::SignOut).await;
    app.expect(|u| matches!(u, UiUpdate::Navigate(Route::Login)).then_some(()))
        .await;
    app.expect(|u| match u {
        UiUpdate::Session(s) if s.user.is_none() && !s.loading => Some(()),
        _ => None,
    })
    .await;

    assert!(!app.sign_in("fan@example.com", "fan-pw").await);
    app.quit().await;
}

#[tokio::test]
async fn sign_up_awaiting_confirmation() {
    let mut app = start();
    app.auth.require_confirmation(true);
    app.send(UserCommand::SignUp {
        email: "new@example.com".into(),
        password: "pw".into(),
    })
    .await;
    app.expect(|u| matches!(u, UiUpdate::SignUpPending).then_some(()))
        .await;
    assert!(app.session.snapshot().user.is_none());
    app.quit().await;
}

// ===========================================================================
// Leagues
// ===========================================================================

#[tokio::test]
async fn created_league_is_listed_and_ranked() {
    let mut app = start();
    app.sign_in("admin@example.com", "admin-pw").await;

    app.create("Bundesliga", Country::De, &["A", "B"]).await;
    let leagues = app
        .expect(|u| match u {
            UiUpdate::Leagues(l) if !l.is_empty() => Some(l),
            _ => None,
        })
        .await;

    let german = filter_by_country(&leagues, Country::De);
    assert_eq!(german.len(), 1);
    assert_eq!(german[0].name, "Bundesliga");
    assert!(filter_by_country(&leagues, Country::At).is_empty());

    let detail = app.open_league(&german[0].id).await;
    assert_eq!(names(&detail.teams), ["A", "B"]);
    assert_eq!(positions(&detail.teams), [1, 2]);
    app.quit().await;
}

#[tokio::test]
async fn league_with_zero_teams_is_rejected() {
    let mut app = start();
    app.sign_in("admin@example.com", "admin-pw").await;
    app.store.reset_calls();

    app.send(UserCommand::CreateLeague {
        name: "Leer".into(),
        country: Country::At,
        team_names: Vec::new(),
    })
    .await;
    app.expect(|u| matches!(u, UiUpdate::DialogFailed(_)).then_some(()))
        .await;
    assert!(app.store.calls().is_empty());
    app.quit().await;
}

#[tokio::test]
async fn missing_league_loads_as_none() {
    let mut app = start();
    app.send(UserCommand::Navigate(Route::League("missing".into())))
        .await;
    let detail = app
        .expect(|u| match u {
            UiUpdate::LeagueLoaded { detail, .. } => Some(detail),
            _ => None,
        })
        .await;
    assert!(detail.is_none());
    app.quit().await;
}

// ===========================================================================
// Editing
// ===========================================================================

#[tokio::test]
async fn edit_swaps_one_team_and_keeps_positions_contiguous() {
    let mut app = start();
    app.sign_in("admin@example.com", "admin-pw").await;
    app.create("Bundesliga", Country::De, &["A", "B", "C"]).await;
    let league = app.store.leagues()[0].clone();
    let detail = app.open_league(&league.id).await;

    let mut drafts: Vec<TeamDraft> = detail.teams.iter().map(TeamDraft::existing).collect();
    drafts.remove(0);
    drafts.push(TeamDraft::new("D"));
    app.send(UserCommand::SaveLeagueEdits {
        league_id: league.id.clone(),
        name: "Bundesliga".into(),
        teams: drafts,
    })
    .await;
    app.expect(|u| matches!(u, UiUpdate::DialogSaved).then_some(()))
        .await;

    let reloaded = app
        .expect(|u| match u {
            UiUpdate::LeagueLoaded { detail, .. } => detail.map(|d| *d),
            _ => None,
        })
        .await;
    assert_eq!(names(&reloaded.teams), ["B", "C", "D"]);
    assert_eq!(positions(&reloaded.teams), [1, 2, 3]);
    app.quit().await;
}

// ===========================================================================
// Reordering
// ===========================================================================

#[tokio::test]
async fn drag_first_to_last() {
    let mut app = start();
    app.sign_in("admin@example.com", "admin-pw").await;
    app.create("Bundesliga", Country::De, &["a", "b", "c"]).await;
    let league = app.store.leagues()[0].clone();
    app.open_league(&league.id).await;
    app.store.reset_calls();

    app.send(UserCommand::Reorder {
        league_id: league.id.clone(),
        from: 0,
        to: 2,
    })
    .await;
    let teams = app
        .expect(|u| match u {
            UiUpdate::Teams { teams, .. } => Some(teams),
            _ => None,
        })
        .await;
    assert_eq!(names(&teams), ["b", "c", "a"]);
    assert_eq!(positions(&teams), [1, 2, 3]);

    // Commands are handled in order, so once Refresh answers the write is done.
    app.send(UserCommand::Refresh).await;
    app.expect(|u| matches!(u, UiUpdate::LeagueLoaded { .. }).then_some(()))
        .await;
    assert_eq!(app.store.count(StoreOp::WritePositions), 1);
    assert_eq!(names(&app.store.teams_of(&league.id)), ["b", "c", "a"]);
    app.quit().await;
}

#[tokio::test]
async fn rejected_reorder_restores_previous_order() {
    let mut app = start();
    app.sign_in("admin@example.com", "admin-pw").await;
    app.create("Bundesliga", Country::De, &["a", "b", "c"]).await;
    let league = app.store.leagues()[0].clone();
    app.open_league(&league.id).await;
    app.store
        .fail_on(StoreOp::WritePositions, "permission denied for table teams");

    app.send(UserCommand::Reorder {
        league_id: league.id.clone(),
        from: 1,
        to: 0,
    })
    .await;
    let (restored, message) = app
        .expect(|u| match u {
            UiUpdate::ReorderFailed {
                teams, message, ..
            } => Some((teams, message)),
            _ => None,
        })
        .await;
    assert_eq!(names(&restored), ["a", "b", "c"]);
    assert_eq!(message, "permission denied for table teams");
    assert_eq!(names(&app.store.teams_of(&league.id)), ["a", "b", "c"]);
    app.quit().await;
}
