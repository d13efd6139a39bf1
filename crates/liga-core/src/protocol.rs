// Messages exchanged between the app orchestrator and the TUI.

use crate::edit::TeamDraft;
use crate::model::{Country, League, LeagueDetail, LeagueId, SessionState, Team};

/// Client-side routes: home (league list), login, league detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    League(LeagueId),
}

/// Commands sent from the TUI to the app orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    Navigate(Route),
    SelectCountry(Country),
    SignIn {
        email: String,
        password: String,
    },
    SignUp {
        email: String,
        password: String,
    },
    SignOut,
    CreateLeague {
        name: String,
        country: Country,
        team_names: Vec<String>,
    },
    SaveLeagueEdits {
        league_id: LeagueId,
        name: String,
        teams: Vec<TeamDraft>,
    },
    /// The team at `from` was dropped onto `to` in the ranking table.
    Reorder {
        league_id: LeagueId,
        from: usize,
        to: usize,
    },
    /// Re-fetch the data behind the current route.
    Refresh,
    Quit,
}

/// Updates pushed from the app orchestrator to the TUI.
#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    Session(SessionState),
    Navigate(Route),
    Country(Country),
    /// All leagues ordered by creation time; the TUI filters by country.
    Leagues(Vec<League>),
    /// Result of loading a league; `None` when it does not exist.
    LeagueLoaded {
        id: LeagueId,
        detail: Option<Box<LeagueDetail>>,
    },
    /// New local order for a league's ranking table.
    Teams {
        league_id: LeagueId,
        teams: Vec<Team>,
    },
    /// Persisting a reorder failed; `teams` is the order to restore.
    ReorderFailed {
        league_id: LeagueId,
        teams: Vec<Team>,
        message: String,
    },
    LoginFailed(String),
    /// Sign-up accepted but the account still needs email confirmation.
    SignUpPending,
    DialogSaved,
    DialogFailed(String),
    /// Non-dialog error shown in the status line.
    Error(String),
}
