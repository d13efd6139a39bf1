// The two seams the app layer talks to: identity and league/team storage.

use async_trait::async_trait;
use tokio::sync::broadcast;

use liga_core::model::{League, LeagueId, NewLeague, NewTeam, Session, Team, TeamId};

use crate::error::BackendError;

/// Identity changes published by an [`AuthApi`] implementation.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    /// The session restored at startup (possibly none).
    InitialSession(Option<Session>),
    SignedIn(Session),
    SignedOut,
    TokenRefreshed(Session),
}

impl AuthEvent {
    /// The session in effect after this event.
    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthEvent::InitialSession(s) => s.as_ref(),
            AuthEvent::SignedIn(s) | AuthEvent::TokenRefreshed(s) => Some(s),
            AuthEvent::SignedOut => None,
        }
    }
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    /// The current session, restoring a stored one and refreshing an expired
    /// access token when needed.
    async fn current_session(&self) -> Result<Option<Session>, BackendError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, BackendError>;

    /// Register an account. Returns `None` when the account must be confirmed
    /// by email before a session is issued.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>, BackendError>;

    async fn sign_out(&self) -> Result<(), BackendError>;

    /// Receive every identity change from now on.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;

    /// Bearer token for data requests, if signed in.
    async fn access_token(&self) -> Option<String> {
        self.current_session()
            .await
            .ok()
            .flatten()
            .map(|s| s.access_token)
    }
}

/// Operations on the `leagues` and `teams` collections.
#[async_trait]
pub trait LeagueStore: Send + Sync {
    /// All leagues, oldest first.
    async fn list_leagues(&self) -> Result<Vec<League>, BackendError>;

    /// Single-row select; `None` when no league has this id.
    async fn get_league(&self, id: &LeagueId) -> Result<Option<League>, BackendError>;

    /// Teams of a league ordered by position ascending.
    async fn list_teams(&self, league_id: &LeagueId) -> Result<Vec<Team>, BackendError>;

    async fn insert_league(&self, league: &NewLeague) -> Result<League, BackendError>;

    /// Insert all rows in one request.
    async fn insert_teams(&self, teams: &[NewTeam]) -> Result<Vec<Team>, BackendError>;

    async fn rename_league(&self, id: &LeagueId, name: &str) -> Result<(), BackendError>;

    /// Delete all listed teams in one request.
    async fn delete_teams(&self, ids: &[TeamId]) -> Result<(), BackendError>;

    /// Write the `position` of every given team in one atomic request.
    async fn write_positions(&self, teams: &[Team]) -> Result<(), BackendError>;
}
