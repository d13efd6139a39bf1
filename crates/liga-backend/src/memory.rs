// In-process implementations of the backend traits.
//
// They keep rows and accounts in memory, record every call, and can be told
// to fail specific operations. The app and UI layers are tested against them.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::broadcast;

use liga_core::model::{
    AppMetadata, League, LeagueId, NewLeague, NewTeam, Session, Team, TeamId, User,
};

use crate::api::{AuthApi, AuthEvent, LeagueStore};
use crate::error::BackendError;

fn epoch() -> DateTime<Utc> {
    Utc.timestamp_opt(1_735_689_600, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

fn rejected(message: &str) -> BackendError {
    BackendError::Api {
        status: 403,
        message: message.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Operations of [`LeagueStore`], as recorded by [`MemoryStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    ListLeagues,
    GetLeague,
    ListTeams,
    InsertLeague,
    InsertTeams,
    RenameLeague,
    DeleteTeams,
    WritePositions,
}

#[derive(Default)]
struct StoreInner {
    leagues: Vec<League>,
    teams: Vec<Team>,
    next_id: u64,
    calls: Vec<StoreOp>,
    failures: HashMap<StoreOp, String>,
}

impl StoreInner {
    fn tick(&mut self, prefix: &str) -> (String, DateTime<Utc>) {
        self.next_id += 1;
        let id = format!("{prefix}-{}", self.next_id);
        let created_at = epoch() + Duration::seconds(self.next_id as i64);
        (id, created_at)
    }

    fn enter(&mut self, op: StoreOp) -> Result<(), BackendError> {
        self.calls.push(op);
        match self.failures.get(&op) {
            Some(message) => Err(rejected(message)),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<StoreInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreInner> {
        self.inner.lock().expect("memory store lock poisoned")
    }

    /// Make every future call of `op` fail with `message` (as a 403).
    pub fn fail_on(&self, op: StoreOp, message: &str) {
        self.lock().failures.insert(op, message.to_string());
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    /// Every operation called so far, in order.
    pub fn calls(&self) -> Vec<StoreOp> {
        self.lock().calls.clone()
    }

    pub fn count(&self, op: StoreOp) -> usize {
        self.lock().calls.iter().filter(|c| **c == op).count()
    }

    pub fn reset_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn leagues(&self) -> Vec<League> {
        self.lock().leagues.clone()
    }

    /// Stored teams of a league ordered by position.
    pub fn teams_of(&self, league_id: &LeagueId) -> Vec<Team> {
        let mut teams: Vec<Team> = self
            .lock()
            .teams
            .iter()
            .filter(|t| &t.league_id == league_id)
            .cloned()
            .collect();
        teams.sort_by_key(|t| t.position);
        teams
    }
}

#[async_trait]
impl LeagueStore for MemoryStore {
    async fn list_leagues(&self) -> Result<Vec<League>, BackendError> {
        let mut inner = self.lock();
        inner.enter(StoreOp::ListLeagues)?;
        let mut leagues = inner.leagues.clone();
        leagues.sort_by_key(|l| l.created_at);
        Ok(leagues)
    }

    async fn get_league(&self, id: &LeagueId) -> Result<Option<League>, BackendError> {
        let mut inner = self.lock();
        inner.enter(StoreOp::GetLeague)?;
        Ok(inner.leagues.iter().find(|l| &l.id == id).cloned())
    }

    async fn list_teams(&self, league_id: &LeagueId) -> Result<Vec<Team>, BackendError> {
        self.lock().enter(StoreOp::ListTeams)?;
        Ok(self.teams_of(league_id))
    }

    async fn insert_league(&self, league: &NewLeague) -> Result<League, BackendError> {
        let mut inner = self.lock();
        inner.enter(StoreOp::InsertLeague)?;
        let (id, created_at) = inner.tick("league");
        let row = League {
            id: LeagueId(id),
            name: league.name.clone(),
            country_code: league.country_code,
            created_by: league.created_by.clone(),
            created_at,
        };
        inner.leagues.push(row.clone());
        Ok(row)
    }

    async fn insert_teams(&self, teams: &[NewTeam]) -> Result<Vec<Team>, BackendError> {
        let mut inner = self.lock();
        inner.enter(StoreOp::InsertTeams)?;
        let mut created = Vec::with_capacity(teams.len());
        for new in teams {
            let (id, created_at) = inner.tick("team");
            created.push(Team {
                id: TeamId(id),
                league_id: new.league_id.clone(),
                name: new.name.clone(),
                position: new.position,
                created_at,
            });
        }
        inner.teams.extend(created.iter().cloned());
        Ok(created)
    }

    async fn rename_league(&self, id: &LeagueId, name: &str) -> Result<(), BackendError> {
        let mut inner = self.lock();
        inner.enter(StoreOp::RenameLeague)?;
        if let Some(league) = inner.leagues.iter_mut().find(|l| &l.id == id) {
            league.name = name.to_string();
        }
        Ok(())
    }

    async fn delete_teams(&self, ids: &[TeamId]) -> Result<(), BackendError> {
        let mut inner = self.lock();
        inner.enter(StoreOp::DeleteTeams)?;
        inner.teams.retain(|t| !ids.contains(&t.id));
        Ok(())
    }

    async fn write_positions(&self, teams: &[Team]) -> Result<(), BackendError> {
        let mut inner = self.lock();
        inner.enter(StoreOp::WritePositions)?;
        // All or nothing: an unknown id rejects the batch like the NOT NULL
        // violation of the real upsert.
        if let Some(missing) = teams
            .iter()
            .find(|team| !inner.teams.iter().any(|t| t.id == team.id))
        {
            return Err(BackendError::Api {
                status: 400,
                message: format!(
                    "null value in column \"league_id\" of relation \"teams\" violates not-null constraint (id {})",
                    missing.id.0
                ),
            });
        }
        for team in teams {
            if let Some(stored) = inner.teams.iter_mut().find(|t| t.id == team.id) {
                stored.position = team.position;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

struct Account {
    password: String,
    user: User,
}

#[derive(Default)]
struct AuthInner {
    accounts: HashMap<String, Account>,
    session: Option<Session>,
    confirm_sign_ups: bool,
    initial_sent: bool,
}

pub struct MemoryAuth {
    inner: Mutex<AuthInner>,
    events: broadcast::Sender<AuthEvent>,
}

impl Default for MemoryAuth {
    fn default() -> Self {
        MemoryAuth::new()
    }
}

impl MemoryAuth {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        MemoryAuth {
            inner: Mutex::new(AuthInner::default()),
            events,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, AuthInner> {
        self.inner.lock().expect("memory auth lock poisoned")
    }

    fn session_for(user: &User) -> Session {
        Session {
            access_token: format!("memory-token-{}", user.id),
            refresh_token: format!("memory-refresh-{}", user.id),
            expires_at: i64::MAX,
            user: user.clone(),
        }
    }

    /// Register an account that can sign in with `password`.
    pub fn add_account(&self, email: &str, password: &str, role: Option<&str>) -> User {
        let mut inner = self.lock();
        let user = User {
            id: format!("user-{}", inner.accounts.len() + 1),
            email: Some(email.to_string()),
            app_metadata: AppMetadata {
                role: role.map(str::to_string),
            },
        };
        inner.accounts.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                user: user.clone(),
            },
        );
        user
    }

    /// Start out signed in, as if a stored session had been restored.
    pub fn force_session(&self, id: &str, email: &str, role: Option<&str>) -> Session {
        let user = User {
            id: id.to_string(),
            email: Some(email.to_string()),
            app_metadata: AppMetadata {
                role: role.map(str::to_string),
            },
        };
        let session = Self::session_for(&user);
        self.lock().session = Some(session.clone());
        session
    }

    /// When set, sign-ups succeed without issuing a session.
    pub fn require_confirmation(&self, required: bool) {
        self.lock().confirm_sign_ups = required;
    }

    fn emit(&self, event: AuthEvent) {
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl AuthApi for MemoryAuth {
    async fn current_session(&self) -> Result<Option<Session>, BackendError> {
        let (session, first) = {
            let mut inner = self.lock();
            let first = !inner.initial_sent;
            inner.initial_sent = true;
            (inner.session.clone(), first)
        };
        if first {
            self.emit(AuthEvent::InitialSession(session.clone()));
        }
        Ok(session)
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, BackendError> {
        let session = {
            let mut inner = self.lock();
            let user = match inner.accounts.get(email) {
                Some(account) if account.password == password => account.user.clone(),
                _ => {
                    return Err(BackendError::Api {
                        status: 400,
                        message: "Invalid login credentials".into(),
                    })
                }
            };
            let session = Self::session_for(&user);
            inner.initial_sent = true;
            inner.session = Some(session.clone());
            session
        };
        self.emit(AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>, BackendError> {
        if self.lock().accounts.contains_key(email) {
            return Err(BackendError::Api {
                status: 422,
                message: "User already registered".into(),
            });
        }
        let user = self.add_account(email, password, None);
        let session = {
            let mut inner = self.lock();
            if inner.confirm_sign_ups {
                return Ok(None);
            }
            let session = Self::session_for(&user);
            inner.initial_sent = true;
            inner.session = Some(session.clone());
            session
        };
        self.emit(AuthEvent::SignedIn(session.clone()));
        Ok(Some(session))
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.lock().session = None;
        self.emit(AuthEvent::SignedOut);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}
