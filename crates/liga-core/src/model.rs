// Domain records shared by the backend clients, the app layer and the TUI.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Backend-assigned league identifier (a UUID string on the hosted service).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeagueId(pub String);

/// Backend-assigned team identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub String);

impl fmt::Display for LeagueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LeagueId {
    fn from(s: &str) -> Self {
        LeagueId(s.to_string())
    }
}

impl From<&str> for TeamId {
    fn from(s: &str) -> Self {
        TeamId(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Country
// ---------------------------------------------------------------------------

/// The fixed set of countries a league can belong to. Serialized as the
/// lowercase ISO code stored in the `country_code` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Country {
    De,
    At,
    Ch,
}

impl Country {
    /// Tab order on the home screen.
    pub const ALL: [Country; 3] = [Country::De, Country::At, Country::Ch];

    pub fn code(self) -> &'static str {
        match self {
            Country::De => "de",
            Country::At => "at",
            Country::Ch => "ch",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_lowercase().as_str() {
            "de" => Some(Country::De),
            "at" => Some(Country::At),
            "ch" => Some(Country::Ch),
            _ => None,
        }
    }

    /// Translation key for the display name (`country.de`, ...).
    pub fn label_key(self) -> &'static str {
        match self {
            Country::De => "country.de",
            Country::At => "country.at",
            Country::Ch => "country.ch",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// A row of the `leagues` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct League {
    pub id: LeagueId,
    pub name: String,
    pub country_code: Country,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// A row of the `teams` collection. `position` is the 1-based rank within
/// the owning league.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub league_id: LeagueId,
    pub name: String,
    pub position: u32,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a league; id and timestamp are assigned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewLeague {
    pub name: String,
    pub country_code: Country,
    pub created_by: String,
}

/// Insert payload for a team.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTeam {
    pub league_id: LeagueId,
    pub name: String,
    pub position: u32,
}

/// A league together with its teams in ranking order.
#[derive(Debug, Clone, PartialEq)]
pub struct LeagueDetail {
    pub league: League,
    pub teams: Vec<Team>,
}

/// Keep only the leagues of one country, preserving order.
pub fn filter_by_country(leagues: &[League], country: Country) -> Vec<League> {
    leagues
        .iter()
        .filter(|l| l.country_code == country)
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Role claim value that marks an administrator.
pub const ADMIN_ROLE: &str = "admin";

/// Claims the auth service stores on the user under `app_metadata`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppMetadata {
    #[serde(default)]
    pub role: Option<String>,
}

/// The authenticated identity as returned by the auth service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub app_metadata: AppMetadata,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.app_metadata.role.as_deref() == Some(ADMIN_ROLE)
    }
}

/// Tokens plus identity for a signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp (seconds) after which `access_token` is rejected.
    pub expires_at: i64,
    pub user: User,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.expires_at
    }
}

/// What the rest of the application sees of the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub user: Option<User>,
    pub is_admin: bool,
    /// True until the first session fetch has completed.
    pub loading: bool,
}

impl SessionState {
    pub fn loading() -> Self {
        SessionState {
            user: None,
            is_admin: false,
            loading: true,
        }
    }

    pub fn from_session(session: Option<&Session>) -> Self {
        let user = session.map(|s| s.user.clone());
        let is_admin = user.as_ref().is_some_and(User::is_admin);
        SessionState {
            user,
            is_admin,
            loading: false,
        }
    }

    pub fn email(&self) -> Option<&str> {
        self.user.as_ref().and_then(|u| u.email.as_deref())
    }
}
