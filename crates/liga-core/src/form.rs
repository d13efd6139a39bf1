// Input state of the create/edit league dialogs.

use crate::edit::TeamDraft;
use crate::model::{League, Team};

/// Name plus a growing list of team entries, with the validation that gates
/// the submit action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeagueForm {
    pub name: String,
    /// Text of the "new team" input field.
    pub team_input: String,
    pub teams: Vec<TeamDraft>,
    /// A save request is in flight.
    pub saving: bool,
    /// Last backend error, shown verbatim under the dialog.
    pub error: Option<String>,
}

impl LeagueForm {
    /// Empty form for creating a league.
    pub fn for_create() -> Self {
        LeagueForm::default()
    }

    /// Form pre-filled with a stored league and its teams.
    pub fn for_edit(league: &League, teams: &[Team]) -> Self {
        LeagueForm {
            name: league.name.clone(),
            teams: teams.iter().map(TeamDraft::existing).collect(),
            ..LeagueForm::default()
        }
    }

    /// The trimmed input can be added: non-empty and not already listed.
    pub fn can_add_team(&self) -> bool {
        let name = self.team_input.trim();
        !name.is_empty() && !self.contains_team(name)
    }

    /// Append the input as a new entry and clear the field. Empty input and
    /// exact duplicates are ignored (the field keeps its text).
    pub fn add_team(&mut self) -> bool {
        if !self.can_add_team() {
            return false;
        }
        let name = self.team_input.trim().to_string();
        self.teams.push(TeamDraft::new(name));
        self.team_input.clear();
        true
    }

    pub fn remove_team(&mut self, index: usize) -> Option<TeamDraft> {
        (index < self.teams.len()).then(|| self.teams.remove(index))
    }

    pub fn contains_team(&self, name: &str) -> bool {
        self.teams.iter().any(|t| t.name == name)
    }

    /// Submit is enabled only with a name, at least one team, and no save in
    /// flight.
    pub fn can_submit(&self) -> bool {
        !self.name.trim().is_empty() && !self.teams.is_empty() && !self.saving
    }

    pub fn trimmed_name(&self) -> String {
        self.name.trim().to_string()
    }

    pub fn team_names(&self) -> Vec<String> {
        self.teams.iter().map(|t| t.name.clone()).collect()
    }

    pub fn begin_save(&mut self) {
        self.saving = true;
        self.error = None;
    }

    pub fn fail_save(&mut self, message: String) {
        self.saving = false;
        self.error = Some(message);
    }
}

/// Email/password form of the login screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub error: Option<String>,
    /// Informational message (e.g. sign-up confirmation).
    pub message: Option<String>,
    pub loading: bool,
}

impl LoginForm {
    pub fn can_submit(&self) -> bool {
        !self.loading && !self.email.trim().is_empty() && !self.password.is_empty()
    }

    pub fn begin(&mut self) {
        self.loading = true;
        self.error = None;
        self.message = None;
    }
}
