// Diffing the team list submitted from the edit dialog against the stored one.

use std::collections::HashSet;

use crate::model::{LeagueId, NewTeam, Team, TeamId};
use crate::ranking;

/// One entry of a dialog's team list. `id` is `None` for teams added in the
/// dialog that do not exist on the backend yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamDraft {
    pub id: Option<TeamId>,
    pub name: String,
}

impl TeamDraft {
    pub fn new(name: impl Into<String>) -> Self {
        TeamDraft {
            id: None,
            name: name.into(),
        }
    }

    pub fn existing(team: &Team) -> Self {
        TeamDraft {
            id: Some(team.id.clone()),
            name: team.name.clone(),
        }
    }
}

/// The writes needed to turn the stored team list into the submitted one.
#[derive(Debug, Clone, PartialEq)]
pub struct EditPlan {
    /// Stored teams missing from the submission.
    pub to_delete: Vec<TeamId>,
    /// Stored teams that survive, in their stored order, renumbered `1..=k`.
    pub kept: Vec<Team>,
    /// Whether any kept team's position differs from the stored one.
    pub renumber_kept: bool,
    /// Names of submitted entries without an id, in submission order.
    pub to_add: Vec<String>,
}

impl EditPlan {
    /// Compute the plan. Renamed existing entries are matched by id only, so
    /// a changed name on a kept team is not part of the plan.
    pub fn compute(existing: &[Team], submitted: &[TeamDraft]) -> Self {
        let existing_ids: HashSet<&TeamId> = existing.iter().map(|t| &t.id).collect();
        let kept_ids: HashSet<&TeamId> = submitted
            .iter()
            .filter_map(|d| d.id.as_ref())
            .filter(|id| existing_ids.contains(id))
            .collect();

        let to_delete = existing
            .iter()
            .filter(|t| !kept_ids.contains(&t.id))
            .map(|t| t.id.clone())
            .collect();

        let mut kept: Vec<Team> = existing
            .iter()
            .filter(|t| kept_ids.contains(&t.id))
            .cloned()
            .collect();
        ranking::sort_by_position(&mut kept);
        let renumber_kept = !ranking::is_contiguous(&kept);
        ranking::renumber(&mut kept);

        let to_add = submitted
            .iter()
            .filter(|d| !matches!(&d.id, Some(id) if existing_ids.contains(id)))
            .map(|d| d.name.clone())
            .collect();

        EditPlan {
            to_delete,
            kept,
            renumber_kept,
            to_add,
        }
    }

    /// Insert payloads for the added teams, positioned after the kept ones.
    pub fn new_teams(&self, league_id: &LeagueId) -> Vec<NewTeam> {
        let first = self.kept.len() as u32 + 1;
        self.to_add
            .iter()
            .enumerate()
            .map(|(i, name)| NewTeam {
                league_id: league_id.clone(),
                name: name.clone(),
                position: first + i as u32,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.to_delete.is_empty() && !self.renumber_kept && self.to_add.is_empty()
    }
}

/// Insert payloads for a freshly created league: positions `1..=n` in the
/// submitted order.
pub fn initial_teams(league_id: &LeagueId, names: &[String]) -> Vec<NewTeam> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| NewTeam {
            league_id: league_id.clone(),
            name: name.clone(),
            position: i as u32 + 1,
        })
        .collect()
}
