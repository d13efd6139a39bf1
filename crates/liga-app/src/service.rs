// League and team operations composed from the backend store.
//
// Each operation issues its writes in a fixed order and stops at the first
// failure, returning the backend's message unchanged. Writes already made are
// not rolled back.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use liga_backend::{AuthApi, BackendError, LeagueStore};
use liga_core::edit::{self, EditPlan, TeamDraft};
use liga_core::model::{Country, League, LeagueDetail, LeagueId, NewLeague, Team};
use liga_core::ranking::{self, Reorder};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("not authenticated")]
    NotAuthenticated,

    /// Input rejected before any request was made.
    #[error("{0}")]
    Invalid(String),
}

pub struct LeagueService {
    store: Arc<dyn LeagueStore>,
    auth: Arc<dyn AuthApi>,
}

impl LeagueService {
    pub fn new(store: Arc<dyn LeagueStore>, auth: Arc<dyn AuthApi>) -> Self {
        LeagueService { store, auth }
    }

    /// All leagues, oldest first. Filtering by country is left to the caller.
    pub async fn list_leagues(&self) -> Result<Vec<League>, ServiceError> {
        Ok(self.store.list_leagues().await?)
    }

    /// Create a league owned by the signed-in user together with its teams,
    /// positioned `1..=n` in the given order.
    ///
    /// If inserting the teams fails the league row stays behind without them.
    pub async fn create_league(
        &self,
        name: &str,
        country: Country,
        team_names: &[String],
    ) -> Result<(League, Vec<Team>), ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::Invalid("league name is required".into()));
        }
        let team_names: Vec<String> = team_names
            .iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        if team_names.is_empty() {
            return Err(ServiceError::Invalid("at least one team is required".into()));
        }
        let session = self
            .auth
            .current_session()
            .await?
            .ok_or(ServiceError::NotAuthenticated)?;

        let league = self
            .store
            .insert_league(&NewLeague {
                name: name.to_string(),
                country_code: country,
                created_by: session.user.id.clone(),
            })
            .await?;

        let rows = edit::initial_teams(&league.id, &team_names);
        let mut teams = self.store.insert_teams(&rows).await.map_err(|e| {
            warn!("League {} created without teams: {}", league.id, e);
            e
        })?;
        ranking::sort_by_position(&mut teams);
        info!(
            "Created league {} in {} with {} teams",
            league.name,
            country,
            teams.len()
        );
        Ok((league, teams))
    }

    /// Fetch a league and its teams concurrently. `None` when the league does
    /// not exist.
    pub async fn load_league_and_teams(
        &self,
        id: &LeagueId,
    ) -> Result<Option<LeagueDetail>, ServiceError> {
        let (league, teams) = tokio::join!(self.store.get_league(id), self.store.list_teams(id));
        let Some(league) = league? else {
            return Ok(None);
        };
        let mut teams = teams?;
        ranking::sort_by_position(&mut teams);
        Ok(Some(LeagueDetail { league, teams }))
    }

    /// Apply the edit dialog's result: rename, delete removed teams,
    /// close the gaps they leave, then append the new ones.
    ///
    /// Returns the league's teams in ranking order afterwards. Renamed
    /// existing teams keep their stored name.
    pub async fn save_league_edits(
        &self,
        league_id: &LeagueId,
        existing: &[Team],
        new_name: &str,
        submitted: &[TeamDraft],
    ) -> Result<Vec<Team>, ServiceError> {
        let name = new_name.trim();
        if name.is_empty() {
            return Err(ServiceError::Invalid("league name is required".into()));
        }
        let plan = EditPlan::compute(existing, submitted);

        self.store.rename_league(league_id, name).await?;

        if !plan.to_delete.is_empty() {
            self.store.delete_teams(&plan.to_delete).await?;
        }
        if plan.renumber_kept {
            self.store.write_positions(&plan.kept).await?;
        }

        let rows = plan.new_teams(league_id);
        let mut teams = plan.kept.clone();
        if !rows.is_empty() {
            teams.extend(self.store.insert_teams(&rows).await?);
        }
        ranking::sort_by_position(&mut teams);

        info!(
            "Saved league {}: {} removed, {} added, {} total",
            league_id,
            plan.to_delete.len(),
            plan.to_add.len(),
            teams.len()
        );
        Ok(teams)
    }

    /// Write the positions of a locally applied reorder in one batch.
    pub async fn persist_order(&self, reorder: &Reorder) -> Result<(), ServiceError> {
        self.store.write_positions(&reorder.next).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liga_backend::memory::{MemoryAuth, MemoryStore, StoreOp};

    struct Fixture {
        store: Arc<MemoryStore>,
        auth: Arc<MemoryAuth>,
        service: LeagueService,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let auth = Arc::new(MemoryAuth::new());
        auth.force_session("admin-1", "admin@example.com", Some("admin"));
        let service = LeagueService::new(store.clone(), auth.clone());
        Fixture {
            store,
            auth,
            service,
        }
    }

    fn names(teams: &[Team]) -> Vec<&str> {
        teams.iter().map(|t| t.name.as_str()).collect()
    }

    fn positions(teams: &[Team]) -> Vec<u32> {
        teams.iter().map(|t| t.position).collect()
    }

    async fn seeded(f: &Fixture, teams: &[&str]) -> League {
        let names: Vec<String> = teams.iter().map(|s| s.to_string()).collect();
        let (league, _) = f
            .service
            .create_league("Bundesliga", Country::De, &names)
            .await
            .unwrap();
        f.store.reset_calls();
        league
    }

    #[tokio::test]
    async fn create_inserts_league_then_positioned_teams() {
        let f = fixture();
        let (league, teams) = f
            .service
            .create_league(" Bundesliga ", Country::De, &["A".into(), "B".into()])
            .await
            .unwrap();
        assert_eq!(league.name, "Bundesliga");
        assert_eq!(league.created_by, "admin-1");
        assert_eq!(names(&teams), ["A", "B"]);
        assert_eq!(positions(&teams), [1, 2]);
        assert_eq!(f.store.calls(), [StoreOp::InsertLeague, StoreOp::InsertTeams]);
    }

    #[tokio::test]
    async fn create_without_teams_makes_no_request() {
        let f = fixture();
        let err = f
            .service
            .create_league("Bundesliga", Country::De, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Invalid(_)));
        assert!(f.store.calls().is_empty());
    }

    #[tokio::test]
    async fn create_requires_a_session() {
        let f = fixture();
        f.auth.sign_out().await.unwrap();
        let err = f
            .service
            .create_league("Bundesliga", Country::De, &["A".into()])
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotAuthenticated));
        assert!(f.store.calls().is_empty());
    }

    #[tokio::test]
    async fn failed_league_insert_skips_teams() {
        let f = fixture();
        f.store.fail_on(StoreOp::InsertLeague, "new row violates row-level security policy");
        let err = f
            .service
            .create_league("Bundesliga", Country::De, &["A".into()])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "new row violates row-level security policy");
        assert_eq!(f.store.calls(), [StoreOp::InsertLeague]);
    }

    #[tokio::test]
    async fn failed_team_insert_leaves_orphan_league() {
        let f = fixture();
        f.store.fail_on(StoreOp::InsertTeams, "boom");
        assert!(f
            .service
            .create_league("Bundesliga", Country::De, &["A".into()])
            .await
            .is_err());
        assert_eq!(f.store.leagues().len(), 1);
    }

    #[tokio::test]
    async fn load_missing_league_is_none() {
        let f = fixture();
        assert!(f
            .service
            .load_league_and_teams(&"nope".into())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn load_fetches_league_and_sorted_teams() {
        let f = fixture();
        let league = seeded(&f, &["A", "B", "C"]).await;
        let detail = f
            .service
            .load_league_and_teams(&league.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(detail.league.id, league.id);
        assert_eq!(names(&detail.teams), ["A", "B", "C"]);
        assert_eq!(f.store.count(StoreOp::GetLeague), 1);
        assert_eq!(f.store.count(StoreOp::ListTeams), 1);
    }

    #[tokio::test]
    async fn edit_removes_adds_and_keeps_positions_contiguous() {
        let f = fixture();
        let league = seeded(&f, &["A", "B", "C"]).await;
        let existing = f.store.teams_of(&league.id);

        // Drop B, keep A and C, add D.
        let submitted = vec![
            TeamDraft::existing(&existing[0]),
            TeamDraft::existing(&existing[2]),
            TeamDraft::new("D"),
        ];
        let teams = f
            .service
            .save_league_edits(&league.id, &existing, "Bundesliga 2", &submitted)
            .await
            .unwrap();
        assert_eq!(names(&teams), ["A", "C", "D"]);
        assert_eq!(positions(&teams), [1, 2, 3]);

        let stored = f.store.teams_of(&league.id);
        assert_eq!(names(&stored), ["A", "C", "D"]);
        assert_eq!(positions(&stored), [1, 2, 3]);
        assert_eq!(f.store.leagues()[0].name, "Bundesliga 2");
        assert_eq!(
            f.store.calls(),
            [
                StoreOp::RenameLeague,
                StoreOp::DeleteTeams,
                StoreOp::WritePositions,
                StoreOp::InsertTeams
            ]
        );
    }

    #[tokio::test]
    async fn edit_removing_last_team_needs_no_renumber() {
        let f = fixture();
        let league = seeded(&f, &["A", "B"]).await;
        let existing = f.store.teams_of(&league.id);
        let submitted = vec![TeamDraft::existing(&existing[0])];
        f.service
            .save_league_edits(&league.id, &existing, "Bundesliga", &submitted)
            .await
            .unwrap();
        assert_eq!(
            f.store.calls(),
            [StoreOp::RenameLeague, StoreOp::DeleteTeams]
        );
    }

    #[tokio::test]
    async fn edit_ignores_renamed_existing_team() {
        let f = fixture();
        let league = seeded(&f, &["A"]).await;
        let existing = f.store.teams_of(&league.id);
        let mut renamed = TeamDraft::existing(&existing[0]);
        renamed.name = "Renamed".into();
        let teams = f
            .service
            .save_league_edits(&league.id, &existing, "Bundesliga", &[renamed])
            .await
            .unwrap();
        assert_eq!(names(&teams), ["A"]);
    }

    #[tokio::test]
    async fn edit_stops_at_first_failure() {
        let f = fixture();
        let league = seeded(&f, &["A", "B"]).await;
        let existing = f.store.teams_of(&league.id);
        f.store.fail_on(StoreOp::DeleteTeams, "permission denied");
        let err = f
            .service
            .save_league_edits(&league.id, &existing, "Neu", &[TeamDraft::new("C")])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "permission denied");
        // The rename already happened and is not undone.
        assert_eq!(f.store.leagues()[0].name, "Neu");
        assert_eq!(f.store.count(StoreOp::InsertTeams), 0);
    }

    #[tokio::test]
    async fn persist_order_writes_one_batch() {
        let f = fixture();
        let league = seeded(&f, &["a", "b", "c"]).await;
        let teams = f.store.teams_of(&league.id);
        let reorder = ranking::reorder(&teams, 0, 2).unwrap();
        f.service.persist_order(&reorder).await.unwrap();

        let stored = f.store.teams_of(&league.id);
        assert_eq!(names(&stored), ["b", "c", "a"]);
        assert_eq!(positions(&stored), [1, 2, 3]);
        assert_eq!(f.store.calls(), [StoreOp::WritePositions]);
    }
}
