// `LeagueStore` over the REST data service.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use liga_core::model::{League, LeagueId, NewLeague, NewTeam, Team, TeamId};

use crate::api::{AuthApi, LeagueStore};
use crate::error::BackendError;
use crate::rest::{Query, RestClient};

const LEAGUES: &str = "leagues";
const TEAMS: &str = "teams";

pub const LEAGUE_COLUMNS: &str = "id,name,country_code,created_by,created_at";
pub const TEAM_COLUMNS: &str = "id,league_id,name,position,created_at";

/// Row written by the position upsert: only the key and the position. A team
/// deleted in the meantime hits the insert branch, fails the NOT NULL columns
/// and rejects the whole batch instead of coming back.
#[derive(Debug, Serialize)]
struct PositionRow<'a> {
    id: &'a TeamId,
    position: u32,
}

/// Requests are made with the signed-in user's token when there is one, so
/// row-level policies on the service see the right identity.
pub struct RestStore {
    rest: RestClient,
    auth: Arc<dyn AuthApi>,
}

impl RestStore {
    pub fn new(rest: RestClient, auth: Arc<dyn AuthApi>) -> Self {
        RestStore { rest, auth }
    }
}

#[async_trait]
impl LeagueStore for RestStore {
    async fn list_leagues(&self) -> Result<Vec<League>, BackendError> {
        let token = self.auth.access_token().await;
        let query = Query::new()
            .select(LEAGUE_COLUMNS)
            .order("created_at", true);
        self.rest.select(LEAGUES, &query, token.as_deref()).await
    }

    async fn get_league(&self, id: &LeagueId) -> Result<Option<League>, BackendError> {
        let token = self.auth.access_token().await;
        let query = Query::new().select(LEAGUE_COLUMNS).eq("id", &id.0);
        self.rest.select_single(LEAGUES, &query, token.as_deref()).await
    }

    async fn list_teams(&self, league_id: &LeagueId) -> Result<Vec<Team>, BackendError> {
        let token = self.auth.access_token().await;
        let query = Query::new()
            .select(TEAM_COLUMNS)
            .eq("league_id", &league_id.0)
            .order("position", true);
        self.rest.select(TEAMS, &query, token.as_deref()).await
    }

    async fn insert_league(&self, league: &NewLeague) -> Result<League, BackendError> {
        let token = self.auth.access_token().await;
        let rows: Vec<League> = self
            .rest
            .insert(LEAGUES, std::slice::from_ref(league), token.as_deref())
            .await?;
        let created = rows
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::Decode("insert returned no league row".into()))?;
        info!("Created league {} ({})", created.id, created.name);
        Ok(created)
    }

    async fn insert_teams(&self, teams: &[NewTeam]) -> Result<Vec<Team>, BackendError> {
        if teams.is_empty() {
            return Ok(Vec::new());
        }
        let token = self.auth.access_token().await;
        self.rest.insert(TEAMS, teams, token.as_deref()).await
    }

    async fn rename_league(&self, id: &LeagueId, name: &str) -> Result<(), BackendError> {
        let token = self.auth.access_token().await;
        let query = Query::new().eq("id", &id.0);
        self.rest
            .update(LEAGUES, &query, &json!({ "name": name }), token.as_deref())
            .await
    }

    async fn delete_teams(&self, ids: &[TeamId]) -> Result<(), BackendError> {
        if ids.is_empty() {
            return Ok(());
        }
        let token = self.auth.access_token().await;
        let query = Query::new().in_list("id", ids.iter().map(|id| id.0.as_str()));
        self.rest.delete(TEAMS, &query, token.as_deref()).await
    }

    async fn write_positions(&self, teams: &[Team]) -> Result<(), BackendError> {
        if teams.is_empty() {
            return Ok(());
        }
        let token = self.auth.access_token().await;
        let rows: Vec<PositionRow<'_>> = teams
            .iter()
            .map(|t| PositionRow {
                id: &t.id,
                position: t.position,
            })
            .collect();
        self.rest.upsert(TEAMS, "id", &rows, token.as_deref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Endpoint;
    use crate::memory::MemoryAuth;
    use crate::testing::{decoded_target, header, request_body, serve, MockResponse};
    use chrono::{TimeZone, Utc};
    use liga_core::model::Country;
    use serde_json::Value;

    fn store(url: &str, auth: MemoryAuth) -> RestStore {
        let endpoint = Endpoint::new(url, "anon");
        RestStore::new(RestClient::new(endpoint), Arc::new(auth))
    }

    fn team(id: &str, name: &str, position: u32) -> Team {
        Team {
            id: id.into(),
            league_id: "l1".into(),
            name: name.into(),
            position,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn list_leagues_orders_by_creation() {
        let body = r#"[{"id":"l1","name":"Bundesliga","country_code":"de","created_by":"u1","created_at":"2025-03-01T10:00:00.123456+00:00"}]"#;
        let (url, server) = serve(vec![MockResponse::json("200 OK", body)]).await;
        let leagues = store(&url, MemoryAuth::new()).list_leagues().await.unwrap();
        assert_eq!(leagues.len(), 1);
        assert_eq!(leagues[0].country_code, Country::De);

        let requests = server.await.unwrap();
        assert_eq!(
            decoded_target(&requests[0]),
            format!("GET /rest/v1/leagues?select={LEAGUE_COLUMNS}&order=created_at.asc")
        );
        // Anonymous reads use the anon key as bearer.
        assert_eq!(header(&requests[0], "authorization"), Some("Bearer anon"));
    }

    #[tokio::test]
    async fn missing_league_is_none() {
        let (url, _server) = serve(vec![MockResponse::json(
            "406 Not Acceptable",
            r#"{"code":"PGRST116","message":"JSON object requested, multiple (or no) rows returned"}"#,
        )])
        .await;
        let league = store(&url, MemoryAuth::new())
            .get_league(&"nope".into())
            .await
            .unwrap();
        assert!(league.is_none());
    }

    #[tokio::test]
    async fn writes_use_the_user_token() {
        let (url, server) = serve(vec![MockResponse::no_content()]).await;
        let auth = MemoryAuth::new();
        auth.force_session("u1", "admin@example.com", Some("admin"));
        store(&url, auth)
            .rename_league(&"l1".into(), "Premier")
            .await
            .unwrap();

        let requests = server.await.unwrap();
        assert_eq!(decoded_target(&requests[0]), "PATCH /rest/v1/leagues?id=eq.l1");
        assert_eq!(
            header(&requests[0], "authorization"),
            Some("Bearer memory-token-u1")
        );
        let body: Value = serde_json::from_str(request_body(&requests[0])).unwrap();
        assert_eq!(body["name"], "Premier");
    }

    #[tokio::test]
    async fn delete_teams_is_one_batch() {
        let (url, server) = serve(vec![MockResponse::no_content()]).await;
        store(&url, MemoryAuth::new())
            .delete_teams(&["t1".into(), "t2".into()])
            .await
            .unwrap();
        let requests = server.await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            decoded_target(&requests[0]),
            r#"DELETE /rest/v1/teams?id=in.("t1","t2")"#
        );
    }

    #[tokio::test]
    async fn write_positions_sends_only_id_and_position() {
        let (url, server) = serve(vec![MockResponse::no_content()]).await;
        let teams = vec![team("t2", "B", 1), team("t1", "A", 2)];
        store(&url, MemoryAuth::new())
            .write_positions(&teams)
            .await
            .unwrap();

        let requests = server.await.unwrap();
        assert_eq!(
            decoded_target(&requests[0]),
            "POST /rest/v1/teams?on_conflict=id"
        );
        let body: Value = serde_json::from_str(request_body(&requests[0])).unwrap();
        assert_eq!(
            body,
            serde_json::json!([
                {"id": "t2", "position": 1},
                {"id": "t1", "position": 2},
            ])
        );
    }

    #[tokio::test]
    async fn empty_batches_issue_no_request() {
        // Nothing listens on this port; any request would fail.
        let store = store("http://127.0.0.1:9", MemoryAuth::new());
        store.write_positions(&[]).await.unwrap();
        store.delete_teams(&[]).await.unwrap();
        assert!(store.insert_teams(&[]).await.unwrap().is_empty());
    }
}
