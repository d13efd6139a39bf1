// Thin client for the REST data service (`/rest/v1`).

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{check, BackendError};
use crate::http::Endpoint;

/// Media type asking the service for a single object instead of an array.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

// ---------------------------------------------------------------------------
// Query builder
// ---------------------------------------------------------------------------

/// Query-string parameters in the service's filter syntax.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    params: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Query::default()
    }

    /// Columns to return (`select=a,b,c`).
    pub fn select(mut self, columns: &str) -> Self {
        self.params.push(("select".into(), columns.into()));
        self
    }

    /// `column=eq.value`
    pub fn eq(mut self, column: &str, value: impl AsRef<str>) -> Self {
        self.params
            .push((column.into(), format!("eq.{}", value.as_ref())));
        self
    }

    /// `column=in.("a","b")`; values are double-quoted so commas and
    /// parentheses inside them are not parsed as syntax.
    pub fn in_list<I, S>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let quoted: Vec<String> = values
            .into_iter()
            .map(|v| format!("\"{}\"", v.as_ref().replace('\\', "\\\\").replace('"', "\\\"")))
            .collect();
        self.params
            .push((column.into(), format!("in.({})", quoted.join(","))));
        self
    }

    /// `order=column.asc` or `order=column.desc`.
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let dir = if ascending { "asc" } else { "desc" };
        self.params.push(("order".into(), format!("{column}.{dir}")));
        self
    }

    /// `on_conflict=column` for upserts.
    pub fn on_conflict(mut self, column: &str) -> Self {
        self.params.push(("on_conflict".into(), column.into()));
        self
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// True when the query narrows the affected rows. Updates and deletes
    /// without a filter are refused.
    pub fn has_filter(&self) -> bool {
        self.params
            .iter()
            .any(|(k, _)| !matches!(k.as_str(), "select" | "order" | "on_conflict"))
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RestClient {
    endpoint: Endpoint,
}

impl RestClient {
    pub fn new(endpoint: Endpoint) -> Self {
        RestClient { endpoint }
    }

    fn request(
        &self,
        method: reqwest::Method,
        table: &str,
        query: &Query,
        token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let request = self
            .endpoint
            .http()
            .request(method, self.endpoint.rest_url(table))
            .query(query.params());
        self.endpoint.authorize(request, token)
    }

    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
        token: Option<&str>,
    ) -> Result<Vec<T>, BackendError> {
        debug!("GET {table} {:?}", query.params());
        let response = self
            .request(reqwest::Method::GET, table, query, token)
            .send()
            .await?;
        decode(check(response).await?).await
    }

    /// Select exactly one row. The service answers 406 when no row (or more
    /// than one) matches; that is reported as `None`.
    pub async fn select_single<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
        token: Option<&str>,
    ) -> Result<Option<T>, BackendError> {
        debug!("GET single {table} {:?}", query.params());
        let response = self
            .request(reqwest::Method::GET, table, query, token)
            .header(reqwest::header::ACCEPT, SINGLE_OBJECT)
            .send()
            .await?;
        match check(response).await {
            Ok(response) => decode(response).await.map(Some),
            Err(BackendError::Api { status: 406, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Insert one or many rows and return them as stored.
    pub async fn insert<B, T>(
        &self,
        table: &str,
        rows: &B,
        token: Option<&str>,
    ) -> Result<Vec<T>, BackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("POST {table}");
        let response = self
            .request(reqwest::Method::POST, table, &Query::new().select("*"), token)
            .header("Prefer", "return=representation")
            .json(rows)
            .send()
            .await?;
        decode(check(response).await?).await
    }

    pub async fn update<B: Serialize + ?Sized>(
        &self,
        table: &str,
        query: &Query,
        patch: &B,
        token: Option<&str>,
    ) -> Result<(), BackendError> {
        require_filter(query)?;
        debug!("PATCH {table} {:?}", query.params());
        let response = self
            .request(reqwest::Method::PATCH, table, query, token)
            .header("Prefer", "return=minimal")
            .json(patch)
            .send()
            .await?;
        check(response).await.map(|_| ())
    }

    pub async fn delete(
        &self,
        table: &str,
        query: &Query,
        token: Option<&str>,
    ) -> Result<(), BackendError> {
        require_filter(query)?;
        debug!("DELETE {table} {:?}", query.params());
        let response = self
            .request(reqwest::Method::DELETE, table, query, token)
            .header("Prefer", "return=minimal")
            .send()
            .await?;
        check(response).await.map(|_| ())
    }

    /// Insert-or-merge all `rows` in a single statement, matching existing
    /// rows on `conflict_column`. The service applies the batch atomically.
    pub async fn upsert<B: Serialize + ?Sized>(
        &self,
        table: &str,
        conflict_column: &str,
        rows: &B,
        token: Option<&str>,
    ) -> Result<(), BackendError> {
        debug!("UPSERT {table} on {conflict_column}");
        let query = Query::new().on_conflict(conflict_column);
        let response = self
            .request(reqwest::Method::POST, table, &query, token)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(rows)
            .send()
            .await?;
        check(response).await.map(|_| ())
    }
}

fn require_filter(query: &Query) -> Result<(), BackendError> {
    if query.has_filter() {
        Ok(())
    } else {
        Err(BackendError::InvalidRequest(
            "refusing to write without a row filter".into(),
        ))
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{decoded_target, header, request_body, serve, MockResponse};
    use serde_json::{json, Value};

    #[test]
    fn query_params_use_filter_syntax() {
        let q = Query::new()
            .select("*")
            .eq("league_id", "l1")
            .order("position", true);
        assert_eq!(
            q.params(),
            &[
                ("select".to_string(), "*".to_string()),
                ("league_id".to_string(), "eq.l1".to_string()),
                ("order".to_string(), "position.asc".to_string()),
            ]
        );
        assert!(q.has_filter());
        assert!(!Query::new().select("*").order("x", false).has_filter());
    }

    #[test]
    fn in_list_quotes_values() {
        let q = Query::new().in_list("id", ["a", "b,c", "say \"hi\""]);
        assert_eq!(q.params()[0].1, r#"in.("a","b,c","say \"hi\"")"#);
    }

    #[tokio::test]
    async fn select_sends_filters_and_keys() {
        let (url, server) = serve(vec![MockResponse::json("200 OK", r#"[{"id":1},{"id":2}]"#)]).await;
        let client = RestClient::new(Endpoint::new(&url, "anon"));
        let rows: Vec<Value> = client
            .select("teams", &Query::new().select("*").eq("league_id", "l1"), Some("tok"))
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);

        let requests = server.await.unwrap();
        assert_eq!(
            decoded_target(&requests[0]),
            "GET /rest/v1/teams?select=*&league_id=eq.l1"
        );
        assert_eq!(header(&requests[0], "apikey"), Some("anon"));
        assert_eq!(header(&requests[0], "authorization"), Some("Bearer tok"));
    }

    #[tokio::test]
    async fn select_single_maps_406_to_none() {
        let (url, server) = serve(vec![MockResponse::json(
            "406 Not Acceptable",
            r#"{"code":"PGRST116","details":"The result contains 0 rows","hint":null,"message":"JSON object requested, multiple (or no) rows returned"}"#,
        )])
        .await;
        let client = RestClient::new(Endpoint::new(&url, "anon"));
        let row: Option<Value> = client
            .select_single("leagues", &Query::new().select("*").eq("id", "missing"), None)
            .await
            .unwrap();
        assert!(row.is_none());

        let requests = server.await.unwrap();
        assert_eq!(header(&requests[0], "accept"), Some(SINGLE_OBJECT));
        assert_eq!(header(&requests[0], "authorization"), Some("Bearer anon"));
    }

    #[tokio::test]
    async fn insert_asks_for_representation() {
        let (url, server) = serve(vec![MockResponse::json(
            "201 Created",
            r#"[{"id":"l1","name":"Bundesliga"}]"#,
        )])
        .await;
        let client = RestClient::new(Endpoint::new(&url, "anon"));
        let rows: Vec<Value> = client
            .insert("leagues", &json!({"name": "Bundesliga"}), Some("tok"))
            .await
            .unwrap();
        assert_eq!(rows[0]["id"], "l1");

        let requests = server.await.unwrap();
        assert!(decoded_target(&requests[0]).starts_with("POST /rest/v1/leagues"));
        assert_eq!(header(&requests[0], "prefer"), Some("return=representation"));
    }

    #[tokio::test]
    async fn write_errors_carry_service_message() {
        let (url, _server) = serve(vec![MockResponse::json(
            "403 Forbidden",
            r#"{"code":"42501","message":"permission denied for table teams"}"#,
        )])
        .await;
        let client = RestClient::new(Endpoint::new(&url, "anon"));
        let err = client
            .upsert("teams", "id", &json!([{"id": "t1", "position": 1}]), None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "permission denied for table teams");
        assert_eq!(err.status(), Some(403));
    }

    #[tokio::test]
    async fn upsert_merges_on_conflict_column() {
        let (url, server) = serve(vec![MockResponse::no_content()]).await;
        let client = RestClient::new(Endpoint::new(&url, "anon"));
        client
            .upsert("teams", "id", &json!([{"id": "t1", "position": 2}]), Some("tok"))
            .await
            .unwrap();

        let requests = server.await.unwrap();
        assert_eq!(
            decoded_target(&requests[0]),
            "POST /rest/v1/teams?on_conflict=id"
        );
        assert_eq!(
            header(&requests[0], "prefer"),
            Some("resolution=merge-duplicates,return=minimal")
        );
        let body: Value = serde_json::from_str(request_body(&requests[0])).unwrap();
        assert_eq!(body[0]["position"], 2);
    }

    #[tokio::test]
    async fn unfiltered_delete_is_refused_locally() {
        let client = RestClient::new(Endpoint::new("http://127.0.0.1:9", "anon"));
        let err = client
            .delete("teams", &Query::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::InvalidRequest(_)));
    }
}
