// Shared HTTP plumbing: base URL, anon key and the pooled reqwest client.

use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Where the hosted project lives and the public key that identifies it.
#[derive(Debug, Clone)]
pub struct Endpoint {
    base_url: String,
    anon_key: String,
    http: reqwest::Client,
}

impl Endpoint {
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Endpoint {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            http,
        }
    }

    pub fn anon_key(&self) -> &str {
        &self.anon_key
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// `{base}/auth/v1/{path}`
    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `{base}/rest/v1/{table}`
    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Attach `apikey` and a bearer token (the user's access token when
    /// signed in, the anon key otherwise).
    pub fn authorize(
        &self,
        request: reqwest::RequestBuilder,
        access_token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let bearer = access_token.unwrap_or(&self.anon_key);
        request
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {bearer}"))
    }
}
