// Client for the hosted auth service (`/auth/v1`).
//
// Holds the current session in memory, mirrors it to the local database so a
// restart resumes it, and broadcasts every identity change to subscribers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use liga_core::db::Database;
use liga_core::model::{Session, User};

use crate::api::{AuthApi, AuthEvent};
use crate::error::{check, BackendError};
use crate::http::Endpoint;

const EVENT_CAPACITY: usize = 16;
/// Assumed lifetime when the service omits both `expires_at` and `expires_in`.
const DEFAULT_EXPIRES_IN: i64 = 3600;

/// Successful token grant as returned by `/token` and (auto-confirm) `/signup`.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: User,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        let expires_at = self.expires_at.unwrap_or_else(|| {
            Utc::now().timestamp() + self.expires_in.unwrap_or(DEFAULT_EXPIRES_IN)
        });
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

pub struct AuthClient {
    endpoint: Endpoint,
    session: Mutex<Option<Session>>,
    storage: Option<Arc<Database>>,
    events: broadcast::Sender<AuthEvent>,
    restored: AtomicBool,
}

impl AuthClient {
    /// `storage`, when given, receives the session on every change and is
    /// read once to restore a previous session.
    pub fn new(endpoint: Endpoint, storage: Option<Arc<Database>>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        AuthClient {
            endpoint,
            session: Mutex::new(None),
            storage,
            events,
            restored: AtomicBool::new(false),
        }
    }

    fn cached(&self) -> Option<Session> {
        self.session.lock().ok().and_then(|s| s.clone())
    }

    fn set_session(&self, session: Option<Session>) {
        if let Ok(mut guard) = self.session.lock() {
            *guard = session.clone();
        }
        let Some(db) = &self.storage else {
            return;
        };
        let result = match &session {
            Some(s) => db.save_session(s),
            None => db.clear_session(),
        };
        if let Err(e) = result {
            warn!("Failed to persist session: {:#}", e);
        }
    }

    fn emit(&self, event: AuthEvent) {
        // No receivers is fine; the event is simply dropped.
        let _ = self.events.send(event);
    }

    /// Restore the stored session the first time it is asked for.
    fn restore_once(&self) -> Option<Session> {
        if self.restored.swap(true, Ordering::SeqCst) {
            return None;
        }
        let db = self.storage.as_ref()?;
        match db.load_session() {
            Ok(Some(session)) => {
                info!("Restored stored session for {}", session.user.id);
                if let Ok(mut guard) = self.session.lock() {
                    *guard = Some(session.clone());
                }
                Some(session)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Failed to read stored session: {:#}", e);
                None
            }
        }
    }

    async fn grant(&self, grant_type: &str, body: Value) -> Result<Session, BackendError> {
        let request = self
            .endpoint
            .http()
            .post(self.endpoint.auth_url("token"))
            .query(&[("grant_type", grant_type)])
            .json(&body);
        let response = self.endpoint.authorize(request, None).send().await?;
        let response = check(response).await?;
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(token.into_session())
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session, BackendError> {
        debug!("Refreshing access token");
        self.grant("refresh_token", json!({ "refresh_token": refresh_token }))
            .await
    }
}

#[async_trait]
impl AuthApi for AuthClient {
    async fn current_session(&self) -> Result<Option<Session>, BackendError> {
        let first_call = !self.restored.load(Ordering::SeqCst);
        let restored = self.restore_once();
        let Some(session) = self.cached().or(restored) else {
            if first_call {
                self.emit(AuthEvent::InitialSession(None));
            }
            return Ok(None);
        };

        if !session.is_expired_at(Utc::now()) {
            if first_call {
                self.emit(AuthEvent::InitialSession(Some(session.clone())));
            }
            return Ok(Some(session));
        }

        match self.refresh(&session.refresh_token).await {
            Ok(fresh) => {
                self.set_session(Some(fresh.clone()));
                self.emit(AuthEvent::TokenRefreshed(fresh.clone()));
                Ok(Some(fresh))
            }
            Err(BackendError::Api { status, message }) => {
                // The refresh token was rejected: the stored session is dead.
                warn!("Session refresh rejected ({status}): {message}");
                self.set_session(None);
                self.emit(AuthEvent::SignedOut);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, BackendError> {
        let session = self
            .grant("password", json!({ "email": email, "password": password }))
            .await?;
        info!("Signed in as {}", session.user.id);
        self.restored.store(true, Ordering::SeqCst);
        self.set_session(Some(session.clone()));
        self.emit(AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Option<Session>, BackendError> {
        let request = self
            .endpoint
            .http()
            .post(self.endpoint.auth_url("signup"))
            .json(&json!({ "email": email, "password": password }));
        let response = self.endpoint.authorize(request, None).send().await?;
        let response = check(response).await?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        // Projects without email confirmation answer with a full token grant;
        // otherwise only the pending user comes back.
        if body.get("access_token").is_none() {
            info!("Sign-up accepted, awaiting email confirmation");
            return Ok(None);
        }
        let token: TokenResponse =
            serde_json::from_value(body).map_err(|e| BackendError::Decode(e.to_string()))?;
        let session = token.into_session();
        self.restored.store(true, Ordering::SeqCst);
        self.set_session(Some(session.clone()));
        self.emit(AuthEvent::SignedIn(session.clone()));
        Ok(Some(session))
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        let Some(session) = self.cached() else {
            self.set_session(None);
            self.emit(AuthEvent::SignedOut);
            return Ok(());
        };

        let request = self.endpoint.http().post(self.endpoint.auth_url("logout"));
        let result = match self
            .endpoint
            .authorize(request, Some(&session.access_token))
            .send()
            .await
        {
            Ok(response) => check(response).await.map(|_| ()),
            Err(e) => Err(e.into()),
        };

        // The local session ends regardless; a token the service no longer
        // knows is already signed out.
        self.set_session(None);
        self.emit(AuthEvent::SignedOut);
        info!("Signed out");

        match result {
            Err(e) if matches!(e.status(), Some(401 | 403 | 404)) => Ok(()),
            other => other,
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}
