// Process-wide session state.
//
// Created once at startup with `SessionStore::start` and torn down with
// `shutdown`. Between the two, a listener task follows the auth client's
// identity events and publishes a fresh `SessionState` for each one.

use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use liga_backend::{AuthApi, AuthEvent};
use liga_core::model::SessionState;

pub struct SessionStore {
    state: watch::Receiver<SessionState>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl SessionStore {
    /// Begin tracking the session. The store starts out `loading`; the first
    /// fetch runs on the listener task and clears the flag whether or not it
    /// succeeds.
    pub fn start(auth: Arc<dyn AuthApi>) -> Arc<Self> {
        let (tx, rx) = watch::channel(SessionState::loading());
        // Subscribe before fetching so no event between the two is missed.
        let events = auth.subscribe();
        let handle = tokio::spawn(listen(auth, events, tx));
        Arc::new(SessionStore {
            state: rx,
            listener: Mutex::new(Some(handle)),
        })
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// Stop following identity events. Later snapshots keep the last state.
    pub fn shutdown(&self) {
        let handle = self.listener.lock().ok().and_then(|mut h| h.take());
        if let Some(handle) = handle {
            handle.abort();
            info!("Session listener stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.listener
            .lock()
            .map(|h| h.as_ref().is_some_and(|h| !h.is_finished()))
            .unwrap_or(false)
    }
}

async fn listen(
    auth: Arc<dyn AuthApi>,
    mut events: broadcast::Receiver<AuthEvent>,
    tx: watch::Sender<SessionState>,
) {
    let initial = match auth.current_session().await {
        Ok(session) => session,
        Err(e) => {
            warn!("Initial session fetch failed: {}", e);
            None
        }
    };
    info!("Session ready (signed in: {})", initial.is_some());
    tx.send_replace(SessionState::from_session(initial.as_ref()));

    loop {
        match events.recv().await {
            Ok(event) => {
                debug!("Auth event: {}", event_name(&event));
                tx.send_replace(SessionState::from_session(event.session()));
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!("Session listener lagged by {} events", n);
            }
            Err(broadcast::error::RecvError::Closed) => {
                info!("Auth event channel closed");
                break;
            }
        }
    }
}

fn event_name(event: &AuthEvent) -> &'static str {
    match event {
        AuthEvent::InitialSession(_) => "InitialSession",
        AuthEvent::SignedIn(_) => "SignedIn",
        AuthEvent::SignedOut => "SignedOut",
        AuthEvent::TokenRefreshed(_) => "TokenRefreshed",
    }
}
