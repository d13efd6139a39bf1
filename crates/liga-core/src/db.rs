// SQLite persistence for client-side state: the auth session and UI choices.

use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;

use crate::model::{Country, Session};

const SESSION_KEY: &str = "auth.session";
const COUNTRY_KEY: &str = "ui.country";

/// Key-value store backed by a single SQLite table.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure the schema
    /// exists. Pass `":memory:"` for an ephemeral in-memory database.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS client_state (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Panics if the mutex is poisoned, which only happens after another
    /// thread panicked while holding it.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    pub fn save_state(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let text = serde_json::to_string(value).context("failed to serialize state value")?;
        self.conn()
            .execute(
                "INSERT INTO client_state (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![key, text],
            )
            .with_context(|| format!("failed to save state `{key}`"))?;
        Ok(())
    }

    pub fn load_state(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let text: Option<String> = self
            .conn()
            .query_row(
                "SELECT value FROM client_state WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("failed to load state `{key}`"))?;

        match text {
            Some(t) => {
                let value = serde_json::from_str(&t)
                    .with_context(|| format!("corrupt state value for `{key}`"))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub fn clear_state(&self, key: &str) -> Result<()> {
        self.conn()
            .execute("DELETE FROM client_state WHERE key = ?1", params![key])
            .with_context(|| format!("failed to clear state `{key}`"))?;
        Ok(())
    }

    // -- Typed accessors --

    pub fn save_session(&self, session: &Session) -> Result<()> {
        let value = serde_json::to_value(session).context("failed to serialize session")?;
        self.save_state(SESSION_KEY, &value)
    }

    /// The stored session, or `None` when absent. A stored value that no
    /// longer parses is treated as absent.
    pub fn load_session(&self) -> Result<Option<Session>> {
        let Some(value) = self.load_state(SESSION_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_value(value) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!("Ignoring unreadable stored session: {}", e);
                Ok(None)
            }
        }
    }

    pub fn clear_session(&self) -> Result<()> {
        self.clear_state(SESSION_KEY)
    }

    pub fn save_country(&self, country: Country) -> Result<()> {
        self.save_state(COUNTRY_KEY, &serde_json::Value::from(country.code()))
    }

    pub fn load_country(&self) -> Result<Option<Country>> {
        Ok(self
            .load_state(COUNTRY_KEY)?
            .and_then(|v| v.as_str().and_then(Country::from_code)))
    }
}
