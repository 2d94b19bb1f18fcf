// Durable token storage
// SQLite key/value table standing in for the browser's origin-scoped storage

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

use super::types::{Role, Session};

const KEY_ACCESS_TOKEN: &str = "access_token";
const KEY_REFRESH_TOKEN: &str = "refresh_token";
const KEY_USER_ROLE: &str = "user_role";
const KEY_USERNAME: &str = "username";

/// Session fields read back from storage at startup.
///
/// A restorable session requires the access token and role; the refresh
/// token and username may be missing (older writes stored fewer keys).
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub role: Role,
    pub username: Option<String>,
}

/// Persisted key/value holder for tokens and role.
///
/// Token contents are opaque strings; nothing here validates them. Writes
/// are effectively single-writer from the main flow, the mutex only guards
/// the non-Sync connection handle.
pub struct TokenStore {
    conn: Mutex<Connection>,
}

impl TokenStore {
    /// Open (or create) the session database at the given path.
    /// A failure here is fatal: without storage the auth state is unknowable.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open session database: {}", path.display()))?;
        Self::init(conn)
    }

    /// In-memory store for tests
    pub fn open_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().context("Failed to open in-memory session database")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS session_kv (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
            [],
        )
        .context("Failed to create session_kv table")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().expect("session store mutex poisoned");
        conn.query_row(
            "SELECT value FROM session_kv WHERE key = ?",
            [key],
            |row| row.get(0),
        )
        .optional()
        .with_context(|| format!("Failed to read '{}' from session store", key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().expect("session store mutex poisoned");
        conn.execute(
            "INSERT OR REPLACE INTO session_kv (key, value) VALUES (?, ?)",
            [key, value],
        )
        .with_context(|| format!("Failed to write '{}' to session store", key))?;
        Ok(())
    }

    /// Persist a complete session under the fixed keys
    pub fn save(&self, session: &Session) -> Result<()> {
        self.set(KEY_ACCESS_TOKEN, &session.access_token)?;
        self.set(KEY_REFRESH_TOKEN, &session.refresh_token)?;
        self.set(KEY_USER_ROLE, session.role.as_str())?;
        self.set(KEY_USERNAME, &session.username)?;
        Ok(())
    }

    /// Rotate the access token only; the refresh token stays unchanged
    pub fn save_access_token(&self, token: &str) -> Result<()> {
        self.set(KEY_ACCESS_TOKEN, token)
    }

    pub fn access_token(&self) -> Result<Option<String>> {
        self.get(KEY_ACCESS_TOKEN)
    }

    pub fn refresh_token(&self) -> Result<Option<String>> {
        self.get(KEY_REFRESH_TOKEN)
    }

    /// Load the persisted session, if one is restorable
    pub fn load(&self) -> Result<Option<PersistedSession>> {
        let access_token = match self.get(KEY_ACCESS_TOKEN)? {
            Some(token) => token,
            None => return Ok(None),
        };

        let role = match self.get(KEY_USER_ROLE)?.as_deref().and_then(Role::parse) {
            Some(role) => role,
            None => return Ok(None),
        };

        Ok(Some(PersistedSession {
            access_token,
            refresh_token: self.get(KEY_REFRESH_TOKEN)?,
            role,
            username: self.get(KEY_USERNAME)?,
        }))
    }

    /// Remove all session fields. Idempotent.
    pub fn clear(&self) -> Result<()> {
        let conn = self.conn.lock().expect("session store mutex poisoned");
        conn.execute("DELETE FROM session_kv", [])
            .context("Failed to clear session store")?;
        Ok(())
    }
}
