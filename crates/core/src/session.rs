//! Persisted login session and bearer-token expiry.
//!
//! A [`Session`] is created from a [`LoginResponse`] and stored through a
//! [`TokenStore`]. Stores treat an expired session as absent and remove
//! it on the first read after expiry.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::LoginResponse;
use crate::roles::is_admin_role;
use crate::types::Timestamp;

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub token_type: String,
    /// `None` when the server did not say how long the token lives.
    pub expires_at: Option<Timestamp>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl Session {
    /// Build a session from a token grant received at `now`. A missing or
    /// zero `expires_in` means the token does not expire.
    pub fn from_login(response: &LoginResponse, now: Timestamp) -> Self {
        let expires_at = response
            .expires_in
            .filter(|&secs| secs > 0)
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(Duration::try_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl));

        Self {
            access_token: response.access_token.clone(),
            token_type: response.token_type.clone(),
            expires_at,
            email: None,
            role: None,
        }
    }

    /// Attach the identity resolved after login.
    pub fn with_identity(mut self, email: impl Into<String>, role: Option<String>) -> Self {
        self.email = Some(email.into());
        self.role = role;
        self
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|exp| now > exp)
    }

    pub fn is_admin(&self) -> bool {
        self.role.as_deref().is_some_and(is_admin_role)
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

/// Errors from reading or writing a persisted session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored session is unreadable: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Storage for the current session.
pub trait TokenStore: Send + Sync {
    fn read(&self) -> Result<Option<Session>, SessionError>;

    fn write(&self, session: &Session) -> Result<(), SessionError>;

    fn clear(&self) -> Result<(), SessionError>;

    /// The session valid at `now`, clearing it if it has expired.
    fn load_at(&self, now: Timestamp) -> Result<Option<Session>, SessionError> {
        match self.read()? {
            Some(session) if session.is_expired(now) => {
                tracing::debug!("Stored session expired, clearing");
                self.clear()?;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    fn load(&self) -> Result<Option<Session>, SessionError> {
        self.load_at(Utc::now())
    }
}

/// In-process store, used in tests and when no session file is wanted.
#[derive(Default)]
pub struct MemoryTokenStore {
    inner: Mutex<Option<Session>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            inner: Mutex::new(Some(session)),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<Session>> {
        // A poisoned lock still holds a consistent Option.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TokenStore for MemoryTokenStore {
    fn read(&self) -> Result<Option<Session>, SessionError> {
        Ok(self.slot().clone())
    }

    fn write(&self, session: &Session) -> Result<(), SessionError> {
        *self.slot() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.slot() = None;
        Ok(())
    }
}

/// JSON file store. A missing file means "not signed in".
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn read(&self) -> Result<Option<Session>, SessionError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
