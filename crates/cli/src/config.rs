use std::path::PathBuf;
use std::time::Duration;

/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for a local backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// REST API base URL (default: `http://localhost:8000`).
    pub api_url: String,
    /// WebSocket base of the REST API, for notifications
    /// (default: `ws://127.0.0.1:8000`).
    pub api_ws_url: String,
    /// Stream server base URL, for camera control
    /// (default: `http://localhost:8010`).
    pub stream_url: String,
    /// WebSocket base of the stream server (default: `ws://127.0.0.1:8010`).
    pub stream_ws_url: String,
    /// Where the login session is persisted.
    pub session_file: PathBuf,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl ClientConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                         | Default                               |
    /// |---------------------------------|---------------------------------------|
    /// | `SENTINEL_API_URL`              | `http://localhost:8000`               |
    /// | `SENTINEL_API_WS_URL`           | `ws://127.0.0.1:8000`                 |
    /// | `SENTINEL_STREAM_URL`           | `http://localhost:8010`               |
    /// | `SENTINEL_STREAM_WS_URL`        | `ws://127.0.0.1:8010`                 |
    /// | `SENTINEL_SESSION_FILE`         | `$HOME/.config/sentinel/session.json` |
    /// | `SENTINEL_REQUEST_TIMEOUT_SECS` | `30`                                  |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let session_file = match lookup("SENTINEL_SESSION_FILE").filter(|v| !v.is_empty()) {
            Some(path) => PathBuf::from(path),
            None => default_session_file(lookup("HOME")),
        };

        let raw_timeout = var("SENTINEL_REQUEST_TIMEOUT_SECS", "30");
        let request_timeout_secs: u64 = raw_timeout.trim().parse().map_err(|_| ConfigError::Invalid {
            var: "SENTINEL_REQUEST_TIMEOUT_SECS",
            expected: "a whole number of seconds",
            value: raw_timeout.clone(),
        })?;

        Ok(Self {
            api_url: var("SENTINEL_API_URL", "http://localhost:8000"),
            api_ws_url: var("SENTINEL_API_WS_URL", "ws://127.0.0.1:8000"),
            stream_url: var("SENTINEL_STREAM_URL", "http://localhost:8010"),
            stream_ws_url: var("SENTINEL_STREAM_WS_URL", "ws://127.0.0.1:8010"),
            session_file,
            request_timeout_secs,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_session_file(home: Option<String>) -> PathBuf {
    let home = home.map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    home.join(".config").join("sentinel").join("session.json")
}
