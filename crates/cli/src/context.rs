//! Shared state for one CLI invocation: configuration, the persisted
//! session and the API clients built from them.

use std::sync::Arc;

use anyhow::Context as _;
use sentinel_client::{
    ApiClient, AuthService, CameraControlService, ClipService, ConnectionService, EventService,
    MessageService, NotificationService, OfficeService,
};
use sentinel_core::access::{enforce, Access, AuthState};
use sentinel_core::session::{FileTokenStore, Session, TokenStore};

use crate::config::ClientConfig;

pub struct AppContext {
    pub config: ClientConfig,
    pub tokens: Arc<dyn TokenStore>,
    api: Arc<ApiClient>,
    stream_api: Arc<ApiClient>,
}

impl AppContext {
    /// Build the context with the session stored at `config.session_file`.
    pub fn new(config: ClientConfig) -> anyhow::Result<Self> {
        let tokens: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(&config.session_file));
        Self::with_tokens(config, tokens)
    }

    pub fn with_tokens(config: ClientConfig, tokens: Arc<dyn TokenStore>) -> anyhow::Result<Self> {
        let api = ApiClient::new(&config.api_url, Arc::clone(&tokens), config.request_timeout())
            .with_context(|| format!("invalid API URL '{}'", config.api_url))?;
        let stream_api = ApiClient::with_client(
            api.http().clone(),
            &config.stream_url,
            Arc::clone(&tokens),
        )
        .with_context(|| format!("invalid stream server URL '{}'", config.stream_url))?;

        Ok(Self {
            config,
            tokens,
            api: Arc::new(api),
            stream_api: Arc::new(stream_api),
        })
    }

    /// The current, unexpired session.
    pub fn session(&self) -> anyhow::Result<Option<Session>> {
        self.tokens.load().context("could not read the stored session")
    }

    /// Fail unless the current session satisfies `access`.
    pub fn require(&self, access: Access) -> anyhow::Result<Option<Session>> {
        let session = self.session()?;
        enforce(access, AuthState::from_session(session.as_ref()))?;
        Ok(session)
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(Arc::clone(&self.api))
    }

    pub fn connections(&self) -> ConnectionService {
        ConnectionService::new(Arc::clone(&self.api))
    }

    pub fn offices(&self) -> OfficeService {
        OfficeService::new(Arc::clone(&self.api))
    }

    pub fn events(&self) -> EventService {
        EventService::new(Arc::clone(&self.api))
    }

    pub fn clips(&self) -> ClipService {
        ClipService::new(Arc::clone(&self.api))
    }

    pub fn notifications(&self) -> NotificationService {
        NotificationService::new(Arc::clone(&self.api))
    }

    pub fn messages(&self) -> MessageService {
        MessageService::new(Arc::clone(&self.api))
    }

    pub fn camera_control(&self) -> CameraControlService {
        CameraControlService::new(Arc::clone(&self.stream_api))
    }
}
