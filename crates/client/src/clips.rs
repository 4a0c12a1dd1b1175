//! `/api/clips` and the static inference logs stored next to subclips.

use std::sync::Arc;

use sentinel_core::clip::{normalize_static_path, ClipData};
use sentinel_core::event::EventLog;
use sentinel_core::types::DbId;

use crate::http::{require, ApiClient, ApiError};

const BASE_PATH: &str = "/api/clips";

pub struct ClipService {
    http: Arc<ApiClient>,
}

impl ClipService {
    pub fn new(http: Arc<ApiClient>) -> Self {
        Self { http }
    }

    pub async fn list(&self) -> Result<Vec<ClipData>, ApiError> {
        let clips = self.http.get(BASE_PATH, &[], true).await?;
        require(clips, "clip list")
    }

    pub async fn get(&self, id: DbId) -> Result<ClipData, ApiError> {
        let clip = self
            .http
            .get(&format!("{BASE_PATH}/{id}"), &[], true)
            .await?;
        require(clip, "clip")
    }

    /// Fetch the inference log JSON referenced by an event's subclip.
    ///
    /// `path` may be a server filesystem path; it is mapped onto the
    /// static-files URL space first.
    pub async fn event_log(&self, path: &str) -> Result<EventLog, ApiError> {
        let url_path = normalize_static_path(path);
        if url_path.is_empty() {
            return Err(ApiError::EmptyResponse("event log path"));
        }
        let log = self.http.get(&url_path, &[], false).await?;
        require(log, "event log")
    }
}
