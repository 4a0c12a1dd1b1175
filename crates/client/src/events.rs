use std::sync::Arc;

use sentinel_core::event::{EventData, EventQuery};

use crate::http::{require, ApiClient, ApiError};

const BASE_PATH: &str = "/api/eventos";

pub struct EventService {
    http: Arc<ApiClient>,
}

impl EventService {
    pub fn new(http: Arc<ApiClient>) -> Self {
        Self { http }
    }

    pub async fn list(&self) -> Result<Vec<EventData>, ApiError> {
        self.list_filtered(&EventQuery::default()).await
    }

    pub async fn list_filtered(&self, query: &EventQuery) -> Result<Vec<EventData>, ApiError> {
        let events = self.http.get(BASE_PATH, &query.to_pairs(), true).await?;
        require(events, "event list")
    }
}
