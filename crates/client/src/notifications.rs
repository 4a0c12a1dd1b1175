use std::sync::Arc;

use sentinel_core::notification::NotificationData;

use crate::http::{require, ApiClient, ApiError};

const BASE_PATH: &str = "/api/notificaciones";

pub struct NotificationService {
    http: Arc<ApiClient>,
}

impl NotificationService {
    pub fn new(http: Arc<ApiClient>) -> Self {
        Self { http }
    }

    pub async fn list(&self) -> Result<Vec<NotificationData>, ApiError> {
        let notes = self.http.get(BASE_PATH, &[], true).await?;
        require(notes, "notification list")
    }
}
