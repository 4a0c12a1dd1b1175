use std::sync::Arc;

use sentinel_core::office::OfficeData;

use crate::http::{require, ApiClient, ApiError};

const BASE_PATH: &str = "/api/oficinas";

pub struct OfficeService {
    http: Arc<ApiClient>,
}

impl OfficeService {
    pub fn new(http: Arc<ApiClient>) -> Self {
        Self { http }
    }

    pub async fn list(&self) -> Result<Vec<OfficeData>, ApiError> {
        let offices = self.http.get(BASE_PATH, &[], true).await?;
        require(offices, "office list")
    }
}
