//! Camera control on the stream server (`POST /control/camera`).
//!
//! The stream server is a separate process from the REST API, so this
//! service is built over an [`ApiClient`] pointed at the stream server's
//! base URL.

use std::sync::Arc;

use sentinel_core::control::{CameraAction, CameraControlRequest, CameraControlResponse};

use crate::http::{require, ApiClient, ApiError};

pub struct CameraControlService {
    http: Arc<ApiClient>,
}

impl CameraControlService {
    pub fn new(http: Arc<ApiClient>) -> Self {
        Self { http }
    }

    pub async fn send(
        &self,
        camera_id: &str,
        action: CameraAction,
    ) -> Result<CameraControlResponse, ApiError> {
        let payload = CameraControlRequest {
            camera_id: camera_id.to_string(),
            action,
        };
        let resp = self.http.post("/control/camera", &payload, false).await?;
        let resp: CameraControlResponse = require(resp, "control response")?;
        tracing::info!(camera_id, action = %action, status = %resp.status, "Camera command processed");
        Ok(resp)
    }

    pub async fn start(&self, camera_id: &str) -> Result<CameraControlResponse, ApiError> {
        self.send(camera_id, CameraAction::Start).await
    }

    pub async fn stop(&self, camera_id: &str) -> Result<CameraControlResponse, ApiError> {
        self.send(camera_id, CameraAction::Stop).await
    }

    pub async fn enable_inference(&self, camera_id: &str) -> Result<CameraControlResponse, ApiError> {
        self.send(camera_id, CameraAction::EnableInference).await
    }

    pub async fn disable_inference(&self, camera_id: &str) -> Result<CameraControlResponse, ApiError> {
        self.send(camera_id, CameraAction::DisableInference).await
    }
}
