//! `/api/conexiones`: camera connections.

use std::sync::Arc;

use sentinel_core::connection::{ConnectionData, CreateCameraPayload};
use sentinel_core::error::CoreError;
use sentinel_core::types::DbId;

use crate::http::{require, ApiClient, ApiError};

const BASE_PATH: &str = "/api/conexiones";

pub struct ConnectionService {
    http: Arc<ApiClient>,
}

impl ConnectionService {
    pub fn new(http: Arc<ApiClient>) -> Self {
        Self { http }
    }

    pub async fn list(&self) -> Result<Vec<ConnectionData>, ApiError> {
        let conns = self.http.get(BASE_PATH, &[], true).await?;
        require(conns, "connection list")
    }

    /// Fetch one connection by id from the full list.
    pub async fn get(&self, id: DbId) -> Result<ConnectionData, ApiError> {
        self.list()
            .await?
            .into_iter()
            .find(|c| c.id == id)
            .ok_or_else(|| {
                CoreError::NotFound {
                    entity: "connection",
                    id,
                }
                .into()
            })
    }

    pub async fn create(&self, payload: &CreateCameraPayload) -> Result<ConnectionData, ApiError> {
        let created = self.http.post(BASE_PATH, payload, true).await?;
        let created: ConnectionData = require(created, "created connection")?;
        tracing::info!(connection_id = created.id, name = %created.nombre_camara, "Camera created");
        Ok(created)
    }

    /// Start or stop a connection.
    pub async fn update_state(&self, id: DbId, active: bool) -> Result<ConnectionData, ApiError> {
        let updated = self
            .http
            .patch(
                &format!("{BASE_PATH}/{id}/estado"),
                &serde_json::json!({}),
                &[("activo", active.to_string())],
                true,
            )
            .await?;
        require(updated, "updated connection")
    }

    /// Enable or disable a connection.
    pub async fn update_enabled(&self, id: DbId, enabled: bool) -> Result<ConnectionData, ApiError> {
        let updated = self
            .http
            .patch(
                &format!("{BASE_PATH}/{id}/habilitada"),
                &serde_json::json!({}),
                &[("habilitada", enabled.to_string())],
                true,
            )
            .await?;
        require(updated, "updated connection")
    }
}
