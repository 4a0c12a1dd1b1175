//! Camera connection records (`/api/conexiones`) and stream mode.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// `rtsp_url` value that marks a connection fed by a local webcam
/// instead of an RTSP source.
pub const WEBCAM_SOURCE: &str = "webcam";

/// Ingestion mode sent when creating a camera.
pub const INGEST_MODE_SEGMENT: &str = "SEGMENT";

/// `estado` value the API reports for a stopped connection.
pub const STATE_INACTIVE: &str = "inactiva";

/// A camera's registered video source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionData {
    pub id: DbId,
    pub id_oficina: DbId,
    pub nombre_camara: String,
    pub ubicacion: String,
    pub rtsp_url: String,
    pub estado: String,
    #[serde(default)]
    pub ultimo_ping: Option<String>,
    pub modo_ingesta: String,
    pub fps_sample: i32,
    pub habilitada: bool,
    pub retention_minutes: i32,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl ConnectionData {
    /// Whether the connection is currently running.
    pub fn is_active(&self) -> bool {
        self.estado != STATE_INACTIVE
    }

    pub fn stream_mode(&self) -> StreamMode {
        StreamMode::for_source(&self.rtsp_url)
    }
}

/// Payload for `POST /api/conexiones`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateCameraPayload {
    pub id_oficina: DbId,
    pub nombre_camara: String,
    pub ubicacion: String,
    pub rtsp_url: String,
    pub modo_ingesta: String,
    pub fps_sample: i32,
    pub habilitada: bool,
    pub retention_minutes: i32,
}

impl CreateCameraPayload {
    /// Build a payload with the fixed `SEGMENT` ingestion mode.
    pub fn new(
        id_oficina: DbId,
        nombre_camara: impl Into<String>,
        ubicacion: impl Into<String>,
        rtsp_url: impl Into<String>,
    ) -> Self {
        Self {
            id_oficina,
            nombre_camara: nombre_camara.into(),
            ubicacion: ubicacion.into(),
            rtsp_url: rtsp_url.into(),
            modo_ingesta: INGEST_MODE_SEGMENT.to_string(),
            fps_sample: 1,
            habilitada: true,
            retention_minutes: 60,
        }
    }
}

/// How live video for a connection flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    /// The backend pulls RTSP and pushes frames to us.
    Rtsp,
    /// We capture locally and push frames to the backend.
    Webcam,
}

impl StreamMode {
    pub fn for_source(rtsp_url: &str) -> Self {
        if rtsp_url == WEBCAM_SOURCE {
            Self::Webcam
        } else {
            Self::Rtsp
        }
    }
}
