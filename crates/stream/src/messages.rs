//! Message shapes on the frame, ingestion and notification sockets.
//!
//! The stream server pushes JSON envelopes of the form
//! `{"type": "frame", "camera_id": "...", "jpeg_base64": "..."}`;
//! the ingestion socket accepts `{"frame": "<base64 jpeg>"}`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use sentinel_core::types::Timestamp;

/// All known server-to-client messages on the frame socket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// One JPEG frame.
    #[serde(rename = "frame")]
    Frame(FrameEnvelope),
}

#[derive(Debug, Clone, Deserialize)]
pub struct FrameEnvelope {
    #[serde(default)]
    pub camera_id: String,
    #[serde(default)]
    pub jpeg_base64: String,
}

/// Parse a frame-socket text message.
///
/// Returns `Err` for malformed JSON or unknown `type` values; callers
/// skip those.
pub fn parse_message(text: &str) -> Result<ServerMessage, serde_json::Error> {
    serde_json::from_str(text)
}

/// A decoded frame ready for display or storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub camera_id: String,
    /// Payload as received, without a data-URL prefix.
    pub jpeg_base64: String,
    pub jpeg: Vec<u8>,
    pub received_at: Timestamp,
}

impl Frame {
    /// Decode an envelope. Envelopes with an empty or undecodable
    /// payload yield `None`.
    pub fn from_envelope(envelope: FrameEnvelope, received_at: Timestamp) -> Option<Self> {
        if envelope.jpeg_base64.is_empty() {
            return None;
        }
        let jpeg = STANDARD.decode(envelope.jpeg_base64.as_bytes()).ok()?;
        Some(Self {
            camera_id: envelope.camera_id,
            jpeg_base64: envelope.jpeg_base64,
            jpeg,
            received_at,
        })
    }

    /// `data:` URL suitable for an `<img src>`.
    pub fn data_url(&self) -> String {
        format!("data:image/jpeg;base64,{}", self.jpeg_base64)
    }
}

/// Client-to-server message on the ingestion socket.
#[derive(Debug, Clone, Serialize)]
pub struct IngestMessage {
    /// Base64 JPEG, without a data-URL prefix.
    pub frame: String,
}

impl IngestMessage {
    pub fn from_jpeg(jpeg: &[u8]) -> Self {
        Self {
            frame: STANDARD.encode(jpeg),
        }
    }
}
