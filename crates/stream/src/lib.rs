//! Live WebSocket channels of the monitoring backend.
//!
//! - [`receiver`]: per-camera frame feed with exponential-backoff
//!   reconnection.
//! - [`ingest`]: pushes locally captured frames to the backend's
//!   ingestion endpoint.
//! - [`notifications`]: per-recipient notification push feed.
//!
//! Message shapes live in [`messages`], capture devices in [`source`],
//! and the backoff policy in [`reconnect`].

pub mod ingest;
pub mod messages;
pub mod notifications;
pub mod receiver;
pub mod reconnect;
pub mod source;

/// Join a WebSocket base URL and a path without doubling slashes.
pub(crate) fn join_ws(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Frame feed URL for a camera, e.g. `ws://host:8010/ws/frames/7`.
pub fn frames_url(ws_base: &str, camera_id: &str) -> String {
    join_ws(ws_base, &format!("ws/frames/{camera_id}"))
}

/// Ingestion URL for a camera, e.g. `ws://host:8010/ws/ingest/7`.
pub fn ingest_url(ws_base: &str, camera_id: &str) -> String {
    join_ws(ws_base, &format!("ws/ingest/{camera_id}"))
}
