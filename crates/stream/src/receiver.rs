//! Per-camera frame feed.
//!
//! [`FrameReceiver`] owns at most one background session task. The task
//! connects to the camera's frame socket, publishes every decoded frame
//! on a [`watch`] channel (last frame wins), and after an unexpected
//! close schedules a reconnect with exponential backoff when
//! auto-connect is enabled. [`FrameReceiver::disconnect`] cancels the
//! task, including any pending reconnect timer.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use crate::messages::{parse_message, Frame, ServerMessage};
use crate::reconnect::{Backoff, BackoffConfig};

/// Error surfaced when the frame socket cannot be opened or fails.
pub const STREAM_CONNECT_ERROR: &str = "could not connect to stream";

/// How long [`FrameReceiver::disconnect`] waits for the task to exit.
const STOP_TIMEOUT: Duration = Duration::from_secs(5);

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Maps a camera id to its frame socket URL.
pub type UrlBuilder = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Observable connection state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiverState {
    pub connected: bool,
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct ReceiverOptions {
    pub build_url: UrlBuilder,
    /// Connect on start and on camera change, and reconnect after an
    /// unexpected close.
    pub auto_connect: bool,
    pub backoff: BackoffConfig,
}

impl ReceiverOptions {
    /// Options for the stream server at `ws_base` (e.g. `ws://127.0.0.1:8010`).
    pub fn for_base(ws_base: impl Into<String>) -> Self {
        let base = ws_base.into();
        Self {
            build_url: Arc::new(move |camera_id| crate::frames_url(&base, camera_id)),
            auto_connect: true,
            backoff: BackoffConfig::default(),
        }
    }
}

struct SessionTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct FrameReceiver {
    camera_id: String,
    options: ReceiverOptions,
    state_tx: watch::Sender<ReceiverState>,
    frame_tx: watch::Sender<Option<Frame>>,
    task: Option<SessionTask>,
}

impl FrameReceiver {
    /// Create a receiver without connecting.
    pub fn new(camera_id: impl Into<String>, options: ReceiverOptions) -> Self {
        let (state_tx, _) = watch::channel(ReceiverState::default());
        let (frame_tx, _) = watch::channel(None);
        Self {
            camera_id: camera_id.into(),
            options,
            state_tx,
            frame_tx,
            task: None,
        }
    }

    /// Create a receiver and connect right away when auto-connect is on.
    pub fn start(camera_id: impl Into<String>, options: ReceiverOptions) -> Self {
        let mut receiver = Self::new(camera_id, options);
        if receiver.options.auto_connect {
            receiver.connect();
        }
        receiver
    }

    pub fn camera_id(&self) -> &str {
        &self.camera_id
    }

    pub fn url(&self) -> String {
        (self.options.build_url)(&self.camera_id)
    }

    pub fn state(&self) -> ReceiverState {
        self.state_tx.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ReceiverState> {
        self.state_tx.subscribe()
    }

    pub fn latest_frame(&self) -> Option<Frame> {
        self.frame_tx.borrow().clone()
    }

    pub fn subscribe_frames(&self) -> watch::Receiver<Option<Frame>> {
        self.frame_tx.subscribe()
    }

    /// Whether a session task is open, connecting, or waiting to retry.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.handle.is_finished())
    }

    /// Open the frame socket. No-op while a session is already running.
    pub fn connect(&mut self) {
        if self.is_running() {
            return;
        }

        self.state_tx.send_modify(|s| s.error = None);

        let cancel = CancellationToken::new();
        let session = Session {
            camera_id: self.camera_id.clone(),
            url: self.url(),
            auto_reconnect: self.options.auto_connect,
            backoff: Backoff::new(self.options.backoff.clone()),
            state_tx: self.state_tx.clone(),
            frame_tx: self.frame_tx.clone(),
            cancel: cancel.clone(),
        };

        let handle = tokio::spawn(session.run());
        self.task = Some(SessionTask { cancel, handle });
    }

    /// Close the socket and cancel any pending reconnect.
    pub async fn disconnect(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel.cancel();
            if tokio::time::timeout(STOP_TIMEOUT, task.handle).await.is_err() {
                tracing::warn!(camera_id = %self.camera_id, "Frame session did not stop in time");
            }
        }
        self.state_tx.send_modify(|s| s.connected = false);
    }

    /// Switch to another camera: close the current feed, drop its last
    /// frame, and reconnect when auto-connect is on.
    pub async fn set_camera(&mut self, camera_id: impl Into<String>) {
        self.disconnect().await;
        self.camera_id = camera_id.into();
        self.frame_tx.send_replace(None);
        if self.options.auto_connect {
            self.connect();
        }
    }
}

impl Drop for FrameReceiver {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            task.cancel.cancel();
        }
    }
}

// ---------------------------------------------------------------------------
// Session task
// ---------------------------------------------------------------------------

/// How a single socket session ended.
enum SessionEnd {
    Cancelled,
    Closed,
    Failed,
}

struct Session {
    camera_id: String,
    url: String,
    auto_reconnect: bool,
    backoff: Backoff,
    state_tx: watch::Sender<ReceiverState>,
    frame_tx: watch::Sender<Option<Frame>>,
    cancel: CancellationToken,
}

impl Session {
    /// Connect, read frames, and reconnect until cancelled (or, without
    /// auto-reconnect, until the first session ends).
    async fn run(mut self) {
        loop {
            let connected = tokio::select! {
                _ = self.cancel.cancelled() => return,
                result = connect_async(self.url.as_str()) => result,
            };

            match connected {
                Ok((ws_stream, _response)) => {
                    tracing::info!(camera_id = %self.camera_id, url = %self.url, "Frame socket open");
                    self.backoff.reset();
                    self.state_tx.send_modify(|s| {
                        s.connected = true;
                        s.error = None;
                    });

                    let end = self.read_frames(ws_stream).await;

                    self.state_tx.send_modify(|s| s.connected = false);
                    match end {
                        SessionEnd::Cancelled => return,
                        SessionEnd::Failed => self.set_error(),
                        SessionEnd::Closed => {}
                    }
                }
                Err(e) => {
                    tracing::warn!(camera_id = %self.camera_id, error = %e, "Frame socket connect failed");
                    self.set_error();
                }
            }

            if !self.auto_reconnect || self.cancel.is_cancelled() {
                return;
            }

            let delay = self.backoff.next_attempt();
            tracing::info!(
                camera_id = %self.camera_id,
                delay_ms = delay.as_millis() as u64,
                "Scheduling frame socket reconnect",
            );

            // Wait before the next attempt, respecting cancellation.
            tokio::select! {
                _ = self.cancel.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    fn set_error(&self) {
        self.state_tx.send_modify(|s| {
            s.connected = false;
            s.error = Some(STREAM_CONNECT_ERROR.to_string());
        });
    }

    async fn read_frames(&self, mut ws_stream: WsStream) -> SessionEnd {
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    let _ = ws_stream.close(None).await;
                    return SessionEnd::Cancelled;
                }
                msg = ws_stream.next() => match msg {
                    Some(Ok(Message::Text(text))) => self.handle_text(&text),
                    Some(Ok(Message::Close(frame))) => {
                        tracing::info!(camera_id = %self.camera_id, ?frame, "Frame socket closed by server");
                        return SessionEnd::Closed;
                    }
                    Some(Ok(_)) => {
                        // Binary / Ping / Pong: nothing to display.
                    }
                    Some(Err(e)) => {
                        tracing::warn!(camera_id = %self.camera_id, error = %e, "Frame socket error");
                        return SessionEnd::Failed;
                    }
                    None => return SessionEnd::Closed,
                },
            }
        }
    }

    fn handle_text(&self, text: &str) {
        match parse_message(text) {
            Ok(ServerMessage::Frame(envelope)) => {
                match Frame::from_envelope(envelope, chrono::Utc::now()) {
                    Some(frame) => {
                        self.frame_tx.send_replace(Some(frame));
                    }
                    None => tracing::debug!(camera_id = %self.camera_id, "Skipping frame without payload"),
                }
            }
            Err(e) => {
                tracing::trace!(camera_id = %self.camera_id, error = %e, "Ignoring non-frame message");
            }
        }
    }
}
