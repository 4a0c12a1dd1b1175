//! Webcam ingestion: push locally captured frames to the backend.
//!
//! One session per run, no reconnect. Every tick grabs a frame from the
//! [`FrameSource`], JPEG-encodes it and sends `{"frame": "<base64>"}`
//! on the ingest socket. Ticks are skipped while no frame is ready or
//! when a single capture fails.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use tokio::time::MissedTickBehavior;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_util::sync::CancellationToken;

use crate::messages::IngestMessage;
use crate::source::{CaptureError, FrameSource};

/// Default capture period (about 15 frames per second).
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(66);

/// Default JPEG quality.
pub const DEFAULT_QUALITY: u8 = 60;

#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub url: String,
    pub interval: Duration,
    pub quality: u8,
}

impl IngestConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            interval: DEFAULT_INTERVAL,
            quality: DEFAULT_QUALITY,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub frames_sent: u64,
    pub frames_skipped: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("could not open ingest socket: {0}")]
    Connect(#[source] WsError),

    #[error("ingest socket error: {0}")]
    Socket(#[source] WsError),

    #[error("could not encode frame: {0}")]
    Encode(#[from] image::ImageError),

    #[error("frame encoder task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Outcome of a single capture tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tick {
    Sent,
    Skipped,
    /// The peer already closed the socket.
    Closed,
}

/// Encode an RGB frame as JPEG at the given quality (clamped to 1..=100).
pub fn encode_jpeg(frame: &RgbImage, quality: u8) -> Result<Vec<u8>, image::ImageError> {
    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100));
    encoder.encode_image(frame)?;
    Ok(out)
}

pub struct FrameIngestor {
    config: IngestConfig,
}

impl FrameIngestor {
    pub fn new(config: IngestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Open `source`, connect, and stream frames until `cancel` fires or
    /// the server closes the socket. The source is closed on every exit
    /// path once it was opened.
    pub async fn run<S>(
        &self,
        source: &mut S,
        cancel: CancellationToken,
    ) -> Result<IngestStats, IngestError>
    where
        S: FrameSource + ?Sized,
    {
        source.open().await?;

        let result = self.run_session(source, &cancel).await;
        source.close().await;

        match &result {
            Ok(stats) => tracing::info!(
                url = %self.config.url,
                sent = stats.frames_sent,
                skipped = stats.frames_skipped,
                "Ingest stopped",
            ),
            Err(e) => tracing::error!(url = %self.config.url, error = %e, "Ingest failed"),
        }
        result
    }

    async fn run_session<S>(
        &self,
        source: &mut S,
        cancel: &CancellationToken,
    ) -> Result<IngestStats, IngestError>
    where
        S: FrameSource + ?Sized,
    {
        let (ws_stream, _response) = tokio::select! {
            _ = cancel.cancelled() => return Ok(IngestStats::default()),
            result = connect_async(self.config.url.as_str()) => result.map_err(IngestError::Connect)?,
        };
        tracing::info!(url = %self.config.url, "Ingest socket open");

        let (mut sink, mut stream) = ws_stream.split();
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut stats = IngestStats::default();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                }
                _ = ticker.tick() => match self.send_tick(source, &mut sink).await? {
                    Tick::Sent => stats.frames_sent += 1,
                    Tick::Skipped => stats.frames_skipped += 1,
                    Tick::Closed => {
                        tracing::info!("Ingest socket closed by backend");
                        break;
                    }
                },
                msg = stream.next() => match msg {
                    Some(Ok(Message::Close(frame))) => {
                        tracing::info!(?frame, "Backend closed ingest socket");
                        break;
                    }
                    Some(Ok(_)) => {
                        // The ingest endpoint does not talk back.
                    }
                    Some(Err(e)) => return Err(IngestError::Socket(e)),
                    None => break,
                },
            }
        }

        Ok(stats)
    }

    /// Capture, encode and send one frame.
    ///
    /// A failed capture only skips the tick; a source that is not open
    /// ends the session.
    async fn send_tick<S, K>(&self, source: &mut S, sink: &mut K) -> Result<Tick, IngestError>
    where
        S: FrameSource + ?Sized,
        K: SinkExt<Message, Error = WsError> + Unpin,
    {
        let frame = match source.capture().await {
            Ok(Some(frame)) => frame,
            Ok(None) => return Ok(Tick::Skipped),
            Err(CaptureError::NotOpen) => return Err(CaptureError::NotOpen.into()),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping frame that could not be captured");
                return Ok(Tick::Skipped);
            }
        };

        let quality = self.config.quality;
        let message = tokio::task::spawn_blocking(move || {
            encode_jpeg(&frame, quality).map(|jpeg| IngestMessage::from_jpeg(&jpeg))
        })
        .await??;

        let json = match serde_json::to_string(&message) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unserialisable frame");
                return Ok(Tick::Skipped);
            }
        };
        match sink.send(Message::Text(json)).await {
            Ok(()) => Ok(Tick::Sent),
            Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => Ok(Tick::Closed),
            Err(e) => Err(IngestError::Socket(e)),
        }
    }
}
