//! Per-recipient notification push feed.
//!
//! The backend pushes one JSON [`NotificationData`] per text message on
//! `/ws/notifications?destinatario=<recipient>`. Each one becomes the
//! latest notification and is prepended to a bounded history. An unexpected
//! close flips the status to [`StreamStatus::Error`] and retries after a
//! fixed delay; [`NotificationStream::close`] stops for good.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use sentinel_core::notification::NotificationData;
use tokio::sync::{broadcast, watch, RwLock};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Delay before reconnecting after an unexpected close.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Notifications kept in memory; older ones are dropped first.
pub const HISTORY_LIMIT: usize = 500;

/// Capacity of the broadcast channel for newly received notifications.
const BROADCAST_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    /// No recipient, nothing to listen to.
    Idle,
    Connecting,
    Open,
    Error,
    /// Closed on request.
    Closed,
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationStreamError {
    #[error("invalid notification socket URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Build `{ws_base}/ws/notifications?destinatario=<recipient>`.
pub fn notifications_url(ws_base: &str, recipient: &str) -> Result<Url, url::ParseError> {
    let base = format!("{}/", ws_base.trim_end_matches('/'));
    let mut url = Url::parse(&base)?.join("ws/notifications")?;
    url.query_pairs_mut().append_pair("destinatario", recipient);
    Ok(url)
}

struct SessionTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct NotificationStream {
    recipient: String,
    url: Option<Url>,
    reconnect_delay: Duration,
    status_tx: watch::Sender<StreamStatus>,
    latest_tx: watch::Sender<Option<NotificationData>>,
    events_tx: broadcast::Sender<NotificationData>,
    history: Arc<RwLock<VecDeque<NotificationData>>>,
    task: Option<SessionTask>,
}

impl NotificationStream {
    /// Prepare a stream for `recipient`. An empty recipient yields an
    /// idle stream that never connects.
    pub fn new(ws_base: &str, recipient: impl Into<String>) -> Result<Self, NotificationStreamError> {
        let recipient = recipient.into();
        let url = if recipient.trim().is_empty() {
            None
        } else {
            Some(notifications_url(ws_base, &recipient)?)
        };

        let (status_tx, _) = watch::channel(StreamStatus::Idle);
        let (latest_tx, _) = watch::channel(None);
        let (events_tx, _) = broadcast::channel(BROADCAST_CAPACITY);

        Ok(Self {
            recipient,
            url,
            reconnect_delay: RECONNECT_DELAY,
            status_tx,
            latest_tx,
            events_tx,
            history: Arc::new(RwLock::new(VecDeque::new())),
            task: None,
        })
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn status(&self) -> StreamStatus {
        *self.status_tx.borrow()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<StreamStatus> {
        self.status_tx.subscribe()
    }

    /// Receive every notification that arrives after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<NotificationData> {
        self.events_tx.subscribe()
    }

    pub fn latest(&self) -> Option<NotificationData> {
        self.latest_tx.borrow().clone()
    }

    /// Notifications received so far, newest first, at most
    /// [`HISTORY_LIMIT`] of them.
    pub async fn notifications(&self) -> Vec<NotificationData> {
        self.history.read().await.iter().cloned().collect()
    }

    /// Start listening. No-op when idle or already running.
    pub fn start(&mut self) {
        let Some(url) = self.url.clone() else {
            self.status_tx.send_replace(StreamStatus::Idle);
            return;
        };
        if self.task.as_ref().is_some_and(|t| !t.handle.is_finished()) {
            return;
        }

        let cancel = CancellationToken::new();
        let listener = Listener {
            url,
            reconnect_delay: self.reconnect_delay,
            status_tx: self.status_tx.clone(),
            latest_tx: self.latest_tx.clone(),
            events_tx: self.events_tx.clone(),
            history: Arc::clone(&self.history),
            cancel: cancel.clone(),
        };
        let handle = tokio::spawn(listener.run());
        self.task = Some(SessionTask { cancel, handle });
    }

    /// Stop listening. Status becomes [`StreamStatus::Closed`] (or stays
    /// idle for an empty recipient).
    pub async fn close(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel.cancel();
            if let Err(e) = task.handle.await {
                tracing::warn!(error = %e, "Notification listener panicked");
            }
        }
        if self.url.is_some() {
            self.status_tx.send_replace(StreamStatus::Closed);
        }
    }
}

impl Drop for NotificationStream {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            task.cancel.cancel();
        }
    }
}

struct Listener {
    url: Url,
    reconnect_delay: Duration,
    status_tx: watch::Sender<StreamStatus>,
    latest_tx: watch::Sender<Option<NotificationData>>,
    events_tx: broadcast::Sender<NotificationData>,
    history: Arc<RwLock<VecDeque<NotificationData>>>,
    cancel: CancellationToken,
}

impl Listener {
    async fn run(self) {
        loop {
            self.status_tx.send_replace(StreamStatus::Connecting);

            let connected = tokio::select! {
                _ = self.cancel.cancelled() => return,
                result = connect_async(self.url.as_str()) => result,
            };

            match connected {
                Ok((mut ws_stream, _response)) => {
                    tracing::info!(url = %self.url, "Notification socket open");
                    self.status_tx.send_replace(StreamStatus::Open);

                    loop {
                        tokio::select! {
                            _ = self.cancel.cancelled() => {
                                let _ = ws_stream.close(None).await;
                                return;
                            }
                            msg = ws_stream.next() => match msg {
                                Some(Ok(Message::Text(text))) => self.handle_text(&text).await,
                                Some(Ok(Message::Close(frame))) => {
                                    tracing::warn!(?frame, "Notification socket closed by server");
                                    break;
                                }
                                Some(Ok(_)) => {}
                                Some(Err(e)) => {
                                    tracing::warn!(error = %e, "Notification socket error");
                                    break;
                                }
                                None => break,
                            },
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(url = %self.url, error = %e, "Notification socket connect failed");
                }
            }

            self.status_tx.send_replace(StreamStatus::Error);

            tokio::select! {
                _ = self.cancel.cancelled() => return,
                _ = tokio::time::sleep(self.reconnect_delay) => {}
            }
        }
    }

    async fn handle_text(&self, text: &str) {
        let notification: NotificationData = match serde_json::from_str(text) {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unparseable notification");
                return;
            }
        };

        tracing::debug!(id = ?notification.id_notificacion, "Notification received");
        remember(&mut *self.history.write().await, notification.clone());
        self.latest_tx.send_replace(Some(notification.clone()));
        // No subscribers is fine.
        let _ = self.events_tx.send(notification);
    }
}

fn remember(history: &mut VecDeque<NotificationData>, notification: NotificationData) {
    history.push_front(notification);
    history.truncate(HISTORY_LIMIT);
}
