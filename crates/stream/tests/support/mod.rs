//! Local WebSocket server for exercising the client channels.

#![allow(dead_code)]

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::WebSocketStream;

pub type ServerSocket = WebSocketStream<TcpStream>;

pub struct TestServer {
    /// `ws://127.0.0.1:<port>`
    pub base: String,
    accepted: Arc<AtomicUsize>,
    paths: mpsc::UnboundedReceiver<String>,
}

impl TestServer {
    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    /// Request path (with query) of the next accepted connection.
    pub async fn next_path(&mut self) -> String {
        tokio::time::timeout(Duration::from_secs(5), self.paths.recv())
            .await
            .expect("no connection within 5s")
            .expect("server stopped")
    }
}

/// Spawn a server that hands every accepted socket (with its 0-based
/// index) to `handler`.
pub async fn spawn_server<F, Fut>(handler: F) -> TestServer
where
    F: Fn(usize, ServerSocket) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));
    let (path_tx, paths) = mpsc::unbounded_channel();

    let counter = Arc::clone(&accepted);
    let handler = Arc::new(handler);
    tokio::spawn(async move {
        while let Ok((tcp, _)) = listener.accept().await {
            let path_tx = path_tx.clone();
            let callback = move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
                let path = req
                    .uri()
                    .path_and_query()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                let _ = path_tx.send(path);
                Ok(resp)
            };
            let Ok(ws) = tokio_tungstenite::accept_hdr_async(tcp, callback).await else {
                continue;
            };
            let index = counter.fetch_add(1, Ordering::SeqCst);
            let handler = Arc::clone(&handler);
            tokio::spawn(async move { handler(index, ws).await });
        }
    });

    TestServer {
        base: format!("ws://{addr}"),
        accepted,
        paths,
    }
}

/// A base URL nothing listens on.
pub async fn refused_base() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("ws://{addr}")
}

pub fn frame_json(camera_id: &str, jpeg: &[u8]) -> String {
    serde_json::json!({
        "type": "frame",
        "camera_id": camera_id,
        "jpeg_base64": STANDARD.encode(jpeg),
    })
    .to_string()
}

/// Keep a server socket open until the peer goes away.
pub async fn hold_open(mut ws: ServerSocket) {
    use futures::StreamExt;
    while let Some(Ok(_)) = ws.next().await {}
}

/// Wait (up to 5s) until `pred` holds for the watched value.
pub async fn wait_until<T, P>(rx: &mut watch::Receiver<T>, pred: P) -> T
where
    T: Clone,
    P: FnMut(&T) -> bool,
{
    let value = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(pred))
        .await
        .expect("condition not reached within 5s")
        .expect("sender dropped");
    value.clone()
}
