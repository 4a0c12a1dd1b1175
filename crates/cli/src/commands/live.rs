//! Live video: receive a camera's frames, or push local frames for
//! webcam-mode cameras.

use std::path::PathBuf;

use anyhow::Context as _;
use sentinel_core::access::Access;
use sentinel_core::connection::StreamMode;
use sentinel_stream::ingest::{FrameIngestor, IngestConfig};
use sentinel_stream::receiver::{FrameReceiver, ReceiverOptions};
use sentinel_stream::source::{FrameSource, ImageSequenceSource, TestPatternSource};
use tokio_util::sync::CancellationToken;

use crate::cli::{IngestArgs, WatchArgs};
use crate::context::AppContext;

pub async fn watch(ctx: &AppContext, args: WatchArgs) -> anyhow::Result<()> {
    ctx.require(Access::Private)?;

    let connection = ctx.connections().get(args.connection_id).await?;
    let camera_id = connection.id.to_string();

    match connection.stream_mode() {
        StreamMode::Webcam => {
            println!(
                "Camera {} ({}) takes frames from this machine; streaming",
                camera_id, connection.nombre_camara
            );
            push_frames(ctx, &camera_id, args.dir).await
        }
        StreamMode::Rtsp => {
            let out = args
                .out
                .unwrap_or_else(|| PathBuf::from(format!("frame_{camera_id}.jpg")));
            receive_frames(ctx, &camera_id, out, args.frames).await
        }
    }
}

pub async fn ingest(ctx: &AppContext, args: IngestArgs) -> anyhow::Result<()> {
    ctx.require(Access::Private)?;
    push_frames(ctx, &args.camera_id, args.dir).await
}

async fn receive_frames(
    ctx: &AppContext,
    camera_id: &str,
    out: PathBuf,
    limit: Option<u64>,
) -> anyhow::Result<()> {
    let mut receiver =
        FrameReceiver::start(camera_id, ReceiverOptions::for_base(&ctx.config.stream_ws_url));
    let mut frames = receiver.subscribe_frames();
    let mut state = receiver.subscribe_state();
    tracing::info!(camera_id, url = %receiver.url(), "Watching camera");

    let mut written: u64 = 0;
    let result: anyhow::Result<()> = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break Ok(()),
            changed = state.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let s = state.borrow_and_update().clone();
                match (s.connected, s.error) {
                    (true, _) => eprintln!("connected"),
                    (false, Some(err)) => eprintln!("{err}; retrying"),
                    (false, None) => eprintln!("disconnected"),
                }
            }
            changed = frames.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let frame = frames.borrow_and_update().clone();
                if let Some(frame) = frame {
                    if let Err(e) = tokio::fs::write(&out, &frame.jpeg).await {
                        break Err(e).with_context(|| format!("could not write {}", out.display()));
                    }
                    written += 1;
                    if limit.is_some_and(|n| written >= n) {
                        break Ok(());
                    }
                }
            }
        }
    };

    receiver.disconnect().await;
    println!("{written} frame(s) written to {}", out.display());
    result
}

async fn push_frames(ctx: &AppContext, camera_id: &str, dir: Option<PathBuf>) -> anyhow::Result<()> {
    let url = sentinel_stream::ingest_url(&ctx.config.stream_ws_url, camera_id);
    let ingestor = FrameIngestor::new(IngestConfig::new(url));

    let mut source: Box<dyn FrameSource> = match dir {
        Some(dir) => Box::new(ImageSequenceSource::new(dir)),
        None => Box::new(TestPatternSource::default()),
    };

    let cancel = CancellationToken::new();
    let stop = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.cancel();
        }
    });

    let stats = ingestor.run(source.as_mut(), cancel).await?;
    println!(
        "{} frame(s) sent, {} skipped",
        stats.frames_sent, stats.frames_skipped
    );
    Ok(())
}
