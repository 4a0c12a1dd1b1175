//! Notification history, the live push feed and SMS alerts.

use std::io::Write as _;

use sentinel_core::access::Access;
use sentinel_core::notification::NotificationData;
use sentinel_stream::notifications::{NotificationStream, StreamStatus};
use tokio::sync::broadcast::error::RecvError;

use super::Output;
use crate::cli::NotificationsCommand;
use crate::context::AppContext;

const BELL: &str = "\x07";

pub async fn run(ctx: &AppContext, out: Output, cmd: NotificationsCommand) -> anyhow::Result<()> {
    ctx.require(Access::Private)?;

    match cmd {
        NotificationsCommand::List => {
            let list = ctx.notifications().list().await?;
            out.emit(&list, |list| {
                if list.is_empty() {
                    println!("No notifications");
                }
                for n in list {
                    println!("{}", format_notification(n));
                }
            })
        }
        NotificationsCommand::Follow { recipient, bell } => follow(ctx, out, &recipient, bell).await,
    }
}

async fn follow(ctx: &AppContext, out: Output, recipient: &str, bell: bool) -> anyhow::Result<()> {
    let mut stream = NotificationStream::new(&ctx.config.api_ws_url, recipient)?;
    if stream.url().is_none() {
        anyhow::bail!("a recipient is required to follow notifications");
    }

    let mut incoming = stream.subscribe();
    let mut status = stream.subscribe_status();
    stream.start();
    eprintln!("Following notifications for {recipient} (Ctrl-C to stop)");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let s = *status.borrow_and_update();
                match s {
                    StreamStatus::Open => eprintln!("connected"),
                    StreamStatus::Error => eprintln!("connection lost; reconnecting"),
                    StreamStatus::Idle | StreamStatus::Connecting | StreamStatus::Closed => {}
                }
            }
            msg = incoming.recv() => match msg {
                Ok(n) => {
                    if out.json {
                        println!("{}", serde_json::to_string(&n)?);
                    } else {
                        println!("{}", format_notification(&n));
                    }
                    if bell {
                        print!("{BELL}");
                    }
                    let _ = std::io::stdout().flush();
                }
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Notification output fell behind");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    stream.close().await;
    Ok(())
}

pub async fn alert(ctx: &AppContext, message: &str, phone: &str) -> anyhow::Result<()> {
    ctx.require(Access::Private)?;
    let resp = ctx.messages().send_sms_alert(message, phone).await?;
    println!("Alert sent (message id {})", resp.topic_message_id);
    Ok(())
}

pub(crate) fn format_notification(n: &NotificationData) -> String {
    let when = n.fecha_envio.as_deref().unwrap_or("-");
    let mut line = format!("[{when}] {}", n.mensaje);
    if let Some(event) = n.id_evento {
        line.push_str(&format!(" (event {event})"));
    }
    if let Some(estado) = n.estado.as_deref() {
        line.push_str(&format!(" [{estado}]"));
    }
    line
}
