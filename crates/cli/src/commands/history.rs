//! Event history and recorded clips.

use sentinel_core::access::Access;
use serde::Serialize;

use sentinel_core::clip::{normalize_static_path, ClipData, EventCategory};
use sentinel_core::event::{EventData, EventLog, EventQuery};
use sentinel_core::types::DbId;

use super::Output;
use crate::cli::ClipsCommand;
use crate::context::AppContext;

pub async fn events(
    ctx: &AppContext,
    out: Output,
    connection: Option<DbId>,
    limit: Option<u32>,
    offset: Option<u32>,
) -> anyhow::Result<()> {
    ctx.require(Access::Private)?;

    let service = ctx.events();
    let events = if connection.is_none() && limit.is_none() && offset.is_none() {
        service.list().await?
    } else {
        let mut query = connection.map(EventQuery::for_connection).unwrap_or_default();
        if limit.is_some() {
            query.limit = limit;
        }
        if offset.is_some() {
            query.offset = offset;
        }
        service.list_filtered(&query).await?
    };

    out.emit(&events, |events| {
        if events.is_empty() {
            println!("No events");
        }
        for e in events {
            print_event(e);
        }
    })
}

pub async fn clips(ctx: &AppContext, out: Output, cmd: ClipsCommand) -> anyhow::Result<()> {
    ctx.require(Access::Private)?;
    let clips = ctx.clips();

    match cmd {
        ClipsCommand::List => {
            let list = clips.list().await?;
            out.emit(&list, |list| {
                for c in list {
                    println!(
                        "{:>5}  camera {:<4} {}  {:>6.1}s  {}",
                        c.id_clip,
                        c.id_conexion,
                        c.start_time_utc,
                        c.duration_sec,
                        normalize_static_path(&c.storage_path)
                    );
                }
            })
        }
        ClipsCommand::Show { id, log } => {
            let clip = clips.get(id).await?;
            if !log {
                return out.emit(&clip, print_clip);
            }

            let events: Vec<EventData> = ctx
                .events()
                .list_filtered(&EventQuery::for_connection(clip.id_conexion))
                .await?
                .into_iter()
                .filter(|e| e.id_clip == Some(id))
                .collect();

            let mut detail = ClipDetail {
                clip,
                events: Vec::with_capacity(events.len()),
            };
            for event in events {
                let entry = match event.subclip_path.as_deref().filter(|p| !p.is_empty()) {
                    None => ClipEvent::new(event, None),
                    Some(path) => {
                        let log = clips.event_log(path).await.map_err(|e| e.to_string());
                        ClipEvent::new(event, Some(log))
                    }
                };
                detail.events.push(entry);
            }

            out.emit(&detail, print_clip_detail)
        }
    }
}

/// A clip with the events recorded in it and their inference logs,
/// emitted as one document by `clips show --log`.
#[derive(Debug, Serialize)]
struct ClipDetail {
    clip: ClipData,
    events: Vec<ClipEvent>,
}

#[derive(Debug, Serialize)]
struct ClipEvent {
    event: EventData,
    log: Option<EventLog>,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_error: Option<String>,
}

impl ClipEvent {
    /// `log` is `None` when the event has no subclip to read a log from.
    fn new(event: EventData, log: Option<Result<EventLog, String>>) -> Self {
        let (log, log_error) = match log {
            None => (None, None),
            Some(Ok(log)) => (Some(log), None),
            Some(Err(e)) => (None, Some(e)),
        };
        Self {
            event,
            log,
            log_error,
        }
    }
}

fn print_clip(c: &ClipData) {
    println!("Clip {} (camera {})", c.id_clip, c.id_conexion);
    println!("  started  {}", c.start_time_utc);
    println!("  duration {:.1}s", c.duration_sec);
    println!("  saved    {}", c.fecha_guardado);
    println!("  video    {}", normalize_static_path(&c.storage_path));
}

fn print_clip_detail(detail: &ClipDetail) {
    print_clip(&detail.clip);
    if detail.events.is_empty() {
        println!("No events reference this clip");
    }
    for entry in &detail.events {
        print_event(&entry.event);
        match (&entry.log, &entry.log_error) {
            (Some(log), _) => print_log(log),
            (None, Some(e)) => println!("    could not read inference log: {e}"),
            (None, None) => println!("    (no inference log for this event)"),
        }
    }
}

fn print_event(e: &EventData) {
    let confidence = e
        .confianza
        .value()
        .map(|c| format!("{:.0}%", c * 100.0))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{:>6}  {}  camera {:<4} {:<10} {:<16} {:>5}",
        e.id_evento,
        e.timestamp_evento,
        e.id_conexion,
        EventCategory::from_event_type(&e.tipo_evento).label(),
        e.tipo_evento,
        confidence
    );
}

fn print_log(log: &EventLog) {
    println!(
        "    {} .. {}  {} samples",
        log.event_start_time, log.event_end_time, log.total_logs
    );
    for entry in &log.logs {
        let top: Vec<String> = entry
            .top_classes(3)
            .into_iter()
            .map(|(class, p)| format!("{class}: {:.1}%", p * 100.0))
            .collect();
        println!("    {:>7} ms  {}", entry.timestamp_ms, top.join("  "));
    }
}
