//! Stored video segments and helpers for presenting them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// A stored video segment referenced by events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipData {
    pub id_clip: DbId,
    pub id_conexion: DbId,
    /// Server-side path to the MP4 file.
    pub storage_path: String,
    pub start_time_utc: String,
    pub duration_sec: f64,
    pub fecha_guardado: String,
}

/// Map a server filesystem path onto the static-files URL space.
///
/// Absolute `http(s)` URLs pass through untouched. Windows separators are
/// normalized, anything up to a `/public` segment is dropped, and paths
/// containing a `/data/` segment are cut back to start there.
pub fn normalize_static_path(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    let lower = path.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return path.to_string();
    }

    let mut s = path.replace('\\', "/");

    if let Some(idx) = s.to_ascii_lowercase().find("/public/") {
        s = s[idx + "/public".len()..].to_string();
    }
    if let Some(idx) = s.to_ascii_lowercase().find("/data/") {
        s = s[idx..].to_string();
    }

    let rest = s.strip_prefix('/').unwrap_or(&s);
    let rest = rest.strip_prefix("public/").unwrap_or(rest);
    format!("/{rest}")
}

/// Display grouping for detected incidents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum EventCategory {
    Punches,
    Kicks,
    Struggles,
}

impl EventCategory {
    /// Classify a raw `tipo_evento`; anything that is neither a kick nor a
    /// punch is treated as a struggle.
    pub fn from_event_type(tipo_evento: &str) -> Self {
        let t = tipo_evento.to_lowercase();
        if t.contains("patada") {
            Self::Kicks
        } else if t.contains("golpe") {
            Self::Punches
        } else {
            Self::Struggles
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Punches => "Punches",
            Self::Kicks => "Kicks",
            Self::Struggles => "Struggles",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
