//! Detected incident records (`/api/eventos`) and per-event inference logs.

use std::collections::BTreeMap;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::DbId;

/// A detected incident linked to a connection and optionally a clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventData {
    pub id_evento: DbId,
    pub id_conexion: DbId,
    #[serde(default)]
    pub id_clip: Option<DbId>,
    #[serde(default)]
    pub id_usuario: Option<DbId>,
    #[serde(default)]
    pub tipo_evento: String,
    /// Detector confidence in `0..=1`.
    #[serde(default)]
    pub confianza: Confidence,
    #[serde(default)]
    pub t_inicio_ms: Option<i64>,
    #[serde(default)]
    pub t_fin_ms: Option<i64>,
    pub timestamp_evento: String,
    #[serde(default)]
    pub procesado: bool,
    #[serde(default)]
    pub subclip_path: Option<String>,
    #[serde(default)]
    pub subclip_duracion_sec: Option<f64>,
}

impl EventData {
    /// The `YYYY-MM-DD` prefix of `timestamp_evento`.
    pub fn day(&self) -> &str {
        self.timestamp_evento
            .get(..10)
            .unwrap_or(&self.timestamp_evento)
    }
}

/// Detector confidence as sent by the API.
///
/// The API sends `confianza` as a decimal string on some endpoints and
/// as a number on others. A null or absent value is [`Confidence::Missing`];
/// text that is not a finite number is [`Confidence::Unreadable`]. Reports
/// treat the two differently.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Confidence {
    #[default]
    Missing,
    Value(f64),
    Unreadable,
}

impl Confidence {
    pub fn value(self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(v),
            Self::Missing | Self::Unreadable => None,
        }
    }

    /// Value for per-day means: anything without a number counts as zero.
    pub fn or_zero(self) -> f64 {
        self.value().unwrap_or(0.0)
    }

    /// Value for the overall mean: missing counts as zero, unreadable
    /// text is left out.
    pub fn for_overall_mean(self) -> Option<f64> {
        match self {
            Self::Missing => Some(0.0),
            Self::Value(v) => Some(v),
            Self::Unreadable => None,
        }
    }
}

impl From<f64> for Confidence {
    fn from(v: f64) -> Self {
        if v.is_finite() {
            Self::Value(v)
        } else {
            Self::Unreadable
        }
    }
}

impl Serialize for Confidence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.value() {
            Some(v) => serializer.serialize_f64(v),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Confidence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
            Other(IgnoredAny),
        }

        Ok(match Option::<Raw>::deserialize(deserializer)? {
            None => Self::Missing,
            Some(Raw::Number(n)) => Self::from(n),
            Some(Raw::Text(s)) => s
                .trim()
                .parse::<f64>()
                .map_or(Self::Unreadable, Self::from),
            Some(Raw::Other(_)) => Self::Unreadable,
        })
    }
}

/// Optional filters for `GET /api/eventos`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub id_conexion: Option<DbId>,
}

impl EventQuery {
    /// Page used by the history view for a single connection.
    pub fn for_connection(id_conexion: DbId) -> Self {
        Self {
            limit: Some(200),
            offset: Some(0),
            id_conexion: Some(id_conexion),
        }
    }

    /// Query pairs in a stable order.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        if let Some(id) = self.id_conexion {
            pairs.push(("id_conexion", id.to_string()));
        }
        pairs
    }
}

/// Inference log written next to each event's subclip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    pub camera_id: String,
    pub event_start_time: String,
    pub event_end_time: String,
    pub video_file: String,
    pub log_file: String,
    pub video_path: String,
    pub log_path: String,
    pub total_logs: u32,
    #[serde(default)]
    pub logs: Vec<EventLogEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub timestamp_ms: i64,
    pub probabilities: BTreeMap<String, f64>,
}

impl EventLogEntry {
    /// Class with the highest probability in this sample.
    pub fn top_class(&self) -> Option<(&str, f64)> {
        self.top_classes(1).into_iter().next()
    }

    /// The `n` most probable classes, highest first.
    pub fn top_classes(&self, n: usize) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .probabilities
            .iter()
            .map(|(k, v)| (k.as_str(), *v))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}
