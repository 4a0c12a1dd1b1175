//! Event reports: date-range filtering, per-day aggregation and CSV export.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::event::EventData;

/// Bucket for events without a type.
pub const UNKNOWN_EVENT_TYPE: &str = "desconocido";

pub const CSV_HEADER: &str = "fecha,total_eventos,promedio_confianza,detalle_por_tipo";

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// Aggregates for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRow {
    /// `YYYY-MM-DD`.
    pub date: String,
    pub total: u32,
    pub by_type: BTreeMap<String, u32>,
    /// Mean confidence; events without a confidence count as zero.
    pub avg_confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub total_events: usize,
    pub total_days: usize,
    pub avg_per_day: f64,
    pub by_type: BTreeMap<String, u32>,
    /// Mean confidence; missing values count as zero, unreadable text is
    /// left out.
    pub avg_confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventReport {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub rows: Vec<DailyRow>,
    pub summary: ReportSummary,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

fn type_key(event: &EventData) -> String {
    if event.tipo_evento.is_empty() {
        UNKNOWN_EVENT_TYPE.to_string()
    } else {
        event.tipo_evento.to_lowercase()
    }
}

fn event_date(event: &EventData) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(event.day(), "%Y-%m-%d").ok()
}

/// Earliest and latest event day, used as the initial report range.
pub fn default_range(events: &[EventData]) -> Option<(NaiveDate, NaiveDate)> {
    let mut dates = events.iter().filter_map(event_date);
    let first = dates.next()?;
    Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
}

/// Keep events whose day falls inside `from..=to`.
///
/// Events with an unparseable timestamp are never excluded by a bound.
pub fn filter_by_range<'a>(
    events: &'a [EventData],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<&'a EventData> {
    events
        .iter()
        .filter(|e| match event_date(e) {
            Some(d) => from.map_or(true, |f| d >= f) && to.map_or(true, |t| d <= t),
            None => true,
        })
        .collect()
}

/// Group events by day, sorted by date.
pub fn daily_rows(events: &[&EventData]) -> Vec<DailyRow> {
    struct Acc {
        total: u32,
        by_type: BTreeMap<String, u32>,
        sum_conf: f64,
    }

    let mut days: BTreeMap<String, Acc> = BTreeMap::new();
    for event in events {
        let acc = days.entry(event.day().to_string()).or_insert(Acc {
            total: 0,
            by_type: BTreeMap::new(),
            sum_conf: 0.0,
        });
        acc.total += 1;
        *acc.by_type.entry(type_key(event)).or_insert(0) += 1;
        acc.sum_conf += event.confianza.or_zero();
    }

    days.into_iter()
        .map(|(date, acc)| DailyRow {
            date,
            total: acc.total,
            by_type: acc.by_type,
            avg_confidence: acc.sum_conf / f64::from(acc.total),
        })
        .collect()
}

pub fn summarize(events: &[&EventData], rows: &[DailyRow]) -> ReportSummary {
    let mut by_type = BTreeMap::new();
    for event in events {
        *by_type.entry(type_key(event)).or_insert(0) += 1;
    }

    let confidences: Vec<f64> = events
        .iter()
        .filter_map(|e| e.confianza.for_overall_mean())
        .collect();
    let avg_confidence = if confidences.is_empty() {
        0.0
    } else {
        confidences.iter().sum::<f64>() / confidences.len() as f64
    };

    let total_days = rows.len();
    let avg_per_day = if total_days == 0 {
        0.0
    } else {
        events.len() as f64 / total_days as f64
    };

    ReportSummary {
        total_events: events.len(),
        total_days,
        avg_per_day,
        by_type,
        avg_confidence,
    }
}

impl EventReport {
    pub fn build(events: &[EventData], from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        let filtered = filter_by_range(events, from, to);
        let rows = daily_rows(&filtered);
        let summary = summarize(&filtered, &rows);
        Self {
            from,
            to,
            rows,
            summary,
        }
    }

    /// Build over the full span of the given events.
    pub fn build_full(events: &[EventData]) -> Self {
        match default_range(events) {
            Some((from, to)) => Self::build(events, Some(from), Some(to)),
            None => Self::build(events, None, None),
        }
    }

    /// Tallest daily bar, floored at one so bar widths never divide by zero.
    pub fn max_daily(&self) -> u32 {
        self.rows.iter().map(|r| r.total).max().unwrap_or(0).max(1)
    }

    /// CSV export, or `None` when there is nothing to export.
    pub fn to_csv(&self) -> Option<String> {
        if self.rows.is_empty() {
            return None;
        }

        let mut lines = vec![CSV_HEADER.to_string()];
        for row in &self.rows {
            let detail = row
                .by_type
                .iter()
                .map(|(tipo, count)| format!("{tipo}:{count}"))
                .collect::<Vec<_>>()
                .join(";");
            lines.push(format!(
                "{},{},{:.3},\"{}\"",
                row.date, row.total, row.avg_confidence, detail
            ));
        }
        Some(lines.join("\n"))
    }

    pub fn file_name(&self) -> String {
        let from = self.from.map_or_else(|| "inicio".to_string(), |d| d.to_string());
        let to = self.to.map_or_else(|| "fin".to_string(), |d| d.to_string());
        format!("reporte_eventos_{from}_{to}.csv")
    }
}
