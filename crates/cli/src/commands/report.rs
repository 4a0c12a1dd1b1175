//! Daily event report with optional CSV export.

use std::fmt::Write as _;

use anyhow::Context as _;
use sentinel_core::access::Access;
use sentinel_core::reports::{default_range, EventReport};

use super::Output;
use crate::cli::ReportArgs;
use crate::context::AppContext;

/// Width of the longest bar in the daily chart.
const BAR_WIDTH: u32 = 40;

pub async fn run(ctx: &AppContext, out: Output, args: ReportArgs) -> anyhow::Result<()> {
    ctx.require(Access::Private)?;

    let events = ctx.events().list().await?;
    let (default_from, default_to) = match default_range(&events) {
        Some((from, to)) => (Some(from), Some(to)),
        None => (None, None),
    };
    let report = EventReport::build(
        &events,
        args.from.or(default_from),
        args.to.or(default_to),
    );

    out.emit(&report, |report| print!("{}", render(report)))?;

    if let Some(dir) = args.csv {
        let Some(csv) = report.to_csv() else {
            println!("Nothing to export for this range");
            return Ok(());
        };
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("could not create {}", dir.display()))?;
        let path = dir.join(report.file_name());
        std::fs::write(&path, csv).with_context(|| format!("could not write {}", path.display()))?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

/// Text rendering: summary block followed by one bar per day.
pub(crate) fn render(report: &EventReport) -> String {
    let mut s = String::new();
    let range = |d: Option<chrono::NaiveDate>, open: &str| {
        d.map_or_else(|| open.to_string(), |d| d.to_string())
    };
    let summary = &report.summary;

    let _ = writeln!(
        s,
        "Events {} .. {}",
        range(report.from, "start"),
        range(report.to, "end")
    );
    let _ = writeln!(s, "  total events    {}", summary.total_events);
    let _ = writeln!(s, "  days            {}", summary.total_days);
    let _ = writeln!(s, "  avg per day     {:.2}", summary.avg_per_day);
    let _ = writeln!(s, "  avg confidence  {:.1}%", summary.avg_confidence * 100.0);
    for (tipo, count) in &summary.by_type {
        let _ = writeln!(s, "  {tipo:<16}{count}");
    }

    if report.rows.is_empty() {
        let _ = writeln!(s, "No events in this range");
        return s;
    }

    let max = report.max_daily();
    s.push('\n');
    for row in &report.rows {
        let len = (row.total * BAR_WIDTH).div_ceil(max) as usize;
        let _ = writeln!(
            s,
            "{}  {:>4}  {:<width$}  {:.3}",
            row.date,
            row.total,
            "#".repeat(len),
            row.avg_confidence,
            width = BAR_WIDTH as usize
        );
    }
    s
}
