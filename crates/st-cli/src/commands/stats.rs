//! Stats command: totals, most studied subject, streak and per-subject breakdown.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use st_core::{LogStore, Summary, format_duration};
use st_db::Database;

// ========== Progress Bar ==========

/// Generates a 10-character progress bar.
/// Values <5% of max get a single block for visibility.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn progress_bar(value: u64, max: u64) -> String {
    if max == 0 {
        return "░░░░░░░░░░".to_string();
    }

    let ratio = value as f64 / max as f64;
    let filled = if ratio < 0.05 && value > 0 {
        1
    } else {
        (ratio * 10.0).round().min(10.0) as usize
    };

    let empty = 10 - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

// ========== Human-Readable Output ==========

pub fn format_stats(summary: &Summary) -> String {
    let mut output = String::new();

    writeln!(output, "STUDY STATS").unwrap();
    writeln!(output).unwrap();
    writeln!(
        output,
        "Total study time:  {}",
        format_duration(summary.total_secs)
    )
    .unwrap();
    writeln!(output, "Subjects covered:  {}", summary.subjects.len()).unwrap();
    writeln!(output, "Most studied:      {}", summary.most_studied_label()).unwrap();
    writeln!(output, "Sessions:          {}", summary.sessions).unwrap();
    let unit = if summary.streak_days == 1 { "day" } else { "days" };
    writeln!(
        output,
        "Day streak:        {} {unit}",
        summary.streak_days
    )
    .unwrap();

    if summary.subjects.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "No study time recorded yet.").unwrap();
        return output;
    }

    writeln!(output).unwrap();
    writeln!(output, "BY SUBJECT").unwrap();
    let max = summary.subjects.iter().map(|s| s.secs).max().unwrap_or(0);
    for entry in &summary.subjects {
        writeln!(
            output,
            "{:<20}  {:>8}  {}  {:>3}%",
            entry.subject,
            format_duration(entry.secs),
            progress_bar(entry.secs, max),
            entry.share_of(summary.total_secs)
        )
        .unwrap();
    }

    output
}

// ========== JSON Output ==========

#[derive(Debug, Serialize)]
pub struct JsonStats<'a> {
    #[serde(flatten)]
    pub summary: &'a Summary,
    pub total: String,
    pub generated_for: NaiveDate,
}

pub fn format_stats_json(summary: &Summary, today: NaiveDate) -> Result<String> {
    Ok(serde_json::to_string_pretty(&JsonStats {
        summary,
        total: format_duration(summary.total_secs),
        generated_for: today,
    })?)
}

// ========== Public Interface ==========

pub fn run<W: Write>(writer: &mut W, db: Database, json: bool) -> Result<()> {
    // Records carry UTC timestamps, so days are counted in UTC
    let today = Utc::now().date_naive();
    let mut store = LogStore::new(db);
    store.refresh().context("failed to load study logs")?;
    let summary = Summary::from_entries(store.logs(), today);
    tracing::debug!(
        logs = summary.sessions,
        total_secs = summary.total_secs,
        "computed stats"
    );

    if json {
        writeln!(writer, "{}", format_stats_json(&summary, today)?)?;
    } else {
        write!(writer, "{}", format_stats(&summary))?;
    }
    Ok(())
}
