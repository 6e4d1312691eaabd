//! Study log commands: `st log add | list | delete`.

use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;
use st_core::{DeleteOutcome, LogId, LogStore, StudyLog, format_duration};
use st_db::Database;

// ========== Human-Readable Output ==========

/// Format logs for human-readable output, newest first.
pub fn format_logs(logs: &[StudyLog]) -> String {
    use std::fmt::Write;

    let mut output = String::new();

    if logs.is_empty() {
        writeln!(output, "No study logs yet.").unwrap();
        writeln!(output).unwrap();
        writeln!(
            output,
            "Hint: Run 'st timer --subject <name>' or 'st log add' to record one."
        )
        .unwrap();
        return output;
    }

    writeln!(
        output,
        "{:<36}  {:<16}  {:<20}  {:>8}  Notes",
        "ID", "When", "Subject", "Duration"
    )
    .unwrap();

    for log in logs {
        let id = log.id.as_ref().map_or("-", LogId::as_str);
        let when = log
            .created_at
            .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string());
        let subject = truncate(&log.subject, 20);
        let notes = log.notes.as_deref().unwrap_or("");
        let line = format!(
            "{:<36}  {:<16}  {:<20}  {:>8}  {}",
            id,
            when,
            subject,
            format_duration(log.duration_secs()),
            notes
        );
        writeln!(output, "{}", line.trim_end()).unwrap();
    }

    output
}

/// Truncate by characters, not bytes, so multi-byte names never split.
fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() > max {
        format!("{}...", value.chars().take(max - 3).collect::<String>())
    } else {
        value.to_string()
    }
}

// ========== JSON Output ==========

#[derive(Debug, Serialize)]
pub struct JsonLogs<'a> {
    pub logs: &'a [StudyLog],
    pub total_minutes: u64,
}

pub fn format_logs_json(logs: &[StudyLog]) -> Result<String> {
    let total_minutes = logs.iter().map(|l| u64::from(l.duration_minutes)).sum();
    Ok(serde_json::to_string_pretty(&JsonLogs {
        logs,
        total_minutes,
    })?)
}

// ========== Public Interface ==========

pub fn add<W: Write>(
    writer: &mut W,
    db: Database,
    subject: &str,
    minutes: u32,
    notes: Option<String>,
) -> Result<()> {
    let mut store = LogStore::new(db);
    let log = store
        .add_manual(subject, minutes, notes)
        .context("failed to add study log")?;

    writeln!(
        writer,
        "Logged {} of {} ({})",
        format_duration(log.duration_secs()),
        log.subject,
        log.id.as_ref().map_or("-", LogId::as_str)
    )?;
    Ok(())
}

pub fn list<W: Write>(writer: &mut W, db: Database, json: bool) -> Result<()> {
    let mut store = LogStore::new(db);
    store.refresh().context("failed to load study logs")?;

    if json {
        writeln!(writer, "{}", format_logs_json(store.logs())?)?;
    } else {
        write!(writer, "{}", format_logs(store.logs()))?;
    }
    Ok(())
}

pub fn delete<W: Write>(writer: &mut W, db: Database, id: &str) -> Result<()> {
    let id = LogId::new(id)?;
    let mut store = LogStore::new(db);
    match store.delete(&id).context("failed to delete study log")? {
        DeleteOutcome::Deleted => writeln!(writer, "Deleted log {id}")?,
        DeleteOutcome::NotFound => writeln!(writer, "No log with ID {id}; nothing to delete.")?,
    }
    Ok(())
}
