//! Statistics over recorded study time.
//!
//! All functions take anything [`Timed`] and work in seconds; study logs
//! convert their stored minutes on the way in.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::log::StudyLog;
use crate::session::FocusNode;

/// Rendered in place of a subject name when nothing has been recorded.
pub const NO_SUBJECT: &str = "N/A";

/// A record with a subject and an amount of study time.
pub trait Timed {
    fn subject_name(&self) -> &str;
    fn duration_secs(&self) -> u64;
    /// When the record was made, if known.
    fn recorded_at(&self) -> Option<DateTime<Utc>>;
}

impl Timed for FocusNode {
    fn subject_name(&self) -> &str {
        &self.subject().name
    }

    fn duration_secs(&self) -> u64 {
        Self::duration_secs(self)
    }

    fn recorded_at(&self) -> Option<DateTime<Utc>> {
        Some(self.end_time())
    }
}

impl Timed for StudyLog {
    fn subject_name(&self) -> &str {
        &self.subject
    }

    fn duration_secs(&self) -> u64 {
        Self::duration_secs(self)
    }

    fn recorded_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

/// Study time for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectTotal {
    pub subject: String,
    pub secs: u64,
}

impl SubjectTotal {
    /// Percentage of `total`, rounded down. Zero when `total` is zero.
    pub const fn share_of(&self, total: u64) -> u64 {
        if total == 0 { 0 } else { self.secs * 100 / total }
    }
}

pub fn total_duration<T: Timed>(entries: &[T]) -> u64 {
    entries.iter().map(Timed::duration_secs).sum()
}

/// Summed time per subject, in order of first appearance.
pub fn breakdown_by_subject<T: Timed>(entries: &[T]) -> Vec<SubjectTotal> {
    let mut totals: Vec<SubjectTotal> = Vec::new();
    for entry in entries {
        let name = entry.subject_name();
        if let Some(total) = totals.iter_mut().find(|t| t.subject == name) {
            total.secs += entry.duration_secs();
        } else {
            totals.push(SubjectTotal {
                subject: name.to_string(),
                secs: entry.duration_secs(),
            });
        }
    }
    totals
}

/// Subject with the most time. Ties go to the subject seen first.
pub fn most_studied<T: Timed>(entries: &[T]) -> Option<String> {
    breakdown_by_subject(entries)
        .into_iter()
        .reduce(|best, next| if next.secs > best.secs { next } else { best })
        .map(|total| total.subject)
}

/// Consecutive days with at least one record, counting back from `today`.
///
/// A streak still counts if today has nothing yet but yesterday does.
pub fn day_streak<T: Timed>(entries: &[T], today: NaiveDate) -> u32 {
    let mut days: Vec<NaiveDate> = entries
        .iter()
        .filter_map(Timed::recorded_at)
        .map(|at| at.date_naive())
        .filter(|day| *day <= today)
        .collect();
    days.sort_unstable();
    days.dedup();

    let Some(&latest) = days.last() else {
        return 0;
    };
    let Some(yesterday) = today.pred_opt() else {
        return 0;
    };
    if latest != today && latest != yesterday {
        return 0;
    }

    let mut streak = 0;
    let mut expected = latest;
    for day in days.iter().rev() {
        if *day != expected {
            break;
        }
        streak += 1;
        match expected.pred_opt() {
            Some(prev) => expected = prev,
            None => break,
        }
    }
    streak
}

/// Formats seconds as `"Xh Ym"`, or `"Ym"` under an hour.
pub fn format_duration(secs: u64) -> String {
    let total_minutes = secs / 60;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Dashboard figures for a set of records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_secs: u64,
    pub sessions: usize,
    pub most_studied: Option<String>,
    pub streak_days: u32,
    pub subjects: Vec<SubjectTotal>,
}

impl Summary {
    pub fn from_entries<T: Timed>(entries: &[T], today: NaiveDate) -> Self {
        Self {
            total_secs: total_duration(entries),
            sessions: entries.len(),
            most_studied: most_studied(entries),
            streak_days: day_streak(entries, today),
            subjects: breakdown_by_subject(entries),
        }
    }

    pub fn most_studied_label(&self) -> &str {
        self.most_studied.as_deref().unwrap_or(NO_SUBJECT)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::types::UserId;

    fn log(subject: &str, minutes: u32, day: u32) -> StudyLog {
        StudyLog {
            id: None,
            user_id: UserId::new("user-1").unwrap(),
            subject: subject.to_string(),
            duration_minutes: minutes,
            notes: None,
            created_at: Some(Utc.with_ymd_and_hms(2025, 2, day, 12, 0, 0).unwrap()),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 10).unwrap()
    }

    #[test]
    fn test_total_and_breakdown_agree() {
        let logs = vec![
            log("Mathematics", 30, 8),
            log("Physics", 45, 9),
            log("Mathematics", 15, 10),
        ];
        let breakdown = breakdown_by_subject(&logs);
        assert_eq!(
            breakdown,
            vec![
                SubjectTotal {
                    subject: "Mathematics".to_string(),
                    secs: 2700
                },
                SubjectTotal {
                    subject: "Physics".to_string(),
                    secs: 2700
                },
            ]
        );
        let sum: u64 = breakdown.iter().map(|t| t.secs).sum();
        assert_eq!(sum, total_duration(&logs));
        assert_eq!(total_duration(&logs), 5400);
    }

    #[test]
    fn test_most_studied_tie_goes_to_first() {
        let logs = vec![log("Mathematics", 30, 8), log("Physics", 30, 9)];
        assert_eq!(most_studied(&logs).as_deref(), Some("Mathematics"));

        let logs = vec![log("Mathematics", 30, 8), log("Physics", 31, 9)];
        assert_eq!(most_studied(&logs).as_deref(), Some("Physics"));
    }

    #[test]
    fn test_most_studied_edges() {
        let empty: Vec<StudyLog> = Vec::new();
        assert_eq!(most_studied(&empty), None);
        assert_eq!(Summary::from_entries(&empty, today()).most_studied_label(), "N/A");

        let single = vec![log("Chemistry", 5, 10)];
        assert_eq!(most_studied(&single).as_deref(), Some("Chemistry"));
    }

    #[test]
    fn test_day_streak() {
        let logs = vec![log("A", 10, 7), log("A", 10, 8), log("B", 10, 9), log("A", 10, 10)];
        assert_eq!(day_streak(&logs, today()), 4);

        // Nothing yet today: the streak through yesterday still counts.
        let logs = vec![log("A", 10, 8), log("A", 10, 9)];
        assert_eq!(day_streak(&logs, today()), 2);

        // A gap breaks it.
        let logs = vec![log("A", 10, 6), log("A", 10, 9), log("A", 10, 10)];
        assert_eq!(day_streak(&logs, today()), 2);

        let logs = vec![log("A", 10, 5)];
        assert_eq!(day_streak(&logs, today()), 0);
    }

    #[test]
    fn test_share_of() {
        let total = SubjectTotal {
            subject: "A".to_string(),
            secs: 30,
        };
        assert_eq!(total.share_of(120), 25);
        assert_eq!(total.share_of(0), 0);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0m");
        assert_eq!(format_duration(59), "0m");
        assert_eq!(format_duration(1500), "25m");
        assert_eq!(format_duration(3600), "1h 0m");
        assert_eq!(format_duration(5400), "1h 30m");
    }

    #[test]
    fn test_summary_from_entries() {
        let logs = vec![log("Physics", 45, 9), log("Mathematics", 90, 10)];
        let summary = Summary::from_entries(&logs, today());
        assert_eq!(summary.total_secs, 8100);
        assert_eq!(summary.sessions, 2);
        assert_eq!(summary.most_studied_label(), "Mathematics");
        assert_eq!(summary.streak_days, 2);
        assert_eq!(summary.subjects.len(), 2);
    }
}
