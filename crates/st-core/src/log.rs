//! Persisted study log entries.
//!
//! Logs store whole minutes while the rest of the core counts seconds. All
//! conversion happens here, at the storage boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::FocusNode;
use crate::types::{LogId, UserId, ValidationError};

/// A study record as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyLog {
    /// Assigned by the backend; absent until persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<LogId>,
    pub user_id: UserId,
    pub subject: String,
    /// Whole minutes.
    #[serde(rename = "duration")]
    pub duration_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl StudyLog {
    pub fn duration_secs(&self) -> u64 {
        u64::from(self.duration_minutes) * 60
    }
}

/// Insert payload for a new log row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudyLog {
    pub user_id: UserId,
    pub subject: String,
    pub duration_minutes: u32,
    pub notes: Option<String>,
}

impl NewStudyLog {
    /// Builds a manual entry, rejecting a blank subject or a zero duration.
    pub fn manual(
        user_id: UserId,
        subject: &str,
        duration_minutes: u32,
        notes: Option<String>,
    ) -> Result<Self, ValidationError> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(ValidationError::Empty { field: "subject" });
        }
        if duration_minutes == 0 {
            return Err(ValidationError::ZeroDuration { field: "duration" });
        }
        let notes = notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        Ok(Self {
            user_id,
            subject: subject.to_string(),
            duration_minutes,
            notes,
        })
    }

    /// Converts a completed session, rounding its seconds to whole minutes.
    pub fn from_session(user_id: UserId, node: &FocusNode) -> Self {
        Self {
            user_id,
            subject: node.subject().name.clone(),
            duration_minutes: minutes_from_secs(node.duration_secs()),
            notes: Some(format!("{} session", node.mode())),
        }
    }
}

/// Rounds seconds to the nearest whole minute, halves rounding up.
pub fn minutes_from_secs(secs: u64) -> u32 {
    u32::try_from(secs.saturating_add(30) / 60).unwrap_or(u32::MAX)
}
