//! Completed focus sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::subject::Subject;
use crate::types::{Mode, SessionId};

/// One completed timer session.
///
/// Produced only by the timer engine. The subject is copied by value so later
/// edits to the registry never change recorded history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusNode {
    id: SessionId,
    subject: Subject,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    /// Focused time in seconds, excluding pauses.
    duration: u64,
    mode: Mode,
}

impl FocusNode {
    pub(crate) fn new(
        subject: Subject,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        duration_secs: u64,
        mode: Mode,
    ) -> Self {
        Self {
            id: SessionId::generate(),
            subject,
            start_time,
            end_time,
            duration: duration_secs,
            mode,
        }
    }

    pub const fn id(&self) -> &SessionId {
        &self.id
    }

    pub const fn subject(&self) -> &Subject {
        &self.subject
    }

    pub const fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub const fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    pub const fn duration_secs(&self) -> u64 {
        self.duration
    }

    pub const fn mode(&self) -> Mode {
        self.mode
    }
}
