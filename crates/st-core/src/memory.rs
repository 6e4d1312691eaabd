//! In-process [`Backend`] used in tests and for offline runs.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::log::{NewStudyLog, StudyLog};
use crate::store::Backend;
use crate::types::{LogId, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("backend unavailable")]
pub struct Unavailable;

/// Rows held in a `Vec`. Creation times advance one second per insert so
/// ordering is deterministic.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    user: Option<UserId>,
    rows: Vec<StudyLog>,
    next_id: u64,
    next_created_at: DateTime<Utc>,
    failing: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            user: None,
            rows: Vec::new(),
            next_id: 1,
            next_created_at: Utc::now(),
            failing: false,
        }
    }

    pub fn signed_in(user: UserId) -> Self {
        let mut backend = Self::new();
        backend.user = Some(user);
        backend
    }

    pub fn sign_in(&mut self, user: UserId) {
        self.user = Some(user);
    }

    pub fn sign_out(&mut self) {
        self.user = None;
    }

    /// When set, every call fails with [`Unavailable`].
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    const fn check(&self) -> Result<(), Unavailable> {
        if self.failing { Err(Unavailable) } else { Ok(()) }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for MemoryBackend {
    type Error = Unavailable;

    fn current_user(&self) -> Result<Option<UserId>, Self::Error> {
        self.check()?;
        Ok(self.user.clone())
    }

    fn insert_log(&mut self, log: &NewStudyLog) -> Result<StudyLog, Self::Error> {
        self.check()?;
        let id = LogId::new(format!("log-{}", self.next_id)).map_err(|_| Unavailable)?;
        self.next_id += 1;
        let created_at = self.next_created_at;
        self.next_created_at += Duration::seconds(1);

        let row = StudyLog {
            id: Some(id),
            user_id: log.user_id.clone(),
            subject: log.subject.clone(),
            duration_minutes: log.duration_minutes,
            notes: log.notes.clone(),
            created_at: Some(created_at),
        };
        self.rows.push(row.clone());
        Ok(row)
    }

    fn list_logs(&self, user: &UserId) -> Result<Vec<StudyLog>, Self::Error> {
        self.check()?;
        let mut logs: Vec<_> = self
            .rows
            .iter()
            .filter(|row| &row.user_id == user)
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(logs)
    }

    fn delete_log(&mut self, user: &UserId, id: &LogId) -> Result<bool, Self::Error> {
        self.check()?;
        let before = self.rows.len();
        self.rows
            .retain(|row| row.id.as_ref() != Some(id) || &row.user_id != user);
        Ok(self.rows.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_assigns_ids_and_times() {
        let user = UserId::new("user-1").unwrap();
        let mut backend = MemoryBackend::signed_in(user.clone());
        let log = NewStudyLog::manual(user.clone(), "Physics", 30, None).unwrap();

        let first = backend.insert_log(&log).unwrap();
        let second = backend.insert_log(&log).unwrap();
        assert_ne!(first.id, second.id);
        assert!(second.created_at > first.created_at);

        let listed = backend.list_logs(&user).unwrap();
        assert_eq!(listed[0].id, second.id);
    }

    #[test]
    fn test_failing_backend() {
        let mut backend = MemoryBackend::new();
        backend.set_failing(true);
        assert_eq!(backend.current_user(), Err(Unavailable));
    }
}
