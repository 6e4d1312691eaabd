//! The session recorder and log store.
//!
//! [`LogStore`] owns the local list of study logs and talks to an injected
//! [`Backend`]. Every backend failure leaves the local list exactly as it was
//! before the call; nothing is retried.

use std::error::Error as StdError;

use thiserror::Error;

use crate::log::{NewStudyLog, StudyLog};
use crate::session::FocusNode;
use crate::types::{LogId, UserId, ValidationError};

/// The hosted persistence and authentication collaborator.
pub trait Backend {
    type Error: StdError + Send + Sync + 'static;

    /// The signed-in user, if any.
    fn current_user(&self) -> Result<Option<UserId>, Self::Error>;

    /// Inserts a row and returns it as stored (with ID and creation time).
    fn insert_log(&mut self, log: &NewStudyLog) -> Result<StudyLog, Self::Error>;

    /// All logs for `user`, newest first by creation time.
    fn list_logs(&self, user: &UserId) -> Result<Vec<StudyLog>, Self::Error>;

    /// Deletes one of `user`'s rows. Returns `false` if `user` owns no such row.
    fn delete_log(&mut self, user: &UserId, id: &LogId) -> Result<bool, Self::Error>;
}

/// Log store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("not signed in; study sessions are only saved for signed-in users")]
    NotAuthenticated,

    #[error("backend request failed: {0}")]
    Persistence(#[source] Box<dyn StdError + Send + Sync>),
}

/// Result of a delete request. Deleting an absent log is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

pub struct LogStore<B> {
    backend: B,
    logs: Vec<StudyLog>,
}

impl<B: Backend> LogStore<B> {
    pub const fn new(backend: B) -> Self {
        Self {
            backend,
            logs: Vec::new(),
        }
    }

    pub const fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Local logs, newest first.
    pub fn logs(&self) -> &[StudyLog] {
        &self.logs
    }

    /// Reloads the local list from the backend.
    pub fn refresh(&mut self) -> Result<usize, StoreError> {
        let user = self.require_user()?;
        let mut logs = self
            .backend
            .list_logs(&user)
            .map_err(persistence_failure("list logs"))?;
        logs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        tracing::debug!(count = logs.len(), user = %user, "study logs refreshed");
        self.logs = logs;
        Ok(self.logs.len())
    }

    /// Persists a completed timer session.
    pub fn record_from_session(&mut self, node: &FocusNode) -> Result<&StudyLog, StoreError> {
        let user = self.require_user()?;
        let log = NewStudyLog::from_session(user, node);
        tracing::debug!(
            session = %node.id(),
            duration_secs = node.duration_secs(),
            duration_minutes = log.duration_minutes,
            "recording session"
        );
        self.insert(&log)
    }

    /// Persists a manually entered study record.
    pub fn add_manual(
        &mut self,
        subject: &str,
        duration_minutes: u32,
        notes: Option<String>,
    ) -> Result<&StudyLog, StoreError> {
        let user = self.require_user()?;
        let log = NewStudyLog::manual(user, subject, duration_minutes, notes)?;
        self.insert(&log)
    }

    pub fn delete(&mut self, id: &LogId) -> Result<DeleteOutcome, StoreError> {
        let user = self.require_user()?;
        let existed = self
            .backend
            .delete_log(&user, id)
            .map_err(persistence_failure("delete log"))?;
        self.logs.retain(|log| log.id.as_ref() != Some(id));
        if existed {
            tracing::debug!(log = %id, "study log deleted");
            Ok(DeleteOutcome::Deleted)
        } else {
            tracing::debug!(log = %id, "study log already absent");
            Ok(DeleteOutcome::NotFound)
        }
    }

    fn insert(&mut self, log: &NewStudyLog) -> Result<&StudyLog, StoreError> {
        let stored = self
            .backend
            .insert_log(log)
            .map_err(persistence_failure("insert log"))?;
        self.logs.insert(0, stored);
        Ok(&self.logs[0])
    }

    fn require_user(&self) -> Result<UserId, StoreError> {
        self.backend
            .current_user()
            .map_err(persistence_failure("resolve current user"))?
            .ok_or(StoreError::NotAuthenticated)
    }
}

fn persistence_failure<E>(action: &'static str) -> impl FnOnce(E) -> StoreError
where
    E: StdError + Send + Sync + 'static,
{
    move |err| {
        tracing::warn!(error = %err, action, "backend request failed; local state unchanged");
        StoreError::Persistence(Box::new(err))
    }
}
