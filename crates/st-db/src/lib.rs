//! Storage layer for the study tracker.
//!
//! Provides local accounts, study logs and subjects using `rusqlite`, and
//! implements [`st_core::Backend`] so a [`LogStore`](st_core::LogStore) can
//! persist through it.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in RFC 3339 format with millisecond precision
//! (e.g., `2025-02-05T11:22:53.000Z`), so lexicographic ordering matches
//! chronological ordering.
//!
//! ## Units
//!
//! `study_logs.duration_minutes` holds whole minutes. Session durations are
//! converted from seconds before they reach this crate.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use st_core::{
    Backend, LogId, NewStudyLog, StudyLog, Subject, SubjectId, SubjectRegistry, UserId,
    ValidationError,
};
use thiserror::Error;
use uuid::Uuid;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Input rejected before touching the database.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A stored row no longer passes validation.
    #[error("invalid {table} row {id}: {source}")]
    InvalidRow {
        table: &'static str,
        id: String,
        #[source]
        source: ValidationError,
    },
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp for {id}: {timestamp}")]
    TimestampParse {
        id: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("username already taken: {0}")]
    UsernameTaken(String),
    #[error("no account named {0}; run 'st auth sign-up {0}' first")]
    UnknownUser(String),
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// A local account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub created_at: String,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The schema is initialized and default subjects seeded on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            );

            -- At most one signed-in user per database.
            CREATE TABLE IF NOT EXISTS auth_session (
                slot INTEGER PRIMARY KEY CHECK (slot = 1),
                user_id TEXT NOT NULL,
                signed_in_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );

            -- duration_minutes: whole minutes
            -- created_at: RFC 3339, millisecond precision
            CREATE TABLE IF NOT EXISTS study_logs (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                subject TEXT NOT NULL,
                duration_minutes INTEGER NOT NULL,
                notes TEXT,
                created_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_study_logs_user_created
                ON study_logs(user_id, created_at);

            CREATE TABLE IF NOT EXISTS subjects (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                color TEXT NOT NULL,
                position INTEGER NOT NULL
            );
            ",
        )?;

        let subject_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM subjects", [], |row| row.get(0))?;
        if subject_count == 0 {
            insert_subjects(&self.conn, SubjectRegistry::with_defaults().as_slice())?;
            tracing::debug!("seeded default subjects");
        }
        Ok(())
    }

    // ========== Accounts ==========

    /// Creates an account and signs it in.
    pub fn sign_up(&mut self, username: &str) -> Result<User, DbError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ValidationError::Empty { field: "username" }.into());
        }
        if self.find_user(username)?.is_some() {
            return Err(DbError::UsernameTaken(username.to_string()));
        }

        let user = User {
            id: UserId::new(Uuid::new_v4().to_string())?,
            username: username.to_string(),
            created_at: format_timestamp(Utc::now()),
        };
        self.conn.execute(
            "INSERT INTO users (id, username, created_at) VALUES (?, ?, ?)",
            params![user.id.as_str(), user.username, user.created_at],
        )?;
        tracing::info!(user = %user.id, username = %user.username, "account created");
        self.set_session(&user.id)?;
        Ok(user)
    }

    /// Signs in an existing account, replacing any current session.
    pub fn sign_in(&mut self, username: &str) -> Result<User, DbError> {
        let username = username.trim();
        let user = self
            .find_user(username)?
            .ok_or_else(|| DbError::UnknownUser(username.to_string()))?;
        self.set_session(&user.id)?;
        tracing::info!(user = %user.id, username = %user.username, "signed in");
        Ok(user)
    }

    /// Ends the current session. Returns whether anyone was signed in.
    pub fn sign_out(&mut self) -> Result<bool, DbError> {
        let removed = self.conn.execute("DELETE FROM auth_session", [])?;
        Ok(removed > 0)
    }

    pub fn signed_in_user(&self) -> Result<Option<User>, DbError> {
        self.conn
            .query_row(
                "
                SELECT u.id, u.username, u.created_at
                FROM auth_session s
                JOIN users u ON u.id = s.user_id
                WHERE s.slot = 1
                ",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?
            .map(user_from_row)
            .transpose()
    }

    fn find_user(&self, username: &str) -> Result<Option<User>, DbError> {
        self.conn
            .query_row(
                "SELECT id, username, created_at FROM users WHERE username = ?",
                [username],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?
            .map(user_from_row)
            .transpose()
    }

    fn set_session(&self, user_id: &UserId) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO auth_session (slot, user_id, signed_in_at) VALUES (1, ?, ?)",
            params![user_id.as_str(), format_timestamp(Utc::now())],
        )?;
        Ok(())
    }

    // ========== Study logs ==========

    /// Inserts a log row, assigning its ID and creation time.
    pub fn insert_study_log(&mut self, log: &NewStudyLog) -> Result<StudyLog, DbError> {
        let id = LogId::new(Uuid::new_v4().to_string())?;
        let created_at = Utc::now();
        self.conn.execute(
            "
            INSERT INTO study_logs (id, user_id, subject, duration_minutes, notes, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
            params![
                id.as_str(),
                log.user_id.as_str(),
                log.subject,
                log.duration_minutes,
                log.notes,
                format_timestamp(created_at),
            ],
        )?;
        tracing::debug!(log = %id, subject = %log.subject, minutes = log.duration_minutes, "study log inserted");
        Ok(StudyLog {
            id: Some(id),
            user_id: log.user_id.clone(),
            subject: log.subject.clone(),
            duration_minutes: log.duration_minutes,
            notes: log.notes.clone(),
            created_at: Some(truncate_to_millis(created_at)),
        })
    }

    /// Lists a user's logs, newest first.
    pub fn list_study_logs(&self, user_id: &UserId) -> Result<Vec<StudyLog>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, user_id, subject, duration_minutes, notes, created_at
            FROM study_logs
            WHERE user_id = ?
            ORDER BY created_at DESC, rowid DESC
            ",
        )?;
        let rows = stmt.query_map([user_id.as_str()], |row| {
            Ok(StudyLogRow {
                id: row.get(0)?,
                user_id: row.get(1)?,
                subject: row.get(2)?,
                duration_minutes: row.get(3)?,
                notes: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?;
        let mut logs = Vec::new();
        for row in rows {
            logs.push(row?.into_study_log()?);
        }
        Ok(logs)
    }

    /// Deletes one of `user_id`'s log rows. Returns `false` if they own no such row.
    pub fn delete_study_log(&mut self, user_id: &UserId, id: &LogId) -> Result<bool, DbError> {
        let removed = self.conn.execute(
            "DELETE FROM study_logs WHERE id = ? AND user_id = ?",
            [id.as_str(), user_id.as_str()],
        )?;
        Ok(removed > 0)
    }

    pub fn count_study_logs(&self, user_id: &UserId) -> Result<usize, DbError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM study_logs WHERE user_id = ?",
            [user_id.as_str()],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    // ========== Subjects ==========

    /// Loads the subject list in display order.
    pub fn load_subjects(&self) -> Result<SubjectRegistry, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, color FROM subjects ORDER BY position ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        let mut subjects = Vec::new();
        for row in rows {
            let (id, name, color) = row?;
            let invalid = |source| DbError::InvalidRow {
                table: "subjects",
                id: id.clone(),
                source,
            };
            let subject_id = SubjectId::new(id.clone()).map_err(invalid)?;
            subjects.push(Subject::with_id(subject_id, &name, &color).map_err(invalid)?);
        }
        Ok(SubjectRegistry::from_subjects(subjects)?)
    }

    /// Replaces the stored subject list.
    pub fn save_subjects(&mut self, registry: &SubjectRegistry) -> Result<(), DbError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM subjects", [])?;
        insert_subjects(&tx, registry.as_slice())?;
        tx.commit()?;
        tracing::debug!(count = registry.len(), "subjects saved");
        Ok(())
    }
}

impl Backend for Database {
    type Error = DbError;

    fn current_user(&self) -> Result<Option<UserId>, Self::Error> {
        Ok(self.signed_in_user()?.map(|user| user.id))
    }

    fn insert_log(&mut self, log: &NewStudyLog) -> Result<StudyLog, Self::Error> {
        self.insert_study_log(log)
    }

    fn list_logs(&self, user: &UserId) -> Result<Vec<StudyLog>, Self::Error> {
        self.list_study_logs(user)
    }

    fn delete_log(&mut self, user: &UserId, id: &LogId) -> Result<bool, Self::Error> {
        self.delete_study_log(user, id)
    }
}

/// A `study_logs` row before validation.
struct StudyLogRow {
    id: String,
    user_id: String,
    subject: String,
    duration_minutes: u32,
    notes: Option<String>,
    created_at: String,
}

impl StudyLogRow {
    fn into_study_log(self) -> Result<StudyLog, DbError> {
        let invalid = |source| DbError::InvalidRow {
            table: "study_logs",
            id: self.id.clone(),
            source,
        };
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|source| DbError::TimestampParse {
                id: self.id.clone(),
                timestamp: self.created_at.clone(),
                source,
            })?
            .with_timezone(&Utc);
        Ok(StudyLog {
            id: Some(LogId::new(self.id.clone()).map_err(invalid)?),
            user_id: UserId::new(self.user_id.clone()).map_err(invalid)?,
            subject: self.subject,
            duration_minutes: self.duration_minutes,
            notes: self.notes,
            created_at: Some(created_at),
        })
    }
}

fn user_from_row((id, username, created_at): (String, String, String)) -> Result<User, DbError> {
    let user_id = UserId::new(id.clone()).map_err(|source| DbError::InvalidRow {
        table: "users",
        id,
        source,
    })?;
    Ok(User {
        id: user_id,
        username,
        created_at,
    })
}

fn insert_subjects(conn: &Connection, subjects: &[Subject]) -> Result<(), DbError> {
    let mut stmt =
        conn.prepare("INSERT INTO subjects (id, name, color, position) VALUES (?, ?, ?, ?)")?;
    for (position, subject) in subjects.iter().enumerate() {
        stmt.execute(params![
            subject.id.as_str(),
            subject.name,
            subject.color,
            i64::try_from(position).unwrap_or(i64::MAX),
        ])?;
    }
    Ok(())
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Truncates to what the database stores, so returned rows match re-read ones.
fn truncate_to_millis(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&format_timestamp(timestamp))
        .map_or(timestamp, |parsed| parsed.with_timezone(&Utc))
}
