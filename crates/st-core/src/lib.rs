//! Core domain logic for the study tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Timer: the pomodoro/stopwatch state machine and the tick loop driving it
//! - Log store: recording sessions and manual entries through a [`Backend`]
//! - Aggregation: totals, per-subject breakdowns and streaks

mod aggregate;
pub mod clock;
pub mod goals;
mod log;
pub mod memory;
mod session;
mod store;
pub mod subject;
pub mod ticker;
pub mod timer;
pub mod types;

pub use aggregate::{
    NO_SUBJECT, SubjectTotal, Summary, Timed, breakdown_by_subject, day_streak, format_duration,
    most_studied, total_duration,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use goals::{Goal, default_goals};
pub use log::{NewStudyLog, StudyLog, minutes_from_secs};
pub use memory::MemoryBackend;
pub use session::FocusNode;
pub use store::{Backend, DeleteOutcome, LogStore, StoreError};
pub use subject::{PALETTE, Subject, SubjectRegistry};
pub use ticker::{Outcome, ScriptedTicks, Signal, TickSource, drive, drive_with};
pub use timer::{
    DEFAULT_POMODORO_SECS, TimerConfig, TimerEngine, TimerError, TimerSnapshot, TimerState,
    format_clock,
};
pub use types::{LogId, Mode, SessionId, SubjectId, UserId, ValidationError};
