//! Pomodoro / stopwatch timer state machine.
//!
//! The engine never reads wall-clock time to advance; it moves only when
//! [`TimerEngine::tick`] is called, once per elapsed second. Timestamps for the
//! session record come from the injected [`Clock`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::clock::{Clock, SystemClock};
use crate::session::FocusNode;
use crate::subject::Subject;
use crate::types::{Mode, ValidationError};

/// Default pomodoro length: 25 minutes.
pub const DEFAULT_POMODORO_SECS: u64 = 25 * 60;

/// Errors from timer transitions. None of them change engine state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimerError {
    #[error("please select a subject first")]
    NoSubject,

    #[error("a study session is already in progress")]
    SessionInProgress,

    #[error("no study session in progress")]
    NoSession,

    #[error("cannot switch mode while a session is in progress")]
    ModeLocked,

    #[error("timer is not running")]
    NotRunning,

    #[error("timer is not paused")]
    NotPaused,
}

/// Engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    pomodoro_secs: u64,
}

impl TimerConfig {
    pub fn from_minutes(minutes: u32) -> Result<Self, ValidationError> {
        if minutes == 0 {
            return Err(ValidationError::ZeroDuration {
                field: "pomodoro length",
            });
        }
        Ok(Self {
            pomodoro_secs: u64::from(minutes) * 60,
        })
    }

    pub const fn pomodoro_secs(&self) -> u64 {
        self.pomodoro_secs
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            pomodoro_secs: DEFAULT_POMODORO_SECS,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    #[default]
    Idle,
    Running,
    Paused,
}

/// Point-in-time view of the engine for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub mode: Mode,
    pub display_secs: u64,
    pub elapsed_secs: u64,
    pub subject: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct TimerEngine<C: Clock = SystemClock> {
    config: TimerConfig,
    clock: C,
    mode: Mode,
    state: TimerState,
    subject: Option<Subject>,
    /// Focused seconds in the current session; pauses do not count.
    elapsed_secs: u64,
    started_at: Option<DateTime<Utc>>,
}

impl TimerEngine<SystemClock> {
    pub fn with_system_clock(config: TimerConfig) -> Self {
        Self::new(config, SystemClock)
    }
}

impl<C: Clock> TimerEngine<C> {
    pub const fn new(config: TimerConfig, clock: C) -> Self {
        Self {
            config,
            clock,
            mode: Mode::Pomodoro,
            state: TimerState::Idle,
            subject: None,
            elapsed_secs: 0,
            started_at: None,
        }
    }

    pub const fn state(&self) -> TimerState {
        self.state
    }

    pub const fn mode(&self) -> Mode {
        self.mode
    }

    pub const fn config(&self) -> TimerConfig {
        self.config
    }

    pub const fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    /// Remaining time for pomodoro, elapsed time for stopwatch.
    pub const fn display_secs(&self) -> u64 {
        match self.mode {
            Mode::Pomodoro => self.config.pomodoro_secs.saturating_sub(self.elapsed_secs),
            Mode::Stopwatch => self.elapsed_secs,
        }
    }

    pub const fn selected_subject(&self) -> Option<&Subject> {
        self.subject.as_ref()
    }

    /// True while running or paused.
    pub fn in_session(&self) -> bool {
        self.state != TimerState::Idle
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            state: self.state,
            mode: self.mode,
            display_secs: self.display_secs(),
            elapsed_secs: self.elapsed_secs,
            subject: self.subject.as_ref().map(|s| s.name.clone()),
            started_at: self.started_at,
        }
    }

    /// Chooses the subject for the next session. Locked while a session runs.
    pub fn select_subject(&mut self, subject: Subject) -> Result<(), TimerError> {
        if self.in_session() {
            return Err(TimerError::SessionInProgress);
        }
        self.subject = Some(subject);
        Ok(())
    }

    /// Changes mode and resets the display to the mode's default.
    pub fn switch_mode(&mut self, mode: Mode) -> Result<(), TimerError> {
        if self.in_session() {
            return Err(TimerError::ModeLocked);
        }
        self.mode = mode;
        self.elapsed_secs = 0;
        tracing::debug!(%mode, "timer mode switched");
        Ok(())
    }

    pub fn start(&mut self) -> Result<(), TimerError> {
        if self.in_session() {
            return Err(TimerError::SessionInProgress);
        }
        let Some(subject) = &self.subject else {
            tracing::debug!("start rejected: no subject selected");
            return Err(TimerError::NoSubject);
        };
        let now = self.clock.now();
        tracing::info!(subject = %subject.name, mode = %self.mode, "study session started");
        self.started_at = Some(now);
        self.elapsed_secs = 0;
        self.state = TimerState::Running;
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), TimerError> {
        if self.state != TimerState::Running {
            return Err(TimerError::NotRunning);
        }
        self.state = TimerState::Paused;
        tracing::debug!(elapsed_secs = self.elapsed_secs, "timer paused");
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), TimerError> {
        if self.state != TimerState::Paused {
            return Err(TimerError::NotPaused);
        }
        self.state = TimerState::Running;
        tracing::debug!(elapsed_secs = self.elapsed_secs, "timer resumed");
        Ok(())
    }

    /// Start from idle, otherwise flip between running and paused.
    pub fn toggle(&mut self) -> Result<TimerState, TimerError> {
        match self.state {
            TimerState::Idle => self.start()?,
            TimerState::Running => self.pause()?,
            TimerState::Paused => self.resume()?,
        }
        Ok(self.state)
    }

    /// Advances one second. Ignored unless running.
    ///
    /// Returns the session record when a pomodoro reaches zero.
    pub fn tick(&mut self) -> Option<FocusNode> {
        if self.state != TimerState::Running {
            return None;
        }
        self.elapsed_secs += 1;
        if self.mode == Mode::Pomodoro && self.elapsed_secs >= self.config.pomodoro_secs {
            tracing::debug!("pomodoro countdown reached zero");
            return self.complete().ok();
        }
        None
    }

    /// Ends the session in progress and returns its record.
    pub fn complete(&mut self) -> Result<FocusNode, TimerError> {
        if !self.in_session() {
            return Err(TimerError::NoSession);
        }
        let (Some(subject), Some(started_at)) = (self.subject.clone(), self.started_at) else {
            return Err(TimerError::NoSession);
        };
        let duration_secs = match self.mode {
            Mode::Pomodoro => self.config.pomodoro_secs - self.display_secs(),
            Mode::Stopwatch => self.elapsed_secs,
        };
        let node = FocusNode::new(
            subject,
            started_at,
            self.clock.now(),
            duration_secs,
            self.mode,
        );
        tracing::info!(
            subject = %node.subject().name,
            mode = %node.mode(),
            duration_secs,
            "study session completed"
        );
        self.clear_session();
        Ok(node)
    }

    /// Abandons any session in progress without producing a record.
    pub fn reset(&mut self) {
        if self.in_session() {
            tracing::info!(elapsed_secs = self.elapsed_secs, "study session discarded");
        }
        self.clear_session();
    }

    fn clear_session(&mut self) {
        self.state = TimerState::Idle;
        self.elapsed_secs = 0;
        self.started_at = None;
    }
}

/// Formats seconds as `MM:SS`, or `H:MM:SS` once an hour is reached.
pub fn format_clock(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::clock::ManualClock;

    fn start_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-02-05T11:22:53Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn engine() -> (TimerEngine<ManualClock>, ManualClock) {
        let clock = ManualClock::new(start_time());
        let mut engine = TimerEngine::new(TimerConfig::default(), clock.clone());
        engine
            .select_subject(Subject::new("Mathematics", "#4CAF50").unwrap())
            .unwrap();
        (engine, clock)
    }

    fn advance(
        engine: &mut TimerEngine<ManualClock>,
        clock: &ManualClock,
        ticks: u64,
    ) -> Option<FocusNode> {
        for _ in 0..ticks {
            clock.advance_secs(1);
            if let Some(node) = engine.tick() {
                return Some(node);
            }
        }
        None
    }

    #[test]
    fn test_pomodoro_auto_completes_after_full_countdown() {
        let (mut engine, clock) = engine();
        engine.start().unwrap();

        assert!(advance(&mut engine, &clock, 1499).is_none());
        assert_eq!(engine.display_secs(), 1);

        let node = advance(&mut engine, &clock, 1).expect("session should complete");
        assert_eq!(node.duration_secs(), 1500);
        assert_eq!(node.mode(), Mode::Pomodoro);
        assert_eq!(node.start_time(), start_time());
        assert_eq!(node.end_time(), start_time() + Duration::seconds(1500));

        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.mode(), Mode::Pomodoro);
        assert_eq!(format_clock(engine.display_secs()), "25:00");
    }

    #[test]
    fn test_pomodoro_manual_complete_uses_configured_minus_remaining() {
        let (mut engine, clock) = engine();
        engine.start().unwrap();
        advance(&mut engine, &clock, 600);

        let remaining = engine.display_secs();
        let node = engine.complete().unwrap();
        assert_eq!(node.duration_secs(), DEFAULT_POMODORO_SECS - remaining);
        assert_eq!(node.duration_secs(), 600);
    }

    #[test]
    fn test_stopwatch_pause_resume_accumulates() {
        let (mut engine, clock) = engine();
        engine.switch_mode(Mode::Stopwatch).unwrap();
        engine.start().unwrap();

        advance(&mut engine, &clock, 90);
        engine.pause().unwrap();
        // Ticks while paused are ignored.
        advance(&mut engine, &clock, 15);
        engine.resume().unwrap();
        advance(&mut engine, &clock, 30);

        let node = engine.complete().unwrap();
        assert_eq!(node.duration_secs(), 120);
        assert_eq!(node.mode(), Mode::Stopwatch);
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.display_secs(), 0);
    }

    #[test]
    fn test_stopwatch_has_no_upper_bound() {
        let (mut engine, clock) = engine();
        engine.switch_mode(Mode::Stopwatch).unwrap();
        engine.start().unwrap();
        assert!(advance(&mut engine, &clock, 4000).is_none());
        assert_eq!(engine.display_secs(), 4000);
        assert_eq!(format_clock(engine.display_secs()), "1:06:40");
    }

    #[test]
    fn test_start_without_subject_is_rejected() {
        let mut engine = TimerEngine::new(TimerConfig::default(), ManualClock::new(start_time()));
        assert_eq!(engine.start(), Err(TimerError::NoSubject));
        assert_eq!(engine.state(), TimerState::Idle);
        assert!(engine.tick().is_none());
        assert_eq!(engine.complete().unwrap_err(), TimerError::NoSession);
    }

    #[test]
    fn test_mode_locked_during_session() {
        let (mut engine, _clock) = engine();
        engine.start().unwrap();
        assert_eq!(engine.switch_mode(Mode::Stopwatch), Err(TimerError::ModeLocked));
        engine.pause().unwrap();
        assert_eq!(engine.switch_mode(Mode::Stopwatch), Err(TimerError::ModeLocked));
        assert_eq!(engine.mode(), Mode::Pomodoro);
    }

    #[test]
    fn test_switch_mode_resets_display() {
        let (mut engine, _clock) = engine();
        engine.switch_mode(Mode::Stopwatch).unwrap();
        assert_eq!(engine.display_secs(), 0);
        engine.switch_mode(Mode::Pomodoro).unwrap();
        assert_eq!(engine.display_secs(), DEFAULT_POMODORO_SECS);
    }

    #[test]
    fn test_subject_locked_during_session() {
        let (mut engine, _clock) = engine();
        engine.start().unwrap();
        let other = Subject::new("Physics", "#2196F3").unwrap();
        assert_eq!(engine.select_subject(other), Err(TimerError::SessionInProgress));
        assert_eq!(engine.selected_subject().unwrap().name, "Mathematics");
    }

    #[test]
    fn test_toggle_cycles_states() {
        let (mut engine, _clock) = engine();
        assert_eq!(engine.toggle(), Ok(TimerState::Running));
        assert_eq!(engine.toggle(), Ok(TimerState::Paused));
        assert_eq!(engine.toggle(), Ok(TimerState::Running));
        assert_eq!(engine.start(), Err(TimerError::SessionInProgress));
    }

    #[test]
    fn test_pause_resume_guards() {
        let (mut engine, _clock) = engine();
        assert_eq!(engine.pause(), Err(TimerError::NotRunning));
        engine.start().unwrap();
        assert_eq!(engine.resume(), Err(TimerError::NotPaused));
    }

    #[test]
    fn test_complete_twice_fails() {
        let (mut engine, clock) = engine();
        engine.start().unwrap();
        advance(&mut engine, &clock, 5);
        engine.complete().unwrap();
        assert_eq!(engine.complete().unwrap_err(), TimerError::NoSession);
    }

    #[test]
    fn test_reset_discards_session() {
        let (mut engine, clock) = engine();
        engine.start().unwrap();
        advance(&mut engine, &clock, 42);
        engine.reset();
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.display_secs(), DEFAULT_POMODORO_SECS);
        assert_eq!(engine.complete().unwrap_err(), TimerError::NoSession);
    }

    #[test]
    fn test_short_pomodoro_config() {
        let clock = ManualClock::new(start_time());
        let mut engine = TimerEngine::new(TimerConfig::from_minutes(1).unwrap(), clock.clone());
        engine
            .select_subject(Subject::new("Chemistry", "#F44336").unwrap())
            .unwrap();
        engine.start().unwrap();
        let node = advance(&mut engine, &clock, 100).unwrap();
        assert_eq!(node.duration_secs(), 60);
    }

    #[test]
    fn test_zero_minute_config_rejected() {
        assert!(TimerConfig::from_minutes(0).is_err());
    }

    #[test]
    fn test_snapshot_reports_state() {
        let (mut engine, clock) = engine();
        engine.start().unwrap();
        advance(&mut engine, &clock, 61);
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.state, TimerState::Running);
        assert_eq!(snapshot.display_secs, 1439);
        assert_eq!(snapshot.subject.as_deref(), Some("Mathematics"));
        assert_eq!(snapshot.started_at, Some(start_time()));
    }

    #[test]
    fn test_paused_snapshot_json() {
        let (mut engine, clock) = engine();
        engine.start().unwrap();
        advance(&mut engine, &clock, 61);
        engine.pause().unwrap();

        let json = serde_json::to_string_pretty(&engine.snapshot()).unwrap();
        insta::assert_snapshot!(json, @r#"
        {
          "state": "paused",
          "mode": "pomodoro",
          "display_secs": 1439,
          "elapsed_secs": 61,
          "subject": "Mathematics",
          "started_at": "2025-02-05T11:22:53Z"
        }
        "#);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(1500), "25:00");
        assert_eq!(format_clock(59), "00:59");
        assert_eq!(format_clock(3600), "1:00:00");
    }
}
