//! Foreground focus timer: `st timer --subject <name> [--mode stopwatch]`.
//!
//! The engine is driven by [`IntervalTicks`], which multiplexes a one-second
//! tokio interval, line commands read from stdin, and Ctrl-C. Ctrl-C is polled
//! ahead of input and ticks, and once seen the source yields nothing further,
//! so a discarded session can never be completed by a tick that arrived in the
//! same instant or later.

use std::io::{BufRead, Write};
use std::pin::Pin;
use std::time::Duration;

use anyhow::{Context, Result};
use st_core::{
    Clock, LogId, LogStore, Mode, Outcome, Signal, StoreError, TickSource, TimerEngine,
    TimerState, drive_with, format_clock,
};
use st_db::Database;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::Config;

const TICK: Duration = Duration::from_secs(1);

/// Maps a line typed while the timer runs to a signal.
pub fn parse_command(line: &str) -> Option<Signal> {
    match line.trim().to_ascii_lowercase().as_str() {
        "p" | "pause" | "r" | "resume" => Some(Signal::TogglePause),
        "c" | "complete" | "done" => Some(Signal::Complete),
        "q" | "quit" | "cancel" => Some(Signal::Cancel),
        _ => None,
    }
}

/// Resolves once the process is interrupted.
type Interrupt = Pin<Box<dyn Future<Output = ()>>>;

/// Wall-clock tick source backed by a single-threaded tokio runtime.
pub struct IntervalTicks {
    runtime: Runtime,
    interval: Interval,
    input: mpsc::UnboundedReceiver<Signal>,
    interrupt: Interrupt,
    cancel: CancellationToken,
}

impl IntervalTicks {
    /// Starts listening for stdin commands and Ctrl-C.
    pub fn spawn() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to start timer runtime")?;

        let interrupt: Interrupt = Box::pin(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::debug!("ctrl-c received"),
                Err(err) => {
                    tracing::warn!(%err, "ctrl-c handler unavailable");
                    std::future::pending::<()>().await;
                }
            }
        });

        let (tx, input) = mpsc::unbounded_channel();
        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                match parse_command(&line) {
                    Some(signal) => {
                        if tx.send(signal).is_err() {
                            break;
                        }
                    }
                    None if line.trim().is_empty() => {}
                    None => eprintln!("\nunknown command {:?}; use p, c or q", line.trim()),
                }
            }
        });

        let first_tick = Instant::now() + TICK;
        Ok(Self::new(runtime, input, interrupt, first_tick))
    }

    fn new(
        runtime: Runtime,
        input: mpsc::UnboundedReceiver<Signal>,
        interrupt: Interrupt,
        first_tick: Instant,
    ) -> Self {
        let interval = {
            let _guard = runtime.enter();
            let mut interval = tokio::time::interval_at(first_tick, TICK);
            // Missed ticks burst so elapsed seconds catch up after a stall.
            interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
            interval
        };

        Self {
            runtime,
            interval,
            input,
            interrupt,
            cancel: CancellationToken::new(),
        }
    }
}

impl TickSource for IntervalTicks {
    fn next_signal(&mut self) -> Option<Signal> {
        let Self {
            runtime,
            interval,
            input,
            interrupt,
            cancel,
        } = self;
        // Interruption is checked before input and ticks in every poll.
        runtime.block_on(async {
            tokio::select! {
                biased;
                () = cancel.cancelled() => None,
                () = interrupt.as_mut() => {
                    cancel.cancel();
                    None
                }
                Some(signal) = input.recv() => Some(signal),
                _ = interval.tick() => Some(Signal::Tick),
            }
        })
    }
}

/// Builds an engine for `subject` in `mode`, ready to start.
pub fn prepare(db: &Database, config: &Config, subject: &str, mode: Mode) -> Result<TimerEngine> {
    let registry = db.load_subjects()?;
    let subject = registry.find_by_name(subject).cloned().with_context(|| {
        format!("unknown subject: {subject}; see 'st subjects list'")
    })?;

    let mut engine = TimerEngine::with_system_clock(config.timer_config()?);
    engine.switch_mode(mode)?;
    engine.select_subject(subject)?;
    Ok(engine)
}

fn render<C: Clock>(engine: &TimerEngine<C>) {
    let snapshot = engine.snapshot();
    let status = match snapshot.state {
        TimerState::Running => "running",
        TimerState::Paused => "paused ",
        TimerState::Idle => "done   ",
    };
    eprint!(
        "\r{} [{}] {}  {status}",
        snapshot.subject.as_deref().unwrap_or("-"),
        snapshot.mode,
        format_clock(snapshot.display_secs)
    );
    let _ = std::io::stderr().flush();
}

/// Reports how the session ended and saves completed sessions for the
/// signed-in user.
pub fn record_outcome<W: Write>(writer: &mut W, db: Database, outcome: Outcome) -> Result<()> {
    let node = match outcome {
        Outcome::Completed(node) => node,
        Outcome::Cancelled => {
            writeln!(writer, "Session discarded.")?;
            return Ok(());
        }
        Outcome::Interrupted => {
            writeln!(writer, "Timer interrupted; session discarded.")?;
            return Ok(());
        }
    };

    writeln!(
        writer,
        "Session complete: {} of {} ({})",
        format_clock(node.duration_secs()),
        node.subject().name,
        node.mode()
    )?;

    let mut store = LogStore::new(db);
    match store.record_from_session(&node) {
        Ok(log) => writeln!(
            writer,
            "Saved as log {} ({}m).",
            log.id.as_ref().map_or("-", LogId::as_str),
            log.duration_minutes
        )?,
        Err(StoreError::NotAuthenticated) => {
            tracing::warn!(session = %node.id(), "session not saved: not signed in");
            writeln!(
                writer,
                "Not signed in; session not saved. Run 'st auth sign-in <username>' first."
            )?;
        }
        Err(err) => return Err(err).context("failed to save session"),
    }
    Ok(())
}

pub fn run<W: Write>(
    writer: &mut W,
    db: Database,
    config: &Config,
    subject: &str,
    mode: Mode,
) -> Result<()> {
    let mut engine = prepare(&db, config, subject, mode)?;
    let mut source = IntervalTicks::spawn()?;

    eprintln!("p: pause/resume  c: complete  q: discard  Ctrl-C: discard");
    let outcome = drive_with(&mut engine, &mut source, render)?;
    eprintln!();

    if outcome == Outcome::Interrupted {
        engine.reset();
    }
    record_outcome(writer, db, outcome)
}
