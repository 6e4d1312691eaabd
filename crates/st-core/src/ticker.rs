//! Tick sources and the loop that feeds them into a [`TimerEngine`].
//!
//! A source yields one [`Signal`] at a time. The real source (in the CLI) waits
//! on a one-second interval and user input; [`ScriptedTicks`] replays a fixed
//! list so sessions can be exercised without waiting on a wall clock.

use std::collections::VecDeque;

use crate::clock::{Clock, ManualClock};
use crate::session::FocusNode;
use crate::timer::{TimerEngine, TimerError, TimerState};

/// Input to a running timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// One second has elapsed.
    Tick,
    /// Pause if running, resume if paused.
    TogglePause,
    /// End the session now and keep its record.
    Complete,
    /// End the session now and discard it.
    Cancel,
}

/// A single-threaded supplier of timer signals.
pub trait TickSource {
    /// Waits for the next signal. `None` once the source is exhausted or
    /// cancelled; no signal is ever yielded after that.
    fn next_signal(&mut self) -> Option<Signal>;
}

/// How a driven session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed(FocusNode),
    Cancelled,
    /// The source ran dry with the session still in progress.
    Interrupted,
}

/// Replays a fixed list of signals.
///
/// When built with a [`ManualClock`], each tick also advances that clock by a
/// second so session timestamps line up with the tick count.
#[derive(Debug, Default)]
pub struct ScriptedTicks {
    signals: VecDeque<Signal>,
    clock: Option<ManualClock>,
}

impl ScriptedTicks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock(clock: ManualClock) -> Self {
        Self {
            signals: VecDeque::new(),
            clock: Some(clock),
        }
    }

    /// Appends `n` ticks.
    #[must_use]
    pub fn ticks(mut self, n: u64) -> Self {
        for _ in 0..n {
            self.signals.push_back(Signal::Tick);
        }
        self
    }

    #[must_use]
    pub fn then(mut self, signal: Signal) -> Self {
        self.signals.push_back(signal);
        self
    }

    /// Signals not yet consumed.
    pub fn remaining(&self) -> usize {
        self.signals.len()
    }
}

impl TickSource for ScriptedTicks {
    fn next_signal(&mut self) -> Option<Signal> {
        let signal = self.signals.pop_front()?;
        if let (Signal::Tick, Some(clock)) = (signal, &self.clock) {
            clock.advance_secs(1);
        }
        Some(signal)
    }
}

/// Runs a session to its end. Starts the engine first if it is idle.
pub fn drive<C, S>(engine: &mut TimerEngine<C>, source: &mut S) -> Result<Outcome, TimerError>
where
    C: Clock,
    S: TickSource + ?Sized,
{
    drive_with(engine, source, |_| {})
}

/// Like [`drive`], calling `on_signal` after every signal is applied.
///
/// Stops pulling from the source as soon as the session ends, so a session is
/// completed at most once.
pub fn drive_with<C, S, F>(
    engine: &mut TimerEngine<C>,
    source: &mut S,
    mut on_signal: F,
) -> Result<Outcome, TimerError>
where
    C: Clock,
    S: TickSource + ?Sized,
    F: FnMut(&TimerEngine<C>),
{
    if engine.state() == TimerState::Idle {
        engine.start()?;
    }

    while let Some(signal) = source.next_signal() {
        match signal {
            Signal::Tick => {
                if let Some(node) = engine.tick() {
                    on_signal(engine);
                    return Ok(Outcome::Completed(node));
                }
            }
            Signal::TogglePause => {
                engine.toggle()?;
            }
            Signal::Complete => {
                let node = engine.complete()?;
                on_signal(engine);
                return Ok(Outcome::Completed(node));
            }
            Signal::Cancel => {
                engine.reset();
                on_signal(engine);
                return Ok(Outcome::Cancelled);
            }
        }
        on_signal(engine);
    }

    tracing::debug!(elapsed_secs = engine.elapsed_secs(), "tick source ended mid-session");
    Ok(Outcome::Interrupted)
}
