//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use st_core::Mode;

/// Study session tracker.
///
/// Runs pomodoro and stopwatch timers against a subject, logs the sessions,
/// and summarizes where your study time went.
#[derive(Debug, Parser)]
#[command(name = "st", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage the signed-in account.
    #[command(subcommand)]
    Auth(AuthAction),

    /// Manage study subjects.
    #[command(subcommand)]
    Subjects(SubjectsAction),

    /// Run a focus timer in the foreground.
    ///
    /// While it runs, type `p` to pause or resume, `c` to complete the session,
    /// or `q` to discard it. Ctrl-C also discards it.
    Timer {
        /// Subject to study (by name).
        #[arg(short, long)]
        subject: String,

        /// Timer discipline.
        #[arg(short, long, default_value = "pomodoro", value_parser = parse_mode)]
        mode: Mode,
    },

    /// Manage study log entries.
    #[command(subcommand)]
    Log(LogAction),

    /// Show study statistics.
    Stats {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List study goals.
    Goals,

    /// Show database and account status.
    Status,
}

/// Account actions.
#[derive(Debug, Subcommand)]
pub enum AuthAction {
    /// Create an account and sign in.
    SignUp { username: String },
    /// Sign in to an existing account.
    SignIn { username: String },
    /// Sign out.
    SignOut,
    /// Show the signed-in account.
    Whoami,
}

/// Subject actions.
#[derive(Debug, Subcommand)]
pub enum SubjectsAction {
    /// List subjects.
    List,
    /// Add a subject.
    Add {
        name: String,
        /// Color as #RRGGBB (defaults to the next unused palette color).
        #[arg(long)]
        color: Option<String>,
    },
    /// Remove a subject by ID. The last subject cannot be removed.
    Remove { id: String },
}

/// Study log actions.
#[derive(Debug, Subcommand)]
pub enum LogAction {
    /// Record study time by hand.
    Add {
        #[arg(short, long)]
        subject: String,
        /// Duration in minutes.
        #[arg(short, long)]
        minutes: u32,
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// List logs, newest first.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Delete a log by ID.
    Delete { id: String },
}

fn parse_mode(value: &str) -> Result<Mode, String> {
    value.parse().map_err(|err: st_core::ValidationError| err.to_string())
}
