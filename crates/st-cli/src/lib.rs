//! Study tracker CLI library.
//!
//! This crate provides the CLI interface for the study tracker.

mod cli;
pub mod commands;
mod config;

pub use cli::{AuthAction, Cli, Commands, LogAction, SubjectsAction};
pub use config::Config;
