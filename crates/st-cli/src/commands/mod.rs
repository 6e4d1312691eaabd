//! CLI subcommand implementations.

pub mod auth;
pub mod goals;
pub mod log;
pub mod stats;
pub mod status;
pub mod subjects;
pub mod timer;
