use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use st_cli::commands::{auth, goals, log, stats, status, subjects, timer};
use st_cli::{AuthAction, Cli, Commands, Config, LogAction, SubjectsAction};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(st_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = st_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so command output stays pipeable
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let mut stdout = io::stdout().lock();

    match &cli.command {
        Some(Commands::Auth(action)) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            match action {
                AuthAction::SignUp { username } => auth::sign_up(&mut stdout, &mut db, username)?,
                AuthAction::SignIn { username } => auth::sign_in(&mut stdout, &mut db, username)?,
                AuthAction::SignOut => auth::sign_out(&mut stdout, &mut db)?,
                AuthAction::Whoami => auth::whoami(&mut stdout, &db)?,
            }
        }
        Some(Commands::Subjects(action)) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            match action {
                SubjectsAction::List => subjects::list(&mut stdout, &db)?,
                SubjectsAction::Add { name, color } => {
                    subjects::add(&mut stdout, &mut db, name, color.as_deref())?;
                }
                SubjectsAction::Remove { id } => subjects::remove(&mut stdout, &mut db, id)?,
            }
        }
        Some(Commands::Timer { subject, mode }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            timer::run(&mut stdout, db, &config, subject, *mode)?;
        }
        Some(Commands::Log(action)) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            match action {
                LogAction::Add {
                    subject,
                    minutes,
                    notes,
                } => log::add(&mut stdout, db, subject, *minutes, notes.clone())?,
                LogAction::List { json } => log::list(&mut stdout, db, *json)?,
                LogAction::Delete { id } => log::delete(&mut stdout, db, id)?,
            }
        }
        Some(Commands::Stats { json }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            stats::run(&mut stdout, db, *json)?;
        }
        Some(Commands::Goals) => {
            // Goals live in config; no database needed
            let config =
                Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
            goals::run(&mut stdout, &config.goals)?;
        }
        Some(Commands::Status) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            status::run(&mut stdout, &db, &config)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
