//! Status command for showing where data lives and who is signed in.

use std::io::Write;

use anyhow::Result;
use st_db::Database;

use crate::Config;

pub fn run<W: Write>(writer: &mut W, db: &Database, config: &Config) -> Result<()> {
    let user = db.signed_in_user()?;
    let subjects = db.load_subjects()?;

    writeln!(writer, "Study tracker status")?;
    writeln!(writer, "Database: {}", config.database_path.display())?;
    writeln!(writer, "Pomodoro: {} min", config.pomodoro_minutes)?;
    writeln!(writer, "Subjects: {}", subjects.len())?;

    match user {
        Some(user) => {
            let logs = db.count_study_logs(&user.id)?;
            writeln!(writer, "Signed in as: {}", user.username)?;
            writeln!(writer, "Study logs: {logs}")?;
        }
        None => writeln!(writer, "Not signed in.")?,
    }

    Ok(())
}
