//! Account commands: `st auth sign-up | sign-in | sign-out | whoami`.

use std::io::Write;

use anyhow::Result;
use st_db::Database;

pub fn sign_up<W: Write>(writer: &mut W, db: &mut Database, username: &str) -> Result<()> {
    let user = db.sign_up(username)?;
    writeln!(writer, "Created account {} and signed in.", user.username)?;
    Ok(())
}

pub fn sign_in<W: Write>(writer: &mut W, db: &mut Database, username: &str) -> Result<()> {
    let user = db.sign_in(username)?;
    writeln!(writer, "Signed in as {}.", user.username)?;
    Ok(())
}

pub fn sign_out<W: Write>(writer: &mut W, db: &mut Database) -> Result<()> {
    if db.sign_out()? {
        writeln!(writer, "Signed out.")?;
    } else {
        writeln!(writer, "Not signed in.")?;
    }
    Ok(())
}

pub fn whoami<W: Write>(writer: &mut W, db: &Database) -> Result<()> {
    match db.signed_in_user()? {
        Some(user) => writeln!(writer, "{}", user.username)?,
        None => writeln!(writer, "Not signed in.")?,
    }
    Ok(())
}
