//! Subject commands for listing, adding and removing study subjects.

use std::io::Write;

use anyhow::{Context, Result};
use st_core::{Subject, SubjectId, SubjectRegistry};
use st_db::Database;

/// Format the subject table.
pub fn format_subjects(registry: &SubjectRegistry) -> String {
    use std::fmt::Write;

    let mut output = String::new();
    writeln!(output, "{:<36}  {:<20}  COLOR", "ID", "NAME").unwrap();
    for subject in registry.iter() {
        writeln!(
            output,
            "{:<36}  {:<20}  {}",
            subject.id.as_str(),
            subject.name,
            subject.color
        )
        .unwrap();
    }
    output
}

pub fn list<W: Write>(writer: &mut W, db: &Database) -> Result<()> {
    let registry = db.load_subjects()?;
    write!(writer, "{}", format_subjects(&registry))?;
    Ok(())
}

pub fn add<W: Write>(
    writer: &mut W,
    db: &mut Database,
    name: &str,
    color: Option<&str>,
) -> Result<()> {
    let mut registry = db.load_subjects()?;
    if registry.find_by_name(name).is_some() {
        anyhow::bail!("subject already exists: {}", name.trim());
    }
    let color = color.unwrap_or_else(|| registry.next_color());
    let subject = Subject::new(name, color)?;
    let added = registry.add(subject).clone();
    db.save_subjects(&registry)
        .context("failed to save subjects")?;

    writeln!(
        writer,
        "Added {} ({}) with ID {}",
        added.name, added.color, added.id
    )?;
    Ok(())
}

pub fn remove<W: Write>(writer: &mut W, db: &mut Database, id: &str) -> Result<()> {
    let id = SubjectId::new(id)?;
    let mut registry = db.load_subjects()?;
    let removed = registry.remove(&id)?;
    db.save_subjects(&registry)
        .context("failed to save subjects")?;

    writeln!(writer, "Removed {}", removed.name)?;
    Ok(())
}
