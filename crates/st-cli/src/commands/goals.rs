//! Goals command. Goals come from configuration and are shown as-is.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use st_core::Goal;

pub fn format_goals(goals: &[Goal], today: NaiveDate) -> String {
    let mut output = String::new();

    writeln!(output, "GOALS").unwrap();
    writeln!(output).unwrap();

    if goals.is_empty() {
        writeln!(output, "No goals configured.").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "Hint: Add [[goals]] entries to your config.toml.").unwrap();
        return output;
    }

    for goal in goals {
        let mark = if goal.completed { "x" } else { " " };
        let overdue = if goal.is_overdue(today) {
            "  (overdue)"
        } else {
            ""
        };
        writeln!(
            output,
            "[{mark}] {:<28}  {:>3}%  due {}{overdue}",
            goal.title,
            goal.progress,
            goal.deadline.format("%Y-%m-%d")
        )
        .unwrap();
    }

    output
}

pub fn run<W: Write>(writer: &mut W, goals: &[Goal]) -> Result<()> {
    let today = Local::now().date_naive();
    write!(writer, "{}", format_goals(goals, today))?;
    Ok(())
}
