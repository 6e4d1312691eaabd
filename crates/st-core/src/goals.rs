//! Study goals. Configuration data only; goals are never written to storage.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGoal")]
pub struct Goal {
    pub id: u32,
    pub title: String,
    /// Percent complete, 0 to 100.
    pub progress: u8,
    pub deadline: NaiveDate,
    pub completed: bool,
}

#[derive(Deserialize)]
struct RawGoal {
    id: u32,
    title: String,
    progress: u8,
    deadline: NaiveDate,
    #[serde(default)]
    completed: bool,
}

impl TryFrom<RawGoal> for Goal {
    type Error = ValidationError;

    fn try_from(raw: RawGoal) -> Result<Self, Self::Error> {
        Self::new(raw.id, &raw.title, raw.progress, raw.deadline, raw.completed)
    }
}

impl Goal {
    pub fn new(
        id: u32,
        title: &str,
        progress: u8,
        deadline: NaiveDate,
        completed: bool,
    ) -> Result<Self, ValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::Empty {
                field: "goal title",
            });
        }
        if progress > 100 {
            return Err(ValidationError::ProgressOutOfRange { value: progress });
        }
        Ok(Self {
            id,
            title: title.to_string(),
            progress,
            deadline,
            completed,
        })
    }

    /// Past its deadline and not completed.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.deadline < today
    }
}

/// The sample goals shown before any are configured.
pub fn default_goals() -> Vec<Goal> {
    let sample = [
        (1, "Complete Calculus Module", 75, (2024, 3, 1), false),
        (2, "Physics Lab Reports", 100, (2024, 2, 28), true),
    ];
    sample
        .into_iter()
        .filter_map(|(id, title, progress, (y, m, d), completed)| {
            let deadline = NaiveDate::from_ymd_opt(y, m, d)?;
            Goal::new(id, title, progress, deadline, completed).ok()
        })
        .collect()
}
