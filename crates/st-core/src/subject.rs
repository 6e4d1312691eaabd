//! User-defined study subjects.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::{SubjectId, ValidationError};

/// Colors offered when creating a subject.
pub const PALETTE: [&str; 10] = [
    "#4CAF50", "#2196F3", "#F44336", "#FFC107", "#9C27B0", "#FF9800", "#795548", "#607D8B",
    "#E91E63", "#673AB7",
];

static COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("color pattern is valid"));

/// A labeled category that sessions are recorded against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSubject")]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub color: String,
}

#[derive(Deserialize)]
struct RawSubject {
    id: SubjectId,
    name: String,
    color: String,
}

impl TryFrom<RawSubject> for Subject {
    type Error = ValidationError;

    fn try_from(raw: RawSubject) -> Result<Self, Self::Error> {
        Self::with_id(raw.id, &raw.name, &raw.color)
    }
}

impl Subject {
    /// Creates a subject with a fresh ID.
    ///
    /// The name is trimmed; the color must be `#RRGGBB`.
    pub fn new(name: &str, color: &str) -> Result<Self, ValidationError> {
        Self::with_id(SubjectId::generate(), name, color)
    }

    /// Creates a subject with a known ID, e.g. when loading from storage.
    pub fn with_id(id: SubjectId, name: &str, color: &str) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::Empty {
                field: "subject name",
            });
        }
        if !COLOR_RE.is_match(color) {
            return Err(ValidationError::InvalidColor {
                value: color.to_string(),
            });
        }
        Ok(Self {
            id,
            name: name.to_string(),
            color: color.to_uppercase(),
        })
    }
}

/// The mutable list of subjects. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectRegistry {
    subjects: Vec<Subject>,
}

impl SubjectRegistry {
    /// Registry seeded with the starter subjects.
    #[must_use]
    pub fn with_defaults() -> Self {
        let subjects = [
            ("1", "Mathematics", PALETTE[0]),
            ("2", "Physics", PALETTE[1]),
            ("3", "Chemistry", PALETTE[2]),
        ]
        .into_iter()
        .map(|(id, name, color)| Subject {
            id: SubjectId::from_static(id),
            name: name.to_string(),
            color: color.to_string(),
        })
        .collect();
        Self { subjects }
    }

    /// Builds a registry from stored subjects.
    pub fn from_subjects(subjects: Vec<Subject>) -> Result<Self, ValidationError> {
        if subjects.is_empty() {
            return Err(ValidationError::Empty { field: "subjects" });
        }
        Ok(Self { subjects })
    }

    /// Appends a subject and returns a reference to it.
    pub fn add(&mut self, subject: Subject) -> &Subject {
        tracing::debug!(id = %subject.id, name = %subject.name, "subject added");
        self.subjects.push(subject);
        &self.subjects[self.subjects.len() - 1]
    }

    /// Removes a subject by ID.
    ///
    /// Sessions already recorded keep their own copy of the subject, so removal
    /// never invalidates history.
    pub fn remove(&mut self, id: &SubjectId) -> Result<Subject, ValidationError> {
        let index = self
            .subjects
            .iter()
            .position(|s| &s.id == id)
            .ok_or_else(|| ValidationError::UnknownSubject {
                id: id.to_string(),
            })?;
        if self.subjects.len() <= 1 {
            return Err(ValidationError::LastSubject);
        }
        let removed = self.subjects.remove(index);
        tracing::debug!(id = %removed.id, name = %removed.name, "subject removed");
        Ok(removed)
    }

    pub fn get(&self, id: &SubjectId) -> Option<&Subject> {
        self.subjects.iter().find(|s| &s.id == id)
    }

    /// Case-insensitive lookup by name.
    pub fn find_by_name(&self, name: &str) -> Option<&Subject> {
        let name = name.trim();
        self.subjects
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subject> {
        self.subjects.iter()
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    /// True when no subjects are registered.
    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    pub fn as_slice(&self) -> &[Subject] {
        &self.subjects
    }

    /// First palette color not used by any subject.
    pub fn next_color(&self) -> &'static str {
        PALETTE
            .iter()
            .find(|c| !self.subjects.iter().any(|s| s.color.eq_ignore_ascii_case(c)))
            .copied()
            .unwrap_or(PALETTE[0])
    }
}

impl Default for SubjectRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
