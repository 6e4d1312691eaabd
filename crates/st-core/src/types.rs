//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
///
/// These block the action that produced them and leave state untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// A duration of zero was supplied where a positive one is required.
    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },

    /// Colors are `#RRGGBB` hex strings.
    #[error("invalid color: {value} (expected #RRGGBB)")]
    InvalidColor { value: String },

    /// Invalid timer mode value.
    #[error("invalid mode: {value} (expected pomodoro or stopwatch)")]
    InvalidMode { value: String },

    /// Goal progress is a percentage.
    #[error("progress must be between 0 and 100, got {value}")]
    ProgressOutOfRange { value: u8 },

    /// Removing the subject would leave the registry empty.
    #[error("at least one subject must remain")]
    LastSubject,

    /// No subject with the given ID is registered.
    #[error("subject not found: {id}")]
    UnknownSubject { id: String },
}

/// Timer discipline for a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Fixed-duration countdown.
    #[default]
    Pomodoro,
    /// Unbounded count-up.
    Stopwatch,
}

impl Mode {
    /// String representation for storage and display.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pomodoro => "pomodoro",
            Self::Stopwatch => "stopwatch",
        }
    }

    /// The time shown on an idle timer in this mode.
    ///
    /// Pomodoro counts down from the configured duration, stopwatch up from zero.
    #[must_use]
    pub const fn default_time_secs(self, pomodoro_secs: u64) -> u64 {
        match self {
            Self::Pomodoro => pomodoro_secs,
            Self::Stopwatch => 0,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Mode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pomodoro" => Ok(Self::Pomodoro),
            "stopwatch" => Ok(Self::Stopwatch),
            _ => Err(ValidationError::InvalidMode {
                value: s.to_string(),
            }),
        }
    }
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Wraps a value already known to be non-empty.
            #[allow(dead_code)]
            pub(crate) fn from_static(id: &'static str) -> Self {
                debug_assert!(!id.is_empty());
                Self(id.to_string())
            }

            /// Generates a fresh random ID.
            #[must_use]
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated subject identifier.
    SubjectId, "subject ID"
);

define_string_id!(
    /// A validated focus session identifier.
    SessionId, "session ID"
);

define_string_id!(
    /// A validated study log identifier.
    ///
    /// Assigned by the backend on insert.
    LogId, "log ID"
);

define_string_id!(
    /// A validated user identifier, as reported by the authentication backend.
    UserId, "user ID"
);
