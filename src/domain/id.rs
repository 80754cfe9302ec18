//! Task identifiers
//!
//! IDs are epoch-millisecond timestamps taken when the task is created.
//! When two tasks are created within the same millisecond (or the clock
//! steps backwards) the next ID is bumped past the largest one in use,
//! so IDs stay unique within a collection.
//!
//! Stored IDs are written as JSON numbers. Reading also accepts a string of
//! ASCII digits, since hand-edited or older stores may quote them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TaskIdError {
    #[error("Invalid task ID: expected a non-negative integer, got '{0}'")]
    Invalid(String),
}

/// Identifier of a single task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    /// Wraps a raw ID value
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric value
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Allocates the ID for a task created at `now`
    ///
    /// The result is strictly greater than `largest_in_use`, if any.
    pub fn allocate(now: DateTime<Utc>, largest_in_use: Option<TaskId>) -> Self {
        let from_clock = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        match largest_in_use {
            Some(TaskId(largest)) if largest >= from_clock => Self(largest.saturating_add(1)),
            _ => Self(from_clock),
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = TaskIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(TaskIdError::Invalid(s.to_string()));
        }
        s.parse::<u64>()
            .map(Self)
            .map_err(|_| TaskIdError::Invalid(s.to_string()))
    }
}

impl From<u64> for TaskId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct TaskIdVisitor;

        impl<'de> Visitor<'de> for TaskIdVisitor {
            type Value = TaskId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a non-negative integer or a string of digits")
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(TaskId(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                u64::try_from(value)
                    .map(TaskId)
                    .map_err(|_| E::custom(format!("negative task ID: {}", value)))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                // serde_json hands large or fractional numbers over as f64
                if value.fract() == 0.0 && value >= 0.0 && value < u64::MAX as f64 {
                    Ok(TaskId(value as u64))
                } else {
                    Err(E::custom(format!("task ID is not an integer: {}", value)))
                }
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                value.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(TaskIdVisitor)
    }
}
