use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Unix timestamp of `0001-01-01T00:00:00Z`, the zero time older stores wrote
/// for todos that were never completed.
const ZERO_TIME_UNIX: i64 = -62_135_596_800;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(Uuid);

impl TodoId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TodoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for TodoId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub task: String,
    #[serde(default)]
    pub done: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "completed_at_or_unset")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Todo {
    pub fn new(task: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: TodoId::new(),
            task,
            done: false,
            created_at,
            completed_at: None,
        }
    }

    /// Marks the todo done. Completing twice moves `completed_at` forward.
    pub fn complete(&mut self, at: DateTime<Utc>) {
        self.done = true;
        self.completed_at = Some(at);
    }
}

/// One entry of a batch add request. Any other fields a client sends are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTodo {
    #[serde(default)]
    pub task: String,
}

fn completed_at_or_unset<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<DateTime<Utc>>::deserialize(deserializer)?;
    Ok(value.filter(|at| at.timestamp() != ZERO_TIME_UNIX))
}
