//! File-backed todo store.
//!
//! Every operation reads the whole collection from disk, mutates it in memory
//! and, when something changed, overwrites the whole file. Nothing is cached
//! between calls and nothing is locked: two concurrent writers race and the
//! last one wins.

use std::{
    fs::File,
    io::{self, Read, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use crate::entities::{Todo, TodoId};

/// Source of "now" for `createdAt` and `completedAt`.
pub type Clock = fn() -> DateTime<Utc>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The store file itself is missing. It is never created implicitly.
    #[error("todo file {} does not exist", path.display())]
    NotFound { path: PathBuf },

    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not encode todos: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("{0}")]
    Validation(String),

    #[error("todo {0} not found")]
    TodoNotFound(TodoId),
}

#[derive(Debug, Clone)]
pub struct TodoStore {
    path: PathBuf,
    clock: Clock,
}

impl TodoStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_clock(path, Utc::now)
    }

    pub fn with_clock(path: impl Into<PathBuf>, clock: Clock) -> Self {
        Self {
            path: path.into(),
            clock,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn list(&self) -> Result<Vec<Todo>, StoreError> {
        self.load()
    }

    /// Appends one todo per description, in order, and returns the new records.
    ///
    /// The whole batch is rejected before the file is touched if it is empty or
    /// any description is blank.
    pub fn add<I, S>(&self, tasks: I) -> Result<Vec<Todo>, StoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tasks = tasks
            .into_iter()
            .map(|task| validate_task(task.into()))
            .collect::<Result<Vec<_>, _>>()?;
        if tasks.is_empty() {
            return Err(StoreError::Validation("no tasks given".into()));
        }

        let mut todos = self.load()?;
        let now = (self.clock)();
        let added: Vec<Todo> = tasks.into_iter().map(|task| Todo::new(task, now)).collect();
        todos.extend(added.iter().cloned());
        self.save(&todos)?;

        debug!(count = added.len(), total = todos.len(), "added todos");
        Ok(added)
    }

    /// Single-field variant of [`TodoStore::add`] used by the HTML form.
    ///
    /// A blank description is dropped without touching the file and without an
    /// error, so the form simply redisplays the list.
    pub fn add_from_form(&self, task: &str) -> Result<Option<Todo>, StoreError> {
        if task.trim().is_empty() {
            debug!("ignoring blank task from form");
            return Ok(None);
        }
        let mut added = self.add([task])?;
        Ok(added.pop())
    }

    pub fn complete(&self, id: &str) -> Result<Todo, StoreError> {
        let id = parse_id(id)?;
        let mut todos = self.load()?;

        let todo = todos
            .iter_mut()
            .find(|todo| todo.id == id)
            .ok_or(StoreError::TodoNotFound(id))?;
        todo.complete((self.clock)());
        let completed = todo.clone();

        self.save(&todos)?;
        debug!(%id, "completed todo");
        Ok(completed)
    }

    pub fn delete(&self, id: &str) -> Result<Todo, StoreError> {
        let id = parse_id(id)?;
        let mut todos = self.load()?;

        let index = todos
            .iter()
            .position(|todo| todo.id == id)
            .ok_or(StoreError::TodoNotFound(id))?;
        let removed = todos.remove(index);

        self.save(&todos)?;
        debug!(%id, remaining = todos.len(), "deleted todo");
        Ok(removed)
    }

    fn load(&self) -> Result<Vec<Todo>, StoreError> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound {
                    path: self.path.clone(),
                })
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)
            .map_err(|source| StoreError::Read {
                path: self.path.clone(),
                source,
            })?;

        // `null` is what an empty list looked like in older stores.
        let todos: Option<Vec<Todo>> =
            serde_json::from_slice(&buffer).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;
        let todos = todos.unwrap_or_default();

        debug!(path = %self.path.display(), count = todos.len(), "loaded todos");
        Ok(todos)
    }

    fn save(&self, todos: &[Todo]) -> Result<(), StoreError> {
        let mut encoded = serde_json::to_vec_pretty(todos).map_err(StoreError::Encode)?;
        encoded.push(b'\n');

        let write_err = |source: io::Error| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        let mut file = File::create(&self.path).map_err(write_err)?;
        file.write_all(&encoded).map_err(write_err)?;
        Ok(())
    }
}

fn parse_id(raw: &str) -> Result<TodoId, StoreError> {
    raw.parse()
        .map_err(|_| StoreError::Validation("ID was invalid or not available".into()))
}

fn validate_task(task: String) -> Result<String, StoreError> {
    if task.trim().is_empty() {
        return Err(StoreError::Validation("task must not be empty".into()));
    }
    Ok(task)
}
