//! Core types for the Task API.

use serde::Serialize;

/// A persisted task.
///
/// Only ever built from a stored row, so `id` and `created_at` always carry
/// the values the store assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    /// Insertion time as written by SQLite's `CURRENT_TIMESTAMP` (UTC).
    pub created_at: String,
}

/// Input for creating a task. Everything else is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
