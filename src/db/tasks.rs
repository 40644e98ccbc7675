//! Task CRUD operations.
//!
//! Mutations re-read the row they touched and return that, so callers always
//! see what the store actually holds (store-assigned id, timestamp, flags).

use super::Database;
use crate::types::{NewTask, Task};
use anyhow::{Result, anyhow};
use rusqlite::{Connection, Row, params};

const TASK_COLUMNS: &str = "id, title, description, completed, created_at";

pub fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        completed: row.get("completed")?,
        created_at: row.get("created_at")?,
    })
}

/// Internal helper to get a task using an existing connection.
fn get_task_internal(conn: &Connection, task_id: i64) -> Result<Option<Task>> {
    let sql = format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;

    match stmt.query_row(params![task_id], parse_task_row) {
        Ok(task) => Ok(Some(task)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl Database {
    /// Create a new task.
    ///
    /// Title non-emptiness is not checked here; callers validate input.
    pub fn create_task(&self, task: &NewTask) -> Result<Task> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tasks (title, description) VALUES (?1, ?2)",
                params![task.title, task.description],
            )?;
            let task_id = conn.last_insert_rowid();

            get_task_internal(conn, task_id)?
                .ok_or_else(|| anyhow!("Task {} missing immediately after insert", task_id))
        })
    }

    /// List all tasks, most recently created first.
    pub fn list_tasks(&self) -> Result<Vec<Task>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM tasks ORDER BY id DESC", TASK_COLUMNS);
            let mut stmt = conn.prepare(&sql)?;
            let tasks = stmt
                .query_map([], parse_task_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(tasks)
        })
    }

    /// Get a task by ID.
    pub fn get_task(&self, task_id: i64) -> Result<Option<Task>> {
        self.with_conn(|conn| get_task_internal(conn, task_id))
    }

    /// Mark a task completed and return its updated row.
    ///
    /// Returns `None` if no such task exists. Completing an already completed
    /// task succeeds and leaves it unchanged.
    pub fn mark_task_completed(&self, task_id: i64) -> Result<Option<Task>> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE tasks SET completed = TRUE WHERE id = ?1",
                params![task_id],
            )?;

            if updated == 0 {
                return Ok(None);
            }

            // A concurrent delete between the two statements yields None
            get_task_internal(conn, task_id)
        })
    }

    /// Delete a task. Returns false if it did not exist.
    pub fn delete_task(&self, task_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM tasks WHERE id = ?1", params![task_id])?;
            Ok(deleted > 0)
        })
    }

    /// Number of stored tasks.
    pub fn task_count(&self) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))?;
            Ok(count)
        })
    }
}
