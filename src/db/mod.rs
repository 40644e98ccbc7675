//! Database layer for the Task API.

pub mod tasks;

use anyhow::Result;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Default time a connection waits on a locked database file.
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5000;

/// Database handle.
///
/// Holds only the location of the SQLite file. Every operation opens its own
/// connection through [`Database::with_conn`], and that connection is closed
/// when the operation returns, on success or failure.
#[derive(Debug, Clone)]
pub struct Database {
    path: Arc<PathBuf>,
    busy_timeout: Duration,
}

impl Database {
    /// Open or create the database at the given path and apply the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_timeout(path, DEFAULT_BUSY_TIMEOUT_MS)
    }

    /// Like [`Database::open`], with an explicit busy timeout in milliseconds.
    pub fn open_with_timeout<P: AsRef<Path>>(path: P, busy_timeout_ms: u32) -> Result<Self> {
        let db = Self {
            path: Arc::new(path.as_ref().to_path_buf()),
            busy_timeout: Duration::from_millis(u64::from(busy_timeout_ms)),
        };

        db.run_migrations()?;

        Ok(db)
    }

    /// Location of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(self.path.as_path())?;
        conn.busy_timeout(self.busy_timeout)?;

        // WAL lets readers proceed while a writer holds the file
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        Ok(conn)
    }

    /// Run database migrations.
    fn run_migrations(&self) -> Result<()> {
        let mut conn = self.connect()?;
        let report = embedded::migrations::runner().run(&mut conn)?;
        debug!(
            path = %self.path.display(),
            applied = report.applied_migrations().len(),
            "Schema up to date"
        );
        Ok(())
    }

    /// Execute a function against a freshly opened connection.
    ///
    /// The connection is dropped before this returns.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.connect()?;
        f(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_creates_tasks_table() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path().join("tasks.db")).unwrap();

        let exists: i64 = db
            .with_conn(|conn| {
                Ok(conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'tasks'",
                    [],
                    |row| row.get(0),
                )?)
            })
            .unwrap();
        assert_eq!(exists, 1);
    }

    #[test]
    fn connections_use_wal() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path().join("tasks.db")).unwrap();

        let mode: String = db
            .with_conn(|conn| Ok(conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))?))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[test]
    fn open_fails_when_parent_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let result = Database::open(dir.path().join("missing").join("tasks.db"));
        assert!(result.is_err());
    }
}
