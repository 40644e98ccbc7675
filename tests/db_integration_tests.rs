//! Integration tests for the database layer.
//!
//! Each test works against its own SQLite file in a temporary directory.

use task_api::db::Database;
use task_api::types::NewTask;
use tempfile::TempDir;

/// Helper to create a fresh file-backed database for testing.
///
/// The directory must outlive the database handle.
fn setup_db() -> (TempDir, Database) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db = Database::open(dir.path().join("tasks.db")).expect("Failed to open database");
    (dir, db)
}

mod create_tests {
    use super::*;

    #[test]
    fn create_assigns_store_defaults() {
        let (_dir, db) = setup_db();

        let task = db
            .create_task(&NewTask::new("Write report"))
            .expect("Failed to create task");

        assert_eq!(task.id, 1);
        assert_eq!(task.title, "Write report");
        assert!(task.description.is_none());
        assert!(!task.completed);
        assert!(!task.created_at.is_empty());
    }

    #[test]
    fn create_then_get_round_trips() {
        let (_dir, db) = setup_db();

        let created = db
            .create_task(&NewTask::new("Buy milk").with_description("2%"))
            .unwrap();
        let fetched = db.get_task(created.id).unwrap().expect("task should exist");

        assert_eq!(fetched, created);
        assert_eq!(fetched.title, "Buy milk");
        assert_eq!(fetched.description.as_deref(), Some("2%"));
        assert!(!fetched.completed);
    }

    #[test]
    fn ids_strictly_increase() {
        let (_dir, db) = setup_db();

        let mut last = 0;
        for i in 0..5 {
            let task = db.create_task(&NewTask::new(format!("task {}", i))).unwrap();
            assert!(task.id > last, "id {} not greater than {}", task.id, last);
            last = task.id;
        }
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let (_dir, db) = setup_db();

        let first = db.create_task(&NewTask::new("first")).unwrap();
        let second = db.create_task(&NewTask::new("second")).unwrap();
        assert!(db.delete_task(second.id).unwrap());

        let third = db.create_task(&NewTask::new("third")).unwrap();
        assert!(third.id > second.id);
        assert_ne!(third.id, first.id);
    }

    #[test]
    fn store_does_not_validate_title() {
        let (_dir, db) = setup_db();

        let task = db.create_task(&NewTask::new("")).unwrap();
        assert_eq!(task.title, "");
    }

    #[test]
    fn created_at_is_sqlite_timestamp() {
        let (_dir, db) = setup_db();

        let task = db.create_task(&NewTask::new("stamp")).unwrap();
        chrono::NaiveDateTime::parse_from_str(&task.created_at, "%Y-%m-%d %H:%M:%S")
            .expect("created_at should be YYYY-MM-DD HH:MM:SS");
    }
}

mod list_tests {
    use super::*;

    #[test]
    fn list_empty() {
        let (_dir, db) = setup_db();
        assert!(db.list_tasks().unwrap().is_empty());
    }

    #[test]
    fn list_orders_newest_first() {
        let (_dir, db) = setup_db();

        let a = db.create_task(&NewTask::new("A")).unwrap();
        let b = db.create_task(&NewTask::new("B")).unwrap();
        let c = db.create_task(&NewTask::new("C")).unwrap();

        let ids: Vec<i64> = db.list_tasks().unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![c.id, b.id, a.id]);
    }

    #[test]
    fn task_count_tracks_rows() {
        let (_dir, db) = setup_db();
        assert_eq!(db.task_count().unwrap(), 0);

        let task = db.create_task(&NewTask::new("one")).unwrap();
        db.create_task(&NewTask::new("two")).unwrap();
        assert_eq!(db.task_count().unwrap(), 2);

        db.delete_task(task.id).unwrap();
        assert_eq!(db.task_count().unwrap(), 1);
    }
}

mod get_tests {
    use super::*;

    #[test]
    fn get_unknown_id_returns_none() {
        let (_dir, db) = setup_db();
        assert!(db.get_task(999_999).unwrap().is_none());
    }
}

mod complete_tests {
    use super::*;

    #[test]
    fn mark_completed_sets_flag() {
        let (_dir, db) = setup_db();
        let task = db.create_task(&NewTask::new("finish me")).unwrap();

        let done = db
            .mark_task_completed(task.id)
            .unwrap()
            .expect("task should exist");

        assert!(done.completed);
        assert_eq!(done.id, task.id);
        assert_eq!(done.title, task.title);
        assert_eq!(done.created_at, task.created_at);
    }

    #[test]
    fn mark_completed_is_idempotent() {
        let (_dir, db) = setup_db();
        let task = db.create_task(&NewTask::new("twice")).unwrap();

        let first = db.mark_task_completed(task.id).unwrap().unwrap();
        let second = db.mark_task_completed(task.id).unwrap().unwrap();

        assert!(first.completed);
        assert_eq!(first, second);
    }

    #[test]
    fn mark_completed_unknown_id_returns_none() {
        let (_dir, db) = setup_db();
        assert!(db.mark_task_completed(999_999).unwrap().is_none());
    }

    #[test]
    fn mark_completed_only_touches_target() {
        let (_dir, db) = setup_db();
        let a = db.create_task(&NewTask::new("A")).unwrap();
        let b = db.create_task(&NewTask::new("B")).unwrap();

        db.mark_task_completed(a.id).unwrap();

        assert!(db.get_task(a.id).unwrap().unwrap().completed);
        assert!(!db.get_task(b.id).unwrap().unwrap().completed);
    }
}

mod delete_tests {
    use super::*;

    #[test]
    fn delete_removes_task() {
        let (_dir, db) = setup_db();
        let keep = db.create_task(&NewTask::new("keep")).unwrap();
        let gone = db.create_task(&NewTask::new("gone")).unwrap();

        assert!(db.delete_task(gone.id).unwrap());

        assert!(db.get_task(gone.id).unwrap().is_none());
        let ids: Vec<i64> = db.list_tasks().unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![keep.id]);
    }

    #[test]
    fn repeated_delete_returns_false() {
        let (_dir, db) = setup_db();
        let task = db.create_task(&NewTask::new("once")).unwrap();

        assert!(db.delete_task(task.id).unwrap());
        assert!(!db.delete_task(task.id).unwrap());
    }

    #[test]
    fn delete_unknown_id_returns_false() {
        let (_dir, db) = setup_db();
        assert!(!db.delete_task(999_999).unwrap());
    }
}

mod persistence_tests {
    use super::*;

    #[test]
    fn reopen_keeps_rows_and_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.db");

        let created = {
            let db = Database::open(&path).unwrap();
            db.create_task(&NewTask::new("durable")).unwrap()
        };

        // Second open re-runs schema setup against the existing file
        let db = Database::open(&path).unwrap();
        let fetched = db.get_task(created.id).unwrap().expect("row should survive");
        assert_eq!(fetched, created);
    }

    #[test]
    fn adopts_table_created_without_migrations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.db");

        {
            let conn = rusqlite::Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE tasks (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    title TEXT NOT NULL,
                    description TEXT,
                    completed BOOLEAN DEFAULT FALSE,
                    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
                );
                INSERT INTO tasks (title) VALUES ('legacy');",
            )
            .unwrap();
        }

        let db = Database::open(&path).unwrap();
        let tasks = db.list_tasks().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "legacy");
        assert!(!tasks[0].completed);
    }

    #[test]
    fn separate_handles_see_each_others_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.db");
        let writer = Database::open(&path).unwrap();
        let reader = Database::open(&path).unwrap();

        let task = writer.create_task(&NewTask::new("shared")).unwrap();
        assert_eq!(reader.get_task(task.id).unwrap(), Some(task));
    }

    #[test]
    fn concurrent_creates_get_distinct_ids() {
        let (_dir, db) = setup_db();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let db = db.clone();
                std::thread::spawn(move || {
                    db.create_task(&NewTask::new(format!("worker {}", i)))
                        .unwrap()
                        .id
                })
            })
            .collect();

        let mut ids: Vec<i64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 8);
        assert_eq!(db.task_count().unwrap(), 8);
    }
}
