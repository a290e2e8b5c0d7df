// Task store backed by a single SQLite table

use crate::task::{Task, TaskStatus, now_timestamp, parse_timestamp};
use eyre::{Context, Result};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS tasks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        description TEXT,
        status TEXT DEFAULT 'Pending',
        created_date TEXT NOT NULL
    );
"#;

const SELECT_TASKS: &str = "SELECT id, title, description, status, created_date FROM tasks";

/// Durable CRUD access to the task table
///
/// The store only remembers where the database lives. Every operation opens
/// its own connection, runs a single statement and drops the connection
/// before returning, so nothing is held open between calls.
#[derive(Debug, Clone)]
pub struct TaskStore {
    db_path: PathBuf,
}

impl TaskStore {
    /// Create a handle for the database at `path` without touching disk
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            db_path: path.as_ref().to_path_buf(),
        }
    }

    /// Create a handle and make sure the table exists
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let store = Self::new(path);
        store.initialize()?;
        Ok(store)
    }

    /// Get the path of the database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .wrap_err_with(|| format!("Failed to open SQLite database at {}", self.db_path.display()))
    }

    /// Ensure the tasks table exists
    ///
    /// Safe to call on every startup: existing rows are left untouched.
    pub fn initialize(&self) -> Result<()> {
        if let Some(parent) = self.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create database directory")?;
        }

        debug!(path = ?self.db_path, "Creating database schema");
        let conn = self.connect()?;
        conn.execute_batch(SCHEMA).context("Failed to create tasks table")?;

        Ok(())
    }

    // ========================================================================
    // CRUD API
    // ========================================================================

    /// Add a new pending task
    ///
    /// Returns `false` without writing anything when `title` is blank.
    pub fn add(&self, title: &str, description: &str) -> Result<bool> {
        Ok(self.create(title, description)?.is_some())
    }

    /// Add a new pending task and return its id
    ///
    /// Returns `None` without writing anything when `title` is blank.
    pub fn create(&self, title: &str, description: &str) -> Result<Option<i64>> {
        if title.trim().is_empty() {
            debug!("create: rejected blank title");
            return Ok(None);
        }

        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO tasks (title, description, status, created_date) VALUES (?1, ?2, ?3, ?4)",
            params![title, description, TaskStatus::Pending, now_timestamp()],
        )
        .context("Failed to insert task")?;

        let id = conn.last_insert_rowid();
        info!(id, title, "Task added");
        Ok(Some(id))
    }

    /// Get a task by id
    pub fn get(&self, id: i64) -> Result<Option<Task>> {
        let conn = self.connect()?;
        let task = conn
            .query_row(&format!("{} WHERE id = ?1", SELECT_TASKS), [id], task_from_row)
            .optional()
            .context("Failed to read task")?;

        Ok(task)
    }

    /// List every task, newest first
    pub fn list_all(&self) -> Result<Vec<Task>> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare(&format!("{} ORDER BY id DESC", SELECT_TASKS))
            .context("Failed to query tasks")?;

        let rows = stmt.query_map([], task_from_row)?;

        let mut tasks = Vec::new();
        for row_result in rows {
            tasks.push(row_result.context("Failed to read task row")?);
        }

        debug!(count = tasks.len(), "Listed tasks");
        Ok(tasks)
    }

    /// Overwrite the status of a task
    ///
    /// Does nothing if no task has this id.
    pub fn set_status(&self, id: i64, status: TaskStatus) -> Result<()> {
        let conn = self.connect()?;
        let changed = conn
            .execute("UPDATE tasks SET status = ?1 WHERE id = ?2", params![status, id])
            .context("Failed to update task status")?;

        debug!(id, %status, changed, "set_status");
        Ok(())
    }

    /// Overwrite the title and description of a task
    ///
    /// Applies the same blank-title check as [`TaskStore::add`] and returns
    /// `false` without writing when it fails. A missing id is not an error.
    pub fn update_fields(&self, id: i64, title: &str, description: &str) -> Result<bool> {
        if title.trim().is_empty() {
            debug!(id, "update_fields: rejected blank title");
            return Ok(false);
        }

        let conn = self.connect()?;
        let changed = conn
            .execute(
                "UPDATE tasks SET title = ?1, description = ?2 WHERE id = ?3",
                params![title, description, id],
            )
            .context("Failed to update task")?;

        debug!(id, changed, "update_fields");
        Ok(true)
    }

    /// Permanently remove a task
    ///
    /// Does nothing if no task has this id.
    pub fn delete(&self, id: i64) -> Result<()> {
        let conn = self.connect()?;
        let changed = conn
            .execute("DELETE FROM tasks WHERE id = ?1", [id])
            .context("Failed to delete task")?;

        debug!(id, changed, "delete");
        Ok(())
    }
}

fn task_from_row(row: &Row) -> rusqlite::Result<Task> {
    let created_date: String = row.get("created_date")?;
    let created_date = parse_timestamp(&created_date)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

    Ok(Task {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        status: row.get("status")?,
        created_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_store(temp: &TempDir) -> TaskStore {
        TaskStore::open(temp.path().join("tasks.db")).unwrap()
    }

    #[test]
    fn test_open_creates_database() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        assert!(store.db_path().exists());
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_initialize_creates_parent_directory() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/dir/tasks.db");

        let store = TaskStore::open(&path).unwrap();
        assert!(path.exists());
        assert!(store.add("Task", "").unwrap());
    }

    #[test]
    fn test_new_does_not_touch_disk() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tasks.db");

        let _store = TaskStore::new(&path);
        assert!(!path.exists());
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        store.add("First", "one").unwrap();
        store.add("Second", "two").unwrap();

        store.initialize().unwrap();
        store.initialize().unwrap();

        let tasks = store.list_all().unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].title, "Second");
        assert_eq!(tasks[1].title, "First");
    }

    #[test]
    fn test_operations_fail_without_schema() {
        let temp = TempDir::new().unwrap();
        let store = TaskStore::new(temp.path().join("tasks.db"));

        // Storage errors propagate instead of being swallowed
        assert!(store.list_all().is_err());
        assert!(store.add("Task", "").is_err());
        assert!(store.delete(1).is_err());
    }

    #[test]
    fn test_add_assigns_increasing_ids() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        let mut ids = Vec::new();
        for i in 0..5 {
            ids.push(store.create(&format!("Task {}", i), "").unwrap().unwrap());
        }

        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        let first = store.create("First", "").unwrap().unwrap();
        let second = store.create("Second", "").unwrap().unwrap();
        store.delete(second).unwrap();

        let third = store.create("Third", "").unwrap().unwrap();
        assert!(third > second);
        assert!(second > first);
    }

    #[test]
    fn test_add_rejects_blank_title() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        assert!(!store.add("", "x").unwrap());
        assert!(!store.add("   ", "x").unwrap());
        assert!(!store.add("\t\n", "x").unwrap());
        assert_eq!(store.create(" ", "x").unwrap(), None);
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_add_creates_pending_task() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        assert!(store.add("Buy milk", "").unwrap());

        let tasks = store.list_all().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Buy milk");
        assert_eq!(tasks[0].description.as_deref(), Some(""));
        assert_eq!(tasks[0].status, TaskStatus::Pending);
    }

    #[test]
    fn test_list_all_newest_first() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        store.add("A", "").unwrap();
        store.add("B", "").unwrap();
        store.add("C", "").unwrap();

        let titles: Vec<String> = store.list_all().unwrap().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["C", "B", "A"]);
    }

    #[test]
    fn test_get() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        let id = store.create("Write tests", "for the store").unwrap().unwrap();

        let task = store.get(id).unwrap().unwrap();
        assert_eq!(task.id, id);
        assert_eq!(task.title, "Write tests");
        assert_eq!(task.description.as_deref(), Some("for the store"));

        assert!(store.get(id + 100).unwrap().is_none());
    }

    #[test]
    fn test_set_status_changes_only_target() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        let a = store.create("A", "first").unwrap().unwrap();
        let b = store.create("B", "second").unwrap().unwrap();
        let before = store.list_all().unwrap();

        store.set_status(a, TaskStatus::Completed).unwrap();

        let after = store.list_all().unwrap();
        let task_a = after.iter().find(|t| t.id == a).unwrap();
        let old_a = before.iter().find(|t| t.id == a).unwrap();
        assert_eq!(task_a.status, TaskStatus::Completed);
        assert_eq!(task_a.title, old_a.title);
        assert_eq!(task_a.description, old_a.description);
        assert_eq!(task_a.created_date, old_a.created_date);

        let task_b = after.iter().find(|t| t.id == b).unwrap();
        let old_b = before.iter().find(|t| t.id == b).unwrap();
        assert_eq!(task_b, old_b);
    }

    #[test]
    fn test_set_status_missing_id_is_noop() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        store.add("A", "").unwrap();
        let before = store.list_all().unwrap();

        store.set_status(999, TaskStatus::Completed).unwrap();
        assert_eq!(store.list_all().unwrap(), before);
    }

    #[test]
    fn test_update_fields() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        let id = store.create("Old", "old desc").unwrap().unwrap();
        store.set_status(id, TaskStatus::Completed).unwrap();
        let before = store.get(id).unwrap().unwrap();

        assert!(store.update_fields(id, "New", "new desc").unwrap());

        let after = store.get(id).unwrap().unwrap();
        assert_eq!(after.title, "New");
        assert_eq!(after.description.as_deref(), Some("new desc"));
        assert_eq!(after.status, TaskStatus::Completed);
        assert_eq!(after.created_date, before.created_date);
    }

    #[test]
    fn test_update_fields_rejects_blank_title() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        let id = store.create("Keep me", "desc").unwrap().unwrap();

        assert!(!store.update_fields(id, "  ", "changed").unwrap());

        let task = store.get(id).unwrap().unwrap();
        assert_eq!(task.title, "Keep me");
        assert_eq!(task.description.as_deref(), Some("desc"));
    }

    #[test]
    fn test_update_fields_missing_id_is_noop() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        store.add("A", "").unwrap();
        let before = store.list_all().unwrap();

        assert!(store.update_fields(42, "B", "").unwrap());
        assert_eq!(store.list_all().unwrap(), before);
    }

    #[test]
    fn test_delete_removes_exactly_one() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        let a = store.create("A", "").unwrap().unwrap();
        let b = store.create("B", "").unwrap().unwrap();
        let c = store.create("C", "").unwrap().unwrap();

        store.delete(b).unwrap();

        let ids: Vec<i64> = store.list_all().unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![c, a]);

        // Second delete of the same id is a no-op
        store.delete(b).unwrap();
        assert_eq!(store.list_all().unwrap().len(), 2);
    }

    #[test]
    fn test_stored_text_layout() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        let id = store.create("Raw", "").unwrap().unwrap();
        store.set_status(id, TaskStatus::Completed).unwrap();

        let conn = Connection::open(store.db_path()).unwrap();
        let (status, created): (String, String) = conn
            .query_row("SELECT status, created_date FROM tasks WHERE id = ?1", [id], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();

        assert_eq!(status, "Completed");
        assert!(parse_timestamp(&created).is_ok());
        assert_eq!(created.len(), 19);
    }

    #[test]
    fn test_rows_written_by_other_tools() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        // Insert relying on the column default and a NULL description
        let conn = Connection::open(store.db_path()).unwrap();
        conn.execute(
            "INSERT INTO tasks (title, created_date) VALUES ('Imported', '2023-12-31 23:59:59')",
            [],
        )
        .unwrap();
        drop(conn);

        let tasks = store.list_all().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].status, TaskStatus::Pending);
        assert_eq!(tasks[0].description, None);
        assert_eq!(tasks[0].created_date, parse_timestamp("2023-12-31 23:59:59").unwrap());
    }

    #[test]
    fn test_corrupt_status_is_an_error() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        let conn = Connection::open(store.db_path()).unwrap();
        conn.execute(
            "INSERT INTO tasks (title, status, created_date) VALUES ('Bad', 'Archived', '2024-01-01 00:00:00')",
            [],
        )
        .unwrap();
        drop(conn);

        assert!(store.list_all().is_err());
    }

    #[test]
    fn test_end_to_end_lifecycle() {
        let temp = TempDir::new().unwrap();
        let store = TaskStore::new(temp.path().join("tasks.db"));
        store.initialize().unwrap();

        assert!(store.add("Write report", "Q3 summary").unwrap());

        let tasks = store.list_all().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, 1);
        assert_eq!(tasks[0].status, TaskStatus::Pending);

        store.set_status(1, TaskStatus::Completed).unwrap();
        let tasks = store.list_all().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, 1);
        assert_eq!(tasks[0].status, TaskStatus::Completed);

        assert!(store.update_fields(1, "Write report v2", "Q3 summary final").unwrap());
        let tasks = store.list_all().unwrap();
        assert_eq!(tasks[0].title, "Write report v2");
        assert_eq!(tasks[0].description.as_deref(), Some("Q3 summary final"));
        assert_eq!(tasks[0].status, TaskStatus::Completed);

        store.delete(1).unwrap();
        assert!(store.list_all().unwrap().is_empty());
    }
}
