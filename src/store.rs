//! SQLite bootstrap for the todo store.
//!
//! The process opens exactly one connection, owned by the composition
//! root and handed to the repository. There is no reconnect logic: if
//! the connection dies, operations fail as store errors until restart.

use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::TodoError;

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS todos (
    id         TEXT PRIMARY KEY,
    title      TEXT NOT NULL,
    completed  INTEGER NOT NULL DEFAULT 0,
    due_date   TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_todos_created_at ON todos (created_at);
";

/// Handle to the todo store. Cheap to clone; every clone shares the
/// same underlying connection for the life of the process.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Opens (or creates) the database file and prepares the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TodoError> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|err| {
                    TodoError::Store(format!(
                        "failed to create data directory {}: {err}",
                        parent.display()
                    ))
                })?;
            }
        }
        let conn = Connection::open(path)?;
        Self::bootstrap(conn)
    }

    /// In-memory variant used by tests.
    pub fn open_in_memory() -> Result<Self, TodoError> {
        let conn = Connection::open_in_memory()?;
        Self::bootstrap(conn)
    }

    fn bootstrap(conn: Connection) -> Result<Self, TodoError> {
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs `f` with exclusive access to the connection.
    pub fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, TodoError>,
    ) -> Result<T, TodoError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| TodoError::Store("store connection poisoned".to_string()))?;
        f(&conn)
    }
}
