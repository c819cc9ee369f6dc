//! Persistence operations for todos.
//!
//! Write paths validate client fields before touching the store; read
//! paths reject malformed persisted state instead of masking it.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::error::TodoError;
use crate::models::{validate_title, CreateTodoInput, Todo, UpdateTodoPatch};
use crate::store::Store;

const TODO_SELECT_SQL: &str =
    "SELECT id, title, completed, due_date, created_at, updated_at FROM todos";

#[derive(Clone)]
pub struct TodoRepo {
    store: Store,
}

impl TodoRepo {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// All todos, newest-created-first.
    pub fn list(&self) -> Result<Vec<Todo>, TodoError> {
        self.store.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("{TODO_SELECT_SQL} ORDER BY created_at DESC, rowid DESC"))?;
            let mut rows = stmt.query([])?;
            let mut todos = Vec::new();
            while let Some(row) = rows.next()? {
                todos.push(todo_from_row(row)?);
            }
            Ok(todos)
        })
    }

    /// Creates one todo. The store assigns `id` and both timestamps;
    /// `created_at == updated_at` at this point.
    pub fn create(&self, input: &CreateTodoInput) -> Result<Todo, TodoError> {
        let title = validate_title(input.title.as_deref().unwrap_or(""))?;
        let now = Utc::now();
        let todo = Todo {
            id: Uuid::new_v4().to_string(),
            title,
            completed: input.completed.unwrap_or(false),
            due_date: input.due_date,
            created_at: now,
            updated_at: now,
        };
        self.store.with_conn(|conn| {
            conn.execute(
                "INSERT INTO todos (id, title, completed, due_date, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    todo.id,
                    todo.title,
                    i64::from(todo.completed),
                    todo.due_date.map(|due| due.to_rfc3339()),
                    todo.created_at.to_rfc3339(),
                    todo.updated_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })?;
        Ok(todo)
    }

    pub fn get(&self, id: &str) -> Result<Todo, TodoError> {
        let id = parse_id(id)?;
        self.store
            .with_conn(|conn| find_todo(conn, &id)?.ok_or(TodoError::NotFound))
    }

    /// Applies only the fields present in the patch and bumps
    /// `updated_at`. Title constraints re-run exactly as on create.
    pub fn update(&self, id: &str, patch: &UpdateTodoPatch) -> Result<Todo, TodoError> {
        let id = parse_id(id)?;
        let title = match patch.title.as_deref() {
            Some(raw) => Some(validate_title(raw)?),
            None => None,
        };
        self.store.with_conn(|conn| {
            let mut todo = find_todo(conn, &id)?.ok_or(TodoError::NotFound)?;
            if let Some(title) = title {
                todo.title = title;
            }
            if let Some(completed) = patch.completed {
                todo.completed = completed;
            }
            if let Some(due_date) = patch.due_date {
                todo.due_date = Some(due_date);
            }
            todo.updated_at = Utc::now();
            conn.execute(
                "UPDATE todos SET title = ?2, completed = ?3, due_date = ?4, updated_at = ?5
                 WHERE id = ?1",
                params![
                    todo.id,
                    todo.title,
                    i64::from(todo.completed),
                    todo.due_date.map(|due| due.to_rfc3339()),
                    todo.updated_at.to_rfc3339(),
                ],
            )?;
            Ok(todo)
        })
    }

    /// Removes the record. Deleting an absent id is `NotFound`, the
    /// same answer a second delete gets.
    pub fn delete(&self, id: &str) -> Result<(), TodoError> {
        let id = parse_id(id)?;
        self.store.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM todos WHERE id = ?1", [id.as_str()])?;
            if changed == 0 {
                return Err(TodoError::NotFound);
            }
            Ok(())
        })
    }
}

/// Rejects identifiers that cannot name a stored todo before querying,
/// so a malformed id never reads the store.
fn parse_id(raw: &str) -> Result<String, TodoError> {
    Uuid::parse_str(raw)
        .map(|id| id.to_string())
        .map_err(|_| TodoError::Validation("Invalid todo ID".to_string()))
}

fn find_todo(conn: &Connection, id: &str) -> Result<Option<Todo>, TodoError> {
    let mut stmt = conn.prepare(&format!("{TODO_SELECT_SQL} WHERE id = ?1"))?;
    let mut rows = stmt.query([id])?;
    match rows.next()? {
        Some(row) => Ok(Some(todo_from_row(row)?)),
        None => Ok(None),
    }
}

fn todo_from_row(row: &Row<'_>) -> Result<Todo, TodoError> {
    let due_date: Option<String> = row.get("due_date")?;
    Ok(Todo {
        id: row.get("id")?,
        title: row.get("title")?,
        completed: row.get::<_, i64>("completed")? != 0,
        due_date: due_date.as_deref().map(parse_stored_ts).transpose()?,
        created_at: parse_stored_ts(&row.get::<_, String>("created_at")?)?,
        updated_at: parse_stored_ts(&row.get::<_, String>("updated_at")?)?,
    })
}

fn parse_stored_ts(value: &str) -> Result<DateTime<Utc>, TodoError> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| TodoError::Store(format!("invalid stored timestamp `{value}`")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    fn repo() -> TodoRepo {
        TodoRepo::new(Store::open_in_memory().expect("in-memory store"))
    }

    fn create_input(title: &str) -> CreateTodoInput {
        CreateTodoInput {
            title: Some(title.to_string()),
            ..CreateTodoInput::default()
        }
    }

    #[test]
    fn create_then_list_contains_exactly_the_new_todo() {
        let repo = repo();
        let created = repo.create(&create_input("Buy milk")).expect("create");
        assert!(!created.completed);
        assert_eq!(created.created_at, created.updated_at);

        let todos = repo.list().expect("list");
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].title, "Buy milk");
        assert_eq!(todos[0], created);
    }

    #[test]
    fn create_trims_title_before_persisting() {
        let repo = repo();
        let created = repo.create(&create_input("  Sweep the porch  ")).expect("create");
        assert_eq!(created.title, "Sweep the porch");
        assert_eq!(repo.get(&created.id).expect("get").title, "Sweep the porch");
    }

    #[test]
    fn blank_and_missing_titles_fail_without_a_store_write() {
        let repo = repo();
        for input in [
            create_input(""),
            create_input("  "),
            CreateTodoInput::default(),
        ] {
            match repo.create(&input) {
                Err(TodoError::Validation(msg)) => assert_eq!(msg, "Title is required"),
                other => panic!("expected validation error, got {other:?}"),
            }
        }
        assert!(repo.list().expect("list").is_empty());
    }

    #[test]
    fn list_orders_newest_created_first() {
        let repo = repo();
        let first = repo.create(&create_input("older")).expect("create");
        sleep(Duration::from_millis(5));
        let second = repo.create(&create_input("newer")).expect("create");

        let todos = repo.list().expect("list");
        assert_eq!(todos[0].id, second.id);
        assert_eq!(todos[1].id, first.id);
    }

    #[test]
    fn update_applies_only_present_fields_and_bumps_updated_at() {
        let repo = repo();
        let created = repo.create(&create_input("Stretch")).expect("create");

        sleep(Duration::from_millis(5));
        let patch = UpdateTodoPatch {
            completed: Some(true),
            ..UpdateTodoPatch::default()
        };
        let updated = repo.update(&created.id, &patch).expect("update");
        assert!(updated.completed);
        assert_eq!(updated.title, "Stretch");
        assert!(updated.updated_at > created.updated_at);
        assert_eq!(updated.created_at, created.created_at);

        let fetched = repo.get(&created.id).expect("get");
        assert!(fetched.completed);
        assert!(fetched.updated_at > created.updated_at);
    }

    #[test]
    fn update_reruns_title_constraints() {
        let repo = repo();
        let created = repo.create(&create_input("Short")).expect("create");

        let blank = UpdateTodoPatch {
            title: Some("   ".to_string()),
            ..UpdateTodoPatch::default()
        };
        match repo.update(&created.id, &blank) {
            Err(TodoError::Validation(msg)) => assert_eq!(msg, "Title is required"),
            other => panic!("expected validation error, got {other:?}"),
        }

        let oversize = UpdateTodoPatch {
            title: Some("x".repeat(201)),
            ..UpdateTodoPatch::default()
        };
        match repo.update(&created.id, &oversize) {
            Err(TodoError::Validation(msg)) => {
                assert_eq!(msg, "Title must be less than 200 characters");
            }
            other => panic!("expected validation error, got {other:?}"),
        }

        // The rejected patches must not have touched the record.
        assert_eq!(repo.get(&created.id).expect("get").title, "Short");
    }

    #[test]
    fn delete_is_idempotent_not_found_after_the_first_call() {
        let repo = repo();
        let created = repo.create(&create_input("Fleeting")).expect("create");

        repo.delete(&created.id).expect("delete");
        assert!(matches!(repo.get(&created.id), Err(TodoError::NotFound)));
        assert!(matches!(repo.delete(&created.id), Err(TodoError::NotFound)));
    }

    #[test]
    fn malformed_id_is_a_validation_error_never_not_found() {
        let repo = repo();
        for op in [
            repo.get("not-an-id").err(),
            repo.update("not-an-id", &UpdateTodoPatch::default()).err(),
            repo.delete("not-an-id").err(),
        ] {
            match op {
                Some(TodoError::Validation(msg)) => assert_eq!(msg, "Invalid todo ID"),
                other => panic!("expected validation error, got {other:?}"),
            }
        }
    }

    #[test]
    fn unknown_but_well_formed_id_is_not_found() {
        let repo = repo();
        let absent = Uuid::new_v4().to_string();
        assert!(matches!(repo.get(&absent), Err(TodoError::NotFound)));
    }

    #[test]
    fn file_backed_store_persists_across_reopen() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("todos.db");

        let created = {
            let repo = TodoRepo::new(Store::open(&path).expect("open"));
            repo.create(&create_input("Durable")).expect("create")
        };

        let repo = TodoRepo::new(Store::open(&path).expect("reopen"));
        let fetched = repo.get(&created.id).expect("get after reopen");
        assert_eq!(fetched, created);
    }
}
