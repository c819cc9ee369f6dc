//! HTTP surface: one route per repository operation.
//!
//! Handlers translate requests into repository calls and wrap every
//! outcome in the uniform envelope; `TodoError`'s `IntoResponse` is the
//! single place error kinds become HTTP statuses.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

use crate::error::TodoError;
use crate::models::{CreateTodoInput, Envelope, Todo, UpdateTodoPatch};
use crate::repo::TodoRepo;

/// Builds the application router around a repository handle. Plain
/// value, so tests can drive it in-process without a live socket.
pub fn router(repo: TodoRepo) -> Router {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route(
            "/todos/:id",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(repo)
}

async fn list_todos(
    State(repo): State<TodoRepo>,
) -> Result<Json<Envelope<Vec<Todo>>>, TodoError> {
    let todos = repo.list()?;
    Ok(Json(Envelope::ok(todos)))
}

async fn create_todo(
    State(repo): State<TodoRepo>,
    body: Result<Json<CreateTodoInput>, JsonRejection>,
) -> Result<impl IntoResponse, TodoError> {
    let Json(input) = body.map_err(bad_body)?;
    // Boundary check: a request without a usable title never reaches
    // the store.
    if input.title.as_deref().map_or(true, |t| t.trim().is_empty()) {
        return Err(TodoError::Validation("Title is required".to_string()));
    }
    let todo = repo.create(&input)?;
    Ok((StatusCode::CREATED, Json(Envelope::ok(todo))))
}

async fn get_todo(
    State(repo): State<TodoRepo>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Todo>>, TodoError> {
    let todo = repo.get(&id)?;
    Ok(Json(Envelope::ok(todo)))
}

async fn update_todo(
    State(repo): State<TodoRepo>,
    Path(id): Path<String>,
    body: Result<Json<UpdateTodoPatch>, JsonRejection>,
) -> Result<Json<Envelope<Todo>>, TodoError> {
    let Json(patch) = body.map_err(bad_body)?;
    let todo = repo.update(&id, &patch)?;
    Ok(Json(Envelope::ok(todo)))
}

async fn delete_todo(
    State(repo): State<TodoRepo>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<()>>, TodoError> {
    repo.delete(&id)?;
    Ok(Json(Envelope::message("Todo deleted successfully")))
}

fn bad_body(rejection: JsonRejection) -> TodoError {
    TodoError::Validation(rejection.body_text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    fn repo() -> TodoRepo {
        TodoRepo::new(Store::open_in_memory().expect("in-memory store"))
    }

    #[tokio::test]
    async fn create_rejects_blank_title_before_touching_the_store() {
        let repo = repo();
        let body: Result<Json<CreateTodoInput>, JsonRejection> = Ok(Json(CreateTodoInput {
            title: Some("   ".to_string()),
            ..CreateTodoInput::default()
        }));

        match create_todo(State(repo.clone()), body).await {
            Err(TodoError::Validation(msg)) => assert_eq!(msg, "Title is required"),
            _ => panic!("expected validation error"),
        }
        assert!(repo.list().expect("list").is_empty());
    }

    #[tokio::test]
    async fn delete_reports_a_message_without_payload() {
        let repo = repo();
        let created = repo
            .create(&CreateTodoInput {
                title: Some("Temp".to_string()),
                ..CreateTodoInput::default()
            })
            .expect("create");

        let Json(envelope) = delete_todo(State(repo), Path(created.id))
            .await
            .expect("delete");
        assert!(envelope.success);
        assert_eq!(envelope.message.as_deref(), Some("Todo deleted successfully"));
        assert!(envelope.data.is_none());
    }
}
