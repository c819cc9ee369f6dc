use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;

use ticklist::models::{Envelope, Todo};
use ticklist::repo::TodoRepo;
use ticklist::routes::router;
use ticklist::store::Store;

fn test_server() -> TestServer {
    let repo = TodoRepo::new(Store::open_in_memory().expect("in-memory store"));
    TestServer::new(router(repo)).expect("test server")
}

#[tokio::test]
async fn create_then_list_roundtrip() {
    let server = test_server();

    let response = server.post("/todos").json(&json!({"title": "Buy milk"})).await;
    response.assert_status(StatusCode::CREATED);
    let envelope: Envelope<Todo> = response.json();
    assert!(envelope.success);
    let created = envelope.data.expect("created todo");
    assert_eq!(created.title, "Buy milk");
    assert!(!created.completed);
    assert_eq!(created.created_at, created.updated_at);

    let response = server.get("/todos").await;
    response.assert_status_ok();
    let envelope: Envelope<Vec<Todo>> = response.json();
    let todos = envelope.data.expect("todo list");
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].id, created.id);
}

#[tokio::test]
async fn list_returns_newest_first() {
    let server = test_server();

    server.post("/todos").json(&json!({"title": "older"})).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    server.post("/todos").json(&json!({"title": "newer"})).await;

    let envelope: Envelope<Vec<Todo>> = server.get("/todos").await.json();
    let todos = envelope.data.expect("todo list");
    assert_eq!(todos.len(), 2);
    assert_eq!(todos[0].title, "newer");
    assert_eq!(todos[1].title, "older");
}

#[tokio::test]
async fn blank_and_missing_titles_are_rejected() {
    let server = test_server();

    for body in [json!({"title": "   "}), json!({"title": ""}), json!({})] {
        let response = server.post("/todos").json(&body).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let envelope: Envelope<Todo> = response.json();
        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some("Title is required"));
    }

    let envelope: Envelope<Vec<Todo>> = server.get("/todos").await.json();
    assert!(envelope.data.expect("todo list").is_empty());
}

#[tokio::test]
async fn oversize_title_is_rejected_on_create_and_update() {
    let server = test_server();
    let long_title = "x".repeat(201);

    let response = server.post("/todos").json(&json!({"title": long_title})).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let envelope: Envelope<Todo> = response.json();
    assert_eq!(
        envelope.error.as_deref(),
        Some("Title must be less than 200 characters")
    );

    let created: Envelope<Todo> = server
        .post("/todos")
        .json(&json!({"title": "short"}))
        .await
        .json();
    let id = created.data.expect("created todo").id;

    let response = server
        .put(&format!("/todos/{id}"))
        .json(&json!({"title": "y".repeat(201)}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let envelope: Envelope<Todo> = response.json();
    assert_eq!(
        envelope.error.as_deref(),
        Some("Title must be less than 200 characters")
    );
}

#[tokio::test]
async fn malformed_id_is_a_client_error_on_every_route() {
    let server = test_server();

    let get = server.get("/todos/not-an-id").await;
    let put = server.put("/todos/not-an-id").json(&json!({"completed": true})).await;
    let delete = server.delete("/todos/not-an-id").await;

    for response in [get, put, delete] {
        response.assert_status(StatusCode::BAD_REQUEST);
        let envelope: Envelope<Todo> = response.json();
        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some("Invalid todo ID"));
    }
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let server = test_server();
    let absent = "9e107d9d-3721-4c83-8a4b-5ad9a3a6c6f1";

    let response = server.get(&format!("/todos/{absent}")).await;
    response.assert_status(StatusCode::NOT_FOUND);
    let envelope: Envelope<Todo> = response.json();
    assert_eq!(envelope.error.as_deref(), Some("Todo not found"));
}

#[tokio::test]
async fn malformed_body_is_enveloped_as_a_client_error() {
    let server = test_server();

    let response = server
        .post("/todos")
        .content_type("application/json")
        .bytes("{not json".into())
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let envelope: Envelope<Todo> = response.json();
    assert!(!envelope.success);
    assert!(envelope.error.is_some());
}

#[tokio::test]
async fn full_lifecycle_post_put_delete() {
    let server = test_server();

    // POST
    let response = server.post("/todos").json(&json!({"title": "Buy milk"})).await;
    response.assert_status(StatusCode::CREATED);
    let created = response.json::<Envelope<Todo>>().data.expect("created todo");

    // PUT: flip completion
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let response = server
        .put(&format!("/todos/{}", created.id))
        .json(&json!({"completed": true}))
        .await;
    response.assert_status_ok();
    let updated = response.json::<Envelope<Todo>>().data.expect("updated todo");
    assert!(updated.completed);
    assert_eq!(updated.title, "Buy milk");
    assert!(updated.updated_at > created.updated_at);
    assert_eq!(updated.created_at, created.created_at);

    // DELETE
    let response = server.delete(&format!("/todos/{}", created.id)).await;
    response.assert_status_ok();
    let envelope: Envelope<Todo> = response.json();
    assert!(envelope.success);
    assert_eq!(envelope.message.as_deref(), Some("Todo deleted successfully"));

    // The record is gone; a second delete gets the same answer.
    let response = server.get(&format!("/todos/{}", created.id)).await;
    response.assert_status(StatusCode::NOT_FOUND);
    let response = server.delete(&format!("/todos/{}", created.id)).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_by_id_returns_the_stored_todo() {
    let server = test_server();

    let created = server
        .post("/todos")
        .json(&json!({"title": "Read", "dueDate": "2026-09-01T00:00:00Z"}))
        .await
        .json::<Envelope<Todo>>()
        .data
        .expect("created todo");

    let response = server.get(&format!("/todos/{}", created.id)).await;
    response.assert_status_ok();
    let fetched = response.json::<Envelope<Todo>>().data.expect("fetched todo");
    assert_eq!(fetched, created);
    assert!(fetched.due_date.is_some());
}
