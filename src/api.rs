//! HTTP client for the ticklist API, used by the terminal app.
//!
//! Error responses still carry the envelope, so every function parses
//! the body first and only then checks the success flag; the server's
//! error string is surfaced verbatim.

use reqwest::Client;
use std::error::Error;

use crate::models::{CreateTodoInput, Envelope, Todo, UpdateTodoPatch};

pub async fn fetch_todos(base_url: &str) -> Result<Vec<Todo>, Box<dyn Error>> {
    let client = Client::new();
    let url = format!("{}/todos", base_url);

    let envelope = client
        .get(&url)
        .send()
        .await?
        .json::<Envelope<Vec<Todo>>>()
        .await?;

    if envelope.success {
        Ok(envelope.data.unwrap_or_default())
    } else {
        Err(api_error(envelope))
    }
}

pub async fn fetch_todo(base_url: &str, id: &str) -> Result<Todo, Box<dyn Error>> {
    let client = Client::new();
    let url = format!("{}/todos/{}", base_url, id);

    let envelope = client.get(&url).send().await?.json::<Envelope<Todo>>().await?;
    unwrap_data(envelope)
}

pub async fn create_todo(base_url: &str, input: &CreateTodoInput) -> Result<Todo, Box<dyn Error>> {
    let client = Client::new();
    let url = format!("{}/todos", base_url);

    let envelope = client
        .post(&url)
        .json(input)
        .send()
        .await?
        .json::<Envelope<Todo>>()
        .await?;
    unwrap_data(envelope)
}

pub async fn update_todo(
    base_url: &str,
    id: &str,
    patch: &UpdateTodoPatch,
) -> Result<Todo, Box<dyn Error>> {
    let client = Client::new();
    let url = format!("{}/todos/{}", base_url, id);

    let envelope = client
        .put(&url)
        .json(patch)
        .send()
        .await?
        .json::<Envelope<Todo>>()
        .await?;
    unwrap_data(envelope)
}

pub async fn delete_todo(base_url: &str, id: &str) -> Result<(), Box<dyn Error>> {
    let client = Client::new();
    let url = format!("{}/todos/{}", base_url, id);

    let envelope = client
        .delete(&url)
        .send()
        .await?
        .json::<Envelope<serde_json::Value>>()
        .await?;

    if envelope.success {
        Ok(())
    } else {
        Err(api_error(envelope))
    }
}

fn unwrap_data<T>(envelope: Envelope<T>) -> Result<T, Box<dyn Error>> {
    if envelope.success {
        envelope
            .data
            .ok_or_else(|| "Malformed API response".to_string().into())
    } else {
        Err(api_error(envelope))
    }
}

fn api_error<T>(envelope: Envelope<T>) -> Box<dyn Error> {
    envelope
        .error
        .unwrap_or_else(|| "Unexpected API response".to_string())
        .into()
}
