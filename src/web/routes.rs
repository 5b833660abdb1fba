use axum::{
    body::Bytes,
    extract::{Query, State},
    response::{Redirect, Response},
    routing::{delete, get, patch, post},
    Form, Router,
};
use serde::Deserialize;
use tracing::info;

use super::{
    error::ApiError,
    render::{JsonFormatter, TodoFormatter},
    AppState,
};
use crate::{
    entities::NewTodo,
    store::{StoreError, TodoStore},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index).post(add_from_form))
        .route("/ping", get(ping))
        .route("/todos/get", get(list_todos))
        .route("/todos/add", post(add_todos))
        .route("/todos/delete", delete(delete_todo))
        .route("/todos/complete", patch(complete_todo))
}

#[derive(Debug, Deserialize)]
struct IdQuery {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TaskForm {
    #[serde(default)]
    task: String,
}

/// Runs a store operation on the blocking pool; file I/O is synchronous.
async fn with_store<T, F>(state: &AppState, op: F) -> Result<T, ApiError>
where
    F: FnOnce(&TodoStore) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    let store = state.store.clone();
    let result = tokio::task::spawn_blocking(move || op(store.as_ref())).await?;
    Ok(result?)
}

async fn ping() -> &'static str {
    "PONG"
}

async fn list_todos(State(state): State<AppState>) -> Result<Response, ApiError> {
    let todos = with_store(&state, TodoStore::list).await?;
    JsonFormatter.render(todos)
}

async fn index(State(state): State<AppState>) -> Result<Response, ApiError> {
    let todos = with_store(&state, TodoStore::list).await?;
    state.html.render(todos)
}

async fn add_todos(State(state): State<AppState>, body: Bytes) -> Result<&'static str, ApiError> {
    let batch: Vec<NewTodo> = serde_json::from_slice(&body).map_err(ApiError::InvalidBody)?;
    let tasks: Vec<String> = batch.into_iter().map(|new| new.task).collect();

    let added = with_store(&state, move |store| store.add(tasks)).await?;
    info!(count = added.len(), "added todos");
    Ok("Successfully added tasks")
}

async fn add_from_form(
    State(state): State<AppState>,
    Form(form): Form<TaskForm>,
) -> Result<Redirect, ApiError> {
    let added = with_store(&state, move |store| store.add_from_form(&form.task)).await?;
    if let Some(todo) = added {
        info!(id = %todo.id, "added todo from form");
    }
    Ok(Redirect::to("/"))
}

async fn delete_todo(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<String, ApiError> {
    let id = query.id.unwrap_or_default();
    let removed = with_store(&state, move |store| store.delete(&id)).await?;
    info!(id = %removed.id, "deleted todo");
    Ok(format!("Deleted todo with ID {}", removed.id))
}

async fn complete_todo(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<String, ApiError> {
    let id = query.id.unwrap_or_default();
    let completed = with_store(&state, move |store| store.complete(&id)).await?;
    info!(id = %completed.id, "completed todo");
    Ok(format!("Completed todo with ID {}", completed.id))
}
