pub mod error;
pub mod render;
mod routes;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::store::TodoStore;
use render::HtmlFormatter;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TodoStore>,
    pub html: Arc<HtmlFormatter>,
}

impl AppState {
    /// Fails only if the built-in template does not compile.
    pub fn new(store: TodoStore) -> Result<Self, tera::Error> {
        Ok(Self {
            store: Arc::new(store),
            html: Arc::new(HtmlFormatter::new()?),
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
