//! A todo list kept in a single JSON file, served over HTTP as JSON and HTML.

pub mod config;
pub mod entities;
pub mod store;
pub mod web;

use color_eyre::{eyre::WrapErr, Result};
use tracing::{info, warn};

use config::Config;
use store::TodoStore;
use web::AppState;

/// Binds the configured address and serves until Ctrl-C or SIGTERM.
pub async fn run(config: Config) -> Result<()> {
    let store = TodoStore::new(&config.todos_file);
    if !store.path().exists() {
        warn!(path = %store.path().display(), "todo file does not exist yet; requests will fail until it is created");
    }

    let state = AppState::new(store).wrap_err("failed to compile templates")?;
    let app = web::build_router(state);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("failed to bind {addr}"))?;
    info!(
        %addr,
        todos_file = %config.todos_file.display(),
        "listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(%err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(%err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
