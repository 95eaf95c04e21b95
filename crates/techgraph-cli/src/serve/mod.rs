//! HTTP API over the query engine.
//!
//! # Routes
//!
//! - `POST /query` - `{"query": "..."}` or `{"errorCode": "...", "productSku": "..."}`
//! - `GET /health` - backend connectivity
//! - `GET /stats` - node and relationship counts
//!
//! # Module Structure
//!
//! - `handlers` - HTTP route handlers
//! - `models` - request/response bodies

mod handlers;
mod models;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use color_eyre::eyre::{Result, WrapErr};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use techgraph_core::Engine;

/// Shared application state for the server.
pub struct AppState {
    pub engine: Engine,
}

/// Server options resolved from config and flags.
pub struct ServeConfig {
    pub host: String,
    pub port: u16,
    /// Open `/health` in the browser once listening.
    pub open_browser: bool,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/query", post(handlers::query))
        .route("/health", get(handlers::health))
        .route("/stats", get(handlers::stats))
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .with_state(state)
}

/// Serve until Ctrl+C.
pub async fn start_server(engine: Engine, config: ServeConfig) -> Result<()> {
    let state = Arc::new(AppState { engine });
    let app = router(Arc::clone(&state));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .wrap_err_with(|| format!("Invalid listen address {}:{}", config.host, config.port))?;
    let url = format!("http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("Failed to bind {addr}"))?;
    info!(%url, backend = state.engine.backend_name(), "techgraph API listening");
    println!("techgraph API: {url}");
    println!("Press Ctrl+C to stop\n");

    if config.open_browser {
        if let Err(e) = open::that(format!("{url}/health")) {
            eprintln!("Could not open browser: {}", e);
        }
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    state.engine.shutdown();
    info!("Server stopped");
    Ok(())
}
