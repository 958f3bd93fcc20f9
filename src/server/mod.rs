mod handlers;
mod state;
mod static_files;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::location::LocationPipeline;
use crate::registry::MemoryStore;

pub use state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/app.js", get(handlers::script))
        .route("/register", post(handlers::register))
        .route("/api/nearby", post(handlers::nearby))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(host: &str, port: u16, config: &Config) -> std::io::Result<()> {
    let state = Arc::new(AppState {
        pipeline: LocationPipeline::from_config(config),
        store: Box::new(MemoryStore::new()),
    });
    let app = build_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(%addr, "nearby aid server listening");
    axum::serve(listener, app).await
}
