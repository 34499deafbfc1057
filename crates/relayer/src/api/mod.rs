//! HTTP and WebSocket routes.

mod routes;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{Config, OriginPolicy};
use crate::relay::RelayState;

/// Shared app state.
#[derive(Clone)]
pub struct AppState {
    pub relay: RelayState,
    pub config: Arc<Config>,
}

pub fn router(state: AppState) -> Router {
    let allow_origin = match &state.config.origin_policy {
        OriginPolicy::Any => AllowOrigin::from(Any),
        OriginPolicy::Exact(origin) => AllowOrigin::exact(origin.clone()),
    };
    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route(&state.config.ws_path, get(routes::ws_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
