//! HTTP router setup.

use crate::handlers;
use crate::middleware;
use crate::resolver::ACTION_PATH;
use crate::state::AppState;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create(state: Arc<AppState>) -> Router {
    let request_timeout = request_timeout(state.config.rpc_timeout_ms);

    Router::new()
        .route(
            ACTION_PATH,
            get(handlers::describe)
                .post(handlers::resolve)
                .options(handlers::preflight),
        )
        .route("/actions.json", get(handlers::actions_json))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .layer(axum::middleware::from_fn(middleware::inject_request_id))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::GATEWAY_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::actions_cors())
        .with_state(state)
}

/// Whole-request budget. A buy makes up to three bounded marketplace calls.
fn request_timeout(rpc_timeout_ms: u64) -> Duration {
    Duration::from_millis(rpc_timeout_ms.saturating_mul(3).saturating_add(1_000))
}
