//! HTTP request handlers.

use crate::actions::{ActionGetResponse, ActionPostRequest, ActionQuery, ActionsJson};
use crate::metrics::METRICS;
use crate::middleware::RequestId;
use crate::resolver::{ActionRequest, Stage, StageResponse};
use crate::response::HealthResponse;
use crate::state::AppState;
use crate::Error;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use std::str::FromStr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{error, info, warn};

/// `GET /api/actions/buy-nft` — action descriptor.
pub async fn describe(
    State(state): State<Arc<AppState>>,
    Extension(RequestId(req_id)): Extension<RequestId>,
    Query(query): Query<ActionQuery>,
) -> Result<Json<ActionGetResponse>, Error> {
    let start = std::time::Instant::now();
    state.request_count.fetch_add(1, Ordering::Relaxed);
    METRICS.describe_total.fetch_add(1, Ordering::Relaxed);

    let result = state.resolver.describe(query.nft_name.as_deref());
    METRICS.record_duration(start);

    match result {
        Ok(descriptor) => {
            info!(req_id = %req_id, nft = ?query.nft_name, "Action described");
            Ok(Json(descriptor))
        }
        Err(e) => Err(report(&req_id, Stage::Discover, e)),
    }
}

/// `POST /api/actions/buy-nft` — order menu or purchase transaction.
pub async fn resolve(
    State(state): State<Arc<AppState>>,
    Extension(RequestId(req_id)): Extension<RequestId>,
    Query(query): Query<ActionQuery>,
    body: Bytes,
) -> Result<Json<StageResponse>, Error> {
    let start = std::time::Instant::now();
    state.request_count.fetch_add(1, Ordering::Relaxed);

    let stage = query.action.as_deref().and_then(|a| Stage::from_str(a).ok());
    match stage {
        Some(Stage::FindOrders) => {
            METRICS.find_orders_total.fetch_add(1, Ordering::Relaxed);
        }
        Some(Stage::Buy) => {
            METRICS.buy_total.fetch_add(1, Ordering::Relaxed);
        }
        _ => {}
    }

    // A missing or non-JSON body surfaces later as an invalid account.
    let body: ActionPostRequest = serde_json::from_slice(&body).unwrap_or_else(|e| {
        warn!(req_id = %req_id, error = %e, "Unreadable POST body");
        ActionPostRequest::default()
    });

    info!(req_id = %req_id, nft = ?query.nft_name, action = ?query.action, "Resolving action");

    let request = ActionRequest::from_parts(query, body);
    let result = state.resolver.resolve_stage(&request).await;
    METRICS.record_duration(start);

    result
        .map(Json)
        .map_err(|e| report(&req_id, stage.unwrap_or(Stage::Discover), e))
}

/// `OPTIONS /api/actions/buy-nft` — preflight without CORS request headers.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// `GET /actions.json`
pub async fn actions_json() -> Json<ActionsJson> {
    Json(ActionsJson::for_prefix("/api/actions"))
}

/// Health check with RPC status.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let rpc_status = match state.marketplace.health().await {
        Ok(()) => "ok",
        Err(e) => {
            warn!(error = %e, "RPC health check failed");
            "unavailable"
        }
    };
    let status = if rpc_status == "ok" { "ok" } else { "unavailable" };
    let code = if status == "ok" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        code,
        Json(HealthResponse {
            status,
            program_id: state.config.program_id.clone(),
            rpc_url: state.config.rpc_url.clone(),
            rpc_status,
            catalog_size: state.resolver.catalog().len(),
            uptime_secs: state.start_time.elapsed().as_secs(),
            requests: state.request_count.load(Ordering::Relaxed),
        }),
    )
}

/// Prometheus metrics in text exposition format.
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = METRICS.render(state.resolver.catalog().len());
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4",
        )],
        body,
    )
}

/// Count and log a failed request; the error becomes the response.
fn report(req_id: &str, stage: Stage, e: Error) -> Error {
    METRICS.record_error(&e);
    match &e {
        Error::InvalidInput(_) | Error::NotFound(_) => {
            warn!(req_id = %req_id, stage = stage.as_str(), error = %e, "Request rejected")
        }
        _ => error!(req_id = %req_id, stage = stage.as_str(), error = %e, "Request failed"),
    }
    e
}
