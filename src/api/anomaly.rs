//! Anomaly detection routes.

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use tracing::info;

use crate::anomaly_detection::{mask_personal_data, DetectionService, TransactionRecord};
use crate::api::types::{AnomalyResponse, ErrorResponse};

/// Shared state for the anomaly routes.
#[derive(Clone)]
pub struct AnomalyApiState {
    pub service: Arc<DetectionService>,
}

/// Routes for the three detection strategies, one endpoint each; the caller
/// selects the strategy by path.
pub fn create_anomaly_routes(state: AnomalyApiState) -> Router {
    Router::new()
        .route("/rule", post(detect_rule))
        .route("/ml", post(detect_ml))
        .route("/demo", post(detect_demo))
        .with_state(state)
}

/// POST /anomaly/rule
async fn detect_rule(
    State(state): State<AnomalyApiState>,
    Json(tx): Json<TransactionRecord>,
) -> Response {
    if let Err(rejection) = validate(&tx) {
        return rejection;
    }
    log_request("rule", &tx);

    let result = state.service.evaluate_rule_based(&tx);
    Json(AnomalyResponse::from(result)).into_response()
}

/// POST /anomaly/ml
///
/// 503 when the model artifact cannot be loaded; the classifier's own verdict
/// is never conflated with backend unavailability.
async fn detect_ml(
    State(state): State<AnomalyApiState>,
    Json(tx): Json<TransactionRecord>,
) -> Response {
    if let Err(rejection) = validate(&tx) {
        return rejection;
    }
    log_request("ml", &tx);

    match state.service.evaluate_statistical(&tx) {
        Ok(result) => Json(AnomalyResponse::from(result)).into_response(),
        Err(err) if err.is_service_unavailable() => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::new("detection backend unavailable")),
        )
            .into_response(),
        Err(err) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(err.to_string())),
        )
            .into_response(),
    }
}

/// POST /anomaly/demo
async fn detect_demo(
    State(state): State<AnomalyApiState>,
    Json(tx): Json<TransactionRecord>,
) -> Response {
    if let Err(rejection) = validate(&tx) {
        return rejection;
    }
    log_request("demo", &tx);

    let result = state.service.evaluate_demo(&tx);
    Json(AnomalyResponse::from(result)).into_response()
}

/// Requests without an identifier are rejected before any detector runs.
fn validate(tx: &TransactionRecord) -> Result<(), Response> {
    if tx.user_id.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("userId is required")),
        )
            .into_response());
    }
    if tx.amount < 0.0 {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("amount must not be negative")),
        )
            .into_response());
    }
    Ok(())
}

fn log_request(strategy: &str, tx: &TransactionRecord) {
    // Merchant text is free-form and may carry card numbers; mask before logging.
    info!(
        strategy,
        user = %tx.user_id,
        amount = tx.amount,
        merchant = %mask_personal_data(&tx.merchant),
        "detection request"
    );
}
