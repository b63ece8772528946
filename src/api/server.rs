//! HTTP server assembly.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::error_handling::HandleErrorLayer;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower::{timeout::TimeoutLayer, BoxError, ServiceBuilder};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::anomaly_detection::DetectionService;
use crate::api::anomaly::{self, AnomalyApiState};
use crate::config::AppConfig;

/// Request bodies larger than this are rejected outright.
const MAX_BODY_BYTES: usize = 64 * 1024;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct ApiServer {
    config: AppConfig,
    service: Arc<DetectionService>,
}

impl ApiServer {
    pub fn new(config: AppConfig) -> Self {
        let service = Arc::new(DetectionService::new(config.detection.model_path.clone()));
        Self { config, service }
    }

    /// Server around an externally built service; test seam.
    pub fn with_service(config: AppConfig, service: Arc<DetectionService>) -> Self {
        Self { config, service }
    }

    pub fn router(&self) -> Router {
        let state = AnomalyApiState {
            service: self.service.clone(),
        };

        let cors = match self.config.server.cors_origin.parse::<HeaderValue>() {
            Ok(origin) => CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([axum::http::header::CONTENT_TYPE]),
            Err(_) => CorsLayer::permissive(),
        };

        Router::new()
            .route("/", get(health))
            .nest("/anomaly", anomaly::create_anomaly_routes(state))
            .layer(
                ServiceBuilder::new()
                    .layer(HandleErrorLayer::new(handle_middleware_error))
                    .layer(TimeoutLayer::new(REQUEST_TIMEOUT)),
            )
            .layer(TraceLayer::new_for_http())
            .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
            .layer(cors)
    }

    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.config.server.host, self.config.server.port);
        let listener = TcpListener::bind(&addr).await?;
        info!(addr = %listener.local_addr()?, "anomaly detection server listening");
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn handle_middleware_error(err: BoxError) -> (StatusCode, String) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (StatusCode::REQUEST_TIMEOUT, "request timed out".to_string())
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("unhandled internal error: {err}"),
        )
    }
}
